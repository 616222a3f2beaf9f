use crate::{
  error::{io_at, FixtureError, Result},
  layout::{LayoutSpec, PathKind},
};
use std::{
  collections::BTreeMap,
  fs, io,
  path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Materializes layouts under a single output root.
pub struct FixtureBuilder {
  root: PathBuf,
}

impl FixtureBuilder {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Removes the root with everything below it, then recreates it empty.
  ///
  /// # Errors
  ///
  /// Returns [`FixtureError::Io`] if removal is blocked (permissions, open
  /// handles) or the root cannot be created.
  pub fn reset(&self) -> Result<()> {
    match fs::symlink_metadata(&self.root) {
      Ok(metadata) => {
        if metadata.is_dir() {
          fs::remove_dir_all(&self.root).map_err(io_at(&self.root))?;
        } else {
          fs::remove_file(&self.root).map_err(io_at(&self.root))?;
        }
        info!(root = %self.root.display(), "Cleaned fixture directory");
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(io_at(&self.root)(e)),
    }

    fs::create_dir_all(&self.root).map_err(io_at(&self.root))?;
    info!(root = %self.root.display(), "Created fixture directory");

    Ok(())
  }

  /// Creates every directory and empty file of `spec` under the root, in
  /// layout order.
  ///
  /// The layout is expanded and validated before anything is written. On an
  /// I/O failure the build stops immediately and leaves what it already
  /// created; call [`FixtureBuilder::reset`] before retrying.
  ///
  /// # Returns
  ///
  /// The number of directories and files newly created. Directories that
  /// already existed and files that were only truncated are not counted.
  ///
  /// # Errors
  ///
  /// - [`FixtureError::InvalidPath`] / [`FixtureError::InvalidPattern`] for a
  ///   malformed layout
  /// - [`FixtureError::NotFound`] if the root or a file's parent is missing
  /// - [`FixtureError::Io`] for any other filesystem failure
  pub fn build(&self, spec: &LayoutSpec) -> Result<usize> {
    let plan = spec.expand()?;

    if !self.root.is_dir() {
      return Err(FixtureError::NotFound(self.root.clone()));
    }

    let mut created = 0;
    for entry in plan {
      created += match entry.kind {
        PathKind::Directory => self.create_directory(&entry.path)?,
        PathKind::File => create_empty_file(&self.root.join(&entry.path))?,
      };
    }

    info!(root = %self.root.display(), created, "Fixture build complete");
    Ok(created)
  }

  /// Checks that the tree under the root is exactly what `spec` describes:
  /// the same set of paths, the same kinds, and only empty files.
  pub fn verify(&self, spec: &LayoutSpec) -> Result<()> {
    let expected = spec.expected_paths()?;
    let actual = self.snapshot()?;

    let mut missing = Vec::new();
    let mut non_empty = Vec::new();
    for (path, kind) in &expected {
      match actual.get(path) {
        Some(found) if found == kind => {
          if *kind == PathKind::File && !self.is_empty_file(path)? {
            non_empty.push(path.clone());
          }
        }
        _ => missing.push(path.clone()),
      }
    }

    let unexpected: Vec<PathBuf> = actual
      .keys()
      .filter(|path| !expected.contains_key(*path))
      .cloned()
      .collect();

    if missing.is_empty() && unexpected.is_empty() && non_empty.is_empty() {
      debug!(root = %self.root.display(), entries = actual.len(), "Fixture tree verified");
      return Ok(());
    }

    for path in &missing {
      warn!(path = %path.display(), "Missing fixture entry");
    }
    for path in &unexpected {
      warn!(path = %path.display(), "Unexpected fixture entry");
    }
    for path in &non_empty {
      warn!(path = %path.display(), "Fixture file is not empty");
    }

    Err(FixtureError::Mismatch {
      root: self.root.clone(),
      missing,
      unexpected,
      non_empty,
    })
  }

  /// Every path currently below the root, relative to it.
  pub fn snapshot(&self) -> Result<BTreeMap<PathBuf, PathKind>> {
    let mut tree = BTreeMap::new();

    for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
      let entry = entry.map_err(|e| {
        let path = e.path().unwrap_or(self.root.as_path()).to_path_buf();
        FixtureError::Io {
          path,
          source: e.into(),
        }
      })?;

      if let Ok(relative) = entry.path().strip_prefix(&self.root) {
        let kind = if entry.file_type().is_dir() {
          PathKind::Directory
        } else {
          PathKind::File
        };
        tree.insert(relative.to_path_buf(), kind);
      }
    }

    Ok(tree)
  }

  /// Creates `relative` and each missing ancestor one level at a time so
  /// that every directory actually created is counted.
  fn create_directory(&self, relative: &Path) -> Result<usize> {
    let mut current = self.root.clone();
    let mut created = 0;

    for component in relative.components() {
      current.push(component);
      match fs::create_dir(&current) {
        Ok(()) => {
          created += 1;
          info!(path = %current.display(), "Created directory");
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && current.is_dir() => {
          debug!(path = %current.display(), "Directory already exists");
        }
        Err(e) => return Err(io_at(&current)(e)),
      }
    }

    Ok(created)
  }

  fn is_empty_file(&self, relative: &Path) -> Result<bool> {
    let path = self.root.join(relative);
    let metadata = fs::metadata(&path).map_err(io_at(&path))?;
    Ok(metadata.len() == 0)
  }
}

/// Creates (or truncates) an empty file whose parent must already exist.
fn create_empty_file(path: &Path) -> Result<usize> {
  if let Some(parent) = path.parent() {
    if !parent.is_dir() {
      return Err(FixtureError::NotFound(path.to_path_buf()));
    }
  }

  let existed = path.exists();
  fs::OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .open(path)
    .map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        FixtureError::NotFound(path.to_path_buf())
      } else {
        io_at(path)(e)
      }
    })?;

  if existed {
    debug!(path = %path.display(), "Truncated existing file");
    Ok(0)
  } else {
    info!(path = %path.display(), "Created file");
    Ok(1)
  }
}
