pub mod layout_file;

use std::{
  path::{Path, PathBuf},
  process::{Command, Output},
};
use walkdir::WalkDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a checked-in JSON layout
pub fn layout_path(name: &str) -> PathBuf {
  fixtures_dir().join("layouts").join(name)
}

/// Run the fixturegen binary from `cwd`
pub fn run_fixturegen(cwd: &Path, args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_fixturegen"))
    .args(args)
    .current_dir(cwd)
    .output()
    .expect("Failed to execute fixturegen")
}

/// Every path below `root` as a sorted list of `/`-separated strings, with a
/// trailing `/` on directories.
pub fn tree_of(root: &Path) -> Vec<String> {
  let mut tree: Vec<String> = WalkDir::new(root)
    .min_depth(1)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter_map(|entry| {
      let relative = entry.path().strip_prefix(root).ok()?;
      let mut name = relative.to_string_lossy().replace('\\', "/");
      if entry.file_type().is_dir() {
        name.push('/');
      }
      Some(name)
    })
    .collect();
  tree.sort();
  tree
}
