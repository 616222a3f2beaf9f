use crate::error::{FixtureError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
  collections::{BTreeMap, HashSet},
  fs,
  path::{Component, Path, PathBuf},
};

/// Declarative description of a directory tree, consumed in order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSpec {
  pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Entry {
  Directory { path: String },
  File { path: String },
  /// One empty file per combination of axis values substituted into `pattern`.
  FileRange { pattern: String, axes: Vec<Axis> },
  DirectoryRange { pattern: String, axes: Vec<Axis> },
}

/// Upper bound on the values a single axis may produce.
const MAX_AXIS_VALUES: u64 = 10_000;
/// Upper bound on the entries a single range entry may expand to.
const MAX_RANGE_ENTRIES: usize = 100_000;
const MAX_WIDTH: usize = 32;

/// A named set of values substituted for `{name}` in a range pattern.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawAxis")]
pub enum Axis {
  /// Inclusive numeric range, zero-padded to `width` digits.
  Range {
    name: String,
    start: u32,
    end: u32,
    #[serde(default)]
    width: usize,
  },
  Values {
    name: String,
    values: Vec<String>,
  },
}

/// On-disk form of an [`Axis`]: exactly one of `start`/`end` (with optional
/// `width`) or `values`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAxis {
  name: String,
  start: Option<u32>,
  end: Option<u32>,
  width: Option<usize>,
  values: Option<Vec<String>>,
}

impl TryFrom<RawAxis> for Axis {
  type Error = String;

  fn try_from(raw: RawAxis) -> std::result::Result<Self, Self::Error> {
    match (raw.start, raw.end, raw.width, raw.values) {
      (Some(start), Some(end), width, None) => Ok(Axis::Range {
        name: raw.name,
        start,
        end,
        width: width.unwrap_or(0),
      }),
      (None, None, None, Some(values)) => Ok(Axis::Values {
        name: raw.name,
        values,
      }),
      _ => Err(format!(
        "axis `{}` needs either `start` and `end` (with optional `width`) or `values`",
        raw.name
      )),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
  Directory,
  File,
}

/// A concrete entry of an expanded layout, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedEntry {
  pub kind: PathKind,
  pub path: PathBuf,
}

impl LayoutSpec {
  pub fn new() -> Self {
    Self::default()
  }

  /// Loads a layout from a JSON file.
  pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
    let raw = fs::read_to_string(path)
      .with_context(|| format!("Failed to read layout file {}", path.display()))?;

    serde_json::from_str(&raw)
      .with_context(|| format!("Failed to parse layout file {}", path.display()))
  }

  pub fn with_directory(mut self, path: impl Into<String>) -> Self {
    self.entries.push(Entry::Directory { path: path.into() });
    self
  }

  pub fn with_file(mut self, path: impl Into<String>) -> Self {
    self.entries.push(Entry::File { path: path.into() });
    self
  }

  pub fn with_files<I, S>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.entries.extend(
      paths
        .into_iter()
        .map(|path| Entry::File { path: path.into() }),
    );
    self
  }

  pub fn with_file_range(mut self, pattern: impl Into<String>, axes: Vec<Axis>) -> Self {
    self.entries.push(Entry::FileRange {
      pattern: pattern.into(),
      axes,
    });
    self
  }

  pub fn with_directory_range(mut self, pattern: impl Into<String>, axes: Vec<Axis>) -> Self {
    self.entries.push(Entry::DirectoryRange {
      pattern: pattern.into(),
      axes,
    });
    self
  }

  /// Validates every entry and expands ranges into a flat plan.
  ///
  /// The plan keeps entry order, and range entries expand as a cross product
  /// with the first axis outermost, so the same layout always yields the same
  /// plan. Nothing touches the disk here.
  ///
  /// # Errors
  ///
  /// Returns [`FixtureError::InvalidPath`] for absolute, empty or traversing
  /// paths and [`FixtureError::InvalidPattern`] for malformed range entries.
  pub fn expand(&self) -> Result<Vec<PlannedEntry>> {
    let mut plan = Vec::new();

    for entry in &self.entries {
      match entry {
        Entry::Directory { path } => plan.push(PlannedEntry::directory(relative_path(path)?)),
        Entry::File { path } => plan.push(PlannedEntry::file(relative_path(path)?)),
        Entry::FileRange { pattern, axes } => {
          for name in expand_pattern(pattern, axes)? {
            plan.push(PlannedEntry::file(relative_path(&name)?));
          }
        }
        Entry::DirectoryRange { pattern, axes } => {
          for name in expand_pattern(pattern, axes)? {
            plan.push(PlannedEntry::directory(relative_path(&name)?));
          }
        }
      }
    }

    Ok(plan)
  }

  /// Every relative path the layout leaves on disk, including ancestors that
  /// directory entries create implicitly.
  pub fn expected_paths(&self) -> Result<BTreeMap<PathBuf, PathKind>> {
    let mut expected = BTreeMap::new();

    for entry in self.expand()? {
      if entry.kind == PathKind::Directory {
        for ancestor in entry.path.ancestors().skip(1) {
          if ancestor.as_os_str().is_empty() {
            break;
          }
          expected.insert(ancestor.to_path_buf(), PathKind::Directory);
        }
      }
      expected.insert(entry.path, entry.kind);
    }

    Ok(expected)
  }
}

impl Axis {
  pub fn range(name: impl Into<String>, start: u32, end: u32) -> Self {
    Self::padded(name, start, end, 0)
  }

  pub fn padded(name: impl Into<String>, start: u32, end: u32, width: usize) -> Self {
    Axis::Range {
      name: name.into(),
      start,
      end,
      width,
    }
  }

  pub fn values<I, S>(name: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Axis::Values {
      name: name.into(),
      values: values.into_iter().map(Into::into).collect(),
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Axis::Range { name, .. } | Axis::Values { name, .. } => name,
    }
  }

  fn rendered_values(&self, pattern: &str) -> Result<Vec<String>> {
    match self {
      Axis::Range {
        name,
        start,
        end,
        width,
      } => {
        if start > end {
          return Err(invalid_pattern(
            pattern,
            format!("axis `{name}` has an empty range {start}..={end}"),
          ));
        }
        if u64::from(*end - *start) + 1 > MAX_AXIS_VALUES {
          return Err(invalid_pattern(
            pattern,
            format!("axis `{name}` has more than {MAX_AXIS_VALUES} values"),
          ));
        }
        if *width > MAX_WIDTH {
          return Err(invalid_pattern(
            pattern,
            format!("axis `{name}` is wider than {MAX_WIDTH} digits"),
          ));
        }
        Ok(
          (*start..=*end)
            .map(|n| format!("{n:0width$}", width = *width))
            .collect(),
        )
      }
      Axis::Values { name, values } => {
        if values.is_empty() {
          return Err(invalid_pattern(
            pattern,
            format!("axis `{name}` has no values"),
          ));
        }
        if values.len() as u64 > MAX_AXIS_VALUES {
          return Err(invalid_pattern(
            pattern,
            format!("axis `{name}` has more than {MAX_AXIS_VALUES} values"),
          ));
        }
        Ok(values.clone())
      }
    }
  }
}

impl PlannedEntry {
  pub fn directory(path: PathBuf) -> Self {
    Self {
      kind: PathKind::Directory,
      path,
    }
  }

  pub fn file(path: PathBuf) -> Self {
    Self {
      kind: PathKind::File,
      path,
    }
  }
}

enum Segment<'a> {
  Literal(&'a str),
  Axis(usize),
}

/// Splits `pattern` into literals and placeholders resolved to axis indices.
fn parse_pattern<'a>(pattern: &'a str, axes: &[Axis]) -> Result<Vec<Segment<'a>>> {
  let mut segments = Vec::new();
  let mut used = vec![false; axes.len()];
  let mut rest = pattern;

  while let Some(open) = rest.find('{') {
    let literal = &rest[..open];
    if literal.contains('}') {
      return Err(invalid_pattern(pattern, "unmatched `}`"));
    }
    if !literal.is_empty() {
      segments.push(Segment::Literal(literal));
    }

    let after = &rest[open + 1..];
    let close = after
      .find('}')
      .ok_or_else(|| invalid_pattern(pattern, "unterminated placeholder"))?;
    let name = &after[..close];
    if name.is_empty() || name.contains('{') {
      return Err(invalid_pattern(pattern, "malformed placeholder"));
    }

    let index = axes
      .iter()
      .position(|axis| axis.name() == name)
      .ok_or_else(|| invalid_pattern(pattern, format!("no axis named `{name}`")))?;
    used[index] = true;
    segments.push(Segment::Axis(index));

    rest = &after[close + 1..];
  }

  if rest.contains('}') {
    return Err(invalid_pattern(pattern, "unmatched `}`"));
  }
  if !rest.is_empty() {
    segments.push(Segment::Literal(rest));
  }

  if let Some(unused) = axes.iter().zip(&used).find(|(_, used)| !**used) {
    return Err(invalid_pattern(
      pattern,
      format!("axis `{}` is never used", unused.0.name()),
    ));
  }

  Ok(segments)
}

/// Renders `pattern` once per combination of axis values.
fn expand_pattern(pattern: &str, axes: &[Axis]) -> Result<Vec<String>> {
  if axes.is_empty() {
    return Err(invalid_pattern(pattern, "range entry has no axes"));
  }

  let mut names = HashSet::new();
  for axis in axes {
    if !names.insert(axis.name()) {
      return Err(invalid_pattern(
        pattern,
        format!("axis `{}` is declared twice", axis.name()),
      ));
    }
  }

  let segments = parse_pattern(pattern, axes)?;
  let values = axes
    .iter()
    .map(|axis| axis.rendered_values(pattern))
    .collect::<Result<Vec<_>>>()?;

  let total = values
    .iter()
    .try_fold(1usize, |total, axis_values| total.checked_mul(axis_values.len()));
  if !matches!(total, Some(total) if total <= MAX_RANGE_ENTRIES) {
    return Err(invalid_pattern(
      pattern,
      format!("range expands to more than {MAX_RANGE_ENTRIES} entries"),
    ));
  }

  let mut combos: Vec<Vec<&str>> = vec![Vec::new()];
  for axis_values in &values {
    combos = combos
      .into_iter()
      .flat_map(|prefix| {
        axis_values.iter().map(move |value| {
          let mut next = prefix.clone();
          next.push(value.as_str());
          next
        })
      })
      .collect();
  }

  Ok(
    combos
      .iter()
      .map(|combo| {
        segments
          .iter()
          .map(|segment| match segment {
            Segment::Literal(text) => *text,
            Segment::Axis(index) => combo[*index],
          })
          .collect::<String>()
      })
      .collect(),
  )
}

/// Converts a layout path into a relative `PathBuf` that cannot escape the
/// output root.
pub(crate) fn relative_path(raw: &str) -> Result<PathBuf> {
  if raw.trim().is_empty() {
    return Err(invalid_path(raw, "path is empty"));
  }

  let mut path = PathBuf::new();
  for component in Path::new(raw).components() {
    match component {
      Component::Normal(part) => path.push(part),
      Component::ParentDir => return Err(invalid_path(raw, "path traverses above the root")),
      Component::CurDir => return Err(invalid_path(raw, "path contains a `.` component")),
      Component::RootDir | Component::Prefix(_) => {
        return Err(invalid_path(raw, "path must be relative"))
      }
    }
  }

  Ok(path)
}

fn invalid_path(path: &str, reason: &'static str) -> FixtureError {
  FixtureError::InvalidPath {
    path: path.to_string(),
    reason,
  }
}

fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> FixtureError {
  FixtureError::InvalidPattern {
    pattern: pattern.to_string(),
    reason: reason.into(),
  }
}
