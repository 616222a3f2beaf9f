use std::{
  io,
  path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors produced while expanding a layout or materializing it on disk.
#[derive(Debug, Error)]
pub enum FixtureError {
  /// An underlying filesystem operation failed.
  #[error("I/O error at `{}`: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// A file's parent directory (or the output root) does not exist.
  #[error("parent directory missing for `{}`", .0.display())]
  NotFound(PathBuf),

  #[error("invalid layout path `{path}`: {reason}")]
  InvalidPath { path: String, reason: &'static str },

  #[error("invalid pattern `{pattern}`: {reason}")]
  InvalidPattern { pattern: String, reason: String },

  /// The tree under the root differs from what the layout describes.
  #[error(
    "fixture tree under `{}` does not match layout ({} missing, {} unexpected, {} non-empty)",
    .root.display(),
    .missing.len(),
    .unexpected.len(),
    .non_empty.len()
  )]
  Mismatch {
    root: PathBuf,
    /// Expected paths that are absent or have the wrong kind.
    missing: Vec<PathBuf>,
    unexpected: Vec<PathBuf>,
    /// Expected files that exist but hold content.
    non_empty: Vec<PathBuf>,
  },
}

pub type Result<T> = std::result::Result<T, FixtureError>;

/// Wraps an `io::Error` with the path it happened on.
pub fn io_at(path: &Path) -> impl FnOnce(io::Error) -> FixtureError {
  let path = path.to_path_buf();
  move |source| FixtureError::Io { path, source }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_io_error_mentions_path() {
    let err = io_at(Path::new("some/dir"))(io::Error::new(
      io::ErrorKind::PermissionDenied,
      "denied",
    ));

    let message = err.to_string();
    assert!(message.contains("some/dir"));
    assert!(message.contains("denied"));
  }

  #[test]
  fn test_mismatch_reports_counts() {
    let err = FixtureError::Mismatch {
      root: PathBuf::from("root"),
      missing: vec![PathBuf::from("a"), PathBuf::from("b")],
      unexpected: vec![PathBuf::from("c")],
      non_empty: vec![],
    };

    assert!(err
      .to_string()
      .contains("2 missing, 1 unexpected, 0 non-empty"));
  }
}
