use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for writing JSON layout files programmatically
pub struct LayoutFileBuilder {
  temp_dir: TempDir,
  entries: Vec<Value>,
}

impl LayoutFileBuilder {
  /// Create a new layout builder backed by a temporary directory
  pub fn new() -> Result<Self> {
    Ok(Self {
      temp_dir: TempDir::new()?,
      entries: Vec::new(),
    })
  }

  pub fn with_directory(mut self, path: &str) -> Self {
    self
      .entries
      .push(json!({ "type": "directory", "path": path }));
    self
  }

  pub fn with_file(mut self, path: &str) -> Self {
    self.entries.push(json!({ "type": "file", "path": path }));
    self
  }

  /// Start a `file_range` entry; finish it with [`RangeBuilder::done`]
  pub fn with_file_range(self, pattern: &str) -> RangeBuilder {
    RangeBuilder {
      layout: self,
      entry_type: "file_range",
      pattern: pattern.to_string(),
      axes: Vec::new(),
    }
  }

  pub fn with_directory_range(self, pattern: &str) -> RangeBuilder {
    RangeBuilder {
      layout: self,
      entry_type: "directory_range",
      pattern: pattern.to_string(),
      axes: Vec::new(),
    }
  }

  /// Write `<name>.json` and return the directory holding it with its path
  pub fn build(self, name: &str) -> Result<(TempDir, PathBuf)> {
    let path = self.temp_dir.path().join(format!("{}.json", name));
    let document = json!({ "entries": self.entries });
    fs::write(&path, serde_json::to_string_pretty(&document)?)?;
    Ok((self.temp_dir, path))
  }
}

pub struct RangeBuilder {
  layout: LayoutFileBuilder,
  entry_type: &'static str,
  pattern: String,
  axes: Vec<Value>,
}

impl RangeBuilder {
  pub fn with_range(mut self, name: &str, start: u32, end: u32, width: usize) -> Self {
    self.axes.push(json!({
      "name": name,
      "start": start,
      "end": end,
      "width": width,
    }));
    self
  }

  pub fn with_values(mut self, name: &str, values: &[&str]) -> Self {
    self.axes.push(json!({ "name": name, "values": values }));
    self
  }

  /// Finish this range and return to the layout builder
  pub fn done(mut self) -> LayoutFileBuilder {
    self.layout.entries.push(json!({
      "type": self.entry_type,
      "pattern": self.pattern,
      "axes": self.axes,
    }));
    self.layout
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_layout_file_builder_writes_entries() {
    let (_temp, path) = LayoutFileBuilder::new()
      .unwrap()
      .with_directory("docs")
      .with_file("docs/readme.txt")
      .build("simple")
      .unwrap();

    assert!(path.ends_with("simple.json"));
    let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entries = document["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["type"], "file");
    assert_eq!(entries[1]["path"], "docs/readme.txt");
  }

  #[test]
  fn test_layout_file_builder_ranges() {
    let (_temp, path) = LayoutFileBuilder::new()
      .unwrap()
      .with_file_range("{n}.{ext}")
      .with_range("n", 1, 3, 2)
      .with_values("ext", &["txt", "png"])
      .done()
      .with_directory_range("{y}")
      .with_range("y", 2020, 2021, 0)
      .done()
      .build("ranges")
      .unwrap();

    let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &document["entries"][0];
    assert_eq!(entry["type"], "file_range");
    assert_eq!(entry["axes"][0]["width"], 2);
    assert_eq!(entry["axes"][1]["values"][1], "png");
    assert_eq!(document["entries"][1]["type"], "directory_range");
  }
}
