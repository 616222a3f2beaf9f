use crate::layout::{Axis, LayoutSpec};

pub const RENAMER_ROOT: &str = "renamer_test_files";
pub const FOLDERIFY_ROOT: &str = "folderify_test";

/// File names a renamer has to clean up: odd separators, brackets, casing,
/// stray whitespace and missing extensions.
const RENAMER_FILES: [&str; 16] = [
  "periods.in.between.words.(2007).txt",
  "hyphens-in-between-words-500MB.txt",
  "underscores_in_between_words_[1080p].txt",
  "Mixed CASE Words With Spaces.txt",
  "multiple   spaces    between   words.txt",
  "trailing whitespace .txt",
  "square[brackets]around[words].txt",
  "curly{braces}around{words}.txt",
  "(parentheses) around (words).txt",
  "plus+signs+between+words.txt",
  "ampersand & and symbol.txt",
  "apostrophe's in word's.txt",
  "comma,separated,words,2019.txt",
  "UPPERCASE EXTENSION.TXT",
  "double..periods..between..words.txt",
  "no_extension_file",
];

/// Flat directory of awkwardly named empty files.
pub fn renamer() -> LayoutSpec {
  LayoutSpec::new().with_files(RENAMER_FILES)
}

/// Nested empty folders to delete, a merge target with per-year folders and
/// per-month files, and loose files to wrap in folders.
pub fn folderify() -> LayoutSpec {
  LayoutSpec::new()
    .with_directory("Delete_empty_folder_01/Delete_empty_folder_02/Delete_empty_folder_03")
    .with_directory("Merge_folder")
    .with_directory_range("Merge_folder/{year}", vec![Axis::range("year", 2020, 2030)])
    .with_file_range(
      "Merge_folder/{year}_{month}.{ext}",
      vec![
        Axis::range("year", 2020, 2022),
        Axis::padded("month", 1, 12, 2),
        Axis::values("ext", ["txt", "png"]),
      ],
    )
    .with_file_range("Folderify_{index}.txt", vec![Axis::padded("index", 1, 5, 2)])
}
