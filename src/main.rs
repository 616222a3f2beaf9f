mod builder;
mod cli;
mod error;
mod layout;
mod presets;

use anyhow::{Context, Result};
use builder::FixtureBuilder;
use clap::Parser;
use cli::{Cli, Commands};
use layout::{LayoutSpec, PathKind};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();

  if let Err(e) = run() {
    eprintln!("Error: {:?}", e);
    std::process::exit(1);
  }
}

fn run() -> Result<()> {
  let cli = Cli::parse();

  let (spec, target, default_root) = match cli.command {
    Commands::Renamer(target) => (
      presets::renamer(),
      target,
      PathBuf::from(presets::RENAMER_ROOT),
    ),
    Commands::Folderify(target) => (
      presets::folderify(),
      target,
      PathBuf::from(presets::FOLDERIFY_ROOT),
    ),
    Commands::Layout(args) => {
      let spec = LayoutSpec::from_json_file(&args.file)?;
      let default_root = default_layout_root(&args.file)?;
      (spec, args.target, default_root)
    }
  };

  if target.list {
    return list(&spec, target.json);
  }

  let root = target.root.unwrap_or(default_root);
  let builder = FixtureBuilder::new(&root);

  builder
    .reset()
    .with_context(|| format!("Failed to reset fixture directory {}", root.display()))?;

  let created = builder
    .build(&spec)
    .with_context(|| format!("Failed to build fixtures under {}", root.display()))?;

  builder
    .verify(&spec)
    .context("Generated fixtures do not match the layout")?;

  println!(
    "✓ Created {} entries under {}",
    created,
    builder.root().display()
  );

  Ok(())
}

/// A layout file `trees/nested.json` builds into `./nested` unless `--root`
/// says otherwise.
///
/// The derived root must be a single plain directory name: stems such as `.`
/// or `..` would point `reset` at the working directory or its parent.
fn default_layout_root(file: &Path) -> Result<PathBuf> {
  let stem = file
    .file_stem()
    .and_then(|stem| stem.to_str())
    .with_context(|| format!("Cannot derive an output root from {}", file.display()))?;

  let root = layout::relative_path(stem)
    .with_context(|| format!("Cannot derive an output root from {}; pass --root", file.display()))?;
  if root.components().count() != 1 {
    anyhow::bail!(
      "Cannot derive an output root from {}; pass --root",
      file.display()
    );
  }

  Ok(root)
}

fn list(spec: &LayoutSpec, json: bool) -> Result<()> {
  let plan = spec.expand().context("Invalid layout")?;

  if json {
    let rendered = serde_json::to_string_pretty(&plan).context("Failed to serialize layout")?;
    println!("{}", rendered);
    return Ok(());
  }

  for entry in &plan {
    let marker = match entry.kind {
      PathKind::Directory => "dir ",
      PathKind::File => "file",
    };
    println!("  [{}] {}", marker, entry.path.display());
  }
  println!("\n{} entries", plan.len());

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_layout_root_uses_file_stem() {
    let root = default_layout_root(Path::new("trees/nested.json")).unwrap();
    assert_eq!(root, PathBuf::from("nested"));
  }

  #[test]
  fn test_default_layout_root_rejects_dot_stems() {
    for name in ["..json", "...json", "dir/..json"] {
      let err = default_layout_root(Path::new(name)).unwrap_err();
      assert!(
        err.to_string().contains("pass --root"),
        "{name} should not yield a root: {err:?}"
      );
    }
  }
}
