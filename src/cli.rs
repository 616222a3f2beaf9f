use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fixturegen")]
#[command(
  version,
  about = "Materialize declarative file/folder layouts as reproducible test fixtures"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
  /// Generate the file renamer fixtures (default root: renamer_test_files)
  Renamer(TargetArgs),

  /// Generate the folderify fixtures (default root: folderify_test)
  Folderify(TargetArgs),

  /// Generate fixtures from a JSON layout file
  Layout(LayoutArgs),
}

#[derive(Args)]
pub struct LayoutArgs {
  /// JSON layout file
  pub file: PathBuf,

  #[command(flatten)]
  pub target: TargetArgs,
}

#[derive(Args)]
pub struct TargetArgs {
  /// Output root; wiped and recreated before the build
  #[arg(long, short = 'o')]
  pub root: Option<PathBuf>,

  /// Print the expanded layout instead of touching the disk
  #[arg(long)]
  pub list: bool,

  /// Print the listing as JSON
  #[arg(long, requires = "list")]
  pub json: bool,
}
