use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "weir")]
#[command(about = "Inspect and maintain weir federation caches")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Work with persisted cache artifacts
	Cache {
		#[command(subcommand)]
		action: CacheAction,
	},
	/// Work with federation config files
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
	/// Decode a cache artifact and summarise it
	Inspect {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
	/// Decode a cache artifact and check its topological ordering
	Verify {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
	/// Rewrite a cache artifact at the current schema version
	Upgrade {
		#[arg(value_name = "FILE")]
		file: PathBuf,
		/// Write here instead of replacing FILE
		#[arg(long, short, value_name = "FILE")]
		out: Option<PathBuf>,
	},
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
	/// Parse and validate a federation config
	Check {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
}
