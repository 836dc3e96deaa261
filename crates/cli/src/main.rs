//! `weir` command line entry point.

mod cli;
mod commands;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::{CacheAction, Cli, Command, ConfigAction};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	match cli.command {
		Command::Cache { action } => match action {
			CacheAction::Inspect { file } => commands::inspect(&file, &mut out)?,
			CacheAction::Verify { file } => commands::verify(&file, &mut out)?,
			CacheAction::Upgrade { file, out: target } => commands::upgrade(&file, target.as_deref(), &mut out)?,
		},
		Command::Config { action } => match action {
			ConfigAction::Check { file } => commands::check_config(&file, &mut out)?,
		},
	}
	out.flush()?;
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| if verbose { EnvFilter::new("weir=debug,info") } else { EnvFilter::new("weir=info,warn") })
	};

	// WEIR_LOG_DIR mirrors logs to a per-process file.
	if let Some(log_dir) = std::env::var("WEIR_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("weir.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);
			let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

			tracing_subscriber::registry().with(filter()).with(file_layer).with(stderr_layer).init();
			tracing::debug!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt().with_env_filter(filter()).with_writer(std::io::stderr).init();
}
