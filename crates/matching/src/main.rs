// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Batch runner entry point
//!
//! Reads a command batch from a file (or stdin), applies it to a fresh
//! book and prints the resting sell orders to stdout.

use std::{
	fs::File,
	io::{self, BufReader},
	path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use askbook_matching::{
	EngineConfig, MatchingEngine, batch,
	config::{ENV_PREFIX, RunnerConfig},
	logging,
};

#[derive(Debug, Parser)]
#[command(name = "askbook-matching", version, about = "Run a batch of orders through a sell-side book")]
struct Args {
	/// Batch input file; reads stdin when omitted
	input: Option<PathBuf>,

	/// Settings file (toml, yaml or json)
	#[arg(short, long)]
	config: Option<String>,

	/// Log every command and the book after it
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let args = Args::parse();

	// Env errors are reported once logging is up
	let (mut config, env_error) = match &args.config {
		Some(path) => {
			let config = RunnerConfig::from_file(path)
				.with_context(|| format!("Failed to load config from {}", path))?;
			(config, None)
		}
		None => match RunnerConfig::from_env() {
			Ok(config) => (config, None),
			Err(err) => (RunnerConfig::default(), Some(err)),
		},
	};
	if args.verbose {
		config.verbose_logging = true;
	}

	logging::init_logging(&config)?;

	if let Some(err) = env_error {
		warn!(
			target: "server",
			"Ignoring {}_* environment ({}). Using default configuration",
			ENV_PREFIX,
			err
		);
	}

	let mut engine = MatchingEngine::new(EngineConfig {
		verbose_logging: config.verbose_logging,
	});
	let stdout = io::stdout().lock();

	let summary = match &args.input {
		Some(path) => {
			info!(target: "server", "Reading batch from {}", path.display());
			let file = File::open(path)
				.with_context(|| format!("Failed to open {}", path.display()))?;
			batch::run(&mut engine, BufReader::new(file), stdout)?
		}
		None => {
			info!(target: "server", "Reading batch from stdin");
			batch::run(&mut engine, io::stdin().lock(), stdout)?
		}
	};

	info!(target: "server", "Done: {} orders resting", summary.resting);
	Ok(())
}
