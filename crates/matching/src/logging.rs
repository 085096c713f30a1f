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

//! Logging initialization for the batch runner
//!
//! # Configuration
//!
//! - `RUST_LOG`: log level filter, falling back to [`RunnerConfig::log_level`]
//!   (default `warn`). Can be set per target: `RUST_LOG=engine=debug,trade=info`
//! - `verbose_logging`: adds an `engine=debug` directive on top of the filter,
//!   so per-command engine logs show up without touching `RUST_LOG`
//! - `log_dir` (`ASKBOOK_LOG_DIR`): when set, logs are also written to
//!   `{log_dir}/askbook/askbook.{date}.log`, rotated daily (UTC)
//! - `log_to_console` (`ASKBOOK_LOG_TO_CONSOLE`): mirror logs to stderr
//!   (default `true`)
//!
//! stdout is never used for logs; it carries the final book.

use std::{path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, filter::Directive, fmt, layer::SubscriberExt, registry::Registry,
	util::SubscriberInitExt,
};

use crate::config::{LOG_COMPONENT_NAME, RunnerConfig};

/// Directive enabled by `verbose_logging`
pub const VERBOSE_DIRECTIVE: &str = "engine=debug";

// Store log guard to prevent log loss on program exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Setup daily-rolling file logging in `log_dir`
///
/// Files are named `{component}.{date}.log`, e.g. `askbook.2026-01-03.log`.
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix(".log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with optional file output and optional stderr output
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(config: &RunnerConfig) -> Result<()> {
	let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
	let mut filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
	if config.verbose_logging {
		let directive: Directive = VERBOSE_DIRECTIVE
			.parse()
			.context("Failed to parse verbose log directive")?;
		filter = filter.add_directive(directive);
	}

	let log_dir = match &config.log_dir {
		Some(root) => {
			let dir = Path::new(root).join(LOG_COMPONENT_NAME);
			std::fs::create_dir_all(&dir)
				.with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
			Some(dir)
		}
		None => None,
	};

	let file_layer = match &log_dir {
		Some(dir) => {
			let file_writer = setup_file_logging(dir)?;
			Some(
				fmt::layer()
					.with_writer(file_writer)
					.with_timer(fmt::time::UtcTime::rfc_3339())
					.with_thread_ids(true)
					.with_target(true)
					.with_ansi(false),
			)
		}
		None => None,
	};

	let console_layer = config.log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_target(true)
			.with_ansi(true)
	});

	Registry::default()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(target: "server", "Log level: {}", log_level);
	if let Some(dir) = &log_dir {
		info!(
			target: "server",
			"Log file base name: {}/{}.YYYY-MM-DD.log (daily rolling)",
			dir.display(),
			LOG_COMPONENT_NAME
		);
	}

	Ok(())
}
