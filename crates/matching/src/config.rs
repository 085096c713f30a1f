// Copyright 2025 chenjjiaa
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

use serde::{Deserialize, Serialize};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log file name prefix and log directory component name
pub const LOG_COMPONENT_NAME: &str = "askbook";

/// Default console output enabled. Logs go to stderr; stdout carries the book.
pub const DEFAULT_LOG_TO_CONSOLE: bool = true;

/// Prefix of environment variables read by [`RunnerConfig`]
pub const ENV_PREFIX: &str = "ASKBOOK";

/// Batch runner configuration
///
/// Every field is optional in the sources; missing ones fall back to
/// [`RunnerConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
	/// Log every command and the book after it
	pub verbose_logging: bool,
	/// Log level used when RUST_LOG is not set
	pub log_level: String,
	/// Root directory for daily-rolling log files; file logging is off when unset
	pub log_dir: Option<String>,
	/// Mirror logs to stderr
	pub log_to_console: bool,
}

impl Default for RunnerConfig {
	fn default() -> Self {
		Self {
			verbose_logging: false,
			log_level: DEFAULT_LOG_LEVEL.to_string(),
			log_dir: None,
			log_to_console: DEFAULT_LOG_TO_CONSOLE,
		}
	}
}

impl RunnerConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file, with environment variables on top
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()?;

		cfg.try_deserialize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_config() {
		let config = RunnerConfig::default();
		assert!(!config.verbose_logging);
		assert_eq!(config.log_level, "warn");
		assert_eq!(config.log_dir, None);
		assert!(config.log_to_console);
	}

	#[test]
	fn test_from_file_fills_missing_fields() {
		let path = std::env::temp_dir().join(format!("askbook-config-{}.toml", std::process::id()));
		std::fs::write(&path, "verbose_logging = true\nlog_dir = \"/tmp/askbook-logs\"\n").unwrap();

		let config = RunnerConfig::from_file(path.to_str().unwrap()).unwrap();
		std::fs::remove_file(&path).ok();

		assert!(config.verbose_logging);
		assert_eq!(config.log_dir.as_deref(), Some("/tmp/askbook-logs"));
		assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
		assert!(config.log_to_console);
	}

	#[test]
	fn test_from_file_missing() {
		assert!(RunnerConfig::from_file("/nonexistent/askbook-config.toml").is_err());
	}
}
