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

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
	matcher::MatchingEngine,
	protocol::{self, Command, ProtocolError},
	types::MatchingError,
};

/// Error types for a batch run
///
/// All of them abort the run. Commands before the failing one stay applied.
#[derive(Debug, Error)]
pub enum BatchError {
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	#[error("Line {line}: {source}")]
	Matching {
		line: usize,
		#[source]
		source: MatchingError,
	},
	#[error("Failed to write output: {0}")]
	Output(#[from] io::Error),
}

/// Counters reported at the end of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
	pub commands: usize,
	/// Resting orders touched by matches, full or partial
	pub fills: usize,
	pub resting: usize,
}

/// Apply parsed commands to the engine in order, stopping at the first error
pub fn apply_commands(
	engine: &mut MatchingEngine,
	commands: Vec<Command>,
) -> Result<BatchSummary, BatchError> {
	let mut summary = BatchSummary::default();

	for command in commands {
		let Command {
			line,
			order,
			operation,
		} = command;
		let buy_id = order.id();

		let fills = engine
			.process_raw(Some(order), &operation)
			.map_err(|source| {
				warn!(target: "engine", "Aborting at line {}: {}", line, source);
				BatchError::Matching { line, source }
			})?;

		for fill in &fills {
			info!(
				target: "trade",
				"Buy {} filled against sell {} at {}, {} of {} left resting",
				buy_id,
				fill.id(),
				fill.price(),
				fill.unfilled_quantity(),
				fill.quantity()
			);
		}

		summary.commands += 1;
		summary.fills += fills.len();
	}

	summary.resting = engine.book().len();
	Ok(summary)
}

/// Read a batch, apply it and write the resting book
pub fn run<R: BufRead, W: Write>(
	engine: &mut MatchingEngine,
	reader: R,
	writer: W,
) -> Result<BatchSummary, BatchError> {
	let commands = protocol::read_commands(reader)?;
	info!(target: "server", "Read {} commands", commands.len());

	let summary = apply_commands(engine, commands)?;
	protocol::write_orders(writer, engine.book().iter())?;

	info!(
		target: "server",
		"Processed {} commands, {} fills, {} orders resting",
		summary.commands,
		summary.fills,
		summary.resting
	);
	Ok(summary)
}
