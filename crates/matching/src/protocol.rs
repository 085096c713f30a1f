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

//! Batch command protocol
//!
//! Input is a command count `N` followed by `N` lines of six
//! whitespace-separated fields:
//!
//! ```text
//! id price quantity is_buy time operation
//! ```
//!
//! Output is one line per resting order, in book order:
//!
//! ```text
//! id price quantity unfilled_quantity is_buy time
//! ```
//!
//! The operation name is kept as text here and validated by the engine,
//! so an unknown name fails when its command is applied rather than when
//! the batch is read.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::types::{Order, Side};

/// Errors raised while reading a batch
#[derive(Debug, Error)]
pub enum ProtocolError {
	#[error("Failed to read input: {0}")]
	Io(#[from] io::Error),
	#[error("Input does not start with a command count")]
	MissingCount,
	#[error("Line {line}: {reason}")]
	Malformed { line: usize, reason: String },
	#[error("Expected {expected} commands, found {found}")]
	UnexpectedEof { expected: usize, found: usize },
}

/// A single parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	/// 1-based input line number, for error reporting
	pub line: usize,
	pub order: Order,
	pub operation: String,
}

/// Parse a boolean the way the batch files spell them
///
/// Accepts `y yes t true on 1` and `n no f false off 0`, ignoring case.
pub fn parse_bool(value: &str) -> Option<bool> {
	match value.to_ascii_lowercase().as_str() {
		"y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
		"n" | "no" | "f" | "false" | "off" | "0" => Some(false),
		_ => None,
	}
}

fn field<T: std::str::FromStr>(line: usize, name: &str, value: &str) -> Result<T, ProtocolError> {
	value.parse().map_err(|_| ProtocolError::Malformed {
		line,
		reason: format!("invalid {name} '{value}'"),
	})
}

/// Parse one command line
pub fn parse_command(line: usize, text: &str) -> Result<Command, ProtocolError> {
	let fields: Vec<&str> = text.split_whitespace().collect();
	let &[id, price, quantity, is_buy, time, operation] = fields.as_slice() else {
		return Err(ProtocolError::Malformed {
			line,
			reason: format!("expected 6 fields, found {}", fields.len()),
		});
	};

	let is_buy = parse_bool(is_buy).ok_or_else(|| ProtocolError::Malformed {
		line,
		reason: format!("invalid is_buy '{is_buy}'"),
	})?;

	let order = Order::new(
		field(line, "id", id)?,
		field(line, "price", price)?,
		field(line, "quantity", quantity)?,
		Side::from_is_buy(is_buy),
		field(line, "time", time)?,
	);

	Ok(Command {
		line,
		order,
		operation: operation.to_string(),
	})
}

/// Read a whole batch
///
/// Blank lines are skipped. Anything after the `N`th command is ignored.
pub fn read_commands<R: BufRead>(reader: R) -> Result<Vec<Command>, ProtocolError> {
	let mut lines = reader
		.lines()
		.enumerate()
		.map(|(idx, line)| line.map(|text| (idx + 1, text)));
	let mut next_line = move || -> Result<Option<(usize, String)>, ProtocolError> {
		for line in lines.by_ref() {
			let (number, text) = line?;
			if !text.trim().is_empty() {
				return Ok(Some((number, text)));
			}
		}
		Ok(None)
	};

	let (count_line, count_text) = next_line()?.ok_or(ProtocolError::MissingCount)?;
	let expected: usize = field(count_line, "command count", count_text.trim())?;

	let mut commands = Vec::with_capacity(expected);
	while commands.len() < expected {
		let Some((number, text)) = next_line()? else {
			return Err(ProtocolError::UnexpectedEof {
				expected,
				found: commands.len(),
			});
		};
		commands.push(parse_command(number, &text)?);
	}

	Ok(commands)
}

fn format_bool(value: bool) -> &'static str {
	if value { "True" } else { "False" }
}

/// Format one resting order as an output line (without newline)
pub fn format_order(order: &Order) -> String {
	format!(
		"{} {} {} {} {} {}",
		order.id(),
		order.price(),
		order.quantity(),
		order.unfilled_quantity(),
		format_bool(order.is_buy()),
		order.time()
	)
}

/// Write every order, one per line
pub fn write_orders<'a, W, I>(mut writer: W, orders: I) -> io::Result<()>
where
	W: Write,
	I: IntoIterator<Item = &'a Order>,
{
	for order in orders {
		writeln!(writer, "{}", format_order(order))?;
	}
	writer.flush()
}
