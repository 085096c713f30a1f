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

use tracing::debug;

use crate::orderbook::PriceTimePriorityIndex;
use crate::types::{MatchingError, Operation, Order, Side};

/// Configuration for the matching engine
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
	/// Log every command and the resulting book at debug level
	pub verbose_logging: bool,
}

/// Matching engine that applies price-time priority to a sell-side book
///
/// The engine is the sole owner and mutator of its book. Sell orders rest
/// until filled or canceled; buy orders are matched on arrival and whatever
/// does not fill is dropped.
///
/// Design characteristics:
/// - No concurrent access: every operation takes `&mut self`
/// - Validation happens before any mutation
/// - A buy crosses every resting sell priced at or below its limit
pub struct MatchingEngine {
	book: PriceTimePriorityIndex,
	config: EngineConfig,
}

impl MatchingEngine {
	pub fn new(config: EngineConfig) -> Self {
		Self {
			book: PriceTimePriorityIndex::new(),
			config,
		}
	}

	pub fn book(&self) -> &PriceTimePriorityIndex {
		&self.book
	}

	/// Apply an operation to an order
	///
	/// A missing order is a no-op. `Insert` and `Cancel` return an empty
	/// list; `Match` returns the post-fill state of every resting order it
	/// touched, in the order they were filled.
	pub fn process(
		&mut self,
		order: Option<Order>,
		operation: Operation,
	) -> Result<Vec<Order>, MatchingError> {
		let Some(order) = order else {
			return Ok(Vec::new());
		};

		if self.config.verbose_logging {
			debug!(target: "engine", "Processing {} {}", operation, order);
		}

		let fills = match operation {
			Operation::Cancel => {
				self.cancel(&order);
				Vec::new()
			}
			Operation::Insert => {
				self.book.insert(order)?;
				Vec::new()
			}
			Operation::Match => self.match_buy(&order)?,
		};

		if self.config.verbose_logging {
			debug!(target: "engine", "Orderbook: {}", self.book.render());
		}

		Ok(fills)
	}

	/// Apply an operation given by name
	///
	/// This is the boundary for untrusted input: an unknown operation name is
	/// rejected with [`MatchingError::UnknownOperation`]. A missing order
	/// returns before the name is looked at.
	pub fn process_raw(
		&mut self,
		order: Option<Order>,
		operation: &str,
	) -> Result<Vec<Order>, MatchingError> {
		if order.is_none() {
			return Ok(Vec::new());
		}
		let operation = operation.parse::<Operation>()?;
		self.process(order, operation)
	}

	fn cancel(&mut self, order: &Order) {
		match self.book.delete_by_id(order.id()) {
			Some(removed) => {
				debug!(target: "engine", "Canceled order {} with {} unfilled", removed.id(), removed.unfilled_quantity());
			}
			None => {
				debug!(target: "engine", "Cancel of unknown order {} ignored", order.id());
			}
		}
	}

	/// Match a buy order against resting sells
	///
	/// Walks the book from the cheapest order while quantity remains and the
	/// resting price does not exceed the buy limit. Fully filled orders leave
	/// the book; a partially filled order keeps its place. Any quantity left
	/// on the buy order afterwards is discarded.
	pub fn match_buy(&mut self, order: &Order) -> Result<Vec<Order>, MatchingError> {
		if order.side() != Side::Buy {
			return Err(MatchingError::InvalidSide {
				operation: Operation::Match,
				order_id: order.id(),
				side: order.side(),
			});
		}

		let mut fills = Vec::new();
		let mut remaining = order.quantity();

		while remaining > 0 {
			let Some(level) = self.book.best_level_mut() else {
				break;
			};
			if level.price() > order.price() {
				break;
			}
			let Some((touched, filled)) = level.fill_front(remaining) else {
				break;
			};
			remaining -= filled;

			if touched.is_filled() {
				self.book.forget(touched.id());
				self.book.prune_best_level();
			}
			fills.push(touched);
		}

		if remaining > 0 && self.config.verbose_logging {
			debug!(
				target: "engine",
				"Buy order {} left {} of {} unfilled, discarding",
				order.id(),
				remaining,
				order.quantity()
			);
		}

		Ok(fills)
	}
}

impl Default for MatchingEngine {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}
