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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Caller-assigned order identifier
pub type OrderId = u64;
/// Integer unit price, compared exactly
pub type Price = i64;
/// Order size in whole units
pub type Quantity = u64;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Buy,
	Sell,
}

impl Side {
	/// Map the wire-format `is_buy` flag to a side
	pub fn from_is_buy(is_buy: bool) -> Self {
		if is_buy { Side::Buy } else { Side::Sell }
	}
}

/// Operation applied to an order by the matching engine
///
/// The set is closed: any name outside `cancel`, `insert` and `match`
/// is rejected at the parsing boundary with
/// [`MatchingError::UnknownOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
	Cancel,
	Insert,
	Match,
}

impl Operation {
	pub fn as_str(&self) -> &'static str {
		match self {
			Operation::Cancel => "cancel",
			Operation::Insert => "insert",
			Operation::Match => "match",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Operation {
	type Err = MatchingError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"cancel" => Ok(Operation::Cancel),
			"insert" => Ok(Operation::Insert),
			"match" => Ok(Operation::Match),
			other => Err(MatchingError::UnknownOperation(other.to_string())),
		}
	}
}

/// Order handled by the matching engine
///
/// Identity, price, quantity, side and time never change after
/// construction. The only mutable state is the unfilled quantity, which
/// only ever decreases, and the arrival sequence stamped by the book when
/// a sell order starts resting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	id: OrderId,
	price: Price,
	quantity: Quantity,
	unfilled_quantity: Quantity,
	side: Side,
	/// Caller-supplied timestamp. Stored and echoed, never used for priority.
	time: i64,
	/// Arrival token assigned by the book; 0 until the order rests
	sequence: u64,
}

impl Order {
	pub fn new(id: OrderId, price: Price, quantity: Quantity, side: Side, time: i64) -> Self {
		Self {
			id,
			price,
			quantity,
			unfilled_quantity: quantity,
			side,
			time,
			sequence: 0,
		}
	}

	/// Convenience constructor for a sell order
	pub fn sell(id: OrderId, price: Price, quantity: Quantity, time: i64) -> Self {
		Self::new(id, price, quantity, Side::Sell, time)
	}

	/// Convenience constructor for a buy order
	pub fn buy(id: OrderId, price: Price, quantity: Quantity, time: i64) -> Self {
		Self::new(id, price, quantity, Side::Buy, time)
	}

	pub fn id(&self) -> OrderId {
		self.id
	}

	pub fn price(&self) -> Price {
		self.price
	}

	pub fn quantity(&self) -> Quantity {
		self.quantity
	}

	pub fn unfilled_quantity(&self) -> Quantity {
		self.unfilled_quantity
	}

	pub fn side(&self) -> Side {
		self.side
	}

	pub fn is_buy(&self) -> bool {
		self.side == Side::Buy
	}

	pub fn time(&self) -> i64 {
		self.time
	}

	pub fn sequence(&self) -> u64 {
		self.sequence
	}

	pub fn is_filled(&self) -> bool {
		self.unfilled_quantity == 0
	}

	/// Fill up to `quantity` units and return how many were actually filled
	///
	/// The unfilled quantity never drops below zero.
	pub fn fill(&mut self, quantity: Quantity) -> Quantity {
		let filled = quantity.min(self.unfilled_quantity);
		self.unfilled_quantity -= filled;
		filled
	}

	pub(crate) fn set_sequence(&mut self, sequence: u64) {
		self.sequence = sequence;
	}
}

impl fmt::Display for Order {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Order(id: {}, price: {}, quantity: {}, unfilled_quantity: {}, is_buy: {}, time: {})",
			self.id,
			self.price,
			self.quantity,
			self.unfilled_quantity,
			self.is_buy(),
			self.time
		)
	}
}

/// Error types for matching operations
///
/// Every variant is a contract violation: the engine validates before it
/// mutates, so the book is unchanged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchingError {
	#[error("Operation {0} was not configured correctly")]
	UnknownOperation(String),
	#[error("Cannot {operation} order {order_id}: wrong side {side:?}")]
	InvalidSide {
		operation: Operation,
		order_id: OrderId,
		side: Side,
	},
	#[error("Order {0} is already resting in the book")]
	DuplicateOrder(OrderId),
	#[error("Invalid order: {0}")]
	InvalidOrder(String),
}
