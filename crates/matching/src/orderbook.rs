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

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::types::{MatchingError, Operation, Order, OrderId, Price, Quantity, Side};

/// Price level in the order book
///
/// A price level contains all resting orders at a specific price,
/// maintained in arrival order (first-in-first-out).
#[derive(Debug, Clone)]
pub struct PriceLevel {
	price: Price,
	orders: VecDeque<Order>,
	/// Sum of unfilled quantity of all orders at this level
	total_quantity: Quantity,
}

impl PriceLevel {
	fn new(price: Price) -> Self {
		Self {
			price,
			orders: VecDeque::new(),
			total_quantity: 0,
		}
	}

	pub fn price(&self) -> Price {
		self.price
	}

	fn push_back(&mut self, order: Order) {
		self.total_quantity += order.unfilled_quantity();
		self.orders.push_back(order);
	}

	fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
		let pos = self.orders.iter().position(|o| o.id() == order_id)?;
		let order = self.orders.remove(pos)?;
		self.total_quantity -= order.unfilled_quantity();
		Some(order)
	}

	/// Fill the front order by up to `quantity` units
	///
	/// Returns the post-fill state of the touched order and the filled
	/// amount. A fully filled order is popped off the level.
	pub(crate) fn fill_front(&mut self, quantity: Quantity) -> Option<(Order, Quantity)> {
		let front = self.orders.front_mut()?;
		let filled = front.fill(quantity);
		self.total_quantity -= filled;

		if front.is_filled() {
			let order = self.orders.pop_front()?;
			Some((order, filled))
		} else {
			Some((front.clone(), filled))
		}
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}

	pub fn total_quantity(&self) -> Quantity {
		self.total_quantity
	}

	pub fn order_count(&self) -> usize {
		self.orders.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Order> {
		self.orders.iter()
	}
}

/// Resting sell orders kept in price-time priority
///
/// Orders are sorted by price ascending; within a price they keep the
/// order in which they were inserted. The caller-supplied `time` plays no
/// part in this: each insert is stamped with the next value of an internal
/// arrival sequence instead.
///
/// Layout:
/// - `levels`: price (low to high) -> FIFO queue of orders
/// - `locator`: order id -> price, so cancels go straight to their level
///
/// Single-threaded: every mutation goes through `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct PriceTimePriorityIndex {
	levels: BTreeMap<Price, PriceLevel>,
	locator: HashMap<OrderId, Price>,
	next_sequence: u64,
}

impl PriceTimePriorityIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a sell order behind every resting order with a price `<=` its own
	///
	/// Fails without touching the book if the order is a buy, has zero
	/// quantity, reuses the id of an order that is still resting, or would
	/// push its level's total quantity past `Quantity::MAX`.
	///
	/// The legacy batch driver accepted zero-quantity and duplicate-id inserts
	/// and rested them anyway; both are rejected here so that every resting
	/// order has something left to fill and ids stay unique.
	pub fn insert(&mut self, mut order: Order) -> Result<(), MatchingError> {
		if order.side() != Side::Sell {
			return Err(MatchingError::InvalidSide {
				operation: Operation::Insert,
				order_id: order.id(),
				side: order.side(),
			});
		}
		if order.unfilled_quantity() == 0 {
			return Err(MatchingError::InvalidOrder(format!(
				"order {} has nothing left to fill",
				order.id()
			)));
		}
		if self.locator.contains_key(&order.id()) {
			return Err(MatchingError::DuplicateOrder(order.id()));
		}

		let price = order.price();
		let level_quantity = self.level_quantity(price).unwrap_or(0);
		if level_quantity.checked_add(order.unfilled_quantity()).is_none() {
			return Err(MatchingError::InvalidOrder(format!(
				"order {} overflows the quantity resting at price {}",
				order.id(),
				price
			)));
		}

		self.next_sequence += 1;
		order.set_sequence(self.next_sequence);

		self.locator.insert(order.id(), price);
		self.levels
			.entry(price)
			.or_insert_with(|| PriceLevel::new(price))
			.push_back(order);

		Ok(())
	}

	/// Remove the resting order with this id
	///
	/// Unknown ids are not an error; the call simply returns `None`.
	pub fn delete_by_id(&mut self, order_id: OrderId) -> Option<Order> {
		let price = self.locator.remove(&order_id)?;
		let level = self.levels.get_mut(&price)?;
		let order = level.remove_order(order_id);

		if level.is_empty() {
			self.levels.remove(&price);
		}

		order
	}

	/// Traverse resting orders, cheapest first and FIFO within a price
	pub fn iter(&self) -> impl Iterator<Item = &Order> {
		self.levels.values().flat_map(|level| level.iter())
	}

	pub fn get(&self, order_id: OrderId) -> Option<&Order> {
		let price = self.locator.get(&order_id)?;
		self.levels
			.get(price)?
			.iter()
			.find(|o| o.id() == order_id)
	}

	pub fn contains(&self, order_id: OrderId) -> bool {
		self.locator.contains_key(&order_id)
	}

	pub fn len(&self) -> usize {
		self.locator.len()
	}

	pub fn is_empty(&self) -> bool {
		self.locator.is_empty()
	}

	/// Get the best (lowest) resting price
	pub fn best_price(&self) -> Option<Price> {
		self.levels.first_key_value().map(|(price, _)| *price)
	}

	pub fn level_count(&self) -> usize {
		self.levels.len()
	}

	/// Get the aggregated unfilled quantity at a price
	pub fn level_quantity(&self, price: Price) -> Option<Quantity> {
		self.levels.get(&price).map(PriceLevel::total_quantity)
	}

	/// Get depth snapshot (top N price levels, cheapest first)
	pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
		self.levels
			.values()
			.take(depth)
			.map(|level| (level.price(), level.total_quantity()))
			.collect()
	}

	/// Get mutable reference to the best level
	pub(crate) fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
		self.levels.first_entry().map(|entry| entry.into_mut())
	}

	/// Drop the best level if it has run out of orders
	pub(crate) fn prune_best_level(&mut self) {
		if let Some(entry) = self.levels.first_entry()
			&& entry.get().is_empty()
		{
			entry.remove();
		}
	}

	pub(crate) fn forget(&mut self, order_id: OrderId) {
		self.locator.remove(&order_id);
	}

	/// Render the book on one line, `None`-terminated
	pub fn render(&self) -> String {
		let mut out = String::new();
		for order in self.iter() {
			out.push_str(&order.to_string());
			out.push_str(" -> ");
		}
		out.push_str("None");
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(book: &PriceTimePriorityIndex) -> Vec<OrderId> {
		book.iter().map(Order::id).collect()
	}

	#[test]
	fn test_insert_and_delete() {
		let mut book = PriceTimePriorityIndex::new();

		book.insert(Order::sell(1, 50000, 1, 0)).unwrap();

		assert_eq!(book.best_price(), Some(50000));
		assert_eq!(book.len(), 1);

		let removed = book.delete_by_id(1);
		assert_eq!(removed.map(|o| o.id()), Some(1));
		assert!(book.is_empty());
		assert_eq!(book.best_price(), None);
		assert_eq!(book.level_count(), 0);
	}

	#[test]
	fn test_price_priority() {
		let mut book = PriceTimePriorityIndex::new();

		book.insert(Order::sell(1, 50000, 1, 0)).unwrap();
		book.insert(Order::sell(2, 51000, 1, 0)).unwrap();
		book.insert(Order::sell(3, 49000, 1, 0)).unwrap();

		assert_eq!(ids(&book), vec![3, 1, 2]);
		assert_eq!(book.best_price(), Some(49000));

		book.delete_by_id(3);
		assert_eq!(book.best_price(), Some(50000));
	}

	#[test]
	fn test_time_priority_at_same_price() {
		let mut book = PriceTimePriorityIndex::new();

		book.insert(Order::sell(1, 10, 1, 0)).unwrap();
		book.insert(Order::sell(2, 5, 1, 0)).unwrap();
		book.insert(Order::sell(3, 10, 1, 0)).unwrap();
		book.insert(Order::sell(4, 10, 1, 0)).unwrap();
		book.insert(Order::sell(5, 5, 1, 0)).unwrap();

		assert_eq!(ids(&book), vec![2, 5, 1, 3, 4]);

		let sequences: Vec<u64> = book.iter().map(Order::sequence).collect();
		assert_eq!(sequences, vec![2, 5, 1, 3, 4]);
	}

	#[test]
	fn test_time_field_does_not_affect_priority() {
		// Arrival order wins even when the caller's timestamps say otherwise
		let mut book = PriceTimePriorityIndex::new();

		book.insert(Order::sell(1, 10, 1, 900)).unwrap();
		book.insert(Order::sell(2, 10, 1, 100)).unwrap();

		assert_eq!(ids(&book), vec![1, 2]);
	}

	#[test]
	fn test_insert_rejects_buy_order() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, 1, 0)).unwrap();

		let err = book.insert(Order::buy(2, 10, 1, 0)).unwrap_err();

		assert!(matches!(
			err,
			MatchingError::InvalidSide {
				operation: Operation::Insert,
				order_id: 2,
				side: Side::Buy
			}
		));
		assert_eq!(ids(&book), vec![1]);
	}

	#[test]
	fn test_insert_rejects_duplicate_id() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, 5, 0)).unwrap();

		let err = book.insert(Order::sell(1, 8, 2, 0)).unwrap_err();

		assert_eq!(err, MatchingError::DuplicateOrder(1));
		assert_eq!(book.len(), 1);
		assert_eq!(book.best_price(), Some(10));
	}

	#[test]
	fn test_insert_rejects_zero_quantity() {
		let mut book = PriceTimePriorityIndex::new();

		let err = book.insert(Order::sell(1, 10, 0, 0)).unwrap_err();

		assert!(matches!(err, MatchingError::InvalidOrder(_)));
		assert!(book.is_empty());
	}

	#[test]
	fn test_insert_rejects_level_quantity_overflow() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, u64::MAX, 0)).unwrap();

		let err = book.insert(Order::sell(2, 10, 1, 0)).unwrap_err();

		assert!(matches!(err, MatchingError::InvalidOrder(_)));
		assert_eq!(ids(&book), vec![1]);
		assert_eq!(book.level_quantity(10), Some(u64::MAX));

		// Other levels keep their own totals
		book.insert(Order::sell(3, 11, u64::MAX, 0)).unwrap();
		assert_eq!(book.depth_snapshot(2), vec![(10, u64::MAX), (11, u64::MAX)]);
	}

	#[test]
	fn test_id_reusable_after_delete() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, 5, 0)).unwrap();
		book.delete_by_id(1);

		book.insert(Order::sell(1, 12, 5, 0)).unwrap();
		assert_eq!(book.get(1).map(Order::price), Some(12));
	}

	#[test]
	fn test_delete_unknown_is_noop() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, 5, 0)).unwrap();

		assert!(book.delete_by_id(99).is_none());
		assert_eq!(ids(&book), vec![1]);
	}

	#[test]
	fn test_delete_from_middle_of_level() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, 1, 0)).unwrap();
		book.insert(Order::sell(2, 10, 2, 0)).unwrap();
		book.insert(Order::sell(3, 10, 3, 0)).unwrap();

		book.delete_by_id(2);

		assert_eq!(ids(&book), vec![1, 3]);
		assert_eq!(book.level_quantity(10), Some(4));
		assert_eq!(book.best_level_mut().map(|level| level.order_count()), Some(2));
	}

	#[test]
	fn test_iter_is_restartable() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 20, 1, 0)).unwrap();
		book.insert(Order::sell(2, 10, 1, 0)).unwrap();

		let first: Vec<OrderId> = book.iter().map(Order::id).collect();
		let second: Vec<OrderId> = book.iter().map(Order::id).collect();
		assert_eq!(first, second);
	}

	#[test]
	fn test_depth_snapshot() {
		let mut book = PriceTimePriorityIndex::new();

		book.insert(Order::sell(1, 50000, 1, 0)).unwrap();
		book.insert(Order::sell(2, 51000, 2, 0)).unwrap();
		book.insert(Order::sell(3, 49000, 3, 0)).unwrap();
		book.insert(Order::sell(4, 49000, 4, 0)).unwrap();

		let depth = book.depth_snapshot(2);
		assert_eq!(depth, vec![(49000, 7), (50000, 1)]);
	}

	#[test]
	fn test_fill_front_partial_and_full() {
		let mut book = PriceTimePriorityIndex::new();
		book.insert(Order::sell(1, 10, 5, 0)).unwrap();

		let level = book.best_level_mut().unwrap();
		let (touched, filled) = level.fill_front(3).unwrap();
		assert_eq!((touched.id(), touched.unfilled_quantity(), filled), (1, 2, 3));
		assert_eq!(level.total_quantity(), 2);

		let (touched, filled) = level.fill_front(3).unwrap();
		assert_eq!((touched.id(), touched.unfilled_quantity(), filled), (1, 0, 2));
		assert!(level.is_empty());
	}

	#[test]
	fn test_render() {
		let mut book = PriceTimePriorityIndex::new();
		assert_eq!(book.render(), "None");

		book.insert(Order::sell(1, 10, 5, 3)).unwrap();
		assert_eq!(
			book.render(),
			"Order(id: 1, price: 10, quantity: 5, unfilled_quantity: 5, is_buy: false, time: 3) -> None"
		);
	}
}
