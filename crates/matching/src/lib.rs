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

//! Askbook Matching Engine
//!
//! A single-sided limit order book. Sell orders rest in price-time
//! priority; buy orders are matched against them on arrival and never rest.
//!
//! Architecture:
//! - `orderbook`: the ordered index of resting sells
//! - `matcher`: the engine that owns the index and runs the crossing logic
//! - `protocol` and `batch`: the line-oriented batch format and its runner
//! - Single-threaded throughout; callers serialize access to an engine

pub mod batch;
pub mod config;
pub mod logging;
pub mod matcher;
pub mod orderbook;
pub mod protocol;
pub mod types;

pub use batch::{BatchError, BatchSummary};
pub use matcher::{EngineConfig, MatchingEngine};
pub use orderbook::{PriceLevel, PriceTimePriorityIndex};
pub use types::*;
