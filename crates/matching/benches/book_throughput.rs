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

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use askbook_matching::{MatchingEngine, Operation, Order};

const BOOK_SIZES: &[u64] = &[1_000, 10_000, 100_000];

/// Deterministic spread of prices over 100 levels
fn price_for(id: u64) -> i64 {
	1_000 + ((id * 7_919) % 100) as i64
}

fn filled_engine(size: u64) -> MatchingEngine {
	let mut engine = MatchingEngine::default();
	for id in 0..size {
		engine
			.process(Some(Order::sell(id, price_for(id), 10, 0)), Operation::Insert)
			.expect("insert sell order");
	}
	engine
}

fn bench_insert(c: &mut Criterion) {
	let mut group = c.benchmark_group("insert");
	for &size in BOOK_SIZES {
		group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
			b.iter(|| black_box(filled_engine(size)));
		});
	}
	group.finish();
}

fn bench_cancel(c: &mut Criterion) {
	let mut group = c.benchmark_group("cancel");
	for &size in BOOK_SIZES {
		group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
			b.iter_batched(
				|| filled_engine(size),
				|mut engine| {
					for id in (0..size).step_by(10) {
						engine
							.process(Some(Order::sell(id, 0, 0, 0)), Operation::Cancel)
							.expect("cancel");
					}
					engine
				},
				criterion::BatchSize::LargeInput,
			);
		});
	}
	group.finish();
}

fn bench_sweep(c: &mut Criterion) {
	let mut group = c.benchmark_group("match_sweep");
	for &size in BOOK_SIZES {
		group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
			b.iter_batched(
				|| filled_engine(size),
				|mut engine| {
					let fills = engine
						.process(Some(Order::buy(u64::MAX, 1_050, size * 5, 0)), Operation::Match)
						.expect("match");
					black_box(fills)
				},
				criterion::BatchSize::LargeInput,
			);
		});
	}
	group.finish();
}

criterion_group!(benches, bench_insert, bench_cancel, bench_sweep);
criterion_main!(benches);
