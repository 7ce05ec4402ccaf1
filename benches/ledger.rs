// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for the rental ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Eligibility evaluation and fee calculation
//! - Single-threaded rent/return cycles
//! - Transaction log growth
//! - Contention on a shared ledger

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rental_ledger::eligibility::{evaluate_borrowing, evaluate_safety};
use rental_ledger::fee::{late_fee, rental_fee};
use rental_ledger::{
    Catalog, Classification, Domain, Hazard, Item, Ledger, Patron, SharedLedger,
};
use rust_decimal_macros::dec;
use std::thread;

// =============================================================================
// Helper Functions
// =============================================================================

fn library(books: usize, patrons: usize) -> Ledger {
    let catalog = Catalog::with_items(
        (0..books).map(|i| Item::fiction_book(&format!("B{i}"), "Title", "Author", "Fantasy")),
    )
    .unwrap();
    let mut ledger = Ledger::with_catalog(Domain::Library, catalog);
    for i in 0..patrons {
        ledger
            .register_patron(Patron::new(format!("P{i}").as_str(), "Patron", Classification::Faculty))
            .unwrap();
    }
    ledger
}

// =============================================================================
// Rules and Fees
// =============================================================================

fn bench_rules(c: &mut Criterion) {
    let patron = Patron::new("P1", "Ada", Classification::Graduate);
    let book = Item::fiction_book("111", "Dune", "Frank Herbert", "Science Fiction");

    c.bench_function("evaluate_safety", |b| {
        b.iter(|| evaluate_safety(Hazard::WindSpeed, Classification::Intermediate, black_box(22)))
    });
    c.bench_function("evaluate_borrowing", |b| {
        b.iter(|| evaluate_borrowing(&patron, &book, black_box(45)))
    });
}

fn bench_fees(c: &mut Criterion) {
    let board = Item::windsurf_board("W1", "Freeride", dec!(25.0), dec!(90), "Single").unwrap();
    let book = Item::non_fiction_book("333", "Concrete Mathematics", "Donald Knuth", "Mathematics");

    c.bench_function("rental_fee", |b| b.iter(|| rental_fee(&board, black_box(3))));
    c.bench_function("late_fee", |b| b.iter(|| late_fee(&book, black_box(36))));
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_rent_return_cycle(c: &mut Criterion) {
    c.bench_function("rent_return_cycle", |b| {
        let mut ledger = library(1, 1);
        b.iter(|| {
            ledger.create_transaction("P0", "B0", black_box(20), None).unwrap();
            ledger.process_return(black_box("B0"))
        })
    });
}

fn bench_transaction_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction_throughput");

    for count in [100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let mut ledger = library(count, 10);
                for i in 0..count {
                    ledger
                        .create_transaction(&format!("P{}", i % 10), &format!("B{i}"), 7, None)
                        .unwrap();
                }
                ledger
            })
        });
    }

    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_contention");

    for threads in [1, 2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &threads| {
            b.iter(|| {
                let ledger = SharedLedger::new(library(threads, threads));
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let ledger = ledger.clone();
                        thread::spawn(move || {
                            let patron = format!("P{t}");
                            let book = format!("B{t}");
                            for _ in 0..100 {
                                ledger.create_transaction(&patron, &book, 20, None).unwrap();
                                ledger.process_return(&book);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(rules, bench_rules, bench_fees,);

criterion_group!(single_threaded, bench_rent_return_cycle, bench_transaction_throughput,);

criterion_group!(multi_threaded, bench_contention,);

criterion_main!(rules, single_threaded, multi_threaded);
