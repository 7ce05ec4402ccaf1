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

//! Concurrency tests for [`SharedLedger`] using parking_lot's deadlock detector.
//!
//! The ledger is guarded by a single `parking_lot::Mutex`, so a request's
//! eligibility check and the availability change it triggers happen under
//! one lock. These tests race threads over the same items and check that
//! every item is handed out at most once.

use parking_lot::deadlock;
use rust_decimal_macros::dec;
use rental_ledger::{
    Catalog, Classification, Domain, Item, Ledger, LedgerError, Patron, ReturnOutcome,
    SharedLedger,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

fn start_deadlock_detector() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    thread::spawn(move || {
        while running_clone.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
            let deadlocks = deadlock::check_deadlock();
            if !deadlocks.is_empty() {
                eprintln!("\n=== DEADLOCK DETECTED ===");
                for (i, threads) in deadlocks.iter().enumerate() {
                    eprintln!("\nDeadlock #{}", i + 1);
                    for t in threads {
                        eprintln!("Thread ID: {:?}", t.thread_id());
                        eprintln!("Backtrace:\n{:#?}", t.backtrace());
                    }
                }
                panic!("Deadlock detected! See output above for details.");
            }
        }
    });

    running
}

fn shared(
    domain: Domain,
    items: Vec<Item>,
    patrons: u32,
    classification: Classification,
) -> SharedLedger {
    let mut ledger = Ledger::with_catalog(domain, Catalog::with_items(items).unwrap());
    for i in 0..patrons {
        ledger
            .register_patron(Patron::new(
                format!("P{i}").as_str(),
                format!("Patron {i}"),
                classification,
            ))
            .unwrap();
    }
    SharedLedger::new(ledger)
}

#[test]
fn racing_renters_get_one_item_once() {
    let detector = start_deadlock_detector();
    let item = Item::sports_equipment("E001", "Racket", dec!(15.0), dec!(9.0), "Racket").unwrap();
    let ledger = shared(Domain::Equipment, vec![item], 16, Classification::Advanced);
    let granted = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let ledger = ledger.clone();
            let granted = granted.clone();
            thread::spawn(move || {
                match ledger.create_transaction(&format!("P{i}"), "E001", 2, Some(10)) {
                    Ok(_) => {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(LedgerError::ItemUnavailable(_)) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    detector.store(false, Ordering::SeqCst);

    assert_eq!(granted.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.transactions().len(), 1);
    assert!(ledger.list_available().is_empty());
}

#[test]
fn racing_borrowers_record_one_approval() {
    let detector = start_deadlock_detector();
    let book = Item::fiction_book("111", "Dune", "Frank Herbert", "Science Fiction");
    let ledger = shared(Domain::Library, vec![book], 8, Classification::Graduate);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                ledger
                    .create_transaction(&format!("P{i}"), "111", 10, None)
                    .unwrap()
            })
        })
        .collect();

    let statuses: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().status())
        .collect();
    detector.store(false, Ordering::SeqCst);

    let approved = statuses
        .iter()
        .filter(|s| s.as_str() == "APPROVED")
        .count();
    assert_eq!(approved, 1);
    assert_eq!(statuses.len(), 8);

    let mut ids: Vec<_> = ledger.transactions().iter().map(|tx| tx.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

#[test]
fn concurrent_rent_and_return_cycles_stay_consistent() {
    let detector = start_deadlock_detector();
    let items: Vec<_> = (0..4)
        .map(|i| Item::fiction_book(&format!("B{i}"), "Title", "Author", "Mystery"))
        .collect();
    let ledger = shared(Domain::Library, items, 4, Classification::Faculty);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                let patron = format!("P{i}");
                let book = format!("B{i}");
                for _ in 0..50 {
                    ledger.create_transaction(&patron, &book, 20, None).unwrap();
                    let outcome = ledger.process_return(&book);
                    assert!(matches!(outcome, ReturnOutcome::Returned { units_overdue: 6, .. }));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    detector.store(false, Ordering::SeqCst);

    assert_eq!(ledger.transactions().len(), 200);
    assert_eq!(ledger.list_available().len(), 4);
    ledger.with(|l| {
        assert_eq!(l.open_transactions().count(), 0);
        assert!(l.patrons().all(|p| p.active_items() == 0));
    });
}
