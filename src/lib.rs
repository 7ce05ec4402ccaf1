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

//! # Rental Ledger
//!
//! This library provides a rental and circulation engine shared by three
//! subsystems: sports equipment rental, windsurf gear rental and library
//! circulation.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Evaluates requests, records transactions and processes returns
//! - [`Catalog`]: Items in insertion order, owner of item availability
//! - [`Patron`]: Customer or patron with a [`Classification`] and borrow counters
//! - [`RuleChain`]: Ordered eligibility rules (safety or borrowing)
//! - [`fee`]: Rental and late fees per [`ItemKind`]
//! - [`Domain`]: Per-subsystem configuration of the above
//!
//! ## Example
//!
//! ```
//! use rental_ledger::{Catalog, Classification, Domain, EligibilityStatus, Item, Ledger, Patron};
//! use rust_decimal_macros::dec;
//!
//! let catalog = Catalog::with_items([
//!     Item::sports_equipment("E001", "Professional Tennis Racket", dec!(15.0), dec!(12.5), "Racket").unwrap(),
//! ])
//! .unwrap();
//! let mut ledger = Ledger::with_catalog(Domain::Equipment, catalog);
//! ledger.register_patron(Patron::new("C1", "Sam", Classification::Beginner)).unwrap();
//!
//! // Rent for 3 hours at condition level 10
//! let tx = ledger.create_transaction("C1", "E001", 3, Some(10)).unwrap();
//! assert_eq!(tx.status(), EligibilityStatus::Approved);
//! assert_eq!(tx.cost(), dec!(51.75));
//! assert!(!ledger.catalog().find("E001").unwrap().is_available());
//! ```
//!
//! ## Thread Safety
//!
//! The engine is synchronous and single-threaded. Wrap a [`Ledger`] in a
//! [`SharedLedger`] to serialize access from several threads.

mod base;
pub mod catalog;
pub mod eligibility;
pub mod error;
pub mod fee;
mod item;
mod ledger;
mod patron;
mod policy;
mod transaction;

pub use base::{ItemId, PatronId, TransactionId};
pub use catalog::{Catalog, ItemStore, NoopStore};
pub use eligibility::{Eligibility, EligibilityStatus, Hazard, RuleChain};
pub use error::LedgerError;
pub use item::{FICTION_DAILY_RATE, Item, ItemKind, NON_FICTION_DAILY_RATE};
pub use ledger::{Ledger, ReturnOutcome, SharedLedger};
pub use patron::{Classification, Patron};
pub use policy::{Domain, ReturnPolicy};
pub use transaction::{Transaction, TransactionState};
