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

//! Transaction ledger.
//!
//! The [`Ledger`] is the central component. It owns the catalog, the
//! registered patrons and the append-only transaction log, and it is the
//! only place where item availability and patron counters change.
//!
//! # Creating a transaction
//!
//! 1. The domain's rule chain evaluates the request.
//! 2. The next sequential ID is allocated and an `Open` transaction recorded.
//! 3. If the domain lets the status proceed, the item is marked out, the
//!    patron's active count goes up and the fee is charged.
//!
//! # Returning an item
//!
//! The item is marked available, the latest open transaction that handed it
//! out is closed with its late fee, and the patron's active count goes down.
//! Returning something unknown or not out is a no-op with zero fee.
//!
//! # Thread Safety
//!
//! A [`Ledger`] is single-threaded. [`SharedLedger`] puts the whole ledger
//! behind one [`parking_lot::Mutex`] so the check-then-act sequence in
//! [`Ledger::create_transaction`] stays atomic across threads.

use crate::base::{PatronId, TransactionId};
use crate::catalog::Catalog;
use crate::error::LedgerError;
use crate::fee;
use crate::item::Item;
use crate::patron::Patron;
use crate::policy::{Domain, ReturnPolicy};
use crate::transaction::{Transaction, TransactionState};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Result of [`Ledger::process_return`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// No item with that ID is catalogued.
    ItemNotFound,
    /// The item exists but no open transaction handed it out.
    NoActiveTransaction,
    Returned {
        transaction_id: TransactionId,
        reference: String,
        units_overdue: u32,
        late_fee: Decimal,
        surcharged: bool,
    },
}

impl ReturnOutcome {
    /// Fee owed for this return; zero for the no-op outcomes.
    pub fn fee(&self) -> Decimal {
        match self {
            Self::Returned { late_fee, .. } => *late_fee,
            Self::ItemNotFound | Self::NoActiveTransaction => Decimal::ZERO,
        }
    }
}

impl fmt::Display for ReturnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemNotFound => f.write_str("item not found in catalog"),
            Self::NoActiveTransaction => f.write_str("no active transaction found for this item"),
            Self::Returned {
                reference,
                units_overdue,
                late_fee,
                surcharged,
                ..
            } => {
                write!(
                    f,
                    "returned {reference}: {units_overdue} overdue, late fee {:.2}",
                    late_fee
                )?;
                if *surcharged {
                    f.write_str(" (excessive overdue surcharge applied)")?;
                }
                Ok(())
            }
        }
    }
}

/// Rental/circulation ledger for one domain.
///
/// # Invariants
///
/// - Transaction IDs are sequential from 1 and never reused.
/// - Transactions are only appended, never removed.
/// - An item is unavailable exactly while an open, handed-out transaction references it.
/// - A transaction moves `Open` -> `Returned` at most once.
#[derive(Debug)]
pub struct Ledger {
    domain: Domain,
    policy: ReturnPolicy,
    catalog: Catalog,
    /// Registered patrons in registration order.
    patrons: Vec<Patron>,
    /// Append-only transaction log.
    transactions: Vec<Transaction>,
    next_id: TransactionId,
}

impl Ledger {
    /// Creates a ledger with an empty catalog.
    pub fn new(domain: Domain) -> Self {
        Self::with_catalog(domain, Catalog::new())
    }

    /// Creates a ledger over an existing catalog.
    pub fn with_catalog(domain: Domain, catalog: Catalog) -> Self {
        Ledger {
            domain,
            policy: ReturnPolicy::default(),
            catalog,
            patrons: Vec::new(),
            transactions: Vec::new(),
            next_id: TransactionId(1),
        }
    }

    /// Replaces the default overdue and surcharge settings.
    pub fn with_policy(mut self, policy: ReturnPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn policy(&self) -> &ReturnPolicy {
        &self.policy
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Adds an item to the catalog.
    ///
    /// # Errors
    ///
    /// See [`Catalog::add`].
    pub fn add_item(&mut self, item: Item) -> Result<(), LedgerError> {
        self.catalog.add(item)
    }

    /// Registers a patron so transactions can reference it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicatePatron`] if the ID is taken.
    pub fn register_patron(&mut self, patron: Patron) -> Result<(), LedgerError> {
        if self.patron(patron.id().as_str()).is_some() {
            return Err(LedgerError::DuplicatePatron(patron.id().clone()));
        }
        self.patrons.push(patron);
        Ok(())
    }

    pub fn patron(&self, id: &str) -> Option<&Patron> {
        self.patrons.iter().find(|p| p.id().as_str() == id)
    }

    /// Records an overdue item against a registered patron.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PatronNotFound`] if the patron is not registered.
    pub fn record_overdue(&mut self, patron_id: &str) -> Result<(), LedgerError> {
        self.patron_mut(patron_id)?.add_overdue();
        Ok(())
    }

    /// Clears one overdue item for a registered patron.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PatronNotFound`] if the patron is not registered.
    pub fn clear_overdue(&mut self, patron_id: &str) -> Result<(), LedgerError> {
        self.patron_mut(patron_id)?.remove_overdue();
        Ok(())
    }

    fn patron_mut(&mut self, id: &str) -> Result<&mut Patron, LedgerError> {
        self.patrons
            .iter_mut()
            .find(|p| p.id().as_str() == id)
            .ok_or_else(|| LedgerError::PatronNotFound(PatronId::new(id)))
    }

    /// Registered patrons in registration order.
    pub fn patrons(&self) -> impl Iterator<Item = &Patron> {
        self.patrons.iter()
    }

    /// Evaluates and records a rental or loan request.
    ///
    /// The transaction is recorded whatever the eligibility status. Only a
    /// status the domain lets proceed takes the item out, bumps the patron's
    /// active count and charges `cost`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PatronNotFound`] - patron is not registered.
    /// - [`LedgerError::ItemNotFound`] - item is not catalogued.
    /// - [`LedgerError::ItemUnavailable`] - rental domains only: the item is already out.
    ///   The library chain reports this as a DENIED transaction instead.
    /// - [`LedgerError::AmountOverflow`] - the fee does not fit in a `Decimal`.
    ///   Nothing is recorded.
    pub fn create_transaction(
        &mut self,
        patron_id: &str,
        item_id: &str,
        duration: u32,
        context: Option<u32>,
    ) -> Result<Transaction, LedgerError> {
        let patron_idx = self
            .patrons
            .iter()
            .position(|p| p.id().as_str() == patron_id)
            .ok_or_else(|| LedgerError::PatronNotFound(PatronId::new(patron_id)))?;
        let item = self
            .catalog
            .find(item_id)
            .ok_or_else(|| LedgerError::ItemNotFound(item_id.into()))?;

        if !self.domain.is_day_based() && !item.is_available() {
            return Err(LedgerError::ItemUnavailable(item.id().clone()));
        }

        let patron = &self.patrons[patron_idx];
        let eligibility = self
            .domain
            .rule_chain()
            .evaluate(patron, item, duration, context);
        let cost = if self.domain.proceeds(eligibility.status()) {
            Some(fee::rental_fee(item, duration)?)
        } else {
            None
        };

        let id = self.next_id;
        self.next_id = id.next();

        let mut transaction = Transaction::open(
            id,
            self.domain.reference(id),
            patron,
            item,
            duration,
            context,
            eligibility,
        );

        if let Some(cost) = cost {
            transaction.set_cost(cost);
            let item_id = item.id().clone();
            self.catalog.mark_unavailable(item_id.as_str());
            self.patrons[patron_idx].increment_active();
        }

        tracing::info!(
            transaction = transaction.reference(),
            patron = %transaction.patron_id(),
            item = %transaction.item_id(),
            duration = transaction.duration(),
            unit = self.domain.unit(),
            status = %transaction.status(),
            cost = %transaction.cost(),
            "recorded transaction"
        );

        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Takes an item back and settles its late fee.
    ///
    /// Overdue time comes from the requested duration alone (see
    /// [`ReturnPolicy`]). In day-based domains a late fee more than
    /// `surcharge_after` days overdue is multiplied by `surcharge_rate`.
    /// A late fee too large for a `Decimal` is capped at `Decimal::MAX`.
    pub fn process_return(&mut self, item_id: &str) -> ReturnOutcome {
        if !self.catalog.mark_available(item_id) {
            tracing::warn!(item = item_id, "return for unknown item");
            return ReturnOutcome::ItemNotFound;
        }

        let domain = self.domain;
        let Some(transaction) = self
            .transactions
            .iter_mut()
            .rev()
            .filter(|tx| tx.state() == TransactionState::Open && domain.proceeds(tx.status()))
            .find(|tx| tx.item_id().matches(item_id))
        else {
            tracing::warn!(item = item_id, "no active transaction for returned item");
            return ReturnOutcome::NoActiveTransaction;
        };

        let units_overdue = self.policy.units_overdue(transaction.duration());
        let mut late_fee = Decimal::ZERO;
        let mut surcharged = false;

        if units_overdue > 0 {
            if let Some(item) = self.catalog.find(item_id) {
                late_fee = fee::late_fee(item, units_overdue).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "late fee capped");
                    Decimal::MAX
                });
            }
            if domain.is_day_based() && self.policy.surcharge_applies(units_overdue) {
                late_fee = late_fee
                    .checked_mul(self.policy.surcharge_rate)
                    .unwrap_or_else(|| {
                        tracing::warn!(item = item_id, "surcharged late fee capped");
                        Decimal::MAX
                    });
                surcharged = true;
                tracing::warn!(
                    transaction = transaction.reference(),
                    units_overdue,
                    "excessive overdue surcharge applied"
                );
            }
        }

        if let Err(e) = transaction.mark_returned(late_fee, surcharged) {
            tracing::warn!(error = %e, "return rejected");
            return ReturnOutcome::NoActiveTransaction;
        }

        let outcome = ReturnOutcome::Returned {
            transaction_id: transaction.id(),
            reference: transaction.reference().to_string(),
            units_overdue,
            late_fee,
            surcharged,
        };

        let patron_id = transaction.patron_id().clone();
        if let Some(patron) = self.patrons.iter_mut().find(|p| *p.id() == patron_id) {
            patron.decrement_active();
        }

        tracing::info!(item = item_id, %late_fee, units_overdue, "processed return");
        outcome
    }

    /// All transactions in the order they were recorded.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id() == id)
    }

    /// Transactions that handed an item out and have not been returned.
    pub fn open_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| {
            tx.state() == TransactionState::Open && self.domain.proceeds(tx.status())
        })
    }
}

/// A [`Ledger`] shared between threads behind a single lock.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// See [`Ledger::create_transaction`].
    pub fn create_transaction(
        &self,
        patron_id: &str,
        item_id: &str,
        duration: u32,
        context: Option<u32>,
    ) -> Result<Transaction, LedgerError> {
        self.inner
            .lock()
            .create_transaction(patron_id, item_id, duration, context)
    }

    /// See [`Ledger::process_return`].
    pub fn process_return(&self, item_id: &str) -> ReturnOutcome {
        self.inner.lock().process_return(item_id)
    }

    /// Snapshot of the transaction log.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().transactions().to_vec()
    }

    /// Snapshot of the available items.
    pub fn list_available(&self) -> Vec<Item> {
        self.inner.lock().catalog().list_available().cloned().collect()
    }

    /// Runs `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::EligibilityStatus;
    use crate::patron::Classification;
    use rust_decimal_macros::dec;

    fn library() -> Ledger {
        let catalog = Catalog::with_items([
            Item::fiction_book("111", "Dune", "Frank Herbert", "Science Fiction"),
            Item::non_fiction_book("222", "SPQR", "Mary Beard", "History"),
        ])
        .unwrap();
        let mut ledger = Ledger::with_catalog(Domain::Library, catalog);
        ledger
            .register_patron(Patron::new("P1", "Ada", Classification::Graduate))
            .unwrap();
        ledger
    }

    #[test]
    fn ids_are_sequential_including_denied() {
        let mut ledger = library();
        let first = ledger.create_transaction("P1", "111", 7, None).unwrap();
        let denied = ledger.create_transaction("P1", "111", 7, None).unwrap();
        let third = ledger.create_transaction("P1", "222", 7, None).unwrap();

        assert_eq!(denied.status(), EligibilityStatus::Denied);
        assert_eq!(
            [first.id(), denied.id(), third.id()],
            [TransactionId(1), TransactionId(2), TransactionId(3)]
        );
        assert_eq!(third.reference(), "TXN0003");
    }

    #[test]
    fn return_skips_denied_attempts() {
        let mut ledger = library();
        let lent = ledger.create_transaction("P1", "111", 20, None).unwrap();
        ledger.create_transaction("P1", "111", 7, None).unwrap();

        let outcome = ledger.process_return("111");
        match outcome {
            ReturnOutcome::Returned { transaction_id, .. } => assert_eq!(transaction_id, lent.id()),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ledger.patron("P1").unwrap().active_items(), 0);
    }

    #[test]
    fn fee_overflow_is_an_error_and_records_nothing() {
        let huge = Decimal::from_i128_with_scale(10i128.pow(25), 0);
        let catalog =
            Catalog::with_items([Item::sports_equipment("E1", "Big", huge, dec!(5), "X").unwrap()])
                .unwrap();
        let mut ledger = Ledger::with_catalog(Domain::Equipment, catalog);
        ledger
            .register_patron(Patron::new("C1", "Sam", Classification::Advanced))
            .unwrap();

        let result = ledger.create_transaction("C1", "E1", 100_000, Some(10));

        assert_eq!(result, Err(LedgerError::AmountOverflow("E1".into())));
        assert!(ledger.transactions().is_empty());
        assert!(ledger.catalog().find("E1").unwrap().is_available());
        assert_eq!(ledger.patron("C1").unwrap().active_items(), 0);

        let tx = ledger.create_transaction("C1", "E1", 1, Some(10)).unwrap();
        assert_eq!(tx.id(), TransactionId(1));
    }

    #[test]
    fn surcharge_overflow_is_capped() {
        // 60 days fits, 46 overdue days times 1.5 does not.
        let rate = Decimal::MAX / Decimal::from(65);
        let book = Item::new(
            "B1",
            "Heavy Tome",
            rate,
            crate::item::ItemKind::FictionBook {
                author: "A".into(),
                genre: "Mystery".into(),
            },
        )
        .unwrap();
        let mut ledger = Ledger::with_catalog(Domain::Library, Catalog::with_items([book]).unwrap());
        ledger
            .register_patron(Patron::new("P1", "Ada", Classification::Graduate))
            .unwrap();
        ledger.create_transaction("P1", "B1", 60, None).unwrap();

        let outcome = ledger.process_return("B1");

        assert_eq!(outcome.fee(), Decimal::MAX);
        assert!(matches!(outcome, ReturnOutcome::Returned { surcharged: true, .. }));
    }

    #[test]
    fn duplicate_patron_is_rejected() {
        let mut ledger = library();
        let result = ledger.register_patron(Patron::new("P1", "Other", Classification::Staff));
        assert_eq!(result, Err(LedgerError::DuplicatePatron(PatronId::new("P1"))));
    }

    #[test]
    fn unknown_patron_and_item_are_errors() {
        let mut ledger = library();
        assert_eq!(
            ledger.create_transaction("P9", "111", 7, None),
            Err(LedgerError::PatronNotFound(PatronId::new("P9")))
        );
        assert_eq!(
            ledger.create_transaction("P1", "999", 7, None),
            Err(LedgerError::ItemNotFound("999".into()))
        );
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn return_outcome_display() {
        let outcome = ReturnOutcome::Returned {
            transaction_id: TransactionId(1),
            reference: "TXN0001".into(),
            units_overdue: 36,
            late_fee: dec!(12.15),
            surcharged: true,
        };
        assert_eq!(
            outcome.to_string(),
            "returned TXN0001: 36 overdue, late fee 12.15 (excessive overdue surcharge applied)"
        );
        assert_eq!(
            ReturnOutcome::NoActiveTransaction.to_string(),
            "no active transaction found for this item"
        );
        assert_eq!(ReturnOutcome::ItemNotFound.fee(), Decimal::ZERO);
    }

    #[test]
    fn shared_ledger_delegates() {
        let shared = SharedLedger::new(library());
        let tx = shared.create_transaction("P1", "222", 10, None).unwrap();
        assert_eq!(tx.status(), EligibilityStatus::Approved);
        assert_eq!(shared.list_available().len(), 1);
        assert_eq!(shared.process_return("222").fee(), Decimal::ZERO);
        assert_eq!(shared.transactions().len(), 1);
        assert_eq!(shared.with(|ledger| ledger.open_transactions().count()), 0);
    }
}
