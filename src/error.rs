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

//! Error types for catalog and ledger operations.
//!
//! An eligibility outcome of DENIED is not an error; it is recorded on the
//! transaction like any other status.

use crate::base::{ItemId, PatronId, TransactionId};
use thiserror::Error;

/// Ledger and catalog errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Referenced item is not in the catalog
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// Referenced patron is not registered with the ledger
    #[error("patron {0} not found")]
    PatronNotFound(PatronId),

    /// An item with the same ID (ignoring case) is already catalogued
    #[error("duplicate item ID {0}")]
    DuplicateItem(ItemId),

    /// Item is already out on an open rental
    #[error("item {0} is not available")]
    ItemUnavailable(ItemId),

    /// A patron with the same ID is already registered
    #[error("duplicate patron ID {0}")]
    DuplicatePatron(PatronId),

    /// Base rate is negative
    #[error("invalid rate (must not be negative)")]
    InvalidRate,

    /// A fee for this item does not fit in a `Decimal`
    #[error("amount for item {0} is out of range")]
    AmountOverflow(ItemId),

    /// Transaction has already been returned
    #[error("transaction {0} already returned")]
    AlreadyReturned(TransactionId),

    /// The configured item store rejected a write
    #[error("persistence failed: {0}")]
    Persistence(String),
}
