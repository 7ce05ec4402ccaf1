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

//! Ledger transactions.
//!
//! Transactions follow a one-way state machine:
//! - [`Open`] → [`Returned`] (via return)
//!
//! Every evaluated request is recorded, including DENIED ones. Those stay
//! `Open` with zero cost and are never matched by a return because the item
//! was never handed out.
//!
//! [`Open`]: TransactionState::Open
//! [`Returned`]: TransactionState::Returned

use crate::base::{ItemId, PatronId, TransactionId};
use crate::eligibility::{Eligibility, EligibilityStatus};
use crate::error::LedgerError;
use crate::item::Item;
use crate::patron::Patron;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Open,
    Returned,
}

/// Snapshot of one rental or loan request and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    reference: String,
    patron_id: PatronId,
    patron_name: String,
    item_id: ItemId,
    item_name: String,
    duration: u32,
    context: Option<u32>,
    status: EligibilityStatus,
    message: String,
    cost: Decimal,
    state: TransactionState,
    late_fee: Decimal,
    surcharged: bool,
}

const DECIMAL_PRECISION: u32 = 2;

/// Rounds an amount for presentation, always with two decimal places.
fn money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(DECIMAL_PRECISION);
    rounded.rescale(DECIMAL_PRECISION);
    rounded
}

impl Transaction {
    pub(crate) fn open(
        id: TransactionId,
        reference: String,
        patron: &Patron,
        item: &Item,
        duration: u32,
        context: Option<u32>,
        eligibility: Eligibility,
    ) -> Self {
        Self {
            id,
            reference,
            patron_id: patron.id().clone(),
            patron_name: patron.name().to_string(),
            item_id: item.id().clone(),
            item_name: item.name().to_string(),
            duration,
            context,
            status: eligibility.status(),
            message: eligibility.message().to_string(),
            cost: Decimal::ZERO,
            state: TransactionState::Open,
            late_fee: Decimal::ZERO,
            surcharged: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Formatted reference such as `T3` or `TXN0003`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn patron_id(&self) -> &PatronId {
        &self.patron_id
    }

    pub fn patron_name(&self) -> &str {
        &self.patron_name
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    /// Requested duration in the domain's unit.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Hazard value the safety chain was run with, if any.
    pub fn context(&self) -> Option<u32> {
        self.context
    }

    pub fn status(&self) -> EligibilityStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Cost charged when the request went ahead; zero otherwise.
    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_returned(&self) -> bool {
        self.state == TransactionState::Returned
    }

    /// Late fee settled on return, surcharge included; zero until then.
    pub fn late_fee(&self) -> Decimal {
        self.late_fee
    }

    /// Whether the long-overdue surcharge was applied on return.
    pub fn surcharged(&self) -> bool {
        self.surcharged
    }

    pub(crate) fn set_cost(&mut self, cost: Decimal) {
        self.cost = cost;
    }

    /// Closes the transaction with its settled late fee.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyReturned`] if the transaction is closed.
    pub(crate) fn mark_returned(
        &mut self,
        late_fee: Decimal,
        surcharged: bool,
    ) -> Result<(), LedgerError> {
        if self.state == TransactionState::Returned {
            return Err(LedgerError::AlreadyReturned(self.id));
        }
        self.state = TransactionState::Returned;
        self.late_fee = late_fee;
        self.surcharged = surcharged;
        Ok(())
    }
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Transaction", 12)?;
        state.serialize_field("id", &self.reference)?;
        state.serialize_field("patron", &self.patron_id)?;
        state.serialize_field("item", &self.item_id)?;
        state.serialize_field("duration", &self.duration)?;
        state.serialize_field("context", &self.context)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("cost", &money(self.cost))?;
        state.serialize_field("state", &self.state)?;
        state.serialize_field("returned", &self.is_returned())?;
        state.serialize_field("late_fee", &money(self.late_fee))?;
        state.serialize_field("surcharged", &self.surcharged)?;
        state.end()
    }
}
