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

//! Per-domain configuration of the ledger.
//!
//! The three subsystems share one engine and differ in:
//!
//! | | Equipment | Windsurf | Library |
//! |---|---|---|---|
//! | Rule chain | safety (condition level) | safety (wind speed) | borrowing |
//! | Proceeds when | not DENIED | not DENIED | APPROVED or CAUTION |
//! | Reference | `T1` | `T1` | `TXN0001` |
//! | Unit | hours | hours | days |
//! | Overdue surcharge | no | no | yes |

use crate::base::TransactionId;
use crate::eligibility::{EligibilityStatus, Hazard, RuleChain};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Which subsystem a ledger runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Equipment,
    Windsurf,
    Library,
}

impl Domain {
    pub fn rule_chain(&self) -> RuleChain {
        match self {
            Self::Equipment => RuleChain::Safety(Hazard::ConditionLevel),
            Self::Windsurf => RuleChain::Safety(Hazard::WindSpeed),
            Self::Library => RuleChain::Borrowing,
        }
    }

    /// Whether a transaction with `status` takes the item and charges the fee.
    ///
    /// Rentals go ahead on anything but DENIED, including HINT and
    /// URGENT_WARNING. The library only lends on APPROVED or CAUTION.
    pub fn proceeds(&self, status: EligibilityStatus) -> bool {
        match self {
            Self::Equipment | Self::Windsurf => status != EligibilityStatus::Denied,
            Self::Library => matches!(
                status,
                EligibilityStatus::Approved | EligibilityStatus::Caution
            ),
        }
    }

    /// Human-facing transaction reference.
    pub fn reference(&self, id: TransactionId) -> String {
        match self {
            Self::Equipment | Self::Windsurf => format!("T{}", id.0),
            Self::Library => format!("TXN{:04}", id.0),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Equipment | Self::Windsurf => "hours",
            Self::Library => "days",
        }
    }

    /// Durations are counted in days, so the long-overdue surcharge applies.
    pub fn is_day_based(&self) -> bool {
        matches!(self, Self::Library)
    }
}

/// Overdue and surcharge settings used when an item comes back.
///
/// Overdue time is derived from the *requested* duration alone:
/// `overdue = max(0, requested - grace_units)`. No calendar is consulted
/// and no due date is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnPolicy {
    /// Units included before anything counts as overdue.
    pub grace_units: u32,
    /// Overdue units above which the surcharge applies.
    pub surcharge_after: u32,
    /// Multiplier applied to the late fee once past `surcharge_after`.
    pub surcharge_rate: Decimal,
}

impl ReturnPolicy {
    pub fn units_overdue(&self, requested: u32) -> u32 {
        requested.saturating_sub(self.grace_units)
    }

    pub fn surcharge_applies(&self, units_overdue: u32) -> bool {
        units_overdue > self.surcharge_after
    }
}

impl Default for ReturnPolicy {
    fn default() -> Self {
        Self {
            grace_units: 14,
            surcharge_after: 30,
            surcharge_rate: dec!(1.5),
        }
    }
}
