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

//! Fee calculation per item category.
//!
//! | Category | Basis | Adjustment |
//! |----------|-------|------------|
//! | Sports equipment | rate × hours | +15% if size > 10.0 |
//! | Windsurf board | rate × hours | +15% if volume < 100.0 |
//! | Sail | rate × hours | −5% if material is "Standard" |
//! | Training gear | rate × hours | −5% if difficulty is "Beginner" |
//! | Fiction | rate × days | −10% for "Science Fiction" or "Fantasy" |
//! | Non-fiction | rate × days | −15% for "Computer Science" or "Mathematics" |
//! | Reference | – | always zero |
//!
//! Amounts are never rounded here. Chained multipliers stay exact and
//! rounding happens only when a value is serialized.

use crate::error::LedgerError;
use crate::item::{Item, ItemKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SIZE_THRESHOLD: Decimal = dec!(10.0);
const VOLUME_THRESHOLD: Decimal = dec!(100.0);
const SURCHARGE: Decimal = dec!(1.15);
const GEAR_DISCOUNT: Decimal = dec!(0.95);
const FICTION_DISCOUNT: Decimal = dec!(0.90);
const NON_FICTION_DISCOUNT: Decimal = dec!(0.85);

const DISCOUNTED_GENRES: [&str; 2] = ["Science Fiction", "Fantasy"];
const DISCOUNTED_SUBJECTS: [&str; 2] = ["Computer Science", "Mathematics"];

fn is_one_of(tag: &str, tags: &[&str]) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// `rate × units × multiplier`, or [`LedgerError::AmountOverflow`].
fn scaled(item: &Item, units: u32, multiplier: Decimal) -> Result<Decimal, LedgerError> {
    item.rate()
        .checked_mul(Decimal::from(units))
        .and_then(|base| base.checked_mul(multiplier))
        .ok_or_else(|| LedgerError::AmountOverflow(item.id().clone()))
}

/// Cost of holding `item` for `units` hours (rental gear) or days (books).
///
/// For books this is the late fee the loan would accrue over the same
/// number of days, which is what a library approval records as its cost.
///
/// # Errors
///
/// Returns [`LedgerError::AmountOverflow`] if the amount is out of range.
pub fn rental_fee(item: &Item, units: u32) -> Result<Decimal, LedgerError> {
    let multiplier = match item.kind() {
        ItemKind::SportsEquipment { size, .. } if *size > SIZE_THRESHOLD => SURCHARGE,
        ItemKind::WindsurfBoard { volume_litres, .. } if *volume_litres < VOLUME_THRESHOLD => {
            SURCHARGE
        }
        ItemKind::Sail { material, .. } if material.eq_ignore_ascii_case("Standard") => {
            GEAR_DISCOUNT
        }
        ItemKind::TrainingGear { difficulty, .. } if difficulty.eq_ignore_ascii_case("Beginner") => {
            GEAR_DISCOUNT
        }
        ItemKind::SportsEquipment { .. }
        | ItemKind::WindsurfBoard { .. }
        | ItemKind::Sail { .. }
        | ItemKind::TrainingGear { .. } => Decimal::ONE,
        ItemKind::FictionBook { .. }
        | ItemKind::NonFictionBook { .. }
        | ItemKind::ReferenceBook { .. } => return late_fee(item, units),
    };

    let fee = scaled(item, units, multiplier)?;
    tracing::debug!(
        item = %item.id(),
        category = item.kind().category(),
        units,
        %fee,
        "computed rental fee"
    );
    Ok(fee)
}

/// Late fee for `days_overdue` days, before any ledger surcharge.
///
/// Rental gear accrues no late fee; reference books are never charged.
///
/// # Errors
///
/// Returns [`LedgerError::AmountOverflow`] if the amount is out of range.
pub fn late_fee(item: &Item, days_overdue: u32) -> Result<Decimal, LedgerError> {
    let multiplier = match item.kind() {
        ItemKind::FictionBook { genre, .. } if is_one_of(genre, &DISCOUNTED_GENRES) => {
            FICTION_DISCOUNT
        }
        ItemKind::NonFictionBook { subject, .. } if is_one_of(subject, &DISCOUNTED_SUBJECTS) => {
            NON_FICTION_DISCOUNT
        }
        ItemKind::FictionBook { .. } | ItemKind::NonFictionBook { .. } => Decimal::ONE,
        ItemKind::ReferenceBook { .. }
        | ItemKind::SportsEquipment { .. }
        | ItemKind::WindsurfBoard { .. }
        | ItemKind::Sail { .. }
        | ItemKind::TrainingGear { .. } => return Ok(Decimal::ZERO),
    };

    scaled(item, days_overdue, multiplier)
}
