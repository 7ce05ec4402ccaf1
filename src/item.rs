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

//! Rentable and borrowable items.
//!
//! Every item shares an identity, a base rate and an availability flag.
//! Category-specific attributes live in [`ItemKind`], which the fee functions
//! in [`crate::fee`] match on.
//!
//! # Example
//!
//! ```
//! use rental_ledger::Item;
//! use rust_decimal_macros::dec;
//!
//! let racket = Item::sports_equipment("E001", "Tennis Racket", dec!(15.0), dec!(12.5), "Racket").unwrap();
//! assert!(racket.is_available());
//! assert!(racket.can_be_borrowed());
//! ```

use crate::base::ItemId;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;

/// Per-day late rate for fiction.
pub const FICTION_DAILY_RATE: Decimal = dec!(0.25);
/// Per-day late rate for non-fiction.
pub const NON_FICTION_DAILY_RATE: Decimal = dec!(0.20);

/// Category of an item together with the attributes its fees depend on.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Standard rental equipment; large sizes carry a surcharge.
    SportsEquipment { size: Decimal, equipment_type: String },
    /// Windsurf board; low-volume boards carry a surcharge.
    WindsurfBoard { volume_litres: Decimal, fins: String },
    /// Sail; standard material is discounted.
    Sail { area_sq_meters: Decimal, material: String },
    /// Training or utility gear; beginner difficulty is discounted.
    TrainingGear { difficulty: String, age_group: String },
    FictionBook { author: String, genre: String },
    NonFictionBook { author: String, subject: String },
    /// Library use only.
    ReferenceBook { author: String, category: String },
}

impl ItemKind {
    pub fn category(&self) -> &'static str {
        match self {
            Self::SportsEquipment { .. } => "sports_equipment",
            Self::WindsurfBoard { .. } => "windsurf_board",
            Self::Sail { .. } => "sail",
            Self::TrainingGear { .. } => "training_gear",
            Self::FictionBook { .. } => "fiction_book",
            Self::NonFictionBook { .. } => "non_fiction_book",
            Self::ReferenceBook { .. } => "reference_book",
        }
    }
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    rate: Decimal,
    available: bool,
    kind: ItemKind,
}

impl Item {
    const DECIMAL_PRECISION: u32 = 2;

    /// Creates an available item.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRate`] if `rate` is negative.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        rate: Decimal,
        kind: ItemKind,
    ) -> Result<Self, LedgerError> {
        if rate < Decimal::ZERO {
            return Err(LedgerError::InvalidRate);
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            rate,
            available: true,
            kind,
        })
    }

    pub fn sports_equipment(
        id: &str,
        name: &str,
        rate_per_hour: Decimal,
        size: Decimal,
        equipment_type: &str,
    ) -> Result<Self, LedgerError> {
        let kind = ItemKind::SportsEquipment {
            size,
            equipment_type: equipment_type.to_string(),
        };
        Self::new(id, name, rate_per_hour, kind)
    }

    pub fn windsurf_board(
        id: &str,
        name: &str,
        rate_per_hour: Decimal,
        volume_litres: Decimal,
        fins: &str,
    ) -> Result<Self, LedgerError> {
        let kind = ItemKind::WindsurfBoard {
            volume_litres,
            fins: fins.to_string(),
        };
        Self::new(id, name, rate_per_hour, kind)
    }

    pub fn sail(
        id: &str,
        name: &str,
        rate_per_hour: Decimal,
        area_sq_meters: Decimal,
        material: &str,
    ) -> Result<Self, LedgerError> {
        let kind = ItemKind::Sail {
            area_sq_meters,
            material: material.to_string(),
        };
        Self::new(id, name, rate_per_hour, kind)
    }

    pub fn training_gear(
        id: &str,
        name: &str,
        rate_per_hour: Decimal,
        difficulty: &str,
        age_group: &str,
    ) -> Result<Self, LedgerError> {
        let kind = ItemKind::TrainingGear {
            difficulty: difficulty.to_string(),
            age_group: age_group.to_string(),
        };
        Self::new(id, name, rate_per_hour, kind)
    }

    /// Fiction book charged at [`FICTION_DAILY_RATE`].
    pub fn fiction_book(isbn: &str, title: &str, author: &str, genre: &str) -> Self {
        Self::book(
            isbn,
            title,
            FICTION_DAILY_RATE,
            ItemKind::FictionBook {
                author: author.to_string(),
                genre: genre.to_string(),
            },
        )
    }

    /// Non-fiction book charged at [`NON_FICTION_DAILY_RATE`].
    pub fn non_fiction_book(isbn: &str, title: &str, author: &str, subject: &str) -> Self {
        Self::book(
            isbn,
            title,
            NON_FICTION_DAILY_RATE,
            ItemKind::NonFictionBook {
                author: author.to_string(),
                subject: subject.to_string(),
            },
        )
    }

    pub fn reference_book(isbn: &str, title: &str, author: &str, category: &str) -> Self {
        Self::book(
            isbn,
            title,
            Decimal::ZERO,
            ItemKind::ReferenceBook {
                author: author.to_string(),
                category: category.to_string(),
            },
        )
    }

    fn book(isbn: &str, title: &str, rate: Decimal, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(isbn),
            name: title.to_string(),
            rate,
            available: true,
            kind,
        }
    }

    /// Same item with the given availability, for seeding a catalog.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base rate per unit: per hour for rental gear, per overdue day for books.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn author(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::FictionBook { author, .. }
            | ItemKind::NonFictionBook { author, .. }
            | ItemKind::ReferenceBook { author, .. } => Some(author),
            _ => None,
        }
    }

    /// Reference-only items can never leave the building.
    pub fn can_be_borrowed(&self) -> bool {
        !matches!(self.kind, ItemKind::ReferenceBook { .. })
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Item", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("rate", &self.rate.round_dp(Item::DECIMAL_PRECISION))?;
        state.serialize_field("available", &self.available)?;
        state.serialize_field("borrowable", &self.can_be_borrowed())?;
        state.serialize_field("details", &self.kind)?;
        state.end()
    }
}
