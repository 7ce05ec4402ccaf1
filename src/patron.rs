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

//! Customer and patron records.
//!
//! A patron carries a [`Classification`] (skill level for rentals, patron
//! type for the library) and two counters. Counters are only changed by the
//! ledger when a transaction proceeds or is returned.
//!
//! # Example
//!
//! ```
//! use rental_ledger::{Classification, Patron};
//!
//! let patron = Patron::new("P001", "Ada", Classification::from("graduate"));
//! assert_eq!(patron.max_items(), 6);
//! assert_eq!(patron.max_duration(), 60);
//! assert!(!patron.has_overdue());
//! ```

use crate::base::PatronId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of customer and patron categories.
///
/// Parsing is case-insensitive and never fails: unknown tags become
/// [`Classification::Unrecognized`], which gets the default limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Beginner,
    Intermediate,
    Advanced,
    Faculty,
    Staff,
    Graduate,
    Undergraduate,
    Community,
    Unrecognized,
}

impl Classification {
    const DEFAULT_MAX_ITEMS: u32 = 3;
    const DEFAULT_MAX_DURATION: u32 = 7;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Faculty => "Faculty",
            Self::Staff => "Staff",
            Self::Graduate => "Graduate",
            Self::Undergraduate => "Undergraduate",
            Self::Community => "Community",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// Maximum number of items held at once.
    ///
    /// Skill levels carry no library privileges and fall back to the default.
    pub fn max_items(&self) -> u32 {
        match self {
            Self::Faculty => 10,
            Self::Staff => 8,
            Self::Graduate => 6,
            Self::Undergraduate => 4,
            Self::Community => 2,
            _ => Self::DEFAULT_MAX_ITEMS,
        }
    }

    /// Maximum loan duration in days.
    ///
    /// Faculty, staff and graduates may request loans past their standard
    /// period; the borrowing chain flags those with CAUTION.
    pub fn max_duration(&self) -> u32 {
        match self {
            Self::Faculty => 90,
            Self::Staff => 90,
            Self::Graduate => 60,
            Self::Undergraduate => 21,
            Self::Community => 14,
            _ => Self::DEFAULT_MAX_DURATION,
        }
    }
}

impl From<&str> for Classification {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            "faculty" => Self::Faculty,
            "staff" => Self::Staff,
            "graduate" => Self::Graduate,
            "undergraduate" => Self::Undergraduate,
            "community" => Self::Community,
            _ => Self::Unrecognized,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer (rentals) or patron (library).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patron {
    id: PatronId,
    name: String,
    classification: Classification,
    active_items: u32,
    overdue_count: u32,
}

impl Patron {
    pub fn new(
        id: impl Into<PatronId>,
        name: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            classification,
            active_items: 0,
            overdue_count: 0,
        }
    }

    pub fn id(&self) -> &PatronId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Items currently out on an open transaction.
    pub fn active_items(&self) -> u32 {
        self.active_items
    }

    pub fn overdue_count(&self) -> u32 {
        self.overdue_count
    }

    /// Derived: true iff the overdue count is non-zero.
    pub fn has_overdue(&self) -> bool {
        self.overdue_count > 0
    }

    pub fn max_items(&self) -> u32 {
        self.classification.max_items()
    }

    pub fn max_duration(&self) -> u32 {
        self.classification.max_duration()
    }

    /// No overdues, room for another item, and a recognized classification.
    pub fn in_good_standing(&self) -> bool {
        !self.has_overdue()
            && self.active_items < self.max_items()
            && self.classification != Classification::Unrecognized
    }

    /// Records an overdue item against this patron.
    pub fn add_overdue(&mut self) {
        self.overdue_count += 1;
    }

    /// Clears one overdue item. Never goes below zero.
    pub fn remove_overdue(&mut self) {
        self.overdue_count = self.overdue_count.saturating_sub(1);
    }

    pub(crate) fn increment_active(&mut self) {
        self.active_items += 1;
    }

    pub(crate) fn decrement_active(&mut self) {
        self.active_items = self.active_items.saturating_sub(1);
    }
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - ID: {} [{} items out, {} overdue]",
            self.name, self.classification, self.id, self.active_items, self.overdue_count
        )
    }
}
