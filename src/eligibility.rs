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

//! Eligibility rule chains.
//!
//! Both chains are ordered and first-match-wins. Every evaluation produces a
//! fresh [`Eligibility`]; a DENIED outcome is a normal result, not an error.
//!
//! # Safety chain (rentals)
//!
//! | # | Condition | Status |
//! |---|-----------|--------|
//! | 1 | context > 30 | URGENT_WARNING |
//! | 2 | Beginner and context > 15 | DENIED |
//! | 3 | Intermediate and 20 ≤ context ≤ 30 | CAUTION |
//! | 4 | context < 5 | HINT |
//! | 5 | otherwise | APPROVED |
//!
//! # Borrowing chain (library)
//!
//! | # | Condition | Status |
//! |---|-----------|--------|
//! | 1 | item is reference-only | DENIED |
//! | 2 | item is out | DENIED |
//! | 3 | patron has overdues | DENIED |
//! | 4 | patron at item limit | DENIED |
//! | 5 | days > patron's max days | DENIED |
//! | 6 | Faculty/Staff and days > 60 | CAUTION |
//! | 7 | Graduate and days > 30 | CAUTION |
//! | 8 | otherwise | APPROVED |

use crate::item::Item;
use crate::patron::{Classification, Patron};
use serde::{Deserialize, Serialize};
use std::fmt;

const URGENT_ABOVE: u32 = 30;
const BEGINNER_LIMIT: u32 = 15;
const INTERMEDIATE_CAUTION: std::ops::RangeInclusive<u32> = 20..=30;
const HINT_BELOW: u32 = 5;
const STAFF_CAUTION_ABOVE: u32 = 60;
const GRADUATE_CAUTION_ABOVE: u32 = 30;

/// Outcome of a rule chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    Denied,
    Caution,
    Hint,
    UrgentWarning,
    Approved,
}

impl EligibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denied => "DENIED",
            Self::Caution => "CAUTION",
            Self::Hint => "HINT",
            Self::UrgentWarning => "URGENT_WARNING",
            Self::Approved => "APPROVED",
        }
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status plus a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    status: EligibilityStatus,
    message: String,
}

impl Eligibility {
    pub fn new(status: EligibilityStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> EligibilityStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What the numeric context value of the safety chain measures.
///
/// Only the wording of the messages differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// Generic condition level (1-100) for sports equipment.
    ConditionLevel,
    /// Wind speed in knots for windsurf gear.
    WindSpeed,
}

/// A configured rule chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleChain {
    Safety(Hazard),
    Borrowing,
}

impl RuleChain {
    /// Runs the chain.
    ///
    /// The safety chain reads `context` (missing means 0); the borrowing chain
    /// ignores it and reads the patron and item instead.
    pub fn evaluate(
        &self,
        patron: &Patron,
        item: &Item,
        duration: u32,
        context: Option<u32>,
    ) -> Eligibility {
        let result = match self {
            Self::Safety(hazard) => {
                evaluate_safety(*hazard, patron.classification(), context.unwrap_or(0))
            }
            Self::Borrowing => evaluate_borrowing(patron, item, duration),
        };
        tracing::debug!(
            patron = %patron.id(),
            item = %item.id(),
            duration,
            ?context,
            status = %result.status(),
            "evaluated eligibility"
        );
        result
    }
}

/// Safety chain for equipment and windsurf rentals.
///
/// Rule 1 outranks the skill rules: a Beginner at 35 gets URGENT_WARNING, not DENIED.
pub fn evaluate_safety(hazard: Hazard, skill: Classification, context: u32) -> Eligibility {
    use EligibilityStatus::*;

    if context > URGENT_ABOVE {
        Eligibility::new(UrgentWarning, "Dangerous conditions for all skill levels")
    } else if skill == Classification::Beginner && context > BEGINNER_LIMIT {
        let message = match hazard {
            Hazard::ConditionLevel => "Conditions too challenging for Beginner",
            Hazard::WindSpeed => "Wind too strong for Beginner",
        };
        Eligibility::new(Denied, message)
    } else if skill == Classification::Intermediate && INTERMEDIATE_CAUTION.contains(&context) {
        Eligibility::new(Caution, "Challenging conditions for Intermediate")
    } else if context < HINT_BELOW {
        let message = match hazard {
            Hazard::ConditionLevel => {
                "Low activity level - recommend waiting for better conditions"
            }
            Hazard::WindSpeed => "Low wind - recommend waiting",
        };
        Eligibility::new(Hint, message)
    } else {
        let message = match hazard {
            Hazard::ConditionLevel => "Conditions acceptable for this skill level",
            Hazard::WindSpeed => "Conditions acceptable",
        };
        Eligibility::new(Approved, message)
    }
}

/// Borrowing chain for library circulation.
pub fn evaluate_borrowing(patron: &Patron, item: &Item, requested_days: u32) -> Eligibility {
    use EligibilityStatus::*;

    if !item.can_be_borrowed() {
        return Eligibility::new(
            Denied,
            "Reference books cannot be borrowed - library use only",
        );
    }

    if !item.is_available() {
        return Eligibility::new(Denied, "Book is currently borrowed by another patron");
    }

    if patron.has_overdue() {
        return Eligibility::new(
            Denied,
            format!(
                "Cannot borrow: Return {} overdue book(s) first",
                patron.overdue_count()
            ),
        );
    }

    let active = patron.active_items();
    let max_items = patron.max_items();
    if active >= max_items && active > 0 && max_items > 0 {
        return Eligibility::new(
            Denied,
            format!("Maximum borrowing limit reached ({max_items} books)"),
        );
    }

    let max_days = patron.max_duration();
    if requested_days > max_days {
        return Eligibility::new(
            Denied,
            format!("Requested period exceeds maximum allowed ({max_days} days)"),
        );
    }

    let classification = patron.classification();
    if matches!(classification, Classification::Faculty | Classification::Staff)
        && requested_days > STAFF_CAUTION_ABOVE
    {
        return Eligibility::new(
            Caution,
            "Extended borrowing period for faculty/staff requires approval",
        );
    }

    if classification == Classification::Graduate && requested_days > GRADUATE_CAUTION_ABOVE {
        return Eligibility::new(
            Caution,
            "Graduate students may need approval for extended borrowing",
        );
    }

    Eligibility::new(
        Approved,
        format!("Borrowing request approved for {requested_days} days"),
    )
}
