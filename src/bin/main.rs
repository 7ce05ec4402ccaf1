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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rental_ledger::{
    Catalog, Classification, Domain, Item, ItemKind, Ledger, LedgerError, Patron, ReturnPolicy,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Rental Ledger - Replay rental and loan operations against a catalog
///
/// Loads a catalog CSV, applies an operations CSV and writes the resulting
/// transaction ledger to stdout. Diagnostics go to stderr (see RUST_LOG).
#[derive(Parser, Debug)]
#[command(name = "rental-ledger")]
#[command(about = "A rental/circulation engine that replays operation CSVs", long_about = None)]
struct Args {
    /// Subsystem whose rules, fees and ID format apply
    #[arg(long, value_enum, default_value_t = Domain::Library)]
    domain: Domain,

    /// Path to catalog CSV
    ///
    /// Expected format: category,id,name,rate,available,measure,tag,extra
    #[arg(long, value_name = "FILE")]
    catalog: PathBuf,

    /// Units of a loan included before it counts as overdue
    #[arg(long, default_value_t = 14)]
    grace_days: u32,

    /// Overdue days above which the late fee is surcharged
    #[arg(long, default_value_t = 30)]
    surcharge_after: u32,

    /// Path to operations CSV
    ///
    /// Expected format: op,patron,name,class,item,duration,context
    /// Example: cargo run -- --catalog items.csv ops.csv > ledger.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "rental_ledger=info,main=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let catalog = match open(&args.catalog).and_then(|f| load_catalog(BufReader::new(f))) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog '{}': {}", args.catalog.display(), e);
            process::exit(1);
        }
    };
    tracing::info!(items = catalog.len(), domain = ?args.domain, "loaded catalog");

    let policy = ReturnPolicy {
        grace_units: args.grace_days,
        surcharge_after: args.surcharge_after,
        ..ReturnPolicy::default()
    };
    let mut ledger = Ledger::with_catalog(args.domain, catalog).with_policy(policy);

    let ops = match open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = process_operations(&mut ledger, BufReader::new(ops)) {
        eprintln!("Error processing operations: {}", e);
        process::exit(1);
    }

    if let Err(e) = write_transactions(&ledger, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn open(path: &Path) -> Result<File, csv::Error> {
    File::open(path).map_err(csv::Error::from)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " rent "
        .flexible(true) // Allow trailing optional fields to be omitted
        .has_headers(true)
        .from_reader(reader)
}

/// Raw catalog row.
///
/// `measure` and `tag` carry the category attribute the fees depend on;
/// `extra` is the age group for training gear and the author for books.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    category: String,
    id: String,
    name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rate: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    available: Option<bool>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    measure: Option<Decimal>,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    extra: String,
}

impl CatalogRecord {
    /// Converts the row into an item.
    ///
    /// Returns `None` for unknown categories or missing required fields.
    /// Books fall back to their default daily rate when `rate` is empty.
    fn into_item(self) -> Option<Result<Item, LedgerError>> {
        let tag = self.tag;
        let extra = self.extra;
        let kind = match self.category.to_lowercase().as_str() {
            "sports_equipment" => ItemKind::SportsEquipment {
                size: self.measure?,
                equipment_type: tag,
            },
            "windsurf_board" => ItemKind::WindsurfBoard {
                volume_litres: self.measure?,
                fins: tag,
            },
            "sail" => ItemKind::Sail {
                area_sq_meters: self.measure?,
                material: tag,
            },
            "training_gear" => ItemKind::TrainingGear {
                difficulty: tag,
                age_group: extra,
            },
            "fiction_book" => ItemKind::FictionBook { author: extra, genre: tag },
            "non_fiction_book" => ItemKind::NonFictionBook { author: extra, subject: tag },
            "reference_book" => ItemKind::ReferenceBook { author: extra, category: tag },
            _ => return None,
        };

        let rate = match (&kind, self.rate) {
            (_, Some(rate)) => rate,
            (ItemKind::FictionBook { .. }, None) => rental_ledger::FICTION_DAILY_RATE,
            (ItemKind::NonFictionBook { .. }, None) => rental_ledger::NON_FICTION_DAILY_RATE,
            (ItemKind::ReferenceBook { .. }, None) => Decimal::ZERO,
            _ => return None,
        };

        let available = self.available.unwrap_or(true);
        Some(
            Item::new(self.id.as_str(), self.name, rate, kind)
                .map(|item| item.with_availability(available)),
        )
    }
}

/// Loads a catalog from CSV.
///
/// # CSV Format
///
/// Expected columns: `category, id, name, rate, available, measure, tag, extra`
///
/// # Example
///
/// ```csv
/// category,id,name,rate,available,measure,tag,extra
/// sports_equipment,E001,Professional Tennis Racket,15.0,true,12.5,Racket,
/// training_gear,T001,Balance Board,8.0,true,,Beginner,All Ages
/// fiction_book,978-0441013593,Dune,,true,,Science Fiction,Frank Herbert
/// ```
///
/// Malformed rows, invalid items and duplicate IDs are skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn load_catalog<R: Read>(reader: R) -> Result<Catalog, csv::Error> {
    let mut catalog = Catalog::new();

    for result in csv_reader(reader).deserialize::<CatalogRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed catalog row");
                continue;
            }
        };

        let Some(item) = record.into_item() else {
            tracing::warn!("skipping invalid catalog record");
            continue;
        };

        match item.and_then(|item| catalog.add(item)) {
            Ok(()) => {}
            Err(e) => tracing::warn!(error = %e, "skipping catalog item"),
        }
    }

    Ok(catalog)
}

/// Raw operation row.
#[derive(Debug, Deserialize)]
struct OperationRecord {
    op: String,
    #[serde(default)]
    patron: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    item: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    duration: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    context: Option<u32>,
}

/// Applies operations from a CSV reader to `ledger`.
///
/// # CSV Format
///
/// Expected columns: `op, patron, name, class, item, duration, context`
/// - `register`: adds patron `patron` named `name` with classification `class`
/// - `rent`: `patron` requests `item` for `duration` units at hazard `context`
/// - `return`: brings `item` back
///
/// # Example
///
/// ```csv
/// op,patron,name,class,item,duration,context
/// register,P1,Ada,Graduate,,,
/// rent,P1,,,978-0441013593,20,
/// return,,,,978-0441013593,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
/// Individual operation errors are logged and don't stop processing.
pub fn process_operations<R: Read>(ledger: &mut Ledger, reader: R) -> Result<(), csv::Error> {
    for result in csv_reader(reader).deserialize::<OperationRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed operation row");
                continue;
            }
        };

        match record.op.to_lowercase().as_str() {
            "register" => {
                let classification = Classification::from(record.class.as_str());
                let patron = Patron::new(record.patron.as_str(), record.name, classification);
                if let Err(e) = ledger.register_patron(patron) {
                    tracing::warn!(error = %e, "skipping registration");
                }
            }
            "rent" => {
                let Some(duration) = record.duration else {
                    tracing::warn!(item = record.item, "skipping rent without duration");
                    continue;
                };
                if let Err(e) =
                    ledger.create_transaction(&record.patron, &record.item, duration, record.context)
                {
                    tracing::warn!(error = %e, "skipping rent");
                }
            }
            "return" => {
                let outcome = ledger.process_return(&record.item);
                tracing::info!(item = record.item, "{outcome}");
            }
            other => tracing::warn!(op = other, "skipping unknown operation"),
        }
    }

    Ok(())
}

/// Writes the transaction ledger to a CSV writer.
///
/// # CSV Format
///
/// Columns: `id, patron, item, duration, context, status, message, cost, state, returned, late_fee, surcharged`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_transactions<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for transaction in ledger.transactions() {
        wtr.serialize(transaction)?;
    }

    wtr.flush()?;
    Ok(())
}
