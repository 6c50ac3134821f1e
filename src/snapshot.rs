use crate::error::RowError;
use crate::validate::{parse_date, parse_quantity, required};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Inventory snapshot row after validation, before the ingredient lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub ingredient_name: String,
    pub unit: String,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CsvSnapshot {
    pub snapshot_date: String,
    pub ingredient_name: String,
    pub unit: String,
    pub quantity_on_hand: String,
}

impl TryFrom<CsvSnapshot> for Snapshot {
    type Error = RowError;

    fn try_from(csv: CsvSnapshot) -> Result<Self, Self::Error> {
        // All presence checks run before any parsing.
        let date = required("snapshot_date", &csv.snapshot_date)?;
        let ingredient_name = required("ingredient_name", &csv.ingredient_name)?;
        let unit = required("unit", &csv.unit)?;
        let quantity = required("quantity_on_hand", &csv.quantity_on_hand)?;

        Ok(Snapshot {
            date: parse_date(date)?,
            ingredient_name: ingredient_name.to_string(),
            unit: unit.to_string(),
            quantity: parse_quantity(quantity)?,
        })
    }
}

/// A validated snapshot bound to its ingredient, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFact {
    pub date: NaiveDate,
    pub ingredient_id: i64,
    pub quantity: Decimal,
    pub unit: String,
    pub source_file: String,
}

impl SnapshotFact {
    pub fn new(snapshot: Snapshot, ingredient_id: i64, source_file: &str) -> Self {
        Self {
            date: snapshot.date,
            ingredient_id,
            quantity: snapshot.quantity,
            unit: snapshot.unit,
            source_file: source_file.to_string(),
        }
    }
}
