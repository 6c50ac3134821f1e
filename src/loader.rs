use crate::error::{LoadError, RowError};
use crate::ingredient::{CsvIngredient, Ingredient};
use crate::snapshot::{CsvSnapshot, Snapshot, SnapshotFact};
use crate::store::Store;
use crate::stream_rows;

use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Per-file row counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub inserted: usize,
    /// Rows whose natural key already existed; left untouched.
    pub duplicates: usize,
    pub invalid: usize,
    pub not_found: usize,
}

impl LoadStats {
    pub fn skipped(&self) -> usize {
        self.invalid + self.not_found
    }

    fn skip(&mut self, path: &Path, row: usize, reason: &RowError) {
        match reason {
            RowError::IngredientNotFound { .. } => self.not_found += 1,
            _ => self.invalid += 1,
        }
        warn!(file = %path.display(), row, %reason, "Skipping row");
    }
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} inserted, {} duplicate, {} invalid, {} unknown ingredient",
            self.rows_read, self.inserted, self.duplicates, self.invalid, self.not_found
        )
    }
}

/// Loads an ingredient master file in one transaction. Existing names are
/// left as they are, so the first `base_unit` seen for a name wins.
pub async fn load_ingredients(store: &Store, path: &Path) -> Result<LoadStats, LoadError> {
    let rows = stream_rows::<CsvIngredient>(path)?;
    let mut tx = store.begin().await?;
    let mut stats = LoadStats::default();

    for (index, row) in rows.enumerate() {
        let row_number = index + 1;
        let row = row?;
        stats.rows_read += 1;

        let ingredient = match Ingredient::try_from(row) {
            Ok(ingredient) => ingredient,
            Err(reason) => {
                stats.skip(path, row_number, &reason);
                continue;
            }
        };

        if tx.insert_ingredient(&ingredient).await? {
            stats.inserted += 1;
        } else {
            debug!(name = %ingredient.name, "Ingredient already present");
            stats.duplicates += 1;
        }
    }

    tx.commit().await?;

    info!(file = %path.display(), %stats, "Ingredients loaded");
    Ok(stats)
}

/// Loads one inventory snapshot file in one transaction. Rows naming an
/// unknown ingredient are skipped; an existing fact for the same date and
/// ingredient is never overwritten.
pub async fn load_snapshots(store: &Store, path: &Path) -> Result<LoadStats, LoadError> {
    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let rows = stream_rows::<CsvSnapshot>(path)?;
    let mut tx = store.begin().await?;
    let mut stats = LoadStats::default();

    for (index, row) in rows.enumerate() {
        let row_number = index + 1;
        let row = row?;
        stats.rows_read += 1;

        let snapshot = match Snapshot::try_from(row) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                stats.skip(path, row_number, &reason);
                continue;
            }
        };

        let Some(ingredient_id) = tx.find_ingredient_id(&snapshot.ingredient_name).await? else {
            let reason = RowError::IngredientNotFound {
                name: snapshot.ingredient_name,
            };
            stats.skip(path, row_number, &reason);
            continue;
        };

        let fact = SnapshotFact::new(snapshot, ingredient_id, &source_file);
        if tx.insert_snapshot(&fact).await? {
            stats.inserted += 1;
        } else {
            debug!(date = %fact.date, ingredient_id, "Snapshot already present");
            stats.duplicates += 1;
        }
    }

    tx.commit().await?;

    info!(file = %path.display(), %stats, "Inventory snapshot loaded");
    Ok(stats)
}
