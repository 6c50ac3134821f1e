use crate::config::DbConfig;
use crate::ingredient::Ingredient;
use crate::snapshot::SnapshotFact;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, Postgres, Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Seconds to wait for a connection before giving up on the store.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const PG_INSERT_INGREDIENT: &str = r#"
    INSERT INTO dim_ingredient (ingredient_name, base_unit)
    VALUES ($1, $2)
    ON CONFLICT (ingredient_name) DO NOTHING
"#;

const PG_FIND_INGREDIENT: &str = r#"
    SELECT CAST(ingredient_id AS BIGINT)
    FROM dim_ingredient
    WHERE ingredient_name = $1
"#;

const PG_INSERT_SNAPSHOT: &str = r#"
    INSERT INTO fact_inventory_snapshot
        (snapshot_date, ingredient_id, quantity_on_hand, unit, source_file)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (snapshot_date, ingredient_id) DO NOTHING
"#;

const SQLITE_INSERT_INGREDIENT: &str = r#"
    INSERT INTO dim_ingredient (ingredient_name, base_unit)
    VALUES (?, ?)
    ON CONFLICT (ingredient_name) DO NOTHING
"#;

const SQLITE_FIND_INGREDIENT: &str = r#"
    SELECT ingredient_id
    FROM dim_ingredient
    WHERE ingredient_name = ?
"#;

const SQLITE_INSERT_SNAPSHOT: &str = r#"
    INSERT INTO fact_inventory_snapshot
        (snapshot_date, ingredient_id, quantity_on_hand, unit, source_file)
    VALUES (?, ?, CAST(? AS REAL), ?, ?)
    ON CONFLICT (snapshot_date, ingredient_id) DO NOTHING
"#;

/// Handle to the database holding `dim_ingredient` and
/// `fact_inventory_snapshot`.
#[derive(Debug, Clone)]
pub enum Store {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl Store {
    pub async fn connect(config: &DbConfig) -> Result<Self, sqlx::Error> {
        debug!(host = %config.host, port = config.port, database = %config.database, "Connecting to postgres");

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .connect_with(options)
            .await?;

        Ok(Store::Postgres(pool))
    }

    /// Opens (or creates) a SQLite database file. The schema must already
    /// exist.
    pub async fn open_sqlite(path: &Path) -> Result<Self, sqlx::Error> {
        debug!(path = %path.display(), "Opening sqlite store");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Store::Sqlite(pool))
    }

    pub async fn begin(&self) -> Result<FileTx, sqlx::Error> {
        match self {
            Store::Postgres(pool) => Ok(FileTx::Postgres(pool.begin().await?)),
            Store::Sqlite(pool) => Ok(FileTx::Sqlite(pool.begin().await?)),
        }
    }

    pub async fn close(&self) {
        match self {
            Store::Postgres(pool) => pool.close().await,
            Store::Sqlite(pool) => pool.close().await,
        }
    }
}

/// The single transaction that all writes for one input file go through.
pub enum FileTx {
    Postgres(Transaction<'static, Postgres>),
    Sqlite(Transaction<'static, Sqlite>),
}

impl FileTx {
    /// Inserts the ingredient unless the name is already present. Returns
    /// `true` when a row was written.
    pub async fn insert_ingredient(&mut self, ingredient: &Ingredient) -> Result<bool, sqlx::Error> {
        let rows = match self {
            FileTx::Postgres(tx) => sqlx::query(PG_INSERT_INGREDIENT)
                .bind(&ingredient.name)
                .bind(&ingredient.base_unit)
                .execute(&mut **tx)
                .await?
                .rows_affected(),
            FileTx::Sqlite(tx) => sqlx::query(SQLITE_INSERT_INGREDIENT)
                .bind(&ingredient.name)
                .bind(&ingredient.base_unit)
                .execute(&mut **tx)
                .await?
                .rows_affected(),
        };

        Ok(rows > 0)
    }

    pub async fn find_ingredient_id(&mut self, name: &str) -> Result<Option<i64>, sqlx::Error> {
        match self {
            FileTx::Postgres(tx) => {
                sqlx::query_scalar::<_, i64>(PG_FIND_INGREDIENT)
                    .bind(name)
                    .fetch_optional(&mut **tx)
                    .await
            }
            FileTx::Sqlite(tx) => {
                sqlx::query_scalar::<_, i64>(SQLITE_FIND_INGREDIENT)
                    .bind(name)
                    .fetch_optional(&mut **tx)
                    .await
            }
        }
    }

    /// Inserts the fact unless one already exists for its date and
    /// ingredient. Returns `true` when a row was written.
    pub async fn insert_snapshot(&mut self, fact: &SnapshotFact) -> Result<bool, sqlx::Error> {
        let rows = match self {
            FileTx::Postgres(tx) => sqlx::query(PG_INSERT_SNAPSHOT)
                .bind(fact.date)
                .bind(fact.ingredient_id)
                .bind(fact.quantity)
                .bind(&fact.unit)
                .bind(&fact.source_file)
                .execute(&mut **tx)
                .await?
                .rows_affected(),
            FileTx::Sqlite(tx) => sqlx::query(SQLITE_INSERT_SNAPSHOT)
                .bind(fact.date)
                .bind(fact.ingredient_id)
                .bind(fact.quantity.to_string())
                .bind(&fact.unit)
                .bind(&fact.source_file)
                .execute(&mut **tx)
                .await?
                .rows_affected(),
        };

        Ok(rows > 0)
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        match self {
            FileTx::Postgres(tx) => tx.commit().await,
            FileTx::Sqlite(tx) => tx.commit().await,
        }
    }
}
