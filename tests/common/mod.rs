#![allow(dead_code)]

use larder::config::PipelineConfig;
use larder::store::Store;

use sqlx::SqlitePool;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CREATE_INGREDIENT: &str = r#"
    CREATE TABLE dim_ingredient (
        ingredient_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        ingredient_name TEXT NOT NULL UNIQUE,
        base_unit       TEXT NOT NULL
    )
"#;

const CREATE_SNAPSHOT: &str = r#"
    CREATE TABLE fact_inventory_snapshot (
        snapshot_date    TEXT NOT NULL,
        ingredient_id    INTEGER NOT NULL REFERENCES dim_ingredient (ingredient_id),
        quantity_on_hand REAL NOT NULL,
        unit             TEXT NOT NULL,
        source_file      TEXT NOT NULL,
        UNIQUE (snapshot_date, ingredient_id)
    )
"#;

/// A data root plus a fresh SQLite store with the warehouse tables.
pub struct TestEnv {
    pub root: TempDir,
    pub config: PipelineConfig,
    pub store: Store,
    pub pool: SqlitePool,
}

#[derive(Debug, PartialEq)]
pub struct FactRow {
    pub snapshot_date: String,
    pub ingredient_name: String,
    pub quantity_on_hand: f64,
    pub unit: String,
    pub source_file: String,
}

impl TestEnv {
    pub async fn new() -> Self {
        let root = TempDir::new().unwrap();
        let config = PipelineConfig::new(root.path().join("data"));
        fs::create_dir_all(config.inbox()).unwrap();

        let store = Store::open_sqlite(&root.path().join("warehouse.db"))
            .await
            .unwrap();
        let pool = match &store {
            Store::Sqlite(pool) => pool.clone(),
            Store::Postgres(_) => unreachable!(),
        };

        sqlx::query(CREATE_INGREDIENT).execute(&pool).await.unwrap();
        sqlx::query(CREATE_SNAPSHOT).execute(&pool).await.unwrap();

        Self {
            root,
            config,
            store,
            pool,
        }
    }

    /// Writes `content` to `inbox/<name>` and returns the path.
    pub fn inbox_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config.inbox().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn processed_file(&self, name: &str) -> PathBuf {
        self.config.processed().join(name)
    }

    pub fn rejected_file(&self, name: &str) -> PathBuf {
        self.config.rejects().join(name)
    }

    pub async fn seed_ingredients(&self, rows: &[(&str, &str)]) {
        for (name, unit) in rows {
            sqlx::query("INSERT INTO dim_ingredient (ingredient_name, base_unit) VALUES (?, ?)")
                .bind(*name)
                .bind(*unit)
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    pub async fn ingredients(&self) -> Vec<(String, String)> {
        sqlx::query_as::<_, (String, String)>(
            "SELECT ingredient_name, base_unit FROM dim_ingredient ORDER BY ingredient_id",
        )
        .fetch_all(&self.pool)
        .await
        .unwrap()
    }

    pub async fn facts(&self) -> Vec<FactRow> {
        let rows = sqlx::query_as::<_, (String, String, f64, String, String)>(
            r#"
            SELECT f.snapshot_date, i.ingredient_name, f.quantity_on_hand, f.unit, f.source_file
            FROM fact_inventory_snapshot f
            JOIN dim_ingredient i ON i.ingredient_id = f.ingredient_id
            ORDER BY f.snapshot_date, i.ingredient_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap();

        rows.into_iter()
            .map(
                |(snapshot_date, ingredient_name, quantity_on_hand, unit, source_file)| FactRow {
                    snapshot_date,
                    ingredient_name,
                    quantity_on_hand,
                    unit,
                    source_file,
                },
            )
            .collect()
    }

    pub async fn drop_fact_table(&self) {
        sqlx::query("DROP TABLE fact_inventory_snapshot")
            .execute(&self.pool)
            .await
            .unwrap();
    }
}
