//! Relational storage for people.
//!
//! [`PersonStore`] owns the `person` table and every operation over it. Each
//! operation runs in its own explicit transaction: it is committed on success
//! and rolled back when the transaction guard is dropped on any early return.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE person (
//!     id   INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL
//! );
//! ```
//!
//! `AUTOINCREMENT` makes the id sequence monotonic: ids of deleted rows are
//! never handed out again. [`PersonStore::bootstrap`] drops and recreates the
//! table, resetting the sequence, then loads the seed rows.

use crate::server::config::StoreConfig;
use core::str::FromStr;
use person_tonic_core::{Error, Person, PersonId, Result, validate_name};
use sqlx::{
    Sqlite, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use tracing::{debug, info, instrument};


/// Names loaded on every bootstrap, in insertion order (ids 1 to 4). The
/// duplicate "Alice" exercises multi-row name lookups.
pub const SEED_NAMES: [&str; 4] = ["Alice", "Bob", "Charlie", "Alice"];

const SCHEMA: [&str; 3] = [
    "DROP TABLE IF EXISTS person",
    "CREATE TABLE person (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "DELETE FROM sqlite_sequence WHERE name = 'person'",
];

type PersonRow = (PersonId, String);

fn into_person((id, name): PersonRow) -> Person {
    Person { id, name }
}

fn storage_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| Error::Storage {
        context: format!("{operation} failed: {e}"),
    }
}

/// SQLite-backed store for the `person` table.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct PersonStore {
    pool: SqlitePool,
}

impl PersonStore {
    /// Connects to the database described by `config` without touching the
    /// schema.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// served by exactly one connection that is never reaped.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(storage_error("parse database url"))?
            .create_if_missing(true);

        let pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);
        let pool_options = if config.is_in_memory() {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<core::time::Duration>)
                .max_lifetime(None::<core::time::Duration>)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(storage_error("connect"))?;

        Ok(Self { pool })
    }

    /// Connects and bootstraps in one step; this is what the server runs at
    /// startup.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let store = Self::connect(config).await?;
        store.bootstrap().await?;
        Ok(store)
    }

    /// Drops and recreates the schema, then inserts [`SEED_NAMES`].
    ///
    /// Any prior content of the table, including the id sequence, is lost.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<()> {
        let mut tx = self.begin("bootstrap").await?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("create schema"))?;
        }

        for name in SEED_NAMES {
            sqlx::query("INSERT INTO person (name) VALUES (?1)")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("seed"))?;
        }

        commit(tx, "bootstrap").await?;
        info!("Schema recreated with {} seed rows", SEED_NAMES.len());
        Ok(())
    }

    /// Looks a person up by primary key. Absence is `Ok(None)`.
    #[instrument(level = "debug", skip(self))]
    pub async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>> {
        let mut tx = self.begin("find_by_id").await?;
        let row: Option<PersonRow> = sqlx::query_as("SELECT id, name FROM person WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error("find_by_id"))?;
        commit(tx, "find_by_id").await?;

        debug!(found = row.is_some());
        Ok(row.map(into_person))
    }

    /// Returns every person whose name equals `name` exactly
    /// (case-sensitive), in insertion order.
    #[instrument(level = "debug", skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Person>> {
        let mut tx = self.begin("find_by_name").await?;
        let rows: Vec<PersonRow> =
            sqlx::query_as("SELECT id, name FROM person WHERE name = ?1 ORDER BY id")
                .bind(name)
                .fetch_all(&mut *tx)
                .await
                .map_err(storage_error("find_by_name"))?;
        commit(tx, "find_by_name").await?;

        debug!(matches = rows.len());
        Ok(rows.into_iter().map(into_person).collect())
    }

    /// Returns every person in insertion order.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Person>> {
        let mut tx = self.begin("list_all").await?;
        let rows: Vec<PersonRow> = sqlx::query_as("SELECT id, name FROM person ORDER BY id")
            .fetch_all(&mut *tx)
            .await
            .map_err(storage_error("list_all"))?;
        commit(tx, "list_all").await?;

        debug!(rows = rows.len());
        Ok(rows.into_iter().map(into_person).collect())
    }

    /// Inserts a new person and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for a blank name, in which case nothing is
    /// written and the sequence does not advance.
    #[instrument(level = "debug", skip(self))]
    pub async fn create(&self, name: &str) -> Result<Person> {
        let name = validate_name(name)?;

        let mut tx = self.begin("create").await?;
        let row: PersonRow =
            sqlx::query_as("INSERT INTO person (name) VALUES (?1) RETURNING id, name")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error("create"))?;
        commit(tx, "create").await?;

        debug!(id = row.0, "Inserted person");
        Ok(into_person(row))
    }

    /// Overwrites the name of person `id` with a direct `UPDATE` and returns
    /// the updated row, or `Ok(None)` if no such person exists.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for a blank name, checked before the lookup.
    #[instrument(level = "debug", skip(self))]
    pub async fn update(&self, id: PersonId, name: &str) -> Result<Option<Person>> {
        let name = validate_name(name)?;

        let mut tx = self.begin("update").await?;
        let row: Option<PersonRow> =
            sqlx::query_as("UPDATE person SET name = ?2 WHERE id = ?1 RETURNING id, name")
                .bind(id)
                .bind(name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage_error("update"))?;
        commit(tx, "update").await?;

        debug!(found = row.is_some());
        Ok(row.map(into_person))
    }

    /// Hard-deletes person `id`. Returns whether a row was removed.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: PersonId) -> Result<bool> {
        let mut tx = self.begin("delete").await?;
        let result = sqlx::query("DELETE FROM person WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("delete"))?;
        commit(tx, "delete").await?;

        let deleted = result.rows_affected() > 0;
        debug!(deleted = deleted);
        Ok(deleted)
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    /// Later operations fail with [`Error::Storage`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    async fn begin(&self, operation: &'static str) -> Result<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(storage_error(operation))
    }
}

async fn commit(tx: Transaction<'_, Sqlite>, operation: &'static str) -> Result<()> {
    tx.commit().await.map_err(storage_error(operation))
}
