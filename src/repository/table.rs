//! Database table operations and implementations.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::model::BotMetaModel;
use crate::model::SubscriberModel;
use crate::repository::error::DatabaseError;

/// Base table struct providing database pool access.
#[derive(Clone)]
pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    /// Creates a new base table with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Base trait for table operations.
#[async_trait::async_trait]
pub trait TableBase {
    /// Creates the table if it doesn't exist.
    async fn create_table(&self) -> Result<(), DatabaseError>;
    /// Drops the table.
    async fn drop_table(&self) -> Result<(), DatabaseError>;
    /// Deletes all rows from the table.
    async fn delete_all(&self) -> Result<(), DatabaseError>;
}

/// Trait for tables with CRUD operations.
#[async_trait::async_trait]
pub trait Table<T, ID>: TableBase {
    async fn select_all(&self) -> Result<Vec<T>, DatabaseError>;
    async fn select(&self, id: &ID) -> Result<Option<T>, DatabaseError>;
    async fn replace(&self, model: &T) -> Result<(), DatabaseError>;
    async fn delete(&self, id: &ID) -> Result<(), DatabaseError>;
}

// ============================================================================
// SubscriberTable
// ============================================================================

#[derive(Clone)]
pub struct SubscriberTable {
    base: BaseTable,
}

impl SubscriberTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseTable::new(pool),
        }
    }

    pub async fn select_all_subscribed(&self) -> Result<Vec<SubscriberModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, SubscriberModel>(
            "SELECT * FROM subscribers WHERE subscribed = 1 ORDER BY user_id",
        )
        .fetch_all(&self.base.pool)
        .await?)
    }

    /// Moves `last_interaction_date` forward to `date` and resets the silence
    /// bookkeeping, as a single conditional write. A same-or-earlier date is
    /// a no-op, which makes interaction recording idempotent.
    ///
    /// Returns whether the row changed.
    pub async fn advance_interaction_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        let res = sqlx::query(
            r#"
            UPDATE subscribers
            SET last_interaction_date = ?, silent_days = 0, escalated = 0
            WHERE user_id = ?
                AND subscribed = 1
                AND (last_interaction_date IS NULL OR last_interaction_date < ?)
            "#,
        )
        .bind(date)
        .bind(user_id as i64)
        .bind(date)
        .execute(&self.base.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_silent_days(&self, user_id: u64, days: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE subscribers SET silent_days = ? WHERE user_id = ? AND subscribed = 1")
            .bind(days)
            .bind(user_id as i64)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    /// Flips `escalated` from false to true. At most one of several
    /// concurrent callers observes `true`; the flag stays set until an
    /// interaction clears it.
    pub async fn claim_escalation(&self, user_id: u64) -> Result<bool, DatabaseError> {
        let res = sqlx::query(
            "UPDATE subscribers SET escalated = 1 WHERE user_id = ? AND escalated = 0 AND subscribed = 1",
        )
        .bind(user_id as i64)
        .execute(&self.base.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn touch_reminded(
        &self,
        user_id: u64,
        at: &DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE subscribers SET last_reminded_at = ? WHERE user_id = ?")
            .bind(at)
            .bind(user_id as i64)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    pub async fn set_subscribed(
        &self,
        user_id: u64,
        subscribed: bool,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE subscribers SET subscribed = ? WHERE user_id = ?")
            .bind(subscribed)
            .bind(user_id as i64)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TableBase for SubscriberTable {
    async fn create_table(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                user_id INTEGER PRIMARY KEY,
                subscribed INTEGER NOT NULL DEFAULT 1,
                subscribed_at TIMESTAMP NOT NULL,
                last_interaction_date DATE DEFAULT NULL,
                silent_days INTEGER NOT NULL DEFAULT 0,
                escalated INTEGER NOT NULL DEFAULT 0,
                last_reminded_at TIMESTAMP DEFAULT NULL
            )
            "#,
        )
        .execute(&self.base.pool)
        .await?;
        Ok(())
    }

    async fn drop_table(&self) -> Result<(), DatabaseError> {
        sqlx::query("DROP TABLE IF EXISTS subscribers")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM subscribers")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Table<SubscriberModel, u64> for SubscriberTable {
    async fn select_all(&self) -> Result<Vec<SubscriberModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, SubscriberModel>("SELECT * FROM subscribers ORDER BY user_id")
                .fetch_all(&self.base.pool)
                .await?,
        )
    }

    async fn select(&self, id: &u64) -> Result<Option<SubscriberModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, SubscriberModel>("SELECT * FROM subscribers WHERE user_id = ?")
                .bind(*id as i64)
                .fetch_optional(&self.base.pool)
                .await?,
        )
    }

    async fn replace(&self, model: &SubscriberModel) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            REPLACE INTO subscribers
                (user_id, subscribed, subscribed_at, last_interaction_date,
                 silent_days, escalated, last_reminded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(model.user_id as i64)
        .bind(model.subscribed)
        .bind(model.subscribed_at)
        .bind(model.last_interaction_date)
        .bind(model.silent_days)
        .bind(model.escalated)
        .bind(model.last_reminded_at)
        .execute(&self.base.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &u64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM subscribers WHERE user_id = ?")
            .bind(*id as i64)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}

// ============================================================================
// BotMetaTable
// ============================================================================

#[derive(Clone)]
pub struct BotMetaTable {
    base: BaseTable,
}

impl BotMetaTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseTable::new(pool),
        }
    }

    /// Upserts `value` only when it sorts strictly after the stored value
    /// (or no value is stored). ISO dates sort lexicographically, so this is
    /// a claim: of several concurrent writers for the same day, exactly one
    /// sees `true`.
    pub async fn replace_if_greater(
        &self,
        key: impl Into<String> + Send,
        value: impl Into<String> + Send,
    ) -> Result<bool, DatabaseError> {
        let res = sqlx::query(
            r#"
            INSERT INTO bot_meta (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            WHERE excluded.value > bot_meta.value
            "#,
        )
        .bind(key.into())
        .bind(value.into())
        .execute(&self.base.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl TableBase for BotMetaTable {
    async fn create_table(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bot_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.base.pool)
        .await?;
        Ok(())
    }

    async fn drop_table(&self) -> Result<(), DatabaseError> {
        sqlx::query("DROP TABLE IF EXISTS bot_meta")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM bot_meta")
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Table<BotMetaModel, String> for BotMetaTable {
    async fn select_all(&self) -> Result<Vec<BotMetaModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, BotMetaModel>("SELECT * FROM bot_meta ORDER BY key")
                .fetch_all(&self.base.pool)
                .await?,
        )
    }

    async fn select(&self, id: &String) -> Result<Option<BotMetaModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, BotMetaModel>("SELECT * FROM bot_meta WHERE key = ?")
                .bind(id)
                .fetch_optional(&self.base.pool)
                .await?,
        )
    }

    async fn replace(&self, model: &BotMetaModel) -> Result<(), DatabaseError> {
        sqlx::query("REPLACE INTO bot_meta (key, value) VALUES (?, ?)")
            .bind(&model.key)
            .bind(&model.value)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &String) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM bot_meta WHERE key = ?")
            .bind(id)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}
