use std::time::Duration;

use anyhow::Context as _;
use chrono::{DateTime, SubsecRound as _, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement,
    TransactionTrait, Value,
};

use silo_domain::outbox::{OutboxCategory, OutboxDirection, OutboxScope};

use crate::error::OutboxError;
use crate::record::{CoalescingKey, NewOutbox, OutboxRecord};
use crate::store::{ClaimOutcome, ClaimedShard, OutboxStore};

/// The two physical outbox tables. Each silo owns exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxTable {
    /// `region_outboxes`, written by a region, drained towards control.
    Region,
    /// `control_outboxes`, written by control, drained towards each region.
    Control,
}

impl OutboxTable {
    pub fn name(self) -> &'static str {
        match self {
            Self::Region => "region_outboxes",
            Self::Control => "control_outboxes",
        }
    }

    pub fn direction(self) -> OutboxDirection {
        match self {
            Self::Region => OutboxDirection::RegionToControl,
            Self::Control => OutboxDirection::ControlToRegion,
        }
    }

    fn has_region_column(self) -> bool {
        matches!(self, Self::Control)
    }

    /// Projection of the coalescing columns, `NULL` region for region tables.
    fn key_columns(self) -> &'static str {
        match self {
            Self::Region => {
                "NULL::text AS region_name, shard_scope, shard_identifier, category, object_identifier"
            }
            Self::Control => "region_name, shard_scope, shard_identifier, category, object_identifier",
        }
    }

    fn group_columns(self) -> &'static str {
        match self {
            Self::Region => "shard_scope, shard_identifier, category, object_identifier",
            Self::Control => "region_name, shard_scope, shard_identifier, category, object_identifier",
        }
    }

    /// `WHERE` fragment matching one key, with placeholders starting at `$1`.
    fn key_predicate(self, key: &CoalescingKey) -> (String, Vec<Value>) {
        let mut values: Vec<Value> = Vec::with_capacity(5);
        let mut clauses = Vec::with_capacity(5);
        if self.has_region_column() {
            values.push(key.region_name.clone().into());
            clauses.push(format!("region_name = ${}", values.len()));
        }
        values.push(key.scope.as_i32().into());
        clauses.push(format!("shard_scope = ${}", values.len()));
        values.push(key.shard_identifier.into());
        clauses.push(format!("shard_identifier = ${}", values.len()));
        values.push(key.category.as_i32().into());
        clauses.push(format!("category = ${}", values.len()));
        values.push(key.object_identifier.into());
        clauses.push(format!("object_identifier = ${}", values.len()));
        (clauses.join(" AND "), values)
    }
}

/// Insert `records` into `table` on `conn`.
///
/// Call with the caller's open transaction so the rows commit or roll back
/// together with the mutation that produced them.
pub async fn write_outboxes<C: ConnectionTrait>(
    conn: &C,
    table: OutboxTable,
    records: &[NewOutbox],
    now: DateTime<Utc>,
) -> Result<(), OutboxError> {
    for record in records {
        if record.direction() != table.direction() {
            return Err(OutboxError::MisconfiguredCategory {
                category: record.category(),
                attempted: table.direction(),
            });
        }
    }

    for record in records {
        let payload = Value::Json(record.payload().cloned().map(Box::new));
        let statement = match table {
            OutboxTable::Region => Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                INSERT INTO region_outboxes
                    (shard_scope, shard_identifier, category, object_identifier, payload,
                     attempts, scheduled_from, scheduled_for, date_added)
                VALUES ($1, $2, $3, $4, $5, 0, $6, $6, $6)
                "#,
                [
                    record.scope().as_i32().into(),
                    record.shard_identifier().into(),
                    record.category().as_i32().into(),
                    record.object_identifier().into(),
                    payload,
                    now.into(),
                ],
            ),
            OutboxTable::Control => Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                INSERT INTO control_outboxes
                    (region_name, shard_scope, shard_identifier, category, object_identifier,
                     payload, attempts, scheduled_from, scheduled_for, date_added)
                VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7, $7)
                "#,
                [
                    record.region_name().map(str::to_owned).into(),
                    record.scope().as_i32().into(),
                    record.shard_identifier().into(),
                    record.category().as_i32().into(),
                    record.object_identifier().into(),
                    payload,
                    now.into(),
                ],
            ),
        };
        conn.execute(statement).await?;
    }
    Ok(())
}

#[derive(Debug, FromQueryResult)]
struct KeyRow {
    region_name: Option<String>,
    shard_scope: i32,
    shard_identifier: i64,
    category: i32,
    object_identifier: i64,
}

impl KeyRow {
    fn into_key(self) -> Result<CoalescingKey, OutboxError> {
        Ok(CoalescingKey {
            region_name: self.region_name,
            scope: decode_scope(self.shard_scope)?,
            shard_identifier: self.shard_identifier,
            category: decode_category(self.category)?,
            object_identifier: self.object_identifier,
        })
    }
}

#[derive(Debug, Clone, FromQueryResult)]
struct OutboxRow {
    id: i64,
    region_name: Option<String>,
    shard_scope: i32,
    shard_identifier: i64,
    category: i32,
    object_identifier: i64,
    payload: Option<serde_json::Value>,
    attempts: i32,
    last_attempt_duration_ms: Option<i64>,
    scheduled_from: DateTime<Utc>,
    scheduled_for: DateTime<Utc>,
    date_added: DateTime<Utc>,
}

impl OutboxRow {
    fn into_record(self) -> Result<OutboxRecord, OutboxError> {
        Ok(OutboxRecord {
            id: self.id,
            region_name: self.region_name,
            scope: decode_scope(self.shard_scope)?,
            shard_identifier: self.shard_identifier,
            category: decode_category(self.category)?,
            object_identifier: self.object_identifier,
            payload: self.payload,
            attempts: self.attempts,
            last_attempt_duration: self
                .last_attempt_duration_ms
                .map(|ms| Duration::from_millis(ms.max(0) as u64)),
            scheduled_from: self.scheduled_from,
            scheduled_for: self.scheduled_for,
            date_added: self.date_added,
        })
    }
}

fn decode_scope(code: i32) -> Result<OutboxScope, OutboxError> {
    OutboxScope::from_i32(code).ok_or(OutboxError::UnknownScope(code))
}

fn decode_category(code: i32) -> Result<OutboxCategory, OutboxError> {
    OutboxCategory::from_i32(code).ok_or(OutboxError::UnknownCategory(code))
}

/// Postgres-backed [`OutboxStore`] over one outbox table.
#[derive(Clone)]
pub struct SeaOutboxStore {
    pub db: DatabaseConnection,
    pub table: OutboxTable,
}

impl SeaOutboxStore {
    pub fn new(db: DatabaseConnection, table: OutboxTable) -> Self {
        Self { db, table }
    }
}

impl OutboxStore for SeaOutboxStore {
    async fn due_shards(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<CoalescingKey>, OutboxError> {
        let sql = format!(
            r#"
            SELECT {columns}
            FROM {table}
            GROUP BY {group}
            HAVING MAX(scheduled_for) <= $1
            ORDER BY MIN(id)
            LIMIT $2
            "#,
            columns = self.table.key_columns(),
            table = self.table.name(),
            group = self.table.group_columns(),
        );
        let rows = KeyRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [now.into(), (limit as i64).into()],
        ))
        .all(&self.db)
        .await
        .context("list due outbox shards")?;

        rows.into_iter().map(KeyRow::into_key).collect()
    }

    async fn claim(
        &self,
        key: &CoalescingKey,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<ClaimOutcome, OutboxError> {
        // Postgres keeps microseconds; the stamp must compare equal when read back.
        let now = now.trunc_subsecs(6);
        let table = self.table;
        let (predicate, values) = table.key_predicate(key);

        let select_sql = format!(
            r#"
            SELECT id, {key_columns}, payload, attempts, last_attempt_duration_ms,
                   scheduled_from, scheduled_for, date_added
            FROM {table}
            WHERE {predicate}
            ORDER BY id
            FOR UPDATE
            "#,
            key_columns = table.key_columns(),
            table = table.name(),
        );
        let next = values.len();
        let update_sql = format!(
            r#"
            UPDATE {table}
            SET scheduled_from = ${from}, scheduled_for = ${until}
            WHERE {predicate} AND id <= ${through}
            "#,
            table = table.name(),
            from = next + 1,
            until = next + 2,
            through = next + 3,
        );

        let rows = self
            .db
            .transaction::<_, Option<Vec<OutboxRow>>, DbErr>(|txn| {
                Box::pin(async move {
                    let rows = OutboxRow::find_by_statement(Statement::from_sql_and_values(
                        DbBackend::Postgres,
                        &select_sql,
                        values.clone(),
                    ))
                    .all(txn)
                    .await?;

                    if rows.iter().any(|row| row.scheduled_for > now) {
                        return Ok(None);
                    }
                    let Some(through_id) = rows.last().map(|row| row.id) else {
                        return Ok(Some(rows));
                    };

                    let mut update_values = values;
                    update_values.push(now.into());
                    update_values.push(lease_until.into());
                    update_values.push(through_id.into());
                    txn.execute(Statement::from_sql_and_values(
                        DbBackend::Postgres,
                        &update_sql,
                        update_values,
                    ))
                    .await?;
                    Ok(Some(rows))
                })
            })
            .await
            .context("claim outbox shard")?;

        let Some(rows) = rows else {
            return Ok(ClaimOutcome::Busy);
        };
        let row_count = rows.len() as u64;
        let attempts = rows.iter().map(|row| row.attempts).max().unwrap_or(0);
        let Some(newest) = rows.into_iter().next_back() else {
            return Ok(ClaimOutcome::Empty);
        };

        let mut representative = newest.into_record()?;
        representative.scheduled_from = now;
        representative.scheduled_for = lease_until;
        Ok(ClaimOutcome::Claimed(ClaimedShard {
            key: key.clone(),
            through_id: representative.id,
            attempts,
            row_count,
            representative,
            claimed_at: now,
        }))
    }

    async fn delete_claimed(&self, shard: &ClaimedShard) -> Result<u64, OutboxError> {
        let (predicate, mut values) = self.table.key_predicate(&shard.key);
        let next = values.len();
        let sql = format!(
            "DELETE FROM {table} WHERE {predicate} AND id <= ${through} AND scheduled_from = ${claimed_at}",
            table = self.table.name(),
            through = next + 1,
            claimed_at = next + 2,
        );
        values.push(shard.through_id.into());
        values.push(shard.claimed_at.into());
        let result = self
            .db
            .execute(Statement::from_sql_and_values(DbBackend::Postgres, &sql, values))
            .await
            .context("delete delivered outbox rows")?;
        Ok(result.rows_affected())
    }

    async fn reschedule(
        &self,
        shard: &ClaimedShard,
        next_at: DateTime<Utc>,
        attempt_duration: Duration,
    ) -> Result<u64, OutboxError> {
        let (predicate, mut values) = self.table.key_predicate(&shard.key);
        let next = values.len();
        let sql = format!(
            r#"
            UPDATE {table}
            SET attempts = attempts + 1,
                last_attempt_duration_ms = ${duration},
                scheduled_for = ${next_at}
            WHERE {predicate} AND id <= ${through} AND scheduled_from = ${claimed_at}
            "#,
            table = self.table.name(),
            duration = next + 1,
            next_at = next + 2,
            through = next + 3,
            claimed_at = next + 4,
        );
        values.push((attempt_duration.as_millis().min(i64::MAX as u128) as i64).into());
        values.push(next_at.into());
        values.push(shard.through_id.into());
        values.push(shard.claimed_at.into());
        let result = self
            .db
            .execute(Statement::from_sql_and_values(DbBackend::Postgres, &sql, values))
            .await
            .context("reschedule outbox rows")?;
        Ok(result.rows_affected())
    }
}
