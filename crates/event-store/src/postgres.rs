use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AggregateId, EventEnvelope, EventId, EventStoreError, Result, StreamId, Version,
    store::{EventStore, EventStream, StreamAppend, validate_batch},
};

const SELECT_EVENTS: &str = r#"
    SELECT id, event_type, aggregate_type, aggregate_id, version, recorded_at, payload
    FROM events
"#;

/// PostgreSQL-backed event store.
///
/// Each commit runs in one SERIALIZABLE transaction. Version checks read the
/// stream heads inside that transaction, and the
/// `(aggregate_type, aggregate_id, version)` unique constraint backs them up.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store on a fresh pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<EventEnvelope> {
        Ok(EventEnvelope {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            aggregate_type: row.try_get("aggregate_type")?,
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            version: Version::new(row.try_get("version")?),
            recorded_at: row.try_get("recorded_at")?,
            payload: row.try_get("payload")?,
        })
    }

    async fn head(tx: &mut Transaction<'_, Postgres>, stream: &StreamId) -> Result<Version> {
        let head: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(version) FROM events WHERE aggregate_type = $1 AND aggregate_id = $2",
        )
        .bind(&stream.aggregate_type)
        .bind(stream.aggregate_id.as_uuid())
        .fetch_one(&mut **tx)
        .await?;
        Ok(Version::new(head.unwrap_or(0)))
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        append: &StreamAppend,
        event: &EventEnvelope,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, event_type, aggregate_type, aggregate_id, version, recorded_at, payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.event_id.as_uuid())
        .bind(&event.event_type)
        .bind(&event.aggregate_type)
        .bind(event.aggregate_id.as_uuid())
        .bind(event.version.as_i64())
        .bind(event.recorded_at)
        .bind(&event.payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_stream_version")
            {
                return EventStoreError::ConcurrencyConflict {
                    stream: append.stream.clone(),
                    expected: append.expected_version,
                    actual: event.version,
                };
            }
            EventStoreError::Database(e)
        })?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn commit(&self, batch: Vec<StreamAppend>) -> Result<Vec<EventEnvelope>> {
        validate_batch(&batch)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        for append in &batch {
            let actual = Self::head(&mut tx, &append.stream).await?;
            if actual != append.expected_version {
                return Err(EventStoreError::ConcurrencyConflict {
                    stream: append.stream.clone(),
                    expected: append.expected_version,
                    actual,
                });
            }
        }

        for append in &batch {
            for event in &append.events {
                Self::insert(&mut tx, append, event).await?;
            }
        }

        tx.commit().await?;

        let committed: Vec<EventEnvelope> = batch.into_iter().flat_map(|a| a.events).collect();
        metrics::counter!("event_store_events_appended_total").increment(committed.len() as u64);
        tracing::debug!(events = committed.len(), "committed batch");
        Ok(committed)
    }

    async fn read_stream(&self, stream: &StreamId) -> Result<Vec<EventEnvelope>> {
        let rows = sqlx::query(&format!(
            "{SELECT_EVENTS} WHERE aggregate_type = $1 AND aggregate_id = $2 ORDER BY version ASC"
        ))
        .bind(&stream.aggregate_type)
        .bind(stream.aggregate_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn stream_version(&self, stream: &StreamId) -> Result<Option<Version>> {
        let version: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(version) FROM events WHERE aggregate_type = $1 AND aggregate_id = $2",
        )
        .bind(&stream.aggregate_type)
        .bind(stream.aggregate_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(version.map(Version::new))
    }

    async fn stream_all(&self) -> Result<EventStream> {
        use futures_util::StreamExt;

        let pool = self.pool.clone();
        let sql = format!("{SELECT_EVENTS} ORDER BY position ASC");
        let stream = futures_util::stream::once(async move {
            let events: Vec<Result<EventEnvelope>> = match sqlx::query(&sql).fetch_all(&pool).await {
                Ok(rows) => rows.into_iter().map(Self::row_to_event).collect(),
                Err(e) => vec![Err(EventStoreError::Database(e))],
            };
            futures_util::stream::iter(events)
        })
        .flatten();

        Ok(Box::pin(stream))
    }
}
