//! Batched product writes
//!
//! Applies a batch of normalized, deduplicated records to the store with
//! insert-or-update semantics in a single SQL statement, so each batch is
//! atomic from the perspective of concurrent readers. Atomicity does not
//! extend across batches: a failed import leaves earlier batches committed.

use sqlx::PgPool;

use super::normalizer::NormalizedRecord;

/// Counts returned by one batch flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchWriteStats {
    pub created: u64,
    pub updated: u64,
}

impl BatchWriteStats {
    /// Fold another flush into running totals.
    pub fn merge(self, other: Self) -> Self {
        Self {
            created: self.created + other.created,
            updated: self.updated + other.updated,
        }
    }
}

/// Bulk insert-or-update writer for product batches
#[derive(Debug, Clone)]
pub struct BatchWriter {
    db: PgPool,
}

impl BatchWriter {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Write one batch, inserting new SKUs and overwriting existing ones.
    ///
    /// Returns how many rows were created vs. updated. The batch must not
    /// contain duplicate SKUs (the deduplicator guarantees this); a single
    /// `INSERT ... ON CONFLICT` cannot touch the same row twice.
    #[tracing::instrument(skip(self, batch), fields(rows = batch.len()))]
    pub async fn write(&self, batch: &[NormalizedRecord]) -> Result<BatchWriteStats, sqlx::Error> {
        if batch.is_empty() {
            return Ok(BatchWriteStats::default());
        }

        let mut names = Vec::with_capacity(batch.len());
        let mut skus = Vec::with_capacity(batch.len());
        let mut descriptions = Vec::with_capacity(batch.len());
        let mut actives = Vec::with_capacity(batch.len());

        for record in batch {
            names.push(record.name.clone());
            skus.push(record.sku.clone());
            descriptions.push(record.description.clone());
            actives.push(record.active);
        }

        // `xmax = 0` distinguishes freshly inserted rows from conflict
        // updates within the same statement.
        let inserted: Vec<bool> = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, sku, description, active)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::boolean[])
            ON CONFLICT (sku) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                active = EXCLUDED.active
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&names)
        .bind(&skus)
        .bind(&descriptions)
        .bind(&actives)
        .fetch_all(&self.db)
        .await?;

        let created = inserted.iter().filter(|new_row| **new_row).count() as u64;

        Ok(BatchWriteStats {
            created,
            updated: inserted.len() as u64 - created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str) -> NormalizedRecord {
        NormalizedRecord {
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            description: String::new(),
            active: true,
        }
    }

    #[test]
    fn test_stats_merge() {
        let a = BatchWriteStats {
            created: 3,
            updated: 1,
        };
        let b = BatchWriteStats {
            created: 2,
            updated: 4,
        };
        assert_eq!(
            a.merge(b),
            BatchWriteStats {
                created: 5,
                updated: 5
            }
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_write_creates_then_updates(pool: PgPool) -> sqlx::Result<()> {
        let writer = BatchWriter::new(pool.clone());

        let stats = writer
            .write(&[record("ABC-1"), record("ABC-2")])
            .await?;
        assert_eq!(stats.created, 2);
        assert_eq!(stats.updated, 0);

        let mut changed = record("ABC-1");
        changed.name = "Renamed".to_string();
        let stats = writer.write(&[changed, record("ABC-3")]).await?;
        assert_eq!(stats.created, 1);
        assert_eq!(stats.updated, 1);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 3);

        let name: String = sqlx::query_scalar("SELECT name FROM products WHERE sku = $1")
            .bind("ABC-1")
            .fetch_one(&pool)
            .await?;
        assert_eq!(name, "Renamed");

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_empty_batch_is_noop(pool: PgPool) -> sqlx::Result<()> {
        let writer = BatchWriter::new(pool);
        let stats = writer.write(&[]).await?;
        assert_eq!(stats, BatchWriteStats::default());
        Ok(())
    }
}
