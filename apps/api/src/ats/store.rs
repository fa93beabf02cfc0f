//! Persistence side channel for settled scores.
//!
//! The `analyses` table belongs to the analysis service; this module only reads and
//! updates its `ats_score` and `weights` columns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ats::weights::WeightVector;
use crate::errors::AppError;
use crate::models::stored::{StoredScore, StoredScoreRow};

/// Identifies one analysis: the user plus hashes of the résumé and job description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisKey {
    pub user_id: Uuid,
    pub resume_hash: String,
    pub jd_hash: String,
}

/// Carried in `AppState` as `Arc<dyn ScoreStore>`.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Writes score and weights. Returns `false` when no analysis exists for `key`.
    async fn save_score(
        &self,
        key: &AnalysisKey,
        score: f64,
        weights: &WeightVector,
    ) -> Result<bool, AppError>;

    async fn load_score(&self, key: &AnalysisKey) -> Result<Option<StoredScore>, AppError>;
}

pub struct PgScoreStore {
    pool: PgPool,
}

impl PgScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a small pool; the service issues one short query per settled change.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn save_score(
        &self,
        key: &AnalysisKey,
        score: f64,
        weights: &WeightVector,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE analyses
            SET ats_score = $1, weights = $2
            WHERE user_id = $3 AND resume_hash = $4 AND jd_hash = $5
            "#,
        )
        .bind(score)
        .bind(Json(*weights))
        .bind(key.user_id)
        .bind(&key.resume_hash)
        .bind(&key.jd_hash)
        .execute(&self.pool)
        .await?;

        debug!(
            user_id = %key.user_id,
            rows = result.rows_affected(),
            "ats score saved"
        );
        Ok(result.rows_affected() > 0)
    }

    async fn load_score(&self, key: &AnalysisKey) -> Result<Option<StoredScore>, AppError> {
        let row: Option<StoredScoreRow> = sqlx::query_as(
            r#"
            SELECT ats_score, weights
            FROM analyses
            WHERE user_id = $1 AND resume_hash = $2 AND jd_hash = $3
            LIMIT 1
            "#,
        )
        .bind(key.user_id)
        .bind(&key.resume_hash)
        .bind(&key.jd_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredScore::from))
    }
}
