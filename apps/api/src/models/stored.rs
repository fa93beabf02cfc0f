use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::ats::weights::WeightVector;

/// Score columns of an `analyses` row.
#[derive(Debug, Clone, FromRow)]
pub struct StoredScoreRow {
    pub ats_score: Option<f64>,
    pub weights: Option<Json<WeightVector>>,
}

/// Last settled score and weights for a (user, résumé, JD) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    pub ats_score: Option<f64>,
    pub weights: Option<WeightVector>,
}

impl From<StoredScoreRow> for StoredScore {
    fn from(row: StoredScoreRow) -> Self {
        Self {
            ats_score: row.ats_score,
            weights: row.weights.map(|Json(w)| w),
        }
    }
}
