//! Axum route handlers for the ATS scoring API.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ats::combinator::{final_score, score_report, ScoreReport};
use crate::ats::current_year;
use crate::ats::store::AnalysisKey;
use crate::ats::weights::{Category, PercentWeights, WeightVector};
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::models::stored::StoredScore;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
    /// Omitted → initialized from the analysis' requirement flags.
    #[serde(default)]
    pub weights: Option<WeightVector>,
}

#[derive(Debug, Deserialize)]
pub struct WeightChangeRequest {
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
    /// Weights before the change.
    #[serde(default)]
    pub weights: WeightVector,
    pub category: Category,
    /// New percentage for `category`, 0–100.
    pub value: u32,
    pub user_id: Option<Uuid>,
    pub resume_hash: Option<String>,
    pub jd_hash: Option<String>,
}

impl WeightChangeRequest {
    fn analysis_key(&self) -> Option<AnalysisKey> {
        Some(AnalysisKey {
            user_id: self.user_id?,
            resume_hash: self.resume_hash.clone()?,
            jd_hash: self.jd_hash.clone()?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeightChangeResponse {
    pub weights: PercentWeights,
    pub weight_vector: WeightVector,
    pub final_score: f64,
    pub rounded_score: u32,
    /// True when a debounced write of this result has been scheduled.
    pub persisted_pending: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
}

#[derive(Debug, Deserialize)]
pub struct SetScoreRequest {
    pub user_id: Uuid,
    pub resume_hash: String,
    pub jd_hash: String,
    pub score: f64,
    pub weights: WeightVector,
}

#[derive(Debug, Deserialize)]
pub struct ScoreQuery {
    pub user_id: Uuid,
    pub resume_hash: String,
    pub jd_hash: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ats/score
///
/// Scores an analysis with the given weights, or with weights initialized from what
/// the JD requires when none are supplied.
pub async fn handle_score(
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreReport>, AppError> {
    let weights = match request.weights {
        Some(weights) => {
            weights.validate()?;
            if !weights.is_normalized() {
                debug!(sum = weights.sum(), "scoring with weights that do not sum to 1.0");
            }
            weights
        }
        None => request
            .analysis
            .as_ref()
            .map(WeightVector::from_requirements)
            .unwrap_or_default(),
    };

    let report = score_report(request.analysis.as_ref(), weights, current_year());
    debug!(score = report.final_score, ?weights, "ats score computed");
    Ok(Json(report))
}

/// POST /api/v1/ats/weights
///
/// Pins one category to a new percentage, renormalizes the rest, and rescores.
/// When the request identifies a stored analysis, the result is persisted once the
/// user stops adjusting.
pub async fn handle_weight_change(
    State(state): State<AppState>,
    Json(request): Json<WeightChangeRequest>,
) -> Result<Json<WeightChangeResponse>, AppError> {
    let percent = request.weights.to_percent()?;

    let Some(analysis) = request.analysis.as_ref() else {
        // Without an analysis the sliders are inert.
        return Ok(Json(WeightChangeResponse {
            weights: percent,
            weight_vector: request.weights,
            final_score: 0.0,
            rounded_score: 0,
            persisted_pending: false,
        }));
    };

    let adjusted = percent.adjust(request.category, request.value)?;
    let weight_vector = adjusted.to_vector();
    let score = final_score(Some(analysis), &weight_vector, current_year());
    let rounded_score = score.round() as u32;

    let persisted_pending = match request.analysis_key() {
        Some(key) => {
            persist_when_settled(&state, key, f64::from(rounded_score), weight_vector);
            true
        }
        None => false,
    };

    debug!(
        category = ?request.category,
        pinned = adjusted.get(request.category),
        ?adjusted,
        score,
        "weights renormalized"
    );

    Ok(Json(WeightChangeResponse {
        weights: adjusted,
        weight_vector,
        final_score: score,
        rounded_score,
        persisted_pending,
    }))
}

/// POST /api/v1/ats/weights/reset
pub async fn handle_reset_weights(
    Json(request): Json<ResetRequest>,
) -> Result<Json<ScoreReport>, AppError> {
    Ok(Json(score_report(
        request.analysis.as_ref(),
        WeightVector::default(),
        current_year(),
    )))
}

/// POST /api/v1/analysis/set-score
///
/// Stores a score immediately. Drops any debounced write pending for the same analysis
/// and waits out one already in flight, so the explicit score is the last one written.
pub async fn handle_set_score(
    State(state): State<AppState>,
    Json(request): Json<SetScoreRequest>,
) -> Result<StatusCode, AppError> {
    if !request.score.is_finite() || !(0.0..=100.0).contains(&request.score) {
        return Err(AppError::Validation(format!(
            "score must be between 0 and 100, got {}",
            request.score
        )));
    }
    request.weights.validate()?;

    let key = AnalysisKey {
        user_id: request.user_id,
        resume_hash: request.resume_hash,
        jd_hash: request.jd_hash,
    };
    let saved = state
        .debouncer
        .run_exclusive(
            &key,
            state.store.save_score(&key, request.score, &request.weights),
        )
        .await?;
    if !saved {
        return Err(AppError::NotFound("Analysis not found".to_string()));
    }

    info!(user_id = %key.user_id, score = request.score, "ats score stored");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/analysis/score
pub async fn handle_get_score(
    State(state): State<AppState>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<StoredScore>, AppError> {
    let key = AnalysisKey {
        user_id: query.user_id,
        resume_hash: query.resume_hash,
        jd_hash: query.jd_hash,
    };
    let stored = state
        .store
        .load_score(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Analysis not found".to_string()))?;
    Ok(Json(stored))
}

/// Schedules a fire-and-forget write of `{score, weights}` for `key`; a newer change
/// for the same key replaces it.
fn persist_when_settled(state: &AppState, key: AnalysisKey, score: f64, weights: WeightVector) {
    let store = Arc::clone(&state.store);
    let job_key = key.clone();
    state.debouncer.schedule(key, move || async move {
        match store.save_score(&job_key, score, &weights).await {
            Ok(true) => info!(user_id = %job_key.user_id, score, "settled ats score persisted"),
            Ok(false) => warn!(
                user_id = %job_key.user_id,
                resume_hash = %job_key.resume_hash,
                "no analysis to attach settled score to"
            ),
            Err(e) => warn!(error = %e, "failed to persist settled ats score"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::ats::store::memory::MemoryScoreStore;
    use crate::ats::store::ScoreStore;
    use crate::config::Config;
    use crate::models::analysis::WorkExperience;

    const DEBOUNCE: Duration = Duration::from_millis(100);

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            score_debounce: DEBOUNCE,
        }
    }

    fn key() -> AnalysisKey {
        AnalysisKey {
            user_id: Uuid::nil(),
            resume_hash: "resume-abc".to_string(),
            jd_hash: "jd-xyz".to_string(),
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            work_experience: Some(WorkExperience {
                total_relevant_years: Some(5.0),
                required_years: Some(5.0),
                keyword_overlap: Some(vec!["rust".to_string(); 5]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn change(value: u32) -> WeightChangeRequest {
        let k = key();
        WeightChangeRequest {
            analysis: Some(analysis()),
            weights: PercentWeights::from_array([20, 35, 25, 10, 10]).to_vector(),
            category: Category::Education,
            value,
            user_id: Some(k.user_id),
            resume_hash: Some(k.resume_hash),
            jd_hash: Some(k.jd_hash),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slider_burst_persists_only_final_weights() {
        let store = Arc::new(MemoryScoreStore::default().with_analysis(key()));
        let state = AppState::new(test_config(), store.clone());

        let mut last = None;
        for value in [30, 40, 50] {
            let Json(resp) = handle_weight_change(State(state.clone()), Json(change(value)))
                .await
                .unwrap();
            assert!(resp.persisted_pending);
            assert_eq!(resp.weights.total(), 100);
            last = Some(resp);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(store.get(&key()).unwrap().ats_score.is_none());

        tokio::time::sleep(DEBOUNCE * 2).await;

        let last = last.unwrap();
        assert_eq!(last.weights, PercentWeights::from_array([50, 22, 16, 6, 6]));
        let stored = store.get(&key()).unwrap();
        assert_eq!(stored.weights, Some(last.weight_vector));
        assert_eq!(stored.ats_score, Some(f64::from(last.rounded_score)));
    }

    #[tokio::test]
    async fn test_weight_change_without_analysis_is_noop() {
        let state = AppState::new(test_config(), Arc::new(MemoryScoreStore::default()));
        let mut request = change(50);
        request.analysis = None;
        let original = request.weights;

        let Json(resp) = handle_weight_change(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(resp.weight_vector, original);
        assert_eq!(resp.final_score, 0.0);
        assert!(!resp.persisted_pending);
        assert_eq!(state.debouncer.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_weight_change_without_key_skips_persistence() {
        let state = AppState::new(test_config(), Arc::new(MemoryScoreStore::default()));
        let mut request = change(50);
        request.jd_hash = None;

        let Json(resp) = handle_weight_change(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert!(!resp.persisted_pending);
        assert!(resp.final_score > 0.0);
    }

    #[tokio::test]
    async fn test_weight_change_rejects_value_above_100() {
        let state = AppState::new(test_config(), Arc::new(MemoryScoreStore::default()));
        let result = handle_weight_change(State(state), Json(change(150))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_score_without_weights_uses_requirement_flags() {
        let request = ScoreRequest {
            analysis: Some(analysis()),
            weights: None,
        };
        let Json(report) = handle_score(Json(request)).await.unwrap();
        // only work experience is required → it carries the full weight
        assert!((report.weights.work_experience - 1.0).abs() < 1e-9);
        assert!(report.weights.is_normalized());
    }

    #[tokio::test]
    async fn test_score_rejects_nan_weights() {
        let request = ScoreRequest {
            analysis: Some(analysis()),
            weights: Some(WeightVector::from_array([f64::NAN, 0.0, 0.0, 0.0, 1.0])),
        };
        assert!(handle_score(Json(request)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_score_supersedes_pending_write() {
        let store = Arc::new(MemoryScoreStore::default().with_analysis(key()));
        let state = AppState::new(test_config(), store.clone());

        let Json(resp) = handle_weight_change(State(state.clone()), Json(change(50)))
            .await
            .unwrap();
        assert!(resp.persisted_pending);
        assert!(state.debouncer.is_pending(&key()));

        let k = key();
        let status = handle_set_score(
            State(state.clone()),
            Json(SetScoreRequest {
                user_id: k.user_id,
                resume_hash: k.resume_hash,
                jd_hash: k.jd_hash,
                score: 77.0,
                weights: WeightVector::default().normalized(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!state.debouncer.is_pending(&key()));

        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(store.get(&key()).unwrap().ats_score, Some(77.0));
    }

    /// Memory store whose first save stalls, leaving a debounced write in flight.
    struct StallingStore {
        inner: MemoryScoreStore,
        saves: AtomicUsize,
        stall: Duration,
    }

    #[async_trait]
    impl ScoreStore for StallingStore {
        async fn save_score(
            &self,
            key: &AnalysisKey,
            score: f64,
            weights: &WeightVector,
        ) -> Result<bool, AppError> {
            if self.saves.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(self.stall).await;
            }
            self.inner.save_score(key, score, weights).await
        }

        async fn load_score(&self, key: &AnalysisKey) -> Result<Option<StoredScore>, AppError> {
            self.inner.load_score(key).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_score_lands_after_in_flight_debounced_write() {
        let store = Arc::new(StallingStore {
            inner: MemoryScoreStore::default().with_analysis(key()),
            saves: AtomicUsize::new(0),
            stall: Duration::from_millis(200),
        });
        let state = AppState::new(test_config(), store.clone());

        let Json(resp) = handle_weight_change(State(state.clone()), Json(change(50)))
            .await
            .unwrap();
        assert_ne!(f64::from(resp.rounded_score), 77.0);

        // the debounced write has started and is stalled in the store
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(20)).await;
        assert!(!state.debouncer.is_pending(&key()));

        let k = key();
        handle_set_score(
            State(state.clone()),
            Json(SetScoreRequest {
                user_id: k.user_id,
                resume_hash: k.resume_hash,
                jd_hash: k.jd_hash,
                score: 77.0,
                weights: WeightVector::default().normalized(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(store.inner.get(&key()).unwrap().ats_score, Some(77.0));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.inner.get(&key()).unwrap().ats_score, Some(77.0));
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_set_score_unknown_analysis_is_not_found() {
        let state = AppState::new(test_config(), Arc::new(MemoryScoreStore::default()));
        let k = key();
        let result = handle_set_score(
            State(state),
            Json(SetScoreRequest {
                user_id: k.user_id,
                resume_hash: k.resume_hash,
                jd_hash: k.jd_hash,
                score: 50.0,
                weights: WeightVector::default(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_score_rejects_out_of_range_score() {
        let state = AppState::new(test_config(), Arc::new(MemoryScoreStore::default()));
        let k = key();
        let result = handle_set_score(
            State(state),
            Json(SetScoreRequest {
                user_id: k.user_id,
                resume_hash: k.resume_hash,
                jd_hash: k.jd_hash,
                score: 120.0,
                weights: WeightVector::default(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
