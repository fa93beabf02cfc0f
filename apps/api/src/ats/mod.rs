//! ATS scoring: section scorers, weight renormalization, and the score combinator.
//! The scoring functions are pure; only `handlers` and `store` touch I/O.

use chrono::{Datelike, Utc};

pub mod combinator;
pub mod debounce;
pub mod details;
pub mod handlers;
pub mod sections;
pub mod store;
pub mod weights;

/// Calendar year used by the recency terms.
pub fn current_year() -> i32 {
    Utc::now().year()
}
