//! Category weights: the fractional `WeightVector` used by the combinator and the
//! integer `PercentWeights` view that the slider renormalization works in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::analysis::{count, AnalysisResult};

/// Tolerance for "sums to 1.0".
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Default prior. Note that it sums to 0.95; it is used as-is by the combinator and
/// divided by its total whenever a normalized vector is required.
pub const DEFAULT_WEIGHTS: WeightVector = WeightVector {
    education: 0.20,
    work_experience: 0.35,
    skills: 0.25,
    certifications: 0.10,
    summary: 0.05,
};

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight percentage must be between 0 and 100, got {0}")]
    OutOfRange(u32),

    #[error("weight for {0} is not a finite number")]
    NonFinite(Category),

    #[error("weight for {0} is negative")]
    Negative(Category),
}

// ────────────────────────────────────────────────────────────────────────────
// Category
// ────────────────────────────────────────────────────────────────────────────

/// The five user-weighted categories. `Skills` covers the blended "Skills & Projects" score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Education,
    WorkExperience,
    Skills,
    Certifications,
    Summary,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Education,
        Category::WorkExperience,
        Category::Skills,
        Category::Certifications,
        Category::Summary,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Education => "Education",
            Category::WorkExperience => "Work Experience",
            Category::Skills => "Skills & Projects",
            Category::Certifications => "Certifications",
            Category::Summary => "Summary",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Education => {
                "Academic qualifications, degree relevance, and institution quality"
            }
            Category::WorkExperience => {
                "Job history relevance, years of experience, and role alignment"
            }
            Category::Skills => "Technical skills, projects, and demonstrated expertise",
            Category::Certifications => "Professional certifications and industry credentials",
            Category::Summary => "Resume summary quality, keyword optimization, and customization",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WeightVector
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightVector {
    pub education: f64,
    pub work_experience: f64,
    pub skills: f64,
    pub certifications: f64,
    pub summary: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl WeightVector {
    pub fn from_array(values: [f64; 5]) -> Self {
        let [education, work_experience, skills, certifications, summary] = values;
        Self {
            education,
            work_experience,
            skills,
            certifications,
            summary,
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.education,
            self.work_experience,
            self.skills,
            self.certifications,
            self.summary,
        ]
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Education => self.education,
            Category::WorkExperience => self.work_experience,
            Category::Skills => self.skills,
            Category::Certifications => self.certifications,
            Category::Summary => self.summary,
        }
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= SUM_TOLERANCE
    }

    /// Rejects NaN, infinite and negative entries.
    pub fn validate(&self) -> Result<(), WeightError> {
        for category in Category::ALL {
            let w = self.get(category);
            if !w.is_finite() {
                return Err(WeightError::NonFinite(category));
            }
            if w < 0.0 {
                return Err(WeightError::Negative(category));
            }
        }
        Ok(())
    }

    /// Scales the vector to sum to 1.0. A zero (or non-finite) total falls back to the
    /// normalized default prior.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total > 0.0 && total.is_finite() {
            Self::from_array(self.as_array().map(|w| w / total))
        } else {
            let prior = DEFAULT_WEIGHTS.sum();
            Self::from_array(DEFAULT_WEIGHTS.as_array().map(|w| w / prior))
        }
    }

    /// Initial weights for a fresh analysis: the default prior restricted to the
    /// categories the job description actually asks for, renormalized to 1.0.
    pub fn from_requirements(analysis: &AnalysisResult) -> Self {
        let required = [
            analysis
                .education
                .as_ref()
                .is_some_and(|e| count(&e.required_degrees_in_jd) > 0),
            analysis
                .work_experience
                .as_ref()
                .and_then(|w| w.required_years)
                .is_some_and(|years| years != 0.0 && years.is_finite()),
            analysis
                .skills
                .as_ref()
                .and_then(|s| s.technical_skills.as_ref())
                .is_some_and(|t| count(&t.required_from_jd) > 0),
            analysis
                .certifications
                .as_ref()
                .is_some_and(|c| count(&c.required_certs_in_jd) > 0),
            analysis
                .summary
                .as_ref()
                .and_then(|s| s.intent_matches_jd)
                .unwrap_or(false),
        ];

        let defaults = DEFAULT_WEIGHTS.as_array();
        let masked: [f64; 5] =
            std::array::from_fn(|i| if required[i] { defaults[i] } else { 0.0 });
        Self::from_array(masked).normalized()
    }

    /// Integer percentages, each rounded and clamped to 0..=100. The total is not
    /// corrected here; `PercentWeights::adjust` does that.
    pub fn to_percent(&self) -> Result<PercentWeights, WeightError> {
        self.validate()?;
        Ok(PercentWeights::from_array(
            self.as_array()
                .map(|w| (w * 100.0).round().clamp(0.0, 100.0) as u32),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PercentWeights: integer domain for slider renormalization
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentWeights {
    pub education: u32,
    pub work_experience: u32,
    pub skills: u32,
    pub certifications: u32,
    pub summary: u32,
}

impl PercentWeights {
    pub fn from_array(values: [u32; 5]) -> Self {
        let [education, work_experience, skills, certifications, summary] = values;
        Self {
            education,
            work_experience,
            skills,
            certifications,
            summary,
        }
    }

    pub fn as_array(&self) -> [u32; 5] {
        [
            self.education,
            self.work_experience,
            self.skills,
            self.certifications,
            self.summary,
        ]
    }

    pub fn get(&self, category: Category) -> u32 {
        self.as_array()[index_of(category)]
    }

    pub fn total(&self) -> u64 {
        self.as_array().iter().map(|&w| u64::from(w)).sum()
    }

    /// Fractions (÷100) for the combinator.
    pub fn to_vector(&self) -> WeightVector {
        WeightVector::from_array(self.as_array().map(|w| f64::from(w) / 100.0))
    }

    /// Pins `category` to `value` percent and rescales the other four, in proportion to
    /// their current values, so that all five sum to exactly 100.
    ///
    /// Rounding residue is corrected one unit at a time, cycling through the unpinned
    /// categories in order. A decrement never takes a category below zero.
    pub fn adjust(&self, category: Category, value: u32) -> Result<PercentWeights, WeightError> {
        if value > 100 {
            return Err(WeightError::OutOfRange(value));
        }

        let pinned = index_of(category);
        let previous = self.as_array();
        let remaining = 100 - value;
        let others: Vec<usize> = (0..5).filter(|&i| i != pinned).collect();
        let others_sum: u64 = others.iter().map(|&i| u64::from(previous[i])).sum();

        let mut next = [0u32; 5];
        next[pinned] = value;
        for &i in &others {
            next[i] = if others_sum > 0 {
                (f64::from(previous[i]) * f64::from(remaining) / others_sum as f64).round() as u32
            } else {
                remaining / others.len() as u32
            };
        }

        let total: i64 = next.iter().map(|&w| i64::from(w)).sum();
        let mut diff = 100 - total;
        let mut cursor = 0;
        while diff != 0 {
            let i = others[cursor % others.len()];
            if diff > 0 {
                next[i] += 1;
                diff -= 1;
            } else if next[i] > 0 {
                next[i] -= 1;
                diff += 1;
            }
            cursor += 1;
        }

        Ok(PercentWeights::from_array(next))
    }
}

fn index_of(category: Category) -> usize {
    match category {
        Category::Education => 0,
        Category::WorkExperience => 1,
        Category::Skills => 2,
        Category::Certifications => 3,
        Category::Summary => 4,
    }
}
