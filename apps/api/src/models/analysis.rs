//! Structured résumé-vs-JD analysis as produced by the upstream analysis service.
//!
//! Every field is optional. Absent sections and leaves deserialize to `None` and the
//! scorers treat them as zero contributions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub education: Option<Education>,
    pub work_experience: Option<WorkExperience>,
    pub projects: Option<Vec<Project>>,
    pub skills: Option<Skills>,
    pub certifications: Option<Certifications>,
    pub summary: Option<Summary>,
    pub additional_qualifications: Option<AdditionalQualifications>,
    pub suggestions: Option<Vec<Suggestion>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstitutionTier {
    #[serde(rename = "Tier 1")]
    Tier1,
    #[serde(rename = "Tier 2")]
    Tier2,
    #[serde(rename = "Tier 3")]
    Tier3,
    #[serde(other)]
    Unknown,
}

impl InstitutionTier {
    pub fn label(&self) -> &'static str {
        match self {
            InstitutionTier::Tier1 => "Tier 1",
            InstitutionTier::Tier2 => "Tier 2",
            InstitutionTier::Tier3 => "Tier 3",
            InstitutionTier::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degrees_in_resume: Option<Vec<String>>,
    pub required_degrees_in_jd: Option<Vec<String>>,
    pub degree_match: Option<bool>,
    pub field_match: Option<bool>,
    /// Free text, e.g. "8.7" or "3.6/4.0".
    pub gpa: Option<String>,
    pub institution: Option<String>,
    pub institution_rank_tier: Option<InstitutionTier>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub graduation_year: Option<i32>,
    pub notes: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Work experience
// ────────────────────────────────────────────────────────────────────────────

/// `relevant_to_jd` on a job is either a boolean or the literal "partially".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobRelevance {
    Flag(bool),
    Label(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: Option<String>,
    pub company: Option<String>,
    pub duration_years: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub relevant_to_jd: Option<JobRelevance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticTitleMatch {
    pub resume_title: Option<String>,
    pub jd_title: Option<String>,
    pub similarity_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub total_relevant_years: Option<f64>,
    pub required_years: Option<f64>,
    pub years_calculation_breakdown: Option<String>,
    pub jobs: Option<Vec<Job>>,
    pub matching_titles: Option<Vec<String>>,
    pub jd_titles: Option<Vec<String>>,
    pub keyword_overlap: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub latest_experience_year: Option<i32>,
    pub notes: Option<String>,
    pub semantic_title_matches: Option<Vec<SemanticTitleMatch>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub relevant_to_jd: Option<bool>,
    pub keywords_matched: Option<Vec<String>>,
    /// Free-text impact statement; intensity words drive the impact sub-score.
    pub impact: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquivalentSkill {
    pub resume_skill: Option<String>,
    pub equivalent_to: Option<String>,
    pub reason: Option<String>,
    pub confidence: Option<Confidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSkills {
    pub required_from_jd: Option<Vec<String>>,
    pub matched_skills: Option<Vec<String>>,
    pub missing_required_skills: Option<Vec<String>>,
    pub equivalent_skills: Option<Vec<EquivalentSkill>>,
    pub irrelevant_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftSkills {
    pub required_from_jd: Option<Vec<String>>,
    pub demonstrated_in_resume: Option<Vec<String>>,
    pub missing_critical_soft_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainExpertise {
    pub required_from_jd: Option<Vec<String>>,
    pub matching_domains: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    pub technical_skills: Option<TechnicalSkills>,
    pub soft_skills: Option<SoftSkills>,
    pub domain_expertise: Option<DomainExpertise>,
    pub notes: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Certifications & summary
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certifications {
    pub certs_in_resume: Option<Vec<String>>,
    pub missing_required_certifications: Option<Vec<String>>,
    pub required_certs_in_jd: Option<Vec<String>>,
    pub required_certifications_matched: Option<Vec<String>>,
    pub equivalent_certifications: Option<Vec<String>>,
    pub preferred_certs_in_jd: Option<Vec<String>>,
    pub preferred_certifications_matched: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuePropositionStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: Option<String>,
    pub keywords_matched: Option<Vec<String>>,
    pub semantic_alignment_indicators: Option<Vec<String>>,
    pub intent_matches_jd: Option<bool>,
    pub customized_to_jd: Option<bool>,
    pub generic_indicators_found: Option<Vec<String>>,
    pub value_proposition_strength: Option<ValuePropositionStrength>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalQualifications {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: Option<String>,
    pub description: Option<String>,
    pub part_of_resume: Option<String>,
    pub improved_part_of_resume: Option<String>,
    pub section_name: Option<String>,
}

/// Reads a year from any JSON number (`2024` or `2024.0`). Anything else, including
/// values outside the `i32` range, becomes `None` and scores as year 0.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|y| y.is_finite() && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(y))
        .map(|y| y.trunc() as i32))
}

/// Length of an optional list, treating `None` as empty.
pub fn count<T>(list: &Option<Vec<T>>) -> usize {
    list.as_ref().map_or(0, Vec::len)
}
