//! Section scorers: one pure function per résumé section, each returning a value in [0, 1].
//!
//! Missing sections and fields contribute 0. Ratios with a zero denominator resolve to a
//! fixed default instead of NaN/Infinity: 0 everywhere except the required-certification
//! coverage, which is 1.0 when the JD lists no required certifications.

use crate::models::analysis::{
    count, AnalysisResult, Certifications, Education, InstitutionTier, Project, Skills, Summary,
    WorkExperience,
};

/// Weight applied to an "equivalent" skill or certification relative to an exact match.
pub const EQUIVALENT_MATCH_CREDIT: f64 = 0.8;
/// Weight applied to a semantic job-title match relative to an exact one.
pub const SEMANTIC_TITLE_CREDIT: f64 = 0.7;
/// Keyword-overlap denominator when the JD lists no required technical skills.
pub const DEFAULT_REQUIRED_SKILL_COUNT: usize = 10;

/// Fixed blend of skills and projects that forms the "Skills & Projects" category.
pub const SKILLS_BLEND: f64 = 0.6;
pub const PROJECTS_BLEND: f64 = 0.4;

/// `numerator / denominator` clamped to [0, 1]; `on_empty` when the denominator is not positive.
pub(crate) fn ratio(numerator: f64, denominator: f64, on_empty: f64) -> f64 {
    if denominator <= 0.0 || !denominator.is_finite() {
        return on_empty;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        on_empty
    }
}

/// Linear decay from 1.0 (this year) to 0.0 after `window_years`.
fn recency(current_year: i32, year: Option<i32>, window_years: f64) -> f64 {
    let years_since = f64::from(current_year) - f64::from(year.unwrap_or(0));
    (1.0 - years_since / window_years).clamp(0.0, 1.0)
}

fn flag(value: Option<bool>) -> f64 {
    if value.unwrap_or(false) {
        1.0
    } else {
        0.0
    }
}

/// Parses the leading numeric prefix of a string ("8.7/10" → 8.7, "1e1" → 10). Accepts
/// an optional sign, a decimal part and an exponent. Returns `None` if no digits lead
/// the trimmed string.
pub(crate) fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_digits = digits_from(exponent);
        if exponent_digits > 0 {
            end = exponent + exponent_digits;
        }
    }

    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

pub fn institution_tier_score(tier: Option<InstitutionTier>) -> f64 {
    match tier {
        Some(InstitutionTier::Tier1) => 1.0,
        Some(InstitutionTier::Tier2) => 0.7,
        Some(InstitutionTier::Tier3) => 0.4,
        Some(InstitutionTier::Unknown) | None => 0.2,
    }
}

/// GPA normalized against a 10-point scale. Unparseable or absent → 0.
pub fn gpa_score(gpa: Option<&str>) -> f64 {
    gpa.and_then(parse_leading_number)
        .map(|v| (v / 10.0).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// 0.5·degree + 0.3·field + 0.1·institution + 0.1·gpa
pub fn education_score(education: Option<&Education>) -> f64 {
    let Some(edu) = education else {
        return 0.0;
    };
    0.5 * flag(edu.degree_match)
        + 0.3 * flag(edu.field_match)
        + 0.1 * institution_tier_score(edu.institution_rank_tier)
        + 0.1 * gpa_score(edu.gpa.as_deref())
}

// ────────────────────────────────────────────────────────────────────────────
// Work experience
// ────────────────────────────────────────────────────────────────────────────

/// Intermediate work-experience terms, exposed so callers can explain the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkExperienceTerms {
    pub duration: f64,
    pub title_match: f64,
    pub keyword_match: f64,
    pub recency: f64,
}

impl WorkExperienceTerms {
    pub fn total(&self) -> f64 {
        0.3 * self.duration + 0.2 * self.title_match + 0.4 * self.keyword_match + 0.1 * self.recency
    }
}

/// Keyword overlap is measured against the JD's required technical skills from the
/// skills section, or against ten when that list is empty.
pub fn work_experience_terms(
    work: &WorkExperience,
    skills: Option<&Skills>,
    current_year: i32,
) -> WorkExperienceTerms {
    let duration = ratio(
        work.total_relevant_years.unwrap_or(0.0),
        work.required_years.unwrap_or(0.0),
        0.0,
    );

    let title_hits = count(&work.matching_titles) as f64
        + SEMANTIC_TITLE_CREDIT * count(&work.semantic_title_matches) as f64;
    let title_match = ratio(title_hits, count(&work.jd_titles) as f64, 0.0);

    let required_skills = skills
        .and_then(|s| s.technical_skills.as_ref())
        .map(|t| count(&t.required_from_jd))
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_REQUIRED_SKILL_COUNT);
    let keyword_match = ratio(
        count(&work.keyword_overlap) as f64,
        required_skills as f64,
        0.0,
    );

    WorkExperienceTerms {
        duration,
        title_match,
        keyword_match,
        recency: recency(current_year, work.latest_experience_year, 5.0),
    }
}

/// 0.3·duration + 0.2·title + 0.4·keywords + 0.1·recency
pub fn work_experience_score(analysis: &AnalysisResult, current_year: i32) -> f64 {
    analysis
        .work_experience
        .as_ref()
        .map(|work| work_experience_terms(work, analysis.skills.as_ref(), current_year).total())
        .unwrap_or(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

/// Maps a free-text impact statement to an intensity score. Absent or blank text → 0.
pub fn impact_score(impact: Option<&str>) -> f64 {
    let Some(text) = impact.map(str::trim).filter(|t| !t.is_empty()) else {
        return 0.0;
    };
    let text = text.to_lowercase();
    if text.contains("high") || text.contains("significant") {
        1.0
    } else if text.contains("medium") || text.contains("moderate") {
        0.6
    } else if text.contains("low") || text.contains("minimal") {
        0.3
    } else {
        0.5
    }
}

/// 0.3·keywords + 0.4·relevance + 0.2·impact + 0.1·recency for a single project.
pub fn single_project_score(project: &Project, current_year: i32) -> f64 {
    let keyword = ratio(count(&project.keywords_matched) as f64, 5.0, 0.0);
    0.3 * keyword
        + 0.4 * flag(project.relevant_to_jd)
        + 0.2 * impact_score(project.impact.as_deref())
        + 0.1 * recency(current_year, project.year, 3.0)
}

/// Mean of the per-project scores. Empty or absent list → 0.
pub fn projects_score(projects: Option<&[Project]>, current_year: i32) -> f64 {
    match projects {
        Some(list) if !list.is_empty() => {
            let total: f64 = list
                .iter()
                .map(|p| single_project_score(p, current_year))
                .sum();
            total / list.len() as f64
        }
        _ => 0.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// Matched plus 0.8-weighted equivalents over required. No required skills → 0.
pub fn technical_coverage(skills: &Skills) -> f64 {
    let Some(tech) = skills.technical_skills.as_ref() else {
        return 0.0;
    };
    let hits = count(&tech.matched_skills) as f64
        + EQUIVALENT_MATCH_CREDIT * count(&tech.equivalent_skills) as f64;
    ratio(hits, count(&tech.required_from_jd) as f64, 0.0)
}

pub fn soft_coverage(skills: &Skills) -> f64 {
    skills
        .soft_skills
        .as_ref()
        .map(|soft| {
            ratio(
                count(&soft.demonstrated_in_resume) as f64,
                count(&soft.required_from_jd) as f64,
                0.0,
            )
        })
        .unwrap_or(0.0)
}

pub fn domain_bonus(skills: &Skills) -> f64 {
    skills
        .domain_expertise
        .as_ref()
        .map(|domain| {
            ratio(
                count(&domain.matching_domains) as f64,
                count(&domain.required_from_jd) as f64,
                0.0,
            )
        })
        .unwrap_or(0.0)
}

/// 0.6·technical + 0.3·soft + 0.1·domain
pub fn skills_score(skills: Option<&Skills>) -> f64 {
    let Some(skills) = skills else {
        return 0.0;
    };
    0.6 * technical_coverage(skills) + 0.3 * soft_coverage(skills) + 0.1 * domain_bonus(skills)
}

/// The fixed 60/40 blend of skills and projects.
pub fn combined_skills_score(skills: f64, projects: f64) -> f64 {
    SKILLS_BLEND * skills + PROJECTS_BLEND * projects
}

// ────────────────────────────────────────────────────────────────────────────
// Certifications
// ────────────────────────────────────────────────────────────────────────────

/// No required certifications means no penalty: coverage is 1.0.
pub fn required_cert_coverage(certs: &Certifications) -> f64 {
    let hits = count(&certs.required_certifications_matched) as f64
        + EQUIVALENT_MATCH_CREDIT * count(&certs.equivalent_certifications) as f64;
    ratio(hits, count(&certs.required_certs_in_jd) as f64, 1.0)
}

pub fn preferred_cert_coverage(certs: &Certifications) -> f64 {
    ratio(
        count(&certs.preferred_certifications_matched) as f64,
        count(&certs.preferred_certs_in_jd) as f64,
        0.0,
    )
}

/// 0.7·required + 0.3·preferred
pub fn certifications_score(certs: Option<&Certifications>) -> f64 {
    let Some(certs) = certs else {
        return 0.0;
    };
    0.7 * required_cert_coverage(certs) + 0.3 * preferred_cert_coverage(certs)
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

pub fn customization_score(summary: &Summary) -> f64 {
    if !summary.customized_to_jd.unwrap_or(false) {
        return 0.0;
    }
    let generic = count(&summary.generic_indicators_found) as f64;
    (1.0 - 0.2 * generic).clamp(0.0, 1.0)
}

/// 0.4·keywords + 0.4·intent + 0.2·customization
pub fn summary_score(summary: Option<&Summary>) -> f64 {
    let Some(summary) = summary else {
        return 0.0;
    };
    let keyword_alignment = ratio(count(&summary.keywords_matched) as f64, 8.0, 0.0);
    0.4 * keyword_alignment
        + 0.4 * flag(summary.intent_matches_jd)
        + 0.2 * customization_score(summary)
}
