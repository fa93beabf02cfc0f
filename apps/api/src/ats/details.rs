//! Human-readable explanation lines shown under each category in the score breakdown.

use crate::models::analysis::{count, AnalysisResult};

fn yes_no(value: Option<bool>) -> &'static str {
    if value.unwrap_or(false) {
        "Yes"
    } else {
        "No"
    }
}

pub fn education_details(analysis: &AnalysisResult) -> Vec<String> {
    let Some(edu) = analysis.education.as_ref() else {
        return vec!["No education data available".to_string()];
    };
    vec![
        format!("Degree match: {} (50% weight)", yes_no(edu.degree_match)),
        format!("Field match: {} (30% weight)", yes_no(edu.field_match)),
        format!(
            "Institution tier: {} (10% weight)",
            edu.institution_rank_tier.map_or("Unknown", |t| t.label())
        ),
        format!(
            "GPA: {} (10% weight)",
            edu.gpa
                .as_deref()
                .filter(|g| !g.trim().is_empty())
                .unwrap_or("Not provided")
        ),
    ]
}

pub fn work_experience_details(analysis: &AnalysisResult) -> Vec<String> {
    let Some(work) = analysis.work_experience.as_ref() else {
        return vec!["No work experience data available".to_string()];
    };
    vec![
        format!(
            "Experience: {}/{} years (30% weight)",
            work.total_relevant_years.unwrap_or(0.0),
            work.required_years.unwrap_or(0.0)
        ),
        format!(
            "Title matches: {} direct, {} semantic (20% weight)",
            count(&work.matching_titles),
            count(&work.semantic_title_matches)
        ),
        format!(
            "Keyword overlap: {} keywords (40% weight)",
            count(&work.keyword_overlap)
        ),
        format!(
            "Latest experience: {} (10% weight)",
            work.latest_experience_year
                .map_or_else(|| "Unknown".to_string(), |y| y.to_string())
        ),
    ]
}

pub fn project_details(analysis: &AnalysisResult) -> Vec<String> {
    let projects = match analysis.projects.as_deref() {
        Some(list) if !list.is_empty() => list,
        _ => return vec!["No projects data available".to_string()],
    };
    let relevant = projects
        .iter()
        .filter(|p| p.relevant_to_jd.unwrap_or(false))
        .count();
    let keywords: usize = projects.iter().map(|p| count(&p.keywords_matched)).sum();
    vec![
        format!(
            "Relevant projects: {relevant}/{} (40% weight)",
            projects.len()
        ),
        format!("Total keywords matched: {keywords} (30% weight)"),
        "Impact levels assessed (20% weight)".to_string(),
        "Average project recency calculated (10% weight)".to_string(),
    ]
}

pub fn skills_details(analysis: &AnalysisResult) -> Vec<String> {
    let Some(skills) = analysis.skills.as_ref() else {
        return vec!["No skills data available".to_string()];
    };
    let (required, matched) = skills
        .technical_skills
        .as_ref()
        .map_or((0, 0), |t| (count(&t.required_from_jd), count(&t.matched_skills)));
    let (soft_required, soft_shown) = skills.soft_skills.as_ref().map_or((0, 0), |s| {
        (count(&s.required_from_jd), count(&s.demonstrated_in_resume))
    });
    vec![
        format!("Technical skills: {matched}/{required} required (60% weight)"),
        format!("Soft skills: {soft_shown}/{soft_required} demonstrated (30% weight)"),
        "Domain expertise bonus calculated (10% weight)".to_string(),
    ]
}

pub fn certification_details(analysis: &AnalysisResult) -> Vec<String> {
    let Some(certs) = analysis.certifications.as_ref() else {
        return vec!["No certifications data available".to_string()];
    };
    let mut details = vec![
        format!(
            "Required certifications: {}/{} (70% weight)",
            count(&certs.required_certifications_matched),
            count(&certs.required_certs_in_jd)
        ),
        format!(
            "Preferred certifications: {}/{} (30% weight)",
            count(&certs.preferred_certifications_matched),
            count(&certs.preferred_certs_in_jd)
        ),
    ];
    let equivalents = count(&certs.equivalent_certifications);
    if equivalents > 0 {
        details.push(format!("Equivalent certifications: {equivalents} found"));
    }
    details
}

pub fn summary_details(analysis: &AnalysisResult) -> Vec<String> {
    let Some(summary) = analysis.summary.as_ref() else {
        return vec!["No summary data available".to_string()];
    };
    let mut details = vec![
        format!(
            "Keywords matched: {} (40% weight)",
            count(&summary.keywords_matched)
        ),
        format!(
            "Intent matches JD: {} (40% weight)",
            yes_no(summary.intent_matches_jd)
        ),
        format!(
            "Customization: {} (20% weight)",
            yes_no(summary.customized_to_jd)
        ),
    ];
    let generic = count(&summary.generic_indicators_found);
    if generic > 0 {
        details.push(format!("Generic indicators found: {generic}"));
    }
    details
}
