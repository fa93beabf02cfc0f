//! Score combinator. Folds the section sub-scores into the final 0–100 ATS score and
//! builds the per-category breakdown shown next to the weight sliders.
//!
//! finalScore = 100 × Σ(sub_i × weight_i), clamped to [0, 100]

use serde::{Deserialize, Serialize};

use crate::ats::details;
use crate::ats::sections;
use crate::ats::weights::{Category, WeightVector};
use crate::models::analysis::AnalysisResult;

/// Raw sub-scores in [0, 1], including the unweighted skills and projects parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub education: f64,
    pub work_experience: f64,
    pub skills: f64,
    pub projects: f64,
    pub combined_skills: f64,
    pub certifications: f64,
    pub summary: f64,
}

impl SubScores {
    pub fn compute(analysis: &AnalysisResult, current_year: i32) -> Self {
        let skills = sections::skills_score(analysis.skills.as_ref());
        let projects = sections::projects_score(analysis.projects.as_deref(), current_year);
        Self {
            education: sections::education_score(analysis.education.as_ref()),
            work_experience: sections::work_experience_score(analysis, current_year),
            skills,
            projects,
            combined_skills: sections::combined_skills_score(skills, projects),
            certifications: sections::certifications_score(analysis.certifications.as_ref()),
            summary: sections::summary_score(analysis.summary.as_ref()),
        }
    }

    /// Sub-score feeding a weighted category. `Skills` is the skills/projects blend.
    pub fn for_category(&self, category: Category) -> f64 {
        match category {
            Category::Education => self.education,
            Category::WorkExperience => self.work_experience,
            Category::Skills => self.combined_skills,
            Category::Certifications => self.certifications,
            Category::Summary => self.summary,
        }
    }

    /// 100 × Σ(sub × weight), clamped to [0, 100]. Non-finite results collapse to 0.
    pub fn weighted_total(&self, weights: &WeightVector) -> f64 {
        let total: f64 = Category::ALL
            .iter()
            .map(|&c| self.for_category(c) * 100.0 * weights.get(c))
            .sum();
        if total.is_finite() {
            total.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// Final ATS score. An absent analysis scores 0.
pub fn final_score(
    analysis: Option<&AnalysisResult>,
    weights: &WeightVector,
    current_year: i32,
) -> f64 {
    match analysis {
        Some(a) => SubScores::compute(a, current_year).weighted_total(weights),
        None => 0.0,
    }
}

/// One row of the display breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub category: Category,
    pub name: String,
    /// 0–100, rounded. Shown as 0 when the category carries no weight.
    pub score: f64,
    /// 0–1
    pub weight: f64,
    pub weighted_score: f64,
    pub details: Vec<String>,
    pub description: String,
}

fn details_for(category: Category, analysis: &AnalysisResult) -> Vec<String> {
    match category {
        Category::Education => details::education_details(analysis),
        Category::WorkExperience => details::work_experience_details(analysis),
        Category::Skills => {
            let mut lines = details::skills_details(analysis);
            lines.extend(details::project_details(analysis));
            lines
        }
        Category::Certifications => details::certification_details(analysis),
        Category::Summary => details::summary_details(analysis),
    }
}

pub fn section_breakdown(
    analysis: &AnalysisResult,
    weights: &WeightVector,
    current_year: i32,
) -> Vec<SectionScore> {
    let sub = SubScores::compute(analysis, current_year);
    Category::ALL
        .iter()
        .map(|&category| {
            let value = sub.for_category(category);
            let weight = weights.get(category);
            SectionScore {
                category,
                name: category.display_name().to_string(),
                score: if weight > 0.0 {
                    (value * 100.0).round()
                } else {
                    0.0
                },
                weight,
                weighted_score: value * weight * 100.0,
                details: details_for(category, analysis),
                description: category.description().to_string(),
            }
        })
        .collect()
}

/// Every sub-score as a percentage rounded to one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    pub education: f64,
    pub work_experience: f64,
    pub skills: f64,
    pub projects: f64,
    pub combined_skills: f64,
    pub certifications: f64,
    pub summary: f64,
}

fn one_decimal(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}

impl From<SubScores> for SectionScores {
    fn from(sub: SubScores) -> Self {
        Self {
            education: one_decimal(sub.education),
            work_experience: one_decimal(sub.work_experience),
            skills: one_decimal(sub.skills),
            projects: one_decimal(sub.projects),
            combined_skills: one_decimal(sub.combined_skills),
            certifications: one_decimal(sub.certifications),
            summary: one_decimal(sub.summary),
        }
    }
}

/// Full scoring response for one (analysis, weights) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub final_score: f64,
    pub rounded_score: u32,
    pub weights: WeightVector,
    pub sections: Vec<SectionScore>,
    pub section_scores: SectionScores,
}

pub fn score_report(
    analysis: Option<&AnalysisResult>,
    weights: WeightVector,
    current_year: i32,
) -> ScoreReport {
    let Some(analysis) = analysis else {
        return ScoreReport {
            final_score: 0.0,
            rounded_score: 0,
            weights,
            sections: vec![],
            section_scores: SectionScores::default(),
        };
    };

    let sub = SubScores::compute(analysis, current_year);
    let final_score = sub.weighted_total(&weights);
    ScoreReport {
        final_score,
        rounded_score: final_score.round() as u32,
        weights,
        sections: section_breakdown(analysis, &weights, current_year),
        section_scores: sub.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::weights::PercentWeights;
    use crate::models::analysis::{
        Certifications, Education, InstitutionTier, Project, Skills, Summary, TechnicalSkills,
        WorkExperience,
    };

    const YEAR: i32 = 2025;

    fn strings(n: usize) -> Option<Vec<String>> {
        Some((0..n).map(|i| format!("kw-{i}")).collect())
    }

    fn full_analysis() -> AnalysisResult {
        AnalysisResult {
            education: Some(Education {
                degree_match: Some(true),
                field_match: Some(false),
                institution_rank_tier: Some(InstitutionTier::Tier2),
                gpa: Some("8.0".to_string()),
                ..Default::default()
            }),
            work_experience: Some(WorkExperience {
                total_relevant_years: Some(3.0),
                required_years: Some(5.0),
                jd_titles: strings(2),
                matching_titles: strings(1),
                keyword_overlap: strings(4),
                latest_experience_year: Some(YEAR - 1),
                ..Default::default()
            }),
            projects: Some(vec![Project {
                keywords_matched: strings(3),
                relevant_to_jd: Some(true),
                impact: Some("moderate latency reduction".to_string()),
                year: Some(YEAR - 1),
                ..Default::default()
            }]),
            skills: Some(Skills {
                technical_skills: Some(TechnicalSkills {
                    required_from_jd: strings(8),
                    matched_skills: strings(6),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            certifications: Some(Certifications::default()),
            summary: Some(Summary {
                keywords_matched: strings(4),
                intent_matches_jd: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_analysis_scores_zero() {
        assert_eq!(final_score(None, &WeightVector::default(), YEAR), 0.0);
        let report = score_report(None, WeightVector::default(), YEAR);
        assert_eq!(report.rounded_score, 0);
        assert!(report.sections.is_empty());
    }

    #[test]
    fn test_all_null_sections_score_zero_not_nan() {
        let score = final_score(Some(&AnalysisResult::default()), &WeightVector::default(), YEAR);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_work_experience_only_scenario() {
        let analysis = AnalysisResult {
            work_experience: Some(WorkExperience {
                total_relevant_years: Some(5.0),
                required_years: Some(5.0),
                keyword_overlap: strings(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let terms = sections::work_experience_terms(
            analysis.work_experience.as_ref().unwrap(),
            None,
            YEAR,
        );
        assert_eq!(terms.duration, 1.0);

        let sub = sections::work_experience_score(&analysis, YEAR);
        let score = final_score(Some(&analysis), &WeightVector::default(), YEAR);
        assert!(
            (score - 100.0 * 0.35 * sub).abs() < 1e-9,
            "score {score}, sub {sub}"
        );
    }

    #[test]
    fn test_empty_projects_leave_only_skills_in_blend() {
        let mut analysis = full_analysis();
        analysis.projects = Some(vec![]);
        let sub = SubScores::compute(&analysis, YEAR);
        assert_eq!(sub.projects, 0.0);
        assert!((sub.combined_skills - 0.6 * sub.skills).abs() < 1e-12);
    }

    #[test]
    fn test_combinator_is_deterministic() {
        let analysis = full_analysis();
        let weights = WeightVector::from_requirements(&analysis);
        let a = final_score(Some(&analysis), &weights, YEAR);
        let b = final_score(Some(&analysis), &weights, YEAR);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_score_bounded_for_extreme_weights() {
        let analysis = full_analysis();
        let heavy = WeightVector::from_array([5.0; 5]);
        let score = final_score(Some(&analysis), &heavy, YEAR);
        assert!((0.0..=100.0).contains(&score));

        let nan = WeightVector::from_array([f64::NAN; 5]);
        assert_eq!(final_score(Some(&analysis), &nan, YEAR), 0.0);
    }

    #[test]
    fn test_perfect_candidate_scores_100_with_normalized_weights() {
        let analysis = AnalysisResult {
            education: Some(Education {
                degree_match: Some(true),
                field_match: Some(true),
                institution_rank_tier: Some(InstitutionTier::Tier1),
                gpa: Some("10".to_string()),
                ..Default::default()
            }),
            work_experience: Some(WorkExperience {
                total_relevant_years: Some(8.0),
                required_years: Some(5.0),
                jd_titles: strings(1),
                matching_titles: strings(1),
                keyword_overlap: strings(10),
                latest_experience_year: Some(YEAR),
                ..Default::default()
            }),
            projects: Some(vec![Project {
                keywords_matched: strings(5),
                relevant_to_jd: Some(true),
                impact: Some("high".to_string()),
                year: Some(YEAR),
                ..Default::default()
            }]),
            skills: Some(Skills {
                technical_skills: Some(TechnicalSkills {
                    required_from_jd: strings(2),
                    matched_skills: strings(2),
                    ..Default::default()
                }),
                soft_skills: Some(crate::models::analysis::SoftSkills {
                    required_from_jd: strings(1),
                    demonstrated_in_resume: strings(1),
                    ..Default::default()
                }),
                domain_expertise: Some(crate::models::analysis::DomainExpertise {
                    required_from_jd: strings(1),
                    matching_domains: strings(1),
                }),
                notes: None,
            }),
            certifications: Some(Certifications {
                preferred_certs_in_jd: strings(1),
                preferred_certifications_matched: strings(1),
                ..Default::default()
            }),
            summary: Some(Summary {
                keywords_matched: strings(8),
                intent_matches_jd: Some(true),
                customized_to_jd: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let weights = WeightVector::default().normalized();
        let score = final_score(Some(&analysis), &weights, YEAR);
        assert!((score - 100.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_breakdown_order_and_weighted_scores() {
        let analysis = full_analysis();
        let weights = PercentWeights::from_array([20, 35, 25, 10, 10]).to_vector();
        let rows = section_breakdown(&analysis, &weights, YEAR);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Education",
                "Work Experience",
                "Skills & Projects",
                "Certifications",
                "Summary"
            ]
        );

        let weighted_sum: f64 = rows.iter().map(|r| r.weighted_score).sum();
        let score = final_score(Some(&analysis), &weights, YEAR);
        assert!((weighted_sum - score).abs() < 1e-9);

        // skills row carries both skills and project detail lines
        assert!(rows[2].details.len() > 3);
    }

    #[test]
    fn test_zero_weight_category_displays_zero() {
        let analysis = full_analysis();
        let weights = WeightVector::from_array([0.0, 0.5, 0.5, 0.0, 0.0]);
        let rows = section_breakdown(&analysis, &weights, YEAR);
        assert_eq!(rows[0].score, 0.0);
        assert_eq!(rows[0].weighted_score, 0.0);
        assert!(rows[1].score > 0.0);
    }

    #[test]
    fn test_section_scores_round_to_one_decimal() {
        let sub = SubScores {
            education: 0.12345,
            work_experience: 0.6666,
            ..Default::default()
        };
        let rounded = SectionScores::from(sub);
        assert_eq!(rounded.education, 12.3);
        assert_eq!(rounded.work_experience, 66.7);
    }

    #[test]
    fn test_report_rounds_final_score() {
        let analysis = full_analysis();
        let report = score_report(Some(&analysis), WeightVector::default(), YEAR);
        assert_eq!(report.rounded_score, report.final_score.round() as u32);
        assert_eq!(report.sections.len(), 5);
    }
}
