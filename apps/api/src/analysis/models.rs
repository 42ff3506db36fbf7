//! Typed schema for AI-generated résumé feedback.
//!
//! Unknown fields in the model output are ignored; role keys keep the
//! order in which the model emitted them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ten per-role metrics, each scored 0-10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSpecificMetrics {
    pub technical_skills: f64,
    pub soft_skills: f64,
    pub experience_match: f64,
    pub education_match: f64,
    pub industry_knowledge: f64,
    pub leadership_potential: f64,
    pub innovation_score: f64,
    pub communication_skills: f64,
    pub project_execution: f64,
    pub domain_expertise: f64,
}

impl RoleSpecificMetrics {
    fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("technical_skills", self.technical_skills),
            ("soft_skills", self.soft_skills),
            ("experience_match", self.experience_match),
            ("education_match", self.education_match),
            ("industry_knowledge", self.industry_knowledge),
            ("leadership_potential", self.leadership_potential),
            ("innovation_score", self.innovation_score),
            ("communication_skills", self.communication_skills),
            ("project_execution", self.project_execution),
            ("domain_expertise", self.domain_expertise),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsScore {
    /// 0-100.
    pub overall: f64,
    pub by_role_specific_metrics: RoleSpecificMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedReport {
    /// Section name → 0-10 score.
    pub sections: IndexMap<String, f64>,
    /// 0-100.
    pub overall_recommendation: f64,
    pub section_improvements: IndexMap<String, Vec<String>>,
    pub priority_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub metric_name: String,
    pub score: f64,
    pub category: String,
    pub importance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleComparison {
    pub compared_role: String,
    pub similarity_index: f64,
    pub key_matches: Vec<String>,
    pub skill_gaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfographicData {
    pub metric_distribution: Vec<MetricDistribution>,
    pub role_comparison: Vec<RoleComparison>,
    pub skill_radar: IndexMap<String, f64>,
    /// Year → achievements; the model's shape varies, kept free-form.
    pub experience_timeline: Value,
    pub keyword_cloud: IndexMap<String, i64>,
    pub industry_alignment: IndexMap<String, f64>,
}

/// Feedback for a single target role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleFeedback {
    pub ats_score: AtsScore,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub optimization_tips: Vec<String>,
    pub detailed_report: DetailedReport,
    pub top_keywords: Vec<String>,
    pub suitable_roles: Vec<String>,
    pub enhancement_tips: Vec<String>,
    pub highlighted_companies: Vec<String>,
    pub infographic_data: InfographicData,
    /// Demand score, salary range, emerging skills; free-form.
    pub market_insights: Value,
}

impl RoleFeedback {
    /// Checks the documented score ranges and required non-empty lists.
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.ats_score.overall) {
            return Err(format!(
                "ats_score.overall {} outside 0-100",
                self.ats_score.overall
            ));
        }
        for (metric, value) in self.ats_score.by_role_specific_metrics.entries() {
            if !(0.0..=10.0).contains(&value) {
                return Err(format!("metric '{metric}' value {value} outside 0-10"));
            }
        }
        if !(0.0..=100.0).contains(&self.detailed_report.overall_recommendation) {
            return Err(format!(
                "detailed_report.overall_recommendation {} outside 0-100",
                self.detailed_report.overall_recommendation
            ));
        }
        for (section, value) in &self.detailed_report.sections {
            if !(0.0..=10.0).contains(value) {
                return Err(format!("section '{section}' score {value} outside 0-10"));
            }
        }
        for (field, list) in [
            ("strengths", &self.strengths),
            ("weaknesses", &self.weaknesses),
            ("optimization_tips", &self.optimization_tips),
        ] {
            if list.is_empty() {
                return Err(format!("'{field}' must not be empty"));
            }
        }
        Ok(())
    }
}

/// The full parsed analysis: identity fields plus per-role feedback in the
/// order the model produced it.
#[derive(Debug, Clone, Serialize)]
pub struct AtsFeedback {
    pub name: String,
    pub email: String,
    pub roles: IndexMap<String, RoleFeedback>,
}

/// Synchronous response for one submission. `random_id` carries the
/// correlation id the client uses to subscribe for scrape progress.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub random_id: String,
    pub datetime: String,
    pub ats_feedback: AtsFeedback,
}


#[cfg(test)]
mod tests {
    use super::fixtures::{sample_role_feedback, sample_role_value};
    use super::*;

    #[test]
    fn test_valid_feedback_passes_validation() {
        assert!(sample_role_feedback().validate().is_ok());
    }

    #[test]
    fn test_overall_out_of_range_is_rejected() {
        let mut feedback = sample_role_feedback();
        feedback.ats_score.overall = 150.0;
        let err = feedback.validate().unwrap_err();
        assert!(err.contains("overall"));
    }

    #[test]
    fn test_metric_out_of_range_names_the_metric() {
        let mut feedback = sample_role_feedback();
        feedback.ats_score.by_role_specific_metrics.soft_skills = 11.0;
        let err = feedback.validate().unwrap_err();
        assert!(err.contains("soft_skills"));
    }

    #[test]
    fn test_empty_strengths_is_rejected() {
        let mut feedback = sample_role_feedback();
        feedback.strengths.clear();
        let err = feedback.validate().unwrap_err();
        assert!(err.contains("strengths"));
    }

    #[test]
    fn test_unknown_fields_in_model_output_are_ignored() {
        let mut value = sample_role_value();
        value["unexpected_extra"] = Value::from("whatever");
        let feedback: RoleFeedback = serde_json::from_value(value).unwrap();
        assert!(feedback.validate().is_ok());
    }
}
