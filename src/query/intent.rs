//! Closed set of intents a question can resolve to.

use serde::{Deserialize, Serialize};

use super::filters::QueryFilters;

/// What a question is asking for. Exactly one per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentType {
    PipelineOverview,
    PipelineSilent,
    PipelineByStage,
    PipelineByValue,
    PipelineAnalytics,
    MeetingPrep,
    Recruitment,
    RecruitmentByStage,
    CompetitorIntel,
    Prospecting,
    CustomerHealth,
    General,
}

impl IntentType {
    /// Every intent, in declaration order.
    pub const ALL: [IntentType; 12] = [
        IntentType::PipelineOverview,
        IntentType::PipelineSilent,
        IntentType::PipelineByStage,
        IntentType::PipelineByValue,
        IntentType::PipelineAnalytics,
        IntentType::MeetingPrep,
        IntentType::Recruitment,
        IntentType::RecruitmentByStage,
        IntentType::CompetitorIntel,
        IntentType::Prospecting,
        IntentType::CustomerHealth,
        IntentType::General,
    ];

    /// Wire label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PipelineOverview => "pipeline-overview",
            Self::PipelineSilent => "pipeline-silent",
            Self::PipelineByStage => "pipeline-by-stage",
            Self::PipelineByValue => "pipeline-by-value",
            Self::PipelineAnalytics => "pipeline-analytics",
            Self::MeetingPrep => "meeting-prep",
            Self::Recruitment => "recruitment",
            Self::RecruitmentByStage => "recruitment-by-stage",
            Self::CompetitorIntel => "competitor-intel",
            Self::Prospecting => "prospecting",
            Self::CustomerHealth => "customer-health",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified question: the intent, its filters, and the text it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIntent {
    #[serde(rename = "type")]
    pub intent: IntentType,
    pub filters: QueryFilters,
    pub original_query: String,
}
