pub mod config;
pub mod generation;
pub mod insights;
pub mod llm;
pub mod performance;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::performance::Performance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    #[default]
    Draft,
    Approved,
    Rejected,
}

impl AdStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Some(AdStatus::Draft),
            "approved" | "approve" => Some(AdStatus::Approved),
            "rejected" | "reject" => Some(AdStatus::Rejected),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdStatus::Draft => "draft",
            AdStatus::Approved => "approved",
            AdStatus::Rejected => "rejected",
        }
    }
}

/// One ad-copy variant produced for a user, optionally tied to a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAd {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    pub headline: String,
    pub description: String,
    #[serde(default)]
    pub display_url: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub status: AdStatus,
    /// Anything that is not a JSON object deserializes to `None`.
    #[serde(default, deserialize_with = "performance::deserialize_loose")]
    pub performance: Option<Performance>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedAd {
    pub fn ctr(&self) -> Option<f64> {
        self.performance.as_ref().and_then(|performance| performance.ctr)
    }

    pub fn has_performance(&self) -> bool {
        self.performance.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Headline,
    Description,
    Tone,
    Focus,
    Keywords,
}

impl SuggestionType {
    pub fn label(self) -> &'static str {
        match self {
            SuggestionType::Headline => "headline",
            SuggestionType::Description => "description",
            SuggestionType::Tone => "tone",
            SuggestionType::Focus => "focus",
            SuggestionType::Keywords => "keywords",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub based_on: String,
    pub confidence: u8,
}

/// Token and cost accounting for a single language-model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub id: String,
    pub user_id: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cost: f64,
    pub variations: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub calls: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub auto_save: bool,
    pub default_tone: String,
    pub default_focus: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            default_tone: "Professional".to_string(),
            default_focus: "Benefits".to_string(),
        }
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn format_cost(value: f64) -> String {
    format!("${:.4}", value.max(0.0))
}
