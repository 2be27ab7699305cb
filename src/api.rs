use adcopy_insights::generation::SavedGeneration;
use adcopy_insights::llm::GenerationRequest;
use adcopy_insights::{
    AdStatus, GeneratedAd, OptimizationSuggestion, UsageRecord, UsageSummary, UserSettings,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiSuggestionsResponse {
    pub suggestions: Vec<OptimizationSuggestion>,
}

#[derive(Debug, Serialize)]
pub struct ApiAdsResponse {
    pub ads: Vec<GeneratedAd>,
}

#[derive(Debug, Deserialize)]
pub struct AdsQuery {
    pub campaign_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGenerateRequest {
    pub business_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub tone: Option<String>,
    pub focus: Option<String>,
    pub variations: Option<usize>,
    pub landing_page_url: Option<String>,
    pub campaign_id: Option<String>,
    pub save: Option<bool>,
}

impl ApiGenerateRequest {
    /// Fills tone and focus from the user's settings when the request omits them.
    pub fn into_request(
        self,
        settings: &UserSettings,
    ) -> Result<(GenerationRequest, Option<String>, Option<bool>), String> {
        let business_description = self
            .business_description
            .unwrap_or_default()
            .trim()
            .to_string();
        if business_description.is_empty() {
            return Err("businessDescription is required".to_string());
        }

        let tone = non_empty(self.tone).unwrap_or_else(|| settings.default_tone.clone());
        let focus = non_empty(self.focus).unwrap_or_else(|| settings.default_focus.clone());
        let request = GenerationRequest {
            business_description,
            keywords: self.keywords.unwrap_or_default(),
            tone,
            focus,
            variations: self.variations.unwrap_or(3),
            landing_page_url: non_empty(self.landing_page_url),
        };
        Ok((request, non_empty(self.campaign_id), self.save))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiGenerateResponse {
    #[serde(flatten)]
    pub generation: SavedGeneration,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatusRequest {
    pub status: String,
}

impl ApiStatusRequest {
    pub fn into_status(self) -> Result<AdStatus, String> {
        AdStatus::from_str(&self.status).ok_or_else(|| format!("invalid status: {}", self.status))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiUsageResponse {
    pub records: Vec<UsageRecord>,
    pub summary: UsageSummary,
    pub month: UsageSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettingsRequest {
    pub auto_save: Option<bool>,
    pub default_tone: Option<String>,
    pub default_focus: Option<String>,
}

impl ApiSettingsRequest {
    pub fn apply(self, mut settings: UserSettings) -> UserSettings {
        if let Some(value) = self.auto_save {
            settings.auto_save = value;
        }
        if let Some(value) = non_empty(self.default_tone) {
            settings.default_tone = value;
        }
        if let Some(value) = non_empty(self.default_focus) {
            settings.default_focus = value;
        }
        settings
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
