use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{GeneratedAd, OptimizationSuggestion, Priority, SuggestionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub window_days: i64,
    pub min_recent_ads: usize,
    pub confidence: u8,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            min_recent_ads: 5,
            confidence: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolumeAnalyzer {
    config: VolumeConfig,
}

impl VolumeAnalyzer {
    pub fn new(config: VolumeConfig) -> Self {
        Self { config }
    }

    pub fn recent_count(&self, ads: &[&GeneratedAd], now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(self.config.window_days);
        ads.iter().filter(|ad| ad.created_at >= cutoff).count()
    }

    pub fn analyze(&self, ads: &[&GeneratedAd], now: DateTime<Utc>) -> Option<OptimizationSuggestion> {
        let recent = self.recent_count(ads, now);
        if recent >= self.config.min_recent_ads {
            return None;
        }

        Some(OptimizationSuggestion {
            kind: SuggestionType::Description,
            priority: Priority::Low,
            title: "Generate more ad variations".to_string(),
            description: format!(
                "Only {} ads were created in the last {} days. More variations give the analysis more to learn from.",
                recent, self.config.window_days
            ),
            impact: "More reliable recommendations".to_string(),
            based_on: format!("{} ads in the last {} days", recent, self.config.window_days),
            confidence: self.config.confidence,
        })
    }
}
