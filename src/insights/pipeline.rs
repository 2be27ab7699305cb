use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::InsightsConfig;
use crate::insights::{
    fallback_suggestions, rank, HeadlinePatternAnalyzer, KeywordAnalyzer, LengthBandAnalyzer,
    ToneAnalyzer, VolumeAnalyzer,
};
use crate::store::{AdStore, StoreError};
use crate::{GeneratedAd, OptimizationSuggestion};

/// Runs every analyzer over a user's ad history and ranks the combined output.
#[derive(Debug, Clone)]
pub struct SuggestionPipeline {
    headline: HeadlinePatternAnalyzer,
    tone: ToneAnalyzer,
    length: LengthBandAnalyzer,
    keywords: KeywordAnalyzer,
    volume: VolumeAnalyzer,
    fallback_min_ads: usize,
}

impl SuggestionPipeline {
    pub fn new(
        headline: HeadlinePatternAnalyzer,
        tone: ToneAnalyzer,
        length: LengthBandAnalyzer,
        keywords: KeywordAnalyzer,
        volume: VolumeAnalyzer,
        fallback_min_ads: usize,
    ) -> Self {
        Self {
            headline,
            tone,
            length,
            keywords,
            volume,
            fallback_min_ads,
        }
    }

    pub fn from_config(config: &InsightsConfig) -> Self {
        Self::new(
            HeadlinePatternAnalyzer::new(config.headline.clone()),
            ToneAnalyzer::new(config.tone.clone()),
            LengthBandAnalyzer::new(config.length.clone()),
            KeywordAnalyzer::new(config.keywords.clone()),
            VolumeAnalyzer::new(config.volume.clone()),
            config.fallback.min_ads,
        )
    }

    pub async fn suggest<S: AdStore>(
        &self,
        store: &S,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<OptimizationSuggestion>, StoreError> {
        let ads = store.list_ads(user_id).await?;
        let suggestions = self.analyze(&ads, now);
        debug!(user_id, ads = ads.len(), suggestions = suggestions.len(), "computed suggestions");
        Ok(suggestions)
    }

    pub fn analyze(&self, ads: &[GeneratedAd], now: DateTime<Utc>) -> Vec<OptimizationSuggestion> {
        if ads.len() < self.fallback_min_ads {
            return fallback_suggestions();
        }

        let all: Vec<&GeneratedAd> = ads.iter().collect();
        let with_performance: Vec<&GeneratedAd> =
            ads.iter().filter(|ad| ad.has_performance()).collect();

        let mut suggestions: Vec<OptimizationSuggestion> = [
            self.headline.analyze(&with_performance),
            self.tone.analyze(&with_performance),
            self.length.analyze(&with_performance),
            self.keywords.analyze(&with_performance),
            self.volume.analyze(&all, now),
        ]
        .into_iter()
        .flatten()
        .collect();

        rank(&mut suggestions);
        suggestions
    }
}

impl Default for SuggestionPipeline {
    fn default() -> Self {
        Self::from_config(&InsightsConfig::default())
    }
}
