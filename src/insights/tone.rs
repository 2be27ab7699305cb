use serde::{Deserialize, Serialize};

use crate::insights::{format_points, grouped_mean_ctr};
use crate::{GeneratedAd, OptimizationSuggestion, Priority, SuggestionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub min_group_size: usize,
    pub ctr_threshold: f64,
    pub confidence: u8,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            min_group_size: 2,
            ctr_threshold: 0.02,
            confidence: 75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToneAnalyzer {
    config: ToneConfig,
}

impl ToneAnalyzer {
    pub fn new(config: ToneConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, ads: &[&GeneratedAd]) -> Option<OptimizationSuggestion> {
        let samples = ads.iter().filter_map(|ad| {
            let tone = ad.tone.trim();
            if tone.is_empty() {
                return None;
            }
            Some((tone.to_string(), ad.ctr()?))
        });

        let best = grouped_mean_ctr(samples, self.config.min_group_size)?;
        if best.mean_ctr <= self.config.ctr_threshold {
            return None;
        }

        Some(OptimizationSuggestion {
            kind: SuggestionType::Tone,
            priority: Priority::Medium,
            title: format!("Use a {} tone", best.key),
            description: format!(
                "Ads written in a {} tone reach a {} average CTR, the best of your tones.",
                best.key,
                format_points(best.mean_ctr)
            ),
            impact: format!("{} average CTR", format_points(best.mean_ctr)),
            based_on: format!("{} ads using the {} tone", best.members, best.key),
            confidence: self.config.confidence,
        })
    }
}
