use serde::{Deserialize, Serialize};

use crate::insights::{format_points, grouped_mean_ctr};
use crate::{GeneratedAd, OptimizationSuggestion, Priority, SuggestionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlinePatternConfig {
    pub prefix_tokens: usize,
    pub min_group_size: usize,
    pub ctr_threshold: f64,
    pub baseline_ctr: f64,
    pub confidence: u8,
}

impl Default for HeadlinePatternConfig {
    fn default() -> Self {
        Self {
            prefix_tokens: 3,
            min_group_size: 2,
            ctr_threshold: 0.02,
            baseline_ctr: 0.015,
            confidence: 85,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlinePatternAnalyzer {
    config: HeadlinePatternConfig,
}

impl HeadlinePatternAnalyzer {
    pub fn new(config: HeadlinePatternConfig) -> Self {
        Self { config }
    }

    /// Case-sensitive key built from the leading headline tokens.
    pub fn pattern_key(&self, headline: &str) -> String {
        headline
            .split_whitespace()
            .take(self.config.prefix_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn analyze(&self, ads: &[&GeneratedAd]) -> Option<OptimizationSuggestion> {
        let samples = ads.iter().filter_map(|ad| {
            let ctr = ad.ctr()?;
            let key = self.pattern_key(&ad.headline);
            if key.is_empty() {
                return None;
            }
            Some((key, ctr))
        });

        let best = grouped_mean_ctr(samples, self.config.min_group_size)?;
        if best.mean_ctr <= self.config.ctr_threshold {
            return None;
        }

        let margin = best.mean_ctr - self.config.baseline_ctr;
        Some(OptimizationSuggestion {
            kind: SuggestionType::Headline,
            priority: Priority::High,
            title: format!("Lead headlines with \"{}\"", best.key),
            description: format!(
                "Headlines opening with \"{}\" average a {} CTR. Reuse this opening in new variations.",
                best.key,
                format_points(best.mean_ctr)
            ),
            impact: format!("+{} CTR over the baseline", format_points(margin)),
            based_on: format!("Analysis of {} ads with similar headlines", best.members),
            confidence: self.config.confidence,
        })
    }
}
