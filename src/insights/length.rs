use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{GeneratedAd, OptimizationSuggestion, Priority, SuggestionType};

/// The confidence and improvement figures are fixed product constants, not
/// values estimated from the sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthBandConfig {
    pub min_samples: usize,
    pub top_fraction: f64,
    pub finding_confidence: f64,
    pub min_confidence: f64,
    pub improvement_pct: f64,
}

impl Default for LengthBandConfig {
    fn default() -> Self {
        Self {
            min_samples: 5,
            top_fraction: 0.3,
            finding_confidence: 0.75,
            min_confidence: 0.7,
            improvement_pct: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub sample_size: usize,
}

impl LengthBand {
    pub fn optimal(&self) -> usize {
        self.mean.round().max(0.0) as usize
    }
}

#[derive(Debug, Clone)]
pub struct LengthBandAnalyzer {
    config: LengthBandConfig,
}

impl LengthBandAnalyzer {
    pub fn new(config: LengthBandConfig) -> Self {
        Self { config }
    }

    /// Headline length band of the top-performing slice, if enough ads carry a positive CTR.
    pub fn band(&self, ads: &[&GeneratedAd]) -> Option<LengthBand> {
        let mut ranked: Vec<(f64, usize)> = ads
            .iter()
            .filter_map(|ad| {
                let ctr = ad.ctr()?;
                (ctr > 0.0).then(|| (ctr, ad.headline.chars().count()))
            })
            .collect();
        if ranked.len() < self.config.min_samples.max(1) {
            return None;
        }

        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        let take = ((ranked.len() as f64) * self.config.top_fraction.clamp(0.0, 1.0)).ceil() as usize;
        let top = &ranked[..take.clamp(1, ranked.len())];

        let lengths = top.iter().map(|(_, len)| *len);
        let min = lengths.clone().min()?;
        let max = lengths.clone().max()?;
        let mean = lengths.sum::<usize>() as f64 / top.len() as f64;

        Some(LengthBand {
            min,
            max,
            mean,
            sample_size: top.len(),
        })
    }

    pub fn analyze(&self, ads: &[&GeneratedAd]) -> Option<OptimizationSuggestion> {
        let band = self.band(ads)?;
        if self.config.finding_confidence <= self.config.min_confidence {
            return None;
        }

        let confidence = (self.config.finding_confidence * 100.0).round().clamp(0.0, 100.0) as u8;
        Some(OptimizationSuggestion {
            kind: SuggestionType::Headline,
            priority: Priority::Medium,
            title: format!("Aim for {}-character headlines", band.optimal()),
            description: format!(
                "Your best-performing headlines run {}-{} characters, averaging {}.",
                band.min,
                band.max,
                band.optimal()
            ),
            impact: format!("Up to {:.0}% CTR improvement", self.config.improvement_pct),
            based_on: format!("Top {} ads ranked by CTR", band.sample_size),
            confidence,
        })
    }
}
