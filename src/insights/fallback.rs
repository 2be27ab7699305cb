use serde::{Deserialize, Serialize};

use crate::{OptimizationSuggestion, Priority, SuggestionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Histories shorter than this get the generic suggestions.
    pub min_ads: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { min_ads: 3 }
    }
}

pub fn fallback_suggestions() -> Vec<OptimizationSuggestion> {
    vec![
        OptimizationSuggestion {
            kind: SuggestionType::Headline,
            priority: Priority::Medium,
            title: "Test different headline approaches".to_string(),
            description: "Try question headlines, benefit-led headlines and headlines with numbers to see what your audience responds to.".to_string(),
            impact: "Find your strongest headline style".to_string(),
            based_on: "Google Ads best practices".to_string(),
            confidence: 65,
        },
        OptimizationSuggestion {
            kind: SuggestionType::Tone,
            priority: Priority::Medium,
            title: "Experiment with tone".to_string(),
            description: "Generate variations in a few tones (Professional, Friendly, Urgent) and compare their click-through rates.".to_string(),
            impact: "Match the voice your customers prefer".to_string(),
            based_on: "Industry benchmarks".to_string(),
            confidence: 70,
        },
        OptimizationSuggestion {
            kind: SuggestionType::Description,
            priority: Priority::Medium,
            title: "End descriptions with a clear call to action".to_string(),
            description: "Close every description with a direct next step such as \"Shop now\", \"Get a quote\" or \"Book today\".".to_string(),
            impact: "Higher conversion intent".to_string(),
            based_on: "Google Ads best practices".to_string(),
            confidence: 75,
        },
    ]
}
