use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{GeneratedAd, OptimizationSuggestion, Priority, SuggestionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub ctr_threshold: f64,
    pub max_ads: usize,
    pub min_ads: usize,
    /// Tokens with this many characters or fewer are dropped.
    pub max_short_token_len: usize,
    pub stop_words: Vec<String>,
    pub min_count: usize,
    pub top_words: usize,
    pub cited_words: usize,
    pub confidence: u8,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            ctr_threshold: 0.025,
            max_ads: 10,
            min_ads: 3,
            max_short_token_len: 3,
            stop_words: ["with", "your", "that", "this", "from", "will", "have"]
                .iter()
                .map(|word| word.to_string())
                .collect(),
            min_count: 2,
            top_words: 5,
            cited_words: 3,
            confidence: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct KeywordAnalyzer {
    config: KeywordConfig,
}

impl KeywordAnalyzer {
    pub fn new(config: KeywordConfig) -> Self {
        Self { config }
    }

    /// Most frequent words across the most recently stored high-CTR ads.
    ///
    /// `ads` arrive oldest first; the newest `max_ads` qualifying ads are kept
    /// in that order, so ties still go to the word seen first.
    pub fn top_keywords(&self, ads: &[&GeneratedAd]) -> Vec<KeywordCount> {
        let qualifying: Vec<&GeneratedAd> = ads
            .iter()
            .copied()
            .filter(|ad| ad.ctr().is_some_and(|ctr| ctr > self.config.ctr_threshold))
            .collect();
        let skip = qualifying.len().saturating_sub(self.config.max_ads);
        let selected = &qualifying[skip..];
        if selected.len() < self.config.min_ads {
            return Vec::new();
        }

        let mut counts: Vec<KeywordCount> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for ad in selected.iter() {
            let text = format!("{} {}", ad.headline, ad.description).to_lowercase();
            for token in text.split_whitespace() {
                if !self.keeps(token) {
                    continue;
                }
                match index.get(token) {
                    Some(&slot) => counts[slot].count += 1,
                    None => {
                        index.insert(token.to_string(), counts.len());
                        counts.push(KeywordCount {
                            word: token.to_string(),
                            count: 1,
                        });
                    }
                }
            }
        }

        counts.retain(|entry| entry.count >= self.config.min_count);
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(self.config.top_words);
        counts
    }

    pub fn analyze(&self, ads: &[&GeneratedAd]) -> Option<OptimizationSuggestion> {
        let keywords = self.top_keywords(ads);
        if keywords.is_empty() {
            return None;
        }

        let cited = keywords
            .iter()
            .take(self.config.cited_words)
            .map(|entry| entry.word.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Some(OptimizationSuggestion {
            kind: SuggestionType::Keywords,
            priority: Priority::Medium,
            title: "Reuse your high-performing keywords".to_string(),
            description: format!(
                "Words like {} keep showing up in your highest-CTR ads. Work them into new copy.",
                cited
            ),
            impact: "Stronger keyword relevance".to_string(),
            based_on: format!(
                "Frequency analysis of ads above {:.1}% CTR",
                self.config.ctr_threshold * 100.0
            ),
            confidence: self.config.confidence,
        })
    }

    fn keeps(&self, token: &str) -> bool {
        token.chars().count() > self.config.max_short_token_len
            && !self.config.stop_words.iter().any(|stop| stop == token)
    }
}
