pub mod fallback;
pub mod headline;
pub mod keywords;
pub mod length;
pub mod pipeline;
pub mod ranker;
pub mod tone;
pub mod volume;

use std::collections::HashMap;

pub use fallback::{fallback_suggestions, FallbackConfig};
pub use headline::{HeadlinePatternAnalyzer, HeadlinePatternConfig};
pub use keywords::{KeywordAnalyzer, KeywordConfig, KeywordCount};
pub use length::{LengthBand, LengthBandAnalyzer, LengthBandConfig};
pub use pipeline::SuggestionPipeline;
pub use ranker::rank;
pub use tone::{ToneAnalyzer, ToneConfig};
pub use volume::{VolumeAnalyzer, VolumeConfig};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GroupMean {
    pub key: String,
    pub members: usize,
    pub mean_ctr: f64,
}

/// Mean CTR per key for groups with at least `min_members` samples; returns the
/// best group, earliest-seen winning ties.
pub(crate) fn grouped_mean_ctr(
    samples: impl Iterator<Item = (String, f64)>,
    min_members: usize,
) -> Option<GroupMean> {
    let mut groups: Vec<(String, usize, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (key, ctr) in samples {
        match index.get(&key) {
            Some(&slot) => {
                groups[slot].1 += 1;
                groups[slot].2 += ctr;
            }
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 1, ctr));
            }
        }
    }

    let mut best: Option<GroupMean> = None;
    for (key, members, total) in groups {
        if members < min_members.max(1) {
            continue;
        }
        let mean_ctr = total / members as f64;
        if best.as_ref().map_or(true, |current| mean_ctr > current.mean_ctr) {
            best = Some(GroupMean {
                key,
                members,
                mean_ctr,
            });
        }
    }
    best
}

/// CTR fraction rendered as percent, e.g. `0.0234` -> `2.34%`.
pub(crate) fn format_points(ctr: f64) -> String {
    format!("{:.2}%", ctr * 100.0)
}
