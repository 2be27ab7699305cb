use crate::{OptimizationSuggestion, Priority};

/// High-priority suggestions first, then by descending confidence.
///
/// Medium and low are not separated from each other. The sort is stable so
/// equal keys keep analyzer order.
pub fn rank(suggestions: &mut [OptimizationSuggestion]) {
    suggestions.sort_by(|a, b| {
        let a_high = a.priority == Priority::High;
        let b_high = b.priority == Priority::High;
        b_high
            .cmp(&a_high)
            .then_with(|| b.confidence.cmp(&a.confidence))
    });
}
