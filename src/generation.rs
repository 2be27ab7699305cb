use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::llm::{AdVariant, GenerationRequest, GenerationResult};
use crate::store::error::Result;
use crate::store::{JsonAdStore, NewAd};
use crate::{GeneratedAd, UsageRecord};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGeneration {
    pub variants: Vec<AdVariant>,
    pub saved: Vec<GeneratedAd>,
    pub usage: UsageRecord,
}

/// Records spend for a finished generation call and saves the variants when
/// auto-save is on (or `save_override` forces it either way).
pub async fn record_generation(
    store: &JsonAdStore,
    user_id: &str,
    campaign_id: Option<String>,
    request: &GenerationRequest,
    result: GenerationResult,
    save_override: Option<bool>,
) -> Result<SavedGeneration> {
    let usage = store
        .record_usage(UsageRecord {
            id: String::new(),
            user_id: user_id.to_string(),
            model: result.usage.model.clone(),
            prompt_tokens: result.usage.prompt_tokens,
            completion_tokens: result.usage.completion_tokens,
            total_tokens: result.usage.total_tokens,
            cost: result.usage.cost,
            variations: result.variants.len(),
            created_at: Utc::now(),
        })
        .await?;

    let auto_save = match save_override {
        Some(save) => save,
        None => store.settings(user_id).await.auto_save,
    };

    let saved = if auto_save {
        let ads = result
            .variants
            .iter()
            .map(|variant| NewAd {
                user_id: user_id.to_string(),
                campaign_id: campaign_id.clone(),
                headline: variant.headline.clone(),
                description: variant.description.clone(),
                display_url: variant.display_url.clone(),
                tone: request.tone.trim().to_string(),
                focus: request.focus.trim().to_string(),
            })
            .collect();
        store.insert_ads(ads).await?
    } else {
        Vec::new()
    };

    info!(
        user_id,
        variants = result.variants.len(),
        saved = saved.len(),
        cost = usage.cost,
        "recorded generation"
    );

    Ok(SavedGeneration {
        variants: result.variants,
        saved,
        usage,
    })
}
