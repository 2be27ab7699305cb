use adcopy_insights::generation::record_generation;
use adcopy_insights::insights::SuggestionPipeline;
use adcopy_insights::llm::{AdVariant, GenerationRequest, GenerationResult, GenerationUsage};
use adcopy_insights::store::{AdStore, JsonAdStore, NewAd, StoreError};
use adcopy_insights::{AdStatus, GeneratedAd, UserSettings};
use chrono::{Duration, Utc};
use std::path::PathBuf;

fn new_ad(user_id: &str, headline: &str, campaign_id: Option<&str>) -> NewAd {
    NewAd {
        user_id: user_id.to_string(),
        campaign_id: campaign_id.map(|id| id.to_string()),
        headline: headline.to_string(),
        description: "Fresh bread delivered every morning".to_string(),
        display_url: "bakery.example/order".to_string(),
        tone: "Friendly".to_string(),
        focus: "Benefits".to_string(),
    }
}

fn temp_store_path(name: &str) -> PathBuf {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir()
        .join(format!("adcopy-insights-{}-{}-{}", name, std::process::id(), nanos))
        .join("store.json")
}

fn generation_request() -> GenerationRequest {
    GenerationRequest {
        business_description: "Neighbourhood bakery".to_string(),
        keywords: vec!["sourdough".to_string()],
        tone: "Friendly".to_string(),
        focus: "Benefits".to_string(),
        variations: 2,
        landing_page_url: Some("https://www.bakery.example/order".to_string()),
    }
}

fn generation_result() -> GenerationResult {
    GenerationResult {
        variants: vec![
            AdVariant {
                headline: "Warm Sourdough Daily".to_string(),
                description: "Baked at dawn, delivered by eight.".to_string(),
                display_url: "bakery.example".to_string(),
            },
            AdVariant {
                headline: "Bread Worth Waking For".to_string(),
                description: "Order tonight, enjoy tomorrow morning.".to_string(),
                display_url: "bakery.example".to_string(),
            },
        ],
        usage: GenerationUsage {
            model: "gpt-4o-mini".to_string(),
            latency_ms: 420,
            prompt_tokens: 300,
            completion_tokens: 120,
            total_tokens: 420,
            cost: 0.0012,
        },
    }
}

#[tokio::test]
async fn inserted_ads_are_visible_in_storage_order() {
    let store = JsonAdStore::in_memory();
    store
        .insert_ads(vec![
            new_ad("alice", "First headline", None),
            new_ad("bob", "Other user", None),
            new_ad("alice", "Second headline", Some("spring")),
        ])
        .await
        .unwrap();

    let ads = store.list_ads("alice").await.unwrap();
    let headlines: Vec<&str> = ads.iter().map(|ad| ad.headline.as_str()).collect();
    assert_eq!(headlines, vec!["First headline", "Second headline"]);
    assert!(ads.iter().all(|ad| ad.status == AdStatus::Draft));
    assert!(ads.iter().all(|ad| ad.performance.is_none()));
    assert_ne!(ads[0].id, ads[1].id);

    let campaign = store.list_ads_for_campaign("alice", "spring").await;
    assert_eq!(campaign.len(), 1);
    assert_eq!(campaign[0].headline, "Second headline");
}

#[tokio::test]
async fn empty_copy_is_rejected() {
    let store = JsonAdStore::in_memory();
    let mut ad = new_ad("alice", "  ", None);
    let result = store.insert_ads(vec![ad.clone()]).await;
    assert!(matches!(result, Err(StoreError::Invalid { field: "headline", .. })));

    ad.headline = "Valid headline".to_string();
    ad.description = String::new();
    let result = store.insert_ads(vec![ad]).await;
    assert!(matches!(result, Err(StoreError::Invalid { field: "description", .. })));
    assert!(store.list_ads("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn status_updates_and_deletes_are_scoped_to_the_owner() {
    let store = JsonAdStore::in_memory();
    let saved = store
        .insert_ads(vec![new_ad("alice", "Keep me", None), new_ad("alice", "Drop me", None)])
        .await
        .unwrap();

    let approved = store
        .set_status("alice", &saved[0].id, AdStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, AdStatus::Approved);

    let missing = store.set_status("bob", &saved[0].id, AdStatus::Rejected).await;
    assert!(matches!(missing, Err(StoreError::NotFound { entity: "ad", .. })));

    assert!(!store.delete_ad("bob", &saved[1].id).await.unwrap());
    assert!(store.delete_ad("alice", &saved[1].id).await.unwrap());
    assert!(!store.delete_ad("alice", &saved[1].id).await.unwrap());

    let remaining = store.list_ads("alice").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].status, AdStatus::Approved);
}

#[tokio::test]
async fn store_round_trips_through_disk() {
    let path = temp_store_path("reload");
    {
        let store = JsonAdStore::load(path.clone()).await.unwrap();
        store
            .insert_ads(vec![new_ad("alice", "Persisted headline", None)])
            .await
            .unwrap();
        store
            .update_settings(
                "alice",
                UserSettings {
                    auto_save: false,
                    default_tone: "Urgent".to_string(),
                    default_focus: "Price".to_string(),
                },
            )
            .await
            .unwrap();
    }

    let reloaded = JsonAdStore::load(path.clone()).await.unwrap();
    let ads = reloaded.list_ads("alice").await.unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].headline, "Persisted headline");
    assert!(!reloaded.settings("alice").await.auto_save);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn corrupt_store_file_fails_to_load() {
    let path = temp_store_path("corrupt");
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).unwrap();
    }
    std::fs::write(&path, "{ not json").unwrap();

    let result = JsonAdStore::load(path.clone()).await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn upsert_replaces_by_id_and_keeps_loose_performance() {
    let store = JsonAdStore::in_memory();
    let raw = serde_json::json!([
        {
            "id": "imp-1",
            "userId": "alice",
            "headline": "Imported headline",
            "description": "Imported description",
            "createdAt": "2024-05-20T10:00:00Z",
            "performance": { "ctr": "0.031", "clicks": 12, "cost": "n/a" }
        },
        {
            "id": "imp-2",
            "userId": "alice",
            "headline": "Second import",
            "description": "No metrics yet",
            "createdAt": "2024-05-21T10:00:00Z",
            "performance": "pending"
        }
    ]);
    let ads: Vec<GeneratedAd> = serde_json::from_value(raw).unwrap();
    assert_eq!(store.upsert_ads(ads.clone()).await.unwrap(), 2);

    let mut updated = ads[0].clone();
    updated.headline = "Renamed headline".to_string();
    store.upsert_ads(vec![updated]).await.unwrap();

    let stored = store.list_ads("alice").await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].headline, "Renamed headline");
    assert_eq!(stored[0].ctr(), Some(0.031));
    let performance = stored[0].performance.as_ref().unwrap();
    assert_eq!(performance.clicks, Some(12.0));
    assert_eq!(performance.cost, None);
    assert!(stored[1].performance.is_none());
}

#[tokio::test]
async fn upsert_rejects_ids_owned_by_another_user() {
    let store = JsonAdStore::in_memory();
    let saved = store
        .insert_ads(vec![new_ad("alice", "Alice's ad", None)])
        .await
        .unwrap();

    let mut hijack = saved[0].clone();
    hijack.user_id = "bob".to_string();
    hijack.headline = "Bob's copy".to_string();
    let result = store.upsert_ads(vec![hijack]).await;
    assert!(matches!(result, Err(StoreError::Invalid { field: "id", .. })));

    let alice = store.list_ads("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].headline, "Alice's ad");
    assert!(store.list_ads("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_writes_leave_memory_unchanged() {
    let path = temp_store_path("unwritable");
    // A directory where the temp file should go makes every write fail.
    std::fs::create_dir_all(path.with_extension("json.tmp")).unwrap();
    let store = JsonAdStore::load(path.clone()).await.unwrap();

    let inserted = store.insert_ads(vec![new_ad("alice", "Lost headline", None)]).await;
    assert!(matches!(inserted, Err(StoreError::Unavailable(_))));
    assert!(store.list_ads("alice").await.unwrap().is_empty());

    let settings = UserSettings {
        auto_save: false,
        ..UserSettings::default()
    };
    assert!(store.update_settings("alice", settings).await.is_err());
    assert!(store.settings("alice").await.auto_save);

    let pipeline = SuggestionPipeline::default();
    let suggestions = pipeline.suggest(&store, "alice", Utc::now()).await.unwrap();
    assert_eq!(suggestions.len(), 3);

    std::fs::remove_dir(path.with_extension("json.tmp")).unwrap();
    store
        .insert_ads(vec![new_ad("alice", "Saved headline", None)])
        .await
        .unwrap();
    let ads = store.list_ads("alice").await.unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].headline, "Saved headline");

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn usage_summary_totals_per_user() {
    let store = JsonAdStore::in_memory();
    let request = generation_request();
    record_generation(&store, "alice", None, &request, generation_result(), Some(false))
        .await
        .unwrap();
    record_generation(&store, "alice", None, &request, generation_result(), Some(false))
        .await
        .unwrap();
    record_generation(&store, "bob", None, &request, generation_result(), Some(false))
        .await
        .unwrap();

    let summary = store.usage_summary("alice", None).await;
    assert_eq!(summary.calls, 2);
    assert_eq!(summary.total_tokens, 840);
    assert!((summary.total_cost - 0.0024).abs() < 1e-9);

    let future = store
        .usage_summary("alice", Some(Utc::now() + Duration::days(1)))
        .await;
    assert_eq!(future.calls, 0);
    assert_eq!(store.list_usage("bob").await.len(), 1);
}

#[tokio::test]
async fn generation_respects_auto_save_setting() {
    let store = JsonAdStore::in_memory();
    let request = generation_request();

    let saved = record_generation(
        &store,
        "alice",
        Some("spring".to_string()),
        &request,
        generation_result(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(saved.saved.len(), 2);
    assert_eq!(saved.saved[0].tone, "Friendly");
    assert_eq!(saved.saved[0].campaign_id.as_deref(), Some("spring"));
    assert_eq!(saved.usage.variations, 2);

    let mut settings = store.settings("alice").await;
    assert_eq!(settings, UserSettings::default());
    settings.auto_save = false;
    store.update_settings("alice", settings).await.unwrap();

    let unsaved = record_generation(&store, "alice", None, &request, generation_result(), None)
        .await
        .unwrap();
    assert!(unsaved.saved.is_empty());
    assert_eq!(unsaved.variants.len(), 2);
    assert_eq!(store.list_ads("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn new_ads_are_visible_to_the_next_suggestion_request() {
    let store = JsonAdStore::in_memory();
    let pipeline = SuggestionPipeline::default();
    let now = Utc::now();

    store
        .insert_ads(vec![new_ad("alice", "One", None), new_ad("alice", "Two", None)])
        .await
        .unwrap();
    let before = pipeline.suggest(&store, "alice", now).await.unwrap();
    assert_eq!(before.len(), 3);

    store
        .insert_ads(vec![new_ad("alice", "Three", None)])
        .await
        .unwrap();
    let after = pipeline.suggest(&store, "alice", now).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].confidence, 60);
}
