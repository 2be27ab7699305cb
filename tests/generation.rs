use adcopy_insights::config::{GenerationConfig, InsightsConfig};
use adcopy_insights::llm::{build_prompt, display_url_from, parse_variants, GenerationRequest};
use adcopy_insights::Performance;
use serde_json::json;

fn request(variations: usize) -> GenerationRequest {
    GenerationRequest {
        business_description: "Family-run plumbing service".to_string(),
        keywords: vec!["emergency plumber".to_string(), " ".to_string(), "leak repair".to_string()],
        tone: "Professional".to_string(),
        focus: "Trust".to_string(),
        variations,
        landing_page_url: Some("https://www.plumb.example/book?src=ads".to_string()),
    }
}

#[test]
fn parses_fenced_ads_object() {
    let content = r#"Here you go:
```json
{"ads": [
  {"headline": " Fast Local Plumbers ", "description": "Same-day repairs, upfront pricing.", "displayUrl": "plumb.example"},
  {"headline": "", "description": "Dropped because the headline is empty"},
  {"headline": "24/7 Leak Repair", "description": "Call now for a free quote."}
]}
```"#;

    let variants = parse_variants(content).unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].headline, "Fast Local Plumbers");
    assert_eq!(variants[0].display_url, "plumb.example");
    assert_eq!(variants[1].display_url, "");
}

#[test]
fn parses_bare_array() {
    let content = r#"[{"headline": "Trusted Since 1998", "description": "Licensed and insured plumbers."}]"#;
    let variants = parse_variants(content).unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].headline, "Trusted Since 1998");
}

#[test]
fn rejects_responses_without_usable_copy() {
    assert!(parse_variants("Sorry, I cannot help with that.").is_err());
    assert!(parse_variants(r#"{"result": "none"}"#).is_err());
    assert!(parse_variants(r#"{"ads": [{"headline": "Only headline", "description": " "}]}"#).is_err());
}

#[test]
fn display_url_strips_scheme_www_and_query() {
    assert_eq!(display_url_from("https://www.plumb.example/book?src=ads"), "plumb.example/book");
    assert_eq!(display_url_from("plumb.example/"), "plumb.example");
    assert_eq!(display_url_from("http://shop.example/#top"), "shop.example");
}

#[test]
fn request_validation_bounds_variations() {
    assert!(request(3).validate(5).is_ok());
    assert!(request(0).validate(5).is_err());
    assert!(request(6).validate(5).is_err());

    let mut missing = request(2);
    missing.business_description = "   ".to_string();
    assert!(missing.validate(5).is_err());
}

#[test]
fn prompt_lists_non_empty_keywords_and_landing_page() {
    let prompt = build_prompt(&request(4));
    assert!(prompt.contains("Family-run plumbing service"));
    assert!(prompt.contains("Target keywords: emergency plumber, leak repair\n"));
    assert!(prompt.contains("Variations: 4"));
    assert!(prompt.contains("Landing page: https://www.plumb.example/book?src=ads"));
}

#[test]
fn generation_cost_uses_per_thousand_pricing() {
    let config = GenerationConfig {
        input_cost_per_1k: 0.5,
        output_cost_per_1k: 1.5,
        ..GenerationConfig::default()
    };
    assert!((config.cost(2000, 1000) - 2.5).abs() < 1e-9);
    assert!((config.cost(0, 0)).abs() < 1e-9);
}

#[test]
fn performance_coerces_loose_values() {
    let performance = Performance::from_value(&json!({
        "ctr": 0.042,
        "impressions": "1200",
        "clicks": null,
        "conversions": [3],
        "cost": true,
        "cpc": " 0.75 "
    }))
    .unwrap();

    assert_eq!(performance.ctr, Some(0.042));
    assert_eq!(performance.impressions, Some(1200.0));
    assert_eq!(performance.clicks, None);
    assert_eq!(performance.conversions, None);
    assert_eq!(performance.cost, None);
    assert_eq!(performance.cpc, Some(0.75));

    assert!(Performance::from_value(&json!(null)).is_none());
    assert!(Performance::from_value(&json!("0.05")).is_none());
    assert!(Performance::from_value(&json!({})).unwrap().is_empty());
}

#[test]
fn config_sections_fall_back_to_defaults() {
    let config: InsightsConfig = toml::from_str(
        r#"
[headline]
ctr_threshold = 0.03

[volume]
window_days = 14
"#,
    )
    .unwrap();

    assert!((config.headline.ctr_threshold - 0.03).abs() < 1e-9);
    assert_eq!(config.headline.confidence, 85);
    assert_eq!(config.volume.window_days, 14);
    assert_eq!(config.volume.min_recent_ads, 5);
    assert_eq!(config.keywords.stop_words.len(), 7);
    assert_eq!(config.fallback.min_ads, 3);
    assert!((config.length.finding_confidence - 0.75).abs() < 1e-9);
}

#[test]
fn config_round_trips_through_toml() {
    let config = InsightsConfig::default();
    let payload = toml::to_string_pretty(&config).unwrap();
    let parsed: InsightsConfig = toml::from_str(&payload).unwrap();
    assert_eq!(parsed.tone.confidence, config.tone.confidence);
    assert_eq!(parsed.store.path, config.store.path);
}

#[test]
fn default_config_file_ignores_env_overrides() {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let path = std::env::temp_dir()
        .join(format!("adcopy-insights-config-{}-{}", std::process::id(), nanos))
        .join("insights.toml");
    std::env::set_var("INSIGHTS_STORE_PATH", "/srv/override/store.json");

    InsightsConfig::write_default(&path).unwrap();
    std::env::remove_var("INSIGHTS_STORE_PATH");

    let written: InsightsConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.store.path, InsightsConfig::default().store.path);
    assert_eq!(
        written.generation.timeout_ms,
        GenerationConfig::default().timeout_ms
    );

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
