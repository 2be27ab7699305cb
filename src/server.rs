use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use std::{net::SocketAddr, sync::Arc};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use crate::api::{
    AdsQuery, ApiAdsResponse, ApiGenerateRequest, ApiGenerateResponse, ApiSettingsRequest,
    ApiStatusRequest, ApiSuggestionsResponse, ApiUsageResponse,
};
use adcopy_insights::config::InsightsConfig;
use adcopy_insights::generation::record_generation;
use adcopy_insights::insights::SuggestionPipeline;
use adcopy_insights::llm::LlmClient;
use adcopy_insights::store::{AdStore, JsonAdStore, StoreError};
use adcopy_insights::{GeneratedAd, UserSettings};

const USER_HEADER: &str = "x-user-id";

type ApiError = (StatusCode, String);

#[derive(Clone)]
struct AppState {
    store: Arc<JsonAdStore>,
    pipeline: Arc<SuggestionPipeline>,
    llm_client: Option<LlmClient>,
}

pub async fn serve(args: crate::ServeArgs, config: InsightsConfig) -> Result<(), String> {
    let store = JsonAdStore::load(config.store.path.clone())
        .await
        .map_err(|err| format!("failed to open store: {}", err))?;
    let llm_client = LlmClient::from_env(None, &config.generation)?;
    match llm_client.as_ref() {
        Some(client) => info!(model = client.model(), "ad generation enabled"),
        None => warn!("LLM_API_KEY is not set; ad generation is disabled"),
    }

    let state = AppState {
        store: Arc::new(store),
        pipeline: Arc::new(SuggestionPipeline::from_config(&config)),
        llm_client,
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/suggestions", get(suggestions_handler))
        .route("/api/ads", get(list_ads_handler))
        .route("/api/ads/generate", post(generate_handler))
        .route("/api/ads/:id", get(get_ad_handler).delete(delete_ad_handler))
        .route("/api/ads/:id/status", patch(status_handler))
        .route("/api/usage", get(usage_handler))
        .route("/api/settings", get(get_settings_handler).put(put_settings_handler))
        .fallback_service(static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, "dashboard listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn suggestions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiSuggestionsResponse>, ApiError> {
    let user_id = user_id(&headers)?;
    compute_suggestions(&state.pipeline, state.store.as_ref(), &user_id).await
}

/// Store failures surface as one opaque 500; details only go to the log.
async fn compute_suggestions<S: AdStore>(
    pipeline: &SuggestionPipeline,
    store: &S,
    user_id: &str,
) -> Result<Json<ApiSuggestionsResponse>, ApiError> {
    let suggestions = pipeline
        .suggest(store, user_id, Utc::now())
        .await
        .map_err(|err| {
            error!(%user_id, error = %err, "suggestion request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to compute suggestions".to_string(),
            )
        })?;
    Ok(Json(ApiSuggestionsResponse { suggestions }))
}

async fn list_ads_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdsQuery>,
) -> Result<Json<ApiAdsResponse>, ApiError> {
    let user_id = user_id(&headers)?;
    let ads: Vec<GeneratedAd> = match query.campaign_id.as_deref() {
        Some(campaign_id) => state.store.list_ads_for_campaign(&user_id, campaign_id).await,
        None => state.store.list_ads(&user_id).await.map_err(store_error)?,
    };
    Ok(Json(ApiAdsResponse { ads }))
}

async fn generate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ApiGenerateRequest>,
) -> Result<Json<ApiGenerateResponse>, ApiError> {
    let user_id = user_id(&headers)?;
    let settings = state.store.settings(&user_id).await;
    let (request, campaign_id, save) = request
        .into_request(&settings)
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;

    let client = state.llm_client.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "ad generation not configured: set LLM_API_KEY".to_string(),
        )
    })?;

    let result = client.generate(&request).await.map_err(|err| {
        warn!(%user_id, error = %err, "ad generation failed");
        (StatusCode::BAD_GATEWAY, err)
    })?;

    let mut warnings = Vec::new();
    if result.variants.len() < request.variations {
        warnings.push(format!(
            "requested {} variations, received {}",
            request.variations,
            result.variants.len()
        ));
    }

    let generation = record_generation(
        state.store.as_ref(),
        &user_id,
        campaign_id,
        &request,
        result,
        save,
    )
    .await
    .map_err(store_error)?;

    Ok(Json(ApiGenerateResponse {
        generation,
        warnings,
    }))
}

async fn get_ad_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ad_id): Path<String>,
) -> Result<Json<GeneratedAd>, ApiError> {
    let user_id = user_id(&headers)?;
    state
        .store
        .get_ad(&user_id, &ad_id)
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("ad not found: {}", ad_id)))
}

async fn delete_ad_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ad_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_id = user_id(&headers)?;
    let removed = state
        .store
        .delete_ad(&user_id, &ad_id)
        .await
        .map_err(store_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("ad not found: {}", ad_id)))
    }
}

async fn status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ad_id): Path<String>,
    Json(request): Json<ApiStatusRequest>,
) -> Result<Json<GeneratedAd>, ApiError> {
    let user_id = user_id(&headers)?;
    let status = request
        .into_status()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let ad = state
        .store
        .set_status(&user_id, &ad_id, status)
        .await
        .map_err(store_error)?;
    Ok(Json(ad))
}

async fn usage_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiUsageResponse>, ApiError> {
    let user_id = user_id(&headers)?;
    let month_start = Utc::now()
        .date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc());

    let records = state.store.list_usage(&user_id).await;
    let summary = state.store.usage_summary(&user_id, None).await;
    let month = state.store.usage_summary(&user_id, month_start).await;
    Ok(Json(ApiUsageResponse {
        records,
        summary,
        month,
    }))
}

async fn get_settings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserSettings>, ApiError> {
    let user_id = user_id(&headers)?;
    Ok(Json(state.store.settings(&user_id).await))
}

async fn put_settings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ApiSettingsRequest>,
) -> Result<Json<UserSettings>, ApiError> {
    let user_id = user_id(&headers)?;
    let current = state.store.settings(&user_id).await;
    let updated = state
        .store
        .update_settings(&user_id, request.apply(current))
        .await
        .map_err(store_error)?;
    Ok(Json(updated))
}

/// Identity comes from a trusted header set by the auth proxy in front of us.
fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                format!("missing {} header", USER_HEADER),
            )
        })
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Invalid { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        other => {
            error!(error = %other, "store operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage unavailable".to_string(),
            )
        }
    }
}
