use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::store::error::Result;
use crate::store::{AdStore, StoreError};
use crate::{AdStatus, GeneratedAd, UsageRecord, UsageSummary, UserSettings};

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// An ad variant about to be saved; id, status and timestamp are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewAd {
    pub user_id: String,
    pub campaign_id: Option<String>,
    pub headline: String,
    pub description: String,
    pub display_url: String,
    pub tone: String,
    pub focus: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    ads: Vec<GeneratedAd>,
    #[serde(default)]
    usage: Vec<UsageRecord>,
    #[serde(default)]
    settings: HashMap<String, UserSettings>,
}

/// File-backed store holding ads, usage records and settings in one JSON document.
///
/// Writes apply to a copy of the data and only replace it once the file is written,
/// so a failed write leaves memory matching disk. The lock is held across the
/// write, so a caller always reads its own writes.
pub struct JsonAdStore {
    path: Option<PathBuf>,
    data: RwLock<StoreData>,
}

impl JsonAdStore {
    pub async fn load(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| StoreError::Unavailable(format!("failed to read store: {}", err)))?;
            if contents.trim().is_empty() {
                StoreData::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            StoreData::default()
        };

        info!(path = %path.display(), ads = data.ads.len(), "loaded ad store");
        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(StoreData::default()),
        }
    }

    pub async fn list_ads_for_campaign(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Vec<GeneratedAd> {
        let guard = self.data.read().await;
        guard
            .ads
            .iter()
            .filter(|ad| ad.user_id == user_id && ad.campaign_id.as_deref() == Some(campaign_id))
            .cloned()
            .collect()
    }

    pub async fn get_ad(&self, user_id: &str, ad_id: &str) -> Option<GeneratedAd> {
        let guard = self.data.read().await;
        guard
            .ads
            .iter()
            .find(|ad| ad.user_id == user_id && ad.id == ad_id)
            .cloned()
    }

    pub async fn insert_ads(&self, ads: Vec<NewAd>) -> Result<Vec<GeneratedAd>> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(ads.len());
        for ad in ads {
            validate_copy(&ad.headline, &ad.description)?;
            created.push(GeneratedAd {
                id: generate_id("ad"),
                user_id: ad.user_id,
                campaign_id: ad.campaign_id,
                headline: ad.headline.trim().to_string(),
                description: ad.description.trim().to_string(),
                display_url: ad.display_url,
                tone: ad.tone,
                focus: ad.focus,
                status: AdStatus::Draft,
                performance: None,
                created_at: now,
            });
        }

        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        next.ads.extend(created.iter().cloned());
        self.commit(&mut guard, next).await?;
        debug!(count = created.len(), "saved generated ads");
        Ok(created)
    }

    /// Inserts or replaces ads by id, keeping the position of replaced records.
    ///
    /// An id already owned by another user rejects the whole batch.
    pub async fn upsert_ads(&self, ads: Vec<GeneratedAd>) -> Result<usize> {
        for ad in &ads {
            validate_copy(&ad.headline, &ad.description)?;
        }

        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let count = ads.len();
        for ad in ads {
            match next.ads.iter_mut().find(|existing| existing.id == ad.id) {
                Some(existing) if existing.user_id != ad.user_id => {
                    return Err(StoreError::Invalid {
                        field: "id",
                        reason: format!("{} belongs to another user", ad.id),
                    });
                }
                Some(existing) => *existing = ad,
                None => next.ads.push(ad),
            }
        }
        self.commit(&mut guard, next).await?;
        Ok(count)
    }

    pub async fn delete_ad(&self, user_id: &str, ad_id: &str) -> Result<bool> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        next.ads.retain(|ad| !(ad.user_id == user_id && ad.id == ad_id));
        let removed = next.ads.len() != guard.ads.len();
        if removed {
            self.commit(&mut guard, next).await?;
        }
        Ok(removed)
    }

    pub async fn set_status(
        &self,
        user_id: &str,
        ad_id: &str,
        status: AdStatus,
    ) -> Result<GeneratedAd> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let ad = next
            .ads
            .iter_mut()
            .find(|ad| ad.user_id == user_id && ad.id == ad_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "ad",
                id: ad_id.to_string(),
            })?;
        ad.status = status;
        let updated = ad.clone();
        self.commit(&mut guard, next).await?;
        Ok(updated)
    }

    pub async fn record_usage(&self, mut record: UsageRecord) -> Result<UsageRecord> {
        if record.id.is_empty() {
            record.id = generate_id("usage");
        }
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        next.usage.push(record.clone());
        self.commit(&mut guard, next).await?;
        Ok(record)
    }

    pub async fn list_usage(&self, user_id: &str) -> Vec<UsageRecord> {
        let guard = self.data.read().await;
        guard
            .usage
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn usage_summary(&self, user_id: &str, since: Option<DateTime<Utc>>) -> UsageSummary {
        let guard = self.data.read().await;
        guard
            .usage
            .iter()
            .filter(|record| record.user_id == user_id)
            .filter(|record| since.map_or(true, |since| record.created_at >= since))
            .fold(UsageSummary::default(), |mut summary, record| {
                summary.calls += 1;
                summary.total_tokens += record.total_tokens as u64;
                summary.total_cost += record.cost;
                summary
            })
    }

    pub async fn settings(&self, user_id: &str) -> UserSettings {
        let guard = self.data.read().await;
        guard.settings.get(user_id).cloned().unwrap_or_default()
    }

    pub async fn update_settings(&self, user_id: &str, settings: UserSettings) -> Result<UserSettings> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        next.settings.insert(user_id.to_string(), settings.clone());
        self.commit(&mut guard, next).await?;
        Ok(settings)
    }

    async fn commit(&self, current: &mut StoreData, next: StoreData) -> Result<()> {
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }

    async fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(data)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| StoreError::Unavailable(format!("failed to write store: {}", err)))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|err| StoreError::Unavailable(format!("failed to finalize store: {}", err)))?;
        Ok(())
    }
}

impl AdStore for JsonAdStore {
    async fn list_ads(&self, user_id: &str) -> Result<Vec<GeneratedAd>> {
        let guard = self.data.read().await;
        Ok(guard
            .ads
            .iter()
            .filter(|ad| ad.user_id == user_id)
            .cloned()
            .collect())
    }
}

fn validate_copy(headline: &str, description: &str) -> Result<()> {
    if headline.trim().is_empty() {
        return Err(StoreError::Invalid {
            field: "headline",
            reason: "must not be empty".to_string(),
        });
    }
    if description.trim().is_empty() {
        return Err(StoreError::Invalid {
            field: "description",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn generate_id(prefix: &str) -> String {
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), counter)
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| StoreError::Unavailable(format!("failed to create store dir: {}", err)))
}
