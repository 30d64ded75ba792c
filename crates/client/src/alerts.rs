use std::sync::Arc;

use api_types::alert::Alert;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{api::ApiClient, error::Result, generation::RequestGeneration};

/// The alert list as of the last successful fetch.
#[derive(Clone, Debug, Default)]
pub struct AlertSnapshot {
    /// Newest first, as returned by the service.
    pub alerts: Vec<Alert>,
    pub unread: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl AlertSnapshot {
    fn new(alerts: Vec<Alert>) -> Self {
        let unread = engine::unread_count(&alerts);
        Self {
            alerts,
            unread,
            fetched_at: Some(Utc::now()),
        }
    }
}

/// Latest alert list and unread count, shared by every view.
///
/// Refreshes replace the snapshot wholesale. A failed refresh keeps the
/// previous snapshot; a refresh overtaken by a newer one is discarded.
#[derive(Clone, Debug)]
pub struct AlertCenter {
    api: ApiClient,
    snapshot: Arc<RwLock<Arc<AlertSnapshot>>>,
    generations: RequestGeneration,
}

impl AlertCenter {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            snapshot: Arc::default(),
            generations: RequestGeneration::new(),
        }
    }

    /// Fetches the alert list and returns the service's error, if any.
    /// `Ok(false)` means a newer fetch overtook this one.
    pub async fn fetch(&self) -> Result<bool> {
        let generation = self.generations.begin();
        let alerts = self.api.alerts().await?;

        let mut snapshot = self.snapshot.write().await;
        if !self.generations.is_current(generation) {
            tracing::debug!("dropping stale alert response");
            return Ok(false);
        }
        *snapshot = Arc::new(AlertSnapshot::new(alerts));
        Ok(true)
    }

    /// Background variant of [`AlertCenter::fetch`]: failures are logged and
    /// the previous list is kept. Returns whether the snapshot was replaced.
    pub async fn refresh(&self) -> bool {
        match self.fetch().await {
            Ok(applied) => applied,
            Err(err) => {
                tracing::warn!("alert refresh failed, keeping previous list: {err}");
                false
            }
        }
    }

    /// Marks one alert read, then re-fetches so the list and count match the
    /// service. Marking an already-read alert is harmless.
    pub async fn mark_read(&self, id: Uuid) -> Result<()> {
        self.api.mark_alert_read(id).await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn snapshot(&self) -> Arc<AlertSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.snapshot.read().await.unread
    }
}
