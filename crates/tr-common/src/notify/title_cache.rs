use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::store::ProfileStore;

struct CacheEntry {
    title: String,
    fetched_at: DateTime<Utc>,
}

/// Explicit TTL cache for job titles. Passed into the notification
/// aggregator rather than living as ambient module state; callers that know
/// a title changed call `invalidate`.
pub struct JobTitleCache {
    ttl: Duration,
    entries: Mutex<HashMap<i64, CacheEntry>>,
}

impl JobTitleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Default 10 minute TTL, overridable via `TR_TITLE_CACHE_TTL_SECONDS`.
    pub fn from_env() -> Self {
        let secs = std::env::var("TR_TITLE_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|s| *s >= 0)
            .unwrap_or(600);
        Self::new(Duration::seconds(secs))
    }

    pub fn invalidate(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Resolve titles for `job_ids`, hitting the profile store only for ids
    /// that are missing or expired. A failed bulk lookup degrades to
    /// whatever the cache already holds; it never propagates.
    pub async fn resolve(
        &self,
        profiles: &dyn ProfileStore,
        job_ids: &[i64],
    ) -> HashMap<i64, String> {
        let now = Utc::now();
        let mut resolved = HashMap::new();
        let mut stale = Vec::new();

        {
            let entries = self.entries.lock().unwrap();
            for id in job_ids {
                match entries.get(id) {
                    Some(entry) if now - entry.fetched_at <= self.ttl => {
                        resolved.insert(*id, entry.title.clone());
                    }
                    _ => stale.push(*id),
                }
            }
        }

        if stale.is_empty() {
            return resolved;
        }

        match profiles.fetch_job_titles(&stale).await {
            Ok(fetched) => {
                let mut entries = self.entries.lock().unwrap();
                for (id, title) in fetched {
                    entries.insert(
                        id,
                        CacheEntry {
                            title: title.clone(),
                            fetched_at: now,
                        },
                    );
                    resolved.insert(id, title);
                }
            }
            Err(err) => {
                warn!(error = %err, "job title lookup failed; using placeholders");
            }
        }

        resolved
    }
}
