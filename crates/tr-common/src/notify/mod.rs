pub mod title_cache;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::recommend::record::RecommendationRecord;
use crate::store::{ProfileStore, RecommendationStore, RecommendationStoreError};

pub use title_cache::JobTitleCache;

/// Shown when a job title cannot be resolved; the feed never fails over a
/// missing title.
pub const MISSING_TITLE_PLACEHOLDER: &str = "(untitled job)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedKind {
    Staff,
    ProgramMatch,
}

/// Notification kinds in the candidate feed. The aggregator only emits
/// `Recommended`; `StatusChange` exists for callers that merge application
/// status facts into the same feed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NotificationKind {
    StatusChange,
    Recommended { sub_kind: RecommendedKind },
}

/// One fact worth telling the candidate about. `id` is stable across
/// repeated derivations of the same underlying fact and distinct between the
/// two facts a single record can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub id: String,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub job_id: i64,
    pub job_title: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationConfig {
    /// Records created within this many days qualify as program matches.
    pub window_days: i64,
    /// Upper bound on records read per candidate. Tunable, not correctness.
    pub fetch_limit: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            fetch_limit: 500,
        }
    }
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            window_days: env_parse("TR_NOTIFY_WINDOW_DAYS", defaults.window_days),
            fetch_limit: env_parse("TR_NOTIFY_FETCH_LIMIT", defaults.fetch_limit),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("recommendation store error: {0}")]
    Store(#[from] RecommendationStoreError),
}

/// Read-only derivation of the per-candidate notification feed from the
/// recommendation store. Stateless with respect to "seen": the caller owns
/// that and passes the already-seen identity set in.
pub struct NotificationAggregator {
    recommendations: Arc<dyn RecommendationStore>,
    profiles: Arc<dyn ProfileStore>,
    titles: Arc<JobTitleCache>,
    config: NotificationConfig,
}

impl NotificationAggregator {
    pub fn new(
        recommendations: Arc<dyn RecommendationStore>,
        profiles: Arc<dyn ProfileStore>,
        titles: Arc<JobTitleCache>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            recommendations,
            profiles,
            titles,
            config,
        }
    }

    #[instrument(skip(self, seen_ids), fields(seen = seen_ids.len()))]
    pub async fn notifications_for(
        &self,
        candidate_external_id: &str,
        seen_ids: &HashSet<String>,
    ) -> Result<Vec<NotificationEntry>, NotificationError> {
        let records = self
            .recommendations
            .fetch_for_candidate(candidate_external_id, self.config.fetch_limit)
            .await?;

        let job_ids: Vec<i64> = records.iter().map(|r| r.job_id).collect();
        let titles = self.titles.resolve(self.profiles.as_ref(), &job_ids).await;

        let now = Utc::now();
        let window = Duration::days(self.config.window_days);
        let mut entries = Vec::new();

        for record in &records {
            let job_title = titles
                .get(&record.job_id)
                .cloned()
                .unwrap_or_else(|| MISSING_TITLE_PLACEHOLDER.to_string());

            for entry in derive_entries(record, now, window, &job_title) {
                if !seen_ids.contains(&entry.id) {
                    entries.push(entry);
                }
            }
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}

/// A record can carry two independent facts: a recent program match and a
/// staff recommendation. Each gets its own identity so "seen" state tracks
/// them separately.
fn derive_entries(
    record: &RecommendationRecord,
    now: DateTime<Utc>,
    window: Duration,
    job_title: &str,
) -> Vec<NotificationEntry> {
    let mut entries = Vec::new();

    if now - record.created_at <= window {
        entries.push(NotificationEntry {
            id: format!("{}-{}-ai", record.record_id, record.job_id),
            kind: NotificationKind::Recommended {
                sub_kind: RecommendedKind::ProgramMatch,
            },
            job_id: record.job_id,
            job_title: job_title.to_string(),
            timestamp: record.created_at,
        });
    }

    if record.staff_recommend {
        // The modification time is the closest signal to when the flag was
        // actually set.
        entries.push(NotificationEntry {
            id: format!("{}-{}-staff", record.record_id, record.job_id),
            kind: NotificationKind::Recommended {
                sub_kind: RecommendedKind::Staff,
            },
            job_id: record.job_id,
            job_title: job_title.to_string(),
            timestamp: record.updated_at,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryProfileStore, InMemoryRecommendationStore};
    use crate::JobProfile;

    fn record(record_id: i64, job_id: i64, age_days: i64, staff: bool) -> RecommendationRecord {
        let created = Utc::now() - Duration::days(age_days);
        let mut record = RecommendationRecord::new(record_id, "acct-1", job_id, 10, created);
        record.staff_recommend = staff;
        record
    }

    fn aggregator(
        records: Vec<RecommendationRecord>,
        jobs: Vec<JobProfile>,
    ) -> NotificationAggregator {
        let store = Arc::new(InMemoryRecommendationStore::new());
        for r in records {
            store.seed(r);
        }
        NotificationAggregator::new(
            store,
            Arc::new(InMemoryProfileStore::new(vec![], jobs)),
            Arc::new(JobTitleCache::new(Duration::minutes(10))),
            NotificationConfig::default(),
        )
    }

    fn job(id: i64, title: &str) -> JobProfile {
        JobProfile {
            id,
            title: title.into(),
            ..JobProfile::default()
        }
    }

    #[tokio::test]
    async fn recent_flagged_record_yields_two_distinct_entries() {
        let aggregator = aggregator(vec![record(1, 10, 1, true)], vec![job(10, "Rust role")]);

        let entries = aggregator
            .notifications_for("acct-1", &HashSet::new())
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].id, entries[1].id);
        assert!(entries.iter().any(|e| e.id == "1-10-ai"));
        assert!(entries.iter().any(|e| e.id == "1-10-staff"));
    }

    #[tokio::test]
    async fn old_unflagged_record_yields_nothing() {
        let aggregator = aggregator(vec![record(1, 10, 10, false)], vec![job(10, "Rust role")]);

        let entries = aggregator
            .notifications_for("acct-1", &HashSet::new())
            .await
            .unwrap();

        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn old_flagged_record_yields_only_staff_entry() {
        let aggregator = aggregator(vec![record(1, 10, 10, true)], vec![job(10, "Rust role")]);

        let entries = aggregator
            .notifications_for("acct-1", &HashSet::new())
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1-10-staff");
        assert_eq!(
            entries[0].kind,
            NotificationKind::Recommended {
                sub_kind: RecommendedKind::Staff
            }
        );
    }

    #[tokio::test]
    async fn seen_identities_are_excluded() {
        let aggregator = aggregator(vec![record(1, 10, 1, true)], vec![job(10, "Rust role")]);

        let seen = HashSet::from(["1-10-ai".to_string()]);
        let entries = aggregator.notifications_for("acct-1", &seen).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1-10-staff");
    }

    #[tokio::test]
    async fn entries_are_sorted_newest_first() {
        let aggregator = aggregator(
            vec![record(1, 10, 5, false), record(2, 11, 1, false)],
            vec![job(10, "Old"), job(11, "New")],
        );

        let entries = aggregator
            .notifications_for("acct-1", &HashSet::new())
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].job_id, 11);
        assert!(entries[0].timestamp >= entries[1].timestamp);
    }

    #[tokio::test]
    async fn missing_titles_fall_back_to_placeholder() {
        let aggregator = aggregator(vec![record(1, 99, 1, false)], vec![]);

        let entries = aggregator
            .notifications_for("acct-1", &HashSet::new())
            .await
            .unwrap();

        assert_eq!(entries[0].job_title, MISSING_TITLE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn staff_entry_uses_modification_time() {
        let store = Arc::new(InMemoryRecommendationStore::new());
        let mut r = record(1, 10, 30, true);
        r.updated_at = Utc::now() - Duration::days(2);
        store.seed(r.clone());

        let aggregator = NotificationAggregator::new(
            store,
            Arc::new(InMemoryProfileStore::new(vec![], vec![job(10, "Rust role")])),
            Arc::new(JobTitleCache::new(Duration::minutes(10))),
            NotificationConfig::default(),
        );

        let entries = aggregator
            .notifications_for("acct-1", &HashSet::new())
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, r.updated_at);
    }
}
