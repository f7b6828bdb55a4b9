//! In-memory store implementations backing unit tests, router smoke tests
//! and the worker's dry-run mode. Semantics mirror the Postgres adapter:
//! pair-unique upserts on create, partial-field writes, store-managed
//! `updated_at`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    ProfileStore, ProfileStoreError, RecommendationStore, RecommendationStoreError,
};
use crate::recommend::record::{AiEvaluation, RecommendationRecord};
use crate::recommend::reconcile::{NewRecommendation, ScoreUpdate};
use crate::{CandidateProfile, JobProfile};

#[derive(Default)]
pub struct InMemoryProfileStore {
    candidates: Mutex<Vec<CandidateProfile>>,
    jobs: Mutex<Vec<JobProfile>>,
    inactive: Mutex<HashSet<i64>>,
}

impl InMemoryProfileStore {
    pub fn new(candidates: Vec<CandidateProfile>, jobs: Vec<JobProfile>) -> Self {
        Self {
            candidates: Mutex::new(candidates),
            jobs: Mutex::new(jobs),
            inactive: Mutex::new(HashSet::new()),
        }
    }

    /// Mark a candidate withdrawn so active-candidate fetches skip them.
    pub fn withdraw_candidate(&self, id: i64) {
        self.inactive.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_active_candidates(&self) -> Result<Vec<CandidateProfile>, ProfileStoreError> {
        let inactive = self.inactive.lock().unwrap();
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !inactive.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn fetch_candidate(
        &self,
        id: i64,
    ) -> Result<Option<CandidateProfile>, ProfileStoreError> {
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn fetch_job(&self, job_id: i64) -> Result<Option<JobProfile>, ProfileStoreError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == job_id)
            .cloned())
    }

    async fn fetch_job_titles(
        &self,
        job_ids: &[i64],
    ) -> Result<HashMap<i64, String>, ProfileStoreError> {
        let jobs = self.jobs.lock().unwrap();
        Ok(job_ids
            .iter()
            .filter_map(|id| {
                jobs.iter()
                    .find(|j| j.id == *id)
                    .map(|j| (*id, j.title.clone()))
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRecommendationStore {
    records: Mutex<Vec<RecommendationRecord>>,
    next_id: Mutex<i64>,
    fail_writes: AtomicBool,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            ..Self::default()
        }
    }

    /// Make every write fail, for exercising batch-error surfacing.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing create semantics. Test setup only.
    pub fn seed(&self, record: RecommendationRecord) {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id = (*next_id).max(record.record_id + 1);
        self.records.lock().unwrap().push(record);
    }

    pub fn snapshot(&self) -> Vec<RecommendationRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Flip the staff flag the way the external curation UI would.
    pub fn set_staff_recommend(&self, record_id: i64, value: bool, at: DateTime<Utc>) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.record_id == record_id) {
            record.staff_recommend = value;
            record.updated_at = at;
        }
    }

    /// Drop and recreate a pair with a fresh creation timestamp. Mirrors the
    /// external administrative reset; not part of the core write paths.
    pub fn reset_pair(&self, candidate_external_id: &str, job_id: i64, score: i64) -> i64 {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| {
            !(r.candidate_external_id == candidate_external_id && r.job_id == job_id)
        });

        let mut next_id = self.next_id.lock().unwrap();
        let record_id = *next_id;
        *next_id += 1;
        records.push(RecommendationRecord::new(
            record_id,
            candidate_external_id,
            job_id,
            score,
            Utc::now(),
        ));
        record_id
    }

    fn check_writes(&self) -> Result<(), RecommendationStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RecommendationStoreError::BulkWrite(
                "injected write failure".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn fetch_by_job(
        &self,
        job_id: i64,
    ) -> Result<Vec<RecommendationRecord>, RecommendationStoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn fetch_for_candidate(
        &self,
        candidate_external_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, RecommendationStoreError> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.candidate_external_id == candidate_external_id)
            .cloned()
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn find_pair(
        &self,
        candidate_external_id: &str,
        job_id: i64,
    ) -> Result<Option<RecommendationRecord>, RecommendationStoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.candidate_external_id == candidate_external_id && r.job_id == job_id)
            .cloned())
    }

    async fn bulk_create(
        &self,
        creates: &[NewRecommendation],
    ) -> Result<Vec<i64>, RecommendationStoreError> {
        self.check_writes()?;

        let now = Utc::now();
        let mut records = self.records.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        let mut ids = Vec::with_capacity(creates.len());

        for create in creates {
            if let Some(existing) = records.iter_mut().find(|r| {
                r.candidate_external_id == create.candidate_external_id
                    && r.job_id == create.job_id
            }) {
                existing.score = create.score;
                existing.updated_at = now;
                ids.push(existing.record_id);
                continue;
            }

            let record_id = *next_id;
            *next_id += 1;
            records.push(RecommendationRecord::new(
                record_id,
                create.candidate_external_id.clone(),
                create.job_id,
                create.score,
                now,
            ));
            ids.push(record_id);
        }

        Ok(ids)
    }

    async fn bulk_update_scores(
        &self,
        updates: &[ScoreUpdate],
    ) -> Result<(), RecommendationStoreError> {
        self.check_writes()?;

        let now = Utc::now();
        let mut records = self.records.lock().unwrap();
        for update in updates {
            let record = records
                .iter_mut()
                .find(|r| r.record_id == update.record_id)
                .ok_or(RecommendationStoreError::NotFound(update.record_id))?;
            record.score = update.score;
            record.updated_at = now;
        }

        Ok(())
    }

    async fn write_ai_evaluation(
        &self,
        record_id: i64,
        evaluation: &AiEvaluation,
    ) -> Result<(), RecommendationStoreError> {
        self.check_writes()?;

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.record_id == record_id)
            .ok_or(RecommendationStoreError::NotFound(record_id))?;
        record.ai_evaluation = evaluation.clone();
        record.updated_at = Utc::now();

        Ok(())
    }
}
