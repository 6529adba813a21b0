//! crates/ce_pipeline/src/store.rs
//! Persistence seam.
//!
//! Campaign cycles carry a revision; every write is compare-and-set against
//! the revision the caller read. Polling samples and ads are append-only,
//! except for the single `countered` mark on an ad.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ce_algo::attack::impact::shifted_sample;
use ce_core::entities::{CampaignCycle, NegativeAdRecord, PollingSample, Research};
use ce_core::ids::{AdId, CampaignId, CandidateId, ResearchId};
use ce_io::StateSnapshot;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Compare-and-set lost, or a unique key is already taken.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Write would break a stored-record invariant.
    #[error("invariant: {0}")]
    Invariant(String),
    #[error("backend: {0}")]
    Backend(String),
}

/// A record together with the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub revision: u64,
}

/// Support shift for one candidate, applied to their latest committed sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PollShift {
    pub candidate_id: CandidateId,
    pub shift: f64,
}

/// Everything a negative-ad launch persists, committed as one unit.
#[derive(Debug, Clone)]
pub struct AdCommit {
    pub attacker: CampaignCycle,
    pub expected_revision: u64,
    pub ad: NegativeAdRecord,
    /// Applied in order at `ad.launched_epoch`.
    pub shifts: Vec<PollShift>,
    /// Base support for a candidate without samples.
    pub default_support: f64,
}

/// Result of a committed launch.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedAd {
    pub revision: u64,
    /// Samples appended, in `shifts` order.
    pub samples: Vec<PollingSample>,
}

pub trait CampaignStore: Send + Sync {
    /// Current cycle of a candidate.
    fn campaign(&self, candidate: &CandidateId) -> Result<Option<Versioned<CampaignCycle>>, StoreError>;
    fn campaign_by_id(&self, id: &CampaignId) -> Result<Option<Versioned<CampaignCycle>>, StoreError>;
    /// CAS write; returns the new revision.
    fn write_campaign(&self, cycle: CampaignCycle, expected_revision: u64) -> Result<u64, StoreError>;

    /// Most recent first; at most `limit`.
    fn recent_polls(&self, candidate: &CandidateId, limit: usize) -> Result<Vec<PollingSample>, StoreError>;
    /// Entry point for the external polling-snapshot feed; the engine itself only
    /// appends samples through `commit_ad`.
    fn append_poll(&self, sample: PollingSample) -> Result<(), StoreError>;

    fn ad(&self, id: &AdId) -> Result<Option<NegativeAdRecord>, StoreError>;
    fn ads_by_attacker(&self, attacker: &CandidateId) -> Result<Vec<NegativeAdRecord>, StoreError>;
    fn research(&self, id: &ResearchId) -> Result<Option<Research>, StoreError>;

    /// Atomically: CAS the attacker's cycle, insert the ad, mark the answered ad
    /// countered (if any), and append one sample per shift built from the latest
    /// sample as of the commit.
    fn commit_ad(&self, commit: AdCommit) -> Result<CommittedAd, StoreError>;
}

// ------------------------------------------------------------------------------------------------
// In-memory implementation
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    campaigns: BTreeMap<CandidateId, Versioned<CampaignCycle>>,
    /// Append order per candidate.
    polls: BTreeMap<CandidateId, Vec<PollingSample>>,
    ads: BTreeMap<AdId, NegativeAdRecord>,
    research: BTreeMap<ResearchId, Research>,
}

impl Inner {
    /// Newest by timestamp; on ties the later append wins.
    fn latest_support(&self, candidate: &CandidateId) -> Option<f64> {
        self.polls
            .get(candidate)?
            .iter()
            .max_by_key(|s| s.timestamp_epoch)
            .map(|s| s.final_support_percent)
    }
}

/// RwLock-guarded store; readers always see the last committed write.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a loaded snapshot; every campaign starts at revision 1.
    pub fn from_snapshot(snap: &StateSnapshot) -> Self {
        let mut inner = Inner::default();
        for c in &snap.campaigns {
            inner
                .campaigns
                .insert(c.candidate_id.clone(), Versioned { value: c.clone(), revision: 1 });
        }
        for p in &snap.polls {
            inner.polls.entry(p.candidate_id.clone()).or_default().push(p.clone());
        }
        for a in &snap.ads {
            inner.ads.insert(a.id.clone(), a.clone());
        }
        for r in &snap.research {
            inner.research.insert(r.id.clone(), r.clone());
        }
        Self { inner: RwLock::new(inner) }
    }

    /// Campaigns, polls, ads and research; collaborator sections are left empty.
    pub fn fill_snapshot(&self, snap: &mut StateSnapshot) -> Result<(), StoreError> {
        let g = self.read()?;
        snap.campaigns = g.campaigns.values().map(|v| v.value.clone()).collect();
        snap.polls = g.polls.values().flatten().cloned().collect();
        snap.ads = g.ads.values().cloned().collect();
        snap.research = g.research.values().cloned().collect();
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }
}

/// CAS + sequence checks for one campaign write, without mutating.
fn check_campaign_write(
    g: &Inner,
    cycle: &CampaignCycle,
    expected_revision: u64,
) -> Result<u64, StoreError> {
    match g.campaigns.get(&cycle.candidate_id) {
        Some(cur) => {
            if cur.revision != expected_revision {
                return Err(StoreError::Conflict(format!(
                    "campaign for {} is at revision {}, write expected {expected_revision}",
                    cycle.candidate_id, cur.revision
                )));
            }
            if cycle.cycle_sequence < cur.value.cycle_sequence {
                return Err(StoreError::Invariant(format!(
                    "cycleSequence for {} cannot go back from {} to {}",
                    cycle.candidate_id, cur.value.cycle_sequence, cycle.cycle_sequence
                )));
            }
            if cycle.active_phase < cur.value.active_phase
                && cycle.cycle_sequence == cur.value.cycle_sequence
            {
                return Err(StoreError::Invariant(format!(
                    "phase for {} cannot move back from {} to {}",
                    cycle.candidate_id, cur.value.active_phase, cycle.active_phase
                )));
            }
            Ok(cur.revision + 1)
        }
        None if expected_revision == 0 => Ok(1),
        None => Err(StoreError::NotFound(format!("campaign for {}", cycle.candidate_id))),
    }
}

impl CampaignStore for InMemoryStore {
    fn campaign(&self, candidate: &CandidateId) -> Result<Option<Versioned<CampaignCycle>>, StoreError> {
        Ok(self.read()?.campaigns.get(candidate).cloned())
    }

    fn campaign_by_id(&self, id: &CampaignId) -> Result<Option<Versioned<CampaignCycle>>, StoreError> {
        Ok(self.read()?.campaigns.values().find(|v| &v.value.campaign_id == id).cloned())
    }

    fn write_campaign(&self, cycle: CampaignCycle, expected_revision: u64) -> Result<u64, StoreError> {
        let mut g = self.write()?;
        let revision = check_campaign_write(&g, &cycle, expected_revision)?;
        g.campaigns.insert(cycle.candidate_id.clone(), Versioned { value: cycle, revision });
        Ok(revision)
    }

    fn recent_polls(&self, candidate: &CandidateId, limit: usize) -> Result<Vec<PollingSample>, StoreError> {
        let g = self.read()?;
        let mut out: Vec<PollingSample> = g
            .polls
            .get(candidate)
            .map(|v| v.iter().rev().cloned().collect())
            .unwrap_or_default();
        // Stable: equal timestamps keep "appended later comes first".
        out.sort_by(|a, b| b.timestamp_epoch.cmp(&a.timestamp_epoch));
        out.truncate(limit);
        Ok(out)
    }

    fn append_poll(&self, sample: PollingSample) -> Result<(), StoreError> {
        if !(0.0..=100.0).contains(&sample.final_support_percent) {
            return Err(StoreError::Invariant(format!(
                "finalSupportPercent {} outside 0..=100",
                sample.final_support_percent
            )));
        }
        self.write()?.polls.entry(sample.candidate_id.clone()).or_default().push(sample);
        Ok(())
    }

    fn ad(&self, id: &AdId) -> Result<Option<NegativeAdRecord>, StoreError> {
        Ok(self.read()?.ads.get(id).cloned())
    }

    fn ads_by_attacker(&self, attacker: &CandidateId) -> Result<Vec<NegativeAdRecord>, StoreError> {
        let g = self.read()?;
        let mut out: Vec<NegativeAdRecord> =
            g.ads.values().filter(|a| &a.attacker_id == attacker).cloned().collect();
        out.sort_by(|a, b| (a.launched_epoch, &a.id).cmp(&(b.launched_epoch, &b.id)));
        Ok(out)
    }

    fn research(&self, id: &ResearchId) -> Result<Option<Research>, StoreError> {
        Ok(self.read()?.research.get(id).cloned())
    }

    fn commit_ad(&self, commit: AdCommit) -> Result<CommittedAd, StoreError> {
        let AdCommit { attacker, expected_revision, ad, shifts, default_support } = commit;
        let mut g = self.write()?;

        // Check everything first; nothing is written unless all checks pass.
        let revision = check_campaign_write(&g, &attacker, expected_revision)?;
        if g.ads.contains_key(&ad.id) {
            return Err(StoreError::Conflict(format!("ad {} already exists", ad.id)));
        }
        let mut answered = match &ad.in_response_to {
            Some(prev) => {
                let rec = g
                    .ads
                    .get(prev)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(format!("ad {prev}")))?;
                Some(rec)
            }
            None => None,
        };
        if let Some(rec) = answered.as_mut() {
            rec.mark_countered(ad.effectiveness)
                .map_err(|e| StoreError::Conflict(format!("ad {}: {e}", rec.id)))?;
        }
        if let Some(bad) = shifts.iter().find(|s| !s.shift.is_finite()) {
            return Err(StoreError::Invariant(format!("shift for {} is not finite", bad.candidate_id)));
        }

        g.campaigns
            .insert(attacker.candidate_id.clone(), Versioned { value: attacker, revision });
        if let Some(rec) = answered {
            g.ads.insert(rec.id.clone(), rec);
        }
        let now = ad.launched_epoch;
        g.ads.insert(ad.id.clone(), ad);
        let mut samples = Vec::with_capacity(shifts.len());
        for s in shifts {
            let base = g.latest_support(&s.candidate_id);
            let sample = shifted_sample(&s.candidate_id, base, s.shift, now, default_support);
            g.polls.entry(s.candidate_id).or_default().push(sample.clone());
            samples.push(sample);
        }
        Ok(CommittedAd { revision, samples })
    }
}
