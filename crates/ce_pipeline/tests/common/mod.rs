#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use ce_io::{AccountBalance, StateSnapshot};
use ce_pipeline::{
    AdCommit, AdId, CampaignCycle, CampaignId, CampaignPhase, CampaignStore, CandidateId, CommittedAd,
    Engine, EngineParams, FixedClock, InMemoryStore, MemoryBackend, NegativeAdRecord, PollingSample,
    Research, ResearchId, StoreError, Versioned,
};

pub const NOW: i64 = 1_000_000;

pub fn id(s: &str) -> CandidateId {
    s.parse().unwrap()
}

pub fn cycle(candidate: &str, phase: CampaignPhase, ends: i64) -> CampaignCycle {
    CampaignCycle {
        campaign_id: format!("camp-{candidate}").parse().unwrap(),
        candidate_id: id(candidate),
        seed: candidate.to_string(),
        cycle_sequence: 1,
        active_phase: phase,
        phase_ends_epoch: ends,
        reputation_score: 60,
        funds_raised_this_cycle: 5_000.0,
        endorsements_acquired: 2,
        scandals_active: 0,
        last_resolved_sequence: None,
    }
}

fn poll(candidate: &str, ts: i64, pct: f64) -> PollingSample {
    PollingSample { candidate_id: id(candidate), timestamp_epoch: ts, final_support_percent: pct }
}

/// alpha: rep 80, funds 20k, 8 endorsements, polling 62 → probability 72.5.
/// bravo: ACTIVE, polling 55.
pub fn snapshot(alpha_phase: CampaignPhase) -> StateSnapshot {
    let mut alpha = cycle("alpha", alpha_phase, NOW - 1_000);
    alpha.reputation_score = 80;
    alpha.funds_raised_this_cycle = 20_000.0;
    alpha.endorsements_acquired = 8;
    alpha.scandals_active = 1;

    StateSnapshot {
        campaigns: vec![alpha, cycle("bravo", CampaignPhase::Active, NOW + 86_400)],
        polls: vec![
            poll("alpha", NOW - 7_200, 62.0),
            poll("alpha", NOW - 3_600, 62.0),
            poll("bravo", NOW - 3_600, 55.0),
        ],
        ads: Vec::new(),
        research: vec![
            Research { id: "R-1".parse().unwrap(), owner_id: id("alpha"), target_id: id("bravo"), credibility: 80 },
            Research { id: "R-2".parse().unwrap(), owner_id: id("bravo"), target_id: id("alpha"), credibility: 30 },
        ],
        accounts: vec![
            AccountBalance { candidate_id: id("alpha"), funds: 150_000.0, influence_points: 0 },
            AccountBalance { candidate_id: id("bravo"), funds: 60_000.0, influence_points: 0 },
        ],
        debates: Vec::new(),
        history: Vec::new(),
    }
}

pub struct Fixture {
    pub backend: MemoryBackend,
    pub clock: Arc<FixedClock>,
    pub engine: Engine,
}

pub fn fixture(snap: &StateSnapshot) -> Fixture {
    let backend = MemoryBackend::from_snapshot(snap);
    let clock = Arc::new(FixedClock::new(NOW));
    let engine = backend.engine(EngineParams::default(), clock.clone());
    Fixture { backend, clock, engine }
}

/// Parks the first `parties` poll or ad-history reads on a barrier, after the
/// read, so every gated request has read its inputs before any of them commits.
pub struct GatedStore {
    inner: Arc<InMemoryStore>,
    gate: Barrier,
    parked: AtomicUsize,
    parties: usize,
}

impl GatedStore {
    pub fn new(inner: Arc<InMemoryStore>, parties: usize) -> Self {
        Self { inner, gate: Barrier::new(parties), parked: AtomicUsize::new(0), parties }
    }

    fn park(&self) {
        if self.parked.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.gate.wait();
        }
    }
}

impl CampaignStore for GatedStore {
    fn campaign(&self, candidate: &CandidateId) -> Result<Option<Versioned<CampaignCycle>>, StoreError> {
        self.inner.campaign(candidate)
    }

    fn campaign_by_id(&self, id: &CampaignId) -> Result<Option<Versioned<CampaignCycle>>, StoreError> {
        self.inner.campaign_by_id(id)
    }

    fn write_campaign(&self, cycle: CampaignCycle, expected_revision: u64) -> Result<u64, StoreError> {
        self.inner.write_campaign(cycle, expected_revision)
    }

    fn recent_polls(&self, candidate: &CandidateId, limit: usize) -> Result<Vec<PollingSample>, StoreError> {
        let out = self.inner.recent_polls(candidate, limit);
        self.park();
        out
    }

    fn append_poll(&self, sample: PollingSample) -> Result<(), StoreError> {
        self.inner.append_poll(sample)
    }

    fn ad(&self, id: &AdId) -> Result<Option<NegativeAdRecord>, StoreError> {
        self.inner.ad(id)
    }

    fn ads_by_attacker(&self, attacker: &CandidateId) -> Result<Vec<NegativeAdRecord>, StoreError> {
        let out = self.inner.ads_by_attacker(attacker);
        self.park();
        out
    }

    fn research(&self, id: &ResearchId) -> Result<Option<Research>, StoreError> {
        self.inner.research(id)
    }

    fn commit_ad(&self, commit: AdCommit) -> Result<CommittedAd, StoreError> {
        self.inner.commit_ad(commit)
    }
}

/// Engine over `backend` whose store reads are gated for `parties` threads.
pub fn gated_engine(backend: &MemoryBackend, parties: usize) -> Engine {
    let store = Arc::new(GatedStore::new(backend.store.clone(), parties));
    Engine::new(EngineParams::default(), store, backend.ledger.clone())
        .with_clock(Arc::new(FixedClock::new(NOW)))
        .with_debates(backend.debates.clone())
        .with_history(backend.history.clone())
}
