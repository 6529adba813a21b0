//! crates/ce_pipeline/src/engine.rs
//! The `Engine`: parameters plus the injected seams every operation goes through.
//!
//! Operations are split by concern across `evaluate`, `resolve`, `apply` and
//! `advertise`; each adds an `impl Engine` block.

use std::sync::{Arc, Mutex};

use ce_algo::SeededBackfire;
use ce_core::entities::CampaignCycle;
use ce_core::ids::CandidateId;
use ce_core::variables::{BackfireMode, EngineParams};

use crate::collaborators::{AccountLedger, Clock, DebatePerformance, ElectionHistory, StaticScores, SystemClock};
use crate::errors::{EngineError, EngineResult};
use crate::store::{CampaignStore, Versioned};

pub struct Engine {
    pub(crate) params: EngineParams,
    pub(crate) store: Arc<dyn CampaignStore>,
    pub(crate) ledger: Arc<dyn AccountLedger>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) debates: Arc<dyn DebatePerformance>,
    pub(crate) history: Arc<dyn ElectionHistory>,
    /// Present only in `BackfireMode::Seeded`; one stream shared by all launches.
    pub(crate) backfire_stream: Option<Mutex<SeededBackfire>>,
}

impl Engine {
    /// System clock, no debate scores, no history; defaults apply until replaced.
    pub fn new(params: EngineParams, store: Arc<dyn CampaignStore>, ledger: Arc<dyn AccountLedger>) -> Self {
        let backfire_stream = match params.ads.backfire_mode {
            BackfireMode::Seeded => Some(Mutex::new(SeededBackfire::from_seed_u64(params.ads.backfire_seed))),
            BackfireMode::Hashed => None,
        };
        Self {
            params,
            store,
            ledger,
            clock: Arc::new(SystemClock),
            debates: Arc::new(StaticScores::new()),
            history: Arc::new(StaticScores::new()),
            backfire_stream,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_debates(mut self, debates: Arc<dyn DebatePerformance>) -> Self {
        self.debates = debates;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn ElectionHistory>) -> Self {
        self.history = history;
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Current cycle of `candidate`, or `NotFound`.
    pub fn current_cycle(&self, candidate: &CandidateId) -> EngineResult<CampaignCycle> {
        Ok(self.load_campaign(candidate)?.value)
    }

    pub(crate) fn load_campaign(&self, candidate: &CandidateId) -> EngineResult<Versioned<CampaignCycle>> {
        self.store
            .campaign(candidate)?
            .ok_or_else(|| EngineError::NotFound(format!("campaign for candidate {candidate}")))
    }
}
