//! In-memory backend built from (and flushed back to) a `StateSnapshot`.

use std::sync::Arc;

use ce_core::variables::EngineParams;
use ce_io::StateSnapshot;

use crate::collaborators::{Clock, InMemoryLedger, StaticScores};
use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::store::InMemoryStore;

pub struct MemoryBackend {
    pub store: Arc<InMemoryStore>,
    pub ledger: Arc<InMemoryLedger>,
    pub debates: Arc<StaticScores>,
    pub history: Arc<StaticScores>,
}

impl MemoryBackend {
    pub fn from_snapshot(snap: &StateSnapshot) -> Self {
        Self {
            store: Arc::new(InMemoryStore::from_snapshot(snap)),
            ledger: Arc::new(InMemoryLedger::from_balances(&snap.accounts)),
            debates: Arc::new(StaticScores::from_debates(&snap.debates)),
            history: Arc::new(StaticScores::from_history(&snap.history)),
        }
    }

    /// Engine wired to this backend.
    pub fn engine(&self, params: EngineParams, clock: Arc<dyn Clock>) -> Engine {
        Engine::new(params, self.store.clone(), self.ledger.clone())
            .with_clock(clock)
            .with_debates(self.debates.clone())
            .with_history(self.history.clone())
    }

    /// Current state as a normalized snapshot.
    pub fn snapshot(&self) -> EngineResult<StateSnapshot> {
        let mut snap = StateSnapshot::default();
        self.store.fill_snapshot(&mut snap)?;
        snap.accounts = self.ledger.balances().map_err(EngineError::from)?;
        snap.debates = self.debates.debate_rows();
        snap.history = self.history.history_rows();
        snap.normalize();
        Ok(snap)
    }
}
