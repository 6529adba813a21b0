//! crates/ce_pipeline/src/collaborators.rs
//! Injected collaborators: clock, account ledger, debate aggregator, win-rate history.
//!
//! Each seam has a small in-memory implementation used by the CLI and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use ce_core::ids::CandidateId;
use ce_io::{AccountBalance, DebateScore, HistoryRecord};
use thiserror::Error;

/* ---------------------------------- Clock ---------------------------------- */

pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
        }
    }
}

/// Settable clock for tests and `--now`.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self(AtomicI64::new(now))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/* --------------------------------- Ledger --------------------------------- */

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("insufficient funds for {candidate}: balance {balance}, requested {requested}")]
    InsufficientFunds { candidate: CandidateId, balance: f64, requested: f64 },
    #[error("invalid amount {0}")]
    InvalidAmount(f64),
    #[error("ledger backend: {0}")]
    Backend(String),
}

/// External account ledger: campaign budget and reward payouts.
pub trait AccountLedger: Send + Sync {
    /// Spendable funds; unknown accounts have none.
    fn balance(&self, candidate: &CandidateId) -> Result<f64, LedgerError>;
    fn debit(&self, candidate: &CandidateId, amount: f64) -> Result<(), LedgerError>;
    fn credit(&self, candidate: &CandidateId, funds: f64, influence_points: u64) -> Result<(), LedgerError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Account {
    funds: f64,
    influence_points: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: Mutex<BTreeMap<CandidateId, Account>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_balances(balances: &[AccountBalance]) -> Self {
        let accounts = balances
            .iter()
            .map(|b| {
                let acct = Account { funds: b.funds, influence_points: b.influence_points };
                (b.candidate_id.clone(), acct)
            })
            .collect();
        Self { accounts: Mutex::new(accounts) }
    }

    pub fn balances(&self) -> Result<Vec<AccountBalance>, LedgerError> {
        let g = self.lock()?;
        Ok(g.iter()
            .map(|(id, a)| AccountBalance {
                candidate_id: id.clone(),
                funds: a.funds,
                influence_points: a.influence_points,
            })
            .collect())
    }

    pub fn influence_points(&self, candidate: &CandidateId) -> Result<u64, LedgerError> {
        Ok(self.lock()?.get(candidate).map_or(0, |a| a.influence_points))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<CandidateId, Account>>, LedgerError> {
        self.accounts.lock().map_err(|_| LedgerError::Backend("ledger lock poisoned".into()))
    }
}

impl AccountLedger for InMemoryLedger {
    fn balance(&self, candidate: &CandidateId) -> Result<f64, LedgerError> {
        Ok(self.lock()?.get(candidate).map_or(0.0, |a| a.funds))
    }

    fn debit(&self, candidate: &CandidateId, amount: f64) -> Result<(), LedgerError> {
        if !(amount >= 0.0) || !amount.is_finite() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let mut g = self.lock()?;
        let acct = g.entry(candidate.clone()).or_default();
        if acct.funds < amount {
            return Err(LedgerError::InsufficientFunds {
                candidate: candidate.clone(),
                balance: acct.funds,
                requested: amount,
            });
        }
        acct.funds -= amount;
        Ok(())
    }

    fn credit(&self, candidate: &CandidateId, funds: f64, influence_points: u64) -> Result<(), LedgerError> {
        if !(funds >= 0.0) || !funds.is_finite() {
            return Err(LedgerError::InvalidAmount(funds));
        }
        let mut g = self.lock()?;
        let acct = g.entry(candidate.clone()).or_default();
        acct.funds += funds;
        acct.influence_points = acct.influence_points.saturating_add(influence_points);
        Ok(())
    }
}

/* ------------------------- Debates & election history ------------------------- */

/// Debate-performance aggregator. `None` → the model's default debate score.
pub trait DebatePerformance: Send + Sync {
    fn debate_score(&self, candidate: &CandidateId) -> Option<f64>;
}

/// Historical win rate (percent). `None` → the configured default.
pub trait ElectionHistory: Send + Sync {
    fn win_rate(&self, candidate: &CandidateId) -> Option<f64>;
}

/// Fixed per-candidate values; serves both seams.
#[derive(Debug, Default, Clone)]
pub struct StaticScores(BTreeMap<CandidateId, f64>);

impl StaticScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, candidate: CandidateId, value: f64) -> Self {
        self.0.insert(candidate, value);
        self
    }

    pub fn from_debates(rows: &[DebateScore]) -> Self {
        Self(rows.iter().map(|r| (r.candidate_id.clone(), r.score)).collect())
    }

    pub fn from_history(rows: &[HistoryRecord]) -> Self {
        Self(rows.iter().map(|r| (r.candidate_id.clone(), r.win_rate)).collect())
    }

    pub fn debate_rows(&self) -> Vec<DebateScore> {
        self.0
            .iter()
            .map(|(c, s)| DebateScore { candidate_id: c.clone(), score: *s })
            .collect()
    }

    pub fn history_rows(&self) -> Vec<HistoryRecord> {
        self.0
            .iter()
            .map(|(c, w)| HistoryRecord { candidate_id: c.clone(), win_rate: *w })
            .collect()
    }
}

impl DebatePerformance for StaticScores {
    fn debate_score(&self, candidate: &CandidateId) -> Option<f64> {
        self.0.get(candidate).copied()
    }
}

impl ElectionHistory for StaticScores {
    fn win_rate(&self, candidate: &CandidateId) -> Option<f64> {
        self.0.get(candidate).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha() -> CandidateId {
        "alpha".parse().unwrap()
    }

    #[test]
    fn ledger_debits_and_credits() {
        let l = InMemoryLedger::from_balances(&[AccountBalance {
            candidate_id: alpha(),
            funds: 100_000.0,
            influence_points: 0,
        }]);
        l.debit(&alpha(), 40_000.0).unwrap();
        assert_eq!(l.balance(&alpha()).unwrap(), 60_000.0);
        assert!(matches!(l.debit(&alpha(), 60_000.5), Err(LedgerError::InsufficientFunds { .. })));
        l.credit(&alpha(), 10_000.0, 500).unwrap();
        assert_eq!(l.balance(&alpha()).unwrap(), 70_000.0);
        assert_eq!(l.influence_points(&alpha()).unwrap(), 500);
        assert!(matches!(l.debit(&alpha(), -1.0), Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn unknown_account_has_no_budget() {
        let l = InMemoryLedger::new();
        assert_eq!(l.balance(&alpha()).unwrap(), 0.0);
    }

    #[test]
    fn static_scores_answer_both_seams() {
        let s = StaticScores::new().with(alpha(), 72.0);
        assert_eq!(s.debate_score(&alpha()), Some(72.0));
        assert_eq!(s.win_rate(&alpha()), Some(72.0));
        assert_eq!(s.debate_score(&"bravo".parse().unwrap()), None);
        assert_eq!(s.debate_rows().len(), 1);
    }

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let c = FixedClock::new(1_000);
        assert_eq!(c.now(), 1_000);
        c.advance(60);
        assert_eq!(c.now(), 1_060);
        c.set(5);
        assert_eq!(c.now(), 5);
    }
}
