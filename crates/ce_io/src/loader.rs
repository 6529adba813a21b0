//! Loader: read local JSON (state snapshot, parameter file), check invariants,
//! normalize ordering, and hand typed values to the pipeline. No network I/O.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use ce_core::variables::EngineParams;

use crate::canonical_json::write_canonical_file;
use crate::snapshot::StateSnapshot;
use crate::IoError;

/// Upper bound on any JSON input we read.
pub const MAX_JSON_BYTES: u64 = 64 * 1024 * 1024;

// ----------------------------- Raw reads -----------------------------

pub fn read_json_value_with_limits(path: &Path) -> Result<Value, IoError> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let len = f.metadata()?.len();
    if len > MAX_JSON_BYTES {
        return Err(IoError::Limit(format!(
            "{} is {len} bytes (max {MAX_JSON_BYTES})",
            path.display()
        )));
    }
    let mut buf = Vec::with_capacity(len as usize);
    f.take(MAX_JSON_BYTES + 1).read_to_end(&mut buf)?;
    Ok(serde_json::from_slice(&buf)?)
}

// ----------------------------- Params -----------------------------

/// Parameter file → validated `EngineParams`. `None` yields the defaults.
pub fn load_params(path: Option<&Path>) -> Result<EngineParams, IoError> {
    let params = match path {
        None => EngineParams::default(),
        Some(p) => {
            let v = read_json_value_with_limits(p)?;
            serde_json::from_value(v).map_err(|e| IoError::Json {
                pointer: "/".into(),
                msg: e.to_string(),
            })?
        }
    };
    params.validate()?;
    Ok(params)
}

// ----------------------------- State -----------------------------

/// Read, check and normalize a state snapshot.
pub fn load_snapshot(path: &Path) -> Result<StateSnapshot, IoError> {
    let v = read_json_value_with_limits(path)?;
    let mut snap: StateSnapshot = serde_json::from_value(v).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: e.to_string(),
    })?;
    check_snapshot(&snap)?;
    snap.normalize();
    Ok(snap)
}

/// Normalize and write atomically as canonical JSON.
pub fn save_snapshot(path: &Path, snap: &StateSnapshot) -> Result<(), IoError> {
    check_snapshot(snap)?;
    let mut out = snap.clone();
    out.normalize();
    write_canonical_file(path, &out)
}

/// Record-level invariants a stored document must satisfy.
pub fn check_snapshot(snap: &StateSnapshot) -> Result<(), IoError> {
    let mut candidates = BTreeSet::new();
    let mut campaign_ids = BTreeSet::new();
    for c in &snap.campaigns {
        if !candidates.insert(&c.candidate_id) {
            return Err(IoError::Invalid(format!(
                "candidate {} has more than one current campaign cycle",
                c.candidate_id
            )));
        }
        if !campaign_ids.insert(&c.campaign_id) {
            return Err(IoError::Invalid(format!("duplicate campaign id {}", c.campaign_id)));
        }
        if c.reputation_score > 100 {
            return Err(IoError::Invalid(format!(
                "campaign {}: reputationScore {} outside 0..=100",
                c.campaign_id, c.reputation_score
            )));
        }
        if !(c.funds_raised_this_cycle >= 0.0) || !c.funds_raised_this_cycle.is_finite() {
            return Err(IoError::Invalid(format!(
                "campaign {}: fundsRaisedThisCycle must be a non-negative number",
                c.campaign_id
            )));
        }
        if c.last_resolved_sequence.is_some_and(|s| s > c.cycle_sequence) {
            return Err(IoError::Invalid(format!(
                "campaign {}: lastResolvedSequence ahead of cycleSequence",
                c.campaign_id
            )));
        }
    }

    for s in &snap.polls {
        if !(0.0..=100.0).contains(&s.final_support_percent) {
            return Err(IoError::Invalid(format!(
                "polling sample for {} at {}: finalSupportPercent {} outside 0..=100",
                s.candidate_id, s.timestamp_epoch, s.final_support_percent
            )));
        }
    }

    let mut ad_ids = BTreeSet::new();
    for a in &snap.ads {
        if !ad_ids.insert(&a.id) {
            return Err(IoError::Invalid(format!("duplicate ad id {}", a.id)));
        }
        if !(a.amount_spent > 0.0) || !a.amount_spent.is_finite() {
            return Err(IoError::Invalid(format!("ad {}: amountSpent must be positive", a.id)));
        }
        if a.countered != a.counter_effectiveness.is_some() {
            return Err(IoError::Invalid(format!(
                "ad {}: countered and counterEffectiveness disagree",
                a.id
            )));
        }
    }
    for a in &snap.ads {
        if let Some(prev) = &a.in_response_to {
            if !ad_ids.contains(prev) {
                return Err(IoError::Invalid(format!("ad {}: answers unknown ad {prev}", a.id)));
            }
        }
    }

    let mut research_ids = BTreeSet::new();
    for r in &snap.research {
        if !research_ids.insert(&r.id) {
            return Err(IoError::Invalid(format!("duplicate research id {}", r.id)));
        }
        if r.credibility > 100 {
            return Err(IoError::Invalid(format!(
                "research {}: credibility {} outside 0..=100",
                r.id, r.credibility
            )));
        }
    }

    let mut accounts = BTreeSet::new();
    for a in &snap.accounts {
        if !accounts.insert(&a.candidate_id) {
            return Err(IoError::Invalid(format!("duplicate account for {}", a.candidate_id)));
        }
        if !a.funds.is_finite() {
            return Err(IoError::Invalid(format!("account {}: funds must be finite", a.candidate_id)));
        }
    }
    Ok(())
}
