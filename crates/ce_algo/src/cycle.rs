//! crates/ce_algo/src/cycle.rs
//! Campaign-cycle state machine: resolution gate, countdown, forward-only
//! phase advance, and the transition into the next cycle.
//!
//! Functions here return the next cycle value; committing it is the
//! consequence applier's job.

use core::fmt;

use ce_core::entities::{CampaignCycle, CampaignPhase, Countdown};
use ce_core::ids::CampaignId;
use ce_core::variables::PhaseDurations;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Resolution requested outside `ELECTION`.
    NotInElection { phase: CampaignPhase },
    /// The current phase may not end yet.
    PhaseTimerRunning { remaining_secs: i64 },
    /// `ELECTION` has no successor; start a new cycle instead.
    TerminalPhase,
    /// The cycle must be resolved before a new one starts.
    NotResolved,
    /// `cycleSequence` cannot advance further.
    SequenceExhausted,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::NotInElection { phase } => {
                write!(f, "election cannot be resolved during {phase}")
            }
            CycleError::PhaseTimerRunning { remaining_secs } => {
                write!(f, "phase timer still running ({remaining_secs}s remaining)")
            }
            CycleError::TerminalPhase => write!(f, "ELECTION is the last phase of a cycle"),
            CycleError::NotResolved => write!(f, "current cycle has not been resolved"),
            CycleError::SequenceExhausted => write!(f, "cycle sequence exhausted"),
        }
    }
}

impl std::error::Error for CycleError {}

/// `activePhase == ELECTION && now >= phaseEndsEpoch`.
#[inline]
pub fn can_resolve_election(cycle: &CampaignCycle, now: i64) -> bool {
    check_resolvable(cycle, now).is_ok()
}

/// Same gate as `can_resolve_election`, with the reason it is closed.
pub fn check_resolvable(cycle: &CampaignCycle, now: i64) -> Result<(), CycleError> {
    if cycle.active_phase != CampaignPhase::Election {
        return Err(CycleError::NotInElection { phase: cycle.active_phase });
    }
    timer_expired(cycle, now)
}

fn timer_expired(cycle: &CampaignCycle, now: i64) -> Result<(), CycleError> {
    if now < cycle.phase_ends_epoch {
        return Err(CycleError::PhaseTimerRunning {
            remaining_secs: cycle.phase_ends_epoch.saturating_sub(now),
        });
    }
    Ok(())
}

/// Whole hours and leftover whole minutes until `phaseEndsEpoch` (zero once passed).
pub fn election_countdown(cycle: &CampaignCycle, now: i64) -> Countdown {
    let remaining = cycle.phase_ends_epoch.saturating_sub(now).max(0);
    Countdown {
        hours_remaining: remaining / 3_600,
        minutes_remaining: (remaining % 3_600) / 60,
        can_resolve: can_resolve_election(cycle, now),
    }
}

/// Move to the next phase once the current one has run out.
pub fn advance_phase(
    cycle: &CampaignCycle,
    now: i64,
    durations: &PhaseDurations,
) -> Result<CampaignCycle, CycleError> {
    let next = cycle.active_phase.next().ok_or(CycleError::TerminalPhase)?;
    timer_expired(cycle, now)?;

    let mut out = cycle.clone();
    out.active_phase = next;
    out.phase_ends_epoch = now.saturating_add(durations.seconds(next));
    Ok(out)
}

/// Open the next cycle after a resolved election.
///
/// Sequence +1, funds reset, back to `ANNOUNCEMENT`, resolution marker cleared.
/// Reputation, endorsements and scandals carry over.
pub fn start_next_cycle(
    cycle: &CampaignCycle,
    now: i64,
    durations: &PhaseDurations,
    campaign_id: Option<CampaignId>,
) -> Result<CampaignCycle, CycleError> {
    if !cycle.is_resolved() {
        return Err(CycleError::NotResolved);
    }
    let seq = cycle.cycle_sequence.checked_add(1).ok_or(CycleError::SequenceExhausted)?;

    let mut out = cycle.clone();
    if let Some(id) = campaign_id {
        out.campaign_id = id;
    }
    out.cycle_sequence = seq;
    out.active_phase = CampaignPhase::Announcement;
    out.phase_ends_epoch = now.saturating_add(durations.seconds(CampaignPhase::Announcement));
    out.funds_raised_this_cycle = 0.0;
    out.last_resolved_sequence = None;
    Ok(out)
}
