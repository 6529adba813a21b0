//! crates/ce_pipeline/src/advertise.rs
//! Negative-ad requests: resolve stored references, validate, run the
//! sub-model, debit the spend, commit the consequences.

use ce_algo::{
    assess_ad, history_from_launches, next_ad_id, resolve_ad, validate_ad_request, AdAssessment,
    AdOutcome, AdRequest, HashedBackfire, ValidationIssue, ValidationReport,
};
use ce_core::entities::{CampaignCycle, NegativeAdRecord, PollingSample, Research};
use ce_core::ids::{AdId, CandidateId, ResearchId};
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::store::{PollShift, Versioned};

/// A launch as requested by the attacker.
#[derive(Debug, Clone, PartialEq)]
pub struct AdLaunch {
    pub attacker_id: CandidateId,
    pub target_id: CandidateId,
    pub research_id: Option<ResearchId>,
    pub amount_spent: f64,
    /// Set for a counter-attack.
    pub in_response_to: Option<AdId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReport {
    pub record: NegativeAdRecord,
    pub assessment: AdAssessment,
    pub outcome: AdOutcome,
    /// Appended samples: attacker first, then target.
    pub samples: Vec<PollingSample>,
    pub attacker_reputation: u8,
}

/// Stored records a request refers to, plus issues for references that do not resolve.
struct Resolved {
    attacker: Versioned<CampaignCycle>,
    research: Option<Research>,
    answering: Option<NegativeAdRecord>,
    budget: f64,
    missing: Vec<ValidationIssue>,
}

impl Engine {
    fn resolve_refs(&self, req: &AdLaunch) -> EngineResult<Resolved> {
        let attacker = self.load_campaign(&req.attacker_id)?;
        if self.store.campaign(&req.target_id)?.is_none() {
            return Err(EngineError::NotFound(format!("campaign for target {}", req.target_id)));
        }

        let mut missing = Vec::new();
        let research = match &req.research_id {
            Some(id) => {
                let r = self.store.research(id)?;
                if r.is_none() {
                    missing.push(ValidationIssue::error(
                        "Ad.ResearchUnknown",
                        "researchId",
                        format!("research {id} does not exist"),
                    ));
                }
                r
            }
            None => None,
        };
        let answering = match &req.in_response_to {
            Some(id) => {
                let a = self.store.ad(id)?;
                if a.is_none() {
                    missing.push(ValidationIssue::error(
                        "Ad.CounterUnknown",
                        "inResponseTo",
                        format!("ad {id} does not exist"),
                    ));
                }
                a
            }
            None => None,
        };
        let budget = self.ledger.balance(&req.attacker_id)?;
        Ok(Resolved { attacker, research, answering, budget, missing })
    }

    fn report_for(&self, req: &AdLaunch, r: &Resolved, now: i64) -> ValidationReport {
        let ad_req = AdRequest {
            attacker: &r.attacker.value,
            target_id: &req.target_id,
            research: r.research.as_ref(),
            amount_spent: req.amount_spent,
            budget: r.budget,
            answering: r.answering.as_ref(),
            now,
        };
        validate_ad_request(&ad_req, &self.params.ads).merge(r.missing.clone())
    }

    /// Validation only; nothing is written. `is_valid == false` is not an error here.
    pub fn validate_negative_ad(&self, req: &AdLaunch) -> EngineResult<ValidationReport> {
        let resolved = self.resolve_refs(req)?;
        Ok(self.report_for(req, &resolved, self.now()))
    }

    /// Validate, compute, debit, commit.
    pub fn launch_negative_ad(&self, req: &AdLaunch) -> EngineResult<LaunchReport> {
        let now = self.now();
        let resolved = self.resolve_refs(req)?;
        let report = self.report_for(req, &resolved, now);
        if !report.is_valid {
            return Err(EngineError::validation(report));
        }

        let attacker = &resolved.attacker.value;
        let prior = self.store.ads_by_attacker(&req.attacker_id)?;
        let history = history_from_launches(
            prior.iter().map(|a| a.launched_epoch),
            now,
            self.params.ads.fatigue_window_days,
        );
        let ad_req = AdRequest {
            attacker,
            target_id: &req.target_id,
            research: resolved.research.as_ref(),
            amount_spent: req.amount_spent,
            budget: resolved.budget,
            answering: resolved.answering.as_ref(),
            now,
        };
        let assessment = assess_ad(&ad_req, history, &self.params.ads);

        let id = next_ad_id(&attacker.seed, prior.len() as u64 + 1)?;
        let outcome = self.roll_backfire(&attacker.seed, &id, &assessment)?;

        // Bases are read inside the commit so concurrent launches stack.
        let shifts = vec![
            PollShift { candidate_id: req.attacker_id.clone(), shift: outcome.impact.attacker_polling_shift },
            PollShift { candidate_id: req.target_id.clone(), shift: outcome.impact.target_polling_shift },
        ];

        let record = NegativeAdRecord {
            id,
            attacker_id: req.attacker_id.clone(),
            target_id: req.target_id.clone(),
            research_id: req.research_id.clone(),
            amount_spent: req.amount_spent,
            campaign_phase: attacker.active_phase,
            launched_epoch: now,
            in_response_to: req.in_response_to.clone(),
            effectiveness: assessment.effectiveness,
            backfire_occurred: outcome.backfire_occurred,
            ethics_penalty_applied: assessment.ethics_penalty,
            voter_fatigue_impact: assessment.voter_fatigue,
            countered: false,
            counter_effectiveness: None,
        };

        self.ledger.debit(&req.attacker_id, req.amount_spent)?;
        let committed = self.commit_ad_consequences(
            resolved.attacker.clone(),
            outcome.reputation_cost,
            record.clone(),
            shifts,
        );
        let (cycle, samples) = match committed {
            Ok(c) => c,
            Err(e) => {
                // Give the spend back; the launch did not happen.
                if let Err(refund) = self.ledger.credit(&req.attacker_id, req.amount_spent, 0) {
                    warn!(attacker = %req.attacker_id, error = %refund, "refund after failed launch failed");
                }
                return Err(e);
            }
        };

        info!(
            ad = %record.id,
            attacker = %record.attacker_id,
            target = %record.target_id,
            effectiveness = record.effectiveness,
            backfire = record.backfire_occurred,
            counter = record.in_response_to.is_some(),
            "negative ad launched"
        );
        Ok(LaunchReport {
            record,
            assessment,
            outcome,
            samples,
            attacker_reputation: cycle.reputation_score,
        })
    }

    fn roll_backfire(&self, attacker_seed: &str, id: &AdId, a: &AdAssessment) -> EngineResult<AdOutcome> {
        match &self.backfire_stream {
            Some(stream) => {
                let mut guard = stream
                    .lock()
                    .map_err(|_| EngineError::Store("backfire stream lock poisoned".into()))?;
                Ok(resolve_ad(a, &mut *guard, &self.params.ads))
            }
            None => {
                let mut hashed = HashedBackfire::for_ad(attacker_seed, id);
                Ok(resolve_ad(a, &mut hashed, &self.params.ads))
            }
        }
    }
}
