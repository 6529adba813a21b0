//! crates/ce_algo/src/attack/validate.rs
//! Negative-ad validation before any computation.
//!
//! Every check runs; issues are sorted (code, field, message) so the same
//! request always yields the same report.

use ce_core::entities::{CampaignCycle, CampaignPhase, NegativeAdRecord, Research};
use ce_core::ids::CandidateId;
use ce_core::variables::AdParams;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Phases in which ads may launch; closed once `ELECTION` starts.
pub const LEGAL_AD_PHASES: [CampaignPhase; 4] = [
    CampaignPhase::Announcement,
    CampaignPhase::Fundraising,
    CampaignPhase::Active,
    CampaignPhase::Resolution,
];

/// One validation finding; any finding blocks the launch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ValidationIssue {
    pub code: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(code: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self { code, field, message: message.into() }
    }
}

/// `is_valid` = no issues.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_issues(mut issues: Vec<ValidationIssue>) -> Self {
        issues.sort_by(|a, b| {
            (a.code, a.field, a.message.as_str()).cmp(&(b.code, b.field, b.message.as_str()))
        });
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }

    pub fn merge(self, more: Vec<ValidationIssue>) -> Self {
        let mut all = self.issues;
        all.extend(more);
        Self::from_issues(all)
    }

    /// Issue messages, in report order.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }
}

/// Spend, budget, phase and research-credibility checks.
pub fn validate_negative_ad(
    research: Option<&Research>,
    amount_spent: f64,
    budget: f64,
    phase: CampaignPhase,
    params: &AdParams,
) -> ValidationReport {
    let mut issues = Vec::new();

    if !amount_spent.is_finite() {
        issues.push(ValidationIssue::error(
            "Ad.AmountNotFinite",
            "amountSpent",
            "amount spent must be a finite number",
        ));
    } else if amount_spent < params.min_spend {
        issues.push(ValidationIssue::error(
            "Ad.AmountBelowMinimum",
            "amountSpent",
            format!("amount spent {amount_spent} is below the minimum of {}", params.min_spend),
        ));
    } else if amount_spent > params.max_spend {
        issues.push(ValidationIssue::error(
            "Ad.AmountAboveMaximum",
            "amountSpent",
            format!("amount spent {amount_spent} exceeds the maximum of {}", params.max_spend),
        ));
    }

    if amount_spent.is_finite() && amount_spent > budget {
        issues.push(ValidationIssue::error(
            "Ad.InsufficientBudget",
            "amountSpent",
            format!("amount spent {amount_spent} exceeds available budget {budget}"),
        ));
    }

    if !LEGAL_AD_PHASES.contains(&phase) {
        issues.push(ValidationIssue::error(
            "Ad.PhaseClosed",
            "campaignPhase",
            format!("negative ads cannot launch during {phase}"),
        ));
    }

    if let Some(r) = research {
        if r.credibility > 100 {
            issues.push(ValidationIssue::error(
                "Ad.ResearchCredibility",
                "researchId",
                format!("research {} credibility {} is outside 0..=100", r.id, r.credibility),
            ));
        }
    }

    ValidationReport::from_issues(issues)
}

/// Full launch request, as resolved from stored records.
#[derive(Clone, Copy, Debug)]
pub struct AdRequest<'a> {
    pub attacker: &'a CampaignCycle,
    pub target_id: &'a CandidateId,
    pub research: Option<&'a Research>,
    pub amount_spent: f64,
    pub budget: f64,
    /// The ad this one answers, when it is a counter-attack.
    pub answering: Option<&'a NegativeAdRecord>,
    pub now: i64,
}

/// `validate_negative_ad` plus relationship checks (target, research ownership, counter link).
pub fn validate_ad_request(req: &AdRequest<'_>, params: &AdParams) -> ValidationReport {
    let base = validate_negative_ad(
        req.research,
        req.amount_spent,
        req.budget,
        req.attacker.active_phase,
        params,
    );

    let attacker_id = &req.attacker.candidate_id;
    let mut issues = Vec::new();

    if attacker_id == req.target_id {
        issues.push(ValidationIssue::error(
            "Ad.SelfTarget",
            "targetId",
            "a candidate cannot attack themselves",
        ));
    }

    if let Some(r) = req.research {
        if &r.owner_id != attacker_id {
            issues.push(ValidationIssue::error(
                "Ad.ResearchNotOwned",
                "researchId",
                format!("research {} does not belong to {attacker_id}", r.id),
            ));
        }
        if &r.target_id != req.target_id {
            issues.push(ValidationIssue::error(
                "Ad.ResearchTargetMismatch",
                "researchId",
                format!("research {} is about {}, not {}", r.id, r.target_id, req.target_id),
            ));
        }
    }

    if let Some(prev) = req.answering {
        if &prev.target_id != attacker_id || &prev.attacker_id != req.target_id {
            issues.push(ValidationIssue::error(
                "Ad.CounterMismatch",
                "inResponseTo",
                format!("ad {} was not launched by {} against {attacker_id}", prev.id, req.target_id),
            ));
        }
        if prev.countered {
            issues.push(ValidationIssue::error(
                "Ad.AlreadyCountered",
                "inResponseTo",
                format!("ad {} has already been countered", prev.id),
            ));
        }
    }

    base.merge(issues)
}
