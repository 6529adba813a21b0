// crates/ce_cli/src/args.rs
//
// Argument surface for the `ce` binary. Every command reads one state snapshot;
// mutating commands write it back in place.
//
// - Ids are taken as plain strings and checked against the token charset here
// - --now pins the clock (epoch seconds); otherwise the system clock is used
// - launch-ad --seed switches backfire draws to the seeded stream (decimal u64 or 0x-hex)

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use ce_core::ids::{AdId, CampaignId, CandidateId, ResearchId};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "ce",
    disable_help_subcommand = true,
    about = "Offline, deterministic campaign & election engine"
)]
pub struct Args {
    /// State snapshot JSON (read, and rewritten by mutating commands).
    #[arg(long)]
    pub state: PathBuf,

    /// Engine parameter JSON; defaults apply when omitted.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Fixed "now" in epoch seconds.
    #[arg(long, allow_negative_numbers = true)]
    pub now: Option<i64>,

    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Win probability and factor breakdown.
    Probability(CandidateArg),
    /// Time left in the election phase.
    Countdown(CandidateArg),
    /// Probability, countdown, win-rate history and scandals in one view.
    Overview(CandidateArg),
    /// Resolve the election; with --apply, commit it to the state file.
    Resolve {
        #[command(flatten)]
        who: CandidateArg,
        /// Campaign to apply to (default: the candidate's current campaign).
        #[arg(long)]
        campaign: Option<String>,
        #[arg(long)]
        apply: bool,
        /// Also write `outcome.json` into this directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check a negative ad without launching it.
    ValidateAd(AdArgs),
    /// Launch a negative ad.
    LaunchAd {
        #[command(flatten)]
        ad: AdArgs,
        /// Draw the backfire roll from a seeded stream instead of the ad hash.
        #[arg(long, value_parser = parse_seed)]
        seed: Option<u64>,
    },
    /// Move to the next phase once the current one has ended.
    Advance(CandidateArg),
    /// Start the next cycle after a resolved election.
    NextCycle {
        #[command(flatten)]
        who: CandidateArg,
        /// Id for the new campaign (default: keep the current one).
        #[arg(long)]
        campaign: Option<String>,
    },
}

impl Command {
    /// Commands that rewrite the state file on success.
    pub fn mutates(&self) -> bool {
        match self {
            Command::Resolve { apply, .. } => *apply,
            Command::LaunchAd { .. } | Command::Advance(_) | Command::NextCycle { .. } => true,
            Command::Probability(_) | Command::Countdown(_) | Command::Overview(_) | Command::ValidateAd(_) => false,
        }
    }
}

#[derive(Debug, ClapArgs, Clone)]
pub struct CandidateArg {
    #[arg(long)]
    pub candidate: String,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct AdArgs {
    #[arg(long)]
    pub attacker: String,
    #[arg(long)]
    pub target: String,
    /// Opposition research backing the ad.
    #[arg(long)]
    pub research: Option<String>,
    #[arg(long)]
    pub amount: f64,
    /// Ad being answered (makes this a counter-attack).
    #[arg(long)]
    pub in_response_to: Option<String>,
}

/// Errors from turning raw flags into typed ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    BadId { flag: &'static str, value: String },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::BadId { flag, value } => write!(f, "invalid id for {flag}: {value:?}"),
        }
    }
}
impl std::error::Error for CliError {}

fn token<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::BadId { flag, value: value.to_string() })
}

pub fn candidate_id(flag: &'static str, value: &str) -> Result<CandidateId, CliError> {
    token(flag, value)
}

pub fn campaign_id(value: Option<&str>) -> Result<Option<CampaignId>, CliError> {
    value.map(|v| token("--campaign", v)).transpose()
}

pub fn research_id(value: Option<&str>) -> Result<Option<ResearchId>, CliError> {
    value.map(|v| token("--research", v)).transpose()
}

pub fn ad_id(value: Option<&str>) -> Result<Option<AdId>, CliError> {
    value.map(|v| token("--in-response-to", v)).transpose()
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

// ------------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn clap_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn seed_parsing() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0x2A").unwrap(), 42);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0x1_0000_0000_0000_0000").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn launch_ad_flags_parse() {
        let a = Args::try_parse_from([
            "ce", "--state", "s.json", "--now", "100", "launch-ad", "--attacker", "alpha",
            "--target", "bravo", "--amount", "30000", "--in-response-to", "AD-1", "--seed", "0x10",
        ])
        .unwrap();
        assert!(a.command.mutates());
        match a.command {
            Command::LaunchAd { ad, seed } => {
                assert_eq!(ad.attacker, "alpha");
                assert_eq!(ad.in_response_to.as_deref(), Some("AD-1"));
                assert_eq!(seed, Some(16));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn resolve_mutates_only_with_apply() {
        let a = Args::try_parse_from(["ce", "--state", "s.json", "resolve", "--candidate", "alpha"]).unwrap();
        assert!(!a.command.mutates());
        let a = Args::try_parse_from(["ce", "--state", "s.json", "resolve", "--candidate", "alpha", "--apply"])
            .unwrap();
        assert!(a.command.mutates());
    }

    #[test]
    fn ids_are_checked() {
        assert!(candidate_id("--candidate", "alpha").is_ok());
        assert_eq!(
            candidate_id("--candidate", "has space"),
            Err(CliError::BadId { flag: "--candidate", value: "has space".into() })
        );
        assert_eq!(campaign_id(None), Ok(None));
    }
}
