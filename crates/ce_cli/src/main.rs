// crates/ce_cli/src/main.rs
//
// Load state + params → build the in-memory engine → run one command →
// print canonical JSON on stdout → write the state back if the command mutated it.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const PRECONDITION: u8 = 3;
    pub const IO: u8 = 4;
    pub const NOT_FOUND: u8 = 5;
    pub const CONFLICT: u8 = 6;
}

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ce_core::variables::BackfireMode;
use ce_io::canonical_json::{to_canonical_string, write_canonical_file};
use ce_io::hasher::outcome_id_from_canonical;
use ce_io::loader;
use ce_pipeline::{AdLaunch, Clock, EngineError, FixedClock, MemoryBackend, SystemClock, ValidationReport};

use args::{ad_id, campaign_id, candidate_id, research_id, AdArgs, Args, CliError, Command};

/// Error buckets, one per exit code.
#[derive(Debug)]
enum MainError {
    /// Bad ids, malformed JSON, incoherent params, rejected ad.
    Validation(String),
    /// Rejected ad; the report is printed on stdout.
    Rejected(ValidationReport),
    Precondition(String),
    Io(String),
    NotFound(String),
    Conflict(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Rejected(r) => write!(f, "validation: {}", r.errors().join("; ")),
            MainError::Precondition(m) => write!(f, "precondition: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::NotFound(m) => write!(f, "{m}"),
            MainError::Conflict(m) => write!(f, "conflict: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            if let MainError::Rejected(report) = &e {
                if let Ok(s) = to_canonical_string(report) {
                    println!("{s}");
                }
            }
            eprintln!("ce: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc)
}

/// stderr subscriber; `CE_LOG` takes EnvFilter directives.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env("CE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn map_error(e: &MainError) -> u8 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) | MainError::Rejected(_) => VALIDATION,
        MainError::Precondition(_) => PRECONDITION,
        MainError::Io(_) => IO,
        MainError::NotFound(_) => NOT_FOUND,
        MainError::Conflict(_) => CONFLICT,
    }
}

fn map_io_err(e: ce_io::IoError) -> MainError {
    use ce_io::IoError::*;
    match e {
        Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        Invalid(m) => MainError::Validation(format!("state: {m}")),
        Params(m) => MainError::Validation(format!("params: {m}")),
        Path(m) => MainError::Io(format!("path: {m}")),
        Limit(m) => MainError::Io(format!("limit: {m}")),
    }
}

fn map_engine_err(e: EngineError) -> MainError {
    match e {
        EngineError::Validation { report } => MainError::Rejected(report),
        EngineError::Precondition(m) => MainError::Precondition(m),
        EngineError::NotFound(m) => MainError::NotFound(format!("not found: {m}")),
        EngineError::Forbidden(m) => MainError::NotFound(format!("forbidden: {m}")),
        EngineError::Conflict(m) => MainError::Conflict(m),
        EngineError::Store(m) => MainError::Io(format!("store: {m}")),
        EngineError::Io(e) => map_io_err(e),
    }
}

impl From<CliError> for MainError {
    fn from(e: CliError) -> Self {
        MainError::Validation(e.to_string())
    }
}

fn to_json<T: Serialize>(v: &T) -> Result<Value, MainError> {
    serde_json::to_value(v).map_err(|e| MainError::Io(format!("serialize: {e}")))
}

fn run(args: &Args) -> Result<(), MainError> {
    let mut params = loader::load_params(args.params.as_deref()).map_err(map_io_err)?;
    if let Command::LaunchAd { seed: Some(seed), .. } = &args.command {
        params.ads.backfire_mode = BackfireMode::Seeded;
        params.ads.backfire_seed = *seed;
    }

    let snap = loader::load_snapshot(&args.state).map_err(map_io_err)?;
    let backend = MemoryBackend::from_snapshot(&snap);
    let clock: Arc<dyn Clock> = match args.now {
        Some(now) => Arc::new(FixedClock::new(now)),
        None => Arc::new(SystemClock),
    };
    let engine = backend.engine(params, clock);
    debug!(
        state = %args.state.display(),
        now = engine.now(),
        backfire = engine.params().ads.backfire_mode.as_str(),
        "state loaded"
    );

    let result = match &args.command {
        Command::Probability(c) => {
            let cand = candidate_id("--candidate", &c.candidate)?;
            to_json(&engine.compute_win_probability(&cand).map_err(map_engine_err)?)?
        }
        Command::Countdown(c) => {
            let cand = candidate_id("--candidate", &c.candidate)?;
            to_json(&engine.election_countdown(&cand).map_err(map_engine_err)?)?
        }
        Command::Overview(c) => {
            let cand = candidate_id("--candidate", &c.candidate)?;
            to_json(&engine.campaign_overview(&cand).map_err(map_engine_err)?)?
        }
        Command::Resolve { who, campaign, apply, out } => {
            let cand = candidate_id("--candidate", &who.candidate)?;
            let doc = if *apply {
                let campaign = match campaign_id(campaign.as_deref())? {
                    Some(id) => id,
                    None => engine.current_cycle(&cand).map_err(map_engine_err)?.campaign_id,
                };
                to_json(&engine.resolve_and_apply(&cand, &campaign).map_err(map_engine_err)?)?
            } else {
                let outcome = engine.resolve_election(&cand).map_err(map_engine_err)?;
                let outcome_id = outcome_id_from_canonical(&outcome).map_err(map_io_err)?;
                json!({ "outcomeId": outcome_id, "outcome": to_json(&outcome)? })
            };
            if let Some(dir) = out {
                write_artifact(dir, &doc)?;
            }
            doc
        }
        Command::ValidateAd(ad) => {
            let report = engine.validate_negative_ad(&ad_launch(ad)?).map_err(map_engine_err)?;
            if !report.is_valid {
                return Err(MainError::Rejected(report));
            }
            to_json(&report)?
        }
        Command::LaunchAd { ad, .. } => {
            to_json(&engine.launch_negative_ad(&ad_launch(ad)?).map_err(map_engine_err)?)?
        }
        Command::Advance(c) => {
            let cand = candidate_id("--candidate", &c.candidate)?;
            to_json(&engine.advance_phase(&cand).map_err(map_engine_err)?)?
        }
        Command::NextCycle { who, campaign } => {
            let cand = candidate_id("--candidate", &who.candidate)?;
            let id = campaign_id(campaign.as_deref())?;
            to_json(&engine.start_next_cycle(&cand, id).map_err(map_engine_err)?)?
        }
    };

    if args.command.mutates() {
        let updated = backend.snapshot().map_err(map_engine_err)?;
        if let Err(e) = loader::save_snapshot(&args.state, &updated) {
            warn!(state = %args.state.display(), error = %e, "state write failed after commit");
            return Err(map_io_err(e));
        }
    }

    let s = to_canonical_string(&result).map_err(map_io_err)?;
    println!("{s}");
    Ok(())
}

fn ad_launch(a: &AdArgs) -> Result<AdLaunch, MainError> {
    Ok(AdLaunch {
        attacker_id: candidate_id("--attacker", &a.attacker)?,
        target_id: candidate_id("--target", &a.target)?,
        research_id: research_id(a.research.as_deref())?,
        amount_spent: a.amount,
        in_response_to: ad_id(a.in_response_to.as_deref())?,
    })
}

fn write_artifact(dir: &Path, doc: &Value) -> Result<(), MainError> {
    std::fs::create_dir_all(dir).map_err(|e| MainError::Io(format!("{}: {e}", dir.display())))?;
    write_canonical_file(&dir.join("outcome.json"), doc).map_err(map_io_err)
}
