//! triad: deterministic 3-way match and audit CLI
//!
//! Usage:
//!   triad plan --invoice INV-5001 --po PO-1001
//!   triad audit --invoice INV-5001 --po PO-1001 --rules rules.toml --log audit.jsonl --secret S
//!   triad verify --log audit.jsonl --secret S
//!   triad export --log audit.jsonl --format csv --out decisions.csv
//!   triad scenarios

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use triad_audit::{export_csv, export_json, read_log, verify_entries, HmacSigner, JsonlAuditLog};
use triad_contracts::error::{TriadError, TriadResult};
use triad_core::{traits::DataSource, Auditor, Executor, Pipeline, Planner};
use triad_erp::{HttpErp, InMemoryErp};
use triad_rules::FileRuleSource;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Deterministic 3-way PO/invoice matching with a signed audit trail.
#[derive(Parser)]
#[command(name = "triad", version, about = "Deterministic 3-way PO/invoice match and audit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the execution plan for an invoice/PO pair.
    Plan {
        #[arg(long)]
        invoice: String,
        #[arg(long)]
        po: String,
    },
    /// Run the full pipeline and append the decision to the audit log.
    Audit(AuditArgs),
    /// Re-verify the signature of every entry in an audit log.
    Verify {
        #[arg(long, env = "TRIAD_AUDIT_LOG")]
        log: PathBuf,
        #[command(flatten)]
        secret: SecretArg,
    },
    /// Write a read-only projection of an audit log.
    Export {
        #[arg(long, env = "TRIAD_AUDIT_LOG")]
        log: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run reference scenarios A-D against the built-in ERP.
    Scenarios {
        /// Secret for the in-memory log; a random one is used when omitted.
        #[arg(long, env = "TRIAD_AUDIT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

#[derive(Args)]
struct SecretArg {
    /// Shared HMAC secret for the audit log.
    #[arg(long = "secret", env = "TRIAD_AUDIT_SECRET", hide_env_values = true)]
    value: String,
}

#[derive(Args)]
struct AuditArgs {
    #[arg(long)]
    invoice: String,
    #[arg(long)]
    po: String,
    /// Base URL of the ERP service; the built-in reference ERP when omitted.
    #[arg(long, env = "TRIAD_ERP_URL")]
    erp_url: Option<String>,
    /// Rule set file (TOML, or JSON with a .json extension).
    #[arg(long, env = "TRIAD_RULES")]
    rules: PathBuf,
    #[arg(long, env = "TRIAD_AUDIT_LOG")]
    log: PathBuf,
    #[command(flatten)]
    secret: SecretArg,
    /// Per-request ERP timeout.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Logs go to stderr so stdout stays machine-readable. RUST_LOG=debug for detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error [{}]: {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but its checks did not pass.
fn run(command: Command) -> TriadResult<bool> {
    match command {
        Command::Plan { invoice, po } => {
            let plan = Planner::new().generate_plan(&invoice, &po)?;
            print_json(&plan)?;
        }
        Command::Audit(args) => audit(args)?,
        Command::Verify { log, secret } => {
            let signer = HmacSigner::new(&secret.value)?;
            let entries = read_log(&log)?;
            verify_entries(&signer, &entries)?;
            println!("{}: {} entries verified", log.display(), entries.len());
        }
        Command::Export { log, format, out } => export(&log, format, out.as_deref())?,
        Command::Scenarios { secret } => {
            let secret = secret.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let outcomes = triad_erp::run_all(&secret)?;
            let failed = outcomes.iter().filter(|o| !o.passed()).count();
            if failed > 0 {
                eprintln!("{} of {} scenarios did not match expectations", failed, outcomes.len());
                return Ok(false);
            }
            println!("All {} scenarios matched expectations.", outcomes.len());
        }
    }
    Ok(true)
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn audit(args: AuditArgs) -> TriadResult<()> {
    let source: Box<dyn DataSource> = match &args.erp_url {
        Some(url) => Box::new(HttpErp::new(url, Duration::from_secs(args.timeout_secs))?),
        None => {
            info!("no ERP URL given; using the built-in reference ERP");
            Box::new(InMemoryErp::reference())
        }
    };

    let signer = HmacSigner::new(&args.secret.value)?;
    let log = JsonlAuditLog::open(&args.log, signer)?;

    let pipeline = Pipeline::new(
        Planner::new(),
        Executor::new(source),
        Auditor::new(Arc::new(FileRuleSource::new(&args.rules)), Arc::new(log)),
    );

    let outcome = pipeline.run(&args.invoice, &args.po)?;
    print_json(&outcome.recorded.decision)
}

fn export(log: &Path, format: ExportFormat, out: Option<&Path>) -> TriadResult<()> {
    let entries = read_log(log)?;

    let writer: Box<dyn Write> = match out {
        Some(path) => Box::new(File::create(path).map_err(|e| TriadError::AuditWriteFailed {
            reason: format!("failed to create '{}': {}", path.display(), e),
        })?),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ExportFormat::Json => export_json(&entries, writer),
        ExportFormat::Csv => export_csv(&entries, writer),
    }
}

fn print_json<T: Serialize>(value: &T) -> TriadResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| TriadError::InvalidInput {
        reason: format!("failed to render output: {}", e),
    })?;
    println!("{}", text);
    Ok(())
}
