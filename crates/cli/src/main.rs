use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_core::config::{settings_from_file, DetectionSettings, EnvOverrides};
use intake_core::constants::{ENV_CANDIDATE_WINDOW, ENV_ORDER_WINDOW_DAYS, ENV_SIMILARITY_THRESHOLD};
use intake_core::{
    format_code, similarity, DetectionConfig, DiagnosisCode, InMemoryStore, IntakeScreen,
    OrderCandidate, PatientCandidate, ProviderIdentifier, RecordId, Warning,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Intake data-integrity checks")]
struct Cli {
    /// Detection policy file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a provider identifier
    ValidateNpi {
        /// Identifier, separators allowed
        identifier: String,
    },
    /// Validate a diagnosis code
    ValidateCode { code: String },
    /// Best-effort diagnosis code formatting
    FormatCode { code: String },
    /// Trigram similarity of two strings
    Similarity { a: String, b: String },
    /// Check a new patient against a snapshot
    CheckPatient {
        /// Record-store snapshot (YAML)
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        mrn: String,
    },
    /// Check a new medication order against a snapshot
    CheckOrder {
        /// Record-store snapshot (YAML)
        #[arg(long)]
        snapshot: PathBuf,
        /// Patient UUID (32 lowercase hex characters)
        #[arg(long)]
        patient_id: String,
        #[arg(long)]
        medication: String,
    },
    /// Resolve a provider by identifier against a snapshot
    ResolveProvider {
        /// Record-store snapshot (YAML)
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        name: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let Some(command) = cli.command else {
        println!("Use 'intake --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::ValidateNpi { identifier } => match ProviderIdentifier::parse(&identifier) {
            Ok(id) => {
                report_valid(json, id.as_str());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                report_invalid(json, &e.to_string(), e.is_malformed());
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::ValidateCode { code } => match DiagnosisCode::parse(&code) {
            Ok(code) => {
                report_valid(json, code.as_str());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                report_invalid(json, &e.to_string(), e.is_malformed());
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::FormatCode { code } => {
            let formatted = format_code(&code);
            if json {
                println!("{}", serde_json::json!({ "input": code, "formatted": formatted }));
            } else {
                println!("{formatted}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Similarity { a, b } => {
            let score = similarity(&a, &b);
            if json {
                println!("{}", serde_json::json!({ "a": a, "b": b, "score": score }));
            } else {
                println!("{score:.4}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckPatient {
            snapshot,
            first_name,
            last_name,
            mrn,
        } => {
            let screen = IntakeScreen::new(Arc::new(load_config(cli.config.as_deref())?));
            let store = load_store(&snapshot)?;
            let candidate = PatientCandidate::new(first_name, last_name, mrn);
            let warnings = screen.screen_patient(&candidate, &store)?;
            print_warnings(json, &warnings)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckOrder {
            snapshot,
            patient_id,
            medication,
        } => {
            let screen = IntakeScreen::new(Arc::new(load_config(cli.config.as_deref())?));
            let store = load_store(&snapshot)?;
            let patient_id = RecordId::parse(&patient_id)?;
            let candidate = OrderCandidate::new(patient_id, medication);
            let warnings = screen.screen_order(&candidate, &store)?;
            print_warnings(json, &warnings)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ResolveProvider {
            snapshot,
            identifier,
            name,
        } => {
            let screen = IntakeScreen::new(Arc::new(load_config(cli.config.as_deref())?));
            let store = load_store(&snapshot)?;
            let resolution = screen.screen_provider(&identifier, &name, &store)?;
            if json {
                let value = serde_json::json!({
                    "record": resolution.record,
                    "outcome": format!("{:?}", resolution.outcome).to_lowercase(),
                    "warnings": resolution.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "{:?}: {} {}",
                    resolution.outcome, resolution.record.identifier, resolution.record.display_name
                );
                print_warnings(false, &resolution.warnings)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve the detection policy: optional YAML file, then environment overrides.
fn load_config(path: Option<&Path>) -> anyhow::Result<DetectionConfig> {
    let mut settings = match path {
        Some(path) => settings_from_file(path)
            .with_context(|| format!("reading policy {}", path.display()))?,
        None => DetectionSettings::default(),
    };

    let overrides = EnvOverrides {
        similarity_threshold: std::env::var(ENV_SIMILARITY_THRESHOLD).ok(),
        candidate_window: std::env::var(ENV_CANDIDATE_WINDOW).ok(),
        order_window_days: std::env::var(ENV_ORDER_WINDOW_DAYS).ok(),
    };
    overrides.apply(&mut settings)?;

    let cfg = DetectionConfig::new(settings)?;
    tracing::debug!(
        threshold = cfg.similarity_threshold(),
        window = cfg.candidate_window(),
        "detection policy resolved"
    );
    Ok(cfg)
}

fn load_store(path: &Path) -> anyhow::Result<InMemoryStore> {
    InMemoryStore::load_snapshot(path)
        .with_context(|| format!("loading snapshot {}", path.display()))
}

fn report_valid(json: bool, normalized: &str) {
    if json {
        println!("{}", serde_json::json!({ "valid": true, "normalized": normalized }));
    } else {
        println!("valid: {normalized}");
    }
}

fn report_invalid(json: bool, reason: &str, malformed: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "valid": false, "reason": reason, "malformed": malformed })
        );
    } else if malformed {
        println!("invalid format: {reason}");
    } else {
        println!("invalid (check for a transcription error): {reason}");
    }
}

fn print_warnings(json: bool, warnings: &[Warning]) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(warnings)?);
        return Ok(());
    }

    if warnings.is_empty() {
        println!("No warnings.");
    }
    for warning in warnings {
        println!(
            "[{:?}] {}: {}",
            warning.severity(),
            warning.kind(),
            warning.message()
        );
    }
    Ok(())
}
