use anyhow::Context;
use api_shared::{AdvisoryRes, InsightsRes, ListPersonasRes, MetricsRes, PatientRes};
use chrono::Utc;
use clap::{Parser, Subcommand};
use referral::{PatientId, Registry, Urgency};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_advisor::{Advisor, AdvisorConfig, AnalysisInput, OpenAiClient};
use triage_core::{
    config::seed_source_from_env_value, insights, metrics, personas, ClinicFocus, CoreConfig,
    InMemoryRepository, PatientRepository, Persona, SeedSource, Transition, TransitionKind,
    TransitionParts, TransitionRequest, TriagePreset,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Referral triage CLI")]
struct Cli {
    /// Seed registry YAML (defaults to $TRIAGE_SEED_FILE, then the built-in registry)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List personas and what they may do
    Personas,
    /// List patients, optionally as a persona sees them
    List {
        /// Persona view, e.g. clinician or waiting-list
        #[arg(long)]
        persona: Option<String>,
        /// all, urgent or routine
        #[arg(long)]
        focus: Option<String>,
    },
    /// Show one patient
    Show {
        /// Patient ID
        id: String,
    },
    /// Management metrics
    Metrics,
    /// Clinician insights for one patient
    Insights {
        /// Patient ID
        id: String,
    },
    /// Apply a workflow transition to a freshly seeded registry
    Transition {
        /// Patient ID
        id: String,
        /// Acting persona
        actor: String,
        /// validate, triage, book, confirm, request-form, return-form or reject
        kind: String,
        /// Assigned urgency (triage)
        #[arg(long)]
        urgency: Option<String>,
        /// Next procedure (triage)
        #[arg(long)]
        procedure: Option<String>,
        /// Clinic slot (book)
        #[arg(long)]
        slot: Option<String>,
        /// Rejection reason (reject)
        #[arg(long)]
        reason: Option<String>,
        /// Triage preset: see-and-treat, 2ww or routine
        #[arg(long, conflicts_with_all = ["urgency", "procedure"])]
        preset: Option<String>,
    },
    /// Print the registry as seed YAML, loadable again with --seed
    Export,
    /// Ask the completion API for an advisory on one patient (Ctrl-C cancels)
    Analyze {
        /// Patient ID
        id: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_repository(seed: Option<PathBuf>) -> anyhow::Result<InMemoryRepository> {
    let source = match seed {
        Some(path) => SeedSource::File(path),
        None => seed_source_from_env_value(std::env::var("TRIAGE_SEED_FILE").ok()),
    };
    let patients = CoreConfig::new(source)
        .load_registry()
        .context("failed to load the patient registry")?;
    Ok(InMemoryRepository::new(patients))
}

fn transition_request(
    kind: &str,
    parts: TransitionParts,
    preset: Option<&str>,
) -> anyhow::Result<TransitionRequest> {
    let kind: TransitionKind = kind.parse()?;
    if let Some(preset) = preset {
        if kind != TransitionKind::Triage {
            anyhow::bail!("--preset only applies to triage, not {kind}");
        }
        let preset: TriagePreset = preset.parse()?;
        return Ok(preset.transition()?.into());
    }
    Ok(Transition::from_parts(kind, &parts)?.into())
}

async fn analyze(repo: &InMemoryRepository, id: &PatientId) -> anyhow::Result<()> {
    let patient = repo.get(id)?;
    let config = AdvisorConfig::from_env_values(
        std::env::var("OPENAI_API_KEY").ok(),
        std::env::var("TRIAGE_OPENAI_BASE_URL").ok(),
        std::env::var("TRIAGE_OPENAI_MODEL").ok(),
        std::env::var("TRIAGE_ADVISOR_TIMEOUT_SECS").ok(),
    )?;
    let advisor = Advisor::new(Arc::new(OpenAiClient::new(config)?));
    let input = AnalysisInput::from(&patient);

    tokio::select! {
        result = advisor.analyze(&input) => {
            print_json(&AdvisoryRes::from(result?))?;
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Analysis cancelled");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_advisor=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'triage --help' for commands");
        return Ok(());
    };
    let repo = load_repository(cli.seed)?;

    match command {
        Commands::Personas => {
            for persona in ListPersonasRes::all().personas {
                let actions = if persona.actions.is_empty() {
                    "read only".to_string()
                } else {
                    persona.actions.join(", ")
                };
                println!(
                    "{}: {} ({}), actions: {}",
                    persona.id, persona.title, persona.subtitle, actions
                );
            }
        }
        Commands::List { persona, focus } => {
            let focus: ClinicFocus = focus.as_deref().unwrap_or_default().parse()?;
            let patients = repo.list()?;
            let visible: Vec<_> = match persona {
                Some(persona) => {
                    let persona: Persona = persona.parse()?;
                    personas::filter_with_focus(persona, focus, &patients)
                }
                None => patients
                    .iter()
                    .filter(|p| focus.admits(p.effective_urgency()))
                    .collect(),
            };
            if visible.is_empty() {
                println!("No patients found.");
            }
            for patient in visible {
                println!(
                    "ID: {}, Name: {}, Status: {}, Urgency: {}",
                    patient.id(),
                    patient.name(),
                    patient.status(),
                    patient.effective_urgency()
                );
            }
        }
        Commands::Show { id } => {
            let patient = repo.get(&PatientId::new(&id)?)?;
            print_json(&PatientRes::from(&patient))?;
        }
        Commands::Metrics => {
            let patients = repo.list()?;
            let today = Utc::now().date_naive();
            print_json(&MetricsRes::from(metrics::compute(&patients, today)))?;
        }
        Commands::Insights { id } => {
            let patient = repo.get(&PatientId::new(&id)?)?;
            let today = Utc::now().date_naive();
            print_json(&InsightsRes::from(insights::insights(&patient, today)))?;
        }
        Commands::Transition {
            id,
            actor,
            kind,
            urgency,
            procedure,
            slot,
            reason,
            preset,
        } => {
            let actor: Persona = actor.parse()?;
            let parts = TransitionParts {
                urgency: urgency.as_deref().map(str::parse::<Urgency>).transpose()?,
                procedure,
                slot,
                reason,
            };
            let request = transition_request(&kind, parts, preset.as_deref())?;
            match repo.apply(&PatientId::new(&id)?, &request, actor) {
                Ok(receipt) => {
                    println!("{}", receipt.message);
                    print_json(&PatientRes::from(&receipt.patient))?;
                }
                Err(e) => eprintln!("Error applying transition: {}", e),
            }
        }
        Commands::Export => {
            print!("{}", Registry::render(&repo.list()?)?);
        }
        Commands::Analyze { id } => {
            analyze(&repo, &PatientId::new(&id)?).await?;
        }
    }

    Ok(())
}
