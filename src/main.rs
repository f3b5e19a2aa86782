use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use stepform::context::WizardContext;
use stepform::core::value::Value;
use stepform::definition::WizardDefinition;
use stepform::error::{Result, WizardError};
use stepform::terminal::{self, DemoBackend, StderrNotifier, Terminal};
use stepform::wizard::Wizard;
use stepform::{config, flows};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "stepform", author, version, about = "Multi-step form wizards in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in a flow interactively and print what the backend received.
    Run {
        /// Built-in flow name.
        #[arg(long, conflicts_with = "config", required_unless_present = "config")]
        flow: Option<String>,
        /// YAML flow file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Step id to open the wizard on.
        #[arg(long)]
        resume: Option<String>,
        /// JSON file with previously saved answers.
        #[arg(long)]
        draft: Option<PathBuf>,
    },
    /// Compile a YAML flow file and report configuration errors.
    Check {
        #[arg(long)]
        config: PathBuf,
    },
    /// List the built-in flows.
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "stepform failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Run {
            flow,
            config,
            resume,
            draft,
        } => {
            let definition = resolve(flow.as_deref(), config)?;
            let mut context = WizardContext::new().with_notifier(Arc::new(StderrNotifier));
            if let Some(step) = resume {
                context = context.resume_at(step);
            }
            if let Some(path) = draft {
                let raw = std::fs::read_to_string(&path)?;
                let draft: Value = serde_json::from_str(&raw)
                    .map_err(|err| WizardError::config(format!("draft {}: {err}", path.display())))?;
                context = context.with_draft(draft);
            }

            let backend = DemoBackend::new();
            let mut wizard = Wizard::new(definition, context)?;
            let mut term = Terminal::new();
            terminal::run(&mut wizard, &backend, &backend, &mut term).await?;
            wizard.unmount();
            Ok(())
        }
        Command::Check { config } => {
            let definition = config::load(&config)?;
            println!(
                "{}: {} steps, {} validated fields",
                definition.name,
                definition.registry.len(),
                definition.schema.fields().count()
            );
            Ok(())
        }
        Command::List => {
            for name in flows::NAMES {
                let definition = flows::by_name(name)?;
                let steps: Vec<&str> = definition
                    .registry
                    .steps()
                    .iter()
                    .map(|step| step.id.as_str())
                    .collect();
                println!("{name}: {}", steps.join(" > "));
            }
            Ok(())
        }
    }
}

fn resolve(flow: Option<&str>, config: Option<PathBuf>) -> Result<WizardDefinition> {
    match (flow, config) {
        (_, Some(path)) => config::load(&path),
        (Some(name), None) => flows::by_name(name),
        (None, None) => Err(WizardError::config("either --flow or --config is required")),
    }
}
