use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fhirplan",
    about = "fhirplan — deployment-plan synthesis for the FHIR server stack",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the deployment plan for an environment
    Synth {
        /// Path to the environment configuration file
        #[arg(short, long, default_value = "fhirplan.toml")]
        config: String,
        /// Write the plan JSON here instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Load, validate and dry-synthesize an environment configuration
    Validate {
        #[arg(short, long, default_value = "fhirplan.toml")]
        config: String,
    },
    /// Print the plan's resources in provider-creation order
    Inspect {
        #[arg(short, long, default_value = "fhirplan.toml")]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fhirplan=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { config, out } => commands::synth::run(&config, out.as_deref()),
        Commands::Validate { config } => commands::validate::run(&config),
        Commands::Inspect { config } => commands::inspect::run(&config),
    }
}
