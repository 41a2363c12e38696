use astra_core::Month;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod capabilities;
mod output;
mod stages;

#[derive(Debug, Parser)]
#[command(name = "astra")]
#[command(about = "Monthly comment analysis pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split the bulk comment export into monthly partitions
    Partition,
    /// Join a month's comments to the post catalog
    Map {
        /// Month to process (YYYY-MM)
        month: Month,
    },
    /// Check that every comment of a month was mapped to a post
    VerifyMapping { month: Month },
    /// Clean and translate a month's mapped comments
    Translate { month: Month },
    /// Check the share of rows that still look untranslated
    VerifyTranslation { month: Month },
    /// Classify sentiment and topic for a month's comments
    Enrich { month: Month },
    /// Build the per-post summary for a month
    Aggregate { month: Month },
    /// Check the enriched data and post summary of a month
    VerifyFinal { month: Month },
    /// Generate the narrative markdown report for a month
    Report { month: Month },
    /// List posts that drew a negative pile-on
    RedFlags { month: Month },
    /// Replace missing text cells of a post summary with a placeholder
    Sanitize { month: Month },
    /// Show summary rows with an empty comment context
    Diagnose { month: Month },
    /// Partition the export and run every stage for every month
    Run {
        /// Also generate a markdown report per month
        #[arg(long)]
        generate_reports: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = astra_core::load_pipeline_config()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !config.account_path.exists() {
        tracing::info!(
            path = %config.account_path.display(),
            "account profile not found; using built-in profile"
        );
    }

    match cli.command {
        Some(Commands::Partition) => stages::partition(&config),
        Some(Commands::Map { month }) => stages::map(&config, month),
        Some(Commands::VerifyMapping { month }) => stages::verify_mapping(&config, month),
        Some(Commands::Translate { month }) => stages::translate(&config, month).await,
        Some(Commands::VerifyTranslation { month }) => stages::verify_translation(&config, month),
        Some(Commands::Enrich { month }) => stages::enrich(&config, month).await,
        Some(Commands::Aggregate { month }) => stages::aggregate(&config, month),
        Some(Commands::VerifyFinal { month }) => stages::verify_final(&config, month),
        Some(Commands::Report { month }) => stages::report(&config, month).await,
        Some(Commands::RedFlags { month }) => stages::red_flags(&config, month),
        Some(Commands::Sanitize { month }) => stages::sanitize(&config, month),
        Some(Commands::Diagnose { month }) => stages::diagnose(&config, month),
        Some(Commands::Run { generate_reports }) => stages::run(&config, generate_reports).await,
        None => {
            println!("no command given; try `astra --help`");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
