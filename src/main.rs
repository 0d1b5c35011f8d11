use anyhow::Result;
use clap::Parser;
use docrag::cli::Cli;
use docrag::cli::Commands;
use docrag::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    docrag::logging::init_logging_with_config(Some(&config))?;

    match cli.command {
        Commands::Init => docrag::cli::handle_init(&config).await?,
        Commands::Ingest {
            title,
            file,
            content,
            source_type,
            source_url,
            category,
            version,
        } => {
            docrag::cli::handle_ingest(
                &config,
                title,
                file,
                content,
                source_type,
                source_url,
                category,
                version,
            )
            .await?;
        }
        Commands::Ask { question, session } => {
            docrag::cli::handle_ask(&config, question, session).await?;
        }
        Commands::Eval {
            dataset,
            mode,
            output,
        } => docrag::cli::handle_eval(&config, dataset, &mode, output).await?,
    }

    Ok(())
}
