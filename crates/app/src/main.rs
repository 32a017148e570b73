use clap::Parser;

mod cli;
mod commands;
mod error;
mod prompt;
mod rates;
mod settings;
mod suggester;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::error!("{err}");
        eprintln!(
            "{}",
            serde_json::json!({ "error": err.label(), "message": err.to_string() })
        );
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: cli::Cli) -> error::Result<()> {
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fintrack={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let output = commands::dispatch(cli, &settings).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
