use clap::Parser;
use logger_redacted::LoggerConfig;
use ops_cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger_redacted::init(&LoggerConfig::default().with_level(cli.log_level.clone()))?;

    let report = run(&cli)?;
    println!("{report}");
    Ok(())
}
