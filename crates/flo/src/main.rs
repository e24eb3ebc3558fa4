use anyhow::{Context, Result};
use clap::Parser;
use flo::cli::{Cli, Commands};
use flo::commands;
use stemconf::StemConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = StemConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // stdout is reserved for command output
    let filter = tracing_subscriber::EnvFilter::try_new(&config.telemetry.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Styles {
            genres: true, json, ..
        } => {
            commands::genres(&config.catalog(), json)?;
        }
        Commands::Styles { genre, json, .. } => {
            commands::styles(&config.catalog(), genre.as_deref(), json)?;
        }
        Commands::Generate(args) => {
            args.apply(&mut config);
            let report = commands::generate(&config)?;
            println!(
                "{} ({}, {} BPM): {} notes",
                report.style, report.genre, report.tempo, report.notes
            );
            for file in &report.files {
                println!("  wrote {}", file.display());
            }
            if let Some(seed) = report.lyric_seed {
                println!("  lyric seed {}", seed);
            }
        }
        Commands::Lyrics(args) => {
            args.apply(&mut config);
            let song = commands::lyrics(&config);
            print!("{}", song.to_text());
            println!("\nseed: {}", song.seed);
        }
        Commands::Inspect { file, json } => {
            commands::inspect(&file, json)?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
