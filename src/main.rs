mod config;
mod error;
mod filter;
mod geo;
mod loader;
mod models;
mod selection;
mod tui;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use config::{Config, Overrides};
use filter::FilterEngine;
use loader::{Availability, Board};
use models::{JobId, LocationOption};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Browse a job listing board - search by title, filter by location, inspect details")]
struct Cli {
    /// Job list to load (file path or http(s) URL) [env: JOBBOARD_SOURCE]
    #[arg(long, global = true)]
    source: Option<String>,

    /// JSON file mapping location names to coordinates [env: JOBBOARD_GAZETTEER]
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    /// Current position as LAT,LON [env: JOBBOARD_POSITION]
    #[arg(long, global = true, allow_hyphen_values = true)]
    position: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive board (default)
    Browse,

    /// Print jobs matching a search
    List {
        /// Case-insensitive text to find in the job title
        #[arg(short, long)]
        query: Option<String>,

        /// Exact location, or "current-location" to use the nearest one
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Show job details
    Show {
        /// Job ID
        id: usize,
    },

    /// List the location options
    Locations,
}

fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match (log_file, interactive) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // The TUI owns the terminal; without a log file there is nowhere to write
        (None, true) => {}
        (None, false) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_board(config: &Config) -> Result<Board> {
    let board = loader::load(&config.source);
    if let Availability::Unavailable(reason) = &board.availability {
        return Err(anyhow!(
            "No jobs available from {}: {}",
            config.source.describe(),
            reason
        ));
    }
    // Skipped records were already reported through tracing by the loader
    Ok(board)
}

fn resolve_location(config: &Config, board: &Board, raw: &str) -> Result<Option<LocationOption>> {
    let option = board
        .locations
        .iter()
        .find(|o| o.value == raw)
        .cloned()
        .unwrap_or_else(|| LocationOption::new(raw));
    if !option.is_current_location() {
        return Ok(Some(option));
    }
    let gazetteer = config.gazetteer()?;
    let provider = geo::provider_for(config.position);
    let nearest = geo::resolve_current_location(provider.as_ref(), &board.locations, &gazetteer);
    match &nearest {
        Some(option) => println!("Using nearest location: {}", option.label),
        None => println!("Current location unavailable; not filtering by location."),
    }
    Ok(nearest)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(Overrides {
        source: cli.source,
        gazetteer: cli.gazetteer,
        position: cli.position,
    })?;
    let command = cli.command.unwrap_or(Commands::Browse);
    init_logging(config.log_file.as_deref(), matches!(command, Commands::Browse))?;

    match command {
        Commands::Browse => {
            let board = loader::load(&config.source);
            let gazetteer = config.gazetteer()?;
            let provider = geo::provider_for(config.position);
            tui::run_browse(config.source.clone(), board, provider, gazetteer, config.placeholder.clone())?;
        }

        Commands::List { query, location } => {
            let board = load_board(&config)?;
            let search = query.is_some() || location.is_some();
            let location = match location {
                Some(raw) => resolve_location(&config, &board, &raw)?,
                None => None,
            };

            let mut engine = FilterEngine::new(board.jobs);
            engine.set_query(query.unwrap_or_default());
            engine.set_location(location);
            if search {
                engine.trigger_search();
            }

            if engine.visible_count() == 0 {
                println!("No jobs found.");
            } else {
                println!("{} Jobs Found\n", engine.visible_count());
                println!("{:<5} {:<30} {:<20} {:<16} {:<18} {:>10}", "ID", "POSITION", "COMPANY", "LOCATION", "SALARY", "POSTED");
                println!("{}", "-".repeat(104));
                for job in engine.visible_jobs() {
                    println!(
                        "{:<5} {:<30} {:<20} {:<16} {:<18} {:>10}",
                        job.id,
                        truncate(&job.position, 28),
                        truncate(&job.company, 18),
                        truncate(&job.location, 14),
                        truncate(&job.salary, 16),
                        truncate(&job.posted_time, 10)
                    );
                }
            }
        }

        Commands::Show { id } => {
            let board = load_board(&config)?;
            match board.job(JobId(id)) {
                Some(job) => print!("{}", selection::detail_plain(job)),
                None => println!("Job #{} not found.", id),
            }
        }

        Commands::Locations => {
            let board = load_board(&config)?;
            for option in &board.locations {
                if option.is_current_location() {
                    println!("{:<20} {}", option.value, option.label);
                } else {
                    println!("{}", option.label);
                }
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Senior Backend Engineer", 10), "Senior ...");
        // Multi-byte characters are not split
        assert_eq!(truncate("Ingénieur Logiciel", 8), "Ingén...");
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jobboard",
            "list",
            "-q",
            "engineer",
            "--source",
            "/src/api/jobs.json",
            "--position",
            "-33.8,151.2",
        ])
        .unwrap();
        assert_eq!(cli.source.as_deref(), Some("/src/api/jobs.json"));
        assert_eq!(cli.position.as_deref(), Some("-33.8,151.2"));
        assert!(matches!(
            cli.command,
            Some(Commands::List { query: Some(ref q), location: None }) if q == "engineer"
        ));
    }

    fn config_for(path: &Path) -> Config {
        Config {
            source: loader::JobSource::File(path.to_path_buf()),
            gazetteer: None,
            position: None,
            placeholder: String::new(),
            log_file: None,
        }
    }

    #[test]
    fn test_load_board_keeps_skipped_records_on_the_board() {
        let path = std::env::temp_dir().join(format!("jobboard-main-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"position":"Backend Engineer","company":"Acme","location":"Remote","salary":"$1","postedTime":"today","logo":"l.png","skills":[],"description":"d","totalApplications":0}, {"position":"broken"}]"#,
        )
        .unwrap();

        let board = load_board(&config_for(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(board.jobs.len(), 1);
        assert_eq!(board.skipped.len(), 1);
        assert_eq!(board.skipped[0].index, 1);
    }

    #[test]
    fn test_load_board_unavailable_is_an_error() {
        let path = std::env::temp_dir().join("jobboard-main-missing.json");
        let err = load_board(&config_for(&path)).unwrap_err();
        assert!(err.to_string().contains("No jobs available"));
    }

    #[test]
    fn test_cli_defaults_to_browse() {
        let cli = Cli::try_parse_from(["jobboard"]).unwrap();
        assert!(cli.command.is_none());
    }
}
