use std::path::PathBuf;

use clap::Parser;
use isolation_blackout::TargetingMode;
use isolation_blackout::game::MinimaxSelector;
use isolation_blackout::tournament::{Tournament, TournamentConfig, timestamp};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tournament",
    about = "Play engine-vs-engine matches over search depths and mirrored start cells"
)]
struct Args {
    /// JSON tournament config; flags below override its fields
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search depths to enter, e.g. 1,2,3
    #[arg(long, value_delimiter = ',')]
    depths: Option<Vec<u8>>,

    /// Games per match
    #[arg(long)]
    games: Option<u32>,

    /// Turns before a game is declared a draw
    #[arg(long)]
    move_limit: Option<u32>,

    /// Allow blacking out cells up to two squares from the opponent
    #[arg(long)]
    extended: bool,

    /// Directory for results and checkpoints
    #[arg(long, value_name = "DIR")]
    results_dir: Option<PathBuf>,

    /// Continue from the latest checkpoint if one exists
    #[arg(long)]
    resume: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => TournamentConfig::from_json_file(path)?,
        None => TournamentConfig::default(),
    };
    if let Some(depths) = args.depths {
        config.depths = depths;
    }
    if let Some(games) = args.games {
        config.match_config.games = games;
    }
    if let Some(limit) = args.move_limit {
        config.match_config.move_limit = limit;
    }
    if args.extended {
        config.match_config.targeting = TargetingMode::Extended;
    }
    if let Some(dir) = args.results_dir {
        config.results_dir = dir;
    }

    let tournament = Tournament::new(config, Box::new(MinimaxSelector));
    let engines = tournament.config().engines();
    info!("{} engine configurations", engines.len());

    let resume = if args.resume {
        match tournament.load_latest_checkpoint() {
            Ok(checkpoint) => checkpoint,
            Err(err) => {
                warn!("ignoring checkpoint: {err}; starting fresh");
                None
            }
        }
    } else {
        None
    };

    let results = tournament.run(&timestamp(), resume)?;
    let saved = tournament.save_results(&results)?;
    info!(
        "tournament completed: {} matches, results in {} ({} summary, {} report)",
        results.matches.len(),
        saved.json.display(),
        saved.csv.display(),
        saved.report.display()
    );
    Ok(())
}
