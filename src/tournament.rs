//! Round of engine-vs-engine matches over a grid of depths and mirrored
//! start cells, with resumable JSON checkpoints.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::arena::{EngineConfig, MatchConfig, MatchResult, run_match};
use crate::error::GameError;
use crate::game::ActionSelector;
use crate::types::Position;

const CHECKPOINT_DIR: &str = "checkpoints";
const CHECKPOINT_PREFIX: &str = "checkpoint_";

#[derive(thiserror::Error, Debug)]
pub enum TournamentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("checksum mismatch: {0}")]
    Checksum(PathBuf),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub depths: Vec<u8>,
    /// Start cells that mirror each other; engines only meet across a pair.
    pub position_pairs: Vec<[Position; 2]>,
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
    pub results_dir: PathBuf,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        let pair = |a: (u8, u8), b: (u8, u8)| [Position::new(a.0, a.1), Position::new(b.0, b.1)];
        Self {
            depths: vec![1, 2, 3, 4],
            position_pairs: vec![
                pair((3, 3), (4, 4)),
                pair((3, 4), (4, 3)),
                pair((2, 2), (5, 5)),
                pair((1, 1), (6, 6)),
                pair((0, 2), (7, 5)),
                pair((0, 3), (7, 4)),
            ],
            match_config: MatchConfig::default(),
            results_dir: PathBuf::from("tournament_results"),
        }
    }
}

impl TournamentConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, TournamentError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// One engine per depth and start cell.
    pub fn engines(&self) -> Vec<EngineConfig> {
        let mut engines = Vec::new();
        for &depth in &self.depths {
            for pos in self.position_pairs.iter().flatten() {
                engines.push(EngineConfig {
                    name: format!("depth{}_r{}c{}", depth, pos.row, pos.col),
                    depth,
                    start: Some(*pos),
                });
            }
        }
        engines
    }

    /// Every pair of engines whose start cells form one mirrored pair.
    pub fn pairings(&self) -> Vec<(EngineConfig, EngineConfig)> {
        let engines = self.engines();
        let mut pairs = Vec::new();
        for (i, first) in engines.iter().enumerate() {
            for second in &engines[i + 1..] {
                let (Some(a), Some(b)) = (first.start, second.start) else {
                    continue;
                };
                if a == b {
                    continue;
                }
                let mirrored = self
                    .position_pairs
                    .iter()
                    .any(|&[x, y]| (x == a && y == b) || (x == b && y == a));
                if mirrored {
                    pairs.push((first.clone(), second.clone()));
                }
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub timestamp: String,
    pub current_match: usize,
    pub total_matches: usize,
    /// CRC32 of the JSON-encoded `matches`.
    pub crc32: u32,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentResults {
    pub timestamp: String,
    pub matches: Vec<MatchResult>,
}

/// Aggregate over every match that involves a given depth or start cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupSummary {
    pub matches: u32,
    /// Games won by engines carrying the key.
    pub wins: u32,
    /// `wins / matches`, so it can exceed 1.0 with more than one game per match.
    pub win_rate: f64,
    pub avg_moves: f64,
    pub avg_duration_sec: f64,
}

/// Paths written by `Tournament::save_results`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResults {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub report: PathBuf,
}

pub struct Tournament {
    config: TournamentConfig,
    selector: Box<dyn ActionSelector>,
}

impl Tournament {
    pub fn new(config: TournamentConfig, selector: Box<dyn ActionSelector>) -> Self {
        Self { config, selector }
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Plays all pairings, skipping the matches already in `resume`.
    /// A checkpoint is written after every match.
    pub fn run(
        &self,
        timestamp: &str,
        resume: Option<Checkpoint>,
    ) -> Result<TournamentResults, TournamentError> {
        let pairs = self.config.pairings();
        let total = pairs.len();
        let (timestamp, mut matches) = match resume {
            Some(checkpoint) => (checkpoint.timestamp, checkpoint.matches),
            None => (timestamp.to_string(), Vec::new()),
        };
        info!(
            "tournament {}: {} matches, {} already played",
            timestamp,
            total,
            matches.len()
        );

        for (idx, (player1, player2)) in pairs.iter().enumerate().skip(matches.len()) {
            info!("match {}/{}: {} vs {}", idx + 1, total, player1.name, player2.name);
            let result = run_match(
                player1,
                player2,
                &self.config.match_config,
                self.selector.as_ref(),
            )?;
            matches.push(result);
            self.save_checkpoint(&timestamp, &matches, idx + 1, total)?;
        }

        Ok(TournamentResults { timestamp, matches })
    }

    pub fn save_checkpoint(
        &self,
        timestamp: &str,
        matches: &[MatchResult],
        current_match: usize,
        total_matches: usize,
    ) -> Result<PathBuf, TournamentError> {
        let dir = self.config.results_dir.join(CHECKPOINT_DIR);
        fs::create_dir_all(&dir)?;

        let checkpoint = Checkpoint {
            timestamp: timestamp.to_string(),
            current_match,
            total_matches,
            crc32: crc32fast::hash(&serde_json::to_vec(matches)?),
            matches: matches.to_vec(),
        };
        let path = dir.join(format!("{CHECKPOINT_PREFIX}{timestamp}.json"));
        fs::write(&path, serde_json::to_vec_pretty(&checkpoint)?)?;
        info!("checkpoint saved: {}", path.display());
        Ok(path)
    }

    /// Loads the checkpoint with the greatest file name, if any exists.
    pub fn load_latest_checkpoint(&self) -> Result<Option<Checkpoint>, TournamentError> {
        let dir = self.config.results_dir.join(CHECKPOINT_DIR);
        if !dir.is_dir() {
            return Ok(None);
        }

        let mut latest: Option<PathBuf> = None;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_checkpoint = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(CHECKPOINT_PREFIX));
            if is_checkpoint && latest.as_ref().is_none_or(|best| path > *best) {
                latest = Some(path);
            }
        }
        let Some(path) = latest else {
            return Ok(None);
        };

        let checkpoint: Checkpoint = serde_json::from_slice(&fs::read(&path)?)?;
        let actual = crc32fast::hash(&serde_json::to_vec(&checkpoint.matches)?);
        if actual != checkpoint.crc32 {
            warn!(
                "checkpoint {} has crc {:#010x}, expected {:#010x}",
                path.display(),
                actual,
                checkpoint.crc32
            );
            return Err(TournamentError::Checksum(path));
        }

        info!(
            "loaded checkpoint {}: {}/{} matches",
            path.display(),
            checkpoint.current_match,
            checkpoint.total_matches
        );
        Ok(Some(checkpoint))
    }

    /// Writes the full JSON results, a one-row-per-match CSV summary and a
    /// markdown report grouped by depth and start cell.
    pub fn save_results(
        &self,
        results: &TournamentResults,
    ) -> Result<SavedResults, TournamentError> {
        let dir = &self.config.results_dir;
        fs::create_dir_all(dir)?;

        let json = dir.join(format!("tournament_{}.json", results.timestamp));
        fs::write(&json, serde_json::to_vec_pretty(results)?)?;

        let csv = dir.join(format!("tournament_summary_{}.csv", results.timestamp));
        fs::write(&csv, summary_csv(&results.matches))?;

        let report = dir.join(format!("tournament_report_{}.md", results.timestamp));
        fs::write(&report, summary_report(&results.matches))?;

        info!(
            "results saved: {}, {} and {}",
            json.display(),
            csv.display(),
            report.display()
        );
        Ok(SavedResults { json, csv, report })
    }
}

pub fn summary_csv(matches: &[MatchResult]) -> String {
    let mut buf = String::from(
        "player1_name,player1_depth,player1_position,player2_name,player2_depth,player2_position,player1_wins,player2_wins,draws,avg_moves,avg_duration_sec\n",
    );
    for m in matches {
        let s = &m.summary;
        buf.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{:.2},{:.6}\n",
            m.player1.name,
            m.player1.depth,
            position_label(m.player1.start),
            m.player2.name,
            m.player2.depth,
            position_label(m.player2.start),
            s.player1_wins,
            s.player2_wins,
            s.draws,
            s.avg_moves,
            s.avg_duration_sec
        ));
    }
    buf
}

/// Groups matches by the search depth of either engine.
pub fn summary_by_depth(matches: &[MatchResult]) -> BTreeMap<u8, GroupSummary> {
    group_summary(matches, |engine| Some(engine.depth))
}

/// Groups matches by the start cell of either engine. Engines on the
/// default cells are left out.
pub fn summary_by_position(matches: &[MatchResult]) -> BTreeMap<Position, GroupSummary> {
    group_summary(matches, |engine| engine.start)
}

fn group_summary<K, F>(matches: &[MatchResult], key: F) -> BTreeMap<K, GroupSummary>
where
    K: Ord + Copy,
    F: Fn(&EngineConfig) -> Option<K>,
{
    let mut groups: BTreeMap<K, GroupSummary> = BTreeMap::new();
    for m in matches {
        let (k1, k2) = (key(&m.player1), key(&m.player2));
        let mut keys: Vec<K> = k1.into_iter().chain(k2).collect();
        keys.dedup();
        for k in keys {
            let group = groups.entry(k).or_default();
            group.matches += 1;
            if k1 == Some(k) {
                group.wins += m.summary.player1_wins;
            }
            if k2 == Some(k) {
                group.wins += m.summary.player2_wins;
            }
            group.avg_moves += m.summary.avg_moves;
            group.avg_duration_sec += m.summary.avg_duration_sec;
        }
    }
    for group in groups.values_mut() {
        let n = f64::from(group.matches);
        group.win_rate = f64::from(group.wins) / n;
        group.avg_moves /= n;
        group.avg_duration_sec /= n;
    }
    groups
}

/// Markdown report with overall totals and the per-depth and per-cell tables.
pub fn summary_report(matches: &[MatchResult]) -> String {
    let (mut p1, mut p2, mut draws) = (0, 0, 0);
    for m in matches {
        p1 += m.summary.player1_wins;
        p2 += m.summary.player2_wins;
        draws += m.summary.draws;
    }

    let mut buf = String::from("# Tournament summary\n\n");
    buf.push_str(&format!("- Matches: {}\n", matches.len()));
    buf.push_str(&format!("- Player1 wins: {p1}\n"));
    buf.push_str(&format!("- Player2 wins: {p2}\n"));
    buf.push_str(&format!("- Draws: {draws}\n"));

    buf.push_str("\n## By depth\n\n");
    push_group_table(&mut buf, "Depth", summary_by_depth(matches), |d| d.to_string());
    buf.push_str("\n## By start position\n\n");
    push_group_table(&mut buf, "Position", summary_by_position(matches), |p| {
        position_label(Some(p))
    });
    buf
}

fn push_group_table<K>(
    buf: &mut String,
    title: &str,
    groups: BTreeMap<K, GroupSummary>,
    label: impl Fn(K) -> String,
) {
    buf.push_str(&format!(
        "| {title} | Matches | Wins | Win rate | Avg moves | Avg duration (s) |\n"
    ));
    buf.push_str("|---|---|---|---|---|---|\n");
    for (key, g) in groups {
        buf.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.2} | {:.3} |\n",
            label(key),
            g.matches,
            g.wins,
            g.win_rate,
            g.avg_moves,
            g.avg_duration_sec
        ));
    }
}

/// Seconds since the epoch, used to name a tournament's files.
pub fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{secs:012}")
}

fn position_label(pos: Option<Position>) -> String {
    pos.map_or_else(|| "default".to_string(), |p| format!("r{}c{}", p.row, p.col))
}
