use log::{debug, info};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::error::GameError;
use crate::game::ActionSelector;
use crate::state::{GameSetup, GameState};
use crate::types::{Action, Outcome, Player, Position, TargetingMode};

pub const DEFAULT_MOVE_LIMIT: u32 = 100;

/// One searching side: its search depth and optional start cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    pub depth: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
}

/// Rules a match is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Turns after which a game is declared a draw.
    pub move_limit: u32,
    pub targeting: TargetingMode,
    pub first_player: Player,
    pub games: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            move_limit: DEFAULT_MOVE_LIMIT,
            targeting: TargetingMode::Adjacent,
            first_player: Player::Player1,
            games: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub player: Player,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub turns: Vec<TurnRecord>,
    pub outcome: Outcome,
    pub move_count: u32,
    pub duration_sec: f64,
    pub blackout_positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchSummary {
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub draws: u32,
    pub avg_moves: f64,
    pub avg_duration_sec: f64,
}

/// `player1` plays as Player1 and `player2` as Player2 in every game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub player1: EngineConfig,
    pub player2: EngineConfig,
    pub games: Vec<GameRecord>,
    pub summary: MatchSummary,
}

/// Builds the starting state for two engines; unset starts use the defaults.
pub fn initial_state(
    player1: &EngineConfig,
    player2: &EngineConfig,
    config: &MatchConfig,
) -> Result<GameState, GameError> {
    let defaults = GameSetup::default();
    let setup = GameSetup {
        player1_start: player1.start.unwrap_or(defaults.player1_start),
        player2_start: player2.start.unwrap_or(defaults.player2_start),
        first_player: config.first_player,
        targeting: config.targeting,
    };
    GameState::from_setup(&setup)
}

/// Plays one game to the end or until the move limit is exceeded.
pub fn play_game(
    player1: &EngineConfig,
    player2: &EngineConfig,
    config: &MatchConfig,
    selector: &dyn ActionSelector,
) -> Result<GameRecord, GameError> {
    let mut state = initial_state(player1, player2, config)?;
    let mut turns = Vec::new();
    let mut blackout_positions = Vec::new();
    let mut moves = 0u32;
    let mut draw = false;
    let start = Instant::now();

    while !state.is_terminal() {
        let player = state.current_player;
        let depth = match player {
            Player::Player1 => player1.depth,
            Player::Player2 => player2.depth,
        };

        if let Some(action) = selector.select_action(&state, player, depth) {
            state.apply_move(player, action.destination)?;
            state.apply_blackouts(&action.blackouts);
            blackout_positions.extend_from_slice(&action.blackouts);
            turns.push(TurnRecord { player, action });
        }

        state.current_player = player.opponent();
        moves += 1;

        if moves > config.move_limit {
            draw = true;
            break;
        }
    }

    let outcome = if draw {
        Outcome::Draw
    } else {
        Outcome::Winner(state.current_player.opponent())
    };
    let duration_sec = start.elapsed().as_secs_f64();
    debug!(
        "{} vs {}: {:?} after {} moves ({:.3}s)",
        player1.name, player2.name, outcome, moves, duration_sec
    );

    Ok(GameRecord {
        turns,
        outcome,
        move_count: moves,
        duration_sec,
        blackout_positions,
    })
}

/// Plays `config.games` games between two engines and summarises them.
pub fn run_match(
    player1: &EngineConfig,
    player2: &EngineConfig,
    config: &MatchConfig,
    selector: &dyn ActionSelector,
) -> Result<MatchResult, GameError> {
    let mut games = Vec::with_capacity(config.games as usize);
    let mut summary = MatchSummary::default();

    for _ in 0..config.games {
        let record = play_game(player1, player2, config, selector)?;
        match record.outcome {
            Outcome::Winner(Player::Player1) => summary.player1_wins += 1,
            Outcome::Winner(Player::Player2) => summary.player2_wins += 1,
            Outcome::Draw => summary.draws += 1,
        }
        summary.avg_moves += f64::from(record.move_count);
        summary.avg_duration_sec += record.duration_sec;
        games.push(record);
    }

    if !games.is_empty() {
        let n = games.len() as f64;
        summary.avg_moves /= n;
        summary.avg_duration_sec /= n;
    }

    info!(
        "{} vs {}: {}-{} ({} draws)",
        player1.name, player2.name, summary.player1_wins, summary.player2_wins, summary.draws
    );

    Ok(MatchResult {
        player1: player1.clone(),
        player2: player2.clone(),
        games,
        summary,
    })
}
