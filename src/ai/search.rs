use log::debug;

use crate::board::{bit, position_of, squares};
use crate::state::GameState;
use crate::types::{Action, Player};

const MIN_SCORE: f32 = f32::NEG_INFINITY;
const MAX_SCORE: f32 = f32::INFINITY;

/// Result of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// `None` when the budget is zero or the mover is already stuck.
    pub action: Option<Action>,
    /// Score from Player2's point of view.
    pub score: f32,
    pub nodes: u64,
}

/// Move destination and blackout set, as raw squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    destination: usize,
    blackouts: u64,
}

impl Candidate {
    fn into_action(self) -> Action {
        Action {
            destination: position_of(self.destination),
            blackouts: squares(self.blackouts).map(position_of).collect(),
        }
    }
}

/// Depth-limited minimax with alpha-beta pruning over move + blackout pairs.
///
/// Player2 always maximizes and Player1 always minimizes, matching the sign
/// of `GameState::evaluate`. Cost grows exponentially with the ply budget.
#[derive(Debug, Default)]
pub struct Searcher {
    nodes: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches the best action for `player`, treating it as the side to move.
    /// The given state is never modified.
    pub fn search(&mut self, state: &GameState, player: Player, depth: u8) -> SearchResult {
        self.nodes = 0;

        let mut root = *state;
        root.current_player = player;
        let before = root;

        let maximizing = player == Player::Player2;
        let (best, score) = self.minimax(&mut root, depth, MIN_SCORE, MAX_SCORE, maximizing);
        debug_assert_eq!(root, before, "search must restore the state it mutates");

        debug!(
            "search {:?} depth={} nodes={} score={}",
            player, depth, self.nodes, score
        );

        SearchResult {
            action: best.map(Candidate::into_action),
            score,
            nodes: self.nodes,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn minimax(
        &mut self,
        state: &mut GameState,
        depth: u8,
        alpha: f32,
        beta: f32,
        maximizing: bool,
    ) -> (Option<Candidate>, f32) {
        self.nodes += 1;

        if depth == 0 || state.is_terminal() {
            return (None, state.evaluate());
        }

        let (mover, opponent) = if maximizing {
            (Player::Player2, Player::Player1)
        } else {
            (Player::Player1, Player::Player2)
        };

        let mut alpha = alpha;
        let mut beta = beta;
        let mut best = None;
        let mut best_score = if maximizing { MIN_SCORE } else { MAX_SCORE };

        for destination in squares(state.board().legal_moves(mover)) {
            let Some(from) = make_move(state, mover, destination) else {
                continue;
            };

            for blackouts in blackout_combinations(state.blackout_pool(opponent)) {
                make_blackouts(state, blackouts, opponent);
                let (_, score) = self.minimax(state, depth - 1, alpha, beta, !maximizing);
                unmake_blackouts(state, blackouts, mover);

                let improves = if maximizing {
                    score > best_score
                } else {
                    score < best_score
                };
                if best.is_none() || improves {
                    best_score = score;
                    best = Some(Candidate {
                        destination,
                        blackouts,
                    });
                }

                if maximizing {
                    alpha = alpha.max(best_score);
                } else {
                    beta = beta.min(best_score);
                }
                if beta <= alpha {
                    break;
                }
            }

            unmake_move(state, mover, from);
            if beta <= alpha {
                break;
            }
        }

        (best, best_score)
    }
}

/// Searches and returns only the action for `player`.
pub fn best_action(state: &GameState, player: Player, depth: u8) -> Option<Action> {
    Searcher::new().search(state, player, depth).action
}

/// All blackout sets the mover may pick from `pool`: every pair when there
/// are at least two cells, otherwise the whole pool as a single set.
pub(crate) fn blackout_combinations(pool: u64) -> Vec<u64> {
    if pool.count_ones() < 2 {
        return vec![pool];
    }

    let cells: Vec<usize> = squares(pool).collect();
    let mut combos = Vec::with_capacity(cells.len() * (cells.len() - 1) / 2);
    for (i, &first) in cells.iter().enumerate() {
        for &second in &cells[i + 1..] {
            combos.push(bit(first) | bit(second));
        }
    }
    combos
}

/// Moves the pawn and returns the square it left.
fn make_move(state: &mut GameState, player: Player, destination: usize) -> Option<usize> {
    let from = state.board().pawn_square(player)?;
    state.board_mut().set_pawn(player, destination);
    Some(from)
}

fn unmake_move(state: &mut GameState, player: Player, from: usize) {
    state.board_mut().set_pawn(player, from);
}

/// Blackout candidates are always empty cells, so clearing the bits undoes them.
fn make_blackouts(state: &mut GameState, blackouts: u64, next: Player) {
    state.board_mut().black_out(blackouts);
    state.current_player = next;
}

fn unmake_blackouts(state: &mut GameState, blackouts: u64, mover: Player) {
    state.board_mut().restore(blackouts);
    state.current_player = mover;
}
