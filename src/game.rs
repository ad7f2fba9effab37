use log::info;

use crate::ai::best_action;
use crate::board::{bit, mask_of, square_of};
use crate::error::GameError;
use crate::state::{GameSetup, GameState};
use crate::types::{Action, GameSnapshot, Player, Position};

pub const DEFAULT_DEPTH: u8 = 3;

pub trait ActionSelector: Send + Sync {
    fn select_action(&self, state: &GameState, player: Player, depth: u8) -> Option<Action>;
}

/// Picks actions with the alpha-beta searcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimaxSelector;

impl ActionSelector for MinimaxSelector {
    fn select_action(&self, state: &GameState, player: Player, depth: u8) -> Option<Action> {
        best_action(state, player, depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Move,
    Blackout,
}

/// One interactive game as driven by a front-end.
///
/// A human turn is two steps: `select_move`, then `toggle_blackout` until the
/// required number of cells is picked (or `finish_turn`). An AI turn is a
/// single `do_ai_move`.
pub struct GameInstance {
    state: GameState,
    phase: Phase,
    selected: Vec<Position>,
    ai_player: Option<Player>,
    depths: [u8; 2],
    pub last_action: Option<Action>,
    selector: Box<dyn ActionSelector>,
}

impl GameInstance {
    pub fn new(
        setup: &GameSetup,
        ai_player: Option<Player>,
        depths: [u8; 2],
        selector: Box<dyn ActionSelector>,
    ) -> Result<Self, GameError> {
        Ok(Self {
            state: GameState::from_setup(setup)?,
            phase: Phase::Move,
            selected: Vec::new(),
            ai_player,
            depths,
            last_action: None,
            selector,
        })
    }

    /// Human as Player1 against the searcher as Player2.
    pub fn new_vs_ai(setup: &GameSetup, depth: u8) -> Result<Self, GameError> {
        Self::new(
            setup,
            Some(Player::Player2),
            [depth, depth],
            Box::new(MinimaxSelector),
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::Move && self.state.is_terminal()
    }

    pub fn is_ai_turn(&self) -> bool {
        self.ai_player == Some(self.state.current_player) && !self.is_game_over()
    }

    /// Moves the current player's pawn to an adjacent empty cell.
    pub fn select_move(&mut self, row: u8, col: u8) -> Result<(), GameError> {
        self.ensure_human_phase(Phase::Move)?;

        let player = self.state.current_player;
        let destination = Position::new(row, col);
        let pos = square_of(destination).ok_or(GameError::OutOfBounds(destination))?;
        if self.state.board().legal_moves(player) & bit(pos) == 0 {
            return Err(GameError::InvalidMove {
                player,
                position: destination,
                reason: "not an adjacent empty cell",
            });
        }

        self.state.apply_move(player, destination)?;
        self.phase = Phase::Blackout;
        self.selected.clear();
        if self.required_blackouts() == 0 {
            self.finish_turn()?;
        }
        Ok(())
    }

    /// Selects or deselects a blackout cell. Returns `true` once the turn ended.
    pub fn toggle_blackout(&mut self, row: u8, col: u8) -> Result<bool, GameError> {
        self.ensure_human_phase(Phase::Blackout)?;

        let cell = Position::new(row, col);
        if let Some(idx) = self.selected.iter().position(|&p| p == cell) {
            self.selected.remove(idx);
            return Ok(false);
        }
        if self.candidate_mask() & mask_of(&[cell]) == 0 {
            return Err(GameError::Session("cell cannot be blacked out"));
        }
        self.selected.push(cell);

        if self.selected.len() >= self.required_blackouts() {
            self.finish_turn()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Commits the selected blackouts and hands the turn over.
    pub fn finish_turn(&mut self) -> Result<(), GameError> {
        self.ensure_human_phase(Phase::Blackout)?;
        if self.selected.len() < self.required_blackouts() {
            return Err(GameError::Session("not enough blackout cells selected"));
        }
        let player = self.state.current_player;
        let destination = self
            .state
            .pawn_position(player)
            .ok_or(GameError::Session("pawn is not on the board"))?;
        let blackouts = std::mem::take(&mut self.selected);

        self.state.apply_blackouts(&blackouts);
        self.last_action = Some(Action {
            destination,
            blackouts,
        });
        self.end_turn();
        Ok(())
    }

    /// Lets the selector play the current player's whole turn.
    /// Returns `None` when the selector found nothing to play.
    pub fn do_ai_move(&mut self) -> Result<Option<Action>, GameError> {
        if self.is_game_over() {
            return Err(GameError::Session("game is already over"));
        }
        if !self.is_ai_turn() {
            return Err(GameError::Session("it is not AI's turn"));
        }

        let player = self.state.current_player;
        let depth = self.depth_for(player);
        let action = self.selector.select_action(&self.state, player, depth);
        if let Some(action) = &action {
            if self.state.board().legal_moves(player) & mask_of(&[action.destination]) == 0 {
                return Err(GameError::Session("AI selected an illegal move"));
            }
            self.state.apply_move(player, action.destination)?;
            self.state.apply_blackouts(&action.blackouts);
        }

        self.last_action = action.clone();
        self.end_turn();
        Ok(action)
    }

    pub fn to_game_state(&self) -> GameSnapshot {
        let player = self.state.current_player;
        let legal_moves = if self.phase == Phase::Move {
            self.state.legal_moves(player)
        } else {
            Vec::new()
        };
        GameSnapshot {
            board: self.state.board().to_array().to_vec(),
            current_player: player.as_u8(),
            targeting: self.state.targeting(),
            phase: match self.phase {
                Phase::Move => "move",
                Phase::Blackout => "blackout",
            },
            legal_moves,
            selected_blackouts: self.selected.clone(),
            is_game_over: self.is_game_over(),
            winner: self.winner().map_or(0, Player::as_u8),
        }
    }

    pub fn winner(&self) -> Option<Player> {
        if self.phase == Phase::Move {
            self.state.winner()
        } else {
            None
        }
    }

    /// Cells the current player may black out after moving.
    fn candidate_mask(&self) -> u64 {
        self.state.blackout_pool(self.state.current_player.opponent())
    }

    fn required_blackouts(&self) -> usize {
        (self.candidate_mask().count_ones() as usize).min(2)
    }

    fn depth_for(&self, player: Player) -> u8 {
        match player {
            Player::Player1 => self.depths[0],
            Player::Player2 => self.depths[1],
        }
    }

    fn ensure_human_phase(&self, phase: Phase) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::Session("game is already over"));
        }
        if self.ai_player == Some(self.state.current_player) {
            return Err(GameError::Session("it is not the player's turn"));
        }
        if self.phase != phase {
            return Err(GameError::Session(match phase {
                Phase::Move => "the pawn has already moved this turn",
                Phase::Blackout => "the pawn has not moved yet",
            }));
        }
        Ok(())
    }

    fn end_turn(&mut self) {
        self.phase = Phase::Move;
        self.state.current_player = self.state.current_player.opponent();
        if let Some(winner) = self.state.winner() {
            info!("game over: {:?} wins", winner);
        }
    }
}
