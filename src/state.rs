use serde::{Deserialize, Serialize};

use crate::board::{Board, mask_of, position_of, square_of, squares};
use crate::error::GameError;
use crate::types::{Cell, Player, Position, TargetingMode};

pub const DEFAULT_PLAYER1_START: Position = Position::new(2, 0);
pub const DEFAULT_PLAYER2_START: Position = Position::new(5, 7);

/// Everything needed to set up a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSetup {
    pub player1_start: Position,
    pub player2_start: Position,
    pub first_player: Player,
    pub targeting: TargetingMode,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            player1_start: DEFAULT_PLAYER1_START,
            player2_start: DEFAULT_PLAYER2_START,
            first_player: Player::Player1,
            targeting: TargetingMode::Adjacent,
        }
    }
}

/// Board, side to move and blackout targeting rule of one game.
///
/// Turn ownership belongs to the caller: nothing here flips
/// `current_player` except the search's own bookkeeping, which it undoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    pub current_player: Player,
    targeting: TargetingMode,
}

impl GameState {
    /// Creates a game with both pawns on their default cells.
    pub fn new(first_player: Player, targeting: TargetingMode) -> Self {
        let mut board = Board::empty();
        for (player, start) in [
            (Player::Player1, DEFAULT_PLAYER1_START),
            (Player::Player2, DEFAULT_PLAYER2_START),
        ] {
            if let Some(pos) = square_of(start) {
                board.set_pawn(player, pos);
            }
        }
        Self {
            board,
            current_player: first_player,
            targeting,
        }
    }

    /// Creates a game from an explicit setup.
    /// Fails with `InvalidPlacement` when a start cell is off the board or taken.
    pub fn from_setup(setup: &GameSetup) -> Result<Self, GameError> {
        let mut board = Board::empty();
        for (player, start) in [
            (Player::Player1, setup.player1_start),
            (Player::Player2, setup.player2_start),
        ] {
            let pos = square_of(start).ok_or(GameError::InvalidPlacement {
                player,
                position: start,
                reason: "outside the board",
            })?;
            if board.cell(pos) != Cell::Empty {
                return Err(GameError::InvalidPlacement {
                    player,
                    position: start,
                    reason: "cell already occupied",
                });
            }
            board.set_pawn(player, pos);
        }
        Ok(Self {
            board,
            current_player: setup.first_player,
            targeting: setup.targeting,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_board(board: Board, current_player: Player, targeting: TargetingMode) -> Self {
        Self {
            board,
            current_player,
            targeting,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn targeting(&self) -> TargetingMode {
        self.targeting
    }

    pub fn cell(&self, position: Position) -> Result<Cell, GameError> {
        let pos = square_of(position).ok_or(GameError::OutOfBounds(position))?;
        Ok(self.board.cell(pos))
    }

    pub fn pawn_position(&self, player: Player) -> Option<Position> {
        self.board.pawn_square(player).map(position_of)
    }

    /// Cells the player's pawn may move to, column by column.
    pub fn legal_moves(&self, player: Player) -> Vec<Position> {
        squares(self.board.legal_moves(player)).map(position_of).collect()
    }

    /// Empty cells within distance 2 of the player's pawn, column by column.
    pub fn extended_reach(&self, player: Player) -> Vec<Position> {
        squares(self.board.extended_reach(player)).map(position_of).collect()
    }

    /// Cells the opponent of a mover may black out around `target`'s pawn.
    pub fn blackout_pool(&self, target: Player) -> u64 {
        match self.targeting {
            TargetingMode::Adjacent => self.board.legal_moves(target),
            TargetingMode::Extended => self.board.extended_reach(target),
        }
    }

    /// Moves the player's pawn to `destination`, which must be an empty cell.
    /// On error the state is left unchanged.
    pub fn apply_move(&mut self, player: Player, destination: Position) -> Result<(), GameError> {
        let invalid = |reason| GameError::InvalidMove {
            player,
            position: destination,
            reason,
        };
        let pos = square_of(destination).ok_or_else(|| invalid("outside the board"))?;
        if self.board.cell(pos) != Cell::Empty {
            return Err(invalid("destination is not empty"));
        }
        if self.board.pawn_square(player).is_none() {
            return Err(invalid("pawn is not on the board"));
        }
        self.board.set_pawn(player, pos);
        Ok(())
    }

    /// Blacks out every in-bounds cell given; cells off the board are ignored.
    pub fn apply_blackouts(&mut self, cells: &[Position]) {
        self.board.black_out(mask_of(cells));
    }

    /// True when the player to move has nowhere to go.
    pub fn is_terminal(&self) -> bool {
        self.board.legal_moves(self.current_player) == 0
    }

    /// Scores the position from Player2's point of view.
    ///
    /// A stuck Player1 is `+inf`, a stuck Player2 is `-inf`; otherwise the
    /// score is Player2's move count minus Player1's.
    pub fn evaluate(&self) -> f32 {
        if self.is_terminal() {
            return match self.current_player {
                Player::Player1 => f32::INFINITY,
                Player::Player2 => f32::NEG_INFINITY,
            };
        }
        let p2 = self.board.legal_moves(Player::Player2).count_ones() as f32;
        let p1 = self.board.legal_moves(Player::Player1).count_ones() as f32;
        p2 - p1
    }

    /// The winner once the player to move is stuck.
    pub fn winner(&self) -> Option<Player> {
        self.is_terminal().then(|| self.current_player.opponent())
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(p1: Position, p2: Position, blackouts: &[Position]) -> GameState {
        let setup = GameSetup {
            player1_start: p1,
            player2_start: p2,
            ..GameSetup::default()
        };
        let mut state = GameState::from_setup(&setup).unwrap();
        state.apply_blackouts(blackouts);
        state
    }

    #[test]
    fn default_game_places_pawns_on_reference_cells() {
        let state = GameState::new(Player::Player1, TargetingMode::Adjacent);

        assert_eq!(state.pawn_position(Player::Player1), Some(Position::new(2, 0)));
        assert_eq!(state.pawn_position(Player::Player2), Some(Position::new(5, 7)));
        assert_eq!(state.legal_moves(Player::Player1).len(), 5);
        assert_eq!(state.legal_moves(Player::Player2).len(), 5);
        assert_eq!(state.evaluate(), 0.0);
    }

    #[test]
    fn placement_off_board_or_on_same_cell_is_rejected() {
        let off = GameSetup {
            player1_start: Position::new(8, 0),
            ..GameSetup::default()
        };
        let same = GameSetup {
            player1_start: Position::new(4, 4),
            player2_start: Position::new(4, 4),
            ..GameSetup::default()
        };

        assert!(matches!(
            GameState::from_setup(&off),
            Err(GameError::InvalidPlacement { player: Player::Player1, .. })
        ));
        assert!(matches!(
            GameState::from_setup(&same),
            Err(GameError::InvalidPlacement { player: Player::Player2, .. })
        ));
    }

    #[test]
    fn apply_move_rejects_occupied_destination_and_keeps_state() {
        let mut state = state_with(Position::new(0, 0), Position::new(0, 1), &[Position::new(1, 0)]);
        let before = state;

        let onto_pawn = state.apply_move(Player::Player1, Position::new(0, 1));
        let onto_blackout = state.apply_move(Player::Player1, Position::new(1, 0));
        let off_board = state.apply_move(Player::Player1, Position::new(0, 9));

        assert!(matches!(onto_pawn, Err(GameError::InvalidMove { .. })));
        assert!(matches!(onto_blackout, Err(GameError::InvalidMove { .. })));
        assert!(matches!(off_board, Err(GameError::InvalidMove { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn apply_move_relocates_pawn() {
        let mut state = GameState::new(Player::Player1, TargetingMode::Adjacent);

        state.apply_move(Player::Player1, Position::new(3, 1)).unwrap();

        assert_eq!(state.cell(Position::new(2, 0)).unwrap(), Cell::Empty);
        assert_eq!(
            state.cell(Position::new(3, 1)).unwrap(),
            Cell::Owned(Player::Player1)
        );
    }

    #[test]
    fn blackouts_are_idempotent_and_ignore_off_board_cells() {
        let mut state = GameState::new(Player::Player1, TargetingMode::Adjacent);
        let cells = [Position::new(4, 4), Position::new(8, 8)];

        state.apply_blackouts(&cells);
        let once = state;
        state.apply_blackouts(&cells);

        assert_eq!(state, once);
        assert_eq!(state.cell(Position::new(4, 4)).unwrap(), Cell::BlackedOut);
        assert_eq!(state.board().blackout_mask().count_ones(), 1);
    }

    #[test]
    fn evaluate_is_mobility_difference_when_not_terminal() {
        // Player1 in a corner (3 moves), Player2 in the middle (8 moves).
        let state = state_with(Position::new(0, 0), Position::new(4, 4), &[]);

        assert_eq!(state.evaluate(), 5.0);
    }

    #[test]
    fn stuck_player1_scores_positive_infinity() {
        let mut state = state_with(
            Position::new(0, 0),
            Position::new(5, 5),
            &[Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)],
        );
        state.current_player = Player::Player1;

        assert!(state.is_terminal());
        assert_eq!(state.evaluate(), f32::INFINITY);
        assert_eq!(state.winner(), Some(Player::Player2));
    }

    #[test]
    fn stuck_player2_scores_negative_infinity() {
        let mut state = state_with(
            Position::new(3, 3),
            Position::new(7, 7),
            &[Position::new(6, 6), Position::new(6, 7), Position::new(7, 6)],
        );
        state.current_player = Player::Player2;

        assert!(state.is_terminal());
        assert_eq!(state.evaluate(), f32::NEG_INFINITY);
        assert_eq!(state.winner(), Some(Player::Player1));
    }

    #[test]
    fn extended_reach_includes_distance_two() {
        let state = state_with(Position::new(0, 0), Position::new(7, 7), &[]);

        let reach = state.extended_reach(Player::Player1);

        assert_eq!(reach.len(), 8);
        assert!(reach.contains(&Position::new(2, 2)));
        assert!(!reach.contains(&Position::new(0, 3)));
    }
}
