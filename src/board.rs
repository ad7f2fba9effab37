use once_cell::sync::Lazy;

use crate::types::{Cell, Player, Position};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Squares at Chebyshev distance exactly 1, per square.
static NEIGHBORS: Lazy<[u64; NUM_SQUARES]> = Lazy::new(|| build_reach_table(1));
/// Squares at Chebyshev distance 1 or 2, per square.
static REACH_TWO: Lazy<[u64; NUM_SQUARES]> = Lazy::new(|| build_reach_table(2));

/// Isolation board represented by three bitboards.
///
/// Square index is `row * 8 + col`. Each pawn mask holds at most one bit.
/// Outside the crate a board only comes from `Board::empty` or a validated
/// `GameState`; raw masks are not accepted:
///
/// ```compile_fail
/// use isolation_blackout::board::Board;
///
/// let board = Board::from_bitboards(1, 1, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    player1: u64,
    player2: u64,
    blackout: u64,
}

impl Board {
    /// Creates a board with no pawns and no blacked-out cells.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Unchecked: callers inside the crate keep the masks disjoint.
    pub(crate) fn from_bitboards(player1: u64, player2: u64, blackout: u64) -> Self {
        Self {
            player1,
            player2,
            blackout,
        }
    }

    pub fn pawn_mask(&self, player: Player) -> u64 {
        match player {
            Player::Player1 => self.player1,
            Player::Player2 => self.player2,
        }
    }

    /// Square holding the player's pawn, if it is on the board.
    pub fn pawn_square(&self, player: Player) -> Option<usize> {
        let mask = self.pawn_mask(player);
        if mask == 0 {
            None
        } else {
            Some(mask.trailing_zeros() as usize)
        }
    }

    pub fn blackout_mask(&self) -> u64 {
        self.blackout
    }

    pub fn empty_mask(&self) -> u64 {
        !(self.player1 | self.player2 | self.blackout)
    }

    pub fn cell(&self, pos: usize) -> Cell {
        let square = bit(pos);
        if (self.blackout & square) != 0 {
            Cell::BlackedOut
        } else if (self.player1 & square) != 0 {
            Cell::Owned(Player::Player1)
        } else if (self.player2 & square) != 0 {
            Cell::Owned(Player::Player2)
        } else {
            Cell::Empty
        }
    }

    /// Empty squares adjacent to the player's pawn.
    pub fn legal_moves(&self, player: Player) -> u64 {
        self.pawn_square(player)
            .map_or(0, |pos| NEIGHBORS[pos] & self.empty_mask())
    }

    /// Empty squares within distance 2 of the player's pawn.
    pub fn extended_reach(&self, player: Player) -> u64 {
        self.pawn_square(player)
            .map_or(0, |pos| REACH_TWO[pos] & self.empty_mask())
    }

    /// Relocates the pawn without any checks. The vacated square becomes empty.
    pub fn set_pawn(&mut self, player: Player, pos: usize) {
        match player {
            Player::Player1 => self.player1 = bit(pos),
            Player::Player2 => self.player2 = bit(pos),
        }
    }

    /// Marks every square in `mask` as blacked out, replacing whatever was there.
    pub fn black_out(&mut self, mask: u64) {
        self.blackout |= mask;
        self.player1 &= !mask;
        self.player2 &= !mask;
    }

    /// Reverts `black_out` for squares that were empty when it was applied.
    pub(crate) fn restore(&mut self, mask: u64) {
        self.blackout &= !mask;
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1/2=pawn, 3=blacked out.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (pos, cell) in board.iter_mut().enumerate() {
            *cell = self.cell(pos).as_u8();
        }
        board
    }
}

/// Iterates the set bits of a mask column by column: column 0 top to
/// bottom, then column 1, and so on. Moves, blackout pools and blackout
/// pairs are all enumerated in this order.
pub struct Squares {
    mask: u64,
    ordinal: usize,
}

impl Iterator for Squares {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.mask != 0 && self.ordinal < NUM_SQUARES {
            let (col, row) = (self.ordinal / BOARD_SIZE, self.ordinal % BOARD_SIZE);
            self.ordinal += 1;
            let pos = row * BOARD_SIZE + col;
            if (self.mask & bit(pos)) != 0 {
                self.mask &= !bit(pos);
                return Some(pos);
            }
        }
        None
    }
}

pub fn squares(mask: u64) -> Squares {
    Squares { mask, ordinal: 0 }
}

pub fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

pub fn square_of(position: Position) -> Option<usize> {
    position
        .in_bounds()
        .then(|| position.row as usize * BOARD_SIZE + position.col as usize)
}

pub fn position_of(pos: usize) -> Position {
    Position::new((pos / BOARD_SIZE) as u8, (pos % BOARD_SIZE) as u8)
}

/// Mask of all in-bounds positions in the slice; out-of-bounds ones are dropped.
pub fn mask_of(positions: &[Position]) -> u64 {
    positions
        .iter()
        .filter_map(|&p| square_of(p))
        .fold(0, |mask, pos| mask | bit(pos))
}

fn build_reach_table(radius: i32) -> [u64; NUM_SQUARES] {
    let mut table = [0u64; NUM_SQUARES];
    for (pos, mask) in table.iter_mut().enumerate() {
        let (row, col) = pos_to_row_col(pos);
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (r, c) = (row + dr, col + dc);
                if in_bounds(r, c) {
                    *mask |= bit((r as usize) * BOARD_SIZE + c as usize);
                }
            }
        }
    }
    table
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(row: usize, col: usize) -> usize {
        row * BOARD_SIZE + col
    }

    #[test]
    fn corner_pawn_has_three_neighbors() {
        let board = Board::from_bitboards(bit(idx(0, 0)), bit(idx(7, 7)), 0);

        let expected = bit(idx(0, 1)) | bit(idx(1, 0)) | bit(idx(1, 1));

        assert_eq!(board.legal_moves(Player::Player1), expected);
    }

    #[test]
    fn center_pawn_reach_is_five_by_five_minus_center() {
        let board = Board::from_bitboards(bit(idx(3, 3)), bit(idx(7, 7)), 0);

        assert_eq!(board.legal_moves(Player::Player1).count_ones(), 8);
        assert_eq!(board.extended_reach(Player::Player1).count_ones(), 24);
    }

    #[test]
    fn occupied_and_blacked_cells_are_not_moves() {
        let blackout = bit(idx(0, 1));
        let board = Board::from_bitboards(bit(idx(0, 0)), bit(idx(1, 1)), blackout);

        assert_eq!(board.legal_moves(Player::Player1), bit(idx(1, 0)));
        assert_eq!(board.cell(idx(0, 1)), Cell::BlackedOut);
        assert_eq!(board.cell(idx(1, 1)), Cell::Owned(Player::Player2));
    }

    #[test]
    fn black_out_replaces_pawn_and_is_idempotent() {
        let mut board = Board::from_bitboards(bit(idx(2, 2)), bit(idx(5, 5)), 0);

        board.black_out(bit(idx(2, 2)) | bit(idx(4, 4)));
        let once = board;
        board.black_out(bit(idx(4, 4)));

        assert_eq!(board, once);
        assert_eq!(board.pawn_square(Player::Player1), None);
        assert_eq!(board.legal_moves(Player::Player1), 0);
        assert_eq!(board.to_array()[idx(4, 4)], 3);
    }

    #[test]
    fn set_pawn_vacates_previous_square() {
        let mut board = Board::from_bitboards(bit(idx(2, 0)), bit(idx(5, 7)), 0);

        board.set_pawn(Player::Player1, idx(3, 1));

        assert_eq!(board.cell(idx(2, 0)), Cell::Empty);
        assert_eq!(board.pawn_square(Player::Player1), Some(idx(3, 1)));
    }

    #[test]
    fn squares_iterate_column_by_column() {
        // (0,3), (2,1), (5,0), (1,1)
        let mask = bit(idx(0, 3)) | bit(idx(2, 1)) | bit(idx(5, 0)) | bit(idx(1, 1));

        assert_eq!(
            squares(mask).collect::<Vec<_>>(),
            vec![idx(5, 0), idx(1, 1), idx(2, 1), idx(0, 3)]
        );
    }

    #[test]
    fn neighbors_are_listed_column_by_column() {
        let board = Board::from_bitboards(bit(idx(2, 0)), bit(idx(5, 7)), 0);

        let moves: Vec<_> = squares(board.legal_moves(Player::Player1)).collect();

        assert_eq!(
            moves,
            vec![idx(1, 0), idx(3, 0), idx(1, 1), idx(2, 1), idx(3, 1)]
        );
    }

    #[test]
    fn mask_of_ignores_out_of_bounds_positions() {
        let mask = mask_of(&[Position::new(0, 0), Position::new(9, 1), Position::new(1, 8)]);

        assert_eq!(mask, bit(0));
    }
}
