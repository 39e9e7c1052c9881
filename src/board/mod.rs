use std::fmt::{self, Write};

use thiserror::Error;

use crate::{Slide, slide_left, slide_right};

pub mod spawn;

pub type Tile = u32;
pub type Score = u64;

/// Largest tile a `Tile` can hold. Two of them stay side by side instead of
/// merging.
pub const MAX_TILE: Tile = 1 << (Tile::BITS - 1);

/// Tile that wins the game under the default rules.
pub const DEFAULT_TARGET: Tile = 2048;

/// A direction to swipe the tiles towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size must be at least 2, got {size}")]
    TooSmall { size: usize },
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("{value} is not a valid tile (expected 0 or a power of two >= 2)")]
    InvalidTile { value: Tile },
}

/// Square grid of tiles stored row-major. `0` marks an empty cell.
///
/// Boards are values: every operation returns a new board and leaves `self`
/// untouched, so two boards compare equal exactly when their cells do.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

/// A board after one swipe, before any tile is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    /// Sum of all tiles created by merges during the swipe.
    pub score: Score,
    /// Whether any cell differs from the board the swipe started from.
    pub changed: bool,
}

pub fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

impl Board {
    /// Creates an empty `size`x`size` board.
    ///
    /// # Errors
    /// Returns `BoardError::TooSmall` if `size < 2`.
    pub fn empty(size: usize) -> Result<Self, BoardError> {
        if size < 2 {
            return Err(BoardError::TooSmall { size });
        }

        Ok(Self {
            size,
            cells: vec![0; size * size],
        })
    }

    /// Builds a board from its rows, validating shape and tile values.
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, BoardError> {
        let size = rows.len();
        let mut board = Self::empty(size)?;

        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    len: cells.len(),
                    size,
                });
            }

            if let Some(&value) = cells.iter().find(|&&v| !is_valid_tile(v)) {
                return Err(BoardError::InvalidTile { value });
            }

            board.cells[row * size..(row + 1) * size].copy_from_slice(cells);
        }

        Ok(board)
    }

    pub fn from_array<const N: usize>(cells: [[Tile; N]; N]) -> Result<Self, BoardError> {
        Self::from_rows(&cells)
    }

    /// An empty board of the same size.
    pub fn cleared(&self) -> Self {
        Self {
            size: self.size,
            cells: vec![0; self.cells.len()],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, CellPosition { row, col }: CellPosition) -> Tile {
        self.cells[row * self.size + col]
    }

    /// Returns a copy of the board with `value` placed at `pos`.
    pub fn with_tile(&self, pos: CellPosition, value: Tile) -> Self {
        debug_assert!(is_valid_tile(value), "{value} is not a tile");

        let mut board = self.clone();
        board.cells[pos.row * self.size + pos.col] = value;
        board
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks_exact(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<CellPosition> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| CellPosition::new(i / self.size, i % self.size))
            .collect()
    }

    pub fn num_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    pub fn max_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn sum(&self) -> Score {
        self.cells.iter().map(|&v| Score::from(v)).sum()
    }

    /// Slide and merge every line towards `direction`.
    pub fn swipe(&self, direction: Direction) -> MoveOutcome {
        let size = self.size;
        let mut board = self.clone();
        let mut total = Slide::default();
        let mut add = |slide: Slide| {
            total.score += slide.score;
            total.moved |= slide.moved;
        };

        match direction {
            Direction::Left => board
                .cells
                .chunks_exact_mut(size)
                .for_each(|row| add(slide_left(row))),
            Direction::Right => board
                .cells
                .chunks_exact_mut(size)
                .for_each(|row| add(slide_right(row))),
            Direction::Up | Direction::Down => {
                let mut column = vec![0; size];

                for col in 0..size {
                    for (row, cell) in column.iter_mut().enumerate() {
                        *cell = board.cells[row * size + col];
                    }

                    let slide = match direction {
                        Direction::Up => slide_left(&mut column),
                        _ => slide_right(&mut column),
                    };

                    if slide.moved {
                        for (row, &cell) in column.iter().enumerate() {
                            board.cells[row * size + col] = cell;
                        }
                    }

                    add(slide);
                }
            }
        }

        log::trace!(
            "swipe {direction:?}: score +{}, changed={}",
            total.score,
            total.moved
        );

        MoveOutcome {
            board,
            score: total.score,
            changed: total.moved,
        }
    }

    pub fn swipe_left(&self) -> MoveOutcome {
        self.swipe(Direction::Left)
    }

    pub fn swipe_right(&self) -> MoveOutcome {
        self.swipe(Direction::Right)
    }

    pub fn swipe_up(&self) -> MoveOutcome {
        self.swipe(Direction::Up)
    }

    pub fn swipe_down(&self) -> MoveOutcome {
        self.swipe(Direction::Down)
    }

    /// True iff no swipe in any direction would change the board: the board is
    /// full and no two orthogonally adjacent tiles are equal.
    pub fn is_terminal_loss(&self) -> bool {
        let size = self.size;

        for row in 0..size {
            for col in 0..size {
                let value = self.cells[row * size + col];
                if value == 0 {
                    return false;
                }
                if value == MAX_TILE {
                    continue;
                }
                if col + 1 < size && value == self.cells[row * size + col + 1] {
                    return false;
                }
                if row + 1 < size && value == self.cells[(row + 1) * size + col] {
                    return false;
                }
            }
        }

        true
    }

    /// True iff some cell holds exactly `target`.
    pub fn has_reached(&self, target: Tile) -> bool {
        self.cells.contains(&target)
    }

    pub fn has_won(&self) -> bool {
        self.has_reached(DEFAULT_TARGET)
    }
}

impl fmt::Debug for Board {
    /// One hex digit per cell holding the tile's exponent, like `1` for 2 and `b` for 2048.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exponent = |v: Tile| if v == 0 { 0 } else { v.trailing_zeros() };
        let mut rows = self.rows();

        if let Some(row) = rows.next() {
            row.iter().try_for_each(|&c| write!(f, "{:2x}", exponent(c)))?
        }

        for row in rows {
            f.write_char('\n')?;
            row.iter().try_for_each(|&c| write!(f, "{:2x}", exponent(c)))?
        }

        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().max(1).ilog10() as usize + 1;

        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }

            for (j, &cell) in row.iter().enumerate() {
                if j > 0 {
                    f.write_char(' ')?;
                }
                match cell {
                    0 => write!(f, "{:>width$}", '.')?,
                    v => write!(f, "{v:>width$}")?,
                }
            }
        }

        Ok(())
    }
}

pub mod test_utils {
    use itertools::Itertools as _;
    use rand::Rng;
    use rand::seq::{IndexedRandom as _, SliceRandom as _};

    use super::{Board, Direction, MAX_TILE, Score, Tile};

    /// Random board with `filled` distinct tiles plus `duplicates` copies of
    /// some of them, shuffled over the grid.
    pub fn generate_random_board<R: Rng + ?Sized>(
        size: usize,
        filled: u32,
        duplicates: u32,
        rng: &mut R,
    ) -> Board {
        let mut nums: Vec<Tile> = (1..filled + 1).map(|e| 1 << e).collect_vec();

        // Add duplicates
        if !nums.is_empty() {
            let duplicates = (0..duplicates)
                .filter_map(|_| nums.choose(rng).copied())
                .collect_vec();

            nums.extend(duplicates);
        }

        nums.resize(size * size, 0);
        nums.shuffle(rng);

        Board { size, cells: nums }
    }

    /// Straightforward slide-left: drop zeros, merge adjacent pairs once,
    /// drop zeros again and pad.
    pub fn baseline_line(line: &[Tile]) -> (Vec<Tile>, Score) {
        let mut filtered = line.iter().copied().filter(|&v| v != 0).collect_vec();
        let mut score = 0;

        for i in 0..filtered.len().saturating_sub(1) {
            if filtered[i] == filtered[i + 1] && filtered[i] < MAX_TILE {
                filtered[i] *= 2;
                filtered[i + 1] = 0;
                score += Score::from(filtered[i]);
            }
        }

        let mut merged = filtered.into_iter().filter(|&v| v != 0).collect_vec();
        merged.resize(line.len(), 0);
        (merged, score)
    }

    pub fn reverse_rows(board: &Board) -> Board {
        let cells = board
            .rows()
            .flat_map(|row| row.iter().rev().copied())
            .collect();

        Board { size: board.size, cells }
    }

    pub fn transpose(board: &Board) -> Board {
        let size = board.size;
        let cells = (0..size * size)
            .map(|i| board.cells[(i % size) * size + i / size])
            .collect();

        Board { size, cells }
    }

    /// Reference swipe: every direction reduced to slide-left by reversal and
    /// transposition.
    pub fn baseline_swipe(board: &Board, direction: Direction) -> (Board, Score) {
        let left = |board: &Board| {
            let mut score = 0;
            let cells = board
                .rows()
                .flat_map(|row| {
                    let (line, gained) = baseline_line(row);
                    score += gained;
                    line
                })
                .collect();

            (Board { size: board.size, cells }, score)
        };

        match direction {
            Direction::Left => left(board),
            Direction::Right => {
                let (b, score) = left(&reverse_rows(board));
                (reverse_rows(&b), score)
            }
            Direction::Up => {
                let (b, score) = left(&transpose(board));
                (transpose(&b), score)
            }
            Direction::Down => {
                let (b, score) = baseline_swipe(&transpose(board), Direction::Right);
                (transpose(&b), score)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::{Rng as _, SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_construction() {
        assert_eq!(Board::empty(1), Err(BoardError::TooSmall { size: 1 }));
        let ragged: Vec<Vec<Tile>> = vec![vec![2, 0], vec![0]];
        assert_eq!(
            Board::from_rows(ragged.as_slice()),
            Err(BoardError::NotSquare { row: 1, len: 1, size: 2 })
        );
        assert_eq!(
            Board::from_array([[2, 3], [0, 0]]),
            Err(BoardError::InvalidTile { value: 3 })
        );
        assert_eq!(
            Board::from_array([[1, 0], [0, 0]]),
            Err(BoardError::InvalidTile { value: 1 })
        );

        let board = Board::from_array([[2, 0, 4], [0, 0, 0], [8, 0, 2048]]).unwrap();
        assert_eq!(board.size(), 3);
        assert_eq!(board.get(CellPosition::new(2, 2)), 2048);
        assert_eq!(board.to_rows(), vec![vec![2, 0, 4], vec![0, 0, 0], vec![8, 0, 2048]]);
    }

    #[test]
    fn test_max_tile() {
        let board = Board::from_array([[MAX_TILE, MAX_TILE], [0, 0]]).unwrap();
        let outcome = board.swipe_left();
        assert_eq!(outcome.board, board);
        assert_eq!(outcome.score, 0);
        assert!(!outcome.changed);

        let half = Board::from_array([[MAX_TILE / 2, MAX_TILE / 2], [0, 0]]).unwrap();
        let outcome = half.swipe_left();
        assert_eq!(outcome.board, Board::from_array([[MAX_TILE, 0], [0, 0]]).unwrap());
        assert_eq!(outcome.score, Score::from(MAX_TILE));

        let stuck = Board::from_array([[MAX_TILE, MAX_TILE], [MAX_TILE, MAX_TILE]]).unwrap();
        assert!(stuck.is_terminal_loss());
        assert!(Direction::ALL.iter().all(|&d| !stuck.swipe(d).changed));
    }

    #[test]
    fn test_scenario_row() {
        let board = Board::from_array([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]).unwrap();
        let outcome = board.swipe_left();

        assert_eq!(outcome.board.to_rows()[0], [4, 8, 0, 0]);
        assert_eq!(outcome.score, 12);
        assert!(outcome.changed);
        // input untouched
        assert_eq!(board.to_rows()[0], [2, 2, 4, 4]);
    }

    #[test]
    fn test_no_op() {
        let board = Board::from_array([[8, 4, 2, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let outcome = board.swipe_left();

        assert_eq!(outcome.board, board);
        assert_eq!(outcome.score, 0);
        assert!(!outcome.changed);
    }

    #[test]
    fn test_columns() {
        let board = Board::from_array([[2, 0, 4], [2, 4, 0], [4, 4, 4]]).unwrap();

        let up = board.swipe_up();
        assert_eq!(up.board, Board::from_array([[4, 8, 8], [4, 0, 0], [0, 0, 0]]).unwrap());
        assert_eq!(up.score, 4 + 8 + 8);

        let down = board.swipe_down();
        assert_eq!(down.board, Board::from_array([[0, 0, 0], [4, 0, 0], [4, 8, 8]]).unwrap());
        assert_eq!(down.score, 4 + 8 + 8);

        let right = board.swipe_right();
        assert_eq!(right.board, Board::from_array([[0, 2, 4], [0, 2, 4], [0, 4, 8]]).unwrap());
        assert_eq!(right.score, 8);
    }

    #[test]
    fn test_against_baseline() {
        const N: u32 = 20;
        let rng = &mut StdRng::seed_from_u64(7);

        for size in 2..=6 {
            let cells = size as u32 * size as u32;
            let cases = (0..=cells)
                .cartesian_product(0..4)
                .cartesian_product(0..N)
                .map(|((filled, dup), _)| {
                    test_utils::generate_random_board(size, filled.min(16), dup, rng)
                })
                .collect_vec();

            for board in cases {
                for direction in Direction::ALL {
                    let outcome = board.swipe(direction);
                    let (expected, score) = test_utils::baseline_swipe(&board, direction);

                    assert_eq!(
                        outcome.board, expected,
                        "Mismatch for {direction:?} on board:\n{board:?}"
                    );
                    assert_eq!(outcome.score, score);
                    assert_eq!(outcome.changed, expected != board);
                    // merges keep the sum, the score is the sum of the merged tiles
                    assert_eq!(outcome.board.sum(), board.sum());
                    assert!(outcome.score <= outcome.board.sum());
                    assert!(outcome.board.num_empty() >= board.num_empty());
                }
            }
        }
    }

    #[test]
    fn test_direction_symmetry() {
        let rng = &mut StdRng::seed_from_u64(11);

        for filled in 0..16 {
            let board = test_utils::generate_random_board(4, filled, 3, rng);
            let reversed = test_utils::reverse_rows(&board);

            assert_eq!(
                reversed.swipe_left().board,
                test_utils::reverse_rows(&board.swipe_right().board)
            );

            let transposed = test_utils::transpose(&board);
            assert_eq!(
                transposed.swipe_left().board,
                test_utils::transpose(&board.swipe_up().board)
            );
        }
    }

    #[test]
    fn test_terminal_loss() {
        let locked = Board::from_array([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        assert!(locked.is_terminal_loss());
        assert!(Direction::ALL.iter().all(|&d| !locked.swipe(d).changed));

        let horizontal = locked.with_tile(CellPosition::new(0, 1), 2);
        assert!(!horizontal.is_terminal_loss());

        let vertical = locked.with_tile(CellPosition::new(3, 3), 4);
        assert!(!vertical.is_terminal_loss());

        let with_gap = locked.with_tile(CellPosition::new(1, 1), 0);
        assert!(!with_gap.is_terminal_loss());

        assert!(!Board::empty(4).unwrap().is_terminal_loss());
    }

    #[test]
    fn test_terminal_matches_swipes() {
        let rng = &mut StdRng::seed_from_u64(3);

        for _ in 0..500 {
            let filled = rng.random_range(3..=9);
            let board = test_utils::generate_random_board(3, filled, 9 - filled, rng);
            let stuck = Direction::ALL.iter().all(|&d| !board.swipe(d).changed);
            assert_eq!(board.is_terminal_loss(), stuck, "board:\n{board:?}");
        }
    }

    #[test]
    fn test_reached_target() {
        let board = Board::from_array([
            [2, 4, 8, 16],
            [32, 2048, 64, 128],
            [0, 0, 0, 0],
            [2, 2, 2, 2],
        ])
        .unwrap();
        assert!(board.has_won());
        assert!(board.has_reached(2048));
        assert!(!board.has_reached(4096));

        let almost = board.with_tile(CellPosition::new(1, 1), 1024);
        assert!(!almost.has_won());
        assert!(almost.has_reached(1024));
    }

    #[test]
    fn test_empty_cells() {
        let board = Board::from_array([[2, 0], [0, 4]]).unwrap();
        assert_eq!(board.empty_cells(), vec![CellPosition::new(0, 1), CellPosition::new(1, 0)]);
        assert_eq!(board.num_empty(), 2);
        assert_eq!(board.max_tile(), 4);
        assert_eq!(board.sum(), 6);
    }

    #[test]
    fn test_format() {
        let board = Board::from_array([[2, 0], [128, 2048]]).unwrap();
        assert_eq!(format!("{board}"), "   2    .\n 128 2048");
        assert_eq!(format!("{board:?}"), " 1 0\n 7 b");
    }
}
