use rand::Rng;

use crate::board::{Board, BoardError, DEFAULT_TARGET, Direction, Score, Tile, is_valid_tile};

/// Parameters fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub size: usize,
    pub target: Tile,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            size: 4,
            target: DEFAULT_TARGET,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.size < 2 {
            return Err(BoardError::TooSmall { size: self.size });
        }
        if self.target == 0 || !is_valid_tile(self.target) {
            return Err(BoardError::InvalidTile { value: self.target });
        }

        Ok(())
    }
}

/// What a single move request did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The game is over; nothing was evaluated.
    Blocked,
    /// The swipe did not change the board, so no tile was spawned.
    Unchanged,
    Moved {
        gained: Score,
        /// The target tile appeared for the first time this game.
        reached_target: bool,
        over: bool,
    },
}

/// A game session: the board plus the score and terminal flags derived from
/// the moves played so far.
#[derive(Debug, Clone)]
pub struct Game {
    rules: Rules,
    board: Board,
    score: Score,
    moves: u32,
    won: bool,
    over: bool,
}

impl Game {
    /// Starts a game on an empty board seeded with two random tiles.
    pub fn new<R: Rng + ?Sized>(rules: Rules, rng: &mut R) -> Result<Self, BoardError> {
        rules.validate()?;

        let board = Board::empty(rules.size)?
            .with_random_tile(rng)
            .with_random_tile(rng);

        Ok(Self::start(board, rules))
    }

    /// Resumes play from an arbitrary position with a zero score.
    pub fn from_board(board: Board, target: Tile) -> Result<Self, BoardError> {
        let rules = Rules {
            size: board.size(),
            target,
        };
        rules.validate()?;

        Ok(Self::start(board, rules))
    }

    fn start(board: Board, rules: Rules) -> Self {
        Self {
            won: board.has_reached(rules.target),
            over: board.is_terminal_loss(),
            rules,
            board,
            score: 0,
            moves: 0,
        }
    }

    /// Discards the current board and starts over with the same rules.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        log::debug!("restarting after {} moves, score {}", self.moves, self.score);

        let board = self
            .board
            .cleared()
            .with_random_tile(rng)
            .with_random_tile(rng);

        *self = Self::start(board, self.rules);
    }

    pub fn play<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> Step {
        if self.over {
            return Step::Blocked;
        }

        let outcome = self.board.swipe(direction);
        if !outcome.changed {
            return Step::Unchanged;
        }

        self.board = outcome.board.with_random_tile(rng);
        self.score += outcome.score;
        self.moves += 1;

        let reached_target = !self.won && self.board.has_reached(self.rules.target);
        if reached_target {
            log::debug!("reached {} after {} moves", self.rules.target, self.moves);
            self.won = true;
        }

        self.over = self.board.is_terminal_loss();
        if self.over {
            log::debug!("game over after {} moves, score {}", self.moves, self.score);
        }

        Step::Moved {
            gained: outcome.score,
            reached_target,
            over: self.over,
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn over(&self) -> bool {
        self.over
    }
}
