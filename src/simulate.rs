use rand::Rng;
use rand::seq::IndexedRandom as _;

use crate::{
    board::{BoardError, Direction, Score, Tile},
    game::{Game, Rules, Step},
};

/// Aggregate results of a batch of random games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub games: u64,
    pub wins: u64,
    pub total_score: Score,
    pub best_score: Score,
    pub best_tile: Tile,
    pub total_moves: u64,
}

impl Summary {
    pub fn record(&mut self, game: &Game) {
        self.games += 1;
        self.wins += u64::from(game.won());
        self.total_score += game.score();
        self.best_score = self.best_score.max(game.score());
        self.best_tile = self.best_tile.max(game.board().max_tile());
        self.total_moves += u64::from(game.moves());
    }

    pub fn mean_score(&self) -> f64 {
        self.total_score as f64 / self.games.max(1) as f64
    }

    pub fn mean_moves(&self) -> f64 {
        self.total_moves as f64 / self.games.max(1) as f64
    }

    pub fn win_rate(&self) -> f64 {
        self.wins as f64 / self.games.max(1) as f64
    }
}

/// Plays uniformly random moves that change the board until the game is over.
pub fn play_random_game<R: Rng + ?Sized>(rules: Rules, rng: &mut R) -> Result<Game, BoardError> {
    let mut game = Game::new(rules, rng)?;

    while !game.over() {
        let moves: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| game.board().swipe(d).changed)
            .collect();

        let Some(&direction) = moves.choose(rng) else {
            break;
        };

        let step = game.play(direction, rng);
        debug_assert!(
            matches!(step, Step::Moved { .. }),
            "{direction:?} changes the board but got {step:?}"
        );
    }

    log::trace!(
        "finished after {} moves: score {}, best tile {}",
        game.moves(),
        game.score(),
        game.board().max_tile()
    );

    Ok(game)
}

/// Plays `games` random games, calling `on_game` after each one.
pub fn simulate<R, F>(
    rules: Rules,
    games: u64,
    rng: &mut R,
    mut on_game: F,
) -> Result<Summary, BoardError>
where
    R: Rng + ?Sized,
    F: FnMut(&Game),
{
    let mut summary = Summary::default();

    for _ in 0..games {
        let game = play_random_game(rules, rng)?;
        summary.record(&game);
        on_game(&game);
    }

    Ok(summary)
}
