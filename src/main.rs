use anyhow::Context as _;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{SeedableRng as _, rngs::StdRng};
use twenty_fourty_eight_engine::{
    board::{DEFAULT_TARGET, Tile},
    game::{Game, Rules},
    simulate, tui,
};

#[derive(Debug, Parser)]
#[command(version, about = "Sliding tile puzzle in the terminal")]
struct Cli {
    /// Width and height of the board
    #[arg(long, default_value_t = 4)]
    size: usize,

    /// Tile that wins the game
    #[arg(long, default_value_t = DEFAULT_TARGET)]
    target: Tile,

    /// Seed for reproducible tile spawns
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively (default)
    Play,
    /// Play random games without a terminal UI and print statistics
    Simulate {
        #[arg(short, long, default_value_t = 100)]
        games: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let rules = Rules {
        size: cli.size,
        target: cli.target,
    };
    rules.validate().context("invalid rules")?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    log::debug!("starting with {rules:?}, seed {:?}", cli.seed);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            let game = Game::new(rules, &mut rng)?;
            let game = tui::play(game, &mut rng)?;

            println!("{}", game.board());
            println!("score {} after {} moves", game.score(), game.moves());
        }
        Command::Simulate { games } => {
            let bar = ProgressBar::new(games);
            bar.set_style(ProgressStyle::with_template(
                "{bar:40} {pos}/{len} games {per_sec} eta {eta}",
            )?);

            let summary = simulate::simulate(rules, games, &mut rng, |_| bar.inc(1))?;
            bar.finish_and_clear();

            println!("games:      {}", summary.games);
            println!("mean score: {:.1}", summary.mean_score());
            println!("best score: {}", summary.best_score);
            println!("best tile:  {}", summary.best_tile);
            println!("mean moves: {:.1}", summary.mean_moves());
            println!("win rate:   {:.2}%", summary.win_rate() * 100.0);
        }
    }

    Ok(())
}
