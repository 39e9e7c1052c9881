use crossterm::{
    QueueableCommand,
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use rand::Rng;
use std::io::{self, Write};

use crate::{
    board::{Direction, Tile},
    game::{Game, Step},
};

/// Input understood by the terminal frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    NewGame,
    Continue,
    Quit,
}

pub fn command_for(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Up | KeyCode::Char('k' | 'w') => Command::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j' | 's') => Command::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('h' | 'a') => Command::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l' | 'd') => Command::Move(Direction::Right),
        KeyCode::Char('r' | 'n') => Command::NewGame,
        KeyCode::Char('c') | KeyCode::Enter => Command::Continue,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };

    Some(command)
}

/// Overlay drawn on top of the board. Moves are ignored while one is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Won,
    Over,
}

/// Session state of the frontend: the game and which overlay is up.
pub struct Session {
    pub game: Game,
    pub overlay: Overlay,
}

impl Session {
    pub fn new(game: Game) -> Self {
        let overlay = if game.over() { Overlay::Over } else { Overlay::None };
        Self { game, overlay }
    }

    /// Applies a command, returning `false` once the player quits.
    pub fn handle<R: Rng + ?Sized>(&mut self, command: Command, rng: &mut R) -> bool {
        match (command, self.overlay) {
            (Command::Quit, _) => return false,
            (Command::NewGame, _) => {
                self.game.restart(rng);
                self.overlay = Overlay::None;
            }
            (Command::Continue, Overlay::Won) => self.overlay = Overlay::None,
            (Command::Move(direction), Overlay::None) => {
                if let Step::Moved {
                    reached_target,
                    over,
                    ..
                } = self.game.play(direction, rng)
                {
                    if over {
                        self.overlay = Overlay::Over;
                    } else if reached_target {
                        self.overlay = Overlay::Won;
                    }
                }
            }
            _ => {}
        }

        true
    }
}

/// Runs the interactive game until the player quits.
pub fn play<R: Rng + ?Sized>(game: Game, rng: &mut R) -> io::Result<Game> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let mut session = Session::new(game);
    let result = event_loop(&mut stdout, &mut session, rng);

    execute!(stdout, LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;

    result.map(|()| session.game)
}

fn event_loop<R: Rng + ?Sized>(
    stdout: &mut io::Stdout,
    session: &mut Session,
    rng: &mut R,
) -> io::Result<()> {
    loop {
        draw(stdout, session)?;

        // Handle input
        let event = event::read()?;
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            let Some(command) = command_for(code) else {
                continue;
            };

            if !session.handle(command, rng) {
                return Ok(());
            }
        }
    }
}

fn draw(stdout: &mut io::Stdout, session: &Session) -> io::Result<()> {
    let game = &session.game;
    let board = game.board();
    let width = board.max_tile().max(1000).ilog10() as usize + 2;

    stdout.queue(Clear(ClearType::All))?;
    stdout.queue(MoveTo(0, 0))?;
    stdout.queue(Print(format!(
        "score {}  moves {}\r\n\r\n",
        game.score(),
        game.moves()
    )))?;

    for row in board.rows() {
        for &val in row {
            let text = match val {
                0 => format!("{:>width$}", '.'),
                v => format!("{v:>width$}"),
            };

            stdout
                .queue(SetForegroundColor(get_color(val)))?
                .queue(SetBackgroundColor(Color::Reset))?
                .queue(Print(text))?
                .queue(ResetColor)?;
        }

        stdout.queue(Print("\r\n"))?;
    }

    let target = game.rules().target;
    let footer = match session.overlay {
        Overlay::None => "arrows/hjkl/wasd move, r new game, q quit".to_owned(),
        Overlay::Won => format!("You reached {target}! c continue, r new game, q quit"),
        Overlay::Over => "Game over. r new game, q quit".to_owned(),
    };

    stdout.queue(Print(format!("\r\n{footer}\r\n")))?;
    stdout.flush()
}

fn get_color(v: Tile) -> Color {
    match v {
        0 => Color::DarkGrey,
        2 | 4 => Color::White,
        8..=64 => Color::Yellow,
        128..=1024 => Color::Magenta,
        _ => Color::Red,
    }
}
