//! Line-oriented text protocol, modelled on GTP.
//!
//! Each input line is an optional numeric id followed by a command and its
//! arguments. Responses are framed the GTP way: `=id result` on success,
//! `?id message` on failure, each followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `newgame` - Reset to the opening array, red to move
//! - `setboard <text> [side]` - Load a board in board-text form
//! - `difficulty easy|medium|hard`
//! - `play <move>` - Play a move such as `h7e7` for the side to move
//! - `genmove` - Let the engine move for the side to move
//! - `moves [square]` - Legal moves for the side to move, or for one piece
//! - `checked <side>` - Whether `side`'s general is attacked
//! - `status`, `showboard`, `undo`

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};

use crate::board::{Board, Side, Square, parse_move_text};
use crate::game::Game;
use crate::rules::{is_checked, legal_moves};
use crate::search::{Difficulty, Engine};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "checked",
    "difficulty",
    "genmove",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "newgame",
    "play",
    "protocol_version",
    "quit",
    "setboard",
    "showboard",
    "status",
    "undo",
    "version",
];

/// Protocol front end around a [`Game`].
pub struct Protocol {
    game: Game,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::new(Engine::default())
    }
}

impl Protocol {
    pub fn new(engine: Engine) -> Self {
        Self {
            game: Game::new(engine),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (prefix, message) = match self.execute(&command, args) {
                Ok(message) => ('=', message),
                Err(err) => ('?', err.to_string()),
            };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n").context("failed to write response")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return its response text.
    pub fn execute(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("2".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let name = first_arg(args)?;
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "newgame" => {
                self.game.reset();
                Ok(String::new())
            }

            "setboard" => {
                let board = Board::from_text(first_arg(args)?)?;
                let side = match args.get(1) {
                    Some(s) => s.parse::<Side>()?,
                    None => Side::Red,
                };
                self.game.set_position(board, side);
                Ok(String::new())
            }

            "difficulty" => {
                let level: Difficulty = first_arg(args)?.parse()?;
                self.game.set_difficulty(level);
                Ok(String::new())
            }

            "play" => {
                let (from, to) = parse_move_text(first_arg(args)?)?;
                let record = self.game.play(from, to)?;
                Ok(record.mv.to_string())
            }

            "genmove" => match self.game.engine_move()? {
                Some(record) => Ok(record.mv.to_string()),
                None => Ok("none".to_string()),
            },

            "moves" => {
                let moves: Vec<String> = match args.first() {
                    Some(s) => {
                        let square: Square = s.parse()?;
                        self.game
                            .valid_moves(square)
                            .iter()
                            .map(|to| format!("{square}{to}"))
                            .collect()
                    }
                    None => legal_moves(self.game.board(), self.game.to_move())
                        .iter()
                        .map(|mv| mv.to_string())
                        .collect(),
                };
                Ok(moves.join(" "))
            }

            "checked" => {
                let side: Side = first_arg(args)?.parse()?;
                Ok(is_checked(side, self.game.board()).to_string())
            }

            "status" => Ok(self.game.status().to_string()),

            "showboard" => Ok(format!(
                "\n{}{} to move",
                self.game.board(),
                self.game.to_move()
            )),

            "undo" => {
                let record = self.game.undo()?;
                Ok(record.mv.to_string())
            }

            _ => bail!("unknown command: {command}"),
        }
    }
}

fn first_arg<'a>(args: &[&'a str]) -> Result<&'a str> {
    args.first().copied().ok_or_else(|| anyhow!("missing argument"))
}
