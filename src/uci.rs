use std::io::{self, BufRead, Write};

use anyhow::Result;
use cozy_chess::Color;
use tracing::{debug, warn};

use crate::board::Position;
use crate::config::EngineConfig;
use crate::movegen::{MoveGenerator, RulesEngine};
use crate::selector::{Decision, MoveSelector};

pub struct UciHandler {
    position: Position,
    move_generator: MoveGenerator,
    config: EngineConfig,
    selector: MoveSelector,
}

impl UciHandler {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let selector = MoveSelector::seeded(config.clone())?;
        Ok(UciHandler {
            position: Position::new(),
            move_generator: MoveGenerator::new(),
            config,
            selector,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let command = line.trim();
            if command == "quit" {
                break;
            }

            let response = self.handle_command(command)?;
            if !response.is_empty() {
                write!(stdout, "{}", response)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match parts[0] {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => self.handle_ucinewgame(),
            "position" => Ok(self.handle_position(&parts[1..])),
            "go" => Ok(self.handle_go(&parts[1..])),
            "quit" => Ok("".to_string()),
            other => {
                debug!(command = other, "ignoring unknown command");
                Ok("".to_string())
            }
        }
    }

    fn handle_uci(&self) -> String {
        "id name Riposte\nid author Riposte developers\nuciok\n".to_string()
    }

    fn handle_ucinewgame(&mut self) -> Result<String> {
        self.position = Position::new();
        self.selector = MoveSelector::seeded(self.config.clone())?;
        Ok("".to_string())
    }

    fn handle_position(&mut self, parts: &[&str]) -> String {
        let moves_at = parts.iter().position(|&p| p == "moves");
        let (setup, moves) = match moves_at {
            Some(i) => (&parts[..i], &parts[i + 1..]),
            None => (parts, &parts[parts.len()..]),
        };

        let base = match setup.first() {
            Some(&"startpos") => Position::new(),
            Some(&"fen") => match Position::from_fen(&setup[1..].join(" ")) {
                Ok(position) => position,
                Err(e) => {
                    warn!("{}", e);
                    return "".to_string();
                }
            },
            _ => {
                warn!(args = %parts.join(" "), "malformed position command");
                return "".to_string();
            }
        };

        self.position = base;
        for move_str in moves {
            match self.move_generator.parse_move(&self.position, move_str) {
                Ok(mv) => self.position = self.move_generator.apply_move(&self.position, &mv),
                Err(e) => {
                    warn!("{}", e);
                    break;
                }
            }
        }
        "".to_string()
    }

    fn handle_go(&mut self, parts: &[&str]) -> String {
        let mut depth = self.config.depth;
        for i in 0..parts.len() {
            if parts[i] == "depth" {
                if let Some(d) = parts.get(i + 1).and_then(|s| s.parse::<u32>().ok()) {
                    depth = d;
                }
            }
        }

        let previous = self.selector.depth();
        if let Err(e) = self.selector.set_depth(depth) {
            warn!("{}, searching at depth {}", e, previous);
        }
        let searched = self.selector.depth();
        let decision = self.selector.choose_move(&self.position);
        if self.selector.set_depth(previous).is_err() {
            debug!(depth = previous, "could not restore search depth");
        }

        match decision {
            Decision::Play(choice) => {
                let score = match self.position.side_to_move() {
                    Color::White => choice.score,
                    Color::Black => -choice.score,
                };
                format!(
                    "info depth {} score cp {} nodes {} pv {}\nbestmove {}\n",
                    searched,
                    score,
                    choice.nodes,
                    choice.mv,
                    choice.mv
                )
            }
            Decision::GameOver(state) => {
                debug!(?state, "go in a finished game");
                "bestmove (none)\n".to_string()
            }
        }
    }
}
