//! A fixed-depth alpha-beta chess opponent.
//!
//! The core (evaluation, search and move selection) is written against the
//! [`RulesEngine`] trait; [`MoveGenerator`] implements it on top of
//! `cozy-chess`.

pub mod board;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod hanging;
pub mod movegen;
pub mod pawns;
pub mod search;
pub mod selector;
pub mod tables;
pub mod uci;
pub mod worker;

pub use board::Position;
pub use config::{EngineConfig, EvalWeights, TieBreak};
pub use error::{EngineError, EngineResult};
pub use evaluation::{EvalBreakdown, Evaluator, Score};
pub use movegen::{GameState, Move, MoveGenerator, RulesEngine};
pub use search::{Search, SearchResult, SCORE_INFINITY};
pub use selector::{Choice, Decision, MoveSelector, SelectionReason};
pub use worker::{spawn_choose_move, PendingMove};

pub use cozy_chess::{Color, Piece, Square};
