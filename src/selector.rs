use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use cozy_chess::Color;

use crate::board::Position;
use crate::config::{EngineConfig, TieBreak};
use crate::error::EngineResult;
use crate::evaluation::{Evaluator, Score};
use crate::hanging::{hanging_pieces, is_free_capture};
use crate::movegen::{GameState, Move, MoveGenerator, RulesEngine};
use crate::search::{Search, SearchResult, SCORE_INFINITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Took a piece nobody was defending.
    HangingCapture,
    /// The move's subtree reproduces the root search score.
    BestScore,
    /// Nothing matched the search score; picked at random.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub mv: Move,
    /// The position after `mv`.
    pub position: Position,
    /// Root search score, White's point of view.
    pub score: Score,
    pub reason: SelectionReason,
    pub nodes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Play(Choice),
    /// The side to move had no legal move; nothing was searched.
    GameOver(GameState),
}

impl Decision {
    pub fn choice(&self) -> Option<&Choice> {
        match self {
            Decision::Play(choice) => Some(choice),
            Decision::GameOver(_) => None,
        }
    }
}

/// Plays one engine turn: search, hanging-piece override, best-score match
/// with tie-breaking, and a random legal fallback.
pub struct MoveSelector<R = StdRng, E: RulesEngine = MoveGenerator> {
    search: Search<E>,
    config: EngineConfig,
    rng: R,
}

impl MoveSelector {
    /// Selector over `cozy-chess` whose random choices replay from
    /// `config.seed`.
    pub fn seeded(config: EngineConfig) -> EngineResult<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::new(config, MoveGenerator::new(), rng)
    }
}

impl<R: Rng, E: RulesEngine> MoveSelector<R, E> {
    pub fn new(config: EngineConfig, rules: E, rng: R) -> EngineResult<Self> {
        config.validate()?;
        let evaluator = Evaluator::with_weights(config.weights);
        Ok(Self {
            search: Search::with_parts(rules, evaluator),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn depth(&self) -> u32 {
        self.config.depth
    }

    /// Changes the search depth for later turns. Out-of-range depths are
    /// rejected and leave the current one in place.
    pub fn set_depth(&mut self, depth: u32) -> EngineResult<()> {
        let config = self.config.clone().with_depth(depth);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn rules(&self) -> &E {
        self.search.rules()
    }

    pub fn evaluator(&self) -> &Evaluator {
        self.search.evaluator()
    }

    pub fn choose_move(&mut self, position: &Position) -> Decision {
        let state = self.rules().game_state(position);
        let moves = self.rules().legal_moves(position);
        if moves.is_empty() {
            debug!(?state, fen = %position.to_fen(), "no move to choose");
            return Decision::GameOver(state);
        }
        let maximizing = position.side_to_move() == Color::White;
        let depth = self.config.depth;

        let root = if state.is_over() {
            debug!(?state, "drawn by rule, playing on");
            self.search_drawn_root(position, &moves, maximizing)
        } else {
            self.search
                .search(position, depth, -SCORE_INFINITY, SCORE_INFINITY, maximizing)
        };
        let mut nodes = root.nodes;

        let (mv, reason) = if let Some(mv) = self.hanging_capture(position, &moves) {
            (mv, SelectionReason::HangingCapture)
        } else {
            let (matches, searched) = self.best_score_matches(position, &moves, root.score);
            nodes += searched;
            match self.break_tie(&matches) {
                Some(mv) => (mv, SelectionReason::BestScore),
                None => {
                    warn!(
                        score = root.score,
                        fen = %position.to_fen(),
                        "no move reproduces the search score, falling back to a random move"
                    );
                    // `moves` was checked non-empty above
                    match self.fallback(&moves) {
                        Some(mv) => (mv, SelectionReason::Fallback),
                        None => return Decision::GameOver(state),
                    }
                }
            }
        };

        let next = self.rules().apply_move(position, &mv);
        debug!(
            mv = %mv,
            score = root.score,
            nodes,
            ?reason,
            left_hanging = ?hanging_pieces(self.rules(), &next, position.side_to_move()),
            "engine move chosen"
        );

        Decision::Play(Choice {
            mv,
            position: next,
            score: root.score,
            reason,
            nodes,
        })
    }

    /// First capture, in generation order, that nothing can take back.
    pub fn hanging_capture(&self, position: &Position, moves: &[Move]) -> Option<Move> {
        moves
            .iter()
            .copied()
            .find(|mv| is_free_capture(self.rules(), position, mv))
    }

    /// Root score for a position the rules already call drawn. The search
    /// would stop at the root, so each reply is scored the way
    /// `best_score_matches` scores it and the best one is folded in.
    fn search_drawn_root(
        &mut self,
        position: &Position,
        moves: &[Move],
        maximizing: bool,
    ) -> SearchResult {
        let child_depth = self.config.depth.saturating_sub(1);
        let mut best: Option<(Score, Move)> = None;
        let mut nodes = 1;
        for mv in moves {
            let child = self.rules().apply_move(position, mv);
            let result = self.search.search(
                &child,
                child_depth,
                -SCORE_INFINITY,
                SCORE_INFINITY,
                !maximizing,
            );
            nodes += result.nodes;
            let improves = match best {
                None => true,
                Some((score, _)) if maximizing => result.score > score,
                Some((score, _)) => result.score < score,
            };
            if improves {
                best = Some((result.score, *mv));
            }
        }
        SearchResult {
            score: best.map_or_else(|| self.evaluator().evaluate(position), |(score, _)| score),
            best_move: best.map(|(_, mv)| mv),
            nodes,
        }
    }

    /// Moves whose subtree, searched one ply shallower, scores exactly
    /// `best_score`. Also returns the nodes visited.
    fn best_score_matches(
        &mut self,
        position: &Position,
        moves: &[Move],
        best_score: Score,
    ) -> (Vec<Move>, u64) {
        let child_depth = self.config.depth.saturating_sub(1);
        let child_maximizing = position.side_to_move() != Color::White;
        let first_only = self.config.tie_break == TieBreak::First;

        let mut matches = Vec::new();
        let mut nodes = 0;
        for mv in moves {
            let child = self.rules().apply_move(position, mv);
            let result = self.search.search(
                &child,
                child_depth,
                -SCORE_INFINITY,
                SCORE_INFINITY,
                child_maximizing,
            );
            nodes += result.nodes;
            if result.score == best_score {
                matches.push(*mv);
                if first_only {
                    break;
                }
            }
        }
        (matches, nodes)
    }

    fn break_tie(&mut self, matches: &[Move]) -> Option<Move> {
        match self.config.tie_break {
            TieBreak::First => matches.first().copied(),
            TieBreak::Random => matches.choose(&mut self.rng).copied(),
        }
    }

    /// Uniform pick among `moves`. `None` only for an empty slice.
    pub fn fallback(&mut self, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(config: EngineConfig) -> MoveSelector {
        MoveSelector::seeded(config).unwrap()
    }

    fn play(decision: Decision) -> Choice {
        match decision {
            Decision::Play(choice) => choice,
            Decision::GameOver(state) => panic!("game over: {:?}", state),
        }
    }

    #[test]
    fn hanging_capture_overrides_search() {
        let position = Position::from_fen("k7/8/2p4p/3q4/4P3/8/7R/K7 w - - 0 1").unwrap();
        let mut selector = selector(EngineConfig::default());

        let root = selector
            .search
            .search(&position, 2, -SCORE_INFINITY, SCORE_INFINITY, true);
        assert_eq!(root.best_move.map(|mv| mv.to_string()), Some("e4d5".into()));

        let choice = play(selector.choose_move(&position));
        assert_eq!(choice.mv.to_string(), "h2h6");
        assert_eq!(choice.reason, SelectionReason::HangingCapture);
        assert_eq!(choice.score, root.score);
    }

    #[test]
    fn override_skips_captures_that_get_taken_back() {
        // Rxd5 opens the d-file for the d1 rook, Rxd1 walks into the king
        let position = Position::from_fen("8/8/8/3p4/7K/3R4/2P1k3/3r4 w - - 0 1").unwrap();
        let mut selector = selector(EngineConfig::default());
        let moves = selector.rules().legal_moves(&position);
        assert_eq!(selector.hanging_capture(&position, &moves), None);

        let choice = play(selector.choose_move(&position));
        assert_ne!(choice.mv.to_string(), "d3d5");
        assert_eq!(choice.reason, SelectionReason::BestScore);
    }

    #[test]
    fn drawn_positions_with_moves_still_get_a_move() {
        let generator = MoveGenerator::new();
        let mut selector = selector(EngineConfig::default());
        for fen in [
            "4k3/8/8/8/8/8/8/2RK4 b - - 100 90",
            "4k3/8/8/8/8/8/8/2NK4 w - - 0 1",
        ] {
            let position = Position::from_fen(fen).unwrap();
            assert!(generator.game_state(&position).is_over());
            let choice = play(selector.choose_move(&position));
            assert!(generator.legal_moves(&position).contains(&choice.mv), "{}", fen);
            assert_eq!(choice.reason, SelectionReason::BestScore, "{}", fen);
        }
    }

    #[test]
    fn test_checkmate_is_game_over() {
        let position = Position::from_fen(
            "r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1",
        )
        .unwrap();
        let decision = selector(EngineConfig::default()).choose_move(&position);
        assert_eq!(decision, Decision::GameOver(GameState::Checkmate(Color::White)));
        assert!(decision.choice().is_none());
    }

    #[test]
    fn test_stalemate_is_game_over() {
        let position = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
        let decision = selector(EngineConfig::default()).choose_move(&position);
        assert_eq!(decision, Decision::GameOver(GameState::Stalemate));
    }

    #[test]
    fn test_chosen_move_is_legal() {
        let generator = MoveGenerator::new();
        let mut selector = selector(EngineConfig::default());
        for fen in [
            crate::board::STARTPOS_FEN,
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        ] {
            let position = Position::from_fen(fen).unwrap();
            let choice = play(selector.choose_move(&position));
            assert!(generator.legal_moves(&position).contains(&choice.mv), "{}", fen);
            assert_eq!(choice.position, generator.apply_move(&position, &choice.mv));
            assert_ne!(choice.reason, SelectionReason::Fallback);
        }
    }

    #[test]
    fn test_tie_break() {
        let position = Position::new();
        let developing = ["b1c3", "g1f3"];

        let first = play(selector(EngineConfig::default().with_depth(1)).choose_move(&position));
        assert_eq!(first.score, 50);
        assert_eq!(first.reason, SelectionReason::BestScore);
        assert!(developing.contains(&first.mv.to_string().as_str()));

        let random_config = EngineConfig {
            tie_break: TieBreak::Random,
            ..EngineConfig::default().with_depth(1)
        };
        let a = play(selector(random_config.clone()).choose_move(&position));
        let b = play(selector(random_config).choose_move(&position));
        assert!(developing.contains(&a.mv.to_string().as_str()));
        assert_eq!(a.mv, b.mv);
    }

    #[test]
    fn test_fallback_is_reproducible() {
        let generator = MoveGenerator::new();
        let moves = generator.legal_moves(&Position::new());
        let config = EngineConfig {
            seed: 7,
            ..EngineConfig::default()
        };

        let mut a = selector(config.clone());
        let mut b = selector(config);
        for _ in 0..5 {
            let picked = a.fallback(&moves).unwrap();
            assert!(moves.contains(&picked));
            assert_eq!(Some(picked), b.fallback(&moves));
        }
        assert_eq!(a.fallback(&[]), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig::default().with_depth(0);
        assert!(MoveSelector::seeded(config).is_err());
    }
}
