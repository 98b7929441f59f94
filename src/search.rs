use crate::board::Position;
use crate::evaluation::{Evaluator, Score};
use crate::movegen::{Move, MoveGenerator, RulesEngine};

/// Window bound for a full-width search. Far outside any reachable
/// evaluation and safe to negate.
pub const SCORE_INFINITY: Score = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub score: Score,
    /// `None` at depth 0 and in finished games.
    pub best_move: Option<Move>,
    pub nodes: u64,
}

/// Fixed-depth minimax with fail-hard alpha-beta pruning.
///
/// White maximizes, Black minimizes; scores are always from White's point of
/// view. Moves are tried in the order the rules engine yields them.
pub struct Search<E: RulesEngine = MoveGenerator> {
    rules: E,
    evaluator: Evaluator,
    nodes_searched: u64,
}

impl Search {
    pub fn new() -> Self {
        Self::with_parts(MoveGenerator::new(), Evaluator::new())
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> Search<E> {
    pub fn with_parts(rules: E, evaluator: Evaluator) -> Self {
        Self {
            rules,
            evaluator,
            nodes_searched: 0,
        }
    }

    pub fn rules(&self) -> &E {
        &self.rules
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn search(
        &mut self,
        position: &Position,
        depth: u32,
        alpha: Score,
        beta: Score,
        maximizing: bool,
    ) -> SearchResult {
        self.nodes_searched = 0;
        let (score, best_move) = self.alpha_beta(position, depth, alpha, beta, maximizing);
        SearchResult {
            score,
            best_move,
            nodes: self.nodes_searched,
        }
    }

    fn alpha_beta(
        &mut self,
        position: &Position,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> (Score, Option<Move>) {
        self.nodes_searched += 1;

        if depth == 0 || self.rules.is_game_over(position) {
            return (self.evaluator.evaluate(position), None);
        }

        let moves = self.rules.legal_moves(position);
        let mut best: Option<(Score, Move)> = None;

        for mv in moves {
            let child = self.rules.apply_move(position, &mv);
            let (score, _) = self.alpha_beta(&child, depth - 1, alpha, beta, !maximizing);

            if maximizing {
                if score >= beta {
                    return (beta, Some(mv));
                }
                alpha = alpha.max(score);
            } else {
                if score <= alpha {
                    return (alpha, Some(mv));
                }
                beta = beta.min(score);
            }

            let improves = match best {
                None => true,
                Some((best_score, _)) if maximizing => score > best_score,
                Some((best_score, _)) => score < best_score,
            };
            if improves {
                best = Some((score, mv));
            }
        }

        let bound = if maximizing { alpha } else { beta };
        (bound, best.map(|(_, mv)| mv))
    }

    /// Plain minimax without pruning. Same terminal rule as `search`.
    pub fn minimax(&mut self, position: &Position, depth: u32, maximizing: bool) -> Score {
        if depth == 0 || self.rules.is_game_over(position) {
            return self.evaluator.evaluate(position);
        }

        let scores = self.rules.legal_moves(position).into_iter().map(|mv| {
            let child = self.rules.apply_move(position, &mv);
            self.minimax(&child, depth - 1, !maximizing)
        });
        let scores: Vec<Score> = scores.collect();

        if maximizing {
            scores.into_iter().max().unwrap_or(-SCORE_INFINITY)
        } else {
            scores.into_iter().min().unwrap_or(SCORE_INFINITY)
        }
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

    fn full_window(search: &mut Search, position: &Position, depth: u32) -> SearchResult {
        let maximizing = position.side_to_move() == cozy_chess::Color::White;
        search.search(position, depth, -SCORE_INFINITY, SCORE_INFINITY, maximizing)
    }

    #[test]
    fn depth_zero_is_static_evaluation() {
        let mut search = Search::new();
        for fen in [crate::board::STARTPOS_FEN, MIDDLEGAME] {
            let position = Position::from_fen(fen).unwrap();
            let result = search.search(&position, 0, -SCORE_INFINITY, SCORE_INFINITY, true);
            assert_eq!(result.score, search.evaluator().evaluate(&position));
            assert_eq!(result.best_move, None);
            assert_eq!(result.nodes, 1);
        }
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        let mut search = Search::new();
        for fen in [crate::board::STARTPOS_FEN, MIDDLEGAME] {
            let position = Position::from_fen(fen).unwrap();
            let maximizing = position.side_to_move() == cozy_chess::Color::White;
            for depth in 1..=3 {
                let pruned = full_window(&mut search, &position, depth);
                let reference = search.minimax(&position, depth, maximizing);
                assert_eq!(pruned.score, reference, "{} at depth {}", fen, depth);
                assert!(pruned.best_move.is_some());
            }
        }
    }

    #[test]
    fn pruning_visits_fewer_nodes() {
        let mut search = Search::new();
        let position = Position::from_fen(MIDDLEGAME).unwrap();
        let result = full_window(&mut search, &position, 3);

        assert!(result.nodes > 1);
        assert!(result.nodes < tree_size(search.rules(), &position, 3));
        assert_eq!(search.get_nodes_searched(), result.nodes);
    }

    fn tree_size(rules: &MoveGenerator, position: &Position, depth: u32) -> u64 {
        if depth == 0 || rules.is_game_over(position) {
            return 1;
        }
        1 + rules
            .legal_moves(position)
            .iter()
            .map(|mv| tree_size(rules, &rules.apply_move(position, mv), depth - 1))
            .sum::<u64>()
    }

    #[test]
    fn test_finished_game_is_terminal() {
        let mut search = Search::new();
        let mate = Position::from_fen(
            "r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1",
        )
        .unwrap();
        let result = search.search(&mate, 2, -SCORE_INFINITY, SCORE_INFINITY, false);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, search.evaluator().evaluate(&mate));
    }

    #[test]
    fn test_trades_rook_for_queen() {
        let mut search = Search::new();
        // giving up the rook for the queen beats every other line
        let position = Position::from_fen("3qk3/8/8/8/8/8/8/3RK3 w - - 0 1").unwrap();
        let result = full_window(&mut search, &position, 2);
        assert_eq!(result.best_move.map(|mv| mv.to_string()), Some("d1d8".into()));
    }

    #[test]
    fn fail_hard_returns_the_bound() {
        let mut search = Search::new();
        let position = Position::new();
        let exact = full_window(&mut search, &position, 2).score;

        let low = search.search(&position, 2, exact + 10, exact + 20, true);
        assert_eq!(low.score, exact + 10);
        let high = search.search(&position, 2, exact - 20, exact - 10, true);
        assert_eq!(high.score, exact - 10);
    }
}
