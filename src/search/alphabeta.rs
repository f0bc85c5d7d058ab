use chess::ChessMove;

use super::deadline::Cancelled;
use super::{Line, SearchEngine};
use crate::eval::OrderingHints;
use crate::game_over;
use crate::tt::BoundType;

impl SearchEngine {
    /// Negamax alpha-beta returning the score and best line from this node.
    ///
    /// `prev_pv` is the previous iteration's principal variation, indexed by
    /// ply from the root; its move at `ply` is tried early.
    pub(super) fn alpha_beta(
        &mut self,
        depth_left: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        prev_pv: &[ChessMove],
    ) -> Result<Line, Cancelled> {
        self.deadline.check()?;

        if depth_left <= 0 || game_over::is_game_over(&mut self.position) {
            let quiesce_depth = self.config.quiesce_depth as i32 - 1;
            let score = self.quiesce(alpha, beta, quiesce_depth, ply)?;
            return Ok(Line::leaf(score));
        }
        self.stats.nodes += 1;

        let hash = self.position.hash();
        let alpha_orig = alpha;
        let cached = self.tt.probe(hash).copied();

        if let Some(entry) = cached {
            self.stats.cache_hits += 1;
            let usable_move = entry.best_move.filter(|&mv| self.position.is_legal(mv));
            if entry.depth >= depth_left as u32 {
                match entry.bound_type {
                    BoundType::Exact => {}
                    BoundType::LowerBound => alpha = alpha.max(entry.score),
                    BoundType::UpperBound => beta = beta.min(entry.score),
                }
                let cutoff = entry.bound_type == BoundType::Exact || alpha >= beta;
                if let (true, Some(mv)) = (cutoff, usable_move) {
                    self.stats.cache_cutoffs += 1;
                    return Ok(Line {
                        score: entry.score,
                        moves: vec![mv],
                    });
                }
            }
        }

        let hints = OrderingHints {
            tt_move: cached.and_then(|e| e.best_move),
            pv_move: prev_pv.get(ply).copied(),
            killers: self.killers.get(ply),
        };
        let moves = self.evaluator.move_order(&self.position, &hints);
        debug_assert!(!moves.is_empty(), "live position without legal moves");
        if moves.is_empty() {
            let score = self.quiesce(alpha, beta, self.config.quiesce_depth as i32 - 1, ply)?;
            return Ok(Line::leaf(score));
        }

        let mut best = Line {
            score: -super::INFINITY,
            moves: Vec::new(),
        };
        for mv in moves {
            self.position.push(mv);
            let child = self.alpha_beta(depth_left - 1, -beta, -alpha, ply + 1, prev_pv);
            self.position.pop();
            let child = child?;

            let score = -child.score;
            if score > best.score || best.moves.is_empty() {
                best.score = score;
                best.moves.clear();
                best.moves.push(mv);
                best.moves.extend(child.moves);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.killers.update(ply, mv, &self.position);
                break;
            }
        }

        let bound = if best.score <= alpha_orig {
            BoundType::UpperBound
        } else if best.score >= beta {
            BoundType::LowerBound
        } else {
            BoundType::Exact
        };
        self.tt
            .store(hash, depth_left as u32, best.score, bound, best.moves.first().copied());

        Ok(best)
    }
}
