use super::constants::MATE_THRESHOLD;
use super::deadline::Cancelled;
use super::SearchEngine;

/// Move a mate score toward zero by the distance from the root, so nearer
/// mates score higher for the winner.
#[inline]
pub(super) fn adjust_mate(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

impl SearchEngine {
    /// Captures-only search from a leaf, fail-hard within `[alpha, beta]`.
    ///
    /// Below `depth_left` zero it keeps going for as long as there are
    /// captures and the game is not over.
    pub(super) fn quiesce(
        &mut self,
        mut alpha: i32,
        beta: i32,
        depth_left: i32,
        ply: usize,
    ) -> Result<i32, Cancelled> {
        self.deadline.check()?;
        self.stats.nodes += 1;
        self.stats.q_nodes += 1;

        let evaluation = self.evaluator.evaluate(&mut self.position);
        let stand_pat = adjust_mate(evaluation.total_perspective(), ply);
        let game_over = evaluation.is_game_over();

        if stand_pat >= beta {
            return Ok(beta);
        }
        if alpha < stand_pat {
            alpha = stand_pat;
        }

        if depth_left > 0 || !game_over {
            for mv in self.evaluator.capture_order(&self.position) {
                self.position.push(mv);
                let child = self.quiesce(-beta, -alpha, depth_left - 1, ply + 1);
                self.position.pop();
                let score = -child?;

                if score >= beta {
                    return Ok(beta);
                }
                if score > alpha {
                    alpha = score;
                }
            }
        }

        Ok(alpha)
    }
}
