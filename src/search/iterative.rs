use std::time::Instant;

use chess::ChessMove;
use log::{debug, warn};

use super::constants::INFINITY;
use super::{EnginePhase, Line, SearchEngine};
use crate::eval::OrderingHints;

impl SearchEngine {
    /// Deepen one ply at a time until the depth limit or the deadline.
    ///
    /// Depth 1 always completes; the deadline is armed only afterwards. An
    /// iteration interrupted by the deadline is thrown away and the previous
    /// one's move stands.
    pub(super) fn iterative_deepening(&mut self) -> ChessMove {
        let snapshot = self.position.clone();
        let max_depth = self.config.alpha_beta_depth.max(1);

        self.deadline.disarm();
        let mut best = match self.search_depth(1, &[]) {
            Some(line) => line,
            None => {
                // Unreachable with an unarmed deadline, but keep the position sane.
                self.position = snapshot.clone();
                Line::default()
            }
        };
        self.deadline.arm(self.config.time_limit);

        for depth in 2..=max_depth {
            match self.search_depth(depth, &best.moves) {
                Some(line) => best = line,
                None => {
                    debug!("depth {depth} interrupted, keeping depth {}", self.stats.max_depth);
                    self.position = snapshot;
                    break;
                }
            }
        }
        self.deadline.disarm();

        self.stats.score = Some(best.score);
        self.stats.principal_variation = best.moves.iter().map(ToString::to_string).collect();

        match best.moves.first() {
            Some(&mv) => mv,
            None => self.fallback_move(),
        }
    }

    /// Run one full-width iteration. `None` when the deadline cut it short.
    fn search_depth(&mut self, depth: u32, prev_pv: &[ChessMove]) -> Option<Line> {
        self.phase = EnginePhase::IterativeDeepening { depth };
        let started = Instant::now();
        let line = self
            .alpha_beta(depth as i32, -INFINITY, INFINITY, 0, prev_pv)
            .ok()?;

        let took = started.elapsed();
        self.stats.max_depth = depth;
        self.stats.depth_times.insert(depth, took);
        debug!(
            "depth {depth} score {} nodes {} time {:.3}s pv {}",
            line.score,
            self.stats.nodes,
            took.as_secs_f64(),
            line.moves
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );
        Some(line)
    }

    /// A root that is drawn by rule still has legal moves but no line; play
    /// the best-ordered one.
    fn fallback_move(&mut self) -> ChessMove {
        let ordered = self
            .evaluator
            .move_order(&self.position, &OrderingHints::default());
        warn!("search produced no line for {}", self.position.fen());
        ordered.first().copied().unwrap_or_default()
    }
}
