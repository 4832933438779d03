//! In-memory leaderboard keyed by student name.

use serde::Serialize;
use tracing::info;

use crate::domain::{LeaderboardEntry, Role, User};

#[derive(Clone, Debug, Default, Serialize)]
pub struct Leaderboard {
  entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
  pub fn entries(&self) -> &[LeaderboardEntry] { &self.entries }

  /// Credit `points` to a student. Teachers never appear on the board.
  /// Completions are not deduplicated: finishing the same mission twice scores twice.
  /// Scores saturate at `u32::MAX`. Returns false when nothing was recorded.
  pub fn record_completion(&mut self, user: &User, points: u32) -> bool {
    if user.role != Role::Student {
      return false;
    }

    match self.entries.iter_mut().find(|e| e.name == user.name) {
      Some(entry) => {
        entry.score = entry.score.saturating_add(points);
        entry.missions_completed = entry.missions_completed.saturating_add(1);
      }
      None => self.entries.push(LeaderboardEntry {
        rank: 0,
        name: user.name.clone(),
        score: points,
        missions_completed: 1,
      }),
    }

    self.rerank();
    info!(target: "leaderboard", name = %user.name, points, agents = self.entries.len(), "Completion recorded");
    true
  }

  // sort_by is stable: equal scores keep their current relative order and get distinct ranks
  fn rerank(&mut self) {
    self.entries.sort_by(|a, b| b.score.cmp(&a.score));
    for (i, entry) in self.entries.iter_mut().enumerate() {
      entry.rank = i + 1;
    }
  }
}
