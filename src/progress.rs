//! Mission progress: the per-attempt step machine.
//!
//! Interactive missions walk vocabulary -> matching drill -> dossier submission.
//! Standard missions expose the submission phase immediately.
//! An attempt lives only while the learner keeps the mission open.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{MatchingPair, Mission};
use crate::feedback::FeedbackError;

pub const EMPTY_DOSSIER_MESSAGE: &str = "Please complete your dossier before submitting to HQ.";
pub const FEEDBACK_RETRY_MESSAGE: &str = "Failed to get feedback from HQ. Please try again later.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
  #[error("This action is only available during the {expected} phase.")]
  WrongPhase { expected: &'static str },
  #[error("Match every description to the right agent before proceeding.")]
  DrillIncomplete,
  #[error("The dossier is already open.")]
  AlreadySubmitting,
  #[error("Unknown drop target: {0}")]
  UnknownTarget(u32),
  #[error("Description {0} is not available.")]
  DescriptionUnavailable(u32),
  #[error("{}", EMPTY_DOSSIER_MESSAGE)]
  EmptyDossier,
  #[error("HQ is still analyzing your dossier.")]
  RequestInFlight,
  #[error("No feedback request is outstanding.")]
  NoRequestInFlight,
}

/// Drag-and-drop state of the recognition drill.
#[derive(Clone, Debug)]
pub struct MatchingBoard {
  pairs: Vec<MatchingPair>,
  /// Description ids in the order they are offered to the learner.
  offer_order: Vec<u32>,
  /// target id -> description id currently dropped on it
  placed: BTreeMap<u32, u32>,
}

impl MatchingBoard {
  pub fn new(pairs: Vec<MatchingPair>) -> Self {
    let mut offer_order: Vec<u32> = pairs.iter().map(|p| p.id).collect();
    offer_order.shuffle(&mut rand::thread_rng());
    Self { pairs, offer_order, placed: BTreeMap::new() }
  }

  pub fn pairs(&self) -> &[MatchingPair] { &self.pairs }

  pub fn placed(&self, target: u32) -> Option<u32> { self.placed.get(&target).copied() }

  fn is_placed(&self, description: u32) -> bool {
    self.placed.values().any(|d| *d == description)
  }

  /// Drop `description` on `target`. Overwrites the target's previous description,
  /// which goes back to the pool. A description sitting on any target cannot be dragged.
  pub fn assign(&mut self, target: u32, description: u32) -> Result<(), ProgressError> {
    if !self.pairs.iter().any(|p| p.id == target) {
      return Err(ProgressError::UnknownTarget(target));
    }
    if !self.pairs.iter().any(|p| p.id == description) || self.is_placed(description) {
      return Err(ProgressError::DescriptionUnavailable(description));
    }
    self.placed.insert(target, description);
    Ok(())
  }

  /// Descriptions still draggable, in offer order.
  pub fn available(&self) -> Vec<&MatchingPair> {
    self.offer_order
      .iter()
      .filter(|id| !self.is_placed(**id))
      .filter_map(|id| self.pairs.iter().find(|p| p.id == *id))
      .collect()
  }

  pub fn description_text(&self, description: u32) -> Option<&str> {
    self.pairs.iter().find(|p| p.id == description).map(|p| p.description.as_str())
  }

  /// True iff every target holds its own description.
  pub fn is_complete(&self) -> bool {
    self.pairs.iter().all(|p| self.placed.get(&p.id) == Some(&p.id))
  }
}

#[derive(Clone, Debug)]
pub enum Phase {
  Vocabulary,
  Matching(MatchingBoard),
  Submission,
}

impl Phase {
  pub fn name(&self) -> &'static str {
    match self {
      Phase::Vocabulary => "vocabulary",
      Phase::Matching(_) => "matching",
      Phase::Submission => "submission",
    }
  }
}

/// What the transport has to send to the feedback collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackRequest {
  pub text: String,
  pub prompt: String,
}

#[derive(Clone, Debug)]
pub struct MissionAttempt {
  pub id: u64,
  pub mission: Mission,
  phase: Phase,
  pub submission: String,
  pub feedback: String,
  pub error: String,
  pub loading: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StepProgress {
  pub current: usize,
  pub total: usize,
}

impl MissionAttempt {
  pub fn start(id: u64, mission: Mission) -> Self {
    let phase = if mission.interactive().is_some() { Phase::Vocabulary } else { Phase::Submission };
    Self {
      id,
      mission,
      phase,
      submission: String::new(),
      feedback: String::new(),
      error: String::new(),
      loading: false,
    }
  }

  pub fn phase(&self) -> &Phase { &self.phase }

  /// 0 = vocabulary, 1 = matching, 2 = submission; standard missions sit at 0 of 1.
  pub fn step(&self) -> StepProgress {
    let total = self.mission.total_steps();
    let current = match (&self.phase, total) {
      (_, 1) => 0,
      (Phase::Vocabulary, _) => 0,
      (Phase::Matching(_), _) => 1,
      (Phase::Submission, _) => 2,
    };
    StepProgress { current, total }
  }

  /// Move to the next phase. The vocabulary phase is an honor-system gate;
  /// the matching phase only opens the dossier once the drill is complete.
  #[instrument(level = "debug", skip(self), fields(attempt = self.id, mission = %self.mission.id, phase = self.phase.name()))]
  pub fn advance(&mut self) -> Result<(), ProgressError> {
    let next = match &self.phase {
      Phase::Vocabulary => {
        let pairs = self
          .mission
          .interactive()
          .map(|c| c.matching_pairs.clone())
          .unwrap_or_default();
        Phase::Matching(MatchingBoard::new(pairs))
      }
      Phase::Matching(board) if board.is_complete() => Phase::Submission,
      Phase::Matching(_) => return Err(ProgressError::DrillIncomplete),
      Phase::Submission => return Err(ProgressError::AlreadySubmitting),
    };
    debug!(target: "mission", from = self.phase.name(), to = next.name(), "Phase advanced");
    self.phase = next;
    Ok(())
  }

  pub fn complete_vocabulary(&mut self) -> Result<(), ProgressError> {
    match self.phase {
      Phase::Vocabulary => self.advance(),
      _ => Err(ProgressError::WrongPhase { expected: "vocabulary" }),
    }
  }

  pub fn proceed_to_dossier(&mut self) -> Result<(), ProgressError> {
    match self.phase {
      Phase::Matching(_) => self.advance(),
      _ => Err(ProgressError::WrongPhase { expected: "matching" }),
    }
  }

  pub fn assign(&mut self, target: u32, description: u32) -> Result<(), ProgressError> {
    match &mut self.phase {
      Phase::Matching(board) => board.assign(target, description),
      _ => Err(ProgressError::WrongPhase { expected: "matching" }),
    }
  }

  fn require_submission(&self) -> Result<(), ProgressError> {
    match self.phase {
      Phase::Submission => Ok(()),
      _ => Err(ProgressError::WrongPhase { expected: "submission" }),
    }
  }

  pub fn edit_submission(&mut self, text: String) -> Result<(), ProgressError> {
    self.require_submission()?;
    if self.loading {
      return Err(ProgressError::RequestInFlight);
    }
    self.submission = text;
    Ok(())
  }

  /// Validate the dossier locally and, if it is non-blank, hand back the request
  /// to send. Blank dossiers never reach the collaborator.
  #[instrument(level = "debug", skip(self), fields(attempt = self.id, text_len = self.submission.len()))]
  pub fn submit(&mut self) -> Result<FeedbackRequest, ProgressError> {
    self.require_submission()?;
    if self.loading {
      return Err(ProgressError::RequestInFlight);
    }
    if self.submission.trim().is_empty() {
      self.error = EMPTY_DOSSIER_MESSAGE.into();
      return Err(ProgressError::EmptyDossier);
    }
    self.error.clear();
    self.feedback.clear();
    self.loading = true;
    Ok(FeedbackRequest { text: self.submission.clone(), prompt: self.mission.feedback_prompt.clone() })
  }

  /// Apply the collaborator's answer. Returns true when the mission counts as completed.
  pub fn resolve(&mut self, result: Result<String, FeedbackError>) -> Result<bool, ProgressError> {
    if !self.loading {
      return Err(ProgressError::NoRequestInFlight);
    }
    self.loading = false;
    match result {
      Ok(text) => {
        self.feedback = text;
        self.error.clear();
        Ok(true)
      }
      Err(_) => {
        self.feedback.clear();
        self.error = FEEDBACK_RETRY_MESSAGE.into();
        Ok(false)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_missions;

  fn interactive() -> Mission {
    seed_missions().into_iter().find(|m| m.id == "dp-01").unwrap()
  }

  fn standard() -> Mission {
    seed_missions().into_iter().find(|m| m.id == "da-01").unwrap()
  }

  fn at_matching() -> MissionAttempt {
    let mut attempt = MissionAttempt::start(1, interactive());
    attempt.complete_vocabulary().unwrap();
    attempt
  }

  fn board(attempt: &MissionAttempt) -> &MatchingBoard {
    match attempt.phase() {
      Phase::Matching(b) => b,
      other => panic!("expected matching phase, got {}", other.name()),
    }
  }

  #[test]
  fn standard_mission_starts_at_submission() {
    let attempt = MissionAttempt::start(1, standard());
    assert!(matches!(attempt.phase(), Phase::Submission));
    assert_eq!(attempt.step(), StepProgress { current: 0, total: 1 });
  }

  #[test]
  fn vocabulary_is_an_unconditional_gate() {
    let mut attempt = MissionAttempt::start(1, interactive());
    assert_eq!(attempt.step(), StepProgress { current: 0, total: 3 });
    attempt.complete_vocabulary().unwrap();
    assert_eq!(attempt.step().current, 1);
  }

  #[test]
  fn drill_complete_only_when_every_pair_matches() {
    let mut attempt = at_matching();
    attempt.assign(1, 1).unwrap();
    attempt.assign(2, 2).unwrap();
    attempt.assign(3, 3).unwrap();
    assert!(board(&attempt).is_complete());
    attempt.proceed_to_dossier().unwrap();
    assert_eq!(attempt.step().current, 2);
  }

  #[test]
  fn partial_drill_is_not_complete() {
    let mut attempt = at_matching();
    attempt.assign(1, 1).unwrap();
    attempt.assign(2, 2).unwrap();
    assert!(!board(&attempt).is_complete());
    assert_eq!(attempt.proceed_to_dossier(), Err(ProgressError::DrillIncomplete));
  }

  #[test]
  fn incorrect_drill_is_not_complete() {
    let mut attempt = at_matching();
    attempt.assign(1, 2).unwrap();
    attempt.assign(2, 3).unwrap();
    attempt.assign(3, 1).unwrap();
    assert!(!board(&attempt).is_complete());
    assert!(board(&attempt).available().is_empty());
    assert_eq!(attempt.proceed_to_dossier(), Err(ProgressError::DrillIncomplete));
  }

  #[test]
  fn placed_description_cannot_be_reused_until_displaced() {
    let mut attempt = at_matching();
    attempt.assign(1, 2).unwrap();
    assert_eq!(attempt.assign(3, 2), Err(ProgressError::DescriptionUnavailable(2)));

    // Overwriting target 1 sends description 2 back to the pool.
    attempt.assign(1, 1).unwrap();
    assert_eq!(board(&attempt).placed(1), Some(1));
    let available: Vec<u32> = board(&attempt).available().iter().map(|p| p.id).collect();
    assert!(available.contains(&2));
    attempt.assign(2, 2).unwrap();
  }

  #[test]
  fn unknown_ids_are_rejected() {
    let mut attempt = at_matching();
    assert_eq!(attempt.assign(9, 1), Err(ProgressError::UnknownTarget(9)));
    assert_eq!(attempt.assign(1, 9), Err(ProgressError::DescriptionUnavailable(9)));
  }

  #[test]
  fn submission_is_unreachable_before_the_drill() {
    let mut attempt = MissionAttempt::start(1, interactive());
    assert!(attempt.edit_submission("hello".into()).is_err());
    assert!(attempt.submit().is_err());
    assert!(attempt.proceed_to_dossier().is_err());
    attempt.complete_vocabulary().unwrap();
    assert_eq!(attempt.advance(), Err(ProgressError::DrillIncomplete));
    assert!(attempt.submit().is_err());
    assert_eq!(attempt.step().current, 1);
  }

  #[test]
  fn blank_dossier_is_rejected_locally() {
    let mut attempt = MissionAttempt::start(1, standard());
    attempt.edit_submission("   \n\t".into()).unwrap();
    assert_eq!(attempt.submit(), Err(ProgressError::EmptyDossier));
    assert_eq!(attempt.error, EMPTY_DOSSIER_MESSAGE);
    assert!(!attempt.loading);
  }

  #[test]
  fn only_one_request_in_flight() {
    let mut attempt = MissionAttempt::start(1, standard());
    attempt.edit_submission("I wake up at 7.".into()).unwrap();
    let req = attempt.submit().unwrap();
    assert_eq!(req.text, "I wake up at 7.");
    assert_eq!(req.prompt, attempt.mission.feedback_prompt);
    assert!(attempt.loading);
    assert_eq!(attempt.submit(), Err(ProgressError::RequestInFlight));
    assert_eq!(attempt.edit_submission("x".into()), Err(ProgressError::RequestInFlight));
  }

  #[test]
  fn resolve_success_and_failure() {
    let mut attempt = MissionAttempt::start(1, standard());
    attempt.edit_submission("I wake up at 7.".into()).unwrap();
    attempt.submit().unwrap();
    assert_eq!(attempt.resolve(Ok("Good work, Agent X...".into())), Ok(true));
    assert_eq!(attempt.feedback, "Good work, Agent X...");
    assert!(attempt.error.is_empty());

    attempt.submit().unwrap();
    assert!(attempt.feedback.is_empty());
    assert_eq!(attempt.resolve(Err(FeedbackError::EmptyResponse)), Ok(false));
    assert!(attempt.feedback.is_empty());
    assert_eq!(attempt.error, FEEDBACK_RETRY_MESSAGE);
    assert!(!attempt.loading);
  }
}
