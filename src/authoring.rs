//! Mission authoring form, kept server-side so every edit goes through the same rules.
//!
//! Lists (tasks, vocabulary groups, matching pairs) never shrink below one row;
//! removing the last row is ignored, like the form's trash button.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{InteractiveContent, MatchingPair, Mission, MissionKind, VocabEntry, VocabGroup, Vocabulary};

const DEFAULT_POINTS: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthoringError {
  #[error("Please fill in the {0} field.")]
  MissingField(&'static str),
  #[error("Points awarded must be a positive number.")]
  InvalidPoints,
  #[error("Row {0} does not exist.")]
  NoSuchRow(usize),
  #[error("Enable interactive components first.")]
  NotInteractive,
  #[error("No matching pair ids left.")]
  PairIdsExhausted,
}

/// One edit coming from the authoring form.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DraftEdit {
  SetTitle { value: String },
  SetObjective { value: String },
  SetBriefing { value: String },
  SetFeedbackPrompt { value: String },
  SetPoints { value: u32 },
  AddTask,
  SetTask { index: usize, value: String },
  RemoveTask { index: usize },
  SetInteractive { enabled: bool },
  SetInformantImage { value: String },
  AddVocab { group: VocabGroup },
  SetVocab { group: VocabGroup, index: usize, word: String, definition: String },
  RemoveVocab { group: VocabGroup, index: usize },
  AddPair,
  SetPair { index: usize, image_url: String, description: String },
  RemovePair { index: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissionDraft {
  /// Id of the mission being edited; `None` when creating.
  pub editing: Option<String>,
  pub title: String,
  pub objective: String,
  pub briefing: String,
  pub tasks: Vec<String>,
  pub feedback_prompt: String,
  pub points: u32,
  pub interactive: Option<InteractiveContent>,
}

impl Default for MissionDraft {
  fn default() -> Self {
    Self {
      editing: None,
      title: String::new(),
      objective: String::new(),
      briefing: String::new(),
      tasks: vec![String::new()],
      feedback_prompt: String::new(),
      points: DEFAULT_POINTS,
      interactive: None,
    }
  }
}

fn blank_interactive() -> InteractiveContent {
  InteractiveContent {
    informant_image_url: String::new(),
    vocabulary: Vocabulary { appearance: vec![VocabEntry::default()], personality: vec![VocabEntry::default()] },
    matching_pairs: vec![MatchingPair { id: 1, ..Default::default() }],
  }
}

fn row<T>(rows: &mut [T], index: usize) -> Result<&mut T, AuthoringError> {
  rows.get_mut(index).ok_or(AuthoringError::NoSuchRow(index))
}

fn remove_row<T>(rows: &mut Vec<T>, index: usize) -> Result<(), AuthoringError> {
  if index >= rows.len() {
    return Err(AuthoringError::NoSuchRow(index));
  }
  if rows.len() > 1 {
    rows.remove(index);
  }
  Ok(())
}

fn required(value: &str, field: &'static str) -> Result<(), AuthoringError> {
  if value.trim().is_empty() { Err(AuthoringError::MissingField(field)) } else { Ok(()) }
}

impl MissionDraft {
  pub fn from_mission(mission: &Mission) -> Self {
    Self {
      editing: Some(mission.id.clone()),
      title: mission.title.clone(),
      objective: mission.objective.clone(),
      briefing: mission.briefing.clone(),
      tasks: mission.tasks.clone(),
      feedback_prompt: mission.feedback_prompt.clone(),
      points: mission.points,
      interactive: mission.interactive().cloned(),
    }
  }

  fn interactive_mut(&mut self) -> Result<&mut InteractiveContent, AuthoringError> {
    self.interactive.as_mut().ok_or(AuthoringError::NotInteractive)
  }

  pub fn apply(&mut self, edit: DraftEdit) -> Result<(), AuthoringError> {
    match edit {
      DraftEdit::SetTitle { value } => self.title = value,
      DraftEdit::SetObjective { value } => self.objective = value,
      DraftEdit::SetBriefing { value } => self.briefing = value,
      DraftEdit::SetFeedbackPrompt { value } => self.feedback_prompt = value,
      DraftEdit::SetPoints { value } => self.points = value,
      DraftEdit::AddTask => self.tasks.push(String::new()),
      DraftEdit::SetTask { index, value } => *row(&mut self.tasks, index)? = value,
      DraftEdit::RemoveTask { index } => remove_row(&mut self.tasks, index)?,
      DraftEdit::SetInteractive { enabled } => {
        self.interactive = if enabled { Some(blank_interactive()) } else { None };
      }
      DraftEdit::SetInformantImage { value } => self.interactive_mut()?.informant_image_url = value,
      DraftEdit::AddVocab { group } => {
        self.interactive_mut()?.vocabulary.group_mut(group).push(VocabEntry::default());
      }
      DraftEdit::SetVocab { group, index, word, definition } => {
        let entries = self.interactive_mut()?.vocabulary.group_mut(group);
        *row(entries, index)? = VocabEntry { word, definition };
      }
      DraftEdit::RemoveVocab { group, index } => {
        remove_row(self.interactive_mut()?.vocabulary.group_mut(group), index)?;
      }
      DraftEdit::AddPair => {
        let pairs = &mut self.interactive_mut()?.matching_pairs;
        let id = match pairs.iter().map(|p| p.id).max() {
          Some(max) => max.checked_add(1).ok_or(AuthoringError::PairIdsExhausted)?,
          None => 1,
        };
        pairs.push(MatchingPair { id, ..Default::default() });
      }
      DraftEdit::SetPair { index, image_url, description } => {
        let pair = row(&mut self.interactive_mut()?.matching_pairs, index)?;
        pair.image_url = image_url;
        pair.description = description;
      }
      DraftEdit::RemovePair { index } => remove_row(&mut self.interactive_mut()?.matching_pairs, index)?,
    }
    Ok(())
  }

  /// Validate required fields and produce the mission to store.
  /// Edits keep their id; new missions leave it empty for the catalog to assign.
  pub fn finish(self) -> Result<Mission, AuthoringError> {
    required(&self.title, "title")?;
    required(&self.objective, "objective")?;
    required(&self.briefing, "briefing")?;
    required(&self.feedback_prompt, "feedback prompt")?;
    if self.points == 0 {
      return Err(AuthoringError::InvalidPoints);
    }

    Ok(Mission {
      id: self.editing.unwrap_or_default(),
      title: self.title,
      objective: self.objective,
      briefing: self.briefing,
      tasks: self.tasks,
      feedback_prompt: self.feedback_prompt,
      points: self.points,
      kind: match self.interactive {
        Some(content) => MissionKind::Interactive(content),
        None => MissionKind::Standard,
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_missions;

  fn filled() -> MissionDraft {
    let mut draft = MissionDraft::default();
    for edit in [
      DraftEdit::SetTitle { value: "Safe House".into() },
      DraftEdit::SetObjective { value: "Describe a room.".into() },
      DraftEdit::SetBriefing { value: "HQ needs a floor plan.".into() },
      DraftEdit::SetFeedbackPrompt { value: "You are a quartermaster.".into() },
    ] {
      draft.apply(edit).unwrap();
    }
    draft
  }

  #[test]
  fn blank_draft_fails_on_first_missing_field() {
    assert_eq!(MissionDraft::default().finish(), Err(AuthoringError::MissingField("title")));
    let mut draft = filled();
    draft.apply(DraftEdit::SetBriefing { value: "  ".into() }).unwrap();
    assert_eq!(draft.finish(), Err(AuthoringError::MissingField("briefing")));
  }

  #[test]
  fn zero_points_rejected() {
    let mut draft = filled();
    draft.apply(DraftEdit::SetPoints { value: 0 }).unwrap();
    assert_eq!(draft.finish(), Err(AuthoringError::InvalidPoints));
  }

  #[test]
  fn new_mission_is_standard_and_unnamed() {
    let mission = filled().finish().unwrap();
    assert!(mission.id.is_empty());
    assert_eq!(mission.kind, MissionKind::Standard);
    assert_eq!(mission.points, 100);
  }

  #[test]
  fn editing_keeps_the_id() {
    let original = seed_missions().remove(0);
    let mut draft = MissionDraft::from_mission(&original);
    draft.apply(DraftEdit::SetPoints { value: 150 }).unwrap();
    let mission = draft.finish().unwrap();
    assert_eq!(mission.id, "dp-01");
    assert_eq!(mission.points, 150);
    assert!(mission.interactive().is_some());
  }

  #[test]
  fn rows_never_drop_below_one() {
    let mut draft = filled();
    draft.apply(DraftEdit::RemoveTask { index: 0 }).unwrap();
    assert_eq!(draft.tasks.len(), 1);
    draft.apply(DraftEdit::AddTask).unwrap();
    draft.apply(DraftEdit::SetTask { index: 1, value: "Draw a map.".into() }).unwrap();
    draft.apply(DraftEdit::RemoveTask { index: 0 }).unwrap();
    assert_eq!(draft.tasks, vec!["Draw a map.".to_string()]);
    assert_eq!(draft.apply(DraftEdit::RemoveTask { index: 4 }), Err(AuthoringError::NoSuchRow(4)));
  }

  #[test]
  fn pair_ids_continue_from_the_max() {
    let mut draft = filled();
    assert_eq!(draft.apply(DraftEdit::AddPair), Err(AuthoringError::NotInteractive));
    draft.apply(DraftEdit::SetInteractive { enabled: true }).unwrap();
    draft.apply(DraftEdit::AddPair).unwrap();
    draft.apply(DraftEdit::AddPair).unwrap();
    draft.apply(DraftEdit::RemovePair { index: 0 }).unwrap();
    draft.apply(DraftEdit::AddPair).unwrap();
    let ids: Vec<u32> = draft.interactive.as_ref().unwrap().matching_pairs.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3, 4]);
  }

  #[test]
  fn pair_ids_do_not_wrap() {
    let mut draft = filled();
    draft.apply(DraftEdit::SetInteractive { enabled: true }).unwrap();
    draft.interactive.as_mut().unwrap().matching_pairs[0].id = u32::MAX;
    assert_eq!(draft.apply(DraftEdit::AddPair), Err(AuthoringError::PairIdsExhausted));
    assert_eq!(draft.interactive.as_ref().unwrap().matching_pairs.len(), 1);
  }

  #[test]
  fn vocabulary_rows_per_group() {
    let mut draft = filled();
    draft.apply(DraftEdit::SetInteractive { enabled: true }).unwrap();
    draft.apply(DraftEdit::AddVocab { group: VocabGroup::Personality }).unwrap();
    draft
      .apply(DraftEdit::SetVocab { group: VocabGroup::Personality, index: 1, word: "Bold".into(), definition: "Brave.".into() })
      .unwrap();
    let content = draft.interactive.as_ref().unwrap();
    assert_eq!(content.vocabulary.appearance.len(), 1);
    assert_eq!(content.vocabulary.personality[1].word, "Bold");

    draft.apply(DraftEdit::SetInteractive { enabled: false }).unwrap();
    assert_eq!(draft.finish().unwrap().kind, MissionKind::Standard);
  }

  #[test]
  fn edits_parse_from_json() {
    let edit: DraftEdit = serde_json::from_str(r#"{"op":"remove_vocab","group":"appearance","index":0}"#).unwrap();
    assert!(matches!(edit, DraftEdit::RemoveVocab { group: VocabGroup::Appearance, index: 0 }));
  }
}
