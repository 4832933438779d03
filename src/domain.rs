//! Domain models: missions (standard or interactive), users and leaderboard rows.

use serde::{Deserialize, Serialize};

/// A single vocabulary card shown during the training phase.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
  pub word: String,
  pub definition: String,
}

/// The two vocabulary groups of an interactive mission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
  #[serde(default)] pub appearance: Vec<VocabEntry>,
  #[serde(default)] pub personality: Vec<VocabEntry>,
}

/// Which vocabulary group an authoring edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabGroup {
  Appearance,
  Personality,
}

impl Vocabulary {
  pub fn group_mut(&mut self, group: VocabGroup) -> &mut Vec<VocabEntry> {
    match group {
      VocabGroup::Appearance => &mut self.appearance,
      VocabGroup::Personality => &mut self.personality,
    }
  }
}

/// One image/description pair of the recognition drill.
/// `id` names both the drop target and the description that belongs on it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
  pub id: u32,
  #[serde(default)] pub image_url: String,
  pub description: String,
}

/// Extra content carried by interactive missions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveContent {
  #[serde(default)] pub informant_image_url: String,
  #[serde(default)] pub vocabulary: Vocabulary,
  #[serde(default)] pub matching_pairs: Vec<MatchingPair>,
}

/// Standard missions go straight to the dossier; interactive ones train first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MissionKind {
  #[default]
  Standard,
  Interactive(InteractiveContent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
  pub id: String,
  pub title: String,
  pub objective: String,
  pub briefing: String,
  #[serde(default)] pub tasks: Vec<String>,
  /// System prompt handed verbatim to the feedback model.
  pub feedback_prompt: String,
  pub points: u32,
  #[serde(default)] pub kind: MissionKind,
}

impl Mission {
  pub fn interactive(&self) -> Option<&InteractiveContent> {
    match &self.kind {
      MissionKind::Interactive(content) => Some(content),
      MissionKind::Standard => None,
    }
  }

  /// Number of phases the learner walks through (3 for interactive, 1 otherwise).
  pub fn total_steps(&self) -> usize {
    match self.kind {
      MissionKind::Interactive(_) => 3,
      MissionKind::Standard => 1,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Teacher,
  Student,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
  pub role: Role,
  pub name: String,
}

impl User {
  pub fn teacher() -> Self {
    Self { role: Role::Teacher, name: "Teacher".into() }
  }

  pub fn student(name: impl Into<String>) -> Self {
    Self { role: Role::Student, name: name.into() }
  }

  pub fn is_teacher(&self) -> bool { self.role == Role::Teacher }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
  pub rank: usize,
  pub name: String,
  pub score: u32,
  pub missions_completed: u32,
}
