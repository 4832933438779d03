//! Mission catalog: an ordered, in-memory list of missions.
//! New missions get a generated `custom-<uuid>` id; edited ones are replaced in place.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::Mission;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
  #[error("Unknown mission: {0}")]
  UnknownMission(String),
}

#[derive(Clone, Debug, Default)]
pub struct MissionCatalog {
  missions: Vec<Mission>,
}

fn fresh_mission_id() -> String {
  format!("custom-{}", Uuid::new_v4())
}

impl MissionCatalog {
  pub fn new(missions: Vec<Mission>) -> Self { Self { missions } }

  pub fn list(&self) -> &[Mission] { &self.missions }

  pub fn get(&self, id: &str) -> Option<&Mission> {
    self.missions.iter().find(|m| m.id == id)
  }

  /// Append a mission under a freshly generated id. Returns the id.
  pub fn add(&mut self, mut mission: Mission) -> String {
    mission.id = fresh_mission_id();
    let id = mission.id.clone();
    info!(target: "mission", %id, title = %mission.title, "Mission created");
    self.missions.push(mission);
    id
  }

  pub fn replace(&mut self, mission: Mission) -> Result<(), CatalogError> {
    let slot = self
      .missions
      .iter_mut()
      .find(|m| m.id == mission.id)
      .ok_or_else(|| CatalogError::UnknownMission(mission.id.clone()))?;
    info!(target: "mission", id = %mission.id, title = %mission.title, "Mission updated");
    *slot = mission;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_missions;

  #[test]
  fn add_assigns_fresh_ids() {
    let mut catalog = MissionCatalog::new(seed_missions());
    let template = catalog.get("da-01").cloned().unwrap();
    let a = catalog.add(template.clone());
    let b = catalog.add(template);
    assert_ne!(a, b);
    assert!(a.starts_with("custom-"));
    assert_eq!(catalog.list().len(), 8);
    assert_eq!(catalog.list().last().map(|m| m.id.as_str()), Some(b.as_str()));
  }

  #[test]
  fn replace_keeps_position() {
    let mut catalog = MissionCatalog::new(seed_missions());
    let mut edited = catalog.get("dir-01").cloned().unwrap();
    edited.points = 250;
    catalog.replace(edited).unwrap();
    assert_eq!(catalog.list()[2].id, "dir-01");
    assert_eq!(catalog.list()[2].points, 250);
  }

  #[test]
  fn replace_unknown_is_an_error() {
    let mut catalog = MissionCatalog::default();
    let mut m = seed_missions().remove(0);
    m.id = "nope".into();
    assert_eq!(catalog.replace(m), Err(CatalogError::UnknownMission("nope".into())));
  }
}
