//! Per-connection session state and its transitions.
//!
//! `Session::apply` is a reducer: it takes an event, updates the session and returns
//! the side effects the transport must run (call the feedback service, credit the
//! leaderboard, create or update a mission). It never performs I/O itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::authoring::{AuthoringError, DraftEdit, MissionDraft};
use crate::domain::{Mission, Role, User};
use crate::feedback::FeedbackError;
use crate::progress::{FeedbackRequest, MissionAttempt, ProgressError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    About,
    Missions,
    Leaderboard,
    MissionDetail,
    MissionForm,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub view: View,
    pub label: &'static str,
}

/// Navigation entries visible to `role`. Only teachers see the authoring form.
pub fn nav_items(role: Role) -> Vec<NavItem> {
    let mut items = vec![
        NavItem { view: View::Home, label: "Home" },
        NavItem { view: View::About, label: "About" },
        NavItem { view: View::Missions, label: "Missions" },
        NavItem { view: View::Leaderboard, label: "Leaderboard" },
    ];
    if role == Role::Teacher {
        items.push(NavItem { view: View::MissionForm, label: "Create" });
    }
    items
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please log in first.")]
    NotLoggedIn,
    #[error("Only teachers can author missions.")]
    TeacherOnly,
    #[error("No mission is open.")]
    NoOpenMission,
    #[error("No mission form is open.")]
    NoDraft,
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
}

/// Inputs to the reducer. Lookups (catalog, login) are resolved before they get here.
#[derive(Debug)]
pub enum SessionEvent {
    LoggedIn(User),
    Logout,
    Navigate(View),
    OpenMission(Mission),
    EditMission(Mission),
    CompleteVocabulary,
    AssignDescription { target: u32, description: u32 },
    ProceedToDossier,
    EditSubmission(String),
    SubmitDossier,
    FeedbackResolved { attempt_id: u64, result: Result<String, FeedbackError> },
    Draft(DraftEdit),
    SaveMission,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    RequestFeedback { attempt_id: u64, request: FeedbackRequest },
    RecordCompletion { user: User, mission_id: String },
    CreateMission(Mission),
    UpdateMission(Mission),
}

#[derive(Debug)]
pub struct Session {
    user: Option<User>,
    view: View,
    attempt: Option<MissionAttempt>,
    draft: Option<MissionDraft>,
    next_attempt_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self { user: None, view: View::Home, attempt: None, draft: None, next_attempt_id: 1 }
    }
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn attempt(&self) -> Option<&MissionAttempt> {
        self.attempt.as_ref()
    }

    pub fn draft(&self) -> Option<&MissionDraft> {
        self.draft.as_ref()
    }

    fn require_user(&self) -> Result<&User, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotLoggedIn)
    }

    fn require_teacher(&self) -> Result<(), SessionError> {
        if self.require_user()?.is_teacher() {
            Ok(())
        } else {
            Err(SessionError::TeacherOnly)
        }
    }

    fn attempt_mut(&mut self) -> Result<&mut MissionAttempt, SessionError> {
        self.require_user()?;
        self.attempt.as_mut().ok_or(SessionError::NoOpenMission)
    }

    fn draft_mut(&mut self) -> Result<&mut MissionDraft, SessionError> {
        self.require_teacher()?;
        self.draft.as_mut().ok_or(SessionError::NoDraft)
    }

    /// Switch views. Leaving a mission abandons the attempt (and any in-flight
    /// feedback for it); leaving the form discards the draft.
    fn show(&mut self, view: View) {
        if view != View::MissionDetail {
            self.attempt = None;
        }
        if view != View::MissionForm {
            self.draft = None;
        }
        self.view = view;
    }

    #[instrument(level = "debug", skip(self, event), fields(view = ?self.view))]
    pub fn apply(&mut self, event: SessionEvent) -> Result<Vec<Effect>, SessionError> {
        match event {
            SessionEvent::LoggedIn(user) => {
                info!(target: "mission_possible", name = %user.name, role = ?user.role, "Agent logged in");
                self.user = Some(user);
                self.show(View::Home);
            }

            SessionEvent::Logout => {
                self.show(View::Home);
                self.user = None;
            }

            SessionEvent::Navigate(view) => {
                self.require_user()?;
                match view {
                    View::MissionForm => {
                        self.require_teacher()?;
                        self.show(View::MissionForm);
                        self.draft = Some(MissionDraft::default());
                    }
                    // There is no mission detail without an open mission.
                    View::MissionDetail if self.attempt.is_none() => self.show(View::Missions),
                    other => self.show(other),
                }
            }

            SessionEvent::OpenMission(mission) => {
                self.require_user()?;
                let id = self.next_attempt_id;
                self.next_attempt_id += 1;
                debug!(target: "mission", attempt = id, mission = %mission.id, "Mission opened");
                self.show(View::MissionDetail);
                self.attempt = Some(MissionAttempt::start(id, mission));
            }

            SessionEvent::EditMission(mission) => {
                self.require_teacher()?;
                self.show(View::MissionForm);
                self.draft = Some(MissionDraft::from_mission(&mission));
            }

            SessionEvent::CompleteVocabulary => self.attempt_mut()?.complete_vocabulary()?,

            SessionEvent::AssignDescription { target, description } => {
                self.attempt_mut()?.assign(target, description)?
            }

            SessionEvent::ProceedToDossier => self.attempt_mut()?.proceed_to_dossier()?,

            SessionEvent::EditSubmission(text) => self.attempt_mut()?.edit_submission(text)?,

            SessionEvent::SubmitDossier => {
                let attempt = self.attempt_mut()?;
                let request = attempt.submit()?;
                return Ok(vec![Effect::RequestFeedback { attempt_id: attempt.id, request }]);
            }

            SessionEvent::FeedbackResolved { attempt_id, result } => {
                let (Some(user), Some(attempt)) = (self.user.as_ref(), self.attempt.as_mut()) else {
                    debug!(target: "mission", attempt = attempt_id, "Feedback arrived after the session moved on; dropped");
                    return Ok(vec![]);
                };
                if attempt.id != attempt_id {
                    debug!(target: "mission", attempt = attempt_id, current = attempt.id, "Feedback for an abandoned attempt; dropped");
                    return Ok(vec![]);
                }
                if attempt.resolve(result)? {
                    return Ok(vec![Effect::RecordCompletion {
                        user: user.clone(),
                        mission_id: attempt.mission.id.clone(),
                    }]);
                }
            }

            SessionEvent::Draft(edit) => self.draft_mut()?.apply(edit)?,

            SessionEvent::SaveMission => {
                let draft = self.draft_mut()?.clone();
                let editing = draft.editing.is_some();
                let mission = draft.finish()?;
                self.show(View::Missions);
                let effect = if editing { Effect::UpdateMission(mission) } else { Effect::CreateMission(mission) };
                return Ok(vec![effect]);
            }
        }
        Ok(vec![])
    }
}
