//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::authoring::{DraftEdit, MissionDraft};
use crate::domain::{LeaderboardEntry, Mission, Role, User, Vocabulary};
use crate::progress::{MatchingBoard, MissionAttempt, Phase, StepProgress};
use crate::session::{NavItem, View};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Login {
        role: Role,
        #[serde(default)]
        name: String,
        #[serde(default)]
        passphrase: String,
    },
    Logout,
    Navigate {
        view: View,
    },
    OpenMission {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    EditMission {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    CompleteVocabulary,
    AssignDescription {
        target: u32,
        description: u32,
    },
    ProceedToDossier,
    EditSubmission {
        text: String,
    },
    SubmitDossier,
    Draft {
        edit: DraftEdit,
    },
    SaveMission,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    View {
        screen: ViewOut,
    },
    Error {
        message: String,
    },
}

/// Everything the client needs to draw the current screen.
#[derive(Debug, Serialize)]
pub struct ViewOut {
    pub user: Option<User>,
    pub nav: Vec<NavItem>,
    #[serde(flatten)]
    pub page: Page,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Page {
    Login,
    Home,
    About { paragraphs: Vec<&'static str> },
    Missions { missions: Vec<MissionSummary>, can_edit: bool },
    Leaderboard { entries: Vec<LeaderboardEntry> },
    MissionDetail { attempt: AttemptOut },
    MissionForm { draft: MissionDraft },
}

/// Mission card for the mission board.
#[derive(Debug, Serialize)]
pub struct MissionSummary {
    pub id: String,
    pub title: String,
    pub objective: String,
    pub points: u32,
    pub interactive: bool,
}

/// Mission as shown on its detail page. The feedback prompt and the pair
/// answer key stay on the server.
#[derive(Debug, Serialize)]
pub struct MissionOut {
    pub id: String,
    pub title: String,
    pub objective: String,
    pub briefing: String,
    pub tasks: Vec<String>,
    pub points: u32,
    pub interactive: bool,
}

#[derive(Debug, Serialize)]
pub struct AttemptOut {
    pub attempt_id: u64,
    pub mission: MissionOut,
    pub step: StepProgress,
    #[serde(flatten)]
    pub phase: PhaseOut,
}

#[derive(Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseOut {
    Vocabulary {
        vocabulary: Vocabulary,
    },
    Matching {
        targets: Vec<TargetOut>,
        available: Vec<DescriptionOut>,
        complete: bool,
    },
    Submission {
        informant_image_url: Option<String>,
        text: String,
        loading: bool,
        error: String,
        feedback: String,
        awarded_points: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
pub struct TargetOut {
    pub id: u32,
    pub image_url: String,
    pub placed: Option<DescriptionOut>,
    pub correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DescriptionOut {
    pub id: u32,
    pub description: String,
}

pub fn to_summary(m: &Mission) -> MissionSummary {
    MissionSummary {
        id: m.id.clone(),
        title: m.title.clone(),
        objective: m.objective.clone(),
        points: m.points,
        interactive: m.interactive().is_some(),
    }
}

pub fn to_out(m: &Mission) -> MissionOut {
    MissionOut {
        id: m.id.clone(),
        title: m.title.clone(),
        objective: m.objective.clone(),
        briefing: m.briefing.clone(),
        tasks: m.tasks.clone(),
        points: m.points,
        interactive: m.interactive().is_some(),
    }
}

fn board_out(board: &MatchingBoard) -> PhaseOut {
    let describe = |id: u32| DescriptionOut {
        id,
        description: board.description_text(id).unwrap_or_default().to_string(),
    };
    let targets = board
        .pairs()
        .iter()
        .map(|p| {
            let placed = board.placed(p.id);
            TargetOut {
                id: p.id,
                image_url: p.image_url.clone(),
                placed: placed.map(describe),
                correct: placed.map(|d| d == p.id),
            }
        })
        .collect();
    let available = board.available().iter().map(|p| describe(p.id)).collect();
    PhaseOut::Matching { targets, available, complete: board.is_complete() }
}

pub fn attempt_out(a: &MissionAttempt) -> AttemptOut {
    let phase = match a.phase() {
        Phase::Vocabulary => PhaseOut::Vocabulary {
            vocabulary: a.mission.interactive().map(|c| c.vocabulary.clone()).unwrap_or_default(),
        },
        Phase::Matching(board) => board_out(board),
        Phase::Submission => PhaseOut::Submission {
            informant_image_url: a.mission.interactive().map(|c| c.informant_image_url.clone()),
            text: a.submission.clone(),
            loading: a.loading,
            error: a.error.clone(),
            feedback: a.feedback.clone(),
            awarded_points: (!a.feedback.is_empty()).then_some(a.mission.points),
        },
    };
    AttemptOut { attempt_id: a.id, mission: to_out(&a.mission), step: a.step(), phase }
}

//
// HTTP response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub feedback_enabled: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
