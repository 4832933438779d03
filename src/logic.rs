//! Core behaviors shared by the HTTP and WebSocket handlers.
//!
//! This includes:
//!   - translating client messages into session events (catalog lookups, login)
//!   - running the effects a session transition asks for
//!   - calling the feedback collaborator
//!   - rendering the current view for the client

use tracing::{debug, error, info, instrument, warn};

use crate::domain::User;
use crate::feedback::FeedbackError;
use crate::progress::FeedbackRequest;
use crate::protocol::{attempt_out, to_summary, ClientWsMessage, Page, ServerWsMessage, ViewOut};
use crate::session::{nav_items, Effect, Session, SessionEvent, View};
use crate::state::AppState;

const ABOUT: [&str; 4] = [
  "Mission: Possible is a secret agent-themed platform for junior high school students (grades 7-9) to master English.",
  "Agents learn through project-based missions: each one asks you to describe, direct, narrate or plan in English.",
  "Completed missions earn points on the leaderboard. Climb the ranks and prove you're the best agent in the agency.",
  "Teachers can add and update missions at any time, so the adventure never ends.",
];

/// A feedback call the transport has to run off the message loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackJob {
  pub attempt_id: u64,
  pub request: FeedbackRequest,
}

/// What to send back after one client message.
#[derive(Debug, Default)]
pub struct Reply {
  pub messages: Vec<ServerWsMessage>,
  pub jobs: Vec<FeedbackJob>,
}

#[instrument(level = "info", skip(state, session, msg))]
pub async fn handle_client_message(state: &AppState, session: &mut Session, msg: ClientWsMessage) -> Reply {
  let event = match to_event(state, msg).await {
    Ok(Some(event)) => event,
    Ok(None) => return Reply { messages: vec![ServerWsMessage::Pong], jobs: vec![] },
    Err(message) => {
      return Reply {
        messages: vec![ServerWsMessage::Error { message }, render(state, session).await],
        jobs: vec![],
      };
    }
  };
  dispatch(state, session, event).await
}

/// Resolve lookups so the session only sees plain data. `Ok(None)` means ping.
async fn to_event(state: &AppState, msg: ClientWsMessage) -> Result<Option<SessionEvent>, String> {
  let event = match msg {
    ClientWsMessage::Ping => return Ok(None),
    ClientWsMessage::Login { role, name, passphrase } => {
      let user = state.identity.authenticate(role, &name, &passphrase).map_err(|e| {
        warn!(target: "mission_possible", ?role, error = %e, "Login rejected");
        e.to_string()
      })?;
      SessionEvent::LoggedIn(user)
    }
    ClientWsMessage::Logout => SessionEvent::Logout,
    ClientWsMessage::Navigate { view } => SessionEvent::Navigate(view),
    ClientWsMessage::OpenMission { mission_id } => SessionEvent::OpenMission(lookup(state, &mission_id).await?),
    ClientWsMessage::EditMission { mission_id } => SessionEvent::EditMission(lookup(state, &mission_id).await?),
    ClientWsMessage::CompleteVocabulary => SessionEvent::CompleteVocabulary,
    ClientWsMessage::AssignDescription { target, description } => SessionEvent::AssignDescription { target, description },
    ClientWsMessage::ProceedToDossier => SessionEvent::ProceedToDossier,
    ClientWsMessage::EditSubmission { text } => SessionEvent::EditSubmission(text),
    ClientWsMessage::SubmitDossier => SessionEvent::SubmitDossier,
    ClientWsMessage::Draft { edit } => SessionEvent::Draft(edit),
    ClientWsMessage::SaveMission => SessionEvent::SaveMission,
  };
  Ok(Some(event))
}

async fn lookup(state: &AppState, mission_id: &str) -> Result<crate::domain::Mission, String> {
  state
    .catalog
    .read()
    .await
    .get(mission_id)
    .cloned()
    .ok_or_else(|| format!("Unknown mission: {}", mission_id))
}

/// Apply one event, run its effects, and render the result.
async fn dispatch(state: &AppState, session: &mut Session, event: SessionEvent) -> Reply {
  let mut reply = Reply::default();
  match session.apply(event) {
    Ok(effects) => {
      for effect in effects {
        match effect {
          Effect::RequestFeedback { attempt_id, request } => reply.jobs.push(FeedbackJob { attempt_id, request }),
          Effect::RecordCompletion { user, mission_id } => record_completion(state, &user, &mission_id).await,
          Effect::CreateMission(mission) => {
            state.catalog.write().await.add(mission);
          }
          Effect::UpdateMission(mission) => {
            if let Err(e) = state.catalog.write().await.replace(mission) {
              warn!(target: "mission", error = %e, "Mission update dropped");
              reply.messages.push(ServerWsMessage::Error { message: e.to_string() });
            }
          }
        }
      }
    }
    Err(e) => {
      debug!(target: "mission_possible", error = %e, "Event rejected");
      reply.messages.push(ServerWsMessage::Error { message: e.to_string() });
    }
  }
  reply.messages.push(render(state, session).await);
  reply
}

/// Credit the mission's current point value. Missions removed meanwhile credit nothing.
#[instrument(level = "info", skip(state, user), fields(name = %user.name))]
pub async fn record_completion(state: &AppState, user: &User, mission_id: &str) {
  let points = state.catalog.read().await.get(mission_id).map(|m| m.points);
  match points {
    Some(points) => {
      state.leaderboard.write().await.record_completion(user, points);
    }
    None => warn!(target: "leaderboard", %mission_id, "Completed mission no longer in catalog; nothing credited"),
  }
}

/// Ask the collaborator for analyst feedback. Failures are logged here and
/// surface to the learner only as the generic retry message.
#[instrument(level = "info", skip(state, request), fields(text_len = request.text.len()))]
pub async fn fetch_feedback(state: &AppState, request: &FeedbackRequest) -> Result<String, FeedbackError> {
  let Some(client) = &state.feedback else {
    error!(target: "mission", "Dossier submitted but no feedback client is configured");
    return Err(FeedbackError::Unavailable);
  };
  match client.get_feedback(&request.text, &request.prompt).await {
    Ok(text) => {
      info!(target: "mission", feedback_len = text.len(), "Feedback received");
      Ok(text)
    }
    Err(e) => {
      error!(target: "mission", error = %e, "Feedback request failed");
      Err(e)
    }
  }
}

/// Feed a finished feedback call back into the session that asked for it.
pub async fn resolve_feedback(
  state: &AppState,
  session: &mut Session,
  attempt_id: u64,
  result: Result<String, FeedbackError>,
) -> Reply {
  dispatch(state, session, SessionEvent::FeedbackResolved { attempt_id, result }).await
}

async fn render(state: &AppState, session: &Session) -> ServerWsMessage {
  ServerWsMessage::View { screen: render_view(state, session).await }
}

/// Map the session's current view to the payload the client draws.
pub async fn render_view(state: &AppState, session: &Session) -> ViewOut {
  let Some(user) = session.user() else {
    return ViewOut { user: None, nav: vec![], page: Page::Login };
  };

  let page = match session.view() {
    View::Home => Page::Home,
    View::About => Page::About { paragraphs: ABOUT.to_vec() },
    View::Leaderboard => Page::Leaderboard { entries: state.leaderboard.read().await.entries().to_vec() },
    View::Missions => missions_page(state, user).await,
    View::MissionDetail => match session.attempt() {
      Some(attempt) => Page::MissionDetail { attempt: attempt_out(attempt) },
      None => missions_page(state, user).await,
    },
    View::MissionForm => match session.draft() {
      Some(draft) => Page::MissionForm { draft: draft.clone() },
      None => Page::Home,
    },
  };

  ViewOut { user: Some(user.clone()), nav: nav_items(user.role), page }
}

async fn missions_page(state: &AppState, user: &User) -> Page {
  let missions = state.catalog.read().await.list().iter().map(to_summary).collect();
  Page::Missions { missions, can_edit: user.is_teacher() }
}
