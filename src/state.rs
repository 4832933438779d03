//! Application state shared by every connection.
//!
//! This module owns:
//!   - the mission catalog (TOML config or built-in seeds)
//!   - the leaderboard
//!   - the identity gate (teacher passphrase)
//!   - the optional feedback client
//!
//! Per-learner progress is not here: it lives in each connection's `Session`.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::catalog::MissionCatalog;
use crate::config::{load_app_config_from_env, resolve_teacher_passphrase, AppConfig};
use crate::feedback::{FeedbackClient, OpenAI};
use crate::identity::{IdentityProvider, PassphraseGate};
use crate::leaderboard::Leaderboard;
use crate::seeds::seed_missions;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<MissionCatalog>>,
    pub leaderboard: Arc<RwLock<Leaderboard>>,
    pub identity: Arc<dyn IdentityProvider>,
    pub feedback: Option<Arc<dyn FeedbackClient>>,
}

impl AppState {
    /// Build state from env: load config, seed the catalog, init the feedback client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env();
        let passphrase = resolve_teacher_passphrase(std::env::var("TEACHER_PASSPHRASE").ok(), cfg.as_ref());

        let feedback: Option<Arc<dyn FeedbackClient>> = match OpenAI::from_env() {
            Some(oa) => {
                info!(target: "mission_possible", base_url = %oa.base_url, model = %oa.model, "OpenAI feedback enabled.");
                Some(Arc::new(oa))
            }
            None => {
                info!(target: "mission_possible", "OpenAI disabled (no OPENAI_API_KEY). Dossier submissions will fail with a retry message.");
                None
            }
        };

        Self::from_parts(cfg, Arc::new(PassphraseGate::new(passphrase)), feedback)
    }

    /// Assemble state from already-resolved pieces. A config with missions replaces the seeds.
    pub fn from_parts(
        cfg: Option<AppConfig>,
        identity: Arc<dyn IdentityProvider>,
        feedback: Option<Arc<dyn FeedbackClient>>,
    ) -> Self {
        let missions = match cfg {
            Some(c) if !c.missions.is_empty() => c.missions,
            _ => seed_missions(),
        };
        let interactive = missions.iter().filter(|m| m.interactive().is_some()).count();
        info!(target: "mission", total = missions.len(), interactive, "Startup mission inventory");

        Self {
            catalog: Arc::new(RwLock::new(MissionCatalog::new(missions))),
            leaderboard: Arc::new(RwLock::new(Leaderboard::default())),
            identity,
            feedback,
        }
    }
}
