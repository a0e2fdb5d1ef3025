//! Application state: in-memory session/user/submission stores, the quest catalog,
//! burst parameters and the optional remote quest source.
//!
//! The stores stand in for the external document store: sessions by id, the
//! email -> userId directory, and an append-only submission log. Each sits
//! behind its own tokio `RwLock` so handlers never hold more than one lock
//! across an await.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::catalog::QuestCatalog;
use crate::config::{load_app_config_from_env, AppConfig, BurstConfig};
use crate::domain::{SessionRecord, SubmissionRecord};
use crate::remote::QuestSource;
use crate::seeds::builtin_quests;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    /// Lowercased email -> userId.
    pub users: Arc<RwLock<HashMap<String, String>>>,
    pub submissions: Arc<RwLock<Vec<SubmissionRecord>>>,
    pub catalog: Arc<RwLock<QuestCatalog>>,
    pub burst: BurstConfig,
    pub quest_source: Option<QuestSource>,
}

impl AppState {
    /// Build state from env: load config, seed quests, init the remote source.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();
        let quest_source = QuestSource::from_env();
        if let Some(src) = &quest_source {
            info!(target: "devskill_backend", url = %src.url, "Remote quest source enabled.");
        } else {
            info!(target: "devskill_backend", "Remote quest source disabled (no QUEST_BANK_URL).");
        }
        Self::from_config(cfg, quest_source)
    }

    /// Build state from an already-loaded config. Config quests join the custom layer.
    pub fn from_config(cfg: AppConfig, quest_source: Option<QuestSource>) -> Self {
        let mut catalog = QuestCatalog::new(builtin_quests());
        for q in cfg.quests {
            let title = q.title.clone();
            if let Err(e) = catalog.add_custom(q) {
                error!(target: "quest", %title, error = %e, "Skipping config quest");
            }
        }

        // Inventory summary by language/level.
        for (lang, level, count) in catalog.inventory() {
            info!(target: "quest", %lang, %level, count, "Startup quest inventory");
        }
        info!(target: "quest", total = catalog.len(), "Quest catalog ready");

        let users: HashMap<String, String> = cfg
            .users
            .into_iter()
            .map(|u| (u.email.to_lowercase(), u.user_id))
            .collect();

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(users)),
            submissions: Arc::new(RwLock::new(Vec::new())),
            catalog: Arc::new(RwLock::new(catalog)),
            burst: cfg.burst,
            quest_source,
        }
    }

    #[instrument(level = "debug", skip(self, rec), fields(session_id = %rec.session_id))]
    pub async fn insert_session(&self, rec: SessionRecord) {
        self.sessions.write().await.insert(rec.session_id.clone(), rec);
    }

    /// Read-only access to a session by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<SessionRecord> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Apply `f` to a session in place and return the updated copy.
    pub async fn modify_session<F>(&self, id: &str, f: F) -> Option<SessionRecord>
    where
        F: FnOnce(&mut SessionRecord),
    {
        let mut sessions = self.sessions.write().await;
        let rec = sessions.get_mut(id)?;
        f(rec);
        Some(rec.clone())
    }

    pub async fn remember_user(&self, email: &str, user_id: &str) {
        self.users
            .write()
            .await
            .insert(email.to_lowercase(), user_id.to_string());
    }

    pub async fn lookup_user(&self, email: &str) -> Option<String> {
        self.users.read().await.get(&email.to_lowercase()).cloned()
    }

    pub async fn record_submission(&self, s: SubmissionRecord) {
        self.submissions.write().await.push(s);
    }
}
