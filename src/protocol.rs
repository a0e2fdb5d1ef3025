//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase on the wire to match the IDE extension and dashboard.

use serde::{Deserialize, Serialize};

use crate::catalog::LanguageInfo;
use crate::detection::{BehavioralSignals, DetectionResult, SessionTelemetry};
use crate::domain::{Quest, SessionStatus, SubmissionStats};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SessionUpdate {
        #[serde(rename = "sessionId")]
        session_id: String,
        metrics: SessionMetricsIn,
    },
    AnalyzeSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    NewQuest {
        #[serde(rename = "skillLevel")]
        skill_level: String,
        #[serde(default)]
        language: Option<String>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SessionUpdated {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Analysis {
        #[serde(rename = "sessionId")]
        session_id: String,
        detection: DetectionResult,
        tips: Vec<String>,
    },
    Quest {
        quest: Quest,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct RootOut {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdOut {
    pub status: &'static str,
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStartIn {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Counters reported on update and end. Telemetry fields sit at the top level.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetricsIn {
    #[serde(flatten)]
    pub telemetry: SessionTelemetry,
    #[serde(default)]
    pub files_edited: Vec<String>,
    #[serde(default)]
    pub languages_used: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAckOut {
    pub status: &'static str,
    pub session_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalysisOut {
    pub status: &'static str,
    pub session_id: String,
    pub session_status: SessionStatus,
    pub detection: DetectionResult,
    pub tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestQuery {
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct LanguagesOut {
    pub languages: Vec<LanguageInfo>,
}

/// One code submission from the editor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSessionIn {
    pub user_id: String,
    pub email: String,
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub file_name: String,
    /// Seconds spent writing the code.
    pub duration: f64,
    pub keystrokes: u64,
    #[serde(default)]
    pub quest_id: Option<u32>,
    #[serde(default)]
    pub behavioral_signals: Option<BehavioralSignals>,
}

#[derive(Serialize)]
pub struct AnalyzeOut {
    pub status: &'static str,
    pub stats: SubmissionStats,
}

#[derive(Serialize)]
pub struct QuestOut {
    pub status: &'static str,
    pub quest: Quest,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadOut {
    pub status: &'static str,
    pub remote_quests: usize,
    pub total_quests: usize,
}
