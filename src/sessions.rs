//! Default chat-session seed data
//!
//! New installations start from these sessions. The UI session store owns
//! them after creation; this module only provides the static seed.

use serde::{Deserialize, Serialize};

use crate::messages::Role;

/// Kind of session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Chat,
}

/// A message stored inside a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

/// A chat session as persisted by the session store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub messages: Vec<SessionMessage>,
}

/// Default sessions seeded for English-language installations
#[must_use]
pub fn default_sessions_en() -> Vec<Session> {
    vec![Session {
        id: "justchat-b612-406a-985b-3ab4d2c482ff".to_string(),
        name: "Just chat".to_string(),
        session_type: SessionType::Chat,
        messages: vec![SessionMessage {
            id: "a700be6c-cbdd-43a3-b572-49e7a921c059".to_string(),
            role: Role::System,
            content: "You are a helpful assistant. You can help me by answering my questions. \
                      You can also ask me questions."
                .to_string(),
        }],
    }]
}

/// Default sessions seeded for Chinese-language installations
#[must_use]
pub fn default_sessions_zh() -> Vec<Session> {
    Vec::new()
}
