//! Conversational coach relay
//!
//! Send text, receive text: the engine hands the coach endpoint the fixed
//! persona, a one-line stats context, and the player's message, and passes
//! the reply back verbatim. Nothing here touches the data model.

use serde::{Deserialize, Serialize};

use crate::sync::{SyncError, SyncResult};

/// Persona for the coach model
pub const SYSTEM_INSTRUCTION: &str = "\
You are THE SYSTEM. An interface designed to level up the Player (User).
The Player is on a Bulking Quest.
Tone: Cold, Gamified, Efficient, Sophisticated.
Vocabulary: \"Quest\", \"Stats\", \"Buffs\", \"Debuffs\", \"Consumables\", \"Dungeon\".
Analyze the user's data. If they miss protein, issue a warning. If they succeed, grant \"Experience\".
Be brief. The System does not waste words.";

#[derive(Serialize)]
struct CoachRequest<'a> {
    system: &'static str,
    context: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct CoachResponse {
    reply: Option<String>,
}

/// Client for the coach endpoint
#[derive(Clone)]
pub struct Coach {
    http: reqwest::Client,
    endpoint: String,
}

impl Coach {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Relay one message; `context` carries the current day's stats line
    pub async fn ask(&self, context: &str, message: &str) -> SyncResult<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&CoachRequest {
                system: SYSTEM_INSTRUCTION,
                context,
                message,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Rejected {
                status: response.status().as_u16(),
                message: "coach endpoint refused the message".to_string(),
            });
        }

        let body: CoachResponse = response.json().await?;
        Ok(body
            .reply
            .unwrap_or_else(|| "I'm reviewing your stats... try again in a moment.".to_string()))
    }
}
