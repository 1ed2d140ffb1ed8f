//! One-shot messages carried in the session until the next page render.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::WebError;

const FLASH_KEY: &str = "_flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Info,
}

impl FlashLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Danger => "alert-danger",
            Self::Info => "alert-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Queues a message for the next rendered page.
pub async fn push(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), WebError> {
    let mut pending: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    pending.push(Flash::new(level, message));
    session.insert(FLASH_KEY, pending).await?;
    Ok(())
}

/// Removes and returns every queued message.
pub async fn take(session: &Session) -> Result<Vec<Flash>, WebError> {
    Ok(session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
