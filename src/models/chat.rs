use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::MessageId;
use crate::error::ValidationError;

/// One entry of the chat transcript. Ordered by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: MessageId,
    pub user: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Payload of the `chatMessage` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewChatMessage {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewChatMessage {
    pub fn new(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            message: Some(message.into()),
        }
    }

    /// Returns `(user, message)`. Both must be non-blank; the user is trimmed, the message is kept
    /// verbatim.
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        let user = match self.user {
            Some(u) if !u.trim().is_empty() => u.trim().to_string(),
            Some(_) => {
                return Err(ValidationError::Invalid {
                    field: "user",
                    reason: "must not be blank",
                })
            }
            None => return Err(ValidationError::Missing("user")),
        };
        let message = match self.message {
            Some(m) if !m.trim().is_empty() => m,
            Some(_) => {
                return Err(ValidationError::Invalid {
                    field: "message",
                    reason: "must not be blank",
                })
            }
            None => return Err(ValidationError::Missing("message")),
        };
        Ok((user, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_message_is_rejected() {
        let err = NewChatMessage::new("alice", "  ").validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::Invalid {
                field: "message",
                reason: "must not be blank"
            }
        );
    }

    #[test]
    fn missing_user_is_rejected() {
        let payload = NewChatMessage {
            user: None,
            message: Some("hi".into()),
        };
        assert_eq!(payload.validate(), Err(ValidationError::Missing("user")));
    }

    #[test]
    fn user_is_trimmed() {
        let (user, message) = NewChatMessage::new(" alice ", "hi").validate().unwrap();
        assert_eq!(user, "alice");
        assert_eq!(message, "hi");
    }
}
