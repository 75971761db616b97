use std::{
    fmt,
    path::PathBuf,
};

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failures surfaced by the wallet and contract calls.
///
/// Every variant ends up as a notice; none of them is fatal to the session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClientError {
    /// No wallet is available to connect with.
    WalletMissing { dir: PathBuf },
    /// The user declined the unlock prompt or the transaction.
    Declined,
    Failure {
        reason: Option<String>,
        message: Option<String>,
    },
}

impl ClientError {
    pub fn failure(message: impl Into<String>) -> Self {
        ClientError::Failure {
            reason: None,
            message: Some(message.into()),
        }
    }

    /// Revert reason when there is one, then the error text.
    pub fn clearest_message(&self) -> Option<String> {
        match self {
            ClientError::WalletMissing { dir } => {
                Some(format!("no wallet found in {}", dir.display()))
            }
            ClientError::Declined => Some("declined by the user".to_string()),
            ClientError::Failure { reason, message } => non_blank(reason)
                .or_else(|| non_blank(message)),
        }
    }

    /// The error text itself, falling back to the revert reason.
    pub fn plain_message(&self) -> Option<String> {
        match self {
            ClientError::Failure { reason, message } => non_blank(message)
                .or_else(|| non_blank(reason)),
            other => other.clearest_message(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clearest_message() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "unknown error"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<fuels::types::errors::Error> for ClientError {
    fn from(err: fuels::types::errors::Error) -> Self {
        let message = err.to_string();
        ClientError::Failure {
            reason: revert_reason(&message).map(str::to_string),
            message: Some(message),
        }
    }
}

fn non_blank(text: &Option<String>) -> Option<String> {
    text.as_ref()
        .filter(|text| !text.trim().is_empty())
        .cloned()
}

/// Pulls the revert reason out of a rendered `fuels` transaction error,
/// dropping the receipts dump that follows it.
pub fn revert_reason(rendered: &str) -> Option<&str> {
    const MARKER: &str = "reverted: ";
    let start = rendered.find(MARKER)? + MARKER.len();
    let rest = &rendered[start..];
    let end = rest.find(", receipts:").unwrap_or(rest.len());
    let reason = rest[..end].trim();
    (!reason.is_empty()).then_some(reason)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn revert_reason__extracts_reason_before_receipts() {
        // given
        let rendered = "transaction reverted: InvalidMove, receipts: [Call { .. }]";

        // when
        let reason = revert_reason(rendered);

        // then
        assert_eq!(reason, Some("InvalidMove"));
    }

    #[test]
    fn revert_reason__returns_none_for_other_errors() {
        assert_eq!(revert_reason("provider: connection refused"), None);
        assert_eq!(revert_reason("transaction reverted: , receipts: []"), None);
    }

    #[test]
    fn clearest_message__prefers_reason_over_message() {
        let err = ClientError::Failure {
            reason: Some("InvalidMove".to_string()),
            message: Some("transaction reverted: InvalidMove, receipts: []".to_string()),
        };
        assert_eq!(err.clearest_message().as_deref(), Some("InvalidMove"));
    }

    #[test]
    fn clearest_message__falls_back_to_message_then_none() {
        let with_message = ClientError::failure("node unreachable");
        assert_eq!(
            with_message.clearest_message().as_deref(),
            Some("node unreachable")
        );

        let empty = ClientError::Failure {
            reason: None,
            message: Some("  ".to_string()),
        };
        assert_eq!(empty.clearest_message(), None);
        assert_eq!(empty.to_string(), "unknown error");
    }

    #[test]
    fn plain_message__prefers_message_over_reason() {
        // given
        let both = ClientError::Failure {
            reason: Some("InvalidMove".to_string()),
            message: Some("provider: call failed".to_string()),
        };
        let reason_only = ClientError::Failure {
            reason: Some("InvalidMove".to_string()),
            message: None,
        };

        // then
        assert_eq!(both.plain_message().as_deref(), Some("provider: call failed"));
        assert_eq!(reason_only.plain_message().as_deref(), Some("InvalidMove"));
        assert_eq!(
            ClientError::Declined.plain_message(),
            ClientError::Declined.clearest_message()
        );
    }
}
