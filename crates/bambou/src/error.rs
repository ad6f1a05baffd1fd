use thiserror::Error;

/// Top-level error type for the `bambou` crate.
///
/// Every failure the session can hit lands here: credential validation,
/// URL resolution, transport, JSON encoding, and server-reported errors.
/// Regardless of variant, callers can always read a [`title`](Self::title)
/// and a [`description`](Self::description), which mirror what the VSD
/// puts in its error payloads.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Missing username, password, API key, or root object.
    #[error("Invalid Credentials: {message}")]
    Authentication { message: String },

    // ── Resource addressing ─────────────────────────────────────────
    /// A non-root resource has no identifier, so it has no personal URL.
    #[error("Missing identifier: cannot resolve the URL of a '{category}' object with no ID set")]
    MissingIdentifier { category: String },

    /// One of the children handed to `assign_children` has no identifier.
    #[error("Missing identifier: one of the '{category}' objects to assign has no ID")]
    UnassignedChild { category: String },

    /// A fetching value (filter, order, attribute list) is not valid header text.
    #[error("Invalid header value for {header}: {reason}")]
    InvalidHeader { header: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error (bad CA file, bad client certificate, etc.)
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Encoding a request body failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Server ──────────────────────────────────────────────────────
    /// Structured error list returned with a 404 or 409.
    #[error("{title}: {description}")]
    Api {
        status: u16,
        title: String,
        description: String,
    },

    /// Any other non-success status, carrying the status line text.
    #[error("{text}")]
    Status { status: u16, text: String },

    // ── Events ──────────────────────────────────────────────────────
    /// The receiving half of the notification channel was dropped.
    #[error("Notification channel closed")]
    EventChannelClosed,
}

impl Error {
    /// Short, human-readable category of the failure.
    ///
    /// Empty for transport and data errors, which only carry a description.
    pub fn title(&self) -> &str {
        match self {
            Self::Authentication { .. } => "Invalid Credentials",
            Self::MissingIdentifier { .. } | Self::UnassignedChild { .. } => "Missing identifier",
            Self::InvalidHeader { .. } => "Invalid header value",
            Self::Api { title, .. } => title,
            Self::Transport(_)
            | Self::InvalidUrl(_)
            | Self::Tls(_)
            | Self::Serialization(_)
            | Self::Deserialization { .. }
            | Self::Status { .. }
            | Self::EventChannelClosed => "",
        }
    }

    /// Detailed explanation of the failure.
    pub fn description(&self) -> String {
        match self {
            Self::Authentication { message } => message.clone(),
            Self::MissingIdentifier { category } => {
                format!("cannot resolve the URL of a '{category}' object with no ID set")
            }
            Self::UnassignedChild { category } => {
                format!("one of the '{category}' objects to assign has no ID")
            }
            Self::InvalidHeader { header, reason } => format!("{header}: {reason}"),
            Self::Api { description, .. } => description.clone(),
            Self::Status { text, .. } => text.clone(),
            Self::Deserialization { message, .. } => message.clone(),
            Self::Transport(e) => e.to_string(),
            Self::InvalidUrl(e) => e.to_string(),
            Self::Serialization(e) => e.to_string(),
            Self::Tls(msg) => msg.clone(),
            Self::EventChannelClosed => "notification channel closed".into(),
        }
    }

    /// HTTP status attached to the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the error indicates rejected credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. }) || matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_server_title_and_description() {
        let err = Error::Api {
            status: 404,
            title: "Object not found".into(),
            description: "Cannot find enterprise with ID 42".into(),
        };

        assert_eq!(err.title(), "Object not found");
        assert_eq!(err.description(), "Cannot find enterprise with ID 42");
        assert_eq!(err.to_string(), "Object not found: Cannot find enterprise with ID 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn status_error_has_empty_title() {
        let err = Error::Status {
            status: 500,
            text: "500 Internal Server Error".into(),
        };

        assert_eq!(err.title(), "");
        assert_eq!(err.description(), "500 Internal Server Error");
        assert!(err.is_transient());
    }

    #[test]
    fn authentication_error_title() {
        let err = Error::Authentication {
            message: "No username given".into(),
        };

        assert_eq!(err.title(), "Invalid Credentials");
        assert_eq!(err.description(), "No username given");
        assert!(err.is_auth_failure());
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_identifier_mentions_category() {
        let err = Error::MissingIdentifier {
            category: "enterprises".into(),
        };

        assert_eq!(err.title(), "Missing identifier");
        assert!(err.description().contains("enterprises"));
    }

    #[test]
    fn invalid_header_names_the_header() {
        let err = Error::InvalidHeader {
            header: "X-Nuage-Filter".into(),
            reason: "failed to parse header value".into(),
        };

        assert_eq!(err.title(), "Invalid header value");
        assert!(err.description().starts_with("X-Nuage-Filter"));
        assert!(!err.is_transient());
    }

    #[test]
    fn unauthorized_status_counts_as_auth_failure() {
        let err = Error::Status {
            status: 401,
            text: "401 Unauthorized".into(),
        };
        assert!(err.is_auth_failure());
        assert!(!err.is_not_found());
    }
}
