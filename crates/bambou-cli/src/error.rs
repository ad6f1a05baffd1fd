//! CLI error types with miette diagnostics.
//!
//! Maps `bambou::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bambou_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to VSD at {url}")]
    #[diagnostic(
        code(bambou::connection_failed),
        help(
            "Check that the VSD is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: bambou::Error,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(bambou::tls_error),
        help(
            "Check the client certificate file, configure ca_cert in your profile,\n\
             or use --insecure (-k) against a lab VSD."
        )
    )]
    Tls { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(bambou::timeout),
        help("Increase timeout with --timeout or check VSD responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(bambou::auth_failed),
        help(
            "Verify username, password and organization, or the client certificate.\n\
             The password is read from BAMBOU_PASSWORD, the keyring, or the profile."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(bambou::no_credentials),
        help(
            "Pass --username and set BAMBOU_PASSWORD, pass --certificate,\n\
             or add credentials to the profile (see: bambou config path)."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{title}: {description}")]
    #[diagnostic(code(bambou::not_found))]
    NotFound { title: String, description: String },

    #[error("{title}: {description}")]
    #[diagnostic(code(bambou::conflict))]
    Conflict { title: String, description: String },

    #[error("VSD returned HTTP {status}: {message}")]
    #[diagnostic(code(bambou::api_error))]
    Api { status: u16, message: String },

    #[error(transparent)]
    #[diagnostic(code(bambou::session))]
    Session(bambou::Error),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bambou::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bambou::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No VSD configured")]
    #[diagnostic(
        code(bambou::no_config),
        help(
            "Pass --url (or set BAMBOU_URL), or add a profile to {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(bambou::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(bambou::json), help("Check the JSON data and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(bambou::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the base URL and timeout needed to describe transport failures.
    pub fn from_session(err: bambou::Error, url: &str, timeout_secs: u64) -> Self {
        if let bambou::Error::Transport(ref e) = err {
            if e.is_timeout() {
                return Self::Timeout {
                    seconds: timeout_secs,
                };
            }
            if e.is_connect() {
                return Self::ConnectionFailed {
                    url: url.into(),
                    source: err,
                };
            }
        }
        err.into()
    }
}

// ── bambou::Error → CliError mapping ─────────────────────────────────

impl From<bambou::Error> for CliError {
    fn from(err: bambou::Error) -> Self {
        if err.is_auth_failure() {
            let message = match err.description() {
                d if d.is_empty() => err.to_string(),
                d => d,
            };
            return Self::AuthFailed { message };
        }

        match err {
            bambou::Error::Api {
                status: 404,
                title,
                description,
            } => Self::NotFound { title, description },

            bambou::Error::Api {
                status: 409,
                title,
                description,
            } => Self::Conflict { title, description },

            bambou::Error::Status { status: 404, text } => Self::NotFound {
                title: "Not found".into(),
                description: text,
            },

            bambou::Error::Api {
                status,
                title,
                description,
            } => Self::Api {
                status,
                message: format!("{title}: {description}"),
            },

            bambou::Error::Status { status, text } => Self::Api {
                status,
                message: text,
            },

            bambou::Error::Tls(message) => Self::Tls { message },

            e @ (bambou::Error::MissingIdentifier { .. } | bambou::Error::UnassignedChild { .. }) => {
                Self::Validation {
                    field: "object".into(),
                    reason: e.description(),
                }
            }

            bambou::Error::InvalidHeader { header, reason } => Self::Validation { field: header, reason },

            other => Self::Session(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Session(e) => e.into(),
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_resource_exit_codes() {
        let not_found: CliError = bambou::Error::Api {
            status: 404,
            title: "Object not found".into(),
            description: "no such enterprise".into(),
        }
        .into();
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Object not found: no such enterprise");

        let conflict: CliError = bambou::Error::Api {
            status: 409,
            title: "Duplicate".into(),
            description: "name in use".into(),
        }
        .into();
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn rejected_credentials_map_to_auth() {
        let err: CliError = bambou::Error::Status {
            status: 401,
            text: "401 Unauthorized".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err: CliError = bambou::Error::Authentication {
            message: "No username given".into(),
        }
        .into();
        assert!(matches!(err, CliError::AuthFailed { ref message } if message == "No username given"));
    }

    #[test]
    fn missing_identifier_is_usage_error() {
        let err: CliError = bambou::Error::MissingIdentifier {
            category: "enterprises".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn invalid_header_is_usage_error() {
        let err: CliError = bambou::Error::InvalidHeader {
            header: "X-Nuage-Filter".into(),
            reason: "failed to parse header value".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(err.to_string().contains("X-Nuage-Filter"));
    }

    #[test]
    fn config_credentials_error_maps_to_auth() {
        let err: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
