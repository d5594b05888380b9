/// Shared error type used across all persona-chat crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Caller-supplied data is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("character not found: {0}")]
    CharacterNotFound(String),

    /// The upstream call could not complete (timeout, DNS, connection refused).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream answered with a non-success status or an error payload.
    #[error("upstream rejected request{}: {message}", fmt_status(.status))]
    UpstreamRejected {
        status: Option<u16>,
        message: String,
    },

    #[error("upstream returned no completion choices")]
    EmptyCompletion,

    /// A model gateway failure surfaced through the turn pipeline.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code for this error at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::CharacterNotFound(_) => 404,
            _ => 500,
        }
    }

    /// Whether this error originated from the upstream model API.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamUnavailable(_) | Error::UpstreamRejected { .. } | Error::EmptyCompletion
        )
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Error::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(Error::CharacterNotFound("9".into()).status_code(), 404);
        assert_eq!(Error::GenerationFailed("boom".into()).status_code(), 500);
        assert_eq!(Error::Config("no key".into()).status_code(), 500);
    }

    #[test]
    fn rejected_display_includes_status_and_reason() {
        let err = Error::UpstreamRejected {
            status: Some(401),
            message: "No auth credentials found".into(),
        };
        assert_eq!(
            err.to_string(),
            "upstream rejected request (HTTP 401): No auth credentials found"
        );

        let err = Error::UpstreamRejected {
            status: None,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "upstream rejected request: quota exceeded");
    }

    #[test]
    fn upstream_classification() {
        assert!(Error::EmptyCompletion.is_upstream());
        assert!(Error::UpstreamUnavailable("timeout".into()).is_upstream());
        assert!(!Error::GenerationFailed("x".into()).is_upstream());
    }
}
