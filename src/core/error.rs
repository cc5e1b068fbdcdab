use thiserror::Error;

/// Failure taxonomy for a single chat-completion invocation.
///
/// Every failure is fatal: nothing in this crate retries or recovers,
/// so errors propagate with `?` until [`crate::cli::main`] prints them
/// and exits with [`SayError::exit_code`].
#[derive(Debug, Error)]
pub enum SayError {
    /// Required configuration is missing or malformed. Raised before
    /// any client is built, so no network traffic has happened yet.
    #[error("{message}")]
    Configuration { message: String },

    /// The HTTP exchange itself failed (connection, TLS, decode).
    #[error("network error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The response parsed as JSON but did not carry
    /// `choices[0].message.content`.
    #[error("unexpected response shape: {message}")]
    ResponseShape { message: String },
}

impl SayError {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn response_shape<S: Into<String>>(message: S) -> Self {
        Self::ResponseShape {
            message: message.into(),
        }
    }

    /// Exit status for the process boundary. Configuration problems use
    /// a distinct code so scripts can tell them apart from request
    /// failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            SayError::Configuration { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_exit_with_code_two() {
        assert_eq!(SayError::configuration("missing key").exit_code(), 2);
    }

    #[test]
    fn request_failures_exit_with_code_one() {
        let upstream = SayError::UpstreamStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(upstream.exit_code(), 1);
        assert_eq!(SayError::response_shape("no choices").exit_code(), 1);
    }

    #[test]
    fn upstream_status_mentions_status_and_body() {
        let err = SayError::UpstreamStatus {
            status: 404,
            body: "model not found".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("404"));
        assert!(rendered.contains("model not found"));
    }
}
