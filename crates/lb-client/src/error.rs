/// Everything that can go wrong talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not connect to the backend at {base}")]
    Connect { base: String },
    #[error("request to {path} timed out")]
    Timeout { path: String },
    #[error("not authorized for {path}")]
    Unauthorized { path: String },
    #[error("{path}: HTTP {status}")]
    Status { status: u16, path: String },
    #[error("{path}: unexpected response body: {message}")]
    Decode { path: String, message: String },
    #[error("{path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Classify a transport-level reqwest error.
    pub(crate) fn from_reqwest(err: reqwest::Error, base: &str, path: &str) -> Self {
        if err.is_connect() {
            ApiError::Connect { base: base.to_string() }
        } else if err.is_timeout() {
            ApiError::Timeout { path: path.to_string() }
        } else if err.is_decode() {
            ApiError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            }
        } else {
            ApiError::Http {
                path: path.to_string(),
                source: err,
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Fixed, operator-facing message for a failed login. The cause itself is
    /// only logged.
    pub fn login_message(&self) -> &'static str {
        if self.is_unauthorized() {
            "Invalid username or password"
        } else {
            "Login failed"
        }
    }

    /// Message with a hint for the operator, used by the CLI and alert modal.
    pub fn friendly(&self) -> String {
        match self {
            ApiError::Connect { base } => format!(
                "Could not connect to the backend at {base}. Is it running?\n  \
                 (hint: check --api-url or LEADBOARD_API_URL)"
            ),
            ApiError::Timeout { .. } => {
                "Request timed out. The backend may be overloaded.".to_string()
            }
            ApiError::Unauthorized { .. } => {
                "Not authorized. Provide --username/--password or set LEADBOARD_PASSWORD.".to_string()
            }
            other => format!("API request failed: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_message_only_distinguishes_401() {
        let unauthorized = ApiError::Unauthorized { path: "/auth/login".into() };
        assert_eq!(unauthorized.login_message(), "Invalid username or password");
        let server = ApiError::Status { status: 500, path: "/auth/login".into() };
        assert_eq!(server.login_message(), "Login failed");
        assert_eq!(server.status(), Some(500));
    }

    #[test]
    fn friendly_connect_mentions_base() {
        let err = ApiError::Connect { base: "http://10.0.0.1:8001/api".into() };
        assert!(err.friendly().contains("10.0.0.1:8001"));
        assert!(err.friendly().contains("LEADBOARD_API_URL"));
    }
}
