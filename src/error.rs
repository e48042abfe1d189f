use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElabError {
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP Error {status}: {body}")]
    RemoteHttp { status: u16, body: String },

    #[error("Request Error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ElabError>;

impl ElabError {
    /// Text surfaced to the calling LLM. Transport failures carry different
    /// guidance than HTTP-status failures so the caller knows whether the
    /// remote rejected the request or was never reached at all.
    pub fn user_message(&self) -> String {
        match self {
            ElabError::RemoteHttp { status, body } => {
                format!("Error communicating with eLabFTW: HTTP Error {status}: {body}")
            }
            ElabError::Transport(cause) => format!(
                "Error connecting to eLabFTW server: {cause}\n\n\
                 Please check that:\n\
                 1. The ELABFTW_API_URL is correct\n\
                 2. The server is reachable\n\
                 3. SSL certificates are properly configured (or set ELABFTW_VERIFY_SSL=false for self-signed certs)"
            ),
            ElabError::MissingArgument(_)
            | ElabError::InvalidArgument(_)
            | ElabError::Config(_) => self.to_string(),
            other => format!("An unexpected error occurred: {other}"),
        }
    }
}

impl From<reqwest::Error> for ElabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ElabError::Transport(format!("request timed out: {err}"))
        } else {
            ElabError::Transport(err.to_string())
        }
    }
}
