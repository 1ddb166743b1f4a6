use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetScribeError {
    #[error("analysis output is unusable: {reason}")]
    MalformedAnalysis { reason: String },

    #[error("report rendering failed: {reason}")]
    Render { reason: String },

    #[error("remote analysis failed: {reason}")]
    RemoteService { reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, MeetScribeError>;
