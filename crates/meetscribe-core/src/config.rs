use std::env;
use std::path::PathBuf;

use crate::error::{MeetScribeError, Result};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const UPLOAD_DIR_ENV: &str = "MEETSCRIBE_UPLOAD_DIR";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Process configuration, built once at startup and passed into the
/// pipeline. Core logic never reads the environment on its own.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub upload_dir: PathBuf,
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; an unset or empty key is an error so
    /// the process can refuse to start instead of failing mid-request.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| MeetScribeError::MissingApiKey {
                env_var: API_KEY_ENV.to_string(),
            })?;

        let model = env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let upload_dir = env::var(UPLOAD_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));

        Ok(Self {
            api_key,
            model,
            upload_dir,
        })
    }
}
