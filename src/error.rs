use log::error;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Missing config with key \"{key}\"")]
    MissingConfig { key: String },

    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },

    #[error("Internal error (ref {ref_id}): {msg}")]
    Internal { ref_id: String, msg: String },
}

impl AppError {
    /// Wraps an unexpected error with a generated reference id.
    pub fn internal_with_ref(err: impl std::fmt::Display) -> Self {
        Self::Internal {
            ref_id: Uuid::new_v4().to_string(),
            msg: err.to_string(),
        }
    }

    /// Logs an unexpected error and returns the reference id shown to the user.
    pub fn log_with_ref(err: &impl std::fmt::Debug) -> String {
        let ref_id = Uuid::new_v4().to_string();
        error!("[ref {ref_id}] {err:?}");
        ref_id
    }
}
