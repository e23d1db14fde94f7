use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("SSH connection failed: {0}")]
    SshConnectionError(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config incomplete: {0} is still empty")]
    ConfigIncomplete(String),

    #[error("Remote session is not connected")]
    ConnectionLost,

    #[error("Transfer of '{path}' failed: {reason}")]
    TransferFailed { path: String, reason: String },

    #[error("Remote path not found: {0}")]
    RemoteNotFound(String),

    #[error("Cancelled by user")]
    UserCancelled,

    #[error("Russh error: {0}")]
    RusshError(#[from] russh::Error),

    #[error("Russh Sftp error: {0}")]
    RusshSftpError(#[from] russh_sftp::client::error::Error),
}

impl AppError {
    /// Cancellation is a graceful stop, never reported as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::UserCancelled)
    }
}

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;
