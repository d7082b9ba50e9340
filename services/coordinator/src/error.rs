//! Top-level error classification, mapped to process exit codes (§6
//! "Process exit codes": 0 clean, 1 config error, 2 fatal dependency
//! init failure).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] anyhow::Error),
    #[error("failed to bind server address {0}: {1}")]
    Bind(String, std::io::Error),
}

impl StartupError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Bind(_, _) => 2,
        }
    }
}
