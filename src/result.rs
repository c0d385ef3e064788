use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{0}")]
    Message(String),

    /// A file operation failed; `action` is the verb shown to the user.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn new(message: String) -> ConvertError {
        ConvertError::Message(message)
    }
}

/// Attaches the action and path to a failed file operation.
pub trait IoContext<T> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| -> Error {
            Box::new(ConvertError::Io { action, path: path.to_path_buf(), source })
        })
    }
}

#[macro_export]
macro_rules! convert_err {
    ($($arg:tt)*) => { Box::new(ConvertError::new(format!($($arg)*))) }
}
