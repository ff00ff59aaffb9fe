use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Front matter error in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    pub fn front_matter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::FrontMatter {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
