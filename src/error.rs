use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the host runtime and the interception layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid wrap configuration: {0}")]
    Config(String),

    #[error("Can't locate {module} (searched: {})", display_paths(.searched))]
    Load {
        module: String,
        searched: Vec<PathBuf>,
    },

    #[error("Syntax error in {path} line {line}: {message}")]
    Syntax {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Not a fully qualified name: {0}")]
    InvalidName(String),

    #[error("Undefined subroutine &{0} called")]
    UndefinedSub(String),

    #[error("Can't locate object method \"{method}\" via package \"{class}\"")]
    MethodNotFound { class: String, method: String },

    #[error("{0}")]
    Died(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no search paths".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
