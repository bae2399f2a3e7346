//! Typed error taxonomy for startup failures.
//!
//! Runtime (per-connection) failures never reach this type; they are logged
//! and contained to the connection task that raised them (see
//! [`crate::connection`]).

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can keep the server from coming up.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind listener on port {port}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read board file {}", path.display())]
    BoardFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("board file {} is empty; expected a \"W H\" header line", path.display())]
    MissingHeader { path: PathBuf },

    #[error("board file {} header {header:?} must be two positive integers \"W H\"", path.display())]
    InvalidHeader { path: PathBuf, header: String },

    #[error(
        "board file {} declares {expected_rows} row(s) but contains {actual_rows}", path.display()
    )]
    RowCountMismatch {
        path: PathBuf,
        expected_rows: usize,
        actual_rows: usize,
    },

    #[error(
        "board file {} row {row} has {actual} token(s), expected {expected}", path.display()
    )]
    RowWidthMismatch {
        path: PathBuf,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("board file {} row {row} contains invalid token {token:?}, expected \"0\" or \"1\"", path.display())]
    InvalidToken {
        path: PathBuf,
        row: usize,
        token: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
