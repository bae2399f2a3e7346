//! Board construction: either a random mine layout or a file matching the
//! board-file grammar.
//!
//! ```text
//! FILE    ::= HEADER LINE+
//! HEADER  ::= INT SP INT NEWLINE        ; first INT = W, second = H
//! LINE    ::= (VAL SP)* VAL NEWLINE     ; exactly W values
//! VAL     ::= "0" | "1"                 ; 1 = mine, 0 = no mine
//! ```

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::board::Board;
use crate::error::{Error, Result};

/// Probability that a randomly-generated cell holds a mine.
const RANDOM_MINE_PROBABILITY: f64 = 0.25;

/// Generates a `width x height` board with each cell independently mined
/// with probability [`RANDOM_MINE_PROBABILITY`].
pub fn random_board(width: usize, height: usize) -> Board {
    let mut rng = rand::rng();
    let mines = (0..height)
        .map(|_| {
            (0..width)
                .map(|_| rng.random_bool(RANDOM_MINE_PROBABILITY))
                .collect()
        })
        .collect();
    Board::from_mines(mines)
}

/// Parses a board file at `path` per the grammar above.
pub fn load_board_file(path: &Path) -> Result<Board> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::BoardFileIo {
        path: path.to_path_buf(),
        source,
    })?;

    parse_board_file(path.to_path_buf(), &contents)
}

fn parse_board_file(path: PathBuf, contents: &str) -> Result<Board> {
    let mut lines = contents.lines();

    let header = lines.next().ok_or_else(|| Error::MissingHeader {
        path: path.clone(),
    })?;

    let (width, height) = parse_header(&path, header)?;

    let data_lines: Vec<&str> = lines.collect();
    if data_lines.len() != height {
        return Err(Error::RowCountMismatch {
            path,
            expected_rows: height,
            actual_rows: data_lines.len(),
        });
    }

    let mut mines = Vec::with_capacity(height);
    for (row, line) in data_lines.into_iter().enumerate() {
        mines.push(parse_data_row(&path, row, line, width)?);
    }

    Ok(Board::from_mines(mines))
}

fn parse_header(path: &Path, header: &str) -> Result<(usize, usize)> {
    let mut tokens = header.split(' ');
    let (Some(w), Some(h), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(Error::InvalidHeader {
            path: path.to_path_buf(),
            header: header.to_string(),
        });
    };

    let invalid_header = || Error::InvalidHeader {
        path: path.to_path_buf(),
        header: header.to_string(),
    };

    let width: usize = w.parse().map_err(|_| invalid_header())?;
    let height: usize = h.parse().map_err(|_| invalid_header())?;

    if width == 0 || height == 0 {
        return Err(invalid_header());
    }

    Ok((width, height))
}

fn parse_data_row(path: &Path, row: usize, line: &str, expected_width: usize) -> Result<Vec<bool>> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != expected_width {
        return Err(Error::RowWidthMismatch {
            path: path.to_path_buf(),
            row,
            expected: expected_width,
            actual: tokens.len(),
        });
    }

    tokens
        .into_iter()
        .map(|token| match token {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(Error::InvalidToken {
                path: path.to_path_buf(),
                row,
                token: other.to_string(),
            }),
        })
        .collect()
}
