//! Command-line surface:
//!
//! ```text
//! minesweeper-server [--debug | --no-debug] [--port PORT] [--size X,Y | --file FILE]
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Where a newly-started server gets its mine layout from.
#[derive(Debug, Clone)]
pub enum BoardSource {
    Random { width: usize, height: usize },
    File(PathBuf),
}

/// Fully-resolved startup configuration, ready to hand to [`crate::server`].
#[derive(Debug, Clone)]
pub struct Config {
    pub debug: bool,
    pub port: u16,
    pub board_source: BoardSource,
}

const DEFAULT_PORT: u16 = 4444;
const DEFAULT_SIZE: (usize, usize) = (10, 10);

#[derive(Parser, Debug)]
#[command(
    name = "minesweeper-server",
    about = "A multi-player Minesweeper server speaking a line-oriented TCP protocol"
)]
struct Cli {
    /// Keep a connection open after it digs a mine instead of disconnecting it.
    #[arg(long, overrides_with = "no_debug")]
    debug: bool,

    /// Disconnect a connection after it digs a mine (default).
    #[arg(long, overrides_with = "debug")]
    no_debug: bool,

    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Random board size as "WIDTH,HEIGHT", e.g. --size 20,15.
    #[arg(long, value_parser = parse_size, conflicts_with = "file")]
    size: Option<(usize, usize)>,

    /// Path to a board file to load instead of generating a random board.
    #[arg(long, conflicts_with = "size")]
    file: Option<PathBuf>,
}

fn parse_size(raw: &str) -> Result<(usize, usize), String> {
    let (w, h) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"WIDTH,HEIGHT\", got {raw:?}"))?;

    let width: usize = w
        .parse()
        .map_err(|_| format!("invalid width {w:?} in --size"))?;
    let height: usize = h
        .parse()
        .map_err(|_| format!("invalid height {h:?} in --size"))?;

    if width == 0 || height == 0 {
        return Err("--size dimensions must be positive".to_string());
    }

    Ok((width, height))
}

/// Parses `std::env::args()` into a [`Config`], exiting the process with a
/// usage message on any malformed or unknown flag (clap's default behavior).
pub fn parse() -> Config {
    let cli = Cli::parse();
    Config::from(cli)
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let board_source = match (cli.size, cli.file) {
            (Some((width, height)), None) => BoardSource::Random { width, height },
            (None, Some(path)) => BoardSource::File(path),
            (None, None) => {
                let (width, height) = DEFAULT_SIZE;
                BoardSource::Random { width, height }
            }
            (Some(_), Some(_)) => unreachable!("clap enforces --size/--file are exclusive"),
        };

        Config {
            debug: cli.debug,
            port: cli.port,
            board_source,
        }
    }
}
