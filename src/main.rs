use anyhow::Context;
use tokio::net::TcpListener;
use tracing::error;

use minesweeper_server::board::Board;
use minesweeper_server::cli::{self, BoardSource};
use minesweeper_server::error::Error;
use minesweeper_server::{loader, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(
            "minesweeper_server=info"
                .parse()
                .expect("static directive always parses"),
        ))
        .init();

    let config = cli::parse();

    let board = build_board(&config.board_source)?;

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|source| Error::Bind {
            port: config.port,
            source,
        })
        .context("failed to start minesweeper server")?;

    if let Err(err) = server::run(listener, board, config.debug).await {
        error!(error = %err, "server terminated");
        return Err(err).context("minesweeper server loop failed");
    }

    Ok(())
}

fn build_board(source: &BoardSource) -> anyhow::Result<Board> {
    match source {
        BoardSource::Random { width, height } => Ok(loader::random_board(*width, *height)),
        BoardSource::File(path) => loader::load_board_file(path)
            .map_err(anyhow::Error::from)
            .context(format!("failed to load board file {}", path.display())),
    }
}
