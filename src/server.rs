//! The accept loop: owns the listening socket and fans each accepted
//! connection onto its own task.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::board::Board;
use crate::connection;

/// Consecutive `accept()` failures tolerated before giving up on the
/// listening socket entirely. Mirrors the doubling backoff used by
/// long-running async TCP servers in this ecosystem: 1s, 2s, 4s, ... up to
/// a ceiling, and only bail once that ceiling is exceeded.
const MAX_ACCEPT_BACKOFF_SECS: u64 = 64;

/// Runs the accept loop until the listening socket itself fails
/// unrecoverably. Each accepted connection is handled on its own spawned
/// task and never blocks this loop.
pub async fn run(listener: TcpListener, board: Board, debug: bool) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    info!(
        port = local_addr.port(),
        width = board.width(),
        height = board.height(),
        debug,
        "minesweeper server listening"
    );

    let board = Arc::new(Mutex::new(board));
    let player_count = Arc::new(AtomicUsize::new(0));

    let mut backoff_secs = 1;
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                backoff_secs = 1;
                let board = Arc::clone(&board);
                let player_count = Arc::clone(&player_count);
                tokio::spawn(async move {
                    connection::handle(stream, peer, board, player_count, debug).await;
                });
            }
            Err(err) => {
                if backoff_secs > MAX_ACCEPT_BACKOFF_SECS {
                    error!(error = %err, "giving up accepting connections after repeated failures");
                    return Err(err);
                }

                warn!(error = %err, backoff_secs, "accept() failed, retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                backoff_secs *= 2;
            }
        }
    }
}
