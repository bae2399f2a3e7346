//! Per-connection I/O loop: greeting, read-dispatch-reply, and the exit
//! conditions (`bye`, EOF, `BOOM` in non-debug mode) that tear it down.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::protocol::{Command, parse_line};

const HELP_TEXT: &str = "\
Commands:
  look                 render the current board
  dig X Y              reveal the cell at (X, Y)
  flag X Y             flag the cell at (X, Y)
  deflag X Y           remove a flag from the cell at (X, Y)
  help                 show this message
  bye                  disconnect";

/// What to send back to the client, and whether the connection should end.
enum Reply {
    Text(String),
    Bye,
    Boom { keep_open: bool },
}

/// Runs one client's session to completion. Never panics; any I/O error
/// simply ends the loop, the same as a clean disconnect.
pub async fn handle(
    stream: TcpStream,
    peer: SocketAddr,
    board: Arc<Mutex<Board>>,
    player_count: Arc<AtomicUsize>,
    debug: bool,
) {
    let players = player_count.fetch_add(1, Ordering::SeqCst) + 1;
    info!(%peer, players, "client connected");

    let (width, height) = {
        let board = board.lock().unwrap();
        (board.width(), board.height())
    };
    let greeting = format!(
        "Welcome to Minesweeper. Players: {players} Board: {width} columns by {height} rows. Type 'help' for help.\n"
    );

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    if let Err(err) = writer.write_all(greeting.as_bytes()).await {
        warn!(%peer, error = %err, "failed to send greeting");
        player_count.fetch_sub(1, Ordering::SeqCst);
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!(%peer, "connection reached EOF");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%peer, error = %err, "read error; closing connection");
                break;
            }
        }

        let command = parse_line(trim_terminator(&line));
        debug!(%peer, ?command, "dispatching command");

        let reply = dispatch(&board, command, debug);

        match reply {
            Reply::Text(text) => {
                if writer.write_all(format!("{text}\n").as_bytes()).await.is_err() {
                    break;
                }
            }
            Reply::Boom { keep_open } => {
                if writer.write_all(b"BOOM!\n").await.is_err() || !keep_open {
                    break;
                }
            }
            Reply::Bye => break,
        }
    }

    let remaining = player_count.fetch_sub(1, Ordering::SeqCst) - 1;
    info!(%peer, players = remaining, "client disconnected");
}

/// Strips a trailing `\n` and, if present, the `\r` before it.
fn trim_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}

/// Executes one command under the board lock, producing the reply to send.
/// The lock is held across both the mutation and the render, so two
/// concurrent clients never observe a torn state.
fn dispatch(board: &Arc<Mutex<Board>>, command: Command, debug: bool) -> Reply {
    match command {
        Command::Look => Reply::Text(render(board)),
        Command::Help | Command::Invalid => Reply::Text(HELP_TEXT.to_string()),
        Command::Bye => Reply::Bye,
        Command::Dig(x, y) => {
            let mut board = board.lock().unwrap();
            if board.dig(x, y) {
                Reply::Boom { keep_open: debug }
            } else {
                Reply::Text(board.render().join("\n"))
            }
        }
        Command::Flag(x, y) => {
            let mut board = board.lock().unwrap();
            board.flag(x, y);
            Reply::Text(board.render().join("\n"))
        }
        Command::Deflag(x, y) => {
            let mut board = board.lock().unwrap();
            board.deflag(x, y);
            Reply::Text(board.render().join("\n"))
        }
    }
}

fn render(board: &Arc<Mutex<Board>>) -> String {
    board.lock().unwrap().render().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn board() -> Arc<Mutex<Board>> {
        Arc::new(Mutex::new(Board::from_mines(vec![
            vec![false, false],
            vec![false, false],
        ])))
    }

    #[test]
    fn trims_lf_and_crlf() {
        assert_eq!(trim_terminator("look\n"), "look");
        assert_eq!(trim_terminator("look\r\n"), "look");
        assert_eq!(trim_terminator("look"), "look");
    }

    #[test]
    fn help_and_invalid_share_reply_text() {
        let board = board();
        let help = matches!(dispatch(&board, Command::Help, false), Reply::Text(t) if t == HELP_TEXT);
        let invalid =
            matches!(dispatch(&board, Command::Invalid, false), Reply::Text(t) if t == HELP_TEXT);
        assert!(help && invalid);
    }

    #[test]
    fn bye_ends_connection_without_text() {
        let board = board();
        assert!(matches!(dispatch(&board, Command::Bye, false), Reply::Bye));
    }

    #[test]
    fn dig_on_safe_cell_renders_board() {
        let board = board();
        match dispatch(&board, Command::Dig(0, 0), false) {
            Reply::Text(text) => assert!(text.contains(' ') || text.contains('-')),
            _ => panic!("expected a rendered reply"),
        }
    }

    #[test]
    fn dig_on_mine_disconnects_outside_debug_mode() {
        let board = Arc::new(Mutex::new(Board::from_mines(vec![vec![true]])));
        assert!(matches!(
            dispatch(&board, Command::Dig(0, 0), false),
            Reply::Boom { keep_open: false }
        ));
    }

    #[test]
    fn dig_on_mine_keeps_connection_open_in_debug_mode() {
        let board = Arc::new(Mutex::new(Board::from_mines(vec![vec![true]])));
        assert!(matches!(
            dispatch(&board, Command::Dig(0, 0), true),
            Reply::Boom { keep_open: true }
        ));
    }

    async fn connected_pair(
        board: Arc<Mutex<Board>>,
        debug: bool,
    ) -> (TcpStream, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let player_count = Arc::new(AtomicUsize::new(0));

        let server_task = tokio::spawn(async move {
            let (stream, peer) = listener.accept().await.unwrap();
            handle(stream, peer, board, player_count, debug).await;
        });

        let client = TcpStream::connect(addr).await.unwrap();
        (client, server_task)
    }

    #[tokio::test]
    async fn greets_and_echoes_look_then_closes_on_bye() {
        let (client, server_task) = connected_pair(board(), false).await;
        let (reader, mut writer) = client.into_split();
        let mut reader = BufReader::new(reader);

        let mut greeting = String::new();
        reader.read_line(&mut greeting).await.unwrap();
        assert!(greeting.starts_with("Welcome to Minesweeper. Players: 1 Board: 2 columns by 2 rows."));

        writer.write_all(b"look\n").await.unwrap();
        let mut row = String::new();
        reader.read_line(&mut row).await.unwrap();
        assert_eq!(row, "- -\n");
        row.clear();
        reader.read_line(&mut row).await.unwrap();
        assert_eq!(row, "- -\n");

        writer.write_all(b"bye\n").await.unwrap();

        let mut trailing = String::new();
        let n = reader.read_line(&mut trailing).await.unwrap();
        assert_eq!(n, 0, "server must close the stream after bye");

        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn boom_disconnects_in_non_debug_mode() {
        let board = Arc::new(Mutex::new(Board::from_mines(vec![vec![true]])));
        let (client, server_task) = connected_pair(board, false).await;
        let (reader, mut writer) = client.into_split();
        let mut reader = BufReader::new(reader);

        let mut greeting = String::new();
        reader.read_line(&mut greeting).await.unwrap();

        writer.write_all(b"dig 0 0\n").await.unwrap();
        let mut reply = String::new();
        reader.read_line(&mut reply).await.unwrap();
        assert_eq!(reply, "BOOM!\n");

        let mut trailing = String::new();
        let n = reader.read_line(&mut trailing).await.unwrap();
        assert_eq!(n, 0, "non-debug mode must disconnect after BOOM");

        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn boom_keeps_connection_open_in_debug_mode() {
        let board = Arc::new(Mutex::new(Board::from_mines(vec![vec![true]])));
        let (client, server_task) = connected_pair(board, true).await;
        let (reader, mut writer) = client.into_split();
        let mut reader = BufReader::new(reader);

        let mut greeting = String::new();
        reader.read_line(&mut greeting).await.unwrap();

        writer.write_all(b"dig 0 0\n").await.unwrap();
        let mut reply = String::new();
        reader.read_line(&mut reply).await.unwrap();
        assert_eq!(reply, "BOOM!\n");

        // the connection stays open in debug mode; a further command still
        // gets a reply instead of an immediate EOF.
        writer.write_all(b"look\n").await.unwrap();
        let mut look = String::new();
        reader.read_line(&mut look).await.unwrap();
        assert_eq!(look, " \n");

        writer.write_all(b"bye\n").await.unwrap();
        let mut trailing = String::new();
        let n = reader.read_line(&mut trailing).await.unwrap();
        assert_eq!(n, 0);

        server_task.await.unwrap();
    }
}
