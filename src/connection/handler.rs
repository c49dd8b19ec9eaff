//! Session Handler
//!
//! Each accepted connection runs one session loop:
//!
//! ```text
//! read frame → tokenize → dispatch through the worker pool → write reply
//! ```
//!
//! `PING` and `QUIT` are answered in the session itself and never reach the
//! queue. Requests within a session are strictly serialized: the next frame
//! is not read until the previous reply has been written. Sessions share
//! nothing with each other.
//!
//! Protocol errors (oversized declared lengths, short reads, socket
//! failures) terminate the session without a reply. When debug mode is on,
//! every reply is post-fixed with a parenthesized duration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::BufWriter;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info};

use crate::commands::Reply;
use crate::config::Settings;
use crate::dispatch::WorkerPool;
use crate::fmt::format_duration;
use crate::protocol::frame::{read_frame, write_frame, MAX_PAYLOAD_SIZE};
use crate::protocol::parser::tokenize;

/// Binds the listening socket with `SO_REUSEADDR` and a deep backlog.
pub fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1024)
}

/// Runs one client session to completion.
pub async fn handle_session(
    stream: TcpStream,
    addr: SocketAddr,
    pool: Arc<WorkerPool>,
    settings: Arc<Settings>,
) {
    info!(client = %addr, "client connected");
    let (mut reader, writer) = stream.into_split();
    let mut writer = BufWriter::new(writer);

    loop {
        let payload = match read_frame(&mut reader, MAX_PAYLOAD_SIZE).await {
            Ok(payload) => payload,
            Err(e) if e.is_disconnect() => {
                debug!(client = %addr, "client disconnected");
                break;
            }
            Err(e) => {
                // scanners and malformed peers get silence, not a reply
                debug!(client = %addr, error = %e, "protocol error, closing connection");
                break;
            }
        };

        let line = String::from_utf8_lossy(&payload).into_owned();
        // sampled before dispatch, so a DEBUG toggle applies from the next
        // request onward
        let timed = settings.debug();
        let started = Instant::now();
        let mut args = tokenize(&line);

        let reply = if args.is_empty() {
            Reply::bad("empty command")
        } else {
            let verb = args.remove(0).to_ascii_uppercase();
            match verb.as_str() {
                "QUIT" => {
                    let _ = write_frame(&mut writer, b"+OK Bye").await;
                    break;
                }
                "PING" => Reply::raw("+PONG"),
                _ => pool.dispatch(verb, args).await,
            }
        };

        let mut text = reply.text;
        if timed && !text.starts_with("Stress Test") {
            text.push_str(&format!(" ({})", format_duration(started.elapsed())));
        }
        if let Err(e) = write_frame(&mut writer, text.as_bytes()).await {
            debug!(client = %addr, error = %e, "write failed, closing connection");
            break;
        }
    }
    info!(client = %addr, "session ended");
}
