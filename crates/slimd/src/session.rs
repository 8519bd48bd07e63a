//! Per-connection session loop: the HANDSHAKE/READ_LEN/READ_BODY/TERMINATE
//! state machine that drives one FitNesse SLIM lane end to end.
//!
//! One task per accepted connection; nothing here is shared with any other
//! lane except the read-only [`ConverterRegistry`] and [`ClassResolver`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use slim_core::wire::{self, DISCONNECT, HANDSHAKE_BANNER};
use slim_engine::batch;
use slim_engine::context::ExecutionContext;
use slim_engine::{ClassResolver, ConverterRegistry};

const LENGTH_HEADER_LEN: usize = 7; // 6 digits + separator

/// Byte totals for one completed session, mirroring `RequestResponder`'s
/// `(received, sent)` return value.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionStats {
    pub received: u64,
    pub sent: u64,
}

pub async fn run(
    mut stream: TcpStream,
    peer: SocketAddr,
    converters: Arc<ConverterRegistry>,
    resolver: Arc<dyn ClassResolver>,
) -> SessionStats {
    let mut stats = SessionStats::default();

    if let Err(err) = stream.write_all(HANDSHAKE_BANNER.as_bytes()).await {
        tracing::warn!(%peer, %err, "failed to send handshake banner");
        return stats;
    }
    stats.sent += HANDSHAKE_BANNER.len() as u64;

    let mut ctx = ExecutionContext::new(resolver);

    loop {
        let message_len = match read_length_header(&mut stream).await {
            Ok(Some(len)) => {
                stats.received += LENGTH_HEADER_LEN as u64;
                len
            }
            Ok(None) => {
                tracing::debug!(%peer, "connection closed before next message");
                break;
            }
            Err(err) => {
                tracing::warn!(%peer, %err, "malformed length header, closing connection");
                break;
            }
        };

        let mut body = vec![0u8; message_len];
        if let Err(err) = stream.read_exact(&mut body).await {
            tracing::warn!(%peer, %err, "connection closed mid-message");
            break;
        }
        stats.received += message_len as u64;

        let text = String::from_utf8_lossy(&body).into_owned();
        tracing::debug!(%peer, message = %text, "received message");

        if text == DISCONNECT {
            tracing::debug!(%peer, "received bye, ending session");
            break;
        }

        let items = match wire::decode(&text) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(%peer, %err, "malformed instruction chunk, closing connection");
                break;
            }
        };

        let reply = batch::run(&items, &mut ctx, &converters);
        let framed = format!("{}{}", wire::format_length_header(reply.len()), reply);
        if let Err(err) = stream.write_all(framed.as_bytes()).await {
            tracing::warn!(%peer, %err, "failed to send response");
            break;
        }
        stats.sent += framed.len() as u64;
        tracing::debug!(%peer, response = %reply, "sent response");
    }

    stats
}

/// Read the fixed 7-byte length header, returning `None` on a clean EOF at
/// a message boundary (the peer simply hung up).
async fn read_length_header(stream: &mut TcpStream) -> std::io::Result<Option<usize>> {
    let mut buf = [0u8; LENGTH_HEADER_LEN];
    let mut read = 0;
    while read < LENGTH_HEADER_LEN {
        let n = stream.read(&mut buf[read..]).await?;
        if n == 0 {
            return if read == 0 {
                Ok(None)
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-header",
                ))
            };
        }
        read += n;
    }
    let header = std::str::from_utf8(&buf).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "length header is not UTF-8")
    })?;
    let digits = header.strip_suffix(':').ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("length header {:?} has no ':' separator", header),
        )
    })?;
    wire::parse_length_header(digits)
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
}
