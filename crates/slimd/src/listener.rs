//! TCP listener: accepts connections and hands each one to its own session
//! task. One lane per connection, no shared mutable state between lanes.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use slim_engine::{ClassResolver, ConverterRegistry};

use crate::session;

pub async fn listen(
    host: &str,
    port: u16,
    converters: Arc<ConverterRegistry>,
    resolver: Arc<dyn ClassResolver>,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!(host, port, "slimd listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                tracing::info!(%peer, "accepted connection");
                let converters = converters.clone();
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    let stats = session::run(stream, peer, converters, resolver).await;
                    tracing::info!(%peer, received = stats.received, sent = stats.sent, "session ended");
                });
            }
            _ = shutdown.recv() => {
                tracing::info!("shutdown signal received, no longer accepting connections");
                return Ok(());
            }
        }
    }
}
