//! TCP listener implementation

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::connection::handle_client;
use crate::SharedState;

/// Run the TCP accept loop until shutdown is signalled
pub async fn run_tcp_accept_loop(listener: TcpListener, shared_state: SharedState) {
    if let Ok(addr) = listener.local_addr() {
        info!(
            "Listening on {} (history keeps {} lines)",
            addr,
            shared_state.broadcaster.history().capacity()
        );
    }

    let mut shutdown_rx = shared_state.subscribe_shutdown();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        debug!("New TCP connection from {}", peer_addr);
                        let state_clone = shared_state.clone();
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            handle_client(reader, writer, peer_addr.to_string(), state_clone).await;
                        });
                    }
                    Err(e) => {
                        error!("TCP accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping TCP accept loop");
                break;
            }
        }
    }
}
