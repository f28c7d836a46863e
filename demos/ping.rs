//! Ping demo - one listener, one dialer, one round trip.
//!
//! This example demonstrates:
//! - Registering the IPC transport in an explicit registry
//! - Binding a listener and running a small accept loop
//! - Dialing the same endpoint and exchanging bytes over the pipe
//!
//! Run with:
//!
//! ```sh
//! cargo run --example ping
//! ```

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use pipelink::ipc::IpcTransport;
use pipelink::tran::{Dialer as _, Listener as _, ProtocolInfo, Socket, TransportRegistry};

/// A stand-in for the message-socket core that owns the endpoints.
struct PairSocket;

impl Socket for PairSocket {
    fn info(&self) -> ProtocolInfo {
        ProtocolInfo {
            self_id: 0x10,
            peer_id: 0x10,
            self_name: "pair",
            peer_name: "pair",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut registry = TransportRegistry::new();
    registry.register(Arc::new(IpcTransport::new()));

    let dir = tempfile::tempdir()?;
    let addr = format!("ipc://{}", dir.path().join("ping.sock").display());

    let listener = registry.new_listener(&addr, &PairSocket)?;
    listener.listen().await?;
    println!("listening on {}", listener.address());

    // Accept loop: echo one message per connection.
    let server = tokio::spawn(async move {
        let mut pipe = listener.accept().await?;
        let mut buf = [0u8; 4];
        pipe.read_exact(&mut buf).await?;
        pipe.write_all(&buf).await?;
        Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
    });

    let dialer = registry.new_dialer(&addr, &PairSocket)?;
    let mut pipe = dialer.dial().await?;

    pipe.write_all(b"ping").await?;
    let mut buf = [0u8; 4];
    pipe.read_exact(&mut buf).await?;
    println!("received {:?}", std::str::from_utf8(&buf)?);

    server.await?.map_err(|e| e.to_string())?;
    Ok(())
}
