//! Nordic UART Service passthrough (`serial` feature)
//!
//! Plain byte-stream bridge between the NUS characteristics and a hardware
//! UART, with no framing or command semantics. NUS RX writes go out the UART;
//! UART bytes come back as NUS TX notifications. Channels decouple the BLE
//! connection loop from the UART tasks; both directions drop on backlog
//! rather than block.

pub mod service;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use crate::config::serial::MAX_CHUNK_SIZE;

/// One bridged byte chunk
pub type Chunk = Vec<u8, MAX_CHUNK_SIZE>;

/// BLE -> UART: NUS RX writes awaiting transmission
pub static UART_TX_CHANNEL: Channel<CriticalSectionRawMutex, Chunk, 4> = Channel::new();

/// UART -> BLE: received bytes awaiting NUS TX notification
pub static UART_RX_CHANNEL: Channel<CriticalSectionRawMutex, Chunk, 4> = Channel::new();

/// Queue NUS RX payload bytes for the UART writer task.
/// Called from the BLE event path, so it must not block.
pub fn forward_to_uart(data: &[u8]) {
    for part in data.chunks(MAX_CHUNK_SIZE) {
        let mut chunk = Chunk::new();
        let _ = chunk.extend_from_slice(part);
        if UART_TX_CHANNEL.try_send(chunk).is_err() {
            log::debug!("serial: UART backlog full, chunk dropped");
        }
    }
}

/// Read UART bytes and hand them to the BLE side for notification
pub async fn uart_reader<R: embedded_io_async::Read>(mut rx: R) {
    let mut buf = [0u8; MAX_CHUNK_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(0) => continue,
            Ok(n) => {
                let mut chunk = Chunk::new();
                let _ = chunk.extend_from_slice(&buf[..n]);
                // Dropped if no peer is draining notifications
                let _ = UART_RX_CHANNEL.try_send(chunk);
            }
            Err(_) => {
                log::debug!("serial: UART read error");
            }
        }
    }
}

/// Drain queued NUS RX chunks out the UART
pub async fn uart_writer<W: embedded_io_async::Write>(mut tx: W) {
    loop {
        let chunk = UART_TX_CHANNEL.receive().await;
        if tx.write_all(&chunk).await.is_err() {
            log::debug!("serial: UART write error");
        }
    }
}
