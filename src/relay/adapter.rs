//! HID transport adapter
//!
//! The boundary the BLE layer calls into on report reads, writes and
//! subscription changes. Every operation is non-blocking: the BLE event
//! context must never wait on the executor.

use core::fmt::Write;
use core::sync::atomic::Ordering;

use heapless::String;

use crate::config::dap::TRANSFER_ABORT;
use crate::dap::Packet;
use crate::relay::gate::ConnectionId;
use crate::relay::RelayState;

/// Errors surfaced to the transport as protocol-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// Write payload length did not match the fixed report size
    InvalidLength { actual: usize },
}

/// Number of leading bytes included in the received-report debug log
const LOG_PREFIX_LEN: usize = 8;

pub struct HidTransport<'a> {
    relay: &'a RelayState,
}

impl<'a> HidTransport<'a> {
    pub fn new(relay: &'a RelayState) -> Self {
        Self { relay }
    }

    /// Handle a host write to the output report characteristic.
    ///
    /// The payload is copied into the output slot for readback in all cases.
    /// A transfer-abort packet sets the abort flag and is never queued; any
    /// other packet is pushed to the command queue. A full queue drops the
    /// packet and bumps the overflow counter rather than blocking.
    pub fn on_output_report_write(&self, data: &[u8]) -> Result<(), ReportError> {
        let packet: Packet = data
            .try_into()
            .map_err(|_| ReportError::InvalidLength { actual: data.len() })?;

        log::debug!("output report: {}", hex_prefix(&packet));
        self.relay.reports.store_output(&packet);

        if packet[0] == TRANSFER_ABORT {
            self.relay.abort.set();
            return Ok(());
        }

        if self.relay.queue.try_send(packet).is_err() {
            self.relay.dropped.fetch_add(1, Ordering::Relaxed);
            log::debug!("command queue full, packet dropped");
        }

        Ok(())
    }

    /// Serve a host read of the output report characteristic
    pub fn read_output_report(&self) -> Packet {
        self.relay.reports.read_output()
    }

    /// Serve a host read of the input report characteristic
    pub fn read_input_report(&self) -> Packet {
        self.relay.reports.read_input()
    }

    /// Record a subscription lifecycle event for the input report
    pub fn on_subscribe_changed(&self, connection: ConnectionId, enabled: bool) {
        self.relay.gate.set(connection, enabled);
        log::debug!(
            "input report notification {} (conn {})",
            if enabled { "enabled" } else { "disabled" },
            connection
        );
    }
}

/// Format the first few bytes of a packet as hex for logging
fn hex_prefix(packet: &Packet) -> String<{ 3 * LOG_PREFIX_LEN + 2 }> {
    let mut out = String::new();
    for byte in &packet[..LOG_PREFIX_LEN] {
        let _ = write!(out, "{byte:02x} ");
    }
    let _ = out.push_str("..");
    out
}
