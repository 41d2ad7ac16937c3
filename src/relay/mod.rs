//! Command relay pipeline
//!
//! Connects the BLE callback path to the single command executor: report
//! slots for both HID directions, a bounded command queue, the cooperative
//! abort flag, and the notification gate. All state is aggregated in
//! [`RelayState`] and injected by reference into the transport adapter and
//! the executor.

pub mod abort;
pub mod adapter;
pub mod executor;
pub mod gate;
pub mod report;

pub use adapter::{HidTransport, ReportError};
pub use executor::CommandExecutor;

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config::relay::COMMAND_QUEUE_DEPTH;
use crate::dap::Packet;
use abort::AbortSignal;
use gate::NotificationGate;
use report::ReportStore;

/// Shared state of the relay pipeline
///
/// Created once (typically in a `static`) and handed to both the BLE side
/// ([`HidTransport`]) and the executor task ([`CommandExecutor`]). Lives for
/// the whole process.
pub struct RelayState {
    /// Bounded FIFO from the BLE callback path to the executor.
    /// Push is non-blocking (overflow drops), pop waits forever.
    pub(crate) queue: Channel<CriticalSectionRawMutex, Packet, COMMAND_QUEUE_DEPTH>,
    pub(crate) reports: ReportStore,
    pub(crate) abort: AbortSignal,
    pub(crate) gate: NotificationGate,
    /// Responses awaiting a notification push, one entry per completed
    /// command. Bounded like the command queue so the executor can drain a
    /// full batch of commands without the BLE task running in between and
    /// still get every notification out.
    pub(crate) notify: Channel<CriticalSectionRawMutex, Packet, COMMAND_QUEUE_DEPTH>,
    /// Commands dropped because the queue was full
    pub(crate) dropped: AtomicU32,
}

impl RelayState {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            reports: ReportStore::new(),
            abort: AbortSignal::new(),
            gate: NotificationGate::new(),
            notify: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Wait for the next notification push request from the executor.
    ///
    /// Consumed by the BLE connection loop, which performs the actual GATT
    /// notify. Only fed while the gate is enabled; responses come out in
    /// completion order.
    pub async fn next_notification(&self) -> Packet {
        self.notify.receive().await
    }

    /// Discard any push requests still pending from an earlier subscription.
    ///
    /// Called by the BLE loop when a connection attaches, so a response left
    /// over from a torn-down link is never delivered to the new peer.
    pub fn drain_notifications(&self) {
        while self.notify.try_receive().is_ok() {}
    }

    /// Number of commands dropped due to queue overflow since boot
    pub fn dropped_commands(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Subscription state holder for the input report characteristic
    pub fn gate(&self) -> &NotificationGate {
        &self.gate
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}
