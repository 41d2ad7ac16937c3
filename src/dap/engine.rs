//! DAP engine trait for abstraction and testability
//!
//! This trait defines the interface to the debug probe command engine,
//! allowing the actual probe backend to be swapped with a mock for testing.

use core::future::Future;

use crate::dap::Packet;
use crate::relay::abort::AbortToken;

/// Abstract DAP command engine
///
/// Exactly one command is in flight at a time; the executor guarantees this.
/// Long-running commands are expected to poll `abort` and terminate early,
/// returning a response that reflects the aborted state. Abort is best
/// effort: the engine may complete normally without ever observing the
/// token, and no acknowledgment is sent to the host either way.
pub trait DapEngine {
    /// Execute one command packet and produce the response packet.
    fn execute(&mut self, request: &Packet, abort: AbortToken<'_>) -> impl Future<Output = Packet>;
}
