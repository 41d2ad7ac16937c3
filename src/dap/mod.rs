//! Debug probe engine boundary
//!
//! The relay treats the probe engine as a black box that turns one command
//! packet into one response packet. The trait lives here so the pipeline can
//! be exercised against a mock on the host.

pub mod engine;
pub mod null;

pub use engine::DapEngine;
pub use null::NullEngine;

use crate::config::dap::PACKET_SIZE;

/// Fixed-length DAP packet, one per direction of the protocol.
///
/// The relay imposes no structure beyond byte 0 of a host-written packet,
/// which is inspected for the transfer-abort identifier.
pub type Packet = [u8; PACKET_SIZE];
