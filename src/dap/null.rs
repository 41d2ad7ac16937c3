//! Placeholder probe backend
//!
//! Answers every command with the DAP invalid-command response so the relay
//! pipeline can be brought up and driven end to end before a real probe
//! backend exists.
//!
//! TODO: replace with an SWD backend once the debug pin mapping is finalised.

use crate::config::dap::{PACKET_SIZE, RESPONSE_INVALID};
use crate::dap::{DapEngine, Packet};
use crate::relay::abort::AbortToken;

/// Engine stub that rejects all commands
pub struct NullEngine;

impl NullEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DapEngine for NullEngine {
    async fn execute(&mut self, _request: &Packet, _abort: AbortToken<'_>) -> Packet {
        let mut response = [0u8; PACKET_SIZE];
        response[0] = RESPONSE_INVALID;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::abort::AbortSignal;

    #[test]
    fn test_null_engine_rejects_everything() {
        let mut engine = NullEngine::new();
        let abort = AbortSignal::new();

        futures::executor::block_on(async {
            let mut request = [0u8; PACKET_SIZE];
            request[0] = 0x00; // DAP_Info
            let response = engine.execute(&request, abort.token()).await;

            assert_eq!(response[0], RESPONSE_INVALID);
            assert!(response[1..].iter().all(|&b| b == 0));
        });
    }
}
