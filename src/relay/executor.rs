//! Command executor
//!
//! The single perpetual worker of the relay. Waits on the command queue,
//! runs each packet through the engine, publishes the response into the
//! input report slot and requests a notification push when the gate is
//! enabled. Exactly one command is in flight at any time, and every
//! dequeued command produces exactly one publish.

use crate::dap::DapEngine;
use crate::relay::RelayState;

pub struct CommandExecutor<'a, E: DapEngine> {
    relay: &'a RelayState,
    engine: E,
}

impl<'a, E: DapEngine> CommandExecutor<'a, E> {
    pub fn new(relay: &'a RelayState, engine: E) -> Self {
        Self { relay, engine }
    }

    /// Run forever. Idle exactly when the queue is empty; this is the only
    /// unbounded wait in the pipeline.
    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }

    /// Process one command cycle: wait, execute, publish.
    ///
    /// There is no execution timeout; an engine call that never returns
    /// stalls the pipeline until reset. The abort flag is cleared after
    /// every call so an abort applies to at most the one command that was
    /// in flight when it arrived.
    pub async fn step(&mut self) {
        let command = self.relay.queue.receive().await;

        let response = self
            .engine
            .execute(&command, self.relay.abort.token())
            .await;
        self.relay.abort.clear();

        self.relay.reports.publish_input(&response);

        if self.relay.gate.is_enabled() {
            // One push request per completed command. The backlog holds as
            // many responses as the command queue holds commands; if the BLE
            // task is that far behind the push is skipped and the response
            // remains readable from the input slot.
            if self.relay.notify.try_send(response).is_err() {
                log::debug!("executor: notification backlog full, push skipped");
            }
        }
    }

    /// Access to the engine, mainly for inspection in tests
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::dap::{PACKET_SIZE, TRANSFER_ABORT};
    use crate::dap::engine::mock::MockEngine;
    use crate::dap::Packet;
    use crate::relay::HidTransport;
    use futures::executor::block_on;

    fn packet_with_first(byte: u8) -> Packet {
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = byte;
        packet
    }

    #[test]
    fn test_fifo_order_reaches_engine() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            for id in [0x02u8, 0x03, 0x04, 0x05] {
                transport
                    .on_output_report_write(&packet_with_first(id))
                    .unwrap();
            }
            for _ in 0..4 {
                executor.step().await;
            }

            let requests = executor.engine().requests();
            let ids: std::vec::Vec<u8> = requests.iter().map(|p| p[0]).collect();
            assert_eq!(ids, [0x02, 0x03, 0x04, 0x05]);
        });
    }

    #[test]
    fn test_publish_updates_input_slot() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            transport
                .on_output_report_write(&packet_with_first(0x10))
                .unwrap();
            executor.step().await;

            // Mock default response echoes the command id
            assert_eq!(transport.read_input_report()[0], 0x10);
        });
    }

    #[test]
    fn test_no_notification_while_unsubscribed() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            transport
                .on_output_report_write(&packet_with_first(0x02))
                .unwrap();
            executor.step().await;

            // Slot updated, but no push requested
            assert_eq!(transport.read_input_report()[0], 0x02);
            assert!(relay.notify.try_receive().is_err());
        });
    }

    #[test]
    fn test_enabling_does_not_notify_retroactively() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            transport
                .on_output_report_write(&packet_with_first(0x02))
                .unwrap();
            executor.step().await;

            // Subscribing after the fact must not replay the old response
            transport.on_subscribe_changed(0, true);
            assert!(relay.notify.try_receive().is_err());

            // The next completed command does notify
            transport
                .on_output_report_write(&packet_with_first(0x03))
                .unwrap();
            executor.step().await;
            let pushed = relay.notify.try_receive().expect("notification expected");
            assert_eq!(pushed[0], 0x03);
        });
    }

    #[test]
    fn test_back_to_back_responses_each_notify() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            transport.on_subscribe_changed(0, true);

            // Two commands complete before the BLE task gets to run; both
            // responses must come out, in completion order
            transport
                .on_output_report_write(&packet_with_first(0x02))
                .unwrap();
            transport
                .on_output_report_write(&packet_with_first(0x03))
                .unwrap();
            executor.step().await;
            executor.step().await;

            assert_eq!(relay.notify.try_receive().expect("first push")[0], 0x02);
            assert_eq!(relay.notify.try_receive().expect("second push")[0], 0x03);
            assert!(relay.notify.try_receive().is_err());
        });
    }

    #[test]
    fn test_drain_discards_pending_notifications() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            // A response completes while subscribed, then the link drops
            // before the push goes out
            transport.on_subscribe_changed(1, true);
            transport
                .on_output_report_write(&packet_with_first(0x02))
                .unwrap();
            executor.step().await;
            transport.on_subscribe_changed(1, false);

            // The next connection starts with a clean backlog
            relay.drain_notifications();
            assert!(relay.notify.try_receive().is_err());

            // The slot itself still serves the response on direct read
            assert_eq!(transport.read_input_report()[0], 0x02);
        });
    }

    #[test]
    fn test_abort_cleared_after_each_cycle() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let mut executor = CommandExecutor::new(&relay, MockEngine::new());

        block_on(async {
            // Two aborts before anything executes collapse into one
            transport
                .on_output_report_write(&packet_with_first(TRANSFER_ABORT))
                .unwrap();
            transport
                .on_output_report_write(&packet_with_first(TRANSFER_ABORT))
                .unwrap();

            transport
                .on_output_report_write(&packet_with_first(0x02))
                .unwrap();
            transport
                .on_output_report_write(&packet_with_first(0x03))
                .unwrap();
            executor.step().await;
            executor.step().await;

            // The engine saw the flag set exactly once, and the abort
            // packets themselves never reached it
            assert_eq!(executor.engine().abort_history().as_slice(), &[true, false]);
            let ids: std::vec::Vec<u8> = executor
                .engine()
                .requests()
                .iter()
                .map(|p| p[0])
                .collect();
            assert_eq!(ids, [0x02, 0x03]);
            assert!(!relay.abort.token().is_aborted());
        });
    }

    #[test]
    fn test_end_to_end_write_execute_notify_read() {
        let relay = RelayState::new();
        let transport = HidTransport::new(&relay);
        let engine = MockEngine::new();

        let mut command = [0u8; PACKET_SIZE];
        command[0] = 0x01;
        command[1] = 0xAA;
        let mut response = [0u8; PACKET_SIZE];
        response[0] = 0x01;
        response[1] = 0xBB;
        engine.queue_response(response);

        let mut executor = CommandExecutor::new(&relay, engine);

        block_on(async {
            transport.on_subscribe_changed(0, true);
            transport.on_output_report_write(&command).unwrap();
            executor.step().await;

            // Notification carries the exact response bytes
            assert_eq!(relay.notify.try_receive(), Ok(response));
            // And a direct read afterwards returns the same bytes
            assert_eq!(transport.read_input_report(), response);
        });
    }
}
