//! Bluetooth Low Energy module
//!
//! Runs the GATT server for the HID DAP bridge: advertising, a single
//! connection at a time, routing of report writes into the relay pipeline
//! and of executor responses back out as notifications.

pub mod service;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use trouble_host::prelude::*;

use crate::config::device::NAME_PREFIX;
use crate::relay::gate::ConnectionId;
use crate::relay::{HidTransport, RelayState};
use service::{BatteryService, DeviceInfoService, HidService};

/// Format device ID bytes as uppercase hex into a buffer
fn format_device_name<'a>(buf: &'a mut [u8; 20], device_id: &[u8; 3]) -> &'a str {
    const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
    let prefix = NAME_PREFIX.as_bytes();

    buf[..prefix.len()].copy_from_slice(prefix);

    let mut pos = prefix.len();
    for &byte in device_id {
        buf[pos] = HEX_CHARS[(byte >> 4) as usize];
        buf[pos + 1] = HEX_CHARS[(byte & 0x0F) as usize];
        pos += 2;
    }

    // All bytes are ASCII, so this will always succeed
    core::str::from_utf8(&buf[..pos]).unwrap_or(NAME_PREFIX)
}

/// Number of maximum concurrent connections
const CONNECTIONS_MAX: usize = 1;
/// Number of L2CAP channels
const L2CAP_CHANNELS_MAX: usize = 3;

/// GATT server: HID DAP bridge plus the standard auxiliary services
#[gatt_server(mutex_type = CriticalSectionRawMutex)]
struct Server {
    hid: HidService,
    battery: BatteryService,
    device_info: DeviceInfoService,
    #[cfg(feature = "serial")]
    nus: crate::serial::service::NordicUartService,
}

/// Main BLE task that manages the Bluetooth stack and connections
///
/// This task:
/// 1. Initialises the BLE controller
/// 2. Starts advertising as "BlueDAP-XXXXXX" (unique per device)
/// 3. Handles connections and GATT events
/// 4. Routes output report writes into the relay pipeline
/// 5. Pushes executor responses as input report notifications
pub async fn ble_task<C: Controller>(
    controller: C,
    relay: &'static RelayState,
    device_id: [u8; 3],
) {
    let mut device_name_buf = [0u8; 20];
    let device_name = format_device_name(&mut device_name_buf, &device_id);

    log::info!("BLE: starting as '{}'", device_name);

    let mut resources: HostResources<DefaultPacketPool, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX> =
        HostResources::new();

    let stack = trouble_host::new(controller, &mut resources).set_random_address(
        Address::random([device_id[0], device_id[1], device_id[2], 0x1E, 0x83, 0xE7]),
    );

    let Host {
        mut peripheral,
        mut runner,
        ..
    } = stack.build();

    let gap = GapConfig::Peripheral(PeripheralConfig {
        name: device_name,
        appearance: &appearance::UNKNOWN,
    });
    let server: Server = match Server::new_with_config(gap) {
        Ok(s) => s,
        Err(_) => return,
    };

    let runner_task = runner.run();

    let peripheral_task = async {
        let mut adv_data = [0u8; 31];
        let len = match AdStructure::encode_slice(
            &[
                AdStructure::Flags(LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED),
                // HID service so hosts can filter for probes while scanning
                AdStructure::ServiceUuids16(&[[0x12, 0x18]]),
                AdStructure::CompleteLocalName(device_name.as_bytes()),
            ],
            &mut adv_data,
        ) {
            Ok(l) => l,
            Err(_) => return,
        };

        let transport = HidTransport::new(relay);
        let mut conn_seq: ConnectionId = 0;

        loop {
            log::debug!("BLE: advertising...");
            let advertiser = match peripheral
                .advertise(
                    &Default::default(),
                    Advertisement::ConnectableScannableUndirected {
                        adv_data: &adv_data[..len],
                        scan_data: &[],
                    },
                )
                .await
            {
                Ok(a) => a,
                Err(_) => continue,
            };

            let acceptor = match advertiser.accept().await {
                Ok(a) => {
                    log::info!("BLE: connected");
                    a
                }
                Err(_) => continue,
            };

            // Attach to attribute server (using Deref to get &AttributeServer)
            let conn = match acceptor.with_attribute_server(&*server) {
                Ok(c) => c,
                Err(_) => continue,
            };

            conn_seq = conn_seq.wrapping_add(1);
            let conn_id = conn_seq;

            // Responses left over from a previous link must not reach this
            // peer before it subscribes
            relay.drain_notifications();

            // Service this connection until it drops
            loop {
                let gatt_future = conn.next();
                let notify_future = relay.next_notification();
                #[cfg(feature = "serial")]
                let serial_future = crate::serial::UART_RX_CHANNEL.receive();
                #[cfg(not(feature = "serial"))]
                let serial_future = core::future::pending::<()>();

                match embassy_futures::select::select3(gatt_future, notify_future, serial_future)
                    .await
                {
                    embassy_futures::select::Either3::First(gatt_event) => match gatt_event {
                        GattConnectionEvent::Disconnected { reason: _ } => {
                            log::info!("BLE: disconnected");
                            break;
                        }
                        GattConnectionEvent::Gatt { event } => match event {
                            GattEvent::Write(write_event) => {
                                let handle = write_event.handle();

                                if handle == server.hid.output_report.handle {
                                    match transport.on_output_report_write(write_event.data()) {
                                        Ok(()) => {
                                            let _ = write_event.accept();
                                        }
                                        Err(_) => {
                                            let _ = write_event.reject(
                                                AttErrorCode::INVALID_ATTRIBUTE_VALUE_LENGTH,
                                            );
                                        }
                                    }
                                } else if Some(handle) == server.hid.input_report.cccd_handle {
                                    let enabled = write_event
                                        .data()
                                        .first()
                                        .is_some_and(|b| b & 0x01 != 0);
                                    transport.on_subscribe_changed(conn_id, enabled);
                                    let _ = write_event.accept();
                                } else {
                                    #[cfg(feature = "serial")]
                                    if handle == server.nus.rx.handle {
                                        crate::serial::forward_to_uart(write_event.data());
                                    }
                                    let _ = write_event.accept();
                                }
                            }
                            GattEvent::Read(read_event) => {
                                let handle = read_event.handle();

                                // Refresh stored values from the report slots
                                // before the stack answers the read
                                if handle == server.hid.input_report.handle {
                                    let _ = server.set(
                                        &server.hid.input_report,
                                        &transport.read_input_report(),
                                    );
                                } else if handle == server.hid.output_report.handle {
                                    let _ = server.set(
                                        &server.hid.output_report,
                                        &transport.read_output_report(),
                                    );
                                }

                                let _ = read_event.accept();
                            }
                            GattEvent::Other(other_event) => {
                                let _ = other_event.accept();
                            }
                        },
                        _ => {}
                    },
                    embassy_futures::select::Either3::Second(response) => {
                        // Push the new input report to the subscribed peer.
                        // Failures are not retried; the response stays
                        // available via direct read.
                        if relay.gate().should_notify(conn_id)
                            && server.hid.input_report.notify(&conn, &response).await.is_err()
                        {
                            log::debug!("BLE: notify failed");
                        }
                    }
                    embassy_futures::select::Either3::Third(_chunk) => {
                        #[cfg(feature = "serial")]
                        {
                            // Forward exactly the bytes that arrived from
                            // the UART, without padding to the full MTU
                            let chunk: crate::serial::Chunk = _chunk;
                            let _ = server.nus.tx.notify(&conn, &chunk).await;
                        }
                    }
                }
            }

            // Subscription does not survive the link
            transport.on_subscribe_changed(conn_id, false);
        }
    };

    embassy_futures::select::select(runner_task, peripheral_task).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_device_name() {
        let mut buf = [0u8; 20];
        let name = format_device_name(&mut buf, &[0xAB, 0x01, 0xFF]);
        assert_eq!(name, "BlueDAP-AB01FF");
    }
}
