//! Nordic UART Service (NUS) definition
//!
//! Standard NUS for the BLE serial passthrough.
//! - Service UUID: 6E400001-B5A3-F393-E0A9-E50E24DCCA9E
//! - RX Characteristic: 6E400002-... (write, write without response)
//! - TX Characteristic: 6E400003-... (notify)

use trouble_host::prelude::*;

use crate::serial::Chunk;

/// Nordic UART Service
///
/// Both characteristics hold variable-length values: a serial stream has no
/// fixed record size, and a notification must carry exactly the bytes read
/// from the UART.
#[gatt_service(uuid = "6e400001-b5a3-f393-e0a9-e50e24dcca9e")]
pub struct NordicUartService {
    /// RX Characteristic - peer writes raw bytes headed for the UART
    #[characteristic(uuid = "6e400002-b5a3-f393-e0a9-e50e24dcca9e", write, write_without_response, value = Chunk::new())]
    pub rx: Chunk,

    /// TX Characteristic - UART bytes notified back to the peer
    #[characteristic(uuid = "6e400003-b5a3-f393-e0a9-e50e24dcca9e", notify, value = Chunk::new())]
    pub tx: Chunk,
}
