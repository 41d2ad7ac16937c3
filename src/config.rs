//! Protocol and hardware configuration constants for the ESP32-S3 DAP bridge

/// DAP protocol constants
pub mod dap {
    /// Fixed report size for DAP command and response packets.
    ///
    /// Both HID report directions carry exactly this many bytes; the report
    /// map advertises the same count to the host.
    pub const PACKET_SIZE: usize = 64;

    /// CMSIS-DAP `ID_DAP_TransferAbort` command identifier.
    ///
    /// A written report starting with this byte requests early termination of
    /// the in-flight command and is never queued.
    pub const TRANSFER_ABORT: u8 = 0x07;

    /// CMSIS-DAP response identifier for an unrecognised command.
    pub const RESPONSE_INVALID: u8 = 0xFF;
}

/// Relay pipeline tuning
pub mod relay {
    /// Capacity of the command queue between the BLE callback path and the
    /// executor. Pushes beyond this are dropped, never blocked.
    pub const COMMAND_QUEUE_DEPTH: usize = 8;
}

/// Device identity constants
pub mod device {
    /// BLE advertising name prefix; the efuse-derived id is appended
    pub const NAME_PREFIX: &str = "BlueDAP-";

    /// Vendor ID source: assigned by the USB Implementer's Forum
    pub const VENDOR_ID_SOURCE: u8 = 0x02;
    pub const VENDOR_ID: u16 = 0xDEAD;
    pub const PRODUCT_ID: u16 = 0xBEEF;
    /// Product version 0.0.1 in BCD
    pub const PRODUCT_VERSION: u16 = 0x0001;

    /// Reported battery level in percent (no fuel gauge fitted)
    pub const BATTERY_LEVEL: u8 = 100;
}

/// UART passthrough configuration (`serial` feature)
pub mod serial {
    pub const BAUD_RATE: u32 = 115_200;
    pub const TX_PIN: u8 = 17;
    pub const RX_PIN: u8 = 18;

    /// Largest chunk carried per NUS notification or UART write
    pub const MAX_CHUNK_SIZE: usize = 128;
}
