//! GATT service definitions
//!
//! HID-over-GATT service carrying the two fixed-size DAP reports, plus the
//! standard Battery and Device Information services the original HID probe
//! exposes. The CCCD on the input report is added by the stack; its writes
//! drive the notification gate.

use trouble_host::prelude::*;

use crate::config::dap::PACKET_SIZE;
use crate::config::device;
use crate::hid;

/// HID service (0x1812) with the vendor DAP report pair
#[gatt_service(uuid = "1812")]
pub struct HidService {
    /// Input Report - device to host, read and notify
    #[characteristic(uuid = "2a4d", read, notify, value = [0u8; 64])]
    #[descriptor(uuid = "2908", read, value = hid::REPORT_REF_INPUT)]
    pub input_report: [u8; PACKET_SIZE],

    /// Output Report - host writes commands here; readback supported
    #[characteristic(uuid = "2a4d", read, write, write_without_response, value = [0u8; 64])]
    #[descriptor(uuid = "2908", read, value = hid::REPORT_REF_OUTPUT)]
    pub output_report: [u8; PACKET_SIZE],

    /// Report Map - vendor report descriptor, produced once, never mutated
    #[characteristic(uuid = "2a4b", read, value = hid::REPORT_MAP)]
    pub report_map: [u8; 34],

    /// HID Information - bcdHID, country code, flags
    #[characteristic(uuid = "2a4a", read, value = hid::HID_INFORMATION)]
    pub hid_information: [u8; 4],

    /// HID Control Point - suspend/exit-suspend, accepted and ignored
    #[characteristic(uuid = "2a4c", write_without_response, value = 0)]
    pub control_point: u8,
}

/// Battery service (0x180F)
#[gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, value = device::BATTERY_LEVEL)]
    pub level: u8,
}

/// Device Information service (0x180A)
#[gatt_service(uuid = "180a")]
pub struct DeviceInfoService {
    #[characteristic(uuid = "2a50", read, value = hid::PNP_ID)]
    pub pnp_id: [u8; 7],
}
