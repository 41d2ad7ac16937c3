//! Static HID-over-GATT metadata
//!
//! Pure lookup tables consumed at service registration time: the vendor
//! report map describing the two fixed-size opaque reports, descriptor
//! values, and the constant device-information payloads.

use crate::config::{dap::PACKET_SIZE, device};

const fn le16(value: u16) -> [u8; 2] {
    [(value & 0x00FF) as u8, (value >> 8) as u8]
}

/// Vendor-defined HID report descriptor: one input and one output report,
/// each an opaque byte array of `PACKET_SIZE` bytes.
pub const REPORT_MAP: [u8; 34] = [
    0x06, 0x00, 0xFF, // USAGE_PAGE (Vendor Defined Page 1)
    0x09, 0x01, // USAGE (Vendor Usage 1)
    0xA1, 0x01, // COLLECTION (Application)
    0x09, 0x01, //   USAGE (Vendor Usage 1)
    0x15, 0x00, //   LOGICAL_MINIMUM (0)
    0x26, 0xFF, 0x00, //   LOGICAL_MAXIMUM (255)
    0x75, 0x08, //   REPORT_SIZE (8)
    0x95, PACKET_SIZE as u8, //   REPORT_COUNT
    0x81, 0x02, //   INPUT (Data,Var,Abs)
    0x09, 0x02, //   USAGE (Vendor Usage 2)
    0x15, 0x00, //   LOGICAL_MINIMUM (0)
    0x26, 0xFF, 0x00, //   LOGICAL_MAXIMUM (255)
    0x75, 0x08, //   REPORT_SIZE (8)
    0x95, PACKET_SIZE as u8, //   REPORT_COUNT
    0x91, 0x02, //   OUTPUT (Data,Var,Abs)
    0xC0, // END_COLLECTION
];

/// Report Reference descriptor: report id 0, input report
pub const REPORT_REF_INPUT: [u8; 2] = [0x00, 0x01];

/// Report Reference descriptor: report id 0, output report
pub const REPORT_REF_OUTPUT: [u8; 2] = [0x00, 0x02];

/// HID Information characteristic value:
/// bcdHID 1.11, not localized, normally connectable, no remote wake
pub const HID_INFORMATION: [u8; 4] = [le16(0x0111)[0], le16(0x0111)[1], 0x00, 0x02];

/// PnP ID characteristic value for the Device Information service
pub const PNP_ID: [u8; 7] = [
    device::VENDOR_ID_SOURCE,
    le16(device::VENDOR_ID)[0],
    le16(device::VENDOR_ID)[1],
    le16(device::PRODUCT_ID)[0],
    le16(device::PRODUCT_ID)[1],
    le16(device::PRODUCT_VERSION)[0],
    le16(device::PRODUCT_VERSION)[1],
];
