#![no_std]
#![no_main]

extern crate alloc;

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"), // version
    env!("CARGO_PKG_NAME"),    // project_name
    "00:00:00",                // build_time
    "2025-01-01",              // build_date
    "0.0.0",                   // idf_ver (not using IDF)
    0x10000,                   // mmu_page_size (64KB)
    0,                         // min_efuse_blk_rev_full (accept all)
    u16::MAX                   // max_efuse_blk_rev_full (accept all)
);

use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use bluedap_firmware::ble;
use bluedap_firmware::dap::NullEngine;
use bluedap_firmware::relay::{CommandExecutor, RelayState};

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

/// Static cell for esp-radio controller (needed for 'static lifetime)
static RADIO_CONTROLLER: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

/// Relay pipeline state shared between the BLE path and the executor task
static RELAY: RelayState = RelayState::new();

/// Type alias for the BLE controller
type BleController =
    trouble_host::prelude::ExternalController<esp_radio::ble::controller::BleConnector<'static>, 10>;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialise heap allocator for BLE support (64KB - BLE requires significant heap)
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Read unique device ID from eFuse MAC address (last 3 bytes)
    let mac = esp_hal::efuse::Efuse::read_base_mac_address();
    let device_id: [u8; 3] = [mac[3], mac[4], mac[5]];

    // Initialise esp-radio for BLE support (must be after esp_rtos::start)
    let radio_controller =
        RADIO_CONTROLLER.init(esp_radio::init().expect("Failed to initialize esp-radio"));

    // Create BLE connector (ownership is passed to ExternalController)
    let ble_connector = esp_radio::ble::controller::BleConnector::new(
        radio_controller,
        peripherals.BT,
        esp_radio::ble::Config::default(),
    )
    .expect("Failed to initialize BLE connector");

    let controller: BleController = trouble_host::prelude::ExternalController::new(ble_connector);

    // UART for the NUS passthrough
    #[cfg(feature = "serial")]
    let (uart_rx, uart_tx) = {
        use bluedap_firmware::config::serial::BAUD_RATE;

        let uart = esp_hal::uart::Uart::new(
            peripherals.UART1,
            esp_hal::uart::Config::default().with_baudrate(BAUD_RATE),
        )
        .expect("Failed to initialize UART")
        .with_tx(peripherals.GPIO17)
        .with_rx(peripherals.GPIO18)
        .into_async();
        uart.split()
    };

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(executor_task(&RELAY));
        spawner.must_spawn(ble_host_task(controller, &RELAY, device_id));
        #[cfg(feature = "serial")]
        {
            spawner.must_spawn(uart_reader_task(uart_rx));
            spawner.must_spawn(uart_writer_task(uart_tx));
        }
    })
}

/// Single worker draining the command queue through the probe engine
#[embassy_executor::task]
async fn executor_task(relay: &'static RelayState) {
    CommandExecutor::new(relay, NullEngine::new()).run().await;
}

/// Task that manages BLE advertising, connections and GATT events
#[embassy_executor::task]
async fn ble_host_task(controller: BleController, relay: &'static RelayState, device_id: [u8; 3]) {
    ble::ble_task(controller, relay, device_id).await;
}

#[cfg(feature = "serial")]
#[embassy_executor::task]
async fn uart_reader_task(rx: esp_hal::uart::UartRx<'static, esp_hal::Async>) {
    bluedap_firmware::serial::uart_reader(rx).await;
}

#[cfg(feature = "serial")]
#[embassy_executor::task]
async fn uart_writer_task(tx: esp_hal::uart::UartTx<'static, esp_hal::Async>) {
    bluedap_firmware::serial::uart_writer(tx).await;
}
