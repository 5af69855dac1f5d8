// AccelLog — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up the shared I2C bus, OLED panel and MPU6050.
//   2. Open the battery ADC and the phone-link UART.
//   3. Build the application from the hardware services.
//   4. Run init → event loop → deinit on the app thread.
//
// Buttons:
//   - Up:     start / stop accelerometer logging
//   - Select: send the current accelerometer sample to the phone
//   - Down:   show the battery level

#[cfg(target_os = "espidf")]
mod drivers;

#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{AnyInputPin, Input, InputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};

    use accellog::app::App;
    use accellog::config::*;
    use accellog::datalog::RecordStore;
    use accellog::display::TextLayer;
    use accellog::events::Button;
    use accellog::input::InputManager;
    use accellog::link::FramedLink;
    use accellog::runtime::{self, EventSource};

    use crate::drivers::battery::AdcBattery;
    use crate::drivers::imu::{Mpu6050, Mpu6050Accelerometer, SharedBus};
    use crate::drivers::oled::Ssd1306;
    use crate::drivers::uart::UartTransport;

    // -----------------------------------------------------------------------
    // Utility: milliseconds since boot
    // -----------------------------------------------------------------------
    pub fn now_ms() -> u64 {
        unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u64 }
    }

    /// Buttons and the boot clock, polled by the event loop.
    struct WatchEvents {
        up: PinDriver<'static, AnyInputPin, Input>,
        select: PinDriver<'static, AnyInputPin, Input>,
        down: PinDriver<'static, AnyInputPin, Input>,
        input: InputManager,
    }

    impl EventSource for WatchEvents {
        fn now_ms(&mut self) -> u64 {
            now_ms()
        }

        fn poll_clicks(&mut self, now_ms: u64) -> heapless::Vec<Button, 3> {
            // Active LOW with pull-up.
            let (up, select, down) = (self.up.is_low(), self.select.is_low(), self.down.is_low());
            self.input.update(
                |button| match button {
                    Button::Up => up,
                    Button::Select => select,
                    Button::Down => down,
                },
                now_ms,
            )
        }

        fn should_exit(&mut self) -> bool {
            // Firmware never leaves the event loop.
            false
        }

        fn idle(&mut self) {
            thread::sleep(Duration::from_millis(EVENT_LOOP_INTERVAL_MS));
        }
    }

    pub fn main() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("AccelLog firmware starting…");

        // ---- Peripherals --------------------------------------------------
        let peripherals = Peripherals::take()?;
        log::info!(
            "Pins: I2C sda={} scl={}, link tx={} rx={}",
            PIN_I2C_SDA,
            PIN_I2C_SCL,
            PIN_LINK_TX,
            PIN_LINK_RX
        );

        // ---- I2C bus (shared between OLED and MPU6050) --------------------
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio6, // PIN_I2C_SDA
            peripherals.pins.gpio7, // PIN_I2C_SCL
            &i2c_config,
        )?;
        // The bus lives for the entire programme duration (firmware never exits).
        let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

        // ---- Component self-test ------------------------------------------
        let mut oled = Ssd1306::new(i2c_bus);
        let imu = Mpu6050::new(i2c_bus);
        let oled_ok = oled.is_connected();
        let imu_ok = imu.is_connected();
        if !oled_ok || !imu_ok {
            log::error!("Boot check FAILED — OLED:{} IMU:{}", oled_ok, imu_ok);
            // Continue anyway so we can still debug via serial.
        }
        oled.init()?;
        imu.init()?;

        // ---- Phone link ----------------------------------------------------
        let uart = UartDriver::new(
            peripherals.uart1,
            peripherals.pins.gpio21, // PIN_LINK_TX
            peripherals.pins.gpio20, // PIN_LINK_RX
            Option::<esp_idf_hal::gpio::AnyIOPin>::None,
            Option::<esp_idf_hal::gpio::AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(LINK_BAUD_RATE)),
        )?;

        // ---- Buttons -------------------------------------------------------
        let up = PinDriver::input(peripherals.pins.gpio3.downgrade_input())?; // PIN_BUTTON_UP
        let select = PinDriver::input(peripherals.pins.gpio4.downgrade_input())?; // PIN_BUTTON_SELECT
        let down = PinDriver::input(peripherals.pins.gpio5.downgrade_input())?; // PIN_BUTTON_DOWN
        for pin in [PIN_BUTTON_UP, PIN_BUTTON_SELECT, PIN_BUTTON_DOWN] {
            configure_pullup(pin);
        }

        // ---- Application ---------------------------------------------------
        let mut display = TextLayer::new(oled);
        display.set_font(&embedded_graphics::mono_font::ascii::FONT_6X10);

        // Boxed: the app thread's stack only carries handler frames.
        let mut app = Box::new(App::new(
            display,
            Mpu6050Accelerometer::new(imu),
            AdcBattery::new()?,
            FramedLink::new(UartTransport::new(uart)),
            RecordStore::new(DATA_LOG_CAPACITY_BYTES),
        ));
        let mut events = WatchEvents {
            up,
            select,
            down,
            input: InputManager::new(),
        };

        let app_thread = thread::Builder::new()
            .name("app".into())
            .stack_size(STACK_MAIN_LOOP)
            .spawn(move || runtime::run(&mut *app, &mut events))?;

        if app_thread.join().is_err() {
            log::error!("App thread panicked");
        }
        Ok(())
    }

    /// Enable the internal pull-up on a button GPIO via the raw API.
    fn configure_pullup(pin: i32) {
        unsafe {
            esp_idf_sys::gpio_set_pull_mode(pin, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY);
        }
    }
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::main()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("accellog firmware runs on ESP-IDF targets; use `cargo test --lib` on the host");
}
