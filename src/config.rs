// AccelLog — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON_UP: i32 = 3;     // D1/A1 — Up button (INPUT_PULLUP, active LOW)
pub const PIN_BUTTON_SELECT: i32 = 4; // D2/A2 — Select button (INPUT_PULLUP, active LOW)
pub const PIN_BUTTON_DOWN: i32 = 5;   // D3    — Down button (INPUT_PULLUP, active LOW)
pub const PIN_I2C_SDA: i32 = 6;       // D4    — I2C data line
pub const PIN_I2C_SCL: i32 = 7;       // D5    — I2C clock line
pub const PIN_LINK_TX: i32 = 21;      // D6    — Phone link UART TX
pub const PIN_LINK_RX: i32 = 20;      // D7    — Phone link UART RX
pub const PIN_BATTERY_ADC: u32 = 2;   // D0/A0 — Battery voltage (ADC)

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024
pub const TEXT_BUFFER_SIZE: usize = 100;
pub const TITLE_TEXT: &str = "AccelLog";

// ---------------------------------------------------------------------------
// Phone link (AppMessage)
// ---------------------------------------------------------------------------
pub const LINK_BAUD_RATE: u32 = 115_200;
pub const INBOX_SIZE: usize = 64;
pub const OUTBOX_SIZE: usize = 64;
pub const LINK_FRAME_START: u8 = 0x55;

pub const MSG_KEY_TYPE: u32 = 0;
pub const MSG_KEY_FIELD_1: u32 = 1;
pub const MSG_KEY_FIELD_2: u32 = 2;
pub const MSG_KEY_FIELD_3: u32 = 3;
pub const MSG_KEY_RECORDS: u32 = 4;

pub const MSG_TYPE_SELECT_SAMPLE: i16 = 5000;
pub const MSG_TYPE_START_LOGGING: i16 = 5001;
pub const MSG_TYPE_STOP_LOGGING: i16 = 5002;
pub const MSG_TYPE_LOG_RECORDS: i16 = 5003;
pub const MSG_TYPE_LOG_FINISHED: i16 = 5004;

/// Sampling-rate parameter announced to the phone in the start message.
pub const ANNOUNCED_SAMPLING_RATE: i16 = 10;

// ---------------------------------------------------------------------------
// Accelerometer & data logging
// ---------------------------------------------------------------------------
pub const ACCEL_SAMPLES_PER_UPDATE: u32 = 1;
pub const ACCEL_MAX_BATCH: usize = 25;
pub const DATA_LOG_TAG: u32 = 0;
pub const DATA_LOG_CAPACITY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
// The app state is boxed.  The stack carries `App::new` while it is moved to
// the heap, then the handler frames: a message send holds two ~0.7 KB
// dictionaries and a 255 B frame buffer.
pub const STACK_MAIN_LOOP: usize = 16 * 1024;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const EVENT_LOOP_INTERVAL_MS: u64 = 5;
pub const DEBOUNCE_MS: u64 = 50;

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8G: f32 = 4096.0; // LSB/g  at ±8 g

// ---------------------------------------------------------------------------
// Battery (LiPo behind a 1:2 resistor divider)
// ---------------------------------------------------------------------------
pub const BATTERY_DIVIDER_RATIO: f32 = 2.0;
pub const BATTERY_EMPTY_V: f32 = 3.3;
pub const BATTERY_FULL_V: f32 = 4.2;
pub const ADC_FULL_SCALE_V: f32 = 3.3;
pub const ADC_MAX_RAW: f32 = 4095.0;
