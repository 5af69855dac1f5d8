// AccelLog — SSD1306 OLED Panel
//
// Pushes the 128×64 page-ordered frame buffer to the panel over the shared
// I2C bus.

use accellog::config::*;
use accellog::display::Panel;

use super::imu::SharedBus;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
const DATA_CHUNK: usize = 128;

const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH
    0xA4, // resume from RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct Ssd1306 {
    bus: SharedBus,
}

impl Ssd1306 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    fn commands(&self, cmds: &[u8]) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))?;
        for &cmd in cmds {
            bus.write(I2C_ADDR_OLED, &[CONTROL_COMMAND, cmd], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.commands(&[0xE3]).is_ok() // NOP
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.commands(INIT_SEQUENCE)?;
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }
}

impl Panel for Ssd1306 {
    fn flush(&mut self, frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()> {
        // Full-screen column and page window
        self.commands(&[0x21, 0, (SCREEN_WIDTH - 1) as u8, 0x22, 0, (SCREEN_HEIGHT / 8 - 1) as u8])?;

        let mut bus = self.bus.lock().map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))?;
        let mut packet = [0u8; DATA_CHUNK + 1];
        packet[0] = CONTROL_DATA;
        for chunk in frame.chunks(DATA_CHUNK) {
            packet[1..=chunk.len()].copy_from_slice(chunk);
            bus.write(I2C_ADDR_OLED, &packet[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }

    fn turn_off(&mut self) -> anyhow::Result<()> {
        self.commands(&[0xAE])
    }
}
