// AccelLog — UART transport for the phone link

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;

use accellog::link::Transport;

pub struct UartTransport {
    uart: UartDriver<'static>,
}

impl UartTransport {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport {
    fn write_all(&mut self, mut bytes: &[u8]) -> anyhow::Result<()> {
        while !bytes.is_empty() {
            let n = self.uart.write(bytes)?;
            if n == 0 {
                anyhow::bail!("UART TX stalled");
            }
            bytes = &bytes[n..];
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> anyhow::Result<usize> {
        Ok(self.uart.read(buf, NON_BLOCK)?)
    }
}
