// AccelLog — MPU6050 Accelerometer Driver
//
// Custom register-level driver over shared I2C bus.
// Avoids external crate version conflicts with esp-idf-hal.

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

use accellog::accel::{raw_to_milli_g, SampleBatch, SampleScheduler, SamplingRate};
use accellog::clock;
use accellog::config::*;
use accellog::events::Sample;
use accellog::services::Accelerometer;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, I2cDriver<'static>>> {
        self.bus.lock().map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = self.lock() else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure the accelerometer (±8 g), DLPF 21 Hz.
    pub fn init(&self) -> anyhow::Result<()> {
        let mut bus = self.lock()?;

        // Wake up (clear SLEEP bit)
        bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;

        // DLPF bandwidth 21 Hz
        bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x04], I2C_TIMEOUT_TICKS)?;

        // Accelerometer: ±8 g
        bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)?;

        log::info!("MPU6050 initialised (±8g, DLPF 21Hz)");
        Ok(())
    }

    /// Burst-read the three accelerometer axes in milli-g.
    pub fn read_milli_g(&self) -> anyhow::Result<[i16; 3]> {
        let mut bus = self.lock()?;
        let mut raw = [0u8; 6];
        bus.write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)?;

        Ok([
            raw_to_milli_g(i16::from_be_bytes([raw[0], raw[1]])),
            raw_to_milli_g(i16::from_be_bytes([raw[2], raw[3]])),
            raw_to_milli_g(i16::from_be_bytes([raw[4], raw[5]])),
        ])
    }
}

/// Accelerometer service backed by the MPU6050.
pub struct Mpu6050Accelerometer {
    imu: Mpu6050,
    scheduler: SampleScheduler,
}

impl Mpu6050Accelerometer {
    pub fn new(imu: Mpu6050) -> Self {
        Self {
            imu,
            scheduler: SampleScheduler::new(),
        }
    }

    fn read_sample(&self) -> anyhow::Result<Sample> {
        let [x, y, z] = self.imu.read_milli_g()?;
        Ok(Sample {
            x,
            y,
            z,
            did_vibrate: false,
            timestamp: clock::now_epoch_ms(),
        })
    }
}

impl Accelerometer for Mpu6050Accelerometer {
    fn peek(&mut self) -> anyhow::Result<Sample> {
        self.read_sample()
    }

    fn subscribe(&mut self, samples_per_update: u32) {
        self.scheduler.subscribe(samples_per_update);
    }

    fn set_sampling_rate(&mut self, rate: SamplingRate) {
        log::info!("Accelerometer sampling at {} Hz", rate.hz());
        self.scheduler.set_sampling_rate(rate);
    }

    fn unsubscribe(&mut self) {
        self.scheduler.unsubscribe();
    }

    fn poll(&mut self, now_ms: u64) -> Option<SampleBatch> {
        if !self.scheduler.is_due(now_ms) {
            return None;
        }
        match self.read_sample() {
            Ok(sample) => self.scheduler.push(sample, now_ms),
            Err(e) => {
                log::warn!("IMU read error: {}", e);
                None
            }
        }
    }
}
