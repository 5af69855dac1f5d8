pub mod battery;
pub mod imu;
pub mod oled;
pub mod uart;
