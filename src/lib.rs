//! AccelLog library - testable modules for the accelerometer logging watch app.
//!
//! This library contains the application logic that can be tested on the host
//! machine. The binary (`main.rs`) uses this library and adds the ESP-IDF
//! drivers that implement the [`services`] traits on the watch.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib --target x86_64-unknown-linux-gnu
//! ```

// === Application ===
pub mod app;
pub mod runtime;
pub mod services;

// === Data types & wire formats ===
pub mod config;
pub mod events;
pub mod message;

// === Service building blocks (shared by firmware drivers and tests) ===
pub mod accel;
pub mod clock;
pub mod datalog;
pub mod display;
pub mod input;
pub mod link;
pub mod power;
