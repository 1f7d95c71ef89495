//! Serial port communication with the FPGA
//!
//! This module provides functionality for:
//! - Listing available serial ports (USB-UART bridges)
//! - Opening the FPGA's UART with a scoped connection
//! - Capturing the keystream within a single read window

pub mod port;

pub use port::{PortConfig, SerialConnection};
