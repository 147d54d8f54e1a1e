#![cfg_attr(not(test), no_std)]

//! Drivers for Intel Cherry View platform peripherals.
//!
//! The chip drivers live in their own crates. This crate discovers devices through
//! ACPI, binds the I2C children of the power nexus and exposes every device through a
//! role interface the host framework can drive.

#[macro_use]
extern crate logger;

pub mod acpi;
mod error;
pub mod gpio;
pub mod power;
pub mod registry;
pub mod roles;
pub mod tree;

pub use error::{AttachError, Error};

pub use bq2419x;
pub use chvgpio;
pub use chvpwm;
pub use fusb302;
pub use gt9xx;
pub use max170xx;
pub use pi3usb30532;
