//! Lookup and creation of devices in the host's device tree.

use core::fmt::Debug;

use crate::{acpi::AcpiChildDescriptor, Error};

/// Driver name of the I2C host controllers enumerated through ACPI.
pub const CONTROLLER_DRIVER: &str = "ig4iic_acpi";

/// Device class of the bus each controller exposes.
pub const BUS_CLASS: &str = "iicbus";

pub trait DeviceTree {
    type Device: Copy + PartialEq + Debug;

    /// Finds a child of `parent` bound to `driver`. `unit` of `None` matches any unit.
    fn find_child(&self, parent: Self::Device, driver: &str, unit: Option<u32>)
        -> Option<Self::Device>;

    /// Number of units allocated in `class`, or `None` if the class does not exist.
    fn max_unit(&self, class: &str) -> Option<u32>;

    /// ACPI path of the device, if it has an ACPI handle.
    fn handle_name(&self, device: Self::Device) -> Option<&str>;

    /// Adds a `driver` child at `address`. Returns `None` if the bus rejects it.
    fn add_child(&mut self, bus: Self::Device, driver: &str, address: u16)
        -> Option<Self::Device>;

    fn delete_child(&mut self, child: Self::Device);
}

/// Finds the I2C bus behind the controller named by the descriptor's resource source.
/// Controllers are tried in unit order and the first exact match wins.
pub fn resolve_bus<T: DeviceTree>(
    tree: &T,
    descriptor: &AcpiChildDescriptor,
    search_root: T::Device,
) -> Result<T::Device, Error> {
    let Some(max_unit) = tree.max_unit(BUS_CLASS) else {
        warn!("No {} device class", BUS_CLASS);
        return Err(Error::BusNotFound);
    };

    for unit in 0..max_unit {
        let Some(controller) = tree.find_child(search_root, CONTROLLER_DRIVER, Some(unit)) else {
            continue;
        };
        let Some(bus) = tree.find_child(controller, BUS_CLASS, None) else {
            continue;
        };

        if tree.handle_name(controller) == Some(descriptor.resource_source.as_str()) {
            debug!("{} is {} unit {}", descriptor.resource_source.as_str(), CONTROLLER_DRIVER, unit);
            return Ok(bus);
        }
    }

    Err(Error::BusNotFound)
}

pub fn bind_child<T: DeviceTree>(
    tree: &mut T,
    bus: T::Device,
    driver: &str,
    address: u16,
) -> Result<T::Device, Error> {
    match tree.add_child(bus, driver, address) {
        Some(child) => {
            debug!("Added {} at {:#x}", driver, address);
            Ok(child)
        }
        None => {
            warn!("Failed to add child {}", driver);
            Err(Error::ChildCreateFailed)
        }
    }
}
