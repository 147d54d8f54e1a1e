use crate::acpi::AcpiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Acpi(AcpiError),
    /// The resource list did not describe the expected set of I2C children.
    IncompleteResources { found: usize },
    /// A required resource is missing from the resource list.
    MissingResource,
    /// A resource is present but too small for the device it describes.
    InvalidResource,
    BusNotFound,
    ChildCreateFailed,
    /// A slave address that does not fit the 7-bit I2C address space.
    InvalidAddress(u16),
    UnknownDevice,
    Gpio(chvgpio::Error),
}

impl From<AcpiError> for Error {
    fn from(error: AcpiError) -> Self {
        Self::Acpi(error)
    }
}

impl From<chvgpio::Error> for Error {
    fn from(error: chvgpio::Error) -> Self {
        Self::Gpio(error)
    }
}

/// Failure of a nexus attach, which also brings up the fuel gauge.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachError<E> {
    Topology(Error),
    Gauge(max170xx::Error<E>),
}

impl<E> From<Error> for AttachError<E> {
    fn from(error: Error) -> Self {
        Self::Topology(error)
    }
}
