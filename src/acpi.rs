//! ACPI resource walking.
//!
//! The namespace itself belongs to the host. Drivers only see it through
//! [`AcpiNamespace`], which hands out one [`Resource`] per `_CRS` entry.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::power::ChildRole;

/// Most I2C children a device describes.
pub const CHILD_MAX: usize = 4;

pub const RESOURCE_SOURCE_LEN: usize = 32;

pub type ResourceSource = String<RESOURCE_SOURCE_LEN>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcpiError {
    NotFound,
    /// Host specific status code
    Failure(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialBusKind {
    I2c,
    Spi,
    Uart,
}

/// One `_CRS` entry, borrowed from the host for the duration of a walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource<'a> {
    SerialBus {
        kind: SerialBusKind,
        slave_address: u16,
        resource_source: &'a str,
    },
    FixedMemory32 {
        address: u32,
        length: u32,
    },
    ExtendedIrq {
        interrupt: u32,
    },
    Other,
}

pub trait AcpiNamespace {
    type Handle: Copy;

    fn get_integer(&self, handle: Self::Handle, name: &str) -> Result<u64, AcpiError>;

    /// Calls `visitor` once per resource returned by `method`, in order.
    fn walk_resources(
        &self,
        handle: Self::Handle,
        method: &str,
        visitor: &mut dyn FnMut(&Resource<'_>),
    ) -> Result<(), AcpiError>;

    /// Absolute path of the handle, like `\_SB_.PCI0.I2C1`.
    fn handle_name(&self, handle: Self::Handle) -> Option<&str>;
}

/// An I2C child device found in a resource list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcpiChildDescriptor {
    pub address: u16,
    /// Path of the controller the child sits behind.
    pub resource_source: ResourceSource,
}

/// Keeps the first [`CHILD_MAX`] I2C serial bus resources and ignores everything else.
pub fn collect<'a>(
    resources: impl IntoIterator<Item = &'a Resource<'a>>,
) -> Vec<AcpiChildDescriptor, CHILD_MAX> {
    let mut collector = Collector::default();
    for resource in resources {
        collector.visit(resource);
    }
    collector.finish()
}

/// Walks `_CRS` of `handle` and collects its I2C children.
pub fn collect_from<N: AcpiNamespace>(
    acpi: &N,
    handle: N::Handle,
) -> Result<Vec<AcpiChildDescriptor, CHILD_MAX>, AcpiError> {
    let mut collector = Collector::default();
    acpi.walk_resources(handle, "_CRS", &mut |resource| collector.visit(resource))?;
    Ok(collector.finish())
}

#[derive(Default)]
struct Collector {
    children: Vec<AcpiChildDescriptor, CHILD_MAX>,
    dropped: usize,
}

impl Collector {
    fn visit(&mut self, resource: &Resource<'_>) {
        let Resource::SerialBus {
            kind: SerialBusKind::I2c,
            slave_address,
            resource_source,
        } = *resource
        else {
            return;
        };

        let mut source = ResourceSource::new();
        if source.push_str(resource_source).is_err() {
            warn!("Resource source too long: {}", resource_source);
            self.dropped += 1;
            return;
        }

        let descriptor = AcpiChildDescriptor {
            address: slave_address,
            resource_source: source,
        };
        if self.children.push(descriptor).is_err() {
            self.dropped += 1;
        }
    }

    fn finish(self) -> Vec<AcpiChildDescriptor, CHILD_MAX> {
        if self.dropped > 0 {
            warn!("Dropped {} I2C resources", self.dropped);
        }
        self.children
    }
}

/// A resource source path the firmware gets wrong for one kind of child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Correction {
    pub role: ChildRole,
    pub wrong_prefix: &'static str,
    pub correct_prefix: &'static str,
}

/// The fuel gauge of the power nexus names its controller `\_SB.` instead of `\_SB_.`.
pub const RESOURCE_SOURCE_CORRECTIONS: &[Correction] = &[Correction {
    role: ChildRole::FuelGauge,
    wrong_prefix: "\\_SB.",
    correct_prefix: "\\_SB_.",
}];

/// Rewrites the resource source of `descriptor` if a correction exists for `role`.
/// Returns whether the path was changed.
pub fn apply_corrections(role: ChildRole, descriptor: &mut AcpiChildDescriptor) -> bool {
    for correction in RESOURCE_SOURCE_CORRECTIONS.iter().filter(|c| c.role == role) {
        let Some(rest) = descriptor
            .resource_source
            .strip_prefix(correction.wrong_prefix)
        else {
            continue;
        };

        let mut corrected = ResourceSource::new();
        if write!(corrected, "{}{}", correction.correct_prefix, rest).is_err() {
            warn!("Corrected resource source does not fit");
            return false;
        }

        debug!(
            "Corrected resource source {} to {}",
            descriptor.resource_source.as_str(),
            corrected.as_str()
        );
        descriptor.resource_source = corrected;
        return true;
    }

    false
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    pub const NODE_NAME: &str = "\\_SB_.PCI0.PWRN";

    /// A single ACPI node.
    pub struct MockAcpi {
        pub uid: Result<u64, AcpiError>,
        pub resources: std::vec::Vec<Resource<'static>>,
    }

    impl MockAcpi {
        pub fn with_resources(resources: &[Resource<'static>]) -> Self {
            Self {
                uid: Err(AcpiError::NotFound),
                resources: resources.to_vec(),
            }
        }
    }

    impl AcpiNamespace for MockAcpi {
        type Handle = ();

        fn get_integer(&self, _handle: (), name: &str) -> Result<u64, AcpiError> {
            match name {
                "_UID" => self.uid,
                _ => Err(AcpiError::NotFound),
            }
        }

        fn walk_resources(
            &self,
            _handle: (),
            method: &str,
            visitor: &mut dyn FnMut(&Resource<'_>),
        ) -> Result<(), AcpiError> {
            if method != "_CRS" {
                return Err(AcpiError::NotFound);
            }
            for resource in &self.resources {
                visitor(resource);
            }
            Ok(())
        }

        fn handle_name(&self, _handle: ()) -> Option<&str> {
            Some(NODE_NAME)
        }
    }
}
