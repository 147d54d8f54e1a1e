//! Cherry View power nexus.
//!
//! The nexus device has no registers of its own. Its `_CRS` lists the charger, the fuel
//! gauge, the Type-C port controller and the mux as I2C resources, in that order. The
//! nexus binds those children and serves battery information from the fuel gauge.

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embedded_hal_async::i2c::I2c as AsyncI2c;
use heapless::Vec;
use max170xx::{BatteryInfo, BatteryStatus, GaugeConfig, Max170xx};

use crate::{
    acpi::{self, AcpiNamespace, CHILD_MAX},
    tree::{self, DeviceTree},
    AttachError, Error,
};

pub const HID: &str = "INT33FE";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChildRole {
    Charger,
    FuelGauge,
    TypeC,
    Mux,
}

impl ChildRole {
    /// Order of the I2C resources in the nexus `_CRS`.
    pub const ORDER: [ChildRole; CHILD_MAX] = [
        ChildRole::Charger,
        ChildRole::FuelGauge,
        ChildRole::TypeC,
        ChildRole::Mux,
    ];

    pub fn driver_name(self) -> &'static str {
        match self {
            ChildRole::Charger => "bq24292i",
            ChildRole::FuelGauge => "max17047",
            ChildRole::TypeC => "fusb302",
            ChildRole::Mux => "pi3usb30532",
        }
    }

    /// The nexus cannot work without this child.
    pub fn required(self) -> bool {
        self == ChildRole::FuelGauge
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundChild<D> {
    pub role: ChildRole,
    pub address: u16,
    pub bus: D,
    pub device: D,
}

pub type BoundChildren<D> = Vec<BoundChild<D>, CHILD_MAX>;

/// Collects the nexus resources and binds one child per role. Optional children that
/// cannot be bound are skipped. If a required child fails, every child bound so far is
/// deleted again.
pub fn bind_children<N, T>(
    acpi: &N,
    handle: N::Handle,
    tree: &mut T,
    search_root: T::Device,
) -> Result<BoundChildren<T::Device>, Error>
where
    N: AcpiNamespace,
    T: DeviceTree,
{
    if let Some(name) = acpi.handle_name(handle) {
        debug!("Collecting children of {}", name);
    }

    let descriptors = acpi::collect_from(acpi, handle)?;
    if descriptors.len() != CHILD_MAX {
        warn!("Power nexus lists {} I2C children", descriptors.len());
        return Err(Error::IncompleteResources {
            found: descriptors.len(),
        });
    }

    let mut children = BoundChildren::new();
    for (role, mut descriptor) in ChildRole::ORDER.into_iter().zip(descriptors) {
        acpi::apply_corrections(role, &mut descriptor);

        let bound = tree::resolve_bus(tree, &descriptor, search_root).and_then(|bus| {
            let device = tree::bind_child(tree, bus, role.driver_name(), descriptor.address)?;
            Ok(BoundChild {
                role,
                address: descriptor.address,
                bus,
                device,
            })
        });

        match bound {
            Ok(child) => {
                // One child per role, so this never overflows.
                _ = children.push(child);
            }
            Err(error) if role.required() => {
                error!("Failed to bind {:?}: {:?}", role, error);
                delete_children(tree, children);
                return Err(error);
            }
            Err(error) => {
                warn!("Skipping {:?}: {:?}", role, error);
            }
        }
    }

    Ok(children)
}

fn delete_children<T: DeviceTree>(tree: &mut T, children: BoundChildren<T::Device>) {
    for child in children.iter().rev() {
        tree.delete_child(child.device);
    }
}

pub struct ChvPower<D, I> {
    children: BoundChildren<D>,
    gauge: Mutex<CriticalSectionRawMutex, Max170xx<I>>,
}

impl<D, I> ChvPower<D, I>
where
    D: Copy + PartialEq + core::fmt::Debug,
    I: AsyncI2c,
{
    /// Binds the children and brings up the fuel gauge on `i2c`, the bus the gauge was
    /// bound to. Nothing stays bound if any step fails.
    pub async fn attach<N, T>(
        acpi: &N,
        handle: N::Handle,
        tree: &mut T,
        search_root: D,
        i2c: I,
        r_sense_mohm: u32,
    ) -> Result<Self, AttachError<I::Error>>
    where
        N: AcpiNamespace,
        T: DeviceTree<Device = D>,
    {
        let children = bind_children(acpi, handle, tree, search_root)?;

        let config = match Self::gauge_config(&children, r_sense_mohm) {
            Ok(config) => config,
            Err(error) => {
                delete_children(tree, children);
                return Err(AttachError::Topology(error));
            }
        };

        match Max170xx::attach(i2c, config).await {
            Ok(gauge) => {
                info!("Power nexus attached with {} children", children.len());
                Ok(Self {
                    children,
                    gauge: Mutex::new(gauge),
                })
            }
            Err(error) => {
                delete_children(tree, children);
                Err(AttachError::Gauge(error))
            }
        }
    }

    fn gauge_config(children: &BoundChildren<D>, r_sense_mohm: u32) -> Result<GaugeConfig, Error> {
        let gauge = children
            .iter()
            .find(|child| child.role == ChildRole::FuelGauge)
            .ok_or(Error::BusNotFound)?;

        let address = u8::try_from(gauge.address)
            .ok()
            .filter(|address| *address <= 0x7F)
            .ok_or(Error::InvalidAddress(gauge.address))?;

        Ok(GaugeConfig {
            address,
            r_sense_mohm,
        })
    }

    pub fn children(&self) -> &[BoundChild<D>] {
        &self.children
    }

    pub fn child(&self, role: ChildRole) -> Option<&BoundChild<D>> {
        self.children.iter().find(|child| child.role == role)
    }

    /// Current battery status, read from the gauge.
    pub async fn get_bst(&self) -> Result<BatteryStatus, max170xx::Error<I::Error>> {
        self.gauge.lock().await.read_status().await
    }

    /// Battery information taken at attach time.
    pub async fn get_bif(&self) -> BatteryInfo {
        self.gauge.lock().await.static_info().clone()
    }

    /// Deletes every bound child and gives back the gauge bus.
    pub fn detach<T>(self, tree: &mut T) -> I
    where
        T: DeviceTree<Device = D>,
    {
        delete_children(tree, self.children);
        self.gauge.into_inner().release()
    }
}
