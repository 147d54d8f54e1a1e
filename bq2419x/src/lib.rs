#![cfg_attr(not(test), no_std)]

//! Register-level driver for the BQ24190/BQ24192 battery chargers.

#[macro_use]
extern crate logger;

use device_descriptor::{Proxy, ReadOnlyRegister, Register};
use embedded_hal_async::i2c::I2c as AsyncI2c;
use register_access::{AsyncRegisterAccess, I2cInterface};

pub mod ll;

pub use ll::{ChargeFault, ChargeStatus, PartNumber, VbusStatus};

pub const DEFAULT_ADDRESS: u8 = 0x6B;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Transport(E),
    /// The charger did not answer the vendor register read.
    DeviceNotResponding(E),
}

/// Decoded system status register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerStatus {
    pub vbus: VbusStatus,
    pub charge: ChargeStatus,
    pub dynamic_power_management: bool,
    pub power_good: bool,
    pub thermal_regulation: bool,
    pub vsys_regulation: bool,
}

impl From<ll::SystemStatus> for ChargerStatus {
    fn from(reg: ll::SystemStatus) -> Self {
        Self {
            vbus: reg.vbus_status().read().unwrap_or(VbusStatus::Unknown),
            charge: reg.charge_status().read().unwrap_or(ChargeStatus::NotCharging),
            dynamic_power_management: reg.dynamic_power_management().is_set(),
            power_good: reg.power_good().is_set(),
            thermal_regulation: reg.thermal_regulation().is_set(),
            vsys_regulation: reg.vsys_regulation().is_set(),
        }
    }
}

/// Decoded fault register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerFaults {
    pub watchdog: bool,
    pub boost: bool,
    pub charge: ChargeFault,
    pub battery_overvoltage: bool,
    /// Raw NTC fault code, 0 when normal
    pub ntc: u8,
}

impl ChargerFaults {
    pub fn any(&self) -> bool {
        self.watchdog
            || self.boost
            || self.charge != ChargeFault::Normal
            || self.battery_overvoltage
            || self.ntc != 0
    }
}

impl From<ll::Fault> for ChargerFaults {
    fn from(reg: ll::Fault) -> Self {
        Self {
            watchdog: reg.watchdog_fault().is_set(),
            boost: reg.boost_fault().is_set(),
            charge: reg.charge_fault().read().unwrap_or(ChargeFault::Normal),
            battery_overvoltage: reg.battery_fault().is_set(),
            ntc: reg.ntc_fault().read_field_bits(),
        }
    }
}

pub struct Bq2419x<I> {
    interface: I2cInterface<I>,
    vendor: ll::Vendor,
}

impl<I> Bq2419x<I>
where
    I: AsyncI2c,
{
    /// Reads the vendor register to confirm the charger responds.
    pub async fn attach(i2c: I, address: u8) -> Result<Self, Error<I::Error>> {
        let mut interface = I2cInterface::new(i2c, address);

        let vendor = <I2cInterface<I> as AsyncRegisterAccess<u8>>::read_register::<ll::Vendor>(
            &mut interface,
        )
        .await
        .map_err(Error::DeviceNotResponding)?;

        match vendor.part_number().read() {
            Some(part) => {
                info!("Charger {:?} attached, vendor {:#x}", part, vendor.bits());
            }
            None => {
                warn!("Unknown charger part, vendor {:#x}", vendor.bits());
            }
        }

        Ok(Self { interface, vendor })
    }

    /// Part number read at attach time.
    pub fn part_number(&self) -> Option<PartNumber> {
        self.vendor.part_number().read()
    }

    pub fn vendor(&self) -> ll::Vendor {
        self.vendor
    }

    pub async fn read<R>(&mut self) -> Result<R, Error<I::Error>>
    where
        R: ReadOnlyRegister<u8>,
    {
        <I2cInterface<I> as AsyncRegisterAccess<u8>>::read_register::<R>(&mut self.interface)
            .await
            .map_err(Error::Transport)
    }

    pub async fn write<R>(&mut self, reg: R) -> Result<(), Error<I::Error>>
    where
        R: Register<u8>,
    {
        <I2cInterface<I> as AsyncRegisterAccess<u8>>::write_register(&mut self.interface, reg)
            .await
            .map_err(Error::Transport)
    }

    /// Reads, changes and writes back a control register.
    pub async fn modify<R>(
        &mut self,
        f: impl Fn(R::Writer) -> R::Writer,
    ) -> Result<R, Error<I::Error>>
    where
        R: Register<u8>,
    {
        let reg = self.read::<R>().await?.modify(f);
        self.write(reg).await?;
        Ok(reg)
    }

    pub async fn read_status(&mut self) -> Result<ChargerStatus, Error<I::Error>> {
        let reg = self.read::<ll::SystemStatus>().await?;
        Ok(reg.into())
    }

    /// Faults are latched until read, so this clears them.
    pub async fn read_faults(&mut self) -> Result<ChargerFaults, Error<I::Error>> {
        let reg = self.read::<ll::Fault>().await?;
        let faults = ChargerFaults::from(reg);
        if faults.any() {
            warn!("Charger fault register {:#x}", reg.bits());
        }
        Ok(faults)
    }

    pub async fn read_raw(&mut self, register: u8) -> Result<u8, Error<I::Error>> {
        <I2cInterface<I> as AsyncRegisterAccess<u8>>::read_raw(&mut self.interface, register as u16)
            .await
            .map_err(Error::Transport)
    }

    pub async fn write_raw(&mut self, register: u8, value: u8) -> Result<(), Error<I::Error>> {
        <I2cInterface<I> as AsyncRegisterAccess<u8>>::write_raw(
            &mut self.interface,
            register as u16,
            value,
        )
        .await
        .map_err(Error::Transport)
    }

    pub fn release(self) -> I {
        self.interface.into_inner()
    }
}
