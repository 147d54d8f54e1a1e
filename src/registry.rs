//! Maps hardware identifiers to drivers.
//!
//! ACPI devices are matched by hardware ID, children bound by the power nexus by the
//! driver name they were created with.

use bq2419x::Bq2419x;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use fusb302::Fusb302;
use gt9xx::Gt9xx;
use max170xx::{GaugeConfig, Max170xx};
use pi3usb30532::Pi3usb30532;

use crate::{gpio, power, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverKind {
    Gpio,
    PowerNexus,
    Pwm,
    Touchscreen,
    Charger,
    FuelGauge,
    TypeC,
    Mux,
}

impl DriverKind {
    /// Whether the device is reached over I2C.
    pub fn is_i2c(self) -> bool {
        matches!(
            self,
            DriverKind::Touchscreen
                | DriverKind::Charger
                | DriverKind::FuelGauge
                | DriverKind::TypeC
                | DriverKind::Mux
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverInfo {
    pub kind: DriverKind,
    pub name: &'static str,
    pub description: &'static str,
}

const GPIO: DriverInfo = DriverInfo {
    kind: DriverKind::Gpio,
    name: "chvgpio",
    description: "Intel Cherry View GPIO",
};

const POWER: DriverInfo = DriverInfo {
    kind: DriverKind::PowerNexus,
    name: "chvpower",
    description: "Intel Cherry View Power Nexus",
};

const PWM: DriverInfo = DriverInfo {
    kind: DriverKind::Pwm,
    name: "chvpwm",
    description: "Intel Cherry View PWM",
};

const TOUCHSCREEN: DriverInfo = DriverInfo {
    kind: DriverKind::Touchscreen,
    name: "goodix",
    description: "Goodix GT9xx Capacitive TouchScreen",
};

const CHARGER: DriverInfo = DriverInfo {
    kind: DriverKind::Charger,
    name: "bqreg",
    description: "bq2419x power regulator",
};

const FUEL_GAUGE: DriverInfo = DriverInfo {
    kind: DriverKind::FuelGauge,
    name: "max170xx",
    description: "Maxim max170xx Fuel Gauge",
};

const TYPE_C: DriverInfo = DriverInfo {
    kind: DriverKind::TypeC,
    name: "fusb3",
    description: "fusb302 USB Type-C Controller with PD",
};

const MUX: DriverInfo = DriverInfo {
    kind: DriverKind::Mux,
    name: "pi3usb",
    description: "pi3usb30532 USB Type-C Mux",
};

const DRIVERS: &[(&str, DriverInfo)] = &[
    (gpio::HID, GPIO),
    (power::HID, POWER),
    (chvpwm::HIDS[0], PWM),
    (chvpwm::HIDS[1], PWM),
    (gt9xx::HIDS[0], TOUCHSCREEN),
    ("bq24292i", CHARGER),
    ("max17047", FUEL_GAUGE),
    ("fusb302", TYPE_C),
    ("pi3usb30532", MUX),
];

/// Finds the driver for an ACPI hardware ID or a nexus child name.
pub fn probe(id: &str) -> Result<&'static DriverInfo, Error> {
    DRIVERS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, info)| info)
        .ok_or(Error::UnknownDevice)
}

pub enum I2cDevice<I> {
    Charger(Bq2419x<I>),
    FuelGauge(Max170xx<I>),
    TypeC(Fusb302<I>),
    Mux(Pi3usb30532<I>),
    Touchscreen(Gt9xx<I>),
}

impl<I> I2cDevice<I> {
    pub fn kind(&self) -> DriverKind {
        match self {
            I2cDevice::Charger(_) => DriverKind::Charger,
            I2cDevice::FuelGauge(_) => DriverKind::FuelGauge,
            I2cDevice::TypeC(_) => DriverKind::TypeC,
            I2cDevice::Mux(_) => DriverKind::Mux,
            I2cDevice::Touchscreen(_) => DriverKind::Touchscreen,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cAttachError<E> {
    /// The driver does not sit on an I2C bus.
    NotI2c(DriverKind),
    Charger(bq2419x::Error<E>),
    FuelGauge(max170xx::Error<E>),
    Touchscreen(gt9xx::Error<E>),
}

/// Attaches the driver of `kind` to the device at `address` on `i2c`.
pub async fn attach_i2c<I>(
    kind: DriverKind,
    i2c: I,
    address: u8,
) -> Result<I2cDevice<I>, I2cAttachError<I::Error>>
where
    I: AsyncI2c,
{
    let device = match kind {
        DriverKind::Charger => I2cDevice::Charger(
            Bq2419x::attach(i2c, address)
                .await
                .map_err(I2cAttachError::Charger)?,
        ),
        DriverKind::FuelGauge => {
            let config = GaugeConfig {
                address,
                ..GaugeConfig::default()
            };
            I2cDevice::FuelGauge(
                Max170xx::attach(i2c, config)
                    .await
                    .map_err(I2cAttachError::FuelGauge)?,
            )
        }
        DriverKind::TypeC => I2cDevice::TypeC(Fusb302::attach(i2c, address).await),
        DriverKind::Mux => I2cDevice::Mux(Pi3usb30532::attach(i2c, address).await),
        DriverKind::Touchscreen => I2cDevice::Touchscreen(
            Gt9xx::attach(i2c, address)
                .await
                .map_err(I2cAttachError::Touchscreen)?,
        ),
        other => return Err(I2cAttachError::NotI2c(other)),
    };

    Ok(device)
}
