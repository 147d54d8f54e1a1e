#![cfg_attr(not(test), no_std)]

//! Driver for the MAX17047/MAX17050 fuel gauges.

#[macro_use]
extern crate logger;

use device_descriptor::{Proxy, ReadOnlyRegister};
use embedded_hal_async::i2c::I2c as AsyncI2c;
use enumset::EnumSet;
use register_access::{AsyncRegisterAccess, I2cInterface};

mod battery;
pub mod codec;
pub mod ll;

pub use battery::{
    BatteryInfo, BatteryState, BatteryStateFlag, BatteryStatus, PowerUnit, Technology,
};

pub const DEFAULT_ADDRESS: u8 = 0x36;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Transport(E),
    /// The gauge did not answer the initial status read.
    DeviceNotResponding(E),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaugeConfig {
    /// 7-bit I2C address
    pub address: u8,

    /// LSB = 1mOhm
    pub r_sense_mohm: u32,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            r_sense_mohm: 10,
        }
    }
}

const fn entry<R: ReadOnlyRegister<u16>>() -> (&'static str, u16) {
    (R::NAME, R::ADDRESS)
}

const DIAGNOSTIC_REGISTERS: [(&str, u16); 14] = [
    entry::<ll::Status>(),
    entry::<ll::Config>(),
    entry::<ll::SocAlertThreshold>(),
    entry::<ll::Temperature>(),
    entry::<ll::VCell>(),
    entry::<ll::FullCap>(),
    entry::<ll::SocAv>(),
    entry::<ll::TimeToEmpty>(),
    entry::<ll::DesignCap>(),
    entry::<ll::RemCap>(),
    entry::<ll::Version>(),
    entry::<ll::VfOcv>(),
    entry::<ll::SocVf>(),
    entry::<ll::AvgVCell>(),
];

async fn read_word<I: AsyncI2c>(
    interface: &mut I2cInterface<I>,
    address: u16,
) -> Result<u16, I::Error> {
    <I2cInterface<I> as AsyncRegisterAccess<u16>>::read_raw(interface, address).await
}

async fn read_register<I: AsyncI2c, R: ReadOnlyRegister<u16>>(
    interface: &mut I2cInterface<I>,
) -> Result<R, I::Error> {
    <I2cInterface<I> as AsyncRegisterAccess<u16>>::read_register::<R>(interface).await
}

pub struct Max170xx<I> {
    interface: I2cInterface<I>,
    config: GaugeConfig,
    info: BatteryInfo,
}

impl<I> Max170xx<I>
where
    I: AsyncI2c,
{
    /// Confirms the gauge responds, logs its registers and takes the static battery
    /// snapshot.
    pub async fn attach(i2c: I, config: GaugeConfig) -> Result<Self, Error<I::Error>> {
        let mut interface = I2cInterface::new(i2c, config.address);

        let status = read_register::<I, ll::Status>(&mut interface)
            .await
            .map_err(Error::DeviceNotResponding)?;

        if status.power_on_reset().is_set() {
            debug!("Fuel gauge reports power-on reset");
        }

        Self::dump_registers(&mut interface).await;

        let info = Self::read_static_info(&mut interface, config)
            .await
            .map_err(Error::Transport)?;

        info!(
            "Fuel gauge attached: {} mAh design, {} mAh full, {} mV",
            info.design_capacity,
            info.last_full_capacity,
            info.design_voltage
        );

        Ok(Self {
            interface,
            config,
            info,
        })
    }

    async fn dump_registers(interface: &mut I2cInterface<I>) {
        for (name, address) in DIAGNOSTIC_REGISTERS {
            match read_word(interface, address).await {
                Ok(value) => {
                    dump_register!(name, address, value);
                }
                Err(_) => {
                    warn!("Failed to read {}", name);
                }
            }
        }

        if let Ok(soc) = read_word(interface, ll::SocVf::ADDRESS).await {
            debug!("Battery at {}%", codec::soc_percent(soc));
        }
    }

    async fn read_static_info(
        interface: &mut I2cInterface<I>,
        config: GaugeConfig,
    ) -> Result<BatteryInfo, I::Error> {
        let design_cap = read_register::<I, ll::DesignCap>(interface).await?;
        let full_cap = read_register::<I, ll::FullCap>(interface).await?;
        let vcell = read_register::<I, ll::VCell>(interface).await?;

        let r_sense = config.r_sense_mohm;
        let last_full_capacity = codec::capacity_mah(full_cap.capacity().read_field_bits(), r_sense);

        Ok(BatteryInfo {
            units: PowerUnit::MilliAmp,
            design_capacity: codec::capacity_mah(design_cap.capacity().read_field_bits(), r_sense),
            last_full_capacity,
            technology: Technology::Rechargeable,
            design_voltage: codec::cell_voltage_mv(vcell.voltage().read_field_bits()),
            warning_capacity: codec::warning_capacity(last_full_capacity),
            low_capacity: codec::low_capacity(last_full_capacity),
            granularity_low: 70,
            granularity_full: 70,
            model: "max17047/max17050",
            serial: "unknown",
            kind: "fuel gauge",
            oem_info: "unknown",
        })
    }

    /// Returns the battery information read at attach time.
    pub fn static_info(&self) -> &BatteryInfo {
        &self.info
    }

    pub fn config(&self) -> GaugeConfig {
        self.config
    }

    /// Reads remaining capacity, average voltage and average current.
    ///
    /// The gauge cannot tell charging from discharging, so the state is always
    /// [`BatteryStateFlag::Discharging`].
    pub async fn read_status(&mut self) -> Result<BatteryStatus, Error<I::Error>> {
        let r_sense = self.config.r_sense_mohm;

        let remaining = read_register::<I, ll::RemCap>(&mut self.interface)
            .await
            .map_err(Error::Transport)?;
        let voltage = read_register::<I, ll::AvgVCell>(&mut self.interface)
            .await
            .map_err(Error::Transport)?;
        let current = read_register::<I, ll::AvgCurrent>(&mut self.interface)
            .await
            .map_err(Error::Transport)?;

        Ok(BatteryStatus {
            state: EnumSet::only(BatteryStateFlag::Discharging),
            remaining_capacity: codec::capacity_mah(remaining.capacity().read_field_bits(), r_sense),
            voltage: codec::cell_voltage_mv(voltage.voltage().read_field_bits()),
            rate: codec::current_ma(current.current().read_field_bits(), r_sense),
        })
    }

    /// Returns the state of charge reported by the voltage fuel gauge, in %.
    pub async fn read_state_of_charge(&mut self) -> Result<u8, Error<I::Error>> {
        let reg = read_register::<I, ll::SocVf>(&mut self.interface)
            .await
            .map_err(Error::Transport)?;
        Ok(codec::soc_percent(reg.percentage().read_field_bits()))
    }

    pub async fn read_version(&mut self) -> Result<u16, Error<I::Error>> {
        let reg = read_register::<I, ll::Version>(&mut self.interface)
            .await
            .map_err(Error::Transport)?;
        Ok(reg.bits())
    }

    /// Reads any register word, for diagnostics.
    pub async fn read_raw(&mut self, register: u8) -> Result<u16, Error<I::Error>> {
        read_word(&mut self.interface, register as u16)
            .await
            .map_err(Error::Transport)
    }

    /// Gives back the bus.
    pub fn release(self) -> I {
        self.interface.into_inner()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    struct MockI2c {
        registers: [u16; 256],
        pointer: u8,
        responding: bool,
        failing: Option<u8>,
        reads: Vec<u8>,
    }

    impl MockI2c {
        fn new() -> Self {
            let mut registers = [0; 256];
            registers[0x18] = 8000;
            registers[0x10] = 7680;
            registers[0x09] = 4096;
            registers[0x1F] = 3000;
            registers[0x19] = 4096;
            registers[0x0B] = 0xFC18;
            registers[0x21] = 0x00AC;
            registers[0xFF] = 0x3200;

            Self {
                registers,
                pointer: 0,
                responding: true,
                failing: None,
                reads: Vec::new(),
            }
        }
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl AsyncI2c for MockI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if !self.responding || address != DEFAULT_ADDRESS {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            for operation in operations {
                match operation {
                    Operation::Write(bytes) => self.pointer = bytes[0],
                    Operation::Read(buffer) => {
                        if self.failing == Some(self.pointer) {
                            return Err(ErrorKind::Bus);
                        }
                        self.reads.push(self.pointer);
                        let value = self.registers[self.pointer as usize];
                        buffer.copy_from_slice(&value.to_le_bytes());
                    }
                }
            }

            Ok(())
        }
    }

    #[async_std::test]
    async fn attach_builds_static_info() {
        let gauge = Max170xx::attach(MockI2c::new(), GaugeConfig::default())
            .await
            .expect("Failed to attach");

        let info = gauge.static_info();
        assert_eq!(info.units, PowerUnit::MilliAmp);
        assert_eq!(info.design_capacity, 4000);
        assert_eq!(info.last_full_capacity, 3840);
        assert_eq!(info.design_voltage, 819);
        assert_eq!(info.warning_capacity, 576);
        assert_eq!(info.low_capacity, 384);
        assert_eq!(info.granularity_low, 70);
        assert_eq!(info.granularity_full, 70);
        assert_eq!(info.technology, Technology::Rechargeable);
        assert_eq!(info.model, "max17047/max17050");
        assert_eq!(info.serial, "unknown");
        assert_eq!(info.kind, "fuel gauge");
        assert_eq!(info.oem_info, "unknown");
    }

    #[async_std::test]
    async fn attach_reads_status_first() {
        let gauge = Max170xx::attach(MockI2c::new(), GaugeConfig::default())
            .await
            .expect("Failed to attach");

        let bus = gauge.release();
        assert_eq!(bus.reads.first(), Some(&0x00));
        assert_eq!(&bus.reads[bus.reads.len() - 3..], &[0x18, 0x10, 0x09]);
    }

    #[async_std::test]
    async fn attach_fails_if_gauge_does_not_respond() {
        let mut bus = MockI2c::new();
        bus.responding = false;

        let result = Max170xx::attach(bus, GaugeConfig::default()).await;
        assert!(matches!(result, Err(Error::DeviceNotResponding(_))));
    }

    #[async_std::test]
    async fn attach_fails_if_snapshot_cannot_be_read() {
        let mut bus = MockI2c::new();
        bus.failing = Some(0x18);

        let result = Max170xx::attach(bus, GaugeConfig::default()).await;
        assert!(matches!(result, Err(Error::Transport(ErrorKind::Bus))));
    }

    #[async_std::test]
    async fn status_is_read_fresh_and_always_discharging() {
        let mut gauge = Max170xx::attach(MockI2c::new(), GaugeConfig::default())
            .await
            .expect("Failed to attach");

        let status = gauge.read_status().await.expect("Failed to read status");
        assert_eq!(status.state, EnumSet::only(BatteryStateFlag::Discharging));
        assert_eq!(status.remaining_capacity, 1500);
        assert_eq!(status.voltage, 819);
        assert_eq!(status.rate, 10083);
        assert!(status.is_present());

        gauge.interface.inner_mut().registers[0x1F] = 2000;

        let status = gauge.read_status().await.expect("Failed to read status");
        assert_eq!(status.remaining_capacity, 1000);
    }

    #[async_std::test]
    async fn status_read_failure_is_reported() {
        let mut bus = MockI2c::new();
        bus.failing = Some(0x0B);

        let mut gauge = Max170xx::attach(bus, GaugeConfig::default())
            .await
            .expect("Failed to attach");

        assert!(matches!(
            gauge.read_status().await,
            Err(Error::Transport(ErrorKind::Bus))
        ));
    }

    #[async_std::test]
    async fn reads_state_of_charge_and_version() {
        let mut gauge = Max170xx::attach(MockI2c::new(), GaugeConfig::default())
            .await
            .expect("Failed to attach");

        assert_eq!(gauge.read_state_of_charge().await.unwrap(), 50);
        assert_eq!(gauge.read_version().await.unwrap(), 0x00AC);
        assert_eq!(gauge.read_raw(0x10).await.unwrap(), 7680);
    }

    #[test]
    fn absent_battery_sets_every_state_flag() {
        let status = BatteryStatus::not_present();
        assert!(!status.is_present());
        assert_eq!(status.state.len(), 3);
    }
}
