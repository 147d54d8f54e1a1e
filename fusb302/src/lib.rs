#![cfg_attr(not(test), no_std)]

//! Status reads for the FUSB302 USB Type-C port controller.

#[macro_use]
extern crate logger;

use device_descriptor::{Proxy, ReadOnlyRegister};
use embedded_hal_async::i2c::I2c as AsyncI2c;
use register_access::{AsyncRegisterAccess, I2cInterface};

pub mod ll {
    use device_descriptor::*;

    device! {
        DeviceId(u8, addr = 0x01) {
            revision(pos = 0, width = 2): u8,
            product(pos = 2, width = 2): u8,
            version(pos = 4, width = 4): u8
        }

        Status0a(u8, addr = 0x3C) {
            hard_reset(pos = 0, width = 1): u8,
            soft_reset(pos = 1, width = 1): u8,
            power(pos = 2, width = 2): u8,
            retry_fail(pos = 4, width = 1): u8,
            soft_fail(pos = 5, width = 1): u8
        }

        Status1a(u8, addr = 0x3D) {
            rx_sop(pos = 0, width = 1): u8,
            rx_sop1_debug(pos = 1, width = 1): u8,
            rx_sop2_debug(pos = 2, width = 1): u8,
            toggle_state(pos = 3, width = 3): ToggleState {
                Running = 0,
                SourceCc1 = 1,
                SourceCc2 = 2,
                SinkCc1 = 5,
                SinkCc2 = 6,
                AudioAccessory = 7
            }
        }

        Status0(u8, addr = 0x40) {
            bc_level(pos = 0, width = 2): u8,
            wake(pos = 2, width = 1): u8,
            alert(pos = 3, width = 1): u8,
            crc_check(pos = 4, width = 1): u8,
            comparator(pos = 5, width = 1): u8,
            activity(pos = 6, width = 1): u8,
            vbus_ok(pos = 7, width = 1): u8
        }

        Status1(u8, addr = 0x41) {
            over_current(pos = 0, width = 1): u8,
            over_temperature(pos = 1, width = 1): u8,
            tx_full(pos = 2, width = 1): u8,
            tx_empty(pos = 3, width = 1): u8,
            rx_full(pos = 4, width = 1): u8,
            rx_empty(pos = 5, width = 1): u8,
            rx_sop1(pos = 6, width = 1): u8,
            rx_sop2(pos = 7, width = 1): u8
        }
    }
}

pub use ll::ToggleState;

pub const DEFAULT_ADDRESS: u8 = 0x22;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Transport(E),
}

/// One snapshot of the status registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortStatus {
    pub status0a: ll::Status0a,
    pub status1a: ll::Status1a,
    pub status0: ll::Status0,
    pub status1: ll::Status1,
}

impl PortStatus {
    pub fn vbus_ok(&self) -> bool {
        self.status0.vbus_ok().is_set()
    }

    pub fn toggle_state(&self) -> Option<ToggleState> {
        self.status1a.toggle_state().read()
    }
}

pub struct Fusb302<I> {
    interface: I2cInterface<I>,
    device_id: Option<ll::DeviceId>,
}

impl<I> Fusb302<I>
where
    I: AsyncI2c,
{
    /// Reads the device ID once. A failed read is logged and the controller is used
    /// anyway.
    pub async fn attach(i2c: I, address: u8) -> Self {
        let mut this = Self {
            interface: I2cInterface::new(i2c, address),
            device_id: None,
        };

        match this.read::<ll::DeviceId>().await {
            Ok(id) => {
                info!(
                    "FUSB302 version {} revision {}",
                    id.version().read_field_bits(),
                    id.revision().read_field_bits()
                );
                this.device_id = Some(id);
            }
            Err(_) => {
                warn!("Failed to read FUSB302 device ID");
            }
        }

        this
    }

    /// Device ID read at attach time.
    pub fn device_id(&self) -> Option<ll::DeviceId> {
        self.device_id
    }

    pub async fn read<R>(&mut self) -> Result<R, Error<I::Error>>
    where
        R: ReadOnlyRegister<u8>,
    {
        <I2cInterface<I> as AsyncRegisterAccess<u8>>::read_register::<R>(&mut self.interface)
            .await
            .map_err(Error::Transport)
    }

    pub async fn read_status(&mut self) -> Result<PortStatus, Error<I::Error>> {
        let status = PortStatus {
            status0a: self.read().await?,
            status1a: self.read().await?,
            status0: self.read().await?,
            status1: self.read().await?,
        };

        trace!(
            "FUSB302 status {:#x} {:#x} {:#x} {:#x}",
            status.status0a.bits(),
            status.status1a.bits(),
            status.status0.bits(),
            status.status1.bits()
        );

        Ok(status)
    }

    pub fn release(self) -> I {
        self.interface.into_inner()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    struct MockI2c {
        registers: [u8; 0x43],
        pointer: usize,
        responding: bool,
    }

    impl MockI2c {
        fn new() -> Self {
            let mut registers = [0; 0x43];
            registers[0x01] = 0x91;
            registers[0x3C] = 0x08;
            registers[0x3D] = 0b0010_1000;
            registers[0x40] = 0x81;
            registers[0x41] = 0x28;

            Self {
                registers,
                pointer: 0,
                responding: true,
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
                    Operation::Write(bytes) => self.pointer = bytes[0] as usize,
                    Operation::Read(buffer) => buffer[0] = self.registers[self.pointer],
                }
            }

            Ok(())
        }
    }

    #[async_std::test]
    async fn attach_reads_device_id() {
        let controller = Fusb302::attach(MockI2c::new(), DEFAULT_ADDRESS).await;

        let id = controller.device_id().expect("Device ID was not read");
        assert_eq!(id.version().read_field_bits(), 9);
        assert_eq!(id.revision().read_field_bits(), 1);
    }

    #[async_std::test]
    async fn attach_tolerates_read_failure() {
        let mut bus = MockI2c::new();
        bus.responding = false;

        let controller = Fusb302::attach(bus, DEFAULT_ADDRESS).await;
        assert!(controller.device_id().is_none());
    }

    #[async_std::test]
    async fn reads_every_status_register() {
        let mut controller = Fusb302::attach(MockI2c::new(), DEFAULT_ADDRESS).await;

        let status = controller.read_status().await.unwrap();
        assert_eq!(status.status0a.power().read_field_bits(), 2);
        assert_eq!(status.toggle_state(), Some(ToggleState::SinkCc1));
        assert!(status.vbus_ok());
        assert_eq!(status.status0.bc_level().read_field_bits(), 1);
        assert!(status.status1.tx_empty().is_set());
        assert!(status.status1.rx_empty().is_set());
        assert!(!status.status1.over_current().is_set());
    }

    #[async_std::test]
    async fn status_read_failure_is_reported() {
        let mut controller = Fusb302::attach(MockI2c::new(), DEFAULT_ADDRESS).await;
        controller.interface.inner_mut().responding = false;

        assert!(matches!(
            controller.read_status().await,
            Err(Error::Transport(_))
        ));
    }
}
