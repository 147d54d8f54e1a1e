#![cfg_attr(not(test), no_std)]

//! Driver for the PI3USB30532 USB Type-C signal mux.
//!
//! The mux has a single configuration register. Reads return it as the second byte of a
//! two byte response, writes go through register pointer 0.

#[macro_use]
extern crate logger;

use core::convert::TryFrom;

use device_descriptor::Proxy;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use register_access::I2cInterface;

pub mod ll {
    use device_descriptor::*;

    device! {
        Selection(u8, addr = 0x00, default = 0x00) {
            mode(pos = 0, width = 4): MuxMode {
                Open = 0,
                OpenSwap = 1,
                FourLaneDp = 2,
                FourLaneDpSwap = 3,
                Usb3 = 4,
                Usb3Swap = 5,
                Usb3TwoLaneDp = 6,
                Usb3TwoLaneDpSwap = 7,
                PowerDown = 8
            }
        }
    }
}

pub use ll::MuxMode;

pub const DEFAULT_ADDRESS: u8 = 0x54;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Transport(E),
    /// The value does not name a mux configuration.
    InvalidMode(u8),
}

pub struct Pi3usb30532<I> {
    interface: I2cInterface<I>,
    config: Option<u8>,
}

impl<I> Pi3usb30532<I>
where
    I: AsyncI2c,
{
    /// Reads the current configuration once. A failed read is logged and the mux is
    /// used anyway.
    pub async fn attach(i2c: I, address: u8) -> Self {
        let mut this = Self {
            interface: I2cInterface::new(i2c, address),
            config: None,
        };

        match this.read_config().await {
            Ok(config) => {
                debug!("Mux default config: {:#x}", config);
            }
            Err(_) => {
                warn!("Failed to read mux config");
            }
        }

        this
    }

    /// The last configuration read from or written to the device.
    pub fn config(&self) -> Option<u8> {
        self.config
    }

    pub fn mode(&self) -> Option<MuxMode> {
        self.config
            .and_then(|config| MuxMode::try_from(config).ok())
    }

    pub async fn read_config(&mut self) -> Result<u8, Error<I::Error>> {
        let mut buffer = [0; 2];
        self.interface
            .read_unaddressed(&mut buffer)
            .await
            .map_err(Error::Transport)?;

        let config = buffer[1];
        self.config = Some(config);
        Ok(config)
    }

    /// Writes a raw configuration value. Values that do not name a mode are rejected
    /// without touching the bus.
    pub async fn write_config(&mut self, value: u8) -> Result<(), Error<I::Error>> {
        let mode = MuxMode::try_from(value).map_err(Error::InvalidMode)?;
        self.set_mode(mode).await
    }

    pub async fn set_mode(&mut self, mode: MuxMode) -> Result<(), Error<I::Error>> {
        let reg = <ll::Selection as device_descriptor::Register<u8>>::new(|w| {
            w.mode().write(mode)
        });

        self.interface
            .write_bytes(0, &[reg.bits()])
            .await
            .map_err(Error::Transport)?;

        self.config = Some(reg.bits());
        Ok(())
    }

    pub fn release(self) -> I {
        self.interface.into_inner()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Echoes the last write back on reads.
    struct EchoI2c {
        last_write: [u8; 2],
        writes: usize,
        responding: bool,
    }

    impl EchoI2c {
        fn new(config: u8) -> Self {
            Self {
                last_write: [0, config],
                writes: 0,
                responding: true,
            }
        }
    }

    impl ErrorType for EchoI2c {
        type Error = ErrorKind;
    }

    impl AsyncI2c for EchoI2c {
        async fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if !self.responding {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            for operation in operations {
                match operation {
                    Operation::Write(bytes) => {
                        self.writes += 1;
                        self.last_write.copy_from_slice(bytes);
                    }
                    Operation::Read(buffer) => buffer.copy_from_slice(&self.last_write),
                }
            }

            Ok(())
        }
    }

    #[async_std::test]
    async fn attach_reads_the_default_config() {
        let mux = Pi3usb30532::attach(EchoI2c::new(4), DEFAULT_ADDRESS).await;

        assert_eq!(mux.config(), Some(4));
        assert_eq!(mux.mode(), Some(MuxMode::Usb3));
    }

    #[async_std::test]
    async fn attach_tolerates_read_failure() {
        let mut bus = EchoI2c::new(4);
        bus.responding = false;

        let mux = Pi3usb30532::attach(bus, DEFAULT_ADDRESS).await;
        assert_eq!(mux.config(), None);
    }

    #[async_std::test]
    async fn invalid_mode_is_rejected_without_bus_access() {
        let mut mux = Pi3usb30532::attach(EchoI2c::new(4), DEFAULT_ADDRESS).await;

        assert!(matches!(
            mux.write_config(9).await,
            Err(Error::InvalidMode(9))
        ));
        assert_eq!(mux.config(), Some(4));
        assert_eq!(mux.release().writes, 0);
    }

    #[async_std::test]
    async fn written_config_reads_back() {
        let mut mux = Pi3usb30532::attach(EchoI2c::new(0), DEFAULT_ADDRESS).await;

        mux.write_config(3).await.expect("Failed to write config");
        assert_eq!(mux.read_config().await.unwrap(), 3);
        assert_eq!(mux.mode(), Some(MuxMode::FourLaneDpSwap));

        let bus = mux.release();
        assert_eq!(bus.last_write, [0, 3]);
    }

    #[async_std::test]
    async fn every_named_mode_is_accepted() {
        let mut mux = Pi3usb30532::attach(EchoI2c::new(0), DEFAULT_ADDRESS).await;

        for value in 0..=8 {
            mux.write_config(value).await.expect("Failed to write config");
            assert_eq!(mux.read_config().await.unwrap(), value);
        }
    }
}
