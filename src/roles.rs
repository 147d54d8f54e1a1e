//! Interfaces the host framework drives devices through, one per device role.

use chvgpio::ChvGpio;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use heapless::String;
use max170xx::{BatteryInfo, BatteryStatus};
use pi3usb30532::Pi3usb30532;
use register_access::RegisterWindow;

use crate::power::ChvPower;

pub trait BatteryDevice {
    type Error;

    async fn get_status(&self) -> Result<BatteryStatus, Self::Error>;
    async fn get_info(&self) -> BatteryInfo;
}

pub trait GpioController {
    type Error;

    /// Highest valid pin number.
    fn pin_max(&self) -> i32;
    fn pin_name(&self, pin: i32) -> Result<String<8>, Self::Error>;
    fn pin_get(&self, pin: i32) -> Result<bool, Self::Error>;
    fn pin_set(&self, pin: i32, value: bool) -> Result<(), Self::Error>;
    fn pin_toggle(&self, pin: i32) -> Result<(), Self::Error>;
}

pub trait MuxDevice {
    type Error;

    async fn read_config(&mut self) -> Result<u8, Self::Error>;
    async fn write_config(&mut self, value: u8) -> Result<(), Self::Error>;
}

impl<D, I> BatteryDevice for ChvPower<D, I>
where
    D: Copy + PartialEq + core::fmt::Debug,
    I: AsyncI2c,
{
    type Error = max170xx::Error<I::Error>;

    async fn get_status(&self) -> Result<BatteryStatus, Self::Error> {
        self.get_bst().await
    }

    async fn get_info(&self) -> BatteryInfo {
        self.get_bif().await
    }
}

impl<W> GpioController for ChvGpio<W>
where
    W: RegisterWindow,
{
    type Error = chvgpio::Error;

    fn pin_max(&self) -> i32 {
        ChvGpio::pin_max(self)
    }

    fn pin_name(&self, pin: i32) -> Result<String<8>, Self::Error> {
        ChvGpio::pin_name(self, pin)
    }

    fn pin_get(&self, pin: i32) -> Result<bool, Self::Error> {
        self.read_pin(pin)
    }

    fn pin_set(&self, pin: i32, value: bool) -> Result<(), Self::Error> {
        self.write_pin(pin, value)
    }

    fn pin_toggle(&self, pin: i32) -> Result<(), Self::Error> {
        self.toggle_pin(pin)
    }
}

impl<I> MuxDevice for Pi3usb30532<I>
where
    I: AsyncI2c,
{
    type Error = pi3usb30532::Error<I::Error>;

    async fn read_config(&mut self) -> Result<u8, Self::Error> {
        Pi3usb30532::read_config(self).await
    }

    async fn write_config(&mut self, value: u8) -> Result<(), Self::Error> {
        Pi3usb30532::write_config(self, value).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};

    /// Reads return the last byte written.
    struct EchoBus {
        value: u8,
    }

    impl ErrorType for EchoBus {
        type Error = ErrorKind;
    }

    impl AsyncI2c for EchoBus {
        async fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => self.value = bytes[bytes.len() - 1],
                    Operation::Read(buffer) => buffer.fill(self.value),
                }
            }
            Ok(())
        }
    }

    async fn switch<M: MuxDevice>(mux: &mut M, value: u8) -> Result<u8, M::Error> {
        mux.write_config(value).await?;
        mux.read_config().await
    }

    #[async_std::test]
    async fn mux_is_driven_through_its_role() {
        let mut mux =
            Pi3usb30532::attach(EchoBus { value: 0 }, pi3usb30532::DEFAULT_ADDRESS).await;

        assert_eq!(switch(&mut mux, 6).await.unwrap(), 6);
        assert!(matches!(
            switch(&mut mux, 12).await,
            Err(pi3usb30532::Error::InvalidMode(12))
        ));
        assert_eq!(mux.mode(), Some(pi3usb30532::MuxMode::Usb3TwoLaneDp));
    }
}
