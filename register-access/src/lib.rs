#![cfg_attr(not(test), no_std)]

//! Transports for register-mapped peripherals.
//!
//! I2C devices are reached through [`I2cInterface`], which turns a register description
//! into a single write-then-read transaction. Memory-mapped register windows implement
//! [`RegisterWindow`].

use device_descriptor::{ReadOnlyRegister, Register, RegisterWidthType};
use embedded_hal_async::i2c::{I2c as AsyncI2c, Operation};

mod window;

pub use window::{MmioWindow, RegisterWindow};

pub trait AsyncRegisterAccess<RWT>
where
    RWT: RegisterWidthType,
{
    type Error;

    async fn read_raw(&mut self, address: u16) -> Result<RWT, Self::Error>;
    async fn write_raw(&mut self, address: u16, value: RWT) -> Result<(), Self::Error>;

    async fn read_register<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister<RWT>,
    {
        let bits = self.read_raw(R::ADDRESS).await?;
        Ok(R::from_bits(bits))
    }

    async fn write_register<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register<RWT>,
    {
        self.write_raw(R::ADDRESS, reg.bits()).await
    }
}

/// Byte order of multi-byte register values on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// Size of the register pointer sent before every access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerWidth {
    OneByte,
    /// Sent most significant byte first.
    TwoBytes,
}

/// Register values that can be moved over the wire.
pub trait WireWord: RegisterWidthType {
    const SIZE: usize;

    fn encode(self, order: ByteOrder, out: &mut [u8]);
    fn decode(order: ByteOrder, bytes: &[u8]) -> Self;
}

impl WireWord for u8 {
    const SIZE: usize = 1;

    fn encode(self, _order: ByteOrder, out: &mut [u8]) {
        out[0] = self;
    }

    fn decode(_order: ByteOrder, bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl WireWord for u16 {
    const SIZE: usize = 2;

    fn encode(self, order: ByteOrder, out: &mut [u8]) {
        let bytes = match order {
            ByteOrder::LittleEndian => self.to_le_bytes(),
            ByteOrder::BigEndian => self.to_be_bytes(),
        };
        out[..2].copy_from_slice(&bytes);
    }

    fn decode(order: ByteOrder, bytes: &[u8]) -> Self {
        let bytes = [bytes[0], bytes[1]];
        match order {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        }
    }
}

/// A device on an I2C bus, addressed with a 7-bit slave address.
pub struct I2cInterface<I> {
    i2c: I,
    address: u8,
    pointer: PointerWidth,
    order: ByteOrder,
}

impl<I> I2cInterface<I> {
    pub const fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            pointer: PointerWidth::OneByte,
            order: ByteOrder::LittleEndian,
        }
    }

    pub const fn with_pointer_width(mut self, pointer: PointerWidth) -> Self {
        self.pointer = pointer;
        self
    }

    pub const fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.i2c
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }

    fn pointer_bytes(&self, register: u16, out: &mut [u8]) -> usize {
        match self.pointer {
            PointerWidth::OneByte => {
                debug_assert!(register <= u8::MAX as u16);
                out[0] = register as u8;
                1
            }
            PointerWidth::TwoBytes => {
                out[..2].copy_from_slice(&register.to_be_bytes());
                2
            }
        }
    }
}

impl<I> I2cInterface<I>
where
    I: AsyncI2c,
{
    /// Sets the register pointer and reads `buffer.len()` bytes in one transaction.
    pub async fn read_bytes(&mut self, register: u16, buffer: &mut [u8]) -> Result<(), I::Error> {
        let mut pointer = [0; 2];
        let len = self.pointer_bytes(register, &mut pointer);
        self.i2c
            .write_read(self.address, &pointer[..len], buffer)
            .await
    }

    /// Reads from wherever the device's register pointer currently is.
    pub async fn read_unaddressed(&mut self, buffer: &mut [u8]) -> Result<(), I::Error> {
        self.i2c.read(self.address, buffer).await
    }

    /// Sets the register pointer and writes `data` in one transaction.
    pub async fn write_bytes(&mut self, register: u16, data: &[u8]) -> Result<(), I::Error> {
        let mut buffer = [0; 18];
        let len = self.pointer_bytes(register, &mut buffer);

        if data.len() > buffer.len() - len {
            // Adjacent writes go out back to back, without a repeated start.
            return self
                .i2c
                .transaction(
                    self.address,
                    &mut [Operation::Write(&buffer[..len]), Operation::Write(data)],
                )
                .await;
        }

        buffer[len..len + data.len()].copy_from_slice(data);
        self.i2c
            .write(self.address, &buffer[..len + data.len()])
            .await
    }
}

impl<I, RWT> AsyncRegisterAccess<RWT> for I2cInterface<I>
where
    I: AsyncI2c,
    RWT: WireWord,
{
    type Error = I::Error;

    async fn read_raw(&mut self, address: u16) -> Result<RWT, Self::Error> {
        let mut buffer = [0; 4];
        self.read_bytes(address, &mut buffer[..RWT::SIZE]).await?;
        Ok(RWT::decode(self.order, &buffer[..RWT::SIZE]))
    }

    async fn write_raw(&mut self, address: u16, value: RWT) -> Result<(), Self::Error> {
        let mut buffer = [0; 4];
        value.encode(self.order, &mut buffer[..RWT::SIZE]);
        self.write_bytes(address, &buffer[..RWT::SIZE]).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType};

    /// Records the bytes each transaction puts on the wire.
    #[derive(Default)]
    struct RecordingI2c {
        transactions: Vec<Vec<u8>>,
    }

    impl ErrorType for RecordingI2c {
        type Error = ErrorKind;
    }

    impl AsyncI2c for RecordingI2c {
        async fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut wire = Vec::new();
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => wire.extend_from_slice(bytes),
                    Operation::Read(buffer) => buffer.fill(0),
                }
            }
            self.transactions.push(wire);
            Ok(())
        }
    }

    #[async_std::test]
    async fn short_write_is_sent_in_one_piece() {
        let mut interface = I2cInterface::new(RecordingI2c::default(), 0x10);

        interface.write_bytes(0x05, &[1, 2, 3]).await.unwrap();

        assert_eq!(interface.into_inner().transactions, [vec![0x05, 1, 2, 3]]);
    }

    #[async_std::test]
    async fn long_write_is_not_truncated() {
        let mut interface = I2cInterface::new(RecordingI2c::default(), 0x10)
            .with_pointer_width(PointerWidth::TwoBytes);
        let data: Vec<u8> = (0..40).collect();

        interface.write_bytes(0x8047, &data).await.unwrap();

        let transactions = interface.into_inner().transactions;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0][..2], [0x80, 0x47]);
        assert_eq!(transactions[0][2..], data[..]);
    }

    #[async_std::test]
    async fn registers_use_the_configured_byte_order() {
        let mut interface = I2cInterface::new(RecordingI2c::default(), 0x10)
            .with_byte_order(ByteOrder::BigEndian);

        <I2cInterface<_> as AsyncRegisterAccess<u16>>::write_raw(&mut interface, 0x02, 0x1234)
            .await
            .unwrap();

        assert_eq!(interface.into_inner().transactions, [vec![0x02, 0x12, 0x34]]);
    }
}
