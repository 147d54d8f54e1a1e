#![cfg_attr(not(test), no_std)]

//! Goodix GT9xx capacitive touch controller.

#[macro_use]
extern crate logger;

use device_descriptor::Register;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use heapless::Vec;
use register_access::{AsyncRegisterAccess, ByteOrder, I2cInterface, PointerWidth};

pub mod ll;

pub use ll::CommandCode;

pub const DEFAULT_ADDRESS: u8 = 0x5D;

/// ACPI hardware IDs served by this driver.
pub const HIDS: [&str; 1] = ["GDIX1001"];

pub const MAX_POINTS: usize = 10;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Transport(E),
    DeviceNotResponding(E),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub track_id: u8,
    pub x: u16,
    pub y: u16,
    pub size: u16,
}

impl TouchPoint {
    fn parse(bytes: &[u8]) -> Self {
        Self {
            track_id: bytes[0],
            x: u16::from_le_bytes([bytes[1], bytes[2]]),
            y: u16::from_le_bytes([bytes[3], bytes[4]]),
            size: u16::from_le_bytes([bytes[5], bytes[6]]),
        }
    }
}

/// Single pointer state, as reported to input consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerState {
    pub pen_down: bool,
    /// Last reported position, -1 before the first touch
    pub x: i32,
    pub y: i32,
}

impl PointerState {
    pub const RELEASED: Self = Self {
        pen_down: false,
        x: -1,
        y: -1,
    };
}

pub struct Gt9xx<I> {
    interface: I2cInterface<I>,
    product_id: [u8; 4],
    pointer: PointerState,
}

impl<I> Gt9xx<I>
where
    I: AsyncI2c,
{
    /// Reads the product ID to confirm the controller responds.
    pub async fn attach(i2c: I, address: u8) -> Result<Self, Error<I::Error>> {
        let mut interface = I2cInterface::new(i2c, address)
            .with_pointer_width(PointerWidth::TwoBytes)
            .with_byte_order(ByteOrder::LittleEndian);

        let mut product_id = [0; 4];
        interface
            .read_bytes(ll::PRODUCT_ID, &mut product_id)
            .await
            .map_err(Error::DeviceNotResponding)?;

        let this = Self {
            interface,
            product_id,
            pointer: PointerState::RELEASED,
        };

        info!(
            "Goodix touch screen at {:#x}, id {}",
            address,
            this.product_id_str()
        );

        Ok(this)
    }

    /// Product ID read at attach time, like `911`. Non-ASCII IDs read as `?`.
    pub fn product_id_str(&self) -> &str {
        let len = self
            .product_id
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.product_id.len());
        core::str::from_utf8(&self.product_id[..len]).unwrap_or("?")
    }

    pub async fn firmware_version(&mut self) -> Result<u16, Error<I::Error>> {
        <I2cInterface<I> as AsyncRegisterAccess<u16>>::read_raw(
            &mut self.interface,
            ll::FIRMWARE_VERSION,
        )
        .await
        .map_err(Error::Transport)
    }

    /// Configured output range as `(x, y)`.
    pub async fn resolution(&mut self) -> Result<(u16, u16), Error<I::Error>> {
        let mut buffer = [0; 4];
        self.interface
            .read_bytes(ll::RESOLUTION, &mut buffer)
            .await
            .map_err(Error::Transport)?;

        Ok((
            u16::from_le_bytes([buffer[0], buffer[1]]),
            u16::from_le_bytes([buffer[2], buffer[3]]),
        ))
    }

    pub async fn send_command(&mut self, command: CommandCode) -> Result<(), Error<I::Error>> {
        let reg = ll::Command::new(|w| w.command().write(command));
        <I2cInterface<I> as AsyncRegisterAccess<u8>>::write_register(&mut self.interface, reg)
            .await
            .map_err(Error::Transport)
    }

    /// Reads the touch points of a ready frame and hands the buffer back to the
    /// controller. Returns `None` if no frame is ready.
    pub async fn read_touch(
        &mut self,
    ) -> Result<Option<Vec<TouchPoint, MAX_POINTS>>, Error<I::Error>> {
        let status = <I2cInterface<I> as AsyncRegisterAccess<u8>>::read_register::<
            ll::TouchStatus,
        >(&mut self.interface)
        .await
        .map_err(Error::Transport)?;

        if !status.buffer_ready().is_set() {
            return Ok(None);
        }

        let count = (status.point_count().read_field_bits() as usize).min(MAX_POINTS);
        if count != status.point_count().read_field_bits() as usize {
            warn!("Touch frame reports {} points", status.point_count().read_field_bits());
        }

        let mut buffer = [0; MAX_POINTS * ll::POINT_SIZE];
        let buffer = &mut buffer[..count * ll::POINT_SIZE];
        if count > 0 {
            self.interface
                .read_bytes(ll::FIRST_POINT, buffer)
                .await
                .map_err(Error::Transport)?;
        }

        let mut points = Vec::new();
        for bytes in buffer.chunks_exact(ll::POINT_SIZE) {
            // count is clamped to the capacity
            _ = points.push(TouchPoint::parse(bytes));
        }

        <I2cInterface<I> as AsyncRegisterAccess<u8>>::write_register(
            &mut self.interface,
            ll::TouchStatus::default(),
        )
        .await
        .map_err(Error::Transport)?;

        trace!("Touch frame with {} points", points.len());

        Ok(Some(points))
    }

    /// Reads a frame and folds it into the pointer state. The first contact drives the
    /// pointer, the last position is kept after release.
    pub async fn poll(&mut self) -> Result<PointerState, Error<I::Error>> {
        if let Some(points) = self.read_touch().await? {
            match points.first() {
                Some(point) => {
                    self.pointer = PointerState {
                        pen_down: true,
                        x: point.x as i32,
                        y: point.y as i32,
                    };
                }
                None => self.pointer.pen_down = false,
            }
        }

        Ok(self.pointer)
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn release(self) -> I {
        self.interface.into_inner()
    }
}
