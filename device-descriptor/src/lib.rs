#![no_std]

//! Register and bit-field descriptions.
//!
//! Chip crates describe their register map with [`device!`]. Every register becomes a
//! small `Copy` value type with one accessor per field; registers declared with a
//! `default` value also get a writer proxy so they can be built and modified field by
//! field before being written back.
//!
//! Enumerated fields generate an enum that converts to and from the register width.
//! The generated enums carry `#[cfg_attr(feature = "defmt", derive(defmt::Format))]`,
//! which is evaluated in the crate invoking the macro.

use core::{convert::TryFrom, marker::PhantomData};

pub trait RegisterWidthType: Copy {
    const WIDTH: u8;

    fn from_32(data: u32) -> Self;
    fn to_32(self) -> u32;
}

impl RegisterWidthType for u8 {
    const WIDTH: u8 = 8;

    fn from_32(data: u32) -> Self {
        debug_assert!(data <= u8::MAX as u32);
        data as u8
    }

    fn to_32(self) -> u32 {
        self as u32
    }
}

impl RegisterWidthType for u16 {
    const WIDTH: u8 = 16;

    fn from_32(data: u32) -> Self {
        debug_assert!(data <= u16::MAX as u32);
        data as u16
    }

    fn to_32(self) -> u32 {
        self as u32
    }
}

impl RegisterWidthType for u32 {
    const WIDTH: u8 = 32;

    fn from_32(data: u32) -> Self {
        data
    }

    fn to_32(self) -> u32 {
        self
    }
}

/// Mask covering the lowest `width` bits.
#[inline(always)]
pub const fn mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

pub trait ReadOnlyRegister<RWT: RegisterWidthType>: Proxy<RWT> + Copy {
    /// Register address. Byte-pointer devices only use the low 8 bits.
    const ADDRESS: u16;
    const NAME: &'static str;
}

pub trait Register<RWT: RegisterWidthType>: ReadOnlyRegister<RWT> {
    type Writer: WriterProxy<RWT>;

    const DEFAULT_VALUE: RWT;

    fn new(f: impl Fn(Self::Writer) -> Self::Writer) -> Self;
    fn modify(self, f: impl Fn(Self::Writer) -> Self::Writer) -> Self;
}

pub trait Proxy<RWT: RegisterWidthType> {
    fn bits(&self) -> RWT;
    fn from_bits(bits: RWT) -> Self;
}

pub trait WriterProxy<RWT: RegisterWidthType>: Proxy<RWT> {
    fn write_bits(self, bits: RWT) -> Self;
    fn reset(self) -> Self;
}

pub struct Field<const POS: u8, const WIDTH: u8, DataType, Writer, RWT> {
    _marker: PhantomData<(DataType, RWT)>,
    reg: Writer,
}

impl<const POS: u8, const WIDTH: u8, DataType, P, RWT> Field<POS, WIDTH, DataType, P, RWT>
where
    DataType: TryFrom<RWT> + Into<RWT>,
    P: Proxy<RWT>,
    RWT: RegisterWidthType,
{
    const _CONST_CHECK: () = assert!(POS + WIDTH <= RWT::WIDTH);

    pub const fn new(reg: P) -> Self {
        Field {
            _marker: PhantomData,
            reg,
        }
    }

    #[inline(always)]
    pub fn read_field_bits(&self) -> RWT {
        RWT::from_32((self.reg.bits().to_32() >> POS as u32) & mask(WIDTH))
    }

    /// Decodes the field. `None` means the bits hold a value the field type does not name.
    #[inline(always)]
    pub fn read(&self) -> Option<DataType> {
        DataType::try_from(self.read_field_bits()).ok()
    }

    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.read_field_bits().to_32() != 0
    }
}

impl<const POS: u8, const WIDTH: u8, DataType, P, RWT> Field<POS, WIDTH, DataType, P, RWT>
where
    DataType: TryFrom<RWT> + Into<RWT>,
    P: WriterProxy<RWT>,
    RWT: RegisterWidthType,
{
    #[inline(always)]
    fn write_field(data: RWT, value: RWT) -> RWT {
        // make sure value fits into field
        debug_assert!(value.to_32() <= mask(WIDTH));

        let shifted_mask = mask(WIDTH) << POS;
        let masked_field = data.to_32() & !shifted_mask;

        RWT::from_32(masked_field | ((value.to_32() & mask(WIDTH)) << POS as u32))
    }

    #[inline(always)]
    pub fn write(self, value: DataType) -> P {
        let bits = self.reg.bits();

        self.reg.write_bits(Self::write_field(bits, value.into()))
    }
}

#[macro_export]
macro_rules! impl_fields {
    () => {};

    ($($(#[$fmeta:meta])* $field:ident($rwt:ty, pos = $pos:literal, width = $width:literal): $type:ty),*) => {
        $(
            $(#[$fmeta])*
            #[inline(always)]
            #[allow(non_snake_case)]
            pub fn $field(self) -> $crate::Field<$pos, $width, $type, Self, $rwt> {
                $crate::Field::new(self)
            }
        )*
    };
}

#[macro_export]
macro_rules! register {
    ($(#[$meta:meta])* $reg:ident ($rwt:ty, addr = $addr:literal) {
        $( $(#[$fmeta:meta])* $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {
        impl $crate::ReadOnlyRegister<$rwt> for $reg {
            const ADDRESS: u16 = $addr;
            const NAME: &'static str = stringify!($reg);
        }

        impl $crate::Proxy<$rwt> for $reg {
            #[inline(always)]
            fn from_bits(bits: $rwt) -> Self {
                Self { value: bits }
            }

            #[inline(always)]
            fn bits(&self) -> $rwt {
                self.value
            }
        }

        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        #[must_use]
        #[allow(non_camel_case_types)]
        pub struct $reg {
            value: $rwt
        }

        impl $reg {
            $crate::impl_fields! { $($(#[$fmeta])* $field($rwt, pos = $pos, width = $width): $type),* }
        }
    };

    ($(#[$meta:meta])* $reg:ident ($rwt:ty, addr = $addr:literal, default = $default:literal) {
        $( $(#[$fmeta:meta])* $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {

        $crate::register!($(#[$meta])* $reg($rwt, addr = $addr) {
            $( $(#[$fmeta])* $field(pos = $pos, width = $width): $type ),*
        });

        impl Default for $reg {
            #[inline(always)]
            fn default() -> Self {
                Self { value: $default }
            }
        }

        impl $crate::Register<$rwt> for $reg {
            type Writer = writer_proxies::$reg;

            const DEFAULT_VALUE: $rwt = $default;

            #[inline(always)]
            fn new(f: impl Fn(Self::Writer) -> Self::Writer) -> Self {
                let writer = f(<Self::Writer as $crate::Proxy<$rwt>>::from_bits($default));
                Self { value: $crate::Proxy::<$rwt>::bits(&writer) }
            }

            #[inline(always)]
            fn modify(self, f: impl Fn(Self::Writer) -> Self::Writer) -> Self {
                let writer = f(<Self::Writer as $crate::Proxy<$rwt>>::from_bits(self.value));
                Self { value: $crate::Proxy::<$rwt>::bits(&writer) }
            }
        }

        impl writer_proxies::$reg {
            $crate::impl_fields! { $($field($rwt, pos = $pos, width = $width): $type),* }
        }
    };
}

/// Generates the enum of an enumerated field, converting to and from the register width.
#[macro_export]
macro_rules! field_enum {
    ($rwt:ty, $type:ident { $( $(#[$vmeta:meta])* $name:ident = $value:expr ),+ }) => {
        #[derive(Debug, PartialEq, Eq, Copy, Clone)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $type {
            $( $(#[$vmeta])* $name = $value ),+
        }

        impl core::convert::TryFrom<$rwt> for $type {
            type Error = $rwt;

            fn try_from(data: $rwt) -> Result<Self, Self::Error> {
                match data {
                    $(x if x == $value => Ok($type::$name)),+,
                    _ => Err(data)
                }
            }
        }

        impl From<$type> for $rwt {
            fn from(data: $type) -> $rwt {
                data as $rwt
            }
        }
    };
}

#[macro_export]
macro_rules! writer_proxy {
    ($reg:ident ($rwt:ty, addr = $addr:literal) {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {};

    ($reg:ident ($rwt:ty, addr = $addr:literal, default = $default:literal) {
        $( $field:ident(pos = $pos:literal, width = $width:literal): $type:ty ),*
    } ) => {
        #[allow(non_camel_case_types)]
        pub struct $reg {
            bits: $rwt
        }

        impl $crate::Proxy<$rwt> for $reg {
            #[inline(always)]
            fn from_bits(bits: $rwt) -> Self {
                Self {
                    bits
                }
            }

            #[inline(always)]
            fn bits(&self) -> $rwt {
                self.bits
            }
        }

        impl $crate::WriterProxy<$rwt> for $reg {
            #[inline(always)]
            fn write_bits(self, bits: $rwt) -> Self {
                Self { bits }
            }

            #[inline(always)]
            fn reset(self) -> Self {
                self.write_bits($default)
            }
        }
    };
}

/// Describes a register map.
///
/// ```ignore
/// device! {
///     /// Status register
///     Status(u8, addr = 0x08) {
///         vbus(pos = 6, width = 2): VbusStatus { Unknown = 0, Host = 1 },
///         power_good(pos = 2, width = 1): u8
///     }
///     Control(u8, addr = 0x00, default = 0x30) {
///         limit(pos = 0, width = 3): u8
///     }
/// }
/// ```
///
/// A field type followed by a `{ Name = value, .. }` block declares a new enum.
/// Naming an already declared enum reuses it, so it must belong to a register of the
/// same width.
#[macro_export]
macro_rules! device {
    (
        $(
            $(#[$meta:meta])*
            $reg:ident($rwt:ty, $($proto:tt)*) {
                $( $(#[$fmeta:meta])* $field:ident(pos = $pos:literal, width = $width:literal): $type:ident $({
                    $( $(#[$vmeta:meta])* $name:ident = $value:expr ),+
                })? ),* $(,)?
            }
        )+
    ) => {
        mod writer_proxies {
            #[allow(unused_imports)]
            use $crate::*;

            $(
                $crate::writer_proxy!($reg($rwt, $($proto)*) { $( $field(pos = $pos, width = $width): $type ),* } );
            )+
        }

        $( $( $(
            $crate::field_enum!($rwt, $type { $( $(#[$vmeta])* $name = $value ),+ });
        )? )* )+

        $(
            $crate::register!($(#[$meta])* $reg($rwt, $($proto)*) {
                $( $(#[$fmeta])* $field(pos = $pos, width = $width): $type ),*
            });
        )+
    };
}
