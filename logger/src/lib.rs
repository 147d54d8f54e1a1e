#![no_std]

//! Logging front-end shared by the driver crates.
//!
//! The macros expand in the calling crate, so its own `log` and `defmt` features decide
//! where messages go. With neither feature enabled they expand to nothing. Format
//! strings should stick to `{}`, `{:?}` and `{:#x}`, which both back-ends accept.

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:ident, $($args:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::$level!($($args)*);
        #[cfg(feature = "log")]
        log::$level!($($args)*);
    };
}

#[macro_export]
macro_rules! trace {
    ($($args:tt)*) => {
        $crate::__log!(trace, $($args)*);
    };
}

#[macro_export]
macro_rules! debug {
    ($($args:tt)*) => {
        $crate::__log!(debug, $($args)*);
    };
}

#[macro_export]
macro_rules! info {
    ($($args:tt)*) => {
        $crate::__log!(info, $($args)*);
    };
}

#[macro_export]
macro_rules! warn {
    ($($args:tt)*) => {
        $crate::__log!(warn, $($args)*);
    };
}

#[macro_export]
macro_rules! error {
    ($($args:tt)*) => {
        $crate::__log!(error, $($args)*);
    };
}

/// Logs one register and its value at debug level.
#[macro_export]
macro_rules! dump_register {
    ($name:expr, $address:expr, $value:expr) => {
        $crate::debug!("{} ({:#x}) = {:#x}", $name, $address, $value);
    };
}
