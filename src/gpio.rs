//! ACPI attachment of the GPIO communities.

use chvgpio::{Bank, ChvGpio};
use register_access::RegisterWindow;

use crate::{
    acpi::{AcpiNamespace, Resource},
    Error,
};

pub const HID: &str = "INT33FF";

/// What a community's ACPI node describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioResources {
    pub uid: u64,
    pub base: u32,
    pub length: u32,
    pub interrupt: Option<u32>,
}

/// Reads `_UID` and the first memory and interrupt resources of a community.
pub fn read_resources<N: AcpiNamespace>(
    acpi: &N,
    handle: N::Handle,
) -> Result<GpioResources, Error> {
    let uid = acpi.get_integer(handle, "_UID").map_err(|error| {
        warn!("Failed to read _UID");
        Error::Acpi(error)
    })?;

    let mut memory = None;
    let mut interrupt = None;
    acpi.walk_resources(handle, "_CRS", &mut |resource| match *resource {
        Resource::FixedMemory32 { address, length } if memory.is_none() => {
            memory = Some((address, length));
        }
        Resource::ExtendedIrq { interrupt: irq } if interrupt.is_none() => {
            interrupt = Some(irq);
        }
        _ => {}
    })?;

    let (base, length) = memory.ok_or(Error::MissingResource)?;

    Ok(GpioResources {
        uid,
        base,
        length,
        interrupt,
    })
}

/// Checks the community is supported and its memory resource covers every register
/// before `map` is asked for the register window.
pub fn attach<N, W>(
    acpi: &N,
    handle: N::Handle,
    map: impl FnOnce(u32, u32) -> W,
) -> Result<(ChvGpio<W>, GpioResources), Error>
where
    N: AcpiNamespace,
    W: RegisterWindow,
{
    let resources = read_resources(acpi, handle)?;
    debug!("GPIO _UID {}", resources.uid);

    let bank = Bank::from_uid(resources.uid)?;

    let required = chvgpio::window_len(bank);
    if (resources.length as usize) < required {
        warn!(
            "GPIO window is {:#x} bytes, {:?} needs {:#x}",
            resources.length, bank, required
        );
        return Err(Error::InvalidResource);
    }

    let window = map(resources.base, resources.length);
    let gpio = ChvGpio::new(window, resources.uid)?;

    Ok((gpio, resources))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        acpi::{mock::MockAcpi, AcpiError},
        roles::GpioController,
    };
    use std::{cell::RefCell, collections::HashMap};

    #[derive(Default)]
    struct MockWindow {
        registers: RefCell<HashMap<usize, u32>>,
    }

    impl RegisterWindow for MockWindow {
        fn read32(&self, offset: usize) -> u32 {
            self.registers.borrow().get(&offset).copied().unwrap_or(0)
        }

        fn write32(&self, offset: usize, value: u32) {
            self.registers.borrow_mut().insert(offset, value);
        }
    }

    fn community(uid: u64) -> MockAcpi {
        community_with_length(uid, 0x8000)
    }

    fn community_with_length(uid: u64, length: u32) -> MockAcpi {
        let mut acpi = MockAcpi::with_resources(&[
            Resource::FixedMemory32 {
                address: 0xFED8_0000,
                length,
            },
            Resource::ExtendedIrq { interrupt: 91 },
            Resource::ExtendedIrq { interrupt: 92 },
        ]);
        acpi.uid = Ok(uid);
        acpi
    }

    #[test]
    fn reads_community_resources() {
        assert_eq!(
            read_resources(&community(2), ()),
            Ok(GpioResources {
                uid: 2,
                base: 0xFED8_0000,
                length: 0x8000,
                interrupt: Some(91),
            })
        );
    }

    #[test]
    fn attach_maps_the_window_and_selects_the_bank() {
        let mut mapped = None;
        let (gpio, _) = attach(&community(2), (), |base, length| {
            mapped = Some((base, length));
            MockWindow::default()
        })
        .expect("Failed to attach");

        assert_eq!(mapped, Some((0xFED8_0000, 0x8000)));
        assert_eq!(gpio.bank(), Bank::North);
        assert_eq!(GpioController::pin_max(&gpio), 72);
        assert_eq!(GpioController::pin_name(&gpio, 72).unwrap(), "N72");

        gpio.pin_set(16, true).unwrap();
        let window = gpio.detach();
        assert_eq!(window.read32(0x4808), 0x2);
    }

    #[test]
    fn unsupported_community_is_never_mapped() {
        let result = attach(&community(7), (), |_, _| -> MockWindow {
            panic!("Mapped an unsupported community")
        });

        assert!(matches!(
            result,
            Err(Error::Gpio(chvgpio::Error::UnsupportedBank(7)))
        ));
    }

    #[test]
    fn short_window_is_rejected_before_mapping() {
        let result = attach(&community_with_length(2, 0x100), (), |_, _| -> MockWindow {
            panic!("Mapped a window that is too short")
        });
        assert!(matches!(result, Err(Error::InvalidResource)));

        // One word short of the last North pad
        let result = attach(&community_with_length(2, 0x5464), (), |_, _| -> MockWindow {
            panic!("Mapped a window that is too short")
        });
        assert!(matches!(result, Err(Error::InvalidResource)));

        let (gpio, resources) =
            attach(&community_with_length(2, 0x5468), (), |_, _| MockWindow::default())
                .expect("Failed to attach");
        assert_eq!(resources.length, 0x5468);
        gpio.pin_set(72, true).unwrap();
        assert_eq!(gpio.detach().read32(0x5460), 0x2);
    }

    #[test]
    fn missing_uid_fails() {
        let mut acpi = community(1);
        acpi.uid = Err(AcpiError::NotFound);

        assert_eq!(
            read_resources(&acpi, ()),
            Err(Error::Acpi(AcpiError::NotFound))
        );
    }

    #[test]
    fn missing_memory_fails() {
        let mut acpi = MockAcpi::with_resources(&[Resource::ExtendedIrq { interrupt: 91 }]);
        acpi.uid = Ok(1);

        assert_eq!(read_resources(&acpi, ()), Err(Error::MissingResource));
    }

    #[test]
    fn invalid_pins_are_rejected_through_the_role() {
        let (gpio, _) = attach(&community(3), (), |_, _| MockWindow::default()).unwrap();

        assert_eq!(
            gpio.pin_toggle(12),
            Err(chvgpio::Error::InvalidPin(12))
        );
        assert_eq!(gpio.pin_get(-1), Err(chvgpio::Error::InvalidPin(-1)));
    }
}
