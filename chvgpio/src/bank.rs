use crate::Error;

/// Pins per group in the register layout. Groups may have fewer pins.
pub const PINS_PER_GROUP: i32 = 15;

const SOUTHWEST_GROUPS: [u8; 7] = [8, 8, 8, 8, 8, 8, 8];
const NORTH_GROUPS: [u8; 5] = [9, 13, 12, 12, 13];
const EAST_GROUPS: [u8; 2] = [12, 12];
const SOUTHEAST_GROUPS: [u8; 6] = [8, 12, 6, 8, 10, 11];

/// One of the four GPIO communities, selected by the ACPI `_UID`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    Southwest,
    North,
    East,
    Southeast,
}

impl Bank {
    pub const ALL: [Bank; 4] = [Bank::Southwest, Bank::North, Bank::East, Bank::Southeast];

    pub fn from_uid(uid: u64) -> Result<Self, Error> {
        match uid {
            1 => Ok(Bank::Southwest),
            2 => Ok(Bank::North),
            3 => Ok(Bank::East),
            4 => Ok(Bank::Southeast),
            _ => Err(Error::UnsupportedBank(uid)),
        }
    }

    pub fn uid(self) -> u64 {
        match self {
            Bank::Southwest => 1,
            Bank::North => 2,
            Bank::East => 3,
            Bank::Southeast => 4,
        }
    }

    /// Number of pins in each group, in register order.
    pub fn groups(self) -> &'static [u8] {
        match self {
            Bank::Southwest => &SOUTHWEST_GROUPS,
            Bank::North => &NORTH_GROUPS,
            Bank::East => &EAST_GROUPS,
            Bank::Southeast => &SOUTHEAST_GROUPS,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Bank::Southwest => "SW",
            Bank::North => "N",
            Bank::East => "E",
            Bank::Southeast => "SE",
        }
    }

    pub fn pin_count(self) -> u32 {
        self.groups().iter().map(|&size| size as u32).sum()
    }

    /// Highest valid pin number.
    pub fn pin_max(self) -> i32 {
        let groups = self.groups();
        let last = groups.len() as i32 - 1;
        last * PINS_PER_GROUP + groups[groups.len() - 1] as i32 - 1
    }

    pub fn validate_pin(self, pin: i32) -> bool {
        if pin < 0 {
            return false;
        }

        let group = (pin / PINS_PER_GROUP) as usize;
        let offset = (pin % PINS_PER_GROUP) as u8;

        self.groups()
            .get(group)
            .is_some_and(|&size| offset < size)
    }

    /// Iterates over every valid pin number.
    pub fn pins(self) -> impl Iterator<Item = i32> {
        self.groups()
            .iter()
            .enumerate()
            .flat_map(|(group, &size)| {
                (0..size as i32).map(move |offset| group as i32 * PINS_PER_GROUP + offset)
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uid_selects_bank() {
        for bank in Bank::ALL {
            assert_eq!(Bank::from_uid(bank.uid()), Ok(bank));
        }
        assert_eq!(Bank::from_uid(0), Err(Error::UnsupportedBank(0)));
        assert_eq!(Bank::from_uid(5), Err(Error::UnsupportedBank(5)));
    }

    #[test]
    fn pin_counts() {
        assert_eq!(Bank::Southwest.pin_count(), 56);
        assert_eq!(Bank::North.pin_count(), 59);
        assert_eq!(Bank::East.pin_count(), 24);
        assert_eq!(Bank::Southeast.pin_count(), 55);

        for bank in Bank::ALL {
            assert_eq!(bank.pins().count() as u32, bank.pin_count());
        }
    }

    #[test]
    fn validate_pin_matches_group_table() {
        for bank in Bank::ALL {
            let groups = bank.groups();
            for pin in -50..(groups.len() as i32 + 2) * PINS_PER_GROUP {
                let expected = pin >= 0
                    && ((pin / 15) as usize) < groups.len()
                    && ((pin % 15) as u8) < groups[(pin / 15) as usize];
                assert_eq!(bank.validate_pin(pin), expected, "{bank:?} pin {pin}");
            }

            assert!(!bank.validate_pin(i32::MIN));
            assert!(!bank.validate_pin(i32::MAX));
        }
    }

    #[test]
    fn gaps_between_groups_are_invalid() {
        // southwest groups hold 8 pins, so 8..15 are holes
        assert!(Bank::Southwest.validate_pin(7));
        assert!(!Bank::Southwest.validate_pin(8));
        assert!(!Bank::Southwest.validate_pin(14));
        assert!(Bank::Southwest.validate_pin(15));
    }

    #[test]
    fn pin_max_is_the_last_valid_pin() {
        assert_eq!(Bank::Southwest.pin_max(), 97);
        assert_eq!(Bank::North.pin_max(), 72);
        assert_eq!(Bank::East.pin_max(), 26);
        assert_eq!(Bank::Southeast.pin_max(), 85);

        for bank in Bank::ALL {
            assert!(bank.validate_pin(bank.pin_max()));
            assert!(!bank.validate_pin(bank.pin_max() + 1));
            assert_eq!(bank.pins().last(), Some(bank.pin_max()));
        }
    }
}
