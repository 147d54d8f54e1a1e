//! Conversions from raw gauge words to physical units.
//!
//! All conversions truncate at every step, in the order the gauge firmware expects.

/// Warning capacity, in percent of the last full capacity.
pub const WARNING_CAPACITY_PERCENT: u32 = 15;

/// Low capacity, in percent of the last full capacity.
pub const LOW_CAPACITY_PERCENT: u32 = 10;

/// Decodes a state-of-charge word. The high byte holds whole percents, the low byte
/// 1/256 percents.
///
/// ```rust
/// # use max170xx::codec::soc_percent;
/// assert_eq!(soc_percent(0x3200), 50);
/// assert_eq!(soc_percent(0x0190), 1);
/// assert_eq!(soc_percent(0x63FF), 99);
/// ```
pub fn soc_percent(raw: u16) -> u8 {
    let whole = (raw >> 8) as u32;
    let fraction = (raw & 0x00FF) as u32;

    (((whole * 100) + (fraction * 100 / 256)) / 100) as u8
}

/// Converts a cell voltage word to mV. The lowest 3 bits carry no information.
///
/// ```rust
/// # use max170xx::codec::cell_voltage_mv;
/// assert_eq!(cell_voltage_mv(0), 0);
/// assert_eq!(cell_voltage_mv(4096), 819);
/// assert_eq!(cell_voltage_mv(4103), 819);
/// ```
pub fn cell_voltage_mv(raw: u16) -> u32 {
    ((raw >> 3) as u32) * 1000 / 625
}

/// Converts an average current word to a rate in mA. The word is taken as an unsigned
/// magnitude.
///
/// A zero sense resistance is treated as 1 mΩ.
///
/// ```rust
/// # use max170xx::codec::current_ma;
/// assert_eq!(current_ma(0x0640, 10), 250);
/// assert_eq!(current_ma(0xFC18, 10), 10083);
/// assert_eq!(current_ma(0, 10), 0);
/// ```
pub fn current_ma(raw: u16, r_sense_mohm: u32) -> u32 {
    raw as u32 * 15625 / 10000 / r_sense_mohm.max(1)
}

/// Converts a capacity word (μVh) to mAh.
///
/// A zero sense resistance is treated as 1 mΩ.
///
/// ```rust
/// # use max170xx::codec::capacity_mah;
/// assert_eq!(capacity_mah(8000, 10), 4000);
/// assert_eq!(capacity_mah(0xFFFF, 10), 32767);
/// ```
pub fn capacity_mah(raw: u16, r_sense_mohm: u32) -> u32 {
    raw as u32 * 5 / r_sense_mohm.max(1)
}

/// ```rust
/// # use max170xx::codec::warning_capacity;
/// assert_eq!(warning_capacity(3840), 576);
/// ```
pub fn warning_capacity(last_full_capacity: u32) -> u32 {
    last_full_capacity * WARNING_CAPACITY_PERCENT / 100
}

/// ```rust
/// # use max170xx::codec::low_capacity;
/// assert_eq!(low_capacity(3840), 384);
/// ```
pub fn low_capacity(last_full_capacity: u32) -> u32 {
    last_full_capacity * LOW_CAPACITY_PERCENT / 100
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn soc_truncates_at_every_step() {
        // 1% + 144/256% rounds to 1.56%, but the fraction is dropped
        assert_eq!(soc_percent(0x0190), 1);
        for whole in 0..=100u16 {
            assert_eq!(soc_percent(whole << 8), whole as u8);
        }
    }

    #[test]
    fn near_full_charge_never_reports_more_than_the_whole_part() {
        assert_eq!(soc_percent(0x63FF), 99);
    }

    #[test]
    fn voltage_discards_the_low_bits() {
        for low in 0..8 {
            assert_eq!(cell_voltage_mv(4096 + low), 819);
        }
    }

    #[test]
    fn current_scales_with_sense_resistor() {
        assert_eq!(current_ma(6400, 10), 1000);
        assert_eq!(current_ma(6400, 20), 500);
    }

    #[test]
    fn current_word_is_not_sign_extended() {
        assert_eq!(current_ma(0xFC18, 10), 10083);
        assert_eq!(current_ma(0xFFFF, 1), 102398);
        assert_eq!(current_ma(0xFFFF, 0), 102398);
    }

    #[test]
    fn thresholds_are_fractions_of_last_full_capacity() {
        assert_eq!(warning_capacity(1000), 150);
        assert_eq!(low_capacity(1000), 100);
        assert_eq!(low_capacity(0), 0);
    }
}
