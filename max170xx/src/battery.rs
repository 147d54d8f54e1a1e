use enumset::{EnumSet, EnumSetType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerUnit {
    MilliWatt,
    MilliAmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Technology {
    Primary,
    Rechargeable,
}

#[derive(Debug, EnumSetType)]
pub enum BatteryStateFlag {
    Discharging,
    Charging,
    Critical,
}

/// All three flags together mean the battery is not present.
pub type BatteryState = EnumSet<BatteryStateFlag>;

/// Static battery information, as reported through ACPI `_BIF`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryInfo {
    pub units: PowerUnit,
    /// Design capacity
    pub design_capacity: u32,
    /// Last full charge capacity
    pub last_full_capacity: u32,
    pub technology: Technology,
    /// Design voltage in mV
    pub design_voltage: u32,
    pub warning_capacity: u32,
    pub low_capacity: u32,
    /// Granularity between low and warning capacity
    pub granularity_low: u32,
    /// Granularity between warning and full capacity
    pub granularity_full: u32,
    pub model: &'static str,
    pub serial: &'static str,
    pub kind: &'static str,
    pub oem_info: &'static str,
}

/// Dynamic battery status, as reported through ACPI `_BST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub state: BatteryState,
    /// Remaining capacity
    pub remaining_capacity: u32,
    /// Present voltage in mV
    pub voltage: u32,
    /// Present rate of charge or discharge
    pub rate: u32,
}

impl BatteryStatus {
    pub fn not_present() -> Self {
        Self {
            state: EnumSet::all(),
            remaining_capacity: 0,
            voltage: 0,
            rate: 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.state != EnumSet::all()
    }
}
