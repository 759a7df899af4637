//! AXP192 power-management IC: supply rails for the display, IMU and
//! charger set-up.
use heapless::Vec;

pub const AXP192_ADDRESS: u8 = 0x34;

const AXP192_POWER_OUTPUT_CTRL: u8 = 0x12;
const AXP192_LDO23_VOLTAGE: u8 = 0x28;
const AXP192_VBUS_IPSOUT: u8 = 0x30;
const AXP192_VOFF_VOLTAGE: u8 = 0x31;
const AXP192_CHARGE_CTRL1: u8 = 0x33;
const AXP192_BACKUP_CHG: u8 = 0x35;
const AXP192_PEK_PARAMS: u8 = 0x36;
const AXP192_BATT_DETECT: u8 = 0x32;
const AXP192_TEMP_PROTECT: u8 = 0x39;
const AXP192_ADC_ENABLE1: u8 = 0x82;
const AXP192_GPIO0_CTRL: u8 = 0x90;
const AXP192_GPIO0_LDO_VOLTAGE: u8 = 0x91;

// POWER_OUTPUT_CTRL bits
const DCDC1_EN: u8 = 1 << 0;
const DCDC3_EN: u8 = 1 << 1;
const LDO2_EN: u8 = 1 << 2;
const LDO3_EN: u8 = 1 << 3;

/// Rails and features to leave off. The default turns everything on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct PowerConfig {
    pub disable_ldo2: bool,  // display backlight
    pub disable_ldo3: bool,  // display logic
    pub disable_rtc: bool,   // RTC backup battery charge
    pub disable_dcdc1: bool, // MCU rail
    pub disable_dcdc3: bool,
    pub disable_ldo0: bool, // microphone, via GPIO0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum RegOp {
    Write { reg: u8, value: u8 },
    /// Read-modify-write: `(current & keep) | set`.
    Update { reg: u8, keep: u8, set: u8 },
}

impl RegOp {
    pub fn reg(&self) -> u8 {
        match *self {
            RegOp::Write { reg, .. } | RegOp::Update { reg, .. } => reg,
        }
    }

    /// Value to write given the register's `current` contents.
    pub fn apply(&self, current: u8) -> u8 {
        match *self {
            RegOp::Write { value, .. } => value,
            RegOp::Update { keep, set, .. } => (current & keep) | set,
        }
    }
}

pub const POWER_SEQUENCE_LEN: usize = 12;

pub fn power_on_sequence(cfg: &PowerConfig) -> Vec<RegOp, POWER_SEQUENCE_LEN> {
    let mut off = 0u8;
    if cfg.disable_ldo3 {
        off |= LDO3_EN;
    }
    if cfg.disable_ldo2 {
        off |= LDO2_EN;
    }
    if cfg.disable_dcdc3 {
        off |= DCDC3_EN;
    }
    if cfg.disable_dcdc1 {
        off |= DCDC1_EN;
    }

    let mut ops: Vec<RegOp, POWER_SEQUENCE_LEN> = Vec::new();
    let mut push = |op| {
        // Capacity covers the longest sequence.
        let _ = ops.push(op);
    };

    // LDO2 and LDO3 at 3.0 V
    push(RegOp::Write { reg: AXP192_LDO23_VOLTAGE, value: 0xCC });
    // All ADCs on
    push(RegOp::Write { reg: AXP192_ADC_ENABLE1, value: 0xFF });
    // Charge to 4.2 V at 100 mA
    push(RegOp::Write { reg: AXP192_CHARGE_CTRL1, value: 0xC0 });
    // Enable DCDC1, DCDC3, LDO2, LDO3 (bit 4, EXTEN, is cleared)
    push(RegOp::Update {
        reg: AXP192_POWER_OUTPUT_CTRL,
        keep: 0xEF & !off,
        set: 0x4D & !off,
    });
    // 128 ms power-on key, 4 s power-off key
    push(RegOp::Write { reg: AXP192_PEK_PARAMS, value: 0x0C });
    if cfg.disable_ldo0 {
        // GPIO0 floating
        push(RegOp::Write { reg: AXP192_GPIO0_CTRL, value: 0x07 });
    } else {
        // 2.8 V on GPIO0, then switch it to LDO mode
        push(RegOp::Write { reg: AXP192_GPIO0_LDO_VOLTAGE, value: 0xA0 });
        push(RegOp::Write { reg: AXP192_GPIO0_CTRL, value: 0x02 });
    }
    // No VBUS hold limit
    push(RegOp::Write { reg: AXP192_VBUS_IPSOUT, value: 0x80 });
    push(RegOp::Write { reg: AXP192_TEMP_PROTECT, value: 0xFC });
    // RTC backup battery charge
    push(RegOp::Write {
        reg: AXP192_BACKUP_CHG,
        value: if cfg.disable_rtc { 0xA2 & 0x7F } else { 0xA2 },
    });
    // Battery detection on
    push(RegOp::Write { reg: AXP192_BATT_DETECT, value: 0x46 });
    // Power off below 3.0 V
    push(RegOp::Update { reg: AXP192_VOFF_VOLTAGE, keep: 0xF8, set: 1 << 2 });

    ops
}

#[cfg(target_os = "none")]
pub use device::init_pmic;

#[cfg(target_os = "none")]
mod device {
    use super::*;
    use crate::drivers::bus::{self, I2cBus};
    use crate::drivers::DriverError;

    /// Run [`power_on_sequence`] against the PMIC.
    pub async fn init_pmic(i2c: &mut I2cBus, cfg: &PowerConfig) -> Result<(), DriverError> {
        info!("Configuring AXP192 power rails...");

        for op in power_on_sequence(cfg) {
            let current = match op {
                RegOp::Write { .. } => 0,
                RegOp::Update { reg, .. } => {
                    bus::read_reg_with_retries(i2c, AXP192_ADDRESS, reg, 3).await?
                }
            };
            let value = op.apply(current);
            debug!("AXP192 reg 0x{:02X} <- 0x{:02X}", op.reg(), value);
            bus::write_reg_with_retries(i2c, AXP192_ADDRESS, op.reg(), value, 3).await?;
        }

        info!("AXP192 power rails configured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(ops: &[RegOp], reg: u8) -> RegOp {
        *ops.iter().find(|op| op.reg() == reg).unwrap()
    }

    #[test]
    fn default_enables_all_rails() {
        let ops = power_on_sequence(&PowerConfig::default());
        let ctrl = find(&ops, AXP192_POWER_OUTPUT_CTRL);
        assert_eq!(ctrl.apply(0x00), 0x4D);
        // EXTEN cleared, unrelated bits preserved.
        assert_eq!(ctrl.apply(0xFF), 0xEF);
    }

    #[test]
    fn disabled_rails_are_cleared() {
        let cfg = PowerConfig {
            disable_ldo2: true,
            disable_dcdc3: true,
            ..Default::default()
        };
        let ops = power_on_sequence(&cfg);
        let ctrl = find(&ops, AXP192_POWER_OUTPUT_CTRL);
        assert_eq!(ctrl.apply(0xFF), 0xE9);
        assert_eq!(ctrl.apply(0x00), 0x49);
    }

    #[test]
    fn gpio0_ldo_follows_config() {
        let on = power_on_sequence(&PowerConfig::default());
        assert_eq!(find(&on, AXP192_GPIO0_CTRL), RegOp::Write { reg: AXP192_GPIO0_CTRL, value: 0x02 });
        assert!(on.iter().any(|op| op.reg() == AXP192_GPIO0_LDO_VOLTAGE));

        let off = power_on_sequence(&PowerConfig { disable_ldo0: true, ..Default::default() });
        assert_eq!(find(&off, AXP192_GPIO0_CTRL), RegOp::Write { reg: AXP192_GPIO0_CTRL, value: 0x07 });
        assert!(!off.iter().any(|op| op.reg() == AXP192_GPIO0_LDO_VOLTAGE));
    }

    #[test]
    fn rtc_charge_bit() {
        let on = power_on_sequence(&PowerConfig::default());
        let off = power_on_sequence(&PowerConfig { disable_rtc: true, ..Default::default() });
        assert_eq!(find(&on, AXP192_BACKUP_CHG).apply(0), 0xA2);
        assert_eq!(find(&off, AXP192_BACKUP_CHG).apply(0), 0x22);
    }

    #[test]
    fn power_off_voltage_keeps_upper_bits() {
        let ops = power_on_sequence(&PowerConfig::default());
        assert_eq!(find(&ops, AXP192_VOFF_VOLTAGE).apply(0xF3), 0xF4);
    }

    #[test]
    fn sequence_fits_capacity() {
        let ops = power_on_sequence(&PowerConfig::default());
        assert_eq!(ops.len(), POWER_SEQUENCE_LEN);
        assert_eq!(ops[0].reg(), AXP192_LDO23_VOLTAGE);
    }
}
