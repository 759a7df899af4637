//! MPU6886 six-axis IMU.
//!
//! Register decoding and the bring-up table are plain functions so they can
//! be checked on the host; the I²C driver itself is target-only.
use crate::sensor::Vector3;

pub const MPU6886_ADDRESS: u8 = 0x68;

pub const MPU6886_WHO_AM_I: u8 = 0x75;
const MPU6886_SMPLRT_DIV: u8 = 0x19;
const MPU6886_CONFIG: u8 = 0x1A;
const MPU6886_GYRO_CONFIG: u8 = 0x1B;
const MPU6886_ACCEL_CONFIG: u8 = 0x1C;
const MPU6886_ACCEL_CONFIG2: u8 = 0x1D;
const MPU6886_FIFO_EN: u8 = 0x23;
const MPU6886_INT_PIN_CFG: u8 = 0x37;
const MPU6886_INT_ENABLE: u8 = 0x38;
pub const MPU6886_ACCEL_XOUT_H: u8 = 0x3B;
pub const MPU6886_GYRO_XOUT_H: u8 = 0x43;
const MPU6886_USER_CTRL: u8 = 0x6A;
const MPU6886_PWR_MGMT_1: u8 = 0x6B;

// WHO_AM_I value
pub const MPU6886_ID: u8 = 0x19;

const FULL_SCALE_LSB: f32 = 32768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum AccelScale {
    G2 = 0,
    G4 = 1,
    G8 = 2,
    G16 = 3,
}

impl AccelScale {
    /// ACCEL_CONFIG register value (AFS_SEL in bits 4:3).
    pub const fn bits(self) -> u8 {
        (self as u8) << 3
    }

    /// g per LSB.
    pub fn resolution(self) -> f32 {
        let range = match self {
            AccelScale::G2 => 2.0,
            AccelScale::G4 => 4.0,
            AccelScale::G8 => 8.0,
            AccelScale::G16 => 16.0,
        };
        range / FULL_SCALE_LSB
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum GyroScale {
    Dps250 = 0,
    Dps500 = 1,
    Dps1000 = 2,
    Dps2000 = 3,
}

impl GyroScale {
    /// GYRO_CONFIG register value (FS_SEL in bits 4:3).
    pub const fn bits(self) -> u8 {
        (self as u8) << 3
    }

    /// °/s per LSB.
    pub fn resolution(self) -> f32 {
        let range = match self {
            GyroScale::Dps250 => 250.0,
            GyroScale::Dps500 => 500.0,
            GyroScale::Dps1000 => 1000.0,
            GyroScale::Dps2000 => 2000.0,
        };
        range / FULL_SCALE_LSB
    }
}

pub const DEFAULT_ACCEL_SCALE: AccelScale = AccelScale::G8;
pub const DEFAULT_GYRO_SCALE: GyroScale = GyroScale::Dps2000;

/// One step of the bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    pub reg: u8,
    pub value: u8,
    pub settle_ms: u64,
}

const fn step(reg: u8, value: u8, settle_ms: u64) -> RegWrite {
    RegWrite {
        reg,
        value,
        settle_ms,
    }
}

/// Wake, reset, select the PLL clock, set ranges and filters, then enable
/// the data-ready interrupt.
pub const fn init_sequence(accel: AccelScale, gyro: GyroScale) -> [RegWrite; 13] {
    [
        step(MPU6886_PWR_MGMT_1, 0x00, 10),
        step(MPU6886_PWR_MGMT_1, 0x80, 10), // device reset
        step(MPU6886_PWR_MGMT_1, 0x01, 10), // auto-select clock
        step(MPU6886_ACCEL_CONFIG, accel.bits(), 1),
        step(MPU6886_GYRO_CONFIG, gyro.bits(), 1),
        step(MPU6886_CONFIG, 0x01, 1), // DLPF 176 Hz
        step(MPU6886_SMPLRT_DIV, 0x05, 1),
        step(MPU6886_INT_ENABLE, 0x00, 1),
        step(MPU6886_ACCEL_CONFIG2, 0x00, 1),
        step(MPU6886_USER_CTRL, 0x00, 1),
        step(MPU6886_FIFO_EN, 0x00, 1),
        step(MPU6886_INT_PIN_CFG, 0x22, 1), // latch, clear on any read
        step(MPU6886_INT_ENABLE, 0x01, 100),
    ]
}

/// Three big-endian i16 samples (X, Y, Z) scaled by `lsb`.
pub fn decode_triple(raw: [u8; 6], lsb: f32) -> Vector3 {
    Vector3 {
        x: i16::from_be_bytes([raw[0], raw[1]]) as f32 * lsb,
        y: i16::from_be_bytes([raw[2], raw[3]]) as f32 * lsb,
        z: i16::from_be_bytes([raw[4], raw[5]]) as f32 * lsb,
    }
}

#[cfg(target_os = "none")]
pub use device::{create_default_imu, Mpu6886};

#[cfg(target_os = "none")]
mod device {
    use embassy_time::{Duration, Timer};

    use super::*;
    use crate::drivers::bus::{self, I2cBus};
    use crate::drivers::DriverError;
    use crate::sensor::MotionSensor;

    const INIT_ATTEMPTS: u32 = 5;

    pub struct Mpu6886 {
        i2c: I2cBus,
        addr: u8,
        accel_lsb: f32,
        gyro_lsb: f32,
    }

    impl Mpu6886 {
        pub async fn new(
            i2c: I2cBus,
            addr: u8,
            accel: AccelScale,
            gyro: GyroScale,
        ) -> Result<Self, DriverError> {
            let mut imu = Self {
                i2c,
                addr,
                accel_lsb: accel.resolution(),
                gyro_lsb: gyro.resolution(),
            };

            info!("Starting MPU6886 initialization sequence...");

            let mut last_error = DriverError::Bus(embassy_stm32::i2c::Error::Timeout);
            for attempt in 1..=INIT_ATTEMPTS {
                match imu.try_init(accel, gyro).await {
                    Ok(()) => {
                        info!("MPU6886 initialized on attempt {}", attempt);
                        return Ok(imu);
                    }
                    Err(e) => {
                        warn!("MPU6886 init attempt {} failed: {:?}", attempt, e);
                        last_error = e;
                        // 100ms, 200ms, 400ms, 800ms
                        let delay_ms = 100u64 << (attempt - 1);
                        Timer::after(Duration::from_millis(delay_ms)).await;
                    }
                }
            }

            error!("MPU6886 initialization failed after {} attempts", INIT_ATTEMPTS);
            Err(last_error)
        }

        async fn try_init(&mut self, accel: AccelScale, gyro: GyroScale) -> Result<(), DriverError> {
            let id = bus::read_reg_with_retries(&mut self.i2c, self.addr, MPU6886_WHO_AM_I, 5).await?;
            if id != MPU6886_ID {
                error!(
                    "Invalid MPU6886 ID: 0x{:02X}, expected 0x{:02X}",
                    id, MPU6886_ID
                );
                return Err(DriverError::BadChipId(id));
            }
            debug!("MPU6886 chip ID verified: 0x{:02X}", id);

            for w in init_sequence(accel, gyro) {
                bus::write_reg_with_retries(&mut self.i2c, self.addr, w.reg, w.value, 3).await?;
                if w.settle_ms > 0 {
                    Timer::after(Duration::from_millis(w.settle_ms)).await;
                }
            }
            Ok(())
        }
    }

    impl MotionSensor for Mpu6886 {
        type Error = DriverError;

        async fn gyro(&mut self) -> Result<Vector3, DriverError> {
            let raw = bus::read_regs::<6>(&mut self.i2c, self.addr, MPU6886_GYRO_XOUT_H).await?;
            Ok(decode_triple(raw, self.gyro_lsb))
        }

        async fn accel(&mut self) -> Result<Vector3, DriverError> {
            let raw = bus::read_regs::<6>(&mut self.i2c, self.addr, MPU6886_ACCEL_XOUT_H).await?;
            Ok(decode_triple(raw, self.accel_lsb))
        }
    }

    // Factory function for the on-board IMU at its default ranges
    pub async fn create_default_imu(i2c: I2cBus) -> Result<Mpu6886, DriverError> {
        Mpu6886::new(i2c, MPU6886_ADDRESS, DEFAULT_ACCEL_SCALE, DEFAULT_GYRO_SCALE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ranges_match_register_values() {
        assert_eq!(DEFAULT_ACCEL_SCALE.bits(), 0x10);
        assert_eq!(DEFAULT_GYRO_SCALE.bits(), 0x18);
    }

    #[test]
    fn decode_is_big_endian_and_signed() {
        let v = decode_triple([0x10, 0x00, 0xF0, 0x00, 0x00, 0x00], AccelScale::G8.resolution());
        assert_eq!(v, Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn gyro_full_scale() {
        let v = decode_triple([0x7F, 0xFF, 0x80, 0x00, 0x00, 0x01], GyroScale::Dps2000.resolution());
        assert!((v.x - 1999.939).abs() < 0.001);
        assert_eq!(v.y, -2000.0);
        assert!((v.z - 0.061).abs() < 0.001);
    }

    #[test]
    fn init_sequence_resets_then_configures() {
        let seq = init_sequence(AccelScale::G8, GyroScale::Dps2000);
        assert_eq!(seq[1], RegWrite { reg: 0x6B, value: 0x80, settle_ms: 10 });
        assert!(seq.contains(&RegWrite { reg: 0x1C, value: 0x10, settle_ms: 1 }));
        assert!(seq.contains(&RegWrite { reg: 0x1B, value: 0x18, settle_ms: 1 }));
        // Interrupt enable is the final write.
        assert_eq!(seq[seq.len() - 1].reg, 0x38);
        assert_eq!(seq[seq.len() - 1].value, 0x01);
    }
}
