pub mod imu;
pub mod power;

#[cfg(target_os = "none")]
pub mod bus;

pub use imu::{AccelScale, GyroScale};
pub use power::PowerConfig;

#[cfg(target_os = "none")]
pub use imu::{create_default_imu, Mpu6886};

#[cfg(target_os = "none")]
pub use error::DriverError;

#[cfg(target_os = "none")]
mod error {
    use embassy_stm32::i2c;

    #[derive(Debug, defmt::Format)]
    pub enum DriverError {
        Bus(i2c::Error),
        BadChipId(u8),
    }

    impl From<i2c::Error> for DriverError {
        fn from(e: i2c::Error) -> Self {
            Self::Bus(e)
        }
    }
}
