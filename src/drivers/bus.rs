//! Register access over the shared async I²C bus.
use embassy_stm32::i2c;
use embassy_stm32::mode::Async;
use embassy_time::{Duration, Timer};

pub type I2cBus = i2c::I2c<'static, Async>;

const RETRY_GAP: Duration = Duration::from_millis(10);

pub async fn write_reg(bus: &mut I2cBus, addr: u8, reg: u8, value: u8) -> Result<(), i2c::Error> {
    bus.write(addr, &[reg, value]).await
}

pub async fn read_reg(bus: &mut I2cBus, addr: u8, reg: u8) -> Result<u8, i2c::Error> {
    let mut buf = [0u8; 1];
    bus.write_read(addr, &[reg], &mut buf).await?;
    Ok(buf[0])
}

pub async fn read_regs<const N: usize>(
    bus: &mut I2cBus,
    addr: u8,
    reg: u8,
) -> Result<[u8; N], i2c::Error> {
    let mut buf = [0u8; N];
    bus.write_read(addr, &[reg], &mut buf).await?;
    Ok(buf)
}

pub async fn read_reg_with_retries(
    bus: &mut I2cBus,
    addr: u8,
    reg: u8,
    retries: u8,
) -> Result<u8, i2c::Error> {
    let mut last_error = i2c::Error::Timeout;

    for attempt in 1..=retries {
        match read_reg(bus, addr, reg).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_error = e;
                if attempt < retries {
                    Timer::after(RETRY_GAP).await;
                }
            }
        }
    }

    Err(last_error)
}

pub async fn write_reg_with_retries(
    bus: &mut I2cBus,
    addr: u8,
    reg: u8,
    value: u8,
    retries: u8,
) -> Result<(), i2c::Error> {
    let mut last_error = i2c::Error::Timeout;

    for attempt in 1..=retries {
        match write_reg(bus, addr, reg, value).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                last_error = e;
                if attempt < retries {
                    Timer::after(RETRY_GAP).await;
                }
            }
        }
    }

    Err(last_error)
}
