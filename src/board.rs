use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, Config as UsartConfig, UartTx};
use embassy_stm32::{bind_interrupts, i2c, peripherals, rcc, Config};

use crate::config::{BoardConfig, I2C_FREQUENCY_HZ, UART_BAUDRATE};
use crate::drivers::bus::I2cBus;
use crate::drivers::power::{init_pmic, PowerConfig};
use crate::drivers::{create_default_imu, DriverError, Mpu6886};

// ── IRQ table ─────────────────────────────────────────────
bind_interrupts!(pub struct Irqs {
    I2C2 => i2c::EventInterruptHandler<peripherals::I2C2>,
            i2c::ErrorInterruptHandler<peripherals::I2C2>;
});

#[derive(Debug, defmt::Format)]
pub enum InitError {
    Power(DriverError),
    Imu(DriverError),
}

/// Serial console; swallows output when the port is disabled.
pub enum Console {
    Uart(UartTx<'static, Async>),
    Disabled,
}

impl embedded_io_async::ErrorType for Console {
    type Error = usart::Error;
}

impl embedded_io_async::Write for Console {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, usart::Error> {
        match self {
            Console::Uart(tx) => {
                tx.write(buf).await?;
                Ok(buf.len())
            }
            Console::Disabled => Ok(buf.len()),
        }
    }
}

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    pub i2c: I2cBus, // PMIC + IMU, DMA
    pub console: Console,
    pub led: Output<'static>,
}

impl Board {
    pub fn init(cfg: &BoardConfig) -> Self {
        let mut config = Config::default();

        // HSI16 -> PLL -> 64MHz SYSCLK
        config.rcc.hsi = Some(rcc::Hsi {
            sys_div: rcc::HsiSysDiv::DIV1,
        });
        config.rcc.pll = Some(rcc::Pll {
            source: rcc::PllSource::HSI,
            prediv: rcc::PllPreDiv::DIV2,   // 16MHz / 2 = 8MHz
            mul: rcc::PllMul::MUL16,        // 8MHz * 16 = 128MHz
            divp: None,
            divq: None,
            divr: Some(rcc::PllRDiv::DIV2), // 128MHz / 2 = 64MHz
        });
        config.rcc.sys = rcc::Sysclk::PLL1_R;
        let p = embassy_stm32::init(config);

        // Indicator LED (LD4), driven only by the blink task
        let led = Output::new(p.PA5, Level::Low, Speed::Low);

        // USART2 TX on the probe's virtual COM port
        let console = if cfg.serial_enable {
            let mut us_cfg = UsartConfig::default();
            us_cfg.baudrate = UART_BAUDRATE;
            match UartTx::new(p.USART2, p.PA2, p.DMA1_CH1, us_cfg) {
                Ok(tx) => Console::Uart(tx),
                Err(e) => {
                    error!("Serial port config rejected: {:?}", e);
                    Console::Disabled
                }
            }
        } else {
            Console::Disabled
        };

        // I²C2  (DMA CH7 TX, CH6 RX)
        let mut i2c_cfg = i2c::Config::default();
        i2c_cfg.sda_pullup = false;
        i2c_cfg.scl_pullup = false;

        let i2c = i2c::I2c::new(
            p.I2C2,
            p.PB10,
            p.PB11,
            Irqs,
            p.DMA1_CH7,
            p.DMA1_CH6,
            Hertz(I2C_FREQUENCY_HZ),
            i2c_cfg,
        );

        Self { i2c, console, led }
    }
}

/// Power rails, then the IMU. The IMU keeps the bus afterwards.
///
/// A PMIC failure is logged and bring-up continues; an IMU failure is
/// returned.
pub async fn init_sensors(mut i2c: I2cBus, cfg: &BoardConfig) -> Result<Mpu6886, InitError> {
    if cfg.power_enable {
        if let Err(e) = init_pmic(&mut i2c, &PowerConfig::default()).await {
            warn!("Continuing without PMIC setup: {:?}", InitError::Power(e));
        }
    }

    if !cfg.lcd_enable {
        info!("Display panel left off");
    }

    create_default_imu(i2c).await.map_err(InitError::Imu)
}
