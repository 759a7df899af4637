// Centralize all configuration constants
use embassy_time::Duration;

use crate::sched::{CoreAffinity, CoreId, Priority, TaskConfig};

// ── Scheduler ─────────────────────────────────────────────
// Durations below are expressed in RTOS ticks; one tick is 1 ms.
pub const RTOS_TICK_HZ: u64 = 1_000;
pub const CORE_COUNT: u8 = 1;
// Application core: the second core on dual-core parts, otherwise the only one.
pub const APP_CPU: CoreId = if CORE_COUNT == 1 { CoreId(0) } else { CoreId(1) };
pub const MAIN_PRIORITY: Priority = Priority(1);

/// Convert a tick count to wall-clock time at [`RTOS_TICK_HZ`].
pub const fn ticks(n: u64) -> Duration {
    Duration::from_millis(n * 1000 / RTOS_TICK_HZ)
}

// ── LED toggle task ───────────────────────────────────────
pub const LED_HALF_PERIOD_MS: u64 = 500;

pub const BLINKY: TaskConfig = TaskConfig {
    name: "blinky",
    stack_size: 1024,
    priority: Priority(10),
    affinity: CoreAffinity::Pinned(APP_CPU),
};

// ── Sensor poll loop ──────────────────────────────────────
pub const POLL_DELAY_TICKS: u64 = 300;
pub const STARTUP_SETTLE_MS: u64 = 1_000;

// ── Buses ─────────────────────────────────────────────────
pub const UART_BAUDRATE: u32 = 115_200;
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

// ── Console ───────────────────────────────────────────────
pub const BANNER: &str = "---FreeRTOS Task Demo---";

/// Which on-board subsystems the init shim brings up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct BoardConfig {
    pub lcd_enable: bool,
    pub power_enable: bool,
    pub serial_enable: bool,
}

pub const BOARD: BoardConfig = BoardConfig {
    lcd_enable: false,
    power_enable: true,
    serial_enable: true,
};
