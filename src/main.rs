// Firmware entry point. Everything here is target-only; on the host the
// binary is empty and `cargo test` exercises the library.
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![cfg_attr(not(target_os = "none"), allow(unused))]

#[cfg(target_os = "none")]
use defmt::*;
#[cfg(target_os = "none")]
use embassy_executor::{InterruptExecutor, Spawner};
#[cfg(target_os = "none")]
use embassy_stm32::interrupt;
#[cfg(target_os = "none")]
use embassy_stm32::interrupt::{InterruptExt, Priority as IrqPriority};
#[cfg(target_os = "none")]
use embassy_time::{Duration, Timer};
#[cfg(target_os = "none")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(target_os = "none")]
use imu_blinky::{
    board::init_sensors,
    config::{ticks, BLINKY, BOARD, MAIN_PRIORITY, POLL_DELAY_TICKS, STARTUP_SETTLE_MS},
    console::write_banner,
    sched::current_core,
    shutdown::STOP,
    tasks::{blink_task, run_poll_loop, spawn_pinned, Spawners, TimerPause},
    Board,
};

// Preempting executor for tasks ranked above the main loop
#[cfg(target_os = "none")]
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[cfg(target_os = "none")]
#[interrupt]
unsafe fn USART3_4_LPUART1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[cfg(target_os = "none")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting imu-blinky");
    let board = Board::init(&BOARD);
    let mut console = board.console;

    let imu = init_sensors(board.i2c, &BOARD).await;

    Timer::after(Duration::from_millis(STARTUP_SETTLE_MS)).await;

    if let Err(e) = write_banner(&mut console, current_core(), MAIN_PRIORITY).await {
        warn!("Banner write failed: {:?}", e);
    }

    interrupt::USART3_4_LPUART1.set_priority(IrqPriority::P3);
    let spawners = Spawners {
        thread: spawner,
        preempting: EXECUTOR_HIGH.start(interrupt::USART3_4_LPUART1),
    };

    let led = board.led;
    match spawn_pinned(&spawners, &BLINKY, move || blink_task(led)) {
        Ok(handle) => info!(
            "LED task '{}' running on core {}",
            handle.name(),
            handle.core().0
        ),
        Err(e) => error!("LED task spawn failed: {:?}", e),
    }

    match imu {
        Ok(mut imu) => {
            info!("Polling IMU every {} ticks", POLL_DELAY_TICKS);
            run_poll_loop(
                &mut imu,
                &mut console,
                &mut TimerPause,
                ticks(POLL_DELAY_TICKS),
                &STOP,
            )
            .await;
        }
        // No sensor lines without an IMU; the LED task keeps running.
        Err(e) => error!("IMU initialization failed: {:?}", e),
    }

    core::future::pending::<()>().await;
}

#[cfg(not(target_os = "none"))]
fn main() {}
