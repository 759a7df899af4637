use embassy_time::Duration;
use embedded_hal::digital::v2::OutputPin;

use super::Pause;
use crate::shutdown::StopFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum LedPhase {
    High,
    Low,
}

impl LedPhase {
    fn next(self) -> Self {
        match self {
            LedPhase::High => LedPhase::Low,
            LedPhase::Low => LedPhase::High,
        }
    }
}

/// Two-state toggler. Starts by driving the pin high; every phase is held
/// for the same half period, giving a 50 % duty cycle.
pub struct Blinker {
    phase: LedPhase,
    half_period: Duration,
}

impl Blinker {
    pub const fn new(half_period: Duration) -> Self {
        Self {
            phase: LedPhase::High,
            half_period,
        }
    }

    /// Phase to drive now and how long to hold it.
    pub fn step(&mut self) -> (LedPhase, Duration) {
        let phase = self.phase;
        self.phase = phase.next();
        (phase, self.half_period)
    }
}

/// Toggle `pin` until `stop` is raised. Returns the number of pin writes.
pub async fn run_blinker<P, T>(
    pin: &mut P,
    pause: &mut T,
    half_period: Duration,
    stop: &StopFlag,
) -> u32
where
    P: OutputPin,
    T: Pause,
{
    let mut blinker = Blinker::new(half_period);
    let mut writes = 0u32;

    while !stop.is_requested() {
        let (phase, hold) = blinker.step();
        let res = match phase {
            LedPhase::High => pin.set_high(),
            LedPhase::Low => pin.set_low(),
        };
        if res.is_err() {
            warn!("LED pin write failed");
        }
        writes = writes.wrapping_add(1);
        pause.pause(hold).await;
    }

    info!("LED task stopping after {} writes", writes);
    writes
}

#[cfg(target_os = "none")]
#[embassy_executor::task]
pub async fn blink_task(mut led: embassy_stm32::gpio::Output<'static>) {
    use crate::config::LED_HALF_PERIOD_MS;
    use crate::shutdown::STOP;

    info!("LED task started - {}ms per phase", LED_HALF_PERIOD_MS);
    run_blinker(
        &mut led,
        &mut super::TimerPause,
        Duration::from_millis(LED_HALF_PERIOD_MS),
        &STOP,
    )
    .await;
}
