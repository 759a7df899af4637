use embassy_time::Duration;
use embedded_io_async::Write;

use super::Pause;
use crate::sensor::{MotionSensor, SensorReading};
use crate::shutdown::StopFlag;

/// Counters kept by the poll loop, returned when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct PollStats {
    pub lines: u32,
    pub read_errors: u32,
    pub write_errors: u32,
}

/// Consecutive failed reads, for rate-limited logging.
#[derive(Debug, Default)]
struct ErrorStreak(u32);

impl ErrorStreak {
    /// Count a failure. True for the 1st, 101st, 201st... in a row.
    fn fail(&mut self) -> bool {
        self.0 = self.0.wrapping_add(1);
        self.0 % 100 == 1
    }

    /// End the streak, returning its length if there was one.
    fn recover(&mut self) -> Option<u32> {
        match core::mem::take(&mut self.0) {
            0 => None,
            n => Some(n),
        }
    }
}

/// Refresh `reading` in place. Each half is only overwritten on a
/// successful read, so a failed read leaves the previous values behind.
pub async fn sample<S: MotionSensor>(imu: &mut S, reading: &mut SensorReading) -> bool {
    let mut ok = true;

    match imu.gyro().await {
        Ok(gyro) => reading.gyro = gyro,
        Err(_) => ok = false,
    }
    match imu.accel().await {
        Ok(accel) => reading.accel = accel,
        Err(_) => ok = false,
    }

    ok
}

/// Read the IMU, print one line, sleep `period`; until `stop` is raised.
pub async fn run_poll_loop<S, W, T>(
    imu: &mut S,
    serial: &mut W,
    pause: &mut T,
    period: Duration,
    stop: &StopFlag,
) -> PollStats
where
    S: MotionSensor,
    W: Write,
    T: Pause,
{
    let mut reading = SensorReading::default();
    let mut stats = PollStats::default();
    let mut streak = ErrorStreak::default();

    while !stop.is_requested() {
        if sample(imu, &mut reading).await {
            if let Some(n) = streak.recover() {
                info!("IMU recovered after {} consecutive errors", n);
            }
        } else {
            stats.read_errors = stats.read_errors.wrapping_add(1);
            if streak.fail() {
                warn!(
                    "IMU read error #{}, reusing last sample",
                    stats.read_errors
                );
            }
        }

        let line = reading.to_line();
        match serial.write_all(line.as_bytes()).await {
            Ok(()) => stats.lines = stats.lines.wrapping_add(1),
            Err(_) => {
                stats.write_errors = stats.write_errors.wrapping_add(1);
                warn!("Serial write failed ({} so far)", stats.write_errors);
            }
        }

        pause.pause(period).await;
    }

    info!(
        "Poll loop stopping: {} lines, {} read errors, {} write errors",
        stats.lines,
        stats.read_errors,
        stats.write_errors
    );
    stats
}
