use embassy_time::Duration;

pub mod blink;
pub mod poll;

pub use blink::{run_blinker, Blinker, LedPhase};
pub use poll::{run_poll_loop, sample, PollStats};

#[cfg(target_os = "none")]
pub use blink::blink_task;

/// Where a periodic loop suspends between iterations.
#[allow(async_fn_in_trait)]
pub trait Pause {
    async fn pause(&mut self, duration: Duration);
}

/// Suspends on the embassy timer queue, letting other tasks run.
#[cfg(target_os = "none")]
pub struct TimerPause;

#[cfg(target_os = "none")]
impl Pause for TimerPause {
    async fn pause(&mut self, duration: Duration) {
        embassy_time::Timer::after(duration).await;
    }
}

#[cfg(target_os = "none")]
pub use spawn::{spawn_pinned, Spawners};

#[cfg(target_os = "none")]
mod spawn {
    use embassy_executor::{SendSpawner, SpawnToken, Spawner};

    use crate::config::{CORE_COUNT, MAIN_PRIORITY};
    use crate::sched::{ExecutorLevel, SpawnError, TaskConfig, TaskHandle};

    /// One spawner per priority level.
    pub struct Spawners {
        pub thread: Spawner,
        pub preempting: SendSpawner,
    }

    /// Place `config` and spawn the task built by `task`.
    ///
    /// `task` is only called once the placement is valid; an unspawned
    /// `SpawnToken` must never be dropped.
    pub fn spawn_pinned<S: Send>(
        spawners: &Spawners,
        config: &TaskConfig,
        task: impl FnOnce() -> SpawnToken<S>,
    ) -> Result<TaskHandle, SpawnError> {
        let placement = config.placement(CORE_COUNT, MAIN_PRIORITY)?;

        let res = match placement.level {
            ExecutorLevel::Thread => spawners.thread.spawn(task()),
            ExecutorLevel::Preempting => spawners.preempting.spawn(task()),
        };
        res.map_err(|_| SpawnError::Busy)?;

        info!(
            "Spawned '{}' on core {} ({}), stack {} bytes",
            config.name,
            placement.core.0,
            placement.level,
            config.stack_size
        );
        Ok(TaskHandle::new(config, placement))
    }
}
