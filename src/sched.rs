//! Task placement: how a [`TaskConfig`] maps onto the runtime.
//!
//! Embassy has no per-task priorities or stacks. A task whose priority is
//! above the main loop's is run on the preempting interrupt executor, the
//! rest share the thread-mode executor with `main`. Task state lives in a
//! statically sized arena, so `stack_size` is validated and reported but
//! never allocated.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct CoreId(pub u8);

/// Larger is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Priority(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum CoreAffinity {
    NoAffinity,
    Pinned(CoreId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct TaskConfig {
    pub name: &'static str,
    pub stack_size: usize,
    pub priority: Priority,
    pub affinity: CoreAffinity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ExecutorLevel {
    /// Cooperative, shared with the main loop.
    Thread,
    /// Interrupt-driven; preempts thread mode.
    Preempting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Placement {
    pub core: CoreId,
    pub level: ExecutorLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum SpawnError {
    NoSuchCore(CoreId),
    ZeroStack,
    /// The runtime's task arena for this task is already in use.
    Busy,
}

impl TaskConfig {
    /// Decide where the task runs on a part with `core_count` cores, given
    /// the priority the main loop runs at.
    pub fn placement(&self, core_count: u8, main: Priority) -> Result<Placement, SpawnError> {
        if self.stack_size == 0 {
            return Err(SpawnError::ZeroStack);
        }

        let core = match self.affinity {
            CoreAffinity::Pinned(core) if core.0 >= core_count => {
                return Err(SpawnError::NoSuchCore(core));
            }
            CoreAffinity::Pinned(core) => core,
            // Unpinned tasks start on the boot core.
            CoreAffinity::NoAffinity => CoreId(0),
        };

        let level = if self.priority > main {
            ExecutorLevel::Preempting
        } else {
            ExecutorLevel::Thread
        };

        Ok(Placement { core, level })
    }
}

/// Record of a spawned task. Never joined; lives as long as the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct TaskHandle {
    name: &'static str,
    priority: Priority,
    placement: Placement,
}

impl TaskHandle {
    pub fn new(config: &TaskConfig, placement: Placement) -> Self {
        Self {
            name: config.name,
            priority: config.priority,
            placement,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn core(&self) -> CoreId {
        self.placement.core
    }

    pub fn level(&self) -> ExecutorLevel {
        self.placement.level
    }
}

/// Core the caller is executing on. Cortex-M0+ parts have exactly one.
pub fn current_core() -> CoreId {
    CoreId(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: Priority = Priority(1);

    fn task(priority: u8, affinity: CoreAffinity) -> TaskConfig {
        TaskConfig {
            name: "t",
            stack_size: 1024,
            priority: Priority(priority),
            affinity,
        }
    }

    #[test]
    fn higher_priority_preempts() {
        let p = task(10, CoreAffinity::Pinned(CoreId(0)))
            .placement(1, MAIN)
            .unwrap();
        assert_eq!(p.level, ExecutorLevel::Preempting);
        assert_eq!(p.core, CoreId(0));
    }

    #[test]
    fn equal_or_lower_priority_shares_thread_executor() {
        let same = task(1, CoreAffinity::NoAffinity).placement(1, MAIN).unwrap();
        let lower = task(0, CoreAffinity::NoAffinity).placement(1, MAIN).unwrap();
        assert_eq!(same.level, ExecutorLevel::Thread);
        assert_eq!(lower.level, ExecutorLevel::Thread);
    }

    #[test]
    fn pinning_to_missing_core_fails() {
        let cfg = task(10, CoreAffinity::Pinned(CoreId(1)));
        assert_eq!(cfg.placement(1, MAIN), Err(SpawnError::NoSuchCore(CoreId(1))));
        assert_eq!(cfg.placement(2, MAIN).unwrap().core, CoreId(1));
    }

    #[test]
    fn zero_stack_rejected() {
        let mut cfg = task(10, CoreAffinity::NoAffinity);
        cfg.stack_size = 0;
        assert_eq!(cfg.placement(1, MAIN), Err(SpawnError::ZeroStack));
    }

    #[test]
    fn handle_reports_placement() {
        let cfg = task(10, CoreAffinity::Pinned(CoreId(0)));
        let handle = TaskHandle::new(&cfg, cfg.placement(1, MAIN).unwrap());
        assert_eq!(handle.name(), "t");
        assert_eq!(handle.priority(), Priority(10));
        assert_eq!(handle.core(), CoreId(0));
        assert_eq!(handle.level(), ExecutorLevel::Preempting);
    }
}
