//! Task registry and round-robin driver.
//!
//! Tasks are collected with a [`SchedulerBuilder`] before the main loop and
//! the resulting [`Scheduler`] never changes shape afterwards. Each call to
//! [`Scheduler::run_pass`] steps every task once, in registration order.
//!
//! The registry stores `&mut dyn Task` so tasks of different types share one
//! fixed-capacity list without boxing; the tasks themselves live wherever the
//! caller put them (usually a `static` or the entry point's stack frame).

use heapless::Vec;

use crate::task::Task;

/// Registration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// The registry already holds its maximum number of tasks.
    #[error("task registry full ({capacity} tasks)")]
    Full {
        /// Registry capacity.
        capacity: usize,
    },
    /// Another task already uses this name.
    #[error("task name '{0}' already registered")]
    DuplicateName(&'static str),
}

/// Collects tasks before the scheduler starts.
pub struct SchedulerBuilder<'t, C: ?Sized, const MAX: usize> {
    tasks: Vec<&'t mut dyn Task<C>, MAX>,
}

impl<'t, C: ?Sized, const MAX: usize> SchedulerBuilder<'t, C, MAX> {
    /// Empty builder.
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Append a task. Tasks run in the order they are registered.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Full`] when `MAX` tasks are already registered,
    /// [`RegistryError::DuplicateName`] when the name is taken.
    pub fn register(mut self, task: &'t mut dyn Task<C>) -> Result<Self, RegistryError> {
        let name = task.name();
        if self.tasks.iter().any(|t| t.name() == name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.tasks
            .push(task)
            .map_err(|_| RegistryError::Full { capacity: MAX })?;
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> Scheduler<'t, C, MAX> {
        Scheduler {
            tasks: self.tasks,
            setup_done: false,
            passes: 0,
        }
    }
}

impl<C: ?Sized, const MAX: usize> Default for SchedulerBuilder<'_, C, MAX> {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin driver over a frozen task list.
pub struct Scheduler<'t, C: ?Sized, const MAX: usize> {
    tasks: Vec<&'t mut dyn Task<C>, MAX>,
    setup_done: bool,
    passes: u32,
}

impl<'t, C: ?Sized, const MAX: usize> Scheduler<'t, C, MAX> {
    /// Start collecting tasks.
    pub fn builder() -> SchedulerBuilder<'t, C, MAX> {
        SchedulerBuilder::new()
    }

    /// Run every task's `setup` once, in registration order.
    ///
    /// Later calls do nothing.
    pub fn setup_all(&mut self, cx: &mut C) {
        if self.setup_done {
            return;
        }
        for task in &mut self.tasks {
            task.setup(cx);
        }
        self.setup_done = true;
    }

    /// Step every task once. Runs setup first if it has not happened yet.
    pub fn run_pass(&mut self, cx: &mut C) {
        self.setup_all(cx);
        for task in &mut self.tasks {
            task.step(cx);
        }
        self.passes = self.passes.wrapping_add(1);
    }

    /// Offer `verb`/`arg` to each task in order until one consumes it.
    ///
    /// Returns `false` if no task recognised the command.
    pub fn dispatch_command(&mut self, verb: &str, arg: &str, cx: &mut C) -> bool {
        self.tasks
            .iter_mut()
            .any(|task| task.handle_command(verb, arg, cx))
    }

    /// Task names in run order.
    pub fn names(&self) -> Vec<&'static str, MAX> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Completed passes (wrapping).
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        events: std::vec::Vec<&'static str>,
    }

    struct Named {
        name: &'static str,
        swallow: &'static str,
    }

    impl Task<Log> for Named {
        fn name(&self) -> &'static str {
            self.name
        }
        fn setup(&mut self, cx: &mut Log) {
            cx.events.push("setup");
            cx.events.push(self.name);
        }
        fn step(&mut self, cx: &mut Log) {
            cx.events.push(self.name);
        }
        fn handle_command(&mut self, verb: &str, _arg: &str, cx: &mut Log) -> bool {
            if verb == self.swallow {
                cx.events.push(self.name);
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn runs_setup_once_then_round_robin() {
        let mut a = Named { name: "a", swallow: "x" };
        let mut b = Named { name: "b", swallow: "y" };
        let mut sched = Scheduler::<Log, 4>::builder()
            .register(&mut a)
            .unwrap()
            .register(&mut b)
            .unwrap()
            .build();
        let mut log = Log::default();
        sched.run_pass(&mut log);
        sched.run_pass(&mut log);
        assert_eq!(log.events, ["setup", "a", "setup", "b", "a", "b", "a", "b"]);
        assert_eq!(sched.passes(), 2);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut a = Named { name: "a", swallow: "" };
        let mut a2 = Named { name: "a", swallow: "" };
        let err = Scheduler::<Log, 4>::builder()
            .register(&mut a)
            .unwrap()
            .register(&mut a2)
            .err();
        assert_eq!(err, Some(RegistryError::DuplicateName("a")));
    }

    #[test]
    fn rejects_overflow() {
        let mut a = Named { name: "a", swallow: "" };
        let mut b = Named { name: "b", swallow: "" };
        let err = Scheduler::<Log, 1>::builder()
            .register(&mut a)
            .unwrap()
            .register(&mut b)
            .err();
        assert_eq!(err, Some(RegistryError::Full { capacity: 1 }));
    }

    #[test]
    fn command_goes_to_first_taker_only() {
        let mut a = Named { name: "a", swallow: "amp" };
        let mut b = Named { name: "b", swallow: "amp" };
        let mut sched = Scheduler::<Log, 2>::builder()
            .register(&mut a)
            .unwrap()
            .register(&mut b)
            .unwrap()
            .build();
        let mut log = Log::default();
        assert!(sched.dispatch_command("amp", "on", &mut log));
        assert!(!sched.dispatch_command("nope", "", &mut log));
        assert_eq!(log.events, ["a"]);
        assert_eq!(sched.names().as_slice(), ["a", "b"]);
    }
}
