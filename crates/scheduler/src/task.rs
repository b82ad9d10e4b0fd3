//! The cooperative task contract.

/// A long-running job driven by the [`Scheduler`](crate::Scheduler).
///
/// `C` is the application context handed to every call (clock, sound system,
/// diagnostics). Tasks are registered once and live for the whole program.
///
/// # Contract
///
/// `step` must return promptly. A step that loops without returning stalls
/// every other task; the scheduler cannot preempt it and does not detect it.
/// Long waits are expressed with [`Coroutine::sleep`](crate::Coroutine::sleep).
pub trait Task<C: ?Sized> {
    /// Name used in listings and diagnostics. Unique within a registry.
    fn name(&self) -> &'static str;

    /// One-time initialization, run in registration order before the first
    /// pass.
    fn setup(&mut self, _cx: &mut C) {}

    /// Run until the next suspension point.
    fn step(&mut self, cx: &mut C);

    /// Offer a console command. Return `true` if the task consumed it.
    fn handle_command(&mut self, _verb: &str, _arg: &str, _cx: &mut C) -> bool {
        false
    }
}
