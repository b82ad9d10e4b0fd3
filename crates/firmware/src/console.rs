//! Console command intake.
//!
//! A transport (serial reader, host stdin, test) pushes raw lines into a
//! [`CommandQueue`]; the scheduler loop drains it between passes and offers
//! each command to the registered tasks. A line is a verb followed by an
//! optional argument: `amp on`, `play_track 1`, `whatison`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use scheduler::Scheduler;

/// Longest accepted command line, in bytes.
pub const LINE_CAPACITY: usize = 32;

/// Lines buffered between scheduler passes.
pub const QUEUE_DEPTH: usize = 4;

/// One raw console line.
pub type CommandLine = heapless::String<LINE_CAPACITY>;

/// Lines waiting for the scheduler.
pub type CommandQueue = Channel<CriticalSectionRawMutex, CommandLine, QUEUE_DEPTH>;

/// Why a line was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Line longer than [`LINE_CAPACITY`].
    #[error("command line too long")]
    TooLong,
    /// [`QUEUE_DEPTH`] lines already waiting.
    #[error("command queue full")]
    QueueFull,
}

/// Split a line into verb and argument, trimming surrounding whitespace.
///
/// ```
/// assert_eq!(firmware::console::split("  amp   on "), ("amp", "on"));
/// assert_eq!(firmware::console::split("whatison"), ("whatison", ""));
/// ```
pub fn split(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    }
}

/// Queue `line` without waiting.
pub fn submit(queue: &CommandQueue, line: &str) -> Result<(), ConsoleError> {
    let mut buf = CommandLine::new();
    buf.push_str(line).map_err(|_| ConsoleError::TooLong)?;
    queue.try_send(buf).map_err(|_| ConsoleError::QueueFull)
}

/// Offer every queued line to the scheduler's tasks.
///
/// Returns how many lines some task consumed. Blank lines are skipped;
/// unrecognised ones are logged and dropped.
pub fn drain<C: ?Sized, const MAX: usize>(
    queue: &CommandQueue,
    scheduler: &mut Scheduler<'_, C, MAX>,
    cx: &mut C,
) -> usize {
    let mut handled = 0usize;
    while let Ok(line) = queue.try_receive() {
        let (verb, arg) = split(&line);
        if verb.is_empty() {
            continue;
        }
        if scheduler.dispatch_command(verb, arg, cx) {
            handled = handled.saturating_add(1);
        } else {
            #[cfg(feature = "defmt")]
            defmt::info!("unknown command: {=str}", verb);
            #[cfg(feature = "emulator")]
            tracing::info!(verb, arg, "unknown command");
        }
    }
    handled
}

#[allow(clippy::arithmetic_side_effects)] // test arithmetic on small known values
#[cfg(test)]
mod tests {
    use super::*;
    use scheduler::Task;

    struct Echo;

    impl Task<std::vec::Vec<String>> for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn step(&mut self, _cx: &mut std::vec::Vec<String>) {}
        fn handle_command(&mut self, verb: &str, arg: &str, cx: &mut std::vec::Vec<String>) -> bool {
            if verb == "echo" {
                cx.push(arg.to_string());
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_split_variants() {
        assert_eq!(split("play_track 2"), ("play_track", "2"));
        assert_eq!(split("stop_track\t 150 "), ("stop_track", "150"));
        assert_eq!(split("   "), ("", ""));
    }

    #[test]
    fn test_submit_rejects_long_lines_and_full_queue() {
        let queue = CommandQueue::new();
        let long = "x".repeat(LINE_CAPACITY + 1);
        assert_eq!(submit(&queue, &long), Err(ConsoleError::TooLong));
        for _ in 0..QUEUE_DEPTH {
            submit(&queue, "amp on").unwrap();
        }
        assert_eq!(submit(&queue, "amp on"), Err(ConsoleError::QueueFull));
    }

    #[test]
    fn test_drain_dispatches_in_order() {
        let queue = CommandQueue::new();
        let mut echo = Echo;
        let mut sched = Scheduler::<std::vec::Vec<String>, 2>::builder()
            .register(&mut echo)
            .unwrap()
            .build();
        let mut out = std::vec::Vec::new();
        submit(&queue, "echo one").unwrap();
        submit(&queue, "nope").unwrap();
        submit(&queue, "").unwrap();
        submit(&queue, "echo two words").unwrap();
        assert_eq!(drain(&queue, &mut sched, &mut out), 2);
        assert_eq!(out, ["one", "two words"]);
        assert_eq!(drain(&queue, &mut sched, &mut out), 0);
    }
}
