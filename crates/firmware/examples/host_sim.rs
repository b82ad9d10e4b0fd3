//! Desktop simulation of the prop sound board.
//!
//! Runs the same boot path as the hardware build on a tokio runtime: the mixer
//! ticks once per output period on its own task, the cooperative scheduler
//! runs once per millisecond on the main task, and a short command script is
//! fed through the console queue.
//!
//! Run with:
//! ```bash
//! RUST_LOG=info cargo run -p firmware --example host_sim --features emulator
//! ```

use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};
use std::time::Duration;

use firmware::audio::{render_into, BoardAmp, NullOutput, Unfitted};
use firmware::{boot, console, AmpLatch, Amplifier, CommandQueue, Context, TrackPlayer};
use platform::{BoardProfile, LogSink, OutputSink, SILENCE};
use playback::SoundSystem;
use scheduler::{Clock, Instant};
use tracing_subscriber::EnvFilter;

/// Console lines and the simulated millisecond they are typed at.
const SCRIPT: &[(u32, &str)] = &[
    (0, "play_track 1"),
    (50, "whatison"),
    (500, "play_track 0"),
    (900, "stop_track 100"),
    (1_300, "amp on"),
    (1_600, "play_track 1"),
    (1_650, "amp off"),
    (1_700, "whatison"),
];

/// Simulated run time.
const RUN_MS: u32 = 2_200;

/// Loudest absolute sample since the last report, written by the mixer task.
static PEAK: AtomicU16 = AtomicU16::new(0);
/// Blocks rendered so far.
static BLOCKS: AtomicU32 = AtomicU32::new(0);

/// Millisecond clock counting from runtime start.
struct HostClock {
    start: tokio::time::Instant,
}

impl Clock for HostClock {
    #[allow(clippy::cast_possible_truncation)] // wraps like the hardware counter
    fn now(&self) -> Instant {
        Instant::from_millis(self.start.elapsed().as_millis() as u32)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), boot::BootError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let board = boot::resolve_board(BoardProfile::Host)?;
    tracing::info!(
        profile = ?board.profile,
        players = board.players,
        "{} v{} host simulator",
        platform::config::APP_NAME,
        platform::config::APP_VERSION
    );

    let sound: &'static SoundSystem = Box::leak(Box::new(SoundSystem::new(&board)));
    boot::init_sound(sound, &LogSink);

    let audio = board.audio;
    let mixer = tokio::spawn(async move {
        let mut sink = NullOutput::new();
        if let Err(e) = sink.start(audio) {
            tracing::error!(?e, "null sink failed to start");
        }
        let mut block = SILENCE;
        let mut ticker =
            tokio::time::interval(Duration::from_micros(u64::from(audio.tick_period_us())));
        loop {
            ticker.tick().await;
            render_into(sound, &mut sink, &mut block);
            PEAK.fetch_max(sink.take_peak(), Ordering::Relaxed);
            BLOCKS.fetch_add(1, Ordering::Relaxed);
        }
    });

    let clock = HostClock {
        start: tokio::time::Instant::now(),
    };
    let diag = LogSink;
    let latch = AmpLatch::new();
    let commands = CommandQueue::new();

    let amp_switch = BoardAmp::<Unfitted, Unfitted>::for_board(board.amp, None, None)
        .unwrap_or(BoardAmp::Detached { enabled: false });
    let mut amplifier = Amplifier::new(amp_switch, board.amp_timing);
    let mut track_player = TrackPlayer::new();
    let mut scheduler = boot::register_tasks(&mut amplifier, &mut track_player)?;
    let mut cx = Context::new(&clock, sound, &diag, &latch);

    scheduler.setup_all(&mut cx);
    let mut script = SCRIPT.iter().peekable();
    let mut pass = tokio::time::interval(Duration::from_millis(1));
    loop {
        pass.tick().await;
        let now = cx.now().as_millis();
        while let Some(&&(at, line)) = script.peek() {
            if at > now {
                break;
            }
            tracing::info!(at, line, "console");
            if let Err(e) = console::submit(&commands, line) {
                tracing::warn!(%e, line, "command dropped");
            }
            script.next();
        }
        console::drain(&commands, &mut scheduler, &mut cx);
        scheduler.run_pass(&mut cx);

        if now % 100 == 0 {
            tracing::debug!(
                ms = now,
                peak = PEAK.swap(0, Ordering::Relaxed),
                blocks = BLOCKS.load(Ordering::Relaxed),
                playing = sound.playing_count(),
                "mixer"
            );
        }
        if now >= RUN_MS {
            break;
        }
    }

    mixer.abort();
    tracing::info!(passes = scheduler.passes(), "simulation finished");
    Ok(())
}
