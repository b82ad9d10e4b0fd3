//! The board loop on a tokio runtime with paused time, as the host simulator
//! runs it: mixer ticker on its own task, scheduler passes on the test task.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use firmware::audio::{render_into, NullOutput};
use firmware::{boot, console, AmpLatch, Amplifier, CommandQueue, Context, TrackPlayer};
use platform::mocks::{MockAmp, RecordingSink};
use platform::{BoardProfile, Notice, OutputSink, SILENCE};
use playback::SoundSystem;
use scheduler::{Clock, Instant};

static PEAK: AtomicU16 = AtomicU16::new(0);

struct TokioClock {
    start: tokio::time::Instant,
}

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.start.elapsed().as_millis() as u32)
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_track_and_amp_on_tokio_time() {
    let diag = RecordingSink::new();
    let board = boot::resolve_board(BoardProfile::Host).unwrap();
    let sound: &'static SoundSystem = Box::leak(Box::new(SoundSystem::new(&board)));
    boot::init_sound(sound, &diag);

    let audio = board.audio;
    let mixer = tokio::spawn(async move {
        let mut sink = NullOutput::new();
        sink.start(audio).unwrap();
        let mut block = SILENCE;
        let mut ticker =
            tokio::time::interval(Duration::from_micros(u64::from(audio.tick_period_us())));
        loop {
            ticker.tick().await;
            render_into(sound, &mut sink, &mut block);
            PEAK.fetch_max(sink.take_peak(), Ordering::Relaxed);
        }
    });

    let clock = TokioClock {
        start: tokio::time::Instant::now(),
    };
    let latch = AmpLatch::new();
    let commands = CommandQueue::new();
    let mut amp = Amplifier::new(MockAmp::new(), board.amp_timing);
    let mut tracks = TrackPlayer::new();
    let mut cx = Context::new(&clock, sound, &diag, &latch);
    let mut sched = boot::register_tasks(&mut amp, &mut tracks).unwrap();

    console::submit(&commands, "play_track 1").unwrap();
    let mut pass = tokio::time::interval(Duration::from_millis(1));
    for _ in 0..400 {
        pass.tick().await;
        console::drain(&commands, &mut sched, &mut cx);
        sched.run_pass(&mut cx);
    }
    mixer.abort();

    assert!(PEAK.load(Ordering::Relaxed) > 0, "mixer rendered the chime");
    assert_eq!(diag.count(&Notice::AmplifierOn), 1);
    assert_eq!(diag.count(&Notice::AmplifierOff), 1);
    assert_eq!(sound.pool().available(), board.players);
}
