//! Amplifier power traces against a running mixer.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]
//!
//! Every simulated millisecond renders one block, advances the clock and
//! steps the amplifier, the same order the board runs them in.
//!
//! Run with: cargo test -p firmware --test amplifier_trace

use firmware::{boot, console, AmpLatch, Amplifier, CommandQueue, Context, TrackPlayer};
use platform::mocks::{MockAmp, RecordingSink};
use platform::{AmplifierTiming, BoardConfig, BoardProfile, Notice, PowerState, BLOCK_SAMPLES};
use playback::{Clip, EffectId, SoundSystem};
use proptest::prelude::*;
use scheduler::{ManualClock, Task};

const MAX_CLIP_MS: usize = 400;

static PCM: [i16; MAX_CLIP_MS * BLOCK_SAMPLES] = [500; MAX_CLIP_MS * BLOCK_SAMPLES];

/// A clip lasting exactly `ms` mixer blocks.
fn clip_ms(ms: usize) -> Clip {
    Clip::new(EffectId(7), &PCM[..ms * BLOCK_SAMPLES])
}

struct Rig {
    clock: ManualClock,
    sound: SoundSystem,
    diag: RecordingSink,
    latch: AmpLatch,
}

impl Rig {
    fn new() -> Self {
        let sound = SoundSystem::new(&BoardConfig::for_profile(BoardProfile::Host));
        let diag = RecordingSink::new();
        boot::init_sound(&sound, &diag);
        Self {
            clock: ManualClock::new(0),
            sound,
            diag,
            latch: AmpLatch::new(),
        }
    }

    fn cx(&self) -> Context<'_> {
        Context::new(&self.clock, &self.sound, &self.diag, &self.latch)
    }

    fn now(&self) -> u32 {
        self.cx().now().as_millis()
    }

    /// One millisecond: render, advance, step.
    fn tick(&self, amp: &mut Amplifier<MockAmp>) {
        self.sound.tick();
        self.clock.advance(1);
        amp.step(&mut self.cx());
    }
}

struct Trace {
    quiet_at: Option<u32>,
    off_at: Option<u32>,
    ons: usize,
    offs: usize,
    enables: usize,
    disables: usize,
}

fn play_until_quiet(clip_len_ms: usize) -> Trace {
    let rig = Rig::new();
    let mut amp = Amplifier::new(MockAmp::new(), AmplifierTiming::default());
    let h = rig.sound.acquire_free().unwrap();
    h.play(clip_ms(clip_len_ms));
    amp.step(&mut rig.cx());
    assert_eq!(amp.state(), PowerState::On, "activity powers up");

    let mut quiet_at = None;
    let mut off_at = None;
    for _ in 0..clip_len_ms + 200 {
        rig.tick(&mut amp);
        if quiet_at.is_none() && !rig.sound.any_active() {
            quiet_at = Some(rig.now());
        }
        if off_at.is_none() && amp.state() == PowerState::Off {
            off_at = Some(rig.now());
        }
    }
    Trace {
        quiet_at,
        off_at,
        ons: rig.diag.count(&Notice::AmplifierOn),
        offs: rig.diag.count(&Notice::AmplifierOff),
        enables: amp.driver().enable_count,
        disables: amp.driver().disable_count,
    }
}

#[test]
fn test_short_clip_powers_off_after_poll_and_grace() {
    let t = play_until_quiet(25);
    assert_eq!(t.quiet_at, Some(25));
    assert_eq!(t.off_at, Some(25 + 50 + 20));
    assert_eq!((t.ons, t.offs), (1, 1));
    assert_eq!((t.enables, t.disables), (1, 1));
}

#[test]
fn test_activity_during_idle_pending_keeps_amp_on() {
    let rig = Rig::new();
    let mut amp = Amplifier::new(MockAmp::new(), AmplifierTiming::default());
    let h = rig.sound.acquire_free().unwrap();
    h.play(clip_ms(5));
    amp.step(&mut rig.cx());

    for _ in 0..10 {
        rig.tick(&mut amp);
    }
    assert_eq!(amp.state(), PowerState::IdlePending);

    h.play(clip_ms(100));
    // The poll interval runs out while the second clip is playing.
    for _ in 0..60 {
        rig.tick(&mut amp);
    }
    assert_eq!(amp.state(), PowerState::On);
    assert_eq!(amp.driver().disable_count, 0);
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 0);

    for _ in 0..200 {
        rig.tick(&mut amp);
    }
    assert_eq!(amp.state(), PowerState::Off);
    assert_eq!(rig.diag.count(&Notice::AmplifierOn), 1);
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 1);
}

#[test]
fn test_activity_during_grace_keeps_amp_on() {
    let rig = Rig::new();
    let mut amp = Amplifier::new(MockAmp::new(), AmplifierTiming::default());
    let h = rig.sound.acquire_free().unwrap();
    h.play(clip_ms(5));
    amp.step(&mut rig.cx());

    // Quiet at 5, poll ends at 55, grace would end at 75.
    while rig.now() < 60 {
        rig.tick(&mut amp);
    }
    assert_eq!(amp.state(), PowerState::IdlePending);

    h.play(clip_ms(100));
    for _ in 0..20 {
        rig.tick(&mut amp);
    }
    assert_eq!(rig.now(), 80);
    assert_eq!(amp.state(), PowerState::On);
    assert_eq!(amp.driver().disable_count, 0);
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 0);

    for _ in 0..200 {
        rig.tick(&mut amp);
    }
    assert_eq!(amp.state(), PowerState::Off);
    assert_eq!(rig.diag.count(&Notice::AmplifierOn), 1);
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 1);
    assert_eq!(amp.driver().disable_count, 1);
}

#[test]
fn test_muted_master_counts_as_quiet() {
    let rig = Rig::new();
    let mut amp = Amplifier::new(MockAmp::new(), AmplifierTiming::default());
    let h = rig.sound.acquire_free().unwrap();
    h.play(clip_ms(MAX_CLIP_MS));
    rig.sound
        .mixer()
        .set_master_volume(platform::VolumePercent::new(0));
    for _ in 0..100 {
        rig.tick(&mut amp);
    }
    assert!(h.is_playing());
    assert_eq!(amp.state(), PowerState::Off);
    assert_eq!(amp.driver().enable_count, 0);
}

#[test]
fn test_amp_on_command_holds_guard_window() {
    let rig = Rig::new();
    let mut amp = Amplifier::new(MockAmp::new(), AmplifierTiming::default());
    let mut tracks = TrackPlayer::new();
    let commands = CommandQueue::new();
    let mut cx = rig.cx();
    let mut sched = boot::register_tasks(&mut amp, &mut tracks).unwrap();

    console::submit(&commands, "amp on").unwrap();
    assert_eq!(console::drain(&commands, &mut sched, &mut cx), 1);
    assert_eq!(rig.diag.count(&Notice::AmplifierOn), 1);

    for _ in 0..99 {
        rig.clock.advance(1);
        sched.run_pass(&mut cx);
    }
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 0, "guard + poll + grace");
    rig.clock.advance(1);
    sched.run_pass(&mut cx);
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 1);
}

#[test]
fn test_amp_off_command_yields_to_later_activity() {
    let rig = Rig::new();
    let mut amp = Amplifier::new(MockAmp::new(), AmplifierTiming::default());
    let mut tracks = TrackPlayer::new();
    let commands = CommandQueue::new();
    let mut cx = rig.cx();
    let mut sched = boot::register_tasks(&mut amp, &mut tracks).unwrap();

    console::submit(&commands, "play_track 0").unwrap();
    console::drain(&commands, &mut sched, &mut cx);
    // Pass 1 loads the track and latches a power-up; pass 2 honours it.
    sched.run_pass(&mut cx);
    sched.run_pass(&mut cx);
    assert_eq!(rig.diag.count(&Notice::AmplifierOn), 1);

    console::submit(&commands, "amp off").unwrap();
    console::drain(&commands, &mut sched, &mut cx);
    assert_eq!(rig.diag.count(&Notice::AmplifierOff), 1);

    // The looped track is still playing, so the next pass powers back up.
    rig.clock.advance(1);
    sched.run_pass(&mut cx);
    assert_eq!(rig.diag.count(&Notice::AmplifierOn), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_off_exactly_once_after_quiet(len in 1usize..300) {
        let t = play_until_quiet(len);
        let quiet = t.quiet_at.unwrap();
        let off = t.off_at.unwrap();
        prop_assert_eq!(quiet, len as u32);
        prop_assert!(off >= quiet + 50 + 20, "off at {} quiet at {}", off, quiet);
        prop_assert!(off <= quiet + 50 + 20 + 1);
        prop_assert_eq!(t.offs, 1);
        prop_assert_eq!(t.disables, 1);
        prop_assert_eq!(t.ons, 1);
    }
}
