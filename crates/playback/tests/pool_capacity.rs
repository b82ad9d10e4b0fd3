//! Pool capacity and release ordering through the public API.

use embedded_hal::delay::DelayNs;
use playback::{Clip, EffectId, Mixer, Pool, SourceId, Stream};
use platform::mocks::RecordingSink;
use platform::{AudioConfig, Notice};

static PCM: [i16; 8] = [500; 8];

#[test]
fn n_acquires_succeed_and_the_next_is_empty() {
    const N: usize = 7;
    let pool = Pool::<N>::new(AudioConfig::default());
    let mixer = Mixer::<9>::new();
    let mut held = Vec::new();
    for i in 0..N {
        let h = pool
            .acquire_free(&mixer)
            .unwrap_or_else(|| panic!("acquire {i} should succeed"));
        held.push(h);
    }
    assert!(pool.acquire_free(&mixer).is_none(), "pool of {N} is exhausted");

    // Fully dropping one handle (all of its copies) frees exactly one slot.
    let victim = held.remove(3);
    let copy = victim.clone();
    drop(victim);
    assert!(pool.acquire_free(&mixer).is_none(), "a copy still holds it");
    drop(copy);
    let again = pool.acquire_free(&mixer).expect("slot 3 is free again");
    assert_eq!(again.index(), 3);
    assert!(pool.acquire_free(&mixer).is_none());
}

#[test]
fn lane_is_cleared_before_slot_becomes_free() {
    let pool = Pool::<2>::new(AudioConfig::default());
    let mixer = Mixer::<2>::new();
    let h = pool.acquire_free(&mixer).unwrap();
    h.play_looped(Clip::new(EffectId(4), &PCM));
    assert_eq!(mixer.bound(0), SourceId::new(0));
    assert!(mixer.tick(&Single(&pool)).iter().all(|&s| s == 500));
    drop(h);
    // Lane empty and player idle: the next tick reads nothing from it.
    assert_eq!(mixer.bound(0), None);
    assert!(pool.player(0).unwrap().is_available());
    assert!(!pool.player(0).unwrap().is_playing());
    assert!(mixer.tick(&Single(&pool)).iter().all(|&s| s == 0));
}

/// Expose the pool's players as mixer sources 0..N.
struct Single<'a, const N: usize>(&'a Pool<N>);

impl<const N: usize> playback::SourceBank for Single<'_, N> {
    fn source(&self, id: SourceId) -> Option<&dyn Stream> {
        self.0
            .player(usize::from(id.index()))
            .map(|p| p as &dyn Stream)
    }
}

/// Delay that frees a held handle after a number of backoff periods.
struct ReleasingDelay<'a> {
    waited_ms: u32,
    release_after_ms: u32,
    held: Option<playback::Handle<'a>>,
}

impl DelayNs for ReleasingDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ms += ns / 1_000_000;
        if self.waited_ms >= self.release_after_ms {
            self.held = None;
        }
    }
}

#[test]
fn acquire_blocking_retries_with_backoff_and_notices() {
    let pool = Pool::<1>::new(AudioConfig::default());
    let mixer = Mixer::<1>::new();
    let diag = RecordingSink::new();
    let busy = pool.acquire_free(&mixer).unwrap();
    let mut delay = ReleasingDelay {
        waited_ms: 0,
        release_after_ms: 300,
        held: Some(busy),
    };
    let h = pool.acquire_blocking(&mixer, &mut delay, &diag);
    assert_eq!(h.index(), 0);
    assert_eq!(delay.waited_ms, 300, "three 100 ms backoffs");
    assert_eq!(
        diag.notices().as_slice(),
        &[
            Notice::PoolExhausted { attempt: 1 },
            Notice::PoolExhausted { attempt: 2 },
            Notice::PoolExhausted { attempt: 3 },
        ]
    );
}
