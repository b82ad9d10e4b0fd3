//! Property tests for shared-handle reference counting.
//!
//! Random sequences of clone/drop must keep the player's count equal to the
//! number of live handles, reach exactly zero when the last one drops, and
//! make the player allocatable exactly once afterwards.

use playback::{Handle, Mixer, Pool, SoundSystem};
use platform::mocks::RecordingSink;
use platform::{AudioConfig, BoardConfig, BoardProfile};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    /// Clone the handle at this position (mod len).
    Clone(usize),
    /// Drop the handle at this position (mod len).
    Drop(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..64).prop_map(Op::Clone),
        (0usize..64).prop_map(Op::Drop),
    ]
}

proptest! {
    #[test]
    fn count_tracks_live_handles(ops in proptest::collection::vec(op(), 0..200)) {
        let pool = Pool::<2>::new(AudioConfig::default());
        let mixer = Mixer::<2>::new();
        let first = pool.acquire_free(&mixer).unwrap();
        let mut live: Vec<Handle<'_>> = vec![first];

        for op in ops {
            if live.is_empty() {
                break;
            }
            match op {
                Op::Clone(i) => {
                    let h = live[i % live.len()].clone();
                    live.push(h);
                }
                Op::Drop(i) => {
                    let at = i % live.len();
                    drop(live.swap_remove(at));
                }
            }
            let refs = pool.player(0).unwrap().refs();
            prop_assert_eq!(usize::from(refs), live.len());
            prop_assert_eq!(pool.player(0).unwrap().is_available(), live.is_empty());
            prop_assert_eq!(mixer.bound(0).is_some(), !live.is_empty());
        }

        live.clear();
        prop_assert_eq!(pool.player(0).unwrap().refs(), 0);

        // Allocatable exactly once: first acquire gets slot 0, second gets slot 1,
        // third finds nothing.
        let a = pool.acquire_free(&mixer).unwrap();
        let b = pool.acquire_free(&mixer).unwrap();
        prop_assert_eq!(a.index(), 0);
        prop_assert_eq!(b.index(), 1);
        prop_assert!(pool.acquire_free(&mixer).is_none());
    }

    #[test]
    fn stale_handles_never_disturb_new_owner(clones in 0usize..10) {
        let sound = SoundSystem::new(&BoardConfig::for_profile(BoardProfile::Host));
        let diag = RecordingSink::new();
        sound.reinitialize(&diag);
        let old = sound.acquire_free().unwrap();
        let old_copies: Vec<_> = (0..clones).map(|_| old.clone()).collect();

        sound.reinitialize(&diag);
        prop_assert_eq!(diag.notices().len(), 1);

        let fresh = sound.acquire_free().unwrap();
        prop_assert_eq!(fresh.index(), old.index());
        drop(old);
        drop(old_copies);
        prop_assert_eq!(fresh.refs(), 1);
        prop_assert!(sound.mixer().bound(0).is_some());
    }
}
