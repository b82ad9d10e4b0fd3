//! Fixed-capacity player pool.
//!
//! Player `i` always mixes through lane `i` of the mixer's source table.
//! Acquiring a player binds that lane; dropping the last [`Handle`] clears it.
//!
//! All operations scan at most `N` players and never allocate. Only the
//! scheduler context may call them.

use embedded_hal::delay::DelayNs;
use platform::{AudioConfig, DiagnosticSink, Notice};

use crate::handle::Handle;
use crate::mixer::Mixer;
use crate::player::Player;
use crate::stream::{Clip, SourceId, Stream};

/// Delay between attempts in [`Pool::acquire_blocking`].
pub const ACQUIRE_BACKOFF_MS: u32 = 100;

/// `N` players, of which the first `capacity` are handed out.
#[derive(Debug)]
pub struct Pool<const N: usize> {
    players: [Player; N],
    capacity: usize,
}

impl<const N: usize> Pool<N> {
    /// Pool using all `N` players.
    pub fn new(audio: AudioConfig) -> Self {
        Self::with_capacity(audio, N)
    }

    /// Pool limited to the first `capacity` players (clamped to `N`).
    pub fn with_capacity(audio: AudioConfig, capacity: usize) -> Self {
        Self {
            players: core::array::from_fn(|_| Player::new(audio)),
            capacity: capacity.min(N),
        }
    }

    /// Number of players that can be acquired.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Player `index`, including ones past `capacity`.
    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// The players that take part in allocation.
    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().take(self.capacity)
    }

    /// Players with a zero count.
    pub fn available(&self) -> usize {
        self.players().filter(|p| p.is_available()).count()
    }

    /// Players with a clip loaded.
    pub fn playing_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_playing()).count()
    }

    /// First free player, claimed, reset to full volume and bound to its lane.
    ///
    /// Returns `None` when every player is referenced. Never blocks.
    pub fn acquire_free<'a, const L: usize>(&'a self, mixer: &'a Mixer<L>) -> Option<Handle<'a>> {
        for (i, player) in self.players().enumerate() {
            let index = u8::try_from(i).ok()?;
            let lane = mixer.lane(i)?;
            if player.try_claim() {
                player.reset();
                lane.set(SourceId::new(index));
                return Some(Handle::new(player, lane, index));
            }
        }
        None
    }

    /// [`acquire_free`](Self::acquire_free), retrying every
    /// [`ACQUIRE_BACKOFF_MS`] until a player frees up.
    ///
    /// Each failed attempt emits one [`Notice::PoolExhausted`]. Blocks the
    /// caller for the whole wait: use from setup code or tasks that can
    /// afford it, never from the real-time context.
    pub fn acquire_blocking<'a, const L: usize>(
        &'a self,
        mixer: &'a Mixer<L>,
        delay: &mut impl DelayNs,
        diag: &(impl DiagnosticSink + ?Sized),
    ) -> Handle<'a> {
        let mut attempt: u32 = 0;
        loop {
            if let Some(handle) = self.acquire_free(mixer) {
                return handle;
            }
            attempt = attempt.saturating_add(1);
            diag.notice(Notice::PoolExhausted { attempt });
            delay.delay_ms(ACQUIRE_BACKOFF_MS);
        }
    }

    /// New handle on the first referenced, playing player whose clip matches.
    pub fn find_by_stream<'a, const L: usize>(
        &'a self,
        mixer: &'a Mixer<L>,
        pred: impl Fn(&Clip) -> bool,
    ) -> Option<Handle<'a>> {
        for (i, player) in self.players().enumerate() {
            let Some(clip) = player.clip() else {
                continue;
            };
            if !pred(&clip) {
                continue;
            }
            let index = u8::try_from(i).ok()?;
            let lane = mixer.lane(i)?;
            if player.try_retain() {
                return Some(Handle::new(player, lane, index));
            }
        }
        None
    }

    /// Reclaim every still-referenced player, warning once per player.
    ///
    /// Callers must have emptied the players' lanes beforehand.
    pub(crate) fn reclaim_all(&self, diag: &(impl DiagnosticSink + ?Sized)) {
        for (i, player) in self.players.iter().enumerate() {
            let refs = player.refs();
            if refs != 0 {
                diag.notice(Notice::StaleReference {
                    slot: u8::try_from(i).unwrap_or(u8::MAX),
                    refs,
                });
                player.force_reclaim();
            } else {
                player.reset();
            }
        }
    }
}
