//! Shared handle to a pool player.
//!
//! A [`Handle`] is a counted reference: cloning adds one to the player's
//! count, dropping removes one. When the last handle goes away the player's
//! mixer lane is emptied **first** and only then does the count reach zero,
//! so the interrupt can never be mixing a player that has already been handed
//! to a new owner.
//!
//! Each handle also remembers the player's generation. Reinitializing the
//! pool force-reclaims referenced players and bumps their generation; any
//! handle left over from before becomes inert (reads report idle, writes and
//! drops do nothing) instead of corrupting the new owner's count.
//!
//! Handles are deliberately `!Send`: every count change happens on the
//! scheduler thread.

use core::fmt;
use core::marker::PhantomData;

use platform::VolumePercent;

use crate::mixer::Lane;
use crate::player::Player;
use crate::stream::{Clip, Stream};

/// Counted reference to one pool player.
pub struct Handle<'a> {
    player: &'a Player,
    lane: &'a Lane,
    index: u8,
    generation: u8,
    _not_send: PhantomData<*const ()>,
}

impl<'a> Handle<'a> {
    /// Wrap a player the caller has just claimed or retained.
    pub(crate) fn new(player: &'a Player, lane: &'a Lane, index: u8) -> Self {
        Self {
            player,
            lane,
            index,
            generation: player.generation(),
            _not_send: PhantomData,
        }
    }

    fn live(&self) -> Option<&'a Player> {
        (self.player.generation() == self.generation).then_some(self.player)
    }

    /// `false` once the pool has been reinitialized underneath this handle.
    pub fn is_live(&self) -> bool {
        self.live().is_some()
    }

    /// Pool slot index.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Outstanding handles on the player (0 for a stale handle).
    pub fn refs(&self) -> u8 {
        self.live().map_or(0, Player::refs)
    }

    /// `true` while the player has a clip loaded.
    pub fn is_playing(&self) -> bool {
        self.live().is_some_and(Stream::is_playing)
    }

    /// Clip currently loaded.
    pub fn clip(&self) -> Option<Clip> {
        self.live().and_then(Player::clip)
    }

    /// Player volume.
    pub fn volume(&self) -> VolumePercent {
        self.live()
            .map_or(VolumePercent::new(0), Player::volume)
    }

    /// Set the player volume. Cancels a running fade.
    pub fn set_volume(&self, volume: VolumePercent) {
        if let Some(p) = self.live() {
            p.set_volume(volume);
        }
    }

    /// Start `clip` from the beginning, once.
    pub fn play(&self, clip: Clip) {
        if let Some(p) = self.live() {
            p.play(clip, false);
        }
    }

    /// Start `clip` from the beginning, repeating until stopped.
    pub fn play_looped(&self, clip: Clip) {
        if let Some(p) = self.live() {
            p.play(clip, true);
        }
    }

    /// Change looping without restarting.
    pub fn set_looping(&self, looping: bool) {
        if let Some(p) = self.live() {
            p.set_looping(looping);
        }
    }

    /// Stop immediately.
    pub fn stop(&self) {
        if let Some(p) = self.live() {
            p.stop();
        }
    }

    /// Ramp the volume to zero over `ms` milliseconds, then stop.
    pub fn fade_out(&self, ms: u32) {
        if let Some(p) = self.live() {
            p.fade_out(ms);
        }
    }

    /// Gain step per block of a running fade (0 when not fading).
    pub fn fade_speed(&self) -> u16 {
        self.live().map_or(0, Player::fade_speed)
    }

    /// `true` if both handles refer to the same live player.
    pub fn same_player(&self, other: &Handle<'_>) -> bool {
        core::ptr::eq(self.player, other.player) && self.generation == other.generation
    }
}

impl Clone for Handle<'_> {
    fn clone(&self) -> Self {
        if let Some(p) = self.live() {
            let retained = p.try_retain();
            debug_assert!(retained, "handle count overflow");
        }
        Self {
            player: self.player,
            lane: self.lane,
            index: self.index,
            generation: self.generation,
            _not_send: PhantomData,
        }
    }
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        let Some(p) = self.live() else {
            return;
        };
        if p.refs() == 1 {
            // Last owner: take the player out of the mix before it can be
            // reallocated.
            self.lane.set(None);
            p.reset();
        }
        p.release();
    }
}

impl fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .field("live", &self.is_live())
            .finish()
    }
}
