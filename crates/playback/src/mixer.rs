//! Real-time mixer and its source table.
//!
//! The source table is a fixed array of [`Lane`]s. Each lane holds at most one
//! [`SourceId`] in a single `AtomicU8`, so binding or unbinding a lane from the
//! scheduler is one atomic store and the interrupt always sees either the old
//! or the new source, never a torn value.
//!
//! [`Mixer::tick`] runs once per block period from the real-time interrupt:
//!
//! ```text
//! for each lane:      id = lane.load()          (skip if empty)
//!                     s  = bank.source(id)      (skip if unknown / idle)
//!                     s.render(tmp)             (skip if it produced nothing)
//!                     acc[i] += tmp[i]          (i32, cannot overflow for <= 2^16 lanes)
//! out[i] = clamp_i16(master.apply(acc[i]))
//! ```
//!
//! There are no error paths: a lane whose source cannot produce data simply
//! contributes silence.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use platform::{Block, Gain, VolumePercent, BLOCK_SAMPLES, SILENCE};

use crate::stream::{SourceBank, SourceId};

/// One entry of the source table.
#[derive(Debug)]
pub struct Lane(AtomicU8);

impl Lane {
    /// Empty lane.
    pub const fn new() -> Self {
        Self(AtomicU8::new(SourceId::EMPTY_RAW))
    }

    /// Source currently bound, if any.
    pub fn get(&self) -> Option<SourceId> {
        SourceId::new(self.0.load(Ordering::Acquire))
    }

    /// Bind `source` (or clear with `None`). Single atomic store.
    pub fn set(&self, source: Option<SourceId>) {
        let raw = source.map_or(SourceId::EMPTY_RAW, SourceId::raw);
        self.0.store(raw, Ordering::Release);
    }
}

impl Default for Lane {
    fn default() -> Self {
        Self::new()
    }
}

/// `bind` was given a lane index past the end of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("lane {lane} out of range (table has {lanes} lanes)")]
pub struct LaneOutOfRange {
    /// Requested lane.
    pub lane: usize,
    /// Table length.
    pub lanes: usize,
}

/// Summing mixer over `L` lanes.
#[derive(Debug)]
pub struct Mixer<const L: usize> {
    lanes: [Lane; L],
    master: AtomicU16,
}

impl<const L: usize> Mixer<L> {
    /// All lanes empty, master volume at 100%.
    pub const fn new() -> Self {
        Self {
            lanes: [const { Lane::new() }; L],
            master: AtomicU16::new(Gain::UNITY.raw()),
        }
    }

    /// Number of lanes in the table.
    pub const fn lanes(&self) -> usize {
        L
    }

    /// Lane `index`, if it exists.
    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    /// Source bound to lane `index`.
    pub fn bound(&self, index: usize) -> Option<SourceId> {
        self.lane(index).and_then(Lane::get)
    }

    /// Point lane `index` at `source`, or empty it with `None`.
    ///
    /// Scheduler context only. Each lane must have a single writer at a time.
    pub fn bind(&self, index: usize, source: Option<SourceId>) -> Result<(), LaneOutOfRange> {
        let lane = self.lane(index).ok_or(LaneOutOfRange {
            lane: index,
            lanes: L,
        })?;
        lane.set(source);
        Ok(())
    }

    /// Empty every lane.
    pub fn unbind_all(&self) {
        for lane in &self.lanes {
            lane.set(None);
        }
    }

    /// Master volume.
    pub fn master_volume(&self) -> VolumePercent {
        self.master_gain().to_volume()
    }

    /// Set the master volume applied after summing.
    pub fn set_master_volume(&self, volume: VolumePercent) {
        self.master
            .store(Gain::from_volume(volume).raw(), Ordering::Relaxed);
    }

    /// Master gain in raw fixed point.
    pub fn master_gain(&self) -> Gain {
        Gain::from_raw(self.master.load(Ordering::Relaxed))
    }

    /// Mix one block from every bound, playing source.
    ///
    /// Real-time context only. Bounded: at most `L` renders of one block.
    pub fn tick<B: SourceBank + ?Sized>(&self, bank: &B) -> Block {
        let mut out = SILENCE;
        self.tick_into(bank, &mut out);
        out
    }

    /// [`tick`](Self::tick) writing into a caller-provided block (DMA half).
    pub fn tick_into<B: SourceBank + ?Sized>(&self, bank: &B, out: &mut Block) {
        let mut acc = [0i32; BLOCK_SAMPLES];
        let mut scratch = SILENCE;
        for lane in &self.lanes {
            let Some(stream) = lane.get().and_then(|id| bank.source(id)) else {
                continue;
            };
            if !stream.is_playing() || !stream.render(&mut scratch) {
                continue;
            }
            for (a, &s) in acc.iter_mut().zip(scratch.iter()) {
                *a = a.saturating_add(i32::from(s));
            }
        }
        let master = self.master_gain();
        for (o, &a) in out.iter_mut().zip(acc.iter()) {
            *o = saturate(master.apply(a));
        }
    }
}

impl<const L: usize> Default for Mixer<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)] // clamped to i16 range first
pub(crate) fn saturate(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
