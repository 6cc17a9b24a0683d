#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Nearest-hostile acquisition over a bounded overlap query.

use horde_core::{Handle, Vec2};
use log::trace;

/// Hostile reported by a [`CandidateSource`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Handle of the hostile.
    pub handle: Handle,
    /// Position of the hostile in world units.
    pub position: Vec2,
    /// Whether the hostile is alive and acquired from its pool.
    pub active: bool,
}

/// Fixed-capacity scratch buffer filled by a [`CandidateSource`].
///
/// Candidates pushed past the capacity are dropped, mirroring a
/// non-allocating physics overlap query.
#[derive(Debug)]
pub struct CandidateBuffer {
    items: Vec<TargetCandidate>,
    capacity: usize,
    dropped: usize,
}

impl CandidateBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    fn reset(&mut self) {
        self.items.clear();
        self.dropped = 0;
    }

    /// Records a candidate. Returns `false` once the buffer is full.
    pub fn push(&mut self, candidate: TargetCandidate) -> bool {
        if self.items.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.items.push(candidate);
        true
    }

    /// Number of candidates recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no candidate was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether further candidates would be dropped.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

/// Spatial collaborator that reports hostiles overlapping a circle.
pub trait CandidateSource {
    /// Pushes every hostile overlapping the circle at `origin` into `buffer`.
    fn overlap(&self, origin: Vec2, radius: f32, buffer: &mut CandidateBuffer);
}

/// Nearest-target search reusing one scratch buffer across queries.
#[derive(Debug)]
pub struct TargetAcquisition {
    buffer: CandidateBuffer,
}

impl TargetAcquisition {
    /// Creates a search that inspects at most `capacity` candidates per query.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: CandidateBuffer::with_capacity(capacity),
        }
    }

    /// Maximum number of candidates inspected per query.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buffer.capacity
    }

    /// Returns the handle of the active candidate closest to `origin` within
    /// `radius`.
    ///
    /// Equidistant candidates resolve to whichever the source reported first;
    /// callers must not rely on that order.
    pub fn find_nearest(
        &mut self,
        origin: Vec2,
        radius: f32,
        source: &impl CandidateSource,
    ) -> Option<Handle> {
        self.find_nearest_candidate(origin, radius, source)
            .map(|candidate| candidate.handle)
    }

    /// Same as [`TargetAcquisition::find_nearest`] but reports the position
    /// observed by the query as well.
    pub fn find_nearest_candidate(
        &mut self,
        origin: Vec2,
        radius: f32,
        source: &impl CandidateSource,
    ) -> Option<TargetCandidate> {
        self.buffer.reset();
        source.overlap(origin, radius, &mut self.buffer);
        if self.buffer.dropped > 0 {
            trace!(
                "target query dropped {} candidates beyond capacity {}",
                self.buffer.dropped,
                self.buffer.capacity
            );
        }

        let max_distance_sq = radius * radius;
        let mut best: Option<(f32, TargetCandidate)> = None;
        for candidate in self.buffer.items.iter().filter(|c| c.active) {
            let distance_sq = candidate.position.distance_squared(origin);
            if distance_sq > max_distance_sq {
                continue;
            }
            match best {
                Some((closest, _)) if distance_sq >= closest => {}
                _ => best = Some((distance_sq, *candidate)),
            }
        }
        best.map(|(_, candidate)| candidate)
    }
}

impl Default for TargetAcquisition {
    fn default() -> Self {
        Self::new(64)
    }
}
