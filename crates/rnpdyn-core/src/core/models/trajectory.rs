use super::structure::Structure;
use std::collections::BTreeMap;

/// The MODEL serial number identifying a frame.
pub type FrameId = u32;

/// An ordered collection of frames keyed by their MODEL number.
///
/// Frames are stored in a `BTreeMap`, so every iteration is in ascending
/// numeric frame order regardless of the order in which frames were read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    frames: BTreeMap<FrameId, Structure>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a frame, returning the structure previously stored under the
    /// same id, if any.
    pub fn insert(&mut self, id: FrameId, structure: Structure) -> Option<Structure> {
        self.frames.insert(id, structure)
    }

    pub fn frame(&self, id: FrameId) -> Option<&Structure> {
        self.frames.get(&id)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Structure> {
        self.frames.get_mut(&id)
    }

    /// Iterates over `(frame_id, structure)` pairs in ascending frame order.
    pub fn frames(&self) -> impl Iterator<Item = (FrameId, &Structure)> {
        self.frames.iter().map(|(&id, s)| (id, s))
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = (FrameId, &mut Structure)> {
        self.frames.iter_mut().map(|(&id, s)| (id, s))
    }

    pub fn frame_ids(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.frames.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<(FrameId, Structure)> for Trajectory {
    fn from_iter<I: IntoIterator<Item = (FrameId, Structure)>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}
