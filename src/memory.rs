use std::collections::VecDeque;
use std::convert::TryFrom;

use tracing::{debug, trace};

use crate::trap::UmError;

pub type Segment = Box<[u32]>;

/// Segment table keyed by id, with a FIFO queue of ids released by `unmap`.
///
/// Segment 0 holds the running program and stays mapped for the lifetime of
/// the memory. A freed id sits either in the table as `None` and once in the
/// queue, or is live in the table, never both.
#[derive(Debug)]
pub struct SegmentedMemory {
    segments: Vec<Option<Segment>>,
    free: VecDeque<u32>,
}

fn zeroed(length: u32) -> Result<Segment, UmError> {
    let mut words: Vec<u32> = Vec::new();
    words
        .try_reserve_exact(length as usize)
        .map_err(|_| UmError::AllocationFailure(length))?;
    words.resize(length as usize, 0);
    Ok(words.into_boxed_slice())
}

impl SegmentedMemory {
    pub fn new(length: u32) -> Result<Self, UmError> {
        Ok(Self {
            segments: vec![Some(zeroed(length)?)],
            free: VecDeque::new(),
        })
    }

    fn segment(&self, id: u32) -> Result<&Segment, UmError> {
        self.segments
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(UmError::UnmappedSegmentAccess(id))
    }

    fn segment_mut(&mut self, id: u32) -> Result<&mut Segment, UmError> {
        self.segments
            .get_mut(id as usize)
            .and_then(Option::as_mut)
            .ok_or(UmError::UnmappedSegmentAccess(id))
    }

    /// Maps a zero-filled segment of `length` words, reusing the oldest freed
    /// id if there is one.
    pub fn map(&mut self, length: u32) -> Result<u32, UmError> {
        let segment = zeroed(length)?;
        let id = match self.free.pop_front() {
            Some(id) => {
                self.segments[id as usize] = Some(segment);
                id
            }
            None => {
                // Ids must stay addressable from a 32-bit register
                let id = u32::try_from(self.segments.len())
                    .map_err(|_| UmError::AllocationFailure(length))?;
                self.segments
                    .try_reserve(1)
                    .map_err(|_| UmError::AllocationFailure(length))?;
                self.segments.push(Some(segment));
                id
            }
        };
        debug!("mapped segment {} ({} words)", id, length);
        Ok(id)
    }

    pub fn unmap(&mut self, id: u32) -> Result<(), UmError> {
        if id == 0 {
            return Err(UmError::InvalidUnmap);
        }
        match self.segments.get_mut(id as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.free.push_back(id);
                debug!("unmapped segment {}", id);
                Ok(())
            }
            _ => Err(UmError::UnmappedSegmentAccess(id)),
        }
    }

    pub fn read(&self, id: u32, offset: u32) -> Result<u32, UmError> {
        let segment = self.segment(id)?;
        segment
            .get(offset as usize)
            .copied()
            .ok_or(UmError::OutOfBoundsOffset {
                segment: id,
                offset,
                length: segment.len(),
            })
    }

    pub fn write(&mut self, id: u32, offset: u32, value: u32) -> Result<(), UmError> {
        let segment = self.segment_mut(id)?;
        let length = segment.len();
        let word = segment
            .get_mut(offset as usize)
            .ok_or(UmError::OutOfBoundsOffset {
                segment: id,
                offset,
                length,
            })?;
        *word = value;
        Ok(())
    }

    /// Length in words of a live segment.
    pub fn len(&self, id: u32) -> Result<usize, UmError> {
        Ok(self.segment(id)?.len())
    }

    /// Independent copy of the segment at `id`.
    pub fn duplicate(&self, id: u32) -> Result<Segment, UmError> {
        let source = self.segment(id)?;
        let mut copy: Vec<u32> = Vec::new();
        copy.try_reserve_exact(source.len())
            .map_err(|_| UmError::AllocationFailure(source.len() as u32))?;
        copy.extend_from_slice(source);
        Ok(copy.into_boxed_slice())
    }

    /// Drops the current program segment and installs `contents` as segment 0.
    pub fn replace_zero(&mut self, contents: Segment) {
        trace!("segment 0 replaced ({} words)", contents.len());
        self.segments[0] = Some(contents);
    }

    pub fn mapped_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_some()).count()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}
