//! Stack of saved stream offsets for nested "go elsewhere, then come back" access.

use crate::codec::CodecError;
use std::io::{Seek, SeekFrom};

/// Saved absolute offsets for one stream. Not shared between streams.
#[derive(Debug, Clone, Default)]
pub struct PositionStack {
    saved: Vec<u64>,
}

impl PositionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current offset of `s`, then seek to `target` if given.
    /// With `None` the stream stays put and only a restore point is marked.
    pub fn push<S: Seek + ?Sized>(&mut self, s: &mut S, target: Option<SeekFrom>) -> Result<u64, CodecError> {
        let here = s.stream_position()?;
        let now = match target {
            Some(pos) => s.seek(pos)?,
            None => here,
        };
        self.saved.push(here);
        log::trace!("push {} -> {} (depth {})", here, now, self.saved.len());
        Ok(now)
    }

    /// Seek `s` back to the most recent saved offset and drop it.
    pub fn pop<S: Seek + ?Sized>(&mut self, s: &mut S) -> Result<u64, CodecError> {
        let back = self.saved.pop().ok_or(CodecError::EmptyStack)?;
        log::trace!("pop -> {} (depth {})", back, self.saved.len());
        Ok(s.seek(SeekFrom::Start(back))?)
    }

    /// Offset the next `pop` would return to.
    pub fn peek(&self) -> Option<u64> {
        self.saved.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
