use crate::source::{DecodeError, FrameSource};
use std::num::NonZeroU32;

/// One sampled frame: its zero-based position in the source and its
/// JPEG-encoded pixels.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub ordinal: u64,
    pub image_data: Vec<u8>,
}

/// Yields every Nth frame of an underlying source, in ascending ordinal
/// order. Lazy and forward-only; the decode cursor is consumed, so a
/// sampler cannot be restarted.
pub struct FrameSampler<S> {
    source: S,
    interval: NonZeroU32,
    next_ordinal: u64,
    exhausted: bool,
}

impl<S: FrameSource> FrameSampler<S> {
    pub fn new(source: S, interval: NonZeroU32) -> Self {
        Self {
            source,
            interval,
            next_ordinal: 0,
            exhausted: false,
        }
    }

    /// Advances to the next sampled frame. `Ok(None)` once the source is
    /// exhausted; `Err` if the source failed mid-stream, after which the
    /// sampler yields nothing further.
    pub fn next_sample(&mut self) -> Result<Option<SampledFrame>, DecodeError> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            };
            let ordinal = self.next_ordinal;
            self.next_ordinal += 1;
            if ordinal % u64::from(self.interval.get()) == 0 {
                return Ok(Some(SampledFrame {
                    ordinal,
                    image_data: frame,
                }));
            }
        }
    }
}
