//! Frame-driven playback.
//!
//! A [`PlaybackDriver`] walks a [`FrameRange`] one frame per call to
//! [`tick`](PlaybackDriver::tick). The host calls `tick` once per drawn
//! frame, so playback never runs ahead of rendering. Cancellation goes
//! through a shared [`CancellationToken`] that is checked before every
//! frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Inclusive range of frame indices walked forward or backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    start: usize,
    end: usize,
}

impl FrameRange {
    /// Frames `start, start + 1, ..., last`.
    pub fn forward(start: usize, last: usize) -> Self {
        Self {
            start: start.min(last),
            end: last,
        }
    }

    /// Frames `start, start - 1, ..., 0`.
    pub fn reverse(start: usize) -> Self {
        Self { start, end: 0 }
    }

    /// First frame played.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last frame played.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Whether frames are walked toward zero.
    pub fn is_reverse(&self) -> bool {
        self.end < self.start
    }

    /// Number of frames in the range.
    pub fn len(&self) -> usize {
        self.start.abs_diff(self.end) + 1
    }

    /// Always `false`; a range holds at least its start frame.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn after(&self, index: usize) -> Option<usize> {
        if index == self.end {
            None
        } else if self.is_reverse() {
            Some(index - 1)
        } else {
            Some(index + 1)
        }
    }
}

/// Shared cancel flag for a running [`PlaybackDriver`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One frame handed out by [`PlaybackDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Frame index to show.
    pub index: usize,
    /// Whether this is the first frame of the range.
    pub first: bool,
    /// Whether this is the last frame of the range.
    pub last: bool,
}

/// Walks a frame range one tick at a time until done or cancelled.
#[derive(Debug)]
pub struct PlaybackDriver {
    range: FrameRange,
    next: Option<usize>,
    token: CancellationToken,
}

impl PlaybackDriver {
    /// A driver positioned before the range's first frame, and the token
    /// that cancels it.
    pub fn new(range: FrameRange) -> (Self, CancellationToken) {
        let token = CancellationToken::new();
        let driver = Self {
            range,
            next: Some(range.start),
            token: token.clone(),
        };
        (driver, token)
    }

    /// The range being played.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Advance to the next frame. Returns `None` once the range is
    /// exhausted or the token has been cancelled.
    pub fn tick(&mut self) -> Option<FrameTick> {
        if self.token.is_cancelled() {
            self.next = None;
            return None;
        }
        let index = self.next?;
        self.next = self.range.after(index);
        Some(FrameTick {
            index,
            first: index == self.range.start,
            last: self.next.is_none(),
        })
    }

    /// Whether more frames remain and the driver was not cancelled.
    pub fn is_active(&self) -> bool {
        self.next.is_some() && !self.token.is_cancelled()
    }

    /// Cancel this driver through its own token.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(driver: &mut PlaybackDriver) -> Vec<FrameTick> {
        std::iter::from_fn(|| driver.tick()).collect()
    }

    #[test]
    fn forward_visits_each_frame_once() {
        let (mut driver, _) = PlaybackDriver::new(FrameRange::forward(2, 5));
        let ticks = drain(&mut driver);
        let indices: Vec<usize> = ticks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![2, 3, 4, 5]);
        assert!(ticks[0].first && !ticks[0].last);
        assert!(ticks[3].last && !ticks[3].first);
        assert!(!driver.is_active());
        assert_eq!(driver.tick(), None);
    }

    #[test]
    fn reverse_ends_at_zero() {
        let (mut driver, _) = PlaybackDriver::new(FrameRange::reverse(3));
        let indices: Vec<usize> = drain(&mut driver).iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![3, 2, 1, 0]);
    }

    #[test]
    fn single_frame_is_first_and_last() {
        let (mut driver, _) = PlaybackDriver::new(FrameRange::forward(7, 7));
        assert_eq!(
            driver.tick(),
            Some(FrameTick {
                index: 7,
                first: true,
                last: true
            })
        );
        assert_eq!(driver.tick(), None);
    }

    #[test]
    fn cancel_takes_effect_before_next_tick() {
        let (mut driver, token) = PlaybackDriver::new(FrameRange::forward(0, 10));
        assert!(driver.tick().is_some());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(driver.tick(), None);
        assert!(!driver.is_active());
    }

    #[test]
    fn range_lengths() {
        assert_eq!(FrameRange::forward(0, 50).len(), 51);
        assert_eq!(FrameRange::forward(60, 50).len(), 1);
        assert_eq!(FrameRange::reverse(4).len(), 5);
        assert!(FrameRange::reverse(4).is_reverse());
        assert!(!FrameRange::forward(0, 4).is_reverse());
    }
}
