use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

/// Outcome of a single [`AnimationLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule another frame.
    Continue,
    /// The loop has been stopped; do not schedule again.
    Stopped,
}

/// Cloneable switch that stops an [`AnimationLoop`] from anywhere.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Drives a per-frame callback.
///
/// The platform layer owns scheduling: it asks for the next display refresh
/// only while [`tick`](Self::tick) answers [`FrameStatus::Continue`]. Calling
/// [`LoopHandle::stop`] ends the loop before the next frame runs; a frame that
/// returns an error stops the loop as well.
#[derive(Debug)]
pub struct AnimationLoop {
    handle: LoopHandle,
    frames: u64,
    frame_limit: Option<u64>,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self {
            handle: LoopHandle {
                running: Arc::new(AtomicBool::new(true)),
            },
            frames: 0,
            frame_limit: None,
        }
    }

    /// Stops the loop on its own after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Runs one frame if the loop is still active.
    pub fn tick<F>(&mut self, frame: F) -> Result<FrameStatus>
    where
        F: FnOnce() -> Result<()>,
    {
        if !self.handle.is_running() {
            return Ok(FrameStatus::Stopped);
        }
        if let Err(err) = frame() {
            self.handle.stop();
            return Err(err);
        }
        self.frames += 1;
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            self.handle.stop();
        }
        Ok(if self.handle.is_running() {
            FrameStatus::Continue
        } else {
            FrameStatus::Stopped
        })
    }
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn runs_until_stopped() {
        let mut animation = AnimationLoop::new();
        let handle = animation.handle();
        let mut calls = 0;
        assert_eq!(
            animation.tick(|| {
                calls += 1;
                Ok(())
            }).unwrap(),
            FrameStatus::Continue
        );
        handle.stop();
        assert_eq!(
            animation.tick(|| {
                calls += 1;
                Ok(())
            }).unwrap(),
            FrameStatus::Stopped
        );
        assert_eq!(calls, 1);
        assert_eq!(animation.frames(), 1);
    }

    #[test]
    fn frame_limit_stops_after_last_frame() {
        let mut animation = AnimationLoop::new().with_frame_limit(3);
        let mut statuses = Vec::new();
        while animation.is_running() {
            statuses.push(animation.tick(|| Ok(())).unwrap());
        }
        assert_eq!(
            statuses,
            vec![
                FrameStatus::Continue,
                FrameStatus::Continue,
                FrameStatus::Stopped
            ]
        );
        assert_eq!(animation.frames(), 3);
    }

    #[test]
    fn failing_frame_stops_the_loop() {
        let mut animation = AnimationLoop::new();
        assert!(animation.tick(|| Err(anyhow!("device lost"))).is_err());
        assert!(!animation.is_running());
        assert_eq!(animation.frames(), 0);
    }

    #[test]
    fn handles_share_state() {
        let animation = AnimationLoop::new();
        let first = animation.handle();
        let second = animation.handle();
        second.stop();
        assert!(!first.is_running());
    }
}
