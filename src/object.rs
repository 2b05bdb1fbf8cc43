use crate::identity::Identity;
use crate::rect::{NormalizedRect, PixelRect};
use num::Float;
use std::fmt::Debug;

/*------------------------------------------------------------------------------
Detection struct
------------------------------------------------------------------------------*/

/// One result returned by an external detector.
#[derive(Debug, Clone)]
pub struct Detection<T>
where
    T: Debug + Float + 'static,
{
    pub rect: NormalizedRect<T>,
    pub label: Option<usize>,
    pub prob: f32,
}

impl<T> Detection<T>
where
    T: Debug + Float + 'static,
{
    pub fn new(rect: NormalizedRect<T>, prob: f32, label: Option<usize>) -> Self {
        Self { rect, label, prob }
    }
}

/*------------------------------------------------------------------------------
TrackedObject state enum
------------------------------------------------------------------------------*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Accepted from a detection, no tracking update yet.
    Detected,
    /// Updated by the tracker during the current or the last closed frame.
    Tracked,
    /// At least one closed frame passed without an update.
    Lost,
}

/*------------------------------------------------------------------------------
TrackedObject struct
------------------------------------------------------------------------------*/

/// Best-known position of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject<T>
where
    T: Debug + Float + 'static,
{
    identity: Identity,
    last_rect: NormalizedRect<T>,
    resolved_rect: PixelRect<T>,
    confidence: f32,
    state: ObjectState,
    generation: u64,
    missed_updates: usize,
    update_count: usize,
    touched: bool,
}

impl<T> TrackedObject<T>
where
    T: Debug + Float + 'static,
{
    pub(crate) fn new(
        identity: Identity,
        last_rect: NormalizedRect<T>,
        resolved_rect: PixelRect<T>,
        confidence: f32,
        generation: u64,
    ) -> Self {
        Self {
            identity,
            last_rect,
            resolved_rect,
            confidence,
            state: ObjectState::Detected,
            generation,
            missed_updates: 0,
            update_count: 0,
            touched: true,
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Latest rect in vision space, as reported upstream.
    pub fn last_rect(&self) -> &NormalizedRect<T> {
        &self.last_rect
    }

    /// Latest rect in surface space, ready to draw.
    pub fn resolved_rect(&self) -> &PixelRect<T> {
        &self.resolved_rect
    }

    /// Detection confidence; tracking updates leave it unchanged.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Session generation the object was detected in.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Consecutive closed frames without a tracking update.
    pub fn missed_updates(&self) -> usize {
        self.missed_updates
    }

    /// Tracking updates applied since detection.
    pub fn update_count(&self) -> usize {
        self.update_count
    }

    pub(crate) fn update(&mut self, last_rect: NormalizedRect<T>, resolved_rect: PixelRect<T>) {
        self.last_rect = last_rect;
        self.resolved_rect = resolved_rect;
        self.state = ObjectState::Tracked;
        self.update_count += 1;
        self.touched = true;
    }

    pub(crate) fn set_resolved_rect(&mut self, resolved_rect: PixelRect<T>) {
        self.resolved_rect = resolved_rect;
    }

    /// Close the current frame; returns the updated miss count.
    pub(crate) fn close_frame(&mut self) -> usize {
        if self.touched {
            self.touched = false;
            self.missed_updates = 0;
        } else {
            self.missed_updates += 1;
            self.state = ObjectState::Lost;
        }
        self.missed_updates
    }
}
