//! Mutex-guarded store for hosts where detection and tracking complete on
//! different threads.
//!
//! Each call holds the lock for a single map operation. Rendering goes
//! through [`SharedStore::snapshot`], which copies the rects under the lock
//! and hands them back for drawing after it is released.

use crate::error::TrackError;
use crate::identity::Identity;
use crate::object::TrackedObject;
use crate::rect::{NormalizedRect, PixelRect, Size};
use crate::store::{ObservationStore, StoreEvent};
use num::Float;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Debug)]
pub struct SharedStore<T>
where
    T: Debug + Float + 'static,
{
    inner: Arc<Mutex<ObservationStore<T>>>,
}

impl<T> Clone for SharedStore<T>
where
    T: Debug + Float + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedStore<T>
where
    T: Debug + Float + 'static,
{
    pub fn new(store: ObservationStore<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Current session generation. Producers read it before starting work
    /// and pass it back with the result.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn get(&self, identity: &Identity) -> Option<TrackedObject<T>> {
        self.inner.lock().get(identity).cloned()
    }

    pub fn on_detected(&self, identity: Identity, rect: NormalizedRect<T>, confidence: f32) -> bool {
        self.inner.lock().on_detected(identity, rect, confidence)
    }

    pub fn on_detected_at(
        &self,
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
    ) -> bool {
        self.inner
            .lock()
            .on_detected_at(generation, identity, rect, confidence)
    }

    pub fn on_tracking_update(&self, identity: Identity, rect: NormalizedRect<T>) -> bool {
        self.inner.lock().on_tracking_update(identity, rect)
    }

    pub fn on_tracking_update_at(
        &self,
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
    ) -> bool {
        self.inner
            .lock()
            .on_tracking_update_at(generation, identity, rect)
    }

    pub fn end_frame(&self) -> Vec<Identity> {
        self.inner.lock().end_frame()
    }

    pub fn set_surface_size(&self, surface: Size<T>) -> Result<(), TrackError> {
        self.inner.lock().set_surface_size(surface)
    }

    pub fn apply(&self, event: StoreEvent<T>) -> bool {
        self.inner.lock().apply(event)
    }

    pub fn snapshot(&self) -> Vec<PixelRect<T>> {
        self.inner.lock().snapshot()
    }

    pub fn observations(&self) -> Vec<(Identity, NormalizedRect<T>)> {
        self.inner.lock().observations()
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    /// Run `f` with the lock held. Keep `f` short: no I/O, no drawing.
    pub fn with<R>(&self, f: impl FnOnce(&mut ObservationStore<T>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
