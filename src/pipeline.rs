//! Wiring of the external collaborators around an [`ObservationStore`].
//!
//! Detection, visual tracking and drawing are provided by the host through
//! the [`Detector`], [`Tracker`] and [`Renderer`] traits. [`Pipeline`] owns
//! one of each plus the store and runs the two loops of an overlay:
//! an on-demand detection pass ([`Pipeline::detect`]) and a per-frame
//! tracking pass ([`Pipeline::track`]).

use crate::config::TrackingLevel;
use crate::error::TrackError;
use crate::identity::Identity;
use crate::object::Detection;
use crate::rect::{NormalizedRect, PixelRect, Size};
use crate::store::ObservationStore;
use log::{debug, trace};
use num::Float;
use std::fmt::Debug;

/// Finds objects in a frame.
pub trait Detector<F, T>
where
    T: Debug + Float + 'static,
{
    fn detect(&mut self, frame: &F) -> Vec<Detection<T>>;
}

/// Follows one object from its previous rect into `frame`.
pub trait Tracker<F, T>
where
    T: Debug + Float + 'static,
{
    /// `None` when the object could not be followed in this frame.
    fn track(
        &mut self,
        identity: Identity,
        previous: &NormalizedRect<T>,
        frame: &F,
        level: TrackingLevel,
    ) -> Option<NormalizedRect<T>>;
}

/// Draws overlay rects.
pub trait Renderer<T>
where
    T: Debug + Float + 'static,
{
    fn draw(&mut self, rects: &[PixelRect<T>]);
}

impl<F, T, Func> Detector<F, T> for Func
where
    T: Debug + Float + 'static,
    Func: FnMut(&F) -> Vec<Detection<T>>,
{
    fn detect(&mut self, frame: &F) -> Vec<Detection<T>> {
        self(frame)
    }
}

impl<T, Func> Renderer<T> for Func
where
    T: Debug + Float + 'static,
    Func: FnMut(&[PixelRect<T>]),
{
    fn draw(&mut self, rects: &[PixelRect<T>]) {
        self(rects)
    }
}

/*------------------------------------------------------------------------------
Pipeline struct
------------------------------------------------------------------------------*/
pub struct Pipeline<D, K, T>
where
    T: Debug + Float + 'static,
{
    detector: D,
    tracker: K,
    store: ObservationStore<T>,
}

impl<D, K, T> Pipeline<D, K, T>
where
    T: Debug + Float + 'static,
{
    pub fn new(detector: D, tracker: K, store: ObservationStore<T>) -> Self {
        Self {
            detector,
            tracker,
            store,
        }
    }

    pub fn store(&self) -> &ObservationStore<T> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObservationStore<T> {
        &mut self.store
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker_mut(&mut self) -> &mut K {
        &mut self.tracker
    }

    /// Run the detector on `frame` and store every detection above the
    /// configured threshold under a fresh identity.
    ///
    /// Returns the identities that were stored.
    pub fn detect<F>(&mut self, frame: &F) -> Vec<Identity>
    where
        D: Detector<F, T>,
    {
        let detections = self.detector.detect(frame);
        let total = detections.len();
        let accepted: Vec<Identity> = detections
            .into_iter()
            .filter_map(|detection| {
                let identity = Identity::new();
                self.store
                    .on_detected(identity, detection.rect, detection.prob)
                    .then_some(identity)
            })
            .collect();
        debug!("detection pass: {} of {} accepted", accepted.len(), total);
        accepted
    }

    /// Track every stored object into `frame`, apply the results and close
    /// the frame.
    ///
    /// Returns the identities evicted when the frame was closed.
    pub fn track<F>(&mut self, frame: &F) -> Vec<Identity>
    where
        K: Tracker<F, T>,
    {
        let level = self.store.config().tracking_level;
        for (identity, previous) in self.store.observations() {
            match self.tracker.track(identity, &previous, frame, level) {
                Some(rect) => {
                    self.store.on_tracking_update(identity, rect);
                }
                None => trace!("tracker lost {}", identity),
            }
        }
        self.store.end_frame()
    }

    /// Hand the current rects to `renderer`.
    pub fn render<R>(&self, renderer: &mut R)
    where
        R: Renderer<T>,
    {
        renderer.draw(&self.store.snapshot());
    }

    pub fn resize(&mut self, surface: Size<T>) -> Result<(), TrackError> {
        self.store.set_surface_size(surface)
    }

    pub fn reset(&mut self) {
        self.store.reset()
    }
}
