//! Keyed table of the objects currently drawn over the surface.
//!
//! The store is fed two kinds of events. Detections create entries, gated
//! on confidence. Tracking updates move existing entries and are ignored
//! for identities the store does not know. Each stored object keeps its
//! vision-space rect and the surface rect resolved from it, so rendering
//! never has to touch the mapper.
//!
//! Frames are closed with [`ObservationStore::end_frame`], which drives the
//! eviction policy: an object that goes more than
//! [`StoreConfig::max_missed_updates`] closed frames without an update is
//! dropped. [`ObservationStore::reset`] clears everything and bumps the
//! session generation so late events from the previous session can be
//! recognised and discarded.

use crate::config::StoreConfig;
use crate::error::TrackError;
use crate::identity::Identity;
use crate::mapper::CoordinateMapper;
use crate::object::TrackedObject;
use crate::rect::{NormalizedRect, PixelRect, Size};
use log::{debug, info, trace};
use num::Float;
use std::collections::HashMap;
use std::fmt::Debug;

/*------------------------------------------------------------------------------
StoreEvent enum
------------------------------------------------------------------------------*/

/// Message form of the store operations, for channel based front-ends.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent<T>
where
    T: Debug + Float + 'static,
{
    Detected {
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
    },
    TrackingUpdate {
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
    },
    EndFrame,
    Resize(Size<T>),
    Reset,
}

/*------------------------------------------------------------------------------
ObservationStore struct
------------------------------------------------------------------------------*/
#[derive(Debug, Clone)]
pub struct ObservationStore<T>
where
    T: Debug + Float + 'static,
{
    config: StoreConfig,
    mapper: CoordinateMapper,
    surface: Size<T>,

    generation: u64,
    frame_id: usize,

    objects: HashMap<Identity, TrackedObject<T>>,
}

impl<T> ObservationStore<T>
where
    T: Debug + Float + 'static,
{
    /// Create an empty store drawing into a surface of `surface` size.
    ///
    /// # Example
    /// ```
    /// use boxtrack_rs::{config::StoreConfig, rect::Size, store::ObservationStore};
    /// let store = ObservationStore::new(StoreConfig::default(), Size::new(390.0f32, 844.0)).unwrap();
    /// assert!(store.is_empty());
    /// ```
    pub fn new(config: StoreConfig, surface: Size<T>) -> Result<Self, TrackError> {
        config.validate()?;
        validate_surface(&surface)?;
        Ok(Self {
            mapper: config.mapper(),
            config,
            surface,
            generation: 0,
            frame_id: 0,
            objects: HashMap::new(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn mapper(&self) -> CoordinateMapper {
        self.mapper
    }

    pub fn surface(&self) -> Size<T> {
        self.surface
    }

    /// Session generation; starts at zero and grows by one per reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of frames closed in the current session.
    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.objects.contains_key(identity)
    }

    pub fn get(&self, identity: &Identity) -> Option<&TrackedObject<T>> {
        self.objects.get(identity)
    }

    /// Store a detection scored against the configured threshold.
    pub fn on_detected(
        &mut self,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
    ) -> bool {
        let threshold = self.config.confidence_threshold;
        self.on_detected_with_threshold(identity, rect, confidence, threshold)
    }

    /// Store a detection if `confidence > threshold`.
    ///
    /// An existing entry under the same identity is overwritten. Returns
    /// whether the detection was stored.
    pub fn on_detected_with_threshold(
        &mut self,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
        threshold: f32,
    ) -> bool {
        // NaN fails this comparison and is dropped with the rest
        if !(confidence > threshold) {
            debug!(
                "dropping detection {}: confidence {} <= threshold {}",
                identity, confidence, threshold
            );
            return false;
        }

        let rect = self.prepare(rect);
        let resolved = self.mapper.map(&rect, &self.surface);
        let object = TrackedObject::new(identity, rect, resolved, confidence, self.generation);
        if self.objects.insert(identity, object).is_some() {
            debug!("detection {} replaced an existing entry", identity);
        } else {
            trace!("detected {} with confidence {}", identity, confidence);
        }
        true
    }

    /// [`on_detected`](Self::on_detected) for an event stamped with the
    /// session generation it was produced in.
    pub fn on_detected_at(
        &mut self,
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
    ) -> bool {
        if !self.is_current(generation, &identity) {
            return false;
        }
        self.on_detected(identity, rect, confidence)
    }

    /// Move a known object to `rect` and re-resolve its surface rect.
    ///
    /// Updates for identities that are not stored are dropped. Returns
    /// whether the update was applied.
    pub fn on_tracking_update(&mut self, identity: Identity, rect: NormalizedRect<T>) -> bool {
        let rect = self.prepare(rect);
        let resolved = self.mapper.map(&rect, &self.surface);
        match self.objects.get_mut(&identity) {
            Some(object) => {
                object.update(rect, resolved);
                trace!("updated {} to {:?}", identity, resolved);
                true
            }
            None => {
                debug!("dropping tracking update for unknown {}", identity);
                false
            }
        }
    }

    /// [`on_tracking_update`](Self::on_tracking_update) for an event
    /// stamped with the session generation it was produced in.
    pub fn on_tracking_update_at(
        &mut self,
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
    ) -> bool {
        if !self.is_current(generation, &identity) {
            return false;
        }
        self.on_tracking_update(identity, rect)
    }

    /// Close the current frame and evict objects that stayed without an
    /// update for too long. Returns the evicted identities.
    pub fn end_frame(&mut self) -> Vec<Identity> {
        self.frame_id += 1;

        let max_missed = self.config.max_missed_updates;
        let mut evicted = Vec::new();
        self.objects.retain(|identity, object| {
            if object.close_frame() > max_missed {
                evicted.push(*identity);
                false
            } else {
                true
            }
        });

        if !evicted.is_empty() {
            info!(
                "frame {}: evicted {} lost object(s), {} remaining",
                self.frame_id,
                evicted.len(),
                self.objects.len()
            );
        }
        evicted
    }

    /// Change the surface size and re-resolve every stored object.
    ///
    /// Invalid sizes are rejected and leave the store untouched.
    pub fn set_surface_size(&mut self, surface: Size<T>) -> Result<(), TrackError> {
        validate_surface(&surface)?;
        self.surface = surface;
        for object in self.objects.values_mut() {
            let resolved = self.mapper.map(object.last_rect(), &surface);
            object.set_resolved_rect(resolved);
        }
        debug!("surface resized to {:?}", surface);
        Ok(())
    }

    /// Surface rects of every stored object, in no particular order.
    pub fn snapshot(&self) -> Vec<PixelRect<T>> {
        self.objects
            .values()
            .map(|object| *object.resolved_rect())
            .collect()
    }

    /// Copies of every stored object, in no particular order.
    pub fn objects(&self) -> Vec<TrackedObject<T>> {
        self.objects.values().cloned().collect()
    }

    /// Identity and last vision-space rect of every stored object; the
    /// input an external tracker needs for the next frame.
    pub fn observations(&self) -> Vec<(Identity, NormalizedRect<T>)> {
        self.objects
            .iter()
            .map(|(identity, object)| (*identity, *object.last_rect()))
            .collect()
    }

    /// Drop every entry and start a new session generation.
    pub fn reset(&mut self) {
        let dropped = self.objects.len();
        self.objects.clear();
        self.generation += 1;
        self.frame_id = 0;
        info!(
            "store reset: dropped {} object(s), generation {}",
            dropped, self.generation
        );
    }

    /// Apply one event. Returns whether it changed the store.
    pub fn apply(&mut self, event: StoreEvent<T>) -> bool {
        match event {
            StoreEvent::Detected {
                generation,
                identity,
                rect,
                confidence,
            } => self.on_detected_at(generation, identity, rect, confidence),
            StoreEvent::TrackingUpdate {
                generation,
                identity,
                rect,
            } => self.on_tracking_update_at(generation, identity, rect),
            StoreEvent::EndFrame => {
                self.end_frame();
                true
            }
            StoreEvent::Resize(surface) => match self.set_surface_size(surface) {
                Ok(()) => true,
                Err(err) => {
                    debug!("ignoring resize event: {}", err);
                    false
                }
            },
            StoreEvent::Reset => {
                self.reset();
                true
            }
        }
    }

    fn prepare(&self, rect: NormalizedRect<T>) -> NormalizedRect<T> {
        if self.config.clamp_input {
            rect.clamped()
        } else {
            rect
        }
    }

    fn is_current(&self, generation: u64, identity: &Identity) -> bool {
        if generation != self.generation {
            debug!(
                "dropping stale event for {}: generation {} != {}",
                identity, generation, self.generation
            );
            return false;
        }
        true
    }
}

fn validate_surface<T>(surface: &Size<T>) -> Result<(), TrackError>
where
    T: Debug + Float,
{
    if surface.is_valid() {
        Ok(())
    } else {
        Err(TrackError::InvalidSurfaceSize {
            width: surface.width.to_f64().unwrap_or(f64::NAN),
            height: surface.height.to_f64().unwrap_or(f64::NAN),
        })
    }
}
