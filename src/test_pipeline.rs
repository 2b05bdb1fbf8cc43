/*-----------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------------*/
use crate::config::{StoreConfig, TrackingLevel};
use crate::identity::Identity;
use crate::object::Detection;
use crate::pipeline::{Pipeline, Tracker};
use crate::rect::{NormalizedRect, PixelRect, Rect, Size};
use crate::store::ObservationStore;
use nearly_eq::assert_nearly_eq;
use std::collections::HashMap;

/// Frame carrying what the fake collaborators should report.
struct Frame {
    detections: Vec<(NormalizedRect<f32>, f32)>,
    shift: f32,
}

/// Moves every object right by the frame shift and loses the ones listed.
#[derive(Default)]
struct ShiftTracker {
    lose: Vec<Identity>,
    levels: Vec<TrackingLevel>,
    calls: HashMap<Identity, usize>,
}

impl Tracker<Frame, f32> for ShiftTracker {
    fn track(
        &mut self,
        identity: Identity,
        previous: &NormalizedRect<f32>,
        frame: &Frame,
        level: TrackingLevel,
    ) -> Option<NormalizedRect<f32>> {
        self.levels.push(level);
        *self.calls.entry(identity).or_insert(0) += 1;
        if self.lose.contains(&identity) {
            return None;
        }
        Some(Rect::new(
            previous.x() + frame.shift,
            previous.y(),
            previous.width(),
            previous.height(),
        ))
    }
}

fn detector(frame: &Frame) -> Vec<Detection<f32>> {
    frame
        .detections
        .iter()
        .map(|(rect, prob)| Detection::new(*rect, *prob, None))
        .collect()
}

fn pipeline(
    config: StoreConfig,
) -> Pipeline<fn(&Frame) -> Vec<Detection<f32>>, ShiftTracker, f32> {
    let store = ObservationStore::new(config, Size::new(100.0, 100.0)).unwrap();
    Pipeline::new(
        detector as fn(&Frame) -> Vec<Detection<f32>>,
        ShiftTracker::default(),
        store,
    )
}

fn detect_frame() -> Frame {
    Frame {
        detections: vec![
            (Rect::new(0.1, 0.1, 0.2, 0.2), 0.9),
            (Rect::new(0.5, 0.5, 0.2, 0.2), 0.6),
            (Rect::new(0.7, 0.1, 0.2, 0.2), 0.05),
        ],
        shift: 0.0,
    }
}

#[test]
fn test_detect_gates_on_threshold() {
    let mut pipeline = pipeline(StoreConfig::default().with_confidence_threshold(0.7));
    let accepted = pipeline.detect(&detect_frame());

    assert_eq!(accepted.len(), 1);
    assert_eq!(pipeline.store().len(), 1);
    assert!(pipeline.store().contains(&accepted[0]));
}

#[test]
fn test_detect_assigns_fresh_identities() {
    let mut pipeline = pipeline(StoreConfig::default());
    let first = pipeline.detect(&detect_frame());
    let second = pipeline.detect(&detect_frame());

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert!(first.iter().all(|id| !second.contains(id)));
    assert_eq!(pipeline.store().len(), 4);
}

#[test]
fn test_track_updates_every_object() {
    let config = StoreConfig::default().with_tracking_level(TrackingLevel::Fast);
    let mut pipeline = pipeline(config);
    let ids = pipeline.detect(&detect_frame());

    let evicted = pipeline.track(&Frame {
        detections: Vec::new(),
        shift: 0.1,
    });
    assert!(evicted.is_empty());

    let tracker = pipeline.tracker_mut();
    assert_eq!(tracker.calls.len(), 2);
    assert!(tracker.levels.iter().all(|level| *level == TrackingLevel::Fast));

    for id in ids.iter() {
        let object = pipeline.store().get(id).unwrap();
        assert_eq!(object.update_count(), 1);
    }
    let first = pipeline.store().get(&ids[0]).unwrap();
    assert_nearly_eq!(first.resolved_rect().x(), 20.0, 1e-4);
}

#[test]
fn test_track_evicts_lost_objects() {
    let mut pipeline = pipeline(StoreConfig::default().with_max_missed_updates(1));
    let ids = pipeline.detect(&detect_frame());
    pipeline.tracker_mut().lose.push(ids[1]);

    let frame = Frame {
        detections: Vec::new(),
        shift: 0.0,
    };
    // detection frame: nobody penalised yet
    assert!(pipeline.track(&frame).is_empty());
    assert!(pipeline.track(&frame).is_empty());
    assert_eq!(pipeline.track(&frame), vec![ids[1]]);

    assert_eq!(pipeline.store().len(), 1);
    assert!(pipeline.store().contains(&ids[0]));
}

#[test]
fn test_render_draws_snapshot() {
    let mut pipeline = pipeline(StoreConfig::default());
    pipeline.detect(&detect_frame());

    let mut drawn: Vec<PixelRect<f32>> = Vec::new();
    pipeline.render(&mut |rects: &[PixelRect<f32>]| drawn.extend_from_slice(rects));
    assert_eq!(drawn.len(), 2);
}

#[test]
fn test_reset_and_resize() {
    let mut pipeline = pipeline(StoreConfig::default());
    let ids = pipeline.detect(&detect_frame());

    pipeline.resize(Size::new(200.0, 200.0)).unwrap();
    let object = pipeline.store().get(&ids[0]).unwrap();
    assert_nearly_eq!(object.resolved_rect().x(), 20.0, 1e-4);
    assert!(pipeline.resize(Size::new(0.0, 200.0)).is_err());

    pipeline.reset();
    assert!(pipeline.store().is_empty());

    // tracking after a reset has nothing to follow
    assert!(pipeline
        .track(&Frame {
            detections: Vec::new(),
            shift: 0.1,
        })
        .is_empty());
    assert!(pipeline.tracker_mut().calls.is_empty());
}
