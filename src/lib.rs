pub mod config;
pub mod error;
pub mod event_loop;
pub mod identity;
pub mod mapper;
pub mod object;
pub mod pipeline;
pub mod rect;
pub mod shared;
pub mod store;

#[cfg(test)]
mod test_pipeline;

pub use config::{StoreConfig, TrackingLevel};
pub use error::TrackError;
pub use event_loop::{EventLoop, EventSender};
pub use identity::Identity;
pub use mapper::{remap, CoordinateMapper, HeightSource, VerticalFlip};
pub use object::{Detection, ObjectState, TrackedObject};
pub use pipeline::{Detector, Pipeline, Renderer, Tracker};
pub use rect::{NormalizedRect, PixelRect, Rect, Size};
pub use shared::SharedStore;
pub use store::{ObservationStore, StoreEvent};
