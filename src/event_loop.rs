//! Single-consumer front-end: one worker thread owns the store and applies
//! events in arrival order.
//!
//! Producers hold an [`EventSender`] and never touch the store directly.
//! After every drained batch the worker publishes the current snapshot,
//! which readers fetch without waiting for the worker.

use crate::error::TrackError;
use crate::identity::Identity;
use crate::rect::{NormalizedRect, PixelRect, Size};
use crate::store::{ObservationStore, StoreEvent};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, warn};
use num::Float;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum Message<T>
where
    T: Debug + Float + 'static,
{
    Event(StoreEvent<T>),
    Flush(Sender<()>),
    Shutdown,
}

struct Published<T>
where
    T: Debug + Float + 'static,
{
    generation: AtomicU64,
    snapshot: RwLock<Vec<PixelRect<T>>>,
}

/*------------------------------------------------------------------------------
EventSender struct
------------------------------------------------------------------------------*/

/// Cloneable producer handle of an [`EventLoop`].
pub struct EventSender<T>
where
    T: Debug + Float + 'static,
{
    tx: Sender<Message<T>>,
    published: Arc<Published<T>>,
}

impl<T> Clone for EventSender<T>
where
    T: Debug + Float + 'static,
{
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            published: Arc::clone(&self.published),
        }
    }
}

impl<T> EventSender<T>
where
    T: Debug + Float + 'static,
{
    /// Generation new events are stamped with. Read it before starting a
    /// detection or tracking pass and hand it back with the result.
    pub fn generation(&self) -> u64 {
        self.published.generation.load(Ordering::Acquire)
    }

    pub fn send(&self, event: StoreEvent<T>) -> Result<(), TrackError> {
        let is_reset = matches!(event, StoreEvent::Reset);
        self.tx
            .send(Message::Event(event))
            .map_err(|_| TrackError::Disconnected)?;
        if is_reset {
            self.published.generation.fetch_add(1, Ordering::AcqRel);
        }
        Ok(())
    }

    pub fn detected(
        &self,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
    ) -> Result<(), TrackError> {
        self.detected_at(self.generation(), identity, rect, confidence)
    }

    pub fn detected_at(
        &self,
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
        confidence: f32,
    ) -> Result<(), TrackError> {
        self.send(StoreEvent::Detected {
            generation,
            identity,
            rect,
            confidence,
        })
    }

    pub fn tracking_update(&self, identity: Identity, rect: NormalizedRect<T>) -> Result<(), TrackError> {
        self.tracking_update_at(self.generation(), identity, rect)
    }

    pub fn tracking_update_at(
        &self,
        generation: u64,
        identity: Identity,
        rect: NormalizedRect<T>,
    ) -> Result<(), TrackError> {
        self.send(StoreEvent::TrackingUpdate {
            generation,
            identity,
            rect,
        })
    }

    pub fn end_frame(&self) -> Result<(), TrackError> {
        self.send(StoreEvent::EndFrame)
    }

    pub fn resize(&self, surface: Size<T>) -> Result<(), TrackError> {
        self.send(StoreEvent::Resize(surface))
    }

    pub fn reset(&self) -> Result<(), TrackError> {
        self.send(StoreEvent::Reset)
    }

    /// Most recently published snapshot.
    pub fn snapshot(&self) -> Vec<PixelRect<T>> {
        self.published.snapshot.read().clone()
    }

    /// Block until every event sent before this call has been applied and
    /// its snapshot published.
    pub fn flush(&self) -> Result<(), TrackError> {
        let (ack_tx, ack_rx) = bounded(1);
        self.tx
            .send(Message::Flush(ack_tx))
            .map_err(|_| TrackError::Disconnected)?;
        ack_rx.recv().map_err(|_| TrackError::Disconnected)
    }
}

/*------------------------------------------------------------------------------
EventLoop struct
------------------------------------------------------------------------------*/
pub struct EventLoop<T>
where
    T: Debug + Float + Send + Sync + 'static,
{
    sender: EventSender<T>,
    worker: Option<JoinHandle<ObservationStore<T>>>,
}

impl<T> EventLoop<T>
where
    T: Debug + Float + Send + Sync + 'static,
{
    /// Move `store` onto a new worker thread.
    pub fn spawn(store: ObservationStore<T>) -> Result<Self, TrackError> {
        let (tx, rx) = unbounded();
        let published = Arc::new(Published {
            generation: AtomicU64::new(store.generation()),
            snapshot: RwLock::new(store.snapshot()),
        });

        let worker_published = Arc::clone(&published);
        let worker = thread::Builder::new()
            .name("boxtrack-store".to_string())
            .spawn(move || run(store, rx, worker_published))?;

        Ok(Self {
            sender: EventSender { tx, published },
            worker: Some(worker),
        })
    }

    pub fn sender(&self) -> EventSender<T> {
        self.sender.clone()
    }

    pub fn snapshot(&self) -> Vec<PixelRect<T>> {
        self.sender.snapshot()
    }

    /// Stop the worker once the events already queued are applied and
    /// return the store. Senders still alive get
    /// [`TrackError::Disconnected`] from then on.
    pub fn shutdown(mut self) -> Result<ObservationStore<T>, TrackError> {
        self.stop().ok_or(TrackError::Disconnected)
    }

    fn stop(&mut self) -> Option<ObservationStore<T>> {
        let worker = self.worker.take()?;
        let _ = self.sender.tx.send(Message::Shutdown);
        match worker.join() {
            Ok(store) => Some(store),
            Err(_) => {
                warn!("observation store worker panicked");
                None
            }
        }
    }
}

impl<T> Drop for EventLoop<T>
where
    T: Debug + Float + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<T>(
    mut store: ObservationStore<T>,
    rx: Receiver<Message<T>>,
    published: Arc<Published<T>>,
) -> ObservationStore<T>
where
    T: Debug + Float + 'static,
{
    while let Ok(first) = rx.recv() {
        let mut dirty = false;
        let mut acks = Vec::new();
        let mut shutdown = false;

        for message in std::iter::once(first).chain(rx.try_iter()) {
            match message {
                Message::Event(event) => dirty |= store.apply(event),
                Message::Flush(ack) => acks.push(ack),
                Message::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }

        if dirty {
            *published.snapshot.write() = store.snapshot();
        }
        for ack in acks {
            let _ = ack.send(());
        }
        if shutdown {
            break;
        }
    }
    debug!("observation store worker stopped at generation {}", store.generation());
    store
}
