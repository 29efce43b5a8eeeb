use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;

use crate::models::camera_models::{CaptureDevice, OutputTransform, QualityPreset};
use crate::models::error::CaptureError;
use crate::models::frame::{Frame, RawFrame};
use crate::models::state::SessionState;
use crate::session::graph::ConnectionView;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_provider::FrameCallback;

/// Registration point for the consumer. The caller keeps ownership; clearing
/// the slot stops all further callbacks.
#[derive(Clone, Default)]
pub struct DelegateSlot(Arc<RwLock<Option<Arc<dyn CaptureDelegate>>>>);

impl DelegateSlot {
    pub fn set(&self, delegate: Arc<dyn CaptureDelegate>) {
        *self.0.write() = Some(delegate);
    }

    pub fn clear(&self) {
        self.0.write().take();
    }

    pub fn get(&self) -> Option<Arc<dyn CaptureDelegate>> {
        self.0.read().clone()
    }

    pub fn state_changed(&self, state: SessionState) {
        if let Some(delegate) = self.get() {
            delegate.on_state_changed(state);
        }
    }

    pub fn error(&self, error: &CaptureError) {
        if let Some(delegate) = self.get() {
            delegate.on_error(error);
        }
    }
}

enum SinkMessage {
    Frame {
        device: Arc<CaptureDevice>,
        transform: OutputTransform,
        preset: QualityPreset,
        raw: RawFrame,
    },
    Shutdown,
}

/// Frame delivery worker.
///
/// Inputs push raw frames through callbacks made by `callback_for`, which
/// stamp each with the connection settings live at capture time. A single
/// thread drains them in arrival order and hands them to the delegate.
pub struct FrameSink {
    sender: Sender<SinkMessage>,
    connection: Arc<RwLock<ConnectionView>>,
    delivered: Arc<AtomicU64>,
    worker: Option<thread::JoinHandle<()>>,
}

impl FrameSink {
    pub fn spawn(
        label: &str,
        connection: Arc<RwLock<ConnectionView>>,
        delegate: DelegateSlot,
    ) -> Result<Self, CaptureError> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let delivered = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&delivered);

        let worker = thread::Builder::new()
            .name(label.into())
            .spawn(move || Self::delivery_loop(receiver, delegate, counter))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn delivery thread: {}", e)))?;

        Ok(Self {
            sender,
            connection,
            delivered,
            worker: Some(worker),
        })
    }

    /// Callback handed to an input producing frames for `device`.
    ///
    /// Blocks the producing thread while a structural transaction holds the
    /// connection.
    pub fn callback_for(&self, device: &CaptureDevice) -> FrameCallback {
        let device = Arc::new(device.clone());
        let sender = self.sender.clone();
        let connection = Arc::clone(&self.connection);
        Arc::new(move |raw: RawFrame| {
            let (transform, preset) = {
                let view = connection.read();
                (view.transform, view.preset.clone())
            };
            let _ = sender.send(SinkMessage::Frame {
                device: Arc::clone(&device),
                transform,
                preset,
                raw,
            });
        })
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn delivered_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.delivered)
    }

    fn delivery_loop(receiver: Receiver<SinkMessage>, delegate: DelegateSlot, delivered: Arc<AtomicU64>) {
        let mut sequence = 0u64;
        for message in receiver.iter() {
            let SinkMessage::Frame {
                device,
                transform,
                preset,
                raw,
            } = message
            else {
                break;
            };

            let frame = Frame {
                sequence,
                device,
                transform,
                preset,
                raw,
            };
            sequence += 1;

            if let Some(consumer) = delegate.get() {
                consumer.on_frame(&frame);
            }
            delivered.fetch_add(1, Ordering::Relaxed);
        }
        log::debug!("frame delivery stopped after {} frames", sequence);
    }
}

impl Drop for FrameSink {
    fn drop(&mut self) {
        let _ = self.sender.send(SinkMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}
