//! Virtual camera input.
//!
//! Renders the test pattern at a fixed frame rate on a dedicated thread and
//! hands each frame to the `FrameCallback`. Frame size and mirroring follow
//! the shared `StreamFormat` written by the output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use camera_capture_core::models::camera_models::CaptureDevice;
use camera_capture_core::models::error::CaptureError;
use camera_capture_core::models::frame::RawFrame;
use camera_capture_core::traits::capture_provider::{CaptureInput, FrameCallback};

use crate::pattern::{self, PATTERN_FORMAT};
use crate::video_output::StreamFormat;

pub struct VirtualCameraInput {
    device: CaptureDevice,
    format: Arc<RwLock<StreamFormat>>,
    frame_interval: Duration,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl VirtualCameraInput {
    pub fn new(device: CaptureDevice, format: Arc<RwLock<StreamFormat>>, fps: u32) -> Self {
        Self {
            device,
            format,
            frame_interval: Duration::from_secs(1) / fps.max(1),
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl CaptureInput for VirtualCameraInput {
    fn device(&self) -> &CaptureDevice {
        &self.device
    }

    fn start(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::ProductionFailed(format!(
                "{} is already producing",
                self.device.id
            )));
        }

        let running = Arc::clone(&self.running);
        let format = Arc::clone(&self.format);
        let interval = self.frame_interval;
        let tint = pattern::tint_for(&self.device.id);

        let handle = thread::Builder::new()
            .name("virtual-camera-capture".into())
            .spawn(move || capture_loop(running, format, interval, tint, callback))
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CaptureError::ProductionFailed(format!("failed to spawn capture thread: {}", e))
            })?;

        *self.capture_handle.lock() = Some(handle);
        log::debug!("virtual camera {} started", self.device.id);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
            log::debug!("virtual camera {} stopped", self.device.id);
        }
        Ok(())
    }
}

impl Drop for VirtualCameraInput {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn capture_loop(
    running: Arc<AtomicBool>,
    format: Arc<RwLock<StreamFormat>>,
    interval: Duration,
    tint: u8,
    callback: FrameCallback,
) {
    let mut index = 0u64;
    let mut next = Instant::now();

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now < next {
            thread::sleep(next - now);
            continue;
        }
        next += interval;

        let current = *format.read();
        let (width, height) = current.frame_size();
        let mut data = pattern::render(width, height, index, tint);
        if current.mirrored {
            mirror_rows(&mut data, width as usize);
        }

        callback(RawFrame::new(width, height, PATTERN_FORMAT, data));
        index += 1;
    }
}

/// Flip each row of a 4-byte-per-pixel buffer horizontally.
fn mirror_rows(data: &mut [u8], width: usize) {
    if width == 0 {
        return;
    }
    for row in data.chunks_exact_mut(width * 4) {
        let mut pixels: Vec<[u8; 4]> = row
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect();
        pixels.reverse();
        for (dst, src) in row.chunks_exact_mut(4).zip(pixels) {
            dst.copy_from_slice(&src);
        }
    }
}
