//! Recording doubles for every capability the core consumes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::camera_models::{CameraPosition, CaptureDevice, MediaKind, QualityPreset, VideoRotation};
use crate::models::error::CaptureError;
use crate::models::frame::{Frame, PixelFormat, RawFrame};
use crate::models::state::SessionState;
use crate::traits::authorization::{AuthorizationCallback, AuthorizationProvider, AuthorizationStatus};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_provider::{CaptureInput, CaptureOutput, DeviceProvider, FrameCallback};

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

// --- Authorization ---

enum PromptBehavior {
    Answer(bool),
    Defer,
    Drop,
}

pub struct MockAuthorization {
    status: Mutex<AuthorizationStatus>,
    behavior: PromptBehavior,
    pending: Mutex<Option<AuthorizationCallback>>,
    requests: AtomicUsize,
}

impl MockAuthorization {
    fn build(status: AuthorizationStatus, behavior: PromptBehavior) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            behavior,
            pending: Mutex::new(None),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn with_status(status: AuthorizationStatus) -> Arc<Self> {
        Self::build(status, PromptBehavior::Answer(status == AuthorizationStatus::Authorized))
    }

    /// Undetermined; the prompt answers synchronously.
    pub fn answering(granted: bool) -> Arc<Self> {
        Self::build(AuthorizationStatus::NotDetermined, PromptBehavior::Answer(granted))
    }

    /// Undetermined; the prompt waits for `complete`.
    pub fn deferred() -> Arc<Self> {
        Self::build(AuthorizationStatus::NotDetermined, PromptBehavior::Defer)
    }

    /// Undetermined; the prompt drops its completion.
    pub fn dropping() -> Arc<Self> {
        Self::build(AuthorizationStatus::NotDetermined, PromptBehavior::Drop)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn wait_for_request(&self, timeout: Duration) -> bool {
        wait_until(timeout, || self.pending.lock().is_some())
    }

    pub fn complete(&self, granted: bool) {
        let completion = self.pending.lock().take();
        if let Some(completion) = completion {
            self.record_answer(granted);
            completion(granted);
        }
    }

    fn record_answer(&self, granted: bool) {
        *self.status.lock() = if granted {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
    }
}

impl AuthorizationProvider for MockAuthorization {
    fn status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    fn request_access(&self, completion: AuthorizationCallback) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            PromptBehavior::Answer(granted) => {
                self.record_answer(granted);
                completion(granted);
            }
            PromptBehavior::Defer => *self.pending.lock() = Some(completion),
            PromptBehavior::Drop => drop(completion),
        }
    }
}

// --- Devices ---

#[derive(Debug, Default, Clone)]
pub struct OutputLog {
    pub rotation: Option<VideoRotation>,
    pub mirrored: Option<bool>,
    pub preset: Option<QualityPreset>,
}

pub struct MockOutput {
    rotation_supported: bool,
    mirroring_supported: bool,
    rejected: Arc<Mutex<Vec<String>>>,
    log: Arc<Mutex<OutputLog>>,
}

impl MockOutput {
    pub fn new(rotation_supported: bool, mirroring_supported: bool) -> Self {
        Self {
            rotation_supported,
            mirroring_supported,
            rejected: Arc::new(Mutex::new(Vec::new())),
            log: Arc::new(Mutex::new(OutputLog::default())),
        }
    }

    pub fn rejecting(presets: &[&str]) -> Self {
        let output = Self::new(true, true);
        output.rejected.lock().extend(presets.iter().map(|p| p.to_string()));
        output
    }

    pub fn log(&self) -> Arc<Mutex<OutputLog>> {
        Arc::clone(&self.log)
    }
}

impl CaptureOutput for MockOutput {
    fn supports_rotation(&self) -> bool {
        self.rotation_supported
    }

    fn supports_mirroring(&self) -> bool {
        self.mirroring_supported
    }

    fn set_rotation(&mut self, rotation: VideoRotation) {
        self.log.lock().rotation = Some(rotation);
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.log.lock().mirrored = Some(mirrored);
    }

    fn apply_preset(&mut self, preset: &QualityPreset) -> Result<(), CaptureError> {
        if self.rejected.lock().iter().any(|p| p == preset.as_str()) {
            return Err(CaptureError::PresetRejected(preset.to_string()));
        }
        self.log.lock().preset = Some(preset.clone());
        Ok(())
    }
}

#[derive(Default)]
struct DeviceLog {
    input_creations: AtomicUsize,
    output_creations: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
    active: Mutex<Option<(CaptureDevice, FrameCallback)>>,
}

struct MockInput {
    device: CaptureDevice,
    log: Arc<DeviceLog>,
}

impl CaptureInput for MockInput {
    fn device(&self) -> &CaptureDevice {
        &self.device
    }

    fn start(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        self.log.starts.fetch_add(1, Ordering::SeqCst);
        *self.log.active.lock() = Some((self.device.clone(), callback));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.log.stops.fetch_add(1, Ordering::SeqCst);
        self.log.active.lock().take();
        Ok(())
    }
}

pub struct MockDevices {
    devices: Vec<CaptureDevice>,
    enumeration_fails: AtomicBool,
    failing_inputs: Mutex<HashSet<String>>,
    rejected_presets: Arc<Mutex<Vec<String>>>,
    outputs: Mutex<Vec<Arc<Mutex<OutputLog>>>>,
    log: Arc<DeviceLog>,
}

impl MockDevices {
    pub fn new(devices: Vec<CaptureDevice>) -> Arc<Self> {
        Arc::new(Self {
            devices,
            enumeration_fails: AtomicBool::new(false),
            failing_inputs: Mutex::new(HashSet::new()),
            rejected_presets: Arc::new(Mutex::new(Vec::new())),
            outputs: Mutex::new(Vec::new()),
            log: Arc::new(DeviceLog::default()),
        })
    }

    /// A front camera `front` and a back camera `back`.
    pub fn phone() -> Arc<Self> {
        Self::new(vec![
            CaptureDevice::video("front", "Front Camera", Some(CameraPosition::Front)),
            CaptureDevice::video("back", "Back Camera", Some(CameraPosition::Back)),
        ])
    }

    pub fn device_at(&self, position: CameraPosition) -> Option<CaptureDevice> {
        self.devices.iter().find(|d| d.position == Some(position)).cloned()
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.enumeration_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_input(&self, device_id: &str) {
        self.failing_inputs.lock().insert(device_id.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_inputs.lock().clear();
        self.enumeration_fails.store(false, Ordering::SeqCst);
    }

    pub fn reject_preset(&self, preset: &str) {
        self.rejected_presets.lock().push(preset.to_string());
    }

    pub fn input_creations(&self) -> usize {
        self.log.input_creations.load(Ordering::SeqCst)
    }

    pub fn output_creations(&self) -> usize {
        self.log.output_creations.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.log.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.log.stops.load(Ordering::SeqCst)
    }

    pub fn last_output(&self) -> Option<Arc<Mutex<OutputLog>>> {
        self.outputs.lock().last().cloned()
    }

    pub fn null_callback(&self) -> FrameCallback {
        Arc::new(|_frame: RawFrame| {})
    }

    /// Push a one-pixel frame through the producing input's callback.
    /// Returns the id of the producing device.
    pub fn emit_frame(&self, tag: u8) -> Option<String> {
        let active = self.log.active.lock().clone();
        let (device, callback) = active?;
        callback(RawFrame::new(1, 1, PixelFormat::Rgb8, vec![tag; 3]));
        Some(device.id)
    }
}

impl DeviceProvider for MockDevices {
    fn devices(&self, kind: MediaKind) -> Result<Vec<CaptureDevice>, CaptureError> {
        if self.enumeration_fails.load(Ordering::SeqCst) {
            return Err(CaptureError::Unknown("enumeration failed".into()));
        }
        Ok(self.devices.iter().filter(|d| d.kind == kind).cloned().collect())
    }

    fn create_input(&self, device: &CaptureDevice) -> Result<Box<dyn CaptureInput>, CaptureError> {
        if self.failing_inputs.lock().contains(&device.id) {
            return Err(CaptureError::AttachFailure(format!("{} is busy", device.id)));
        }
        self.log.input_creations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockInput {
            device: device.clone(),
            log: Arc::clone(&self.log),
        }))
    }

    fn create_output(&self) -> Result<Box<dyn CaptureOutput>, CaptureError> {
        self.log.output_creations.fetch_add(1, Ordering::SeqCst);
        let output = MockOutput {
            rotation_supported: true,
            mirroring_supported: true,
            rejected: Arc::clone(&self.rejected_presets),
            log: Arc::new(Mutex::new(OutputLog::default())),
        };
        self.outputs.lock().push(output.log());
        Ok(Box::new(output))
    }
}

// --- Delegate ---

#[derive(Default)]
pub struct RecordingDelegate {
    frames: Mutex<Vec<Frame>>,
    states: Mutex<Vec<SessionState>>,
    errors: Mutex<Vec<CaptureError>>,
    frame_arrived: Condvar,
    paused: Mutex<bool>,
    unpaused: Condvar,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    pub fn states(&self) -> Vec<SessionState> {
        self.states.lock().clone()
    }

    pub fn errors(&self) -> Vec<CaptureError> {
        self.errors.lock().clone()
    }

    /// Block frame callbacks until `release`.
    pub fn pause(&self) {
        *self.paused.lock() = true;
    }

    pub fn release(&self) {
        *self.paused.lock() = false;
        self.unpaused.notify_all();
    }

    pub fn wait_for_frames(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut frames = self.frames.lock();
        while frames.len() < count {
            if self.frame_arrived.wait_until(&mut frames, deadline).timed_out() {
                return frames.len() >= count;
            }
        }
        true
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_frame(&self, frame: &Frame) {
        {
            let mut paused = self.paused.lock();
            while *paused {
                self.unpaused.wait(&mut paused);
            }
        }
        self.frames.lock().push(frame.clone());
        self.frame_arrived.notify_all();
    }

    fn on_state_changed(&self, state: SessionState) {
        self.states.lock().push(state);
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }
}
