use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::camera_models::{
    CameraPosition, CaptureDevice, CaptureDiagnostics, DeviceOrientation, OutputTransform, QualityPreset,
};
use crate::models::config::CapturerConfiguration;
use crate::models::error::CaptureError;
use crate::models::snapshot::SessionSnapshot;
use crate::models::state::{AuthorizationState, SessionState};
use crate::session::configurator::{SessionConfigurator, SessionStatus};
use crate::session::device_selector::DeviceSelector;
use crate::session::frame_sink::DelegateSlot;
use crate::session::queue::{ConfigurationQueue, OperationHandle, SuspendGate};
use crate::traits::authorization::AuthorizationProvider;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_provider::DeviceProvider;
use crate::traits::capture_session::CaptureSession;

/// Live camera capture session.
///
/// Owns a configuration queue whose worker holds the `SessionConfigurator`,
/// and through it the capture graph and frame delivery worker:
/// ```text
/// API calls / orientation events → [ConfigurationQueue] → [SessionConfigurator] → graph
/// [CaptureInput] → [FrameSink] → CaptureDelegate::on_frame
/// ```
///
/// Accessors return values as of the last completed operation.
pub struct FrameCapturer {
    id: Uuid,
    queue: ConfigurationQueue<SessionConfigurator>,
    selector: DeviceSelector,
    delegate: DelegateSlot,
    status: Arc<RwLock<SessionStatus>>,
    authorization: Arc<RwLock<AuthorizationState>>,
    delivered: Arc<AtomicU64>,
}

impl FrameCapturer {
    pub fn new(
        config: CapturerConfiguration,
        authorization: Arc<dyn AuthorizationProvider>,
        devices: Arc<dyn DeviceProvider>,
    ) -> Result<Self, CaptureError> {
        let gate = SuspendGate::new();
        let label = config.configuration_label.clone();
        let configurator = SessionConfigurator::new(config, authorization, Arc::clone(&devices), Arc::clone(&gate))?;

        let delegate = configurator.delegate_slot();
        let status = configurator.status_handle();
        let authorization = configurator.authorization_handle();
        let delivered = configurator.delivered_counter();
        let queue = ConfigurationQueue::spawn(&label, configurator, gate)?;

        let id = Uuid::new_v4();
        log::debug!("frame capturer {} created", id);

        Ok(Self {
            id,
            queue,
            selector: DeviceSelector::new(devices),
            delegate,
            status,
            authorization,
            delivered,
        })
    }

    /// Like `new`, registering `delegate` before anything is queued.
    pub fn with_delegate(
        config: CapturerConfiguration,
        authorization: Arc<dyn AuthorizationProvider>,
        devices: Arc<dyn DeviceProvider>,
        delegate: Arc<dyn CaptureDelegate>,
    ) -> Result<Self, CaptureError> {
        let capturer = Self::new(config, authorization, devices)?;
        capturer.set_delegate(delegate);
        Ok(capturer)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate.set(delegate);
    }

    pub fn clear_delegate(&self) {
        self.delegate.clear();
    }

    /// Hold configuration operations until a matching `resume`. Frame
    /// delivery keeps running.
    pub fn suspend(&self) {
        self.queue.suspend();
    }

    pub fn resume(&self) {
        self.queue.resume();
    }

    pub fn is_suspended(&self) -> bool {
        self.queue.is_suspended()
    }

    /// Wait until every operation submitted before this call has run.
    pub fn sync(&self) -> Result<(), CaptureError> {
        self.queue.submit(|_| Ok(())).wait()
    }

    pub fn available_devices(&self) -> Result<Vec<CaptureDevice>, CaptureError> {
        self.selector.available_devices()
    }

    pub fn camera_position(&self) -> CameraPosition {
        self.status.read().camera_position
    }

    pub fn quality_preset(&self) -> QualityPreset {
        self.status.read().quality_preset.clone()
    }

    pub fn device_orientation(&self) -> DeviceOrientation {
        self.status.read().device_orientation
    }

    pub fn output_transform(&self) -> OutputTransform {
        self.status.read().output_transform()
    }

    pub fn active_device(&self) -> Option<CaptureDevice> {
        self.status.read().active_device.clone()
    }

    pub fn authorization_state(&self) -> AuthorizationState {
        *self.authorization.read()
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        let mut diagnostics = self.status.read().diagnostics.clone();
        diagnostics.frames_delivered = self.delivered.load(Ordering::Relaxed);
        diagnostics
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let status = self.status.read().clone();
        SessionSnapshot {
            session_id: self.id.to_string(),
            taken_at: chrono::Utc::now().to_rfc3339(),
            state: status.state,
            authorization: self.authorization_state(),
            camera_position: status.camera_position,
            quality_preset: status.quality_preset.clone(),
            device_orientation: status.device_orientation,
            output_transform: status.output_transform(),
            active_device: status.active_device.clone(),
            diagnostics: self.diagnostics(),
        }
    }
}

impl CaptureSession for FrameCapturer {
    fn state(&self) -> SessionState {
        self.status.read().state
    }

    fn configure(&self) -> OperationHandle<()> {
        self.queue.submit(|session| session.configure())
    }

    fn start(&self) -> OperationHandle<()> {
        self.queue.submit(|session| session.start())
    }

    fn stop(&self) -> OperationHandle<()> {
        self.queue.submit(|session| session.stop())
    }

    fn set_camera_position(&self, position: CameraPosition) -> OperationHandle<()> {
        self.queue.submit(move |session| session.set_camera_position(position))
    }

    fn set_quality_preset(&self, preset: QualityPreset) -> OperationHandle<()> {
        self.queue.submit(move |session| session.set_quality_preset(preset))
    }

    fn set_device_orientation(&self, orientation: DeviceOrientation) -> Result<OperationHandle<()>, CaptureError> {
        if !orientation.is_applicable() {
            return Err(CaptureError::InvalidOrientation);
        }
        Ok(self.queue.submit(move |session| session.set_device_orientation(orientation)))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::models::camera_models::VideoRotation;
    use crate::testing::{MockAuthorization, MockDevices, RecordingDelegate};

    const WAIT: Duration = Duration::from_secs(2);

    fn capturer(auth: Arc<MockAuthorization>, devices: Arc<MockDevices>) -> (FrameCapturer, Arc<RecordingDelegate>) {
        let recorder = RecordingDelegate::new();
        let capturer =
            FrameCapturer::with_delegate(CapturerConfiguration::default(), auth, devices, recorder.clone()).unwrap();
        (capturer, recorder)
    }

    #[test]
    fn start_delivers_frames() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));

        capturer.start().wait().unwrap();
        assert_eq!(capturer.state(), SessionState::Running);
        assert_eq!(capturer.authorization_state(), AuthorizationState::Granted);

        for tag in 0..3 {
            devices.emit_frame(tag);
        }
        assert!(recorder.wait_for_frames(3, WAIT));
        let frames = recorder.frames();
        assert!(frames.iter().all(|f| f.device.id == "front" && f.transform.mirrored));
        assert_eq!(capturer.diagnostics().frames_delivered, 3);
    }

    #[test]
    fn double_start_activates_once() {
        let devices = MockDevices::phone();
        let (capturer, _recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));

        capturer.start();
        capturer.start().wait().unwrap();

        assert_eq!(devices.start_count(), 1);
        assert_eq!(capturer.diagnostics().production_activations, 1);
    }

    #[test]
    fn operations_run_in_submission_order() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));

        capturer.configure();
        capturer.start();
        capturer.set_camera_position(CameraPosition::Back);
        capturer.stop();
        capturer.sync().unwrap();

        assert_eq!(capturer.state(), SessionState::Stopped);
        assert_eq!(capturer.active_device().unwrap().id, "back");
        assert_eq!(
            recorder.states(),
            vec![
                SessionState::Configuring,
                SessionState::Configured,
                SessionState::Running,
                SessionState::Stopped
            ]
        );
    }

    #[test]
    fn denied_permission_scenario() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(false), Arc::clone(&devices));

        assert_eq!(capturer.configure().wait(), Err(CaptureError::PermissionDenied));
        assert_eq!(capturer.state(), SessionState::Unconfigured);

        assert_eq!(capturer.start().wait(), Err(CaptureError::PermissionDenied));
        assert_eq!(capturer.state(), SessionState::Unconfigured);
        assert_eq!(devices.input_creations(), 0);
        assert_eq!(devices.output_creations(), 0);
        assert!(capturer.active_device().is_none());
        assert!(recorder.frames().is_empty());
    }

    #[test]
    fn permission_prompt_suspends_queue() {
        let devices = MockDevices::phone();
        let auth = MockAuthorization::deferred();
        let (capturer, _recorder) = capturer(Arc::clone(&auth), Arc::clone(&devices));

        let configured = capturer.configure();
        let moved = capturer.set_camera_position(CameraPosition::Back);
        assert!(auth.wait_for_request(WAIT));
        assert!(capturer.is_suspended());
        assert_eq!(capturer.authorization_state(), AuthorizationState::Requesting);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(capturer.state(), SessionState::Configuring);
        assert_eq!(capturer.camera_position(), CameraPosition::Front);

        auth.complete(true);
        configured.wait().unwrap();
        moved.wait().unwrap();

        assert!(!capturer.is_suspended());
        assert_eq!(capturer.active_device().unwrap().id, "back");
        assert_eq!(devices.input_creations(), 2);
    }

    #[test]
    fn other_orientation_rejected_synchronously() {
        let devices = MockDevices::phone();
        let (capturer, _recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.configure().wait().unwrap();

        assert!(matches!(
            capturer.set_device_orientation(DeviceOrientation::Other),
            Err(CaptureError::InvalidOrientation)
        ));
        capturer
            .set_device_orientation(DeviceOrientation::LandscapeLeft)
            .unwrap()
            .wait()
            .unwrap();

        assert_eq!(capturer.device_orientation(), DeviceOrientation::LandscapeLeft);
        assert_eq!(capturer.output_transform().rotation, VideoRotation::LandscapeRight);
    }

    #[test]
    fn quality_change_while_running_keeps_delivery() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.start().wait().unwrap();
        devices.emit_frame(1);

        capturer.set_quality_preset(QualityPreset::new("q2")).wait().unwrap();
        devices.emit_frame(2);

        assert!(recorder.wait_for_frames(2, WAIT));
        assert_eq!(capturer.quality_preset().as_str(), "q2");
        assert_eq!(devices.start_count(), 1);
        assert_eq!(devices.stop_count(), 0);
        assert_eq!(capturer.diagnostics().input_attaches, 1);
        let frames = recorder.frames();
        assert_eq!(frames[0].preset, QualityPreset::medium());
        assert_eq!(frames[1].preset.as_str(), "q2");
    }

    #[test]
    fn queued_frames_keep_capture_time_settings() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.start().wait().unwrap();

        recorder.pause();
        devices.emit_frame(1);
        devices.emit_frame(2);
        capturer.set_camera_position(CameraPosition::Back).wait().unwrap();
        capturer
            .set_device_orientation(DeviceOrientation::LandscapeLeft)
            .unwrap()
            .wait()
            .unwrap();
        devices.emit_frame(3);
        recorder.release();

        assert!(recorder.wait_for_frames(3, WAIT));
        let frames = recorder.frames();
        for front in &frames[..2] {
            assert_eq!(front.device.id, "front");
            assert!(front.transform.mirrored);
            assert_eq!(front.transform.rotation, VideoRotation::Portrait);
        }
        assert_eq!(frames[2].device.id, "back");
        assert!(!frames[2].transform.mirrored);
        assert_eq!(frames[2].transform.rotation, VideoRotation::LandscapeRight);
    }

    #[test]
    fn drop_while_suspended_stops_production() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.start().wait().unwrap();

        capturer.suspend();
        let pending = capturer.set_quality_preset(QualityPreset::high());
        drop(capturer);

        assert_eq!(pending.wait(), Ok(()));
        assert_eq!(devices.stop_count(), 1);
        assert!(devices.emit_frame(1).is_none());
        assert!(recorder.frames().is_empty());
    }

    #[test]
    fn cleared_delegate_stops_callbacks() {
        let devices = MockDevices::phone();
        let (capturer, recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.start().wait().unwrap();

        capturer.clear_delegate();
        devices.emit_frame(1);
        capturer.sync().unwrap();
        thread::sleep(Duration::from_millis(50));

        assert!(recorder.frames().is_empty());
    }

    #[test]
    fn snapshot_serializes() {
        let devices = MockDevices::phone();
        let (capturer, _recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.start().wait().unwrap();

        let snapshot = capturer.snapshot();
        assert_eq!(snapshot.session_id, capturer.id().to_string());
        assert_eq!(snapshot.state, SessionState::Running);

        let json = snapshot.to_json().unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
        assert!(json.contains("\"running\""));
    }

    #[test]
    fn drop_stops_production() {
        let devices = MockDevices::phone();
        let (capturer, _recorder) = capturer(MockAuthorization::answering(true), Arc::clone(&devices));
        capturer.start().wait().unwrap();

        drop(capturer);
        assert_eq!(devices.stop_count(), 1);
    }
}
