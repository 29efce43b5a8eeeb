use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::camera_models::{
    CameraPosition, CaptureDevice, CaptureDiagnostics, DeviceOrientation, OutputTransform, QualityPreset,
};
use crate::models::config::CapturerConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::{AuthorizationState, SessionState};
use crate::policy::orientation_mirror::OrientationMirrorPolicy;
use crate::session::device_selector::DeviceSelector;
use crate::session::frame_sink::{DelegateSlot, FrameSink};
use crate::session::graph::CaptureGraph;
use crate::session::permission_gate::PermissionGate;
use crate::session::queue::SuspendGate;
use crate::traits::authorization::AuthorizationProvider;
use crate::traits::capture_provider::DeviceProvider;

/// Committed session values, readable from any thread.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub state: SessionState,
    pub camera_position: CameraPosition,
    pub quality_preset: QualityPreset,
    pub device_orientation: DeviceOrientation,
    pub active_device: Option<CaptureDevice>,
    pub diagnostics: CaptureDiagnostics,
}

impl SessionStatus {
    pub fn output_transform(&self) -> OutputTransform {
        OrientationMirrorPolicy::transform(self.device_orientation, self.camera_position)
            .unwrap_or(OutputTransform {
                rotation: Default::default(),
                mirrored: OrientationMirrorPolicy::mirrored(self.camera_position),
            })
    }
}

/// Owner of the capture graph and the session state machine.
///
/// Every method takes `&mut self`; the capturer hands the configurator to its
/// configuration queue, which is then the only place these methods run.
pub struct SessionConfigurator {
    permission: PermissionGate,
    selector: DeviceSelector,
    devices: Arc<dyn DeviceProvider>,
    graph: CaptureGraph,
    state: SessionState,
    position: CameraPosition,
    preset: QualityPreset,
    orientation: DeviceOrientation,
    delegate: DelegateSlot,
    status: Arc<RwLock<SessionStatus>>,
    // Declared last so the graph stops its input before delivery shuts down.
    sink: FrameSink,
}

impl SessionConfigurator {
    pub fn new(
        config: CapturerConfiguration,
        authorization: Arc<dyn AuthorizationProvider>,
        devices: Arc<dyn DeviceProvider>,
        queue_gate: Arc<SuspendGate>,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;

        let transform = OrientationMirrorPolicy::transform(config.device_orientation, config.camera_position)
            .ok_or(CaptureError::InvalidOrientation)?;
        let graph = CaptureGraph::new(transform, config.quality_preset.clone());
        let delegate = DelegateSlot::default();
        let sink = FrameSink::spawn(&config.delivery_label, graph.connection(), delegate.clone())?;

        let status = SessionStatus {
            state: SessionState::Unconfigured,
            camera_position: config.camera_position,
            quality_preset: config.quality_preset.clone(),
            device_orientation: config.device_orientation,
            active_device: None,
            diagnostics: CaptureDiagnostics::default(),
        };

        Ok(Self {
            permission: PermissionGate::new(authorization, queue_gate),
            selector: DeviceSelector::new(Arc::clone(&devices)),
            devices,
            graph,
            state: SessionState::Unconfigured,
            position: config.camera_position,
            preset: config.quality_preset,
            orientation: config.device_orientation,
            delegate,
            status: Arc::new(RwLock::new(status)),
            sink,
        })
    }

    pub fn delegate_slot(&self) -> DelegateSlot {
        self.delegate.clone()
    }

    pub fn status_handle(&self) -> Arc<RwLock<SessionStatus>> {
        Arc::clone(&self.status)
    }

    pub fn authorization_handle(&self) -> Arc<RwLock<AuthorizationState>> {
        self.permission.state_handle()
    }

    pub fn delivered_counter(&self) -> Arc<std::sync::atomic::AtomicU64> {
        self.sink.delivered_counter()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn camera_position(&self) -> CameraPosition {
        self.position
    }

    pub fn quality_preset(&self) -> &QualityPreset {
        &self.preset
    }

    pub fn device_orientation(&self) -> DeviceOrientation {
        self.orientation
    }

    pub fn authorization_state(&self) -> AuthorizationState {
        self.permission.state()
    }

    pub fn active_device(&self) -> Option<&CaptureDevice> {
        self.graph.input_device()
    }

    /// Transform the live connection carries.
    pub fn output_transform(&self) -> OutputTransform {
        self.graph.connection().read().transform
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        let stats = self.graph.stats();
        CaptureDiagnostics {
            production_activations: stats.production_activations,
            input_attaches: stats.input_attaches,
            output_attaches: stats.output_attaches,
            transactions_committed: stats.transactions_committed,
            transactions_rolled_back: stats.transactions_rolled_back,
            frames_delivered: self.sink.delivered(),
        }
    }

    /// Build the capture graph. Only valid from `Unconfigured`; anywhere else
    /// it does nothing.
    pub fn configure(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Unconfigured {
            log::debug!("configure ignored in state {:?}", self.state);
            return Ok(());
        }

        self.set_state(SessionState::Configuring);
        match self.build_graph() {
            Ok(()) => {
                log::info!("capture session configured with {} camera", self.position);
                self.set_state(SessionState::Configured);
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::Unconfigured);
                Err(self.report(e))
            }
        }
    }

    /// Begin frame production, configuring first when needed. Idempotent
    /// while running.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state == SessionState::Unconfigured {
            self.configure()?;
        }
        match self.state {
            SessionState::Configured | SessionState::Stopped => {}
            SessionState::Running => {
                log::debug!("start ignored: already running");
                return Ok(());
            }
            other => {
                log::debug!("start ignored in state {:?}", other);
                return Ok(());
            }
        }

        if let Err(e) = self.resume_production() {
            return Err(self.report(e));
        }
        log::info!("frame production started");
        self.set_state(SessionState::Running);
        Ok(())
    }

    /// Halt frame production. Idempotent when not running.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Running {
            log::debug!("stop ignored in state {:?}", self.state);
            return Ok(());
        }
        if let Err(e) = self.graph.stop_production() {
            return Err(self.report(e));
        }
        log::info!("frame production stopped");
        self.set_state(SessionState::Stopped);
        Ok(())
    }

    /// Switch cameras. While configured the input is swapped inside one
    /// transaction; on failure the previous camera keeps producing.
    pub fn set_camera_position(&mut self, position: CameraPosition) -> Result<(), CaptureError> {
        if !self.state.is_configured() {
            self.position = position;
            self.publish();
            return Ok(());
        }

        let attached = self.graph.input_device().and_then(|d| d.position);
        if position == self.position && attached == Some(position) {
            log::debug!("camera position unchanged ({})", position);
            return Ok(());
        }

        let was_producing = self.graph.is_producing();
        if was_producing {
            if let Err(e) = self.graph.stop_production() {
                return Err(self.report(e));
            }
        }

        let swapped = self.swap_input(position);
        if swapped.is_ok() {
            self.position = position;
            log::info!("switched to {} camera", position);
        }

        if was_producing {
            if let Err(e) = self.resume_production() {
                log::error!("failed to resume production after camera switch: {}", e);
                self.set_state(SessionState::Stopped);
                self.publish();
                return Err(self.report(e));
            }
        }

        self.publish();
        swapped.map_err(|e| self.report(e))
    }

    /// Change the capture tier on the live output. The input and frame
    /// production are left alone.
    pub fn set_quality_preset(&mut self, preset: QualityPreset) -> Result<(), CaptureError> {
        if preset.is_empty() {
            return Err(self.report(CaptureError::PresetRejected("empty preset".into())));
        }
        if preset == self.preset {
            return Ok(());
        }
        if self.state.is_configured() {
            if let Err(e) = self.graph.apply_preset(&preset) {
                return Err(self.report(e));
            }
            log::info!("quality preset changed to {}", preset);
        }
        self.preset = preset;
        self.publish();
        Ok(())
    }

    /// Apply a new orientation to the live connection without interrupting
    /// delivery. `Other` is rejected and changes nothing.
    pub fn set_device_orientation(&mut self, orientation: DeviceOrientation) -> Result<(), CaptureError> {
        let Some(transform) = OrientationMirrorPolicy::transform(orientation, self.position) else {
            log::debug!("ignoring non-applicable orientation {:?}", orientation);
            return Err(CaptureError::InvalidOrientation);
        };
        if orientation == self.orientation {
            return Ok(());
        }
        if self.state.is_configured() {
            if let Err(e) = self.graph.apply_transform(transform) {
                return Err(self.report(e));
            }
        }
        self.orientation = orientation;
        self.publish();
        Ok(())
    }

    // --- Internal helpers ---

    fn build_graph(&mut self) -> Result<(), CaptureError> {
        if self.permission.check_or_request() != AuthorizationState::Granted {
            return Err(CaptureError::PermissionDenied);
        }

        let device = self.selector.resolve(self.position)?;
        let transform = OrientationMirrorPolicy::transform(self.orientation, self.position)
            .ok_or(CaptureError::InvalidOrientation)?;
        let input = self.devices.create_input(&device)?;
        let output = self.devices.create_output()?;

        let mut tx = self.graph.begin_configuration();
        tx.remove_input();
        tx.add_input(input)?;
        tx.attach_output(output);
        tx.apply_transform(transform)?;
        tx.apply_preset(&self.preset)?;
        tx.commit();
        Ok(())
    }

    fn swap_input(&mut self, position: CameraPosition) -> Result<(), CaptureError> {
        let device = self.selector.resolve(position)?;
        let transform = OrientationMirrorPolicy::transform(self.orientation, position)
            .ok_or(CaptureError::InvalidOrientation)?;
        let input = self.devices.create_input(&device)?;

        let mut tx = self.graph.begin_configuration();
        tx.remove_input();
        tx.add_input(input)?;
        tx.apply_transform(transform)?;
        tx.commit();
        Ok(())
    }

    fn resume_production(&mut self) -> Result<(), CaptureError> {
        let device = self
            .graph
            .input_device()
            .cloned()
            .ok_or_else(|| CaptureError::ProductionFailed("no input attached".into()))?;
        let callback = self.sink.callback_for(&device);
        self.graph.start_production(callback)
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.publish();
        self.delegate.state_changed(state);
    }

    fn publish(&self) {
        let mut status = self.status.write();
        status.state = self.state;
        status.camera_position = self.position;
        status.quality_preset = self.preset.clone();
        status.device_orientation = self.orientation;
        status.active_device = self.graph.input_device().cloned();
        status.diagnostics = self.diagnostics();
    }

    fn report(&self, error: CaptureError) -> CaptureError {
        log::error!("capture configuration failed: {}", error);
        self.delegate.error(&error);
        error
    }
}
