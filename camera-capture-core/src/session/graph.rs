use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::models::camera_models::{CaptureDevice, OutputTransform, QualityPreset};
use crate::models::error::CaptureError;
use crate::policy::orientation_mirror::OrientationMirrorPolicy;
use crate::traits::capture_provider::{CaptureInput, CaptureOutput, FrameCallback};

/// Connection settings that captured frames are stamped with.
///
/// Structural transactions hold the write lock from begin to commit or
/// rollback, so no frame is captured against a half-built graph.
#[derive(Debug, Clone)]
pub struct ConnectionView {
    pub transform: OutputTransform,
    pub preset: QualityPreset,
}

/// Structural and production counters kept by the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphStats {
    pub input_attaches: u64,
    pub output_attaches: u64,
    pub transactions_committed: u64,
    pub transactions_rolled_back: u64,
    pub production_activations: u64,
}

/// The capture graph: at most one input and one output.
pub struct CaptureGraph {
    input: Option<Box<dyn CaptureInput>>,
    output: Option<Box<dyn CaptureOutput>>,
    connection: Arc<RwLock<ConnectionView>>,
    stats: GraphStats,
    producing: bool,
}

impl CaptureGraph {
    pub fn new(transform: OutputTransform, preset: QualityPreset) -> Self {
        Self {
            input: None,
            output: None,
            connection: Arc::new(RwLock::new(ConnectionView {
                transform,
                preset,
            })),
            stats: GraphStats::default(),
            producing: false,
        }
    }

    pub fn connection(&self) -> Arc<RwLock<ConnectionView>> {
        Arc::clone(&self.connection)
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    pub fn input_device(&self) -> Option<&CaptureDevice> {
        self.input.as_ref().map(|i| i.device())
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_producing(&self) -> bool {
        self.producing
    }

    /// Open a structural transaction. Frame delivery is held until it ends.
    pub fn begin_configuration(&mut self) -> GraphTransaction<'_> {
        GraphTransaction {
            view: self.connection.write(),
            input: &mut self.input,
            output: &mut self.output,
            stats: &mut self.stats,
            saved_input: None,
            saved_output: None,
            pending_transform: None,
            pending_preset: None,
            committed: false,
        }
    }

    /// Update rotation and mirroring on the live connection.
    ///
    /// Counted as a transaction, but the structural lock is only taken to
    /// publish the result, so capture is not interrupted.
    pub fn apply_transform(&mut self, transform: OutputTransform) -> Result<(), CaptureError> {
        let applied = match self.output.as_deref_mut() {
            Some(output) => {
                OrientationMirrorPolicy::apply(output, transform);
                Ok(())
            }
            None => Err(no_output()),
        };
        self.settle_live(applied)?;
        self.connection.write().transform = transform;
        Ok(())
    }

    /// Switch the preset on the live output without touching the input. On
    /// rejection the previous preset stays.
    pub fn apply_preset(&mut self, preset: &QualityPreset) -> Result<(), CaptureError> {
        let applied = match self.output.as_deref_mut() {
            Some(output) => output.apply_preset(preset),
            None => Err(no_output()),
        };
        self.settle_live(applied)?;
        self.connection.write().preset = preset.clone();
        Ok(())
    }

    /// Start the attached input. Calling this while producing is a no-op.
    pub fn start_production(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        if self.producing {
            return Ok(());
        }
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| CaptureError::ProductionFailed("no input attached".into()))?;
        input.start(callback)?;
        self.producing = true;
        self.stats.production_activations += 1;
        Ok(())
    }

    pub fn stop_production(&mut self) -> Result<(), CaptureError> {
        if !self.producing {
            return Ok(());
        }
        if let Some(input) = self.input.as_mut() {
            input.stop()?;
        }
        self.producing = false;
        Ok(())
    }
}

impl CaptureGraph {
    fn settle_live(&mut self, applied: Result<(), CaptureError>) -> Result<(), CaptureError> {
        match &applied {
            Ok(()) => self.stats.transactions_committed += 1,
            Err(e) => {
                self.stats.transactions_rolled_back += 1;
                log::warn!("live connection update rolled back: {}", e);
            }
        }
        applied
    }
}

fn no_output() -> CaptureError {
    CaptureError::AttachFailure("no output attached".into())
}

impl Drop for CaptureGraph {
    fn drop(&mut self) {
        if let Err(e) = self.stop_production() {
            log::warn!("failed to stop input while tearing down graph: {}", e);
        }
    }
}

/// An atomic change to the graph's structure.
///
/// Dropping the transaction without calling `commit` restores the input and
/// output that were attached when it began.
pub struct GraphTransaction<'a> {
    view: RwLockWriteGuard<'a, ConnectionView>,
    input: &'a mut Option<Box<dyn CaptureInput>>,
    output: &'a mut Option<Box<dyn CaptureOutput>>,
    stats: &'a mut GraphStats,
    saved_input: Option<Option<Box<dyn CaptureInput>>>,
    saved_output: Option<Option<Box<dyn CaptureOutput>>>,
    pending_transform: Option<OutputTransform>,
    pending_preset: Option<QualityPreset>,
    committed: bool,
}

impl GraphTransaction<'_> {
    /// Detach the current input, if any.
    pub fn remove_input(&mut self) {
        let removed = self.input.take();
        if self.saved_input.is_none() {
            self.saved_input = Some(removed);
        }
    }

    pub fn can_add_input(&self) -> bool {
        self.input.is_none()
    }

    pub fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), CaptureError> {
        if !self.can_add_input() {
            return Err(CaptureError::AttachFailure(format!(
                "cannot add input {}: graph already has an input",
                input.device().id
            )));
        }
        if self.saved_input.is_none() {
            self.saved_input = Some(None);
        }
        *self.input = Some(input);
        Ok(())
    }

    /// Attach `output`, replacing any output already present.
    pub fn attach_output(&mut self, output: Box<dyn CaptureOutput>) {
        let replaced = self.output.replace(output);
        if self.saved_output.is_none() {
            self.saved_output = Some(replaced);
        }
    }

    pub fn apply_transform(&mut self, transform: OutputTransform) -> Result<(), CaptureError> {
        let output = self
            .output
            .as_deref_mut()
            .ok_or_else(no_output)?;
        OrientationMirrorPolicy::apply(output, transform);
        self.pending_transform = Some(transform);
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: &QualityPreset) -> Result<(), CaptureError> {
        let output = self
            .output
            .as_deref_mut()
            .ok_or_else(no_output)?;
        output.apply_preset(preset)?;
        self.pending_preset = Some(preset.clone());
        Ok(())
    }

    pub fn commit(mut self) {
        if self.input.is_some() && self.saved_input.is_some() {
            self.stats.input_attaches += 1;
        }
        if self.output.is_some() && self.saved_output.is_some() {
            self.stats.output_attaches += 1;
        }
        self.stats.transactions_committed += 1;

        if let Some(transform) = self.pending_transform.take() {
            self.view.transform = transform;
        }
        if let Some(preset) = self.pending_preset.take() {
            self.view.preset = preset;
        }
        self.committed = true;
    }
}

impl Drop for GraphTransaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Some(original) = self.saved_input.take() {
            *self.input = original;
        }
        if let Some(original) = self.saved_output.take() {
            *self.output = original;
        }
        self.stats.transactions_rolled_back += 1;
        log::warn!("graph configuration rolled back");
    }
}
