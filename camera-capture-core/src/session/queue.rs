use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;

#[derive(Debug, Default)]
struct Suspensions {
    /// Outstanding `suspend` calls.
    requested: usize,
    /// Live `SuspensionGuard`s.
    held: usize,
}

impl Suspensions {
    fn total(&self) -> usize {
        self.requested + self.held
    }
}

/// Suspension counter shared by the configuration worker and whoever holds it.
///
/// Suspensions nest: the worker runs again only once every `suspend` has been
/// matched by a `resume` and every guard from `hold` has been dropped.
#[derive(Debug, Default)]
pub struct SuspendGate {
    suspensions: Mutex<Suspensions>,
    resumed: Condvar,
}

impl SuspendGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn suspend(&self) {
        self.suspensions.lock().requested += 1;
    }

    pub fn resume(&self) {
        let mut suspensions = self.suspensions.lock();
        if suspensions.requested == 0 {
            log::warn!("resume called on a configuration queue that is not suspended");
            return;
        }
        suspensions.requested -= 1;
        if suspensions.total() == 0 {
            self.resumed.notify_all();
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspensions.lock().total() > 0
    }

    /// Whether a `SuspensionGuard` is still alive.
    pub fn is_held(&self) -> bool {
        self.suspensions.lock().held > 0
    }

    /// Suspend until the returned guard is dropped.
    pub fn hold(self: &Arc<Self>) -> SuspensionGuard {
        self.suspensions.lock().held += 1;
        SuspensionGuard(Arc::clone(self))
    }

    /// Drop every `suspend` still outstanding. Guards are left alone.
    pub fn release_requested(&self) {
        let mut suspensions = self.suspensions.lock();
        if suspensions.requested > 0 {
            log::debug!("releasing {} outstanding suspensions", suspensions.requested);
            suspensions.requested = 0;
        }
        if suspensions.total() == 0 {
            self.resumed.notify_all();
        }
    }

    /// Block the calling thread while any suspension is outstanding.
    pub fn wait_until_resumed(&self) {
        let mut suspensions = self.suspensions.lock();
        while suspensions.total() > 0 {
            self.resumed.wait(&mut suspensions);
        }
    }

    fn release_guard(&self) {
        let mut suspensions = self.suspensions.lock();
        suspensions.held = suspensions.held.saturating_sub(1);
        if suspensions.total() == 0 {
            self.resumed.notify_all();
        }
    }
}

/// RAII guard that resumes its gate when dropped.
pub struct SuspensionGuard(Arc<SuspendGate>);

impl Drop for SuspensionGuard {
    fn drop(&mut self) {
        self.0.release_guard();
    }
}

type Job<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Serial worker that owns a context and runs submitted operations on it in
/// submission order, one at a time.
///
/// Because the worker thread owns `C`, nothing else can mutate it: every
/// change goes through `submit`.
pub struct ConfigurationQueue<C> {
    sender: Option<Sender<Job<C>>>,
    gate: Arc<SuspendGate>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<C: Send + 'static> ConfigurationQueue<C> {
    pub fn spawn(label: &str, context: C, gate: Arc<SuspendGate>) -> Result<Self, CaptureError> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job<C>>();
        let worker_gate = Arc::clone(&gate);

        let worker = thread::Builder::new()
            .name(label.into())
            .spawn(move || {
                let mut context = context;
                for job in receiver.iter() {
                    worker_gate.wait_until_resumed();
                    job(&mut context);
                }
                log::debug!("configuration queue drained");
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn configuration thread: {}", e)))?;

        Ok(Self {
            sender: Some(sender),
            gate,
            worker: Some(worker),
        })
    }

    /// Queue `operation`. It runs after everything submitted before it.
    pub fn submit<T, F>(&self, operation: F) -> OperationHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T, CaptureError> + Send + 'static,
    {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let job: Job<C> = Box::new(move |context| {
            let _ = done_tx.send(operation(context));
        });

        let queued = self.sender.as_ref().map(|s| s.send(job).is_ok()).unwrap_or(false);
        if !queued {
            log::warn!("operation submitted after the configuration queue closed");
        }

        OperationHandle { receiver: done_rx }
    }

    /// Hold queued operations until a matching `resume`.
    pub fn suspend(&self) {
        self.gate.suspend();
    }

    pub fn resume(&self) {
        self.gate.resume();
    }

    pub fn is_suspended(&self) -> bool {
        self.gate.is_suspended()
    }
}

impl<C> Drop for ConfigurationQueue<C> {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish what is already queued.
        self.sender.take();

        let Some(worker) = self.worker.take() else {
            return;
        };
        // Application suspensions end with the queue; an outstanding
        // permission prompt still owns the worker.
        self.gate.release_requested();
        if self.gate.is_held() {
            log::warn!("configuration queue dropped during a permission request; detaching worker");
            return;
        }
        if worker.thread().id() == thread::current().id() {
            return;
        }
        let _ = worker.join();
    }
}

/// Completion of a queued operation.
///
/// Dropping the handle does not cancel the operation.
pub struct OperationHandle<T> {
    receiver: Receiver<Result<T, CaptureError>>,
}

impl<T> OperationHandle<T> {
    /// Block until the operation has run.
    pub fn wait(self) -> Result<T, CaptureError> {
        self.receiver.recv().unwrap_or(Err(CaptureError::QueueClosed))
    }

    /// Like `wait`, giving up after `timeout`. The operation itself keeps its
    /// place in the queue.
    pub fn wait_timeout(self, timeout: Duration) -> Result<T, CaptureError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::QueueClosed),
        }
    }
}
