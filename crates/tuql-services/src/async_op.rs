//! Background operations polled from the interaction loop
//!
//! `AsyncOperation` spawns a future on the runtime and delivers its result
//! through a oneshot channel. The owner polls it between events and only
//! touches its own state once the operation has `Completed`.

use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tuql_core::QueryCancelHandle;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    Running,
    Completed,
    Error,
    Cancelled,
}

pub struct AsyncOperation<T> {
    runtime: Handle,
    state: OperationState,
    receiver: Option<oneshot::Receiver<ServiceResult<T>>>,
    task: Option<JoinHandle<()>>,
    cancel_handle: Option<Arc<dyn QueryCancelHandle>>,
    result: Option<T>,
    error: Option<ServiceError>,
}

impl<T: Send + 'static> AsyncOperation<T> {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            state: OperationState::Idle,
            receiver: None,
            task: None,
            cancel_handle: None,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == OperationState::Running
    }

    /// Spawn `future`. Returns `false` without spawning when an operation is
    /// already running.
    pub fn start<F>(&mut self, future: F, cancel_handle: Option<Arc<dyn QueryCancelHandle>>) -> bool
    where
        F: Future<Output = ServiceResult<T>> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }

        let (tx, rx) = oneshot::channel();
        let task = self.runtime.spawn(async move {
            // The receiver is gone when the operation was cancelled.
            let _ = tx.send(future.await);
        });

        self.state = OperationState::Running;
        self.receiver = Some(rx);
        self.task = Some(task);
        self.cancel_handle = cancel_handle;
        self.result = None;
        self.error = None;
        true
    }

    /// Check for completion without blocking.
    pub fn poll(&mut self) -> OperationState {
        if self.state != OperationState::Running {
            return self.state;
        }
        let Some(receiver) = self.receiver.as_mut() else {
            return self.state;
        };
        match receiver.try_recv() {
            Ok(outcome) => self.finish(outcome),
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.finish(Err(ServiceError::QueryFailed(
                    "operation ended without a result".to_string(),
                )));
            }
        }
        self.state
    }

    /// Wait for the running operation to settle.
    pub async fn wait(&mut self) -> OperationState {
        if self.state != OperationState::Running {
            return self.state;
        }
        let Some(receiver) = self.receiver.as_mut() else {
            return self.state;
        };
        let outcome = match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ServiceError::QueryFailed(
                "operation ended without a result".to_string(),
            )),
        };
        self.finish(outcome);
        self.state
    }

    fn finish(&mut self, outcome: ServiceResult<T>) {
        self.receiver = None;
        self.task = None;
        self.cancel_handle = None;
        match outcome {
            Ok(value) => {
                self.result = Some(value);
                self.state = OperationState::Completed;
            }
            Err(ServiceError::Cancelled) => {
                self.state = OperationState::Cancelled;
            }
            Err(err) => {
                tracing::debug!(error = %err, "background operation failed");
                self.error = Some(err);
                self.state = OperationState::Error;
            }
        }
    }

    /// Abort the task and interrupt the driver. Returns whether anything was
    /// running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(handle) = self.cancel_handle.take() {
            handle.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.receiver = None;
        self.state = OperationState::Cancelled;
        tracing::info!("operation cancelled");
        true
    }

    /// Take the completed value, returning the operation to `Idle`.
    pub fn take_result(&mut self) -> Option<T> {
        let result = self.result.take();
        if result.is_some() {
            self.state = OperationState::Idle;
        }
        result
    }

    /// Take the failure, returning the operation to `Idle`.
    pub fn take_error(&mut self) -> Option<ServiceError> {
        let error = self.error.take();
        if error.is_some() {
            self.state = OperationState::Idle;
        }
        error
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Acknowledge a cancelled operation.
    pub fn reset(&mut self) {
        if self.state != OperationState::Running {
            self.state = OperationState::Idle;
            self.result = None;
            self.error = None;
        }
    }
}
