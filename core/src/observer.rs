//! Step reporting for client calls.
//!
//! # Design
//! The base client reports every HTTP call and the operations client
//! reports every business action as a `Step`. Reporting is best effort: an
//! observer that errors or panics is logged and ignored, and the call's
//! result is returned as if no observer existed.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::http::HttpMethod;

pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// One reportable step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A business-level action such as "Get operation by id 7".
    Action { title: String },
    /// A single HTTP call. `status` is `None` when the transport failed.
    Request {
        method: HttpMethod,
        target: String,
        payload: Option<String>,
        status: Option<u16>,
    },
}

impl Step {
    pub fn action(title: impl Into<String>) -> Self {
        Step::Action {
            title: title.into(),
        }
    }

    /// Report title in the "Make GET request to /path" form.
    pub fn title(&self) -> String {
        match self {
            Step::Action { title } => title.clone(),
            Step::Request { method, target, .. } => format!("Make {method} request to {target}"),
        }
    }
}

/// Receiver for steps. Implementations must be cheap; they run inline on
/// the calling thread.
pub trait StepObserver: Send + Sync {
    fn on_step(&self, step: &Step) -> Result<(), ObserverError>;
}

/// Logs each step through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StepObserver for TracingObserver {
    fn on_step(&self, step: &Step) -> Result<(), ObserverError> {
        match step {
            Step::Action { title } => info!(target: "fakebank::step", "{title}"),
            Step::Request {
                method,
                target,
                payload,
                status,
            } => info!(
                target: "fakebank::step",
                method = %method,
                target_path = %target,
                payload = payload.as_deref().unwrap_or(""),
                status = ?status,
                "{}",
                step.title()
            ),
        }
        Ok(())
    }
}

/// Discards every step.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&self, _step: &Step) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Keeps every step in memory, in order.
#[derive(Debug, Default)]
pub struct StepLog {
    steps: Mutex<Vec<Step>>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl StepObserver for StepLog {
    fn on_step(&self, step: &Step) -> Result<(), ObserverError> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(step.clone());
        Ok(())
    }
}

/// Hand `step` to `observer`, swallowing errors and panics.
pub(crate) fn notify(observer: &dyn StepObserver, step: &Step) {
    match catch_unwind(AssertUnwindSafe(|| observer.on_step(step))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, step = %step.title(), "step observer failed"),
        Err(_) => warn!(step = %step.title(), "step observer panicked"),
    }
}
