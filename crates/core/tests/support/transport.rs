//! Scripted transport double
//!
//! Each call pops the next [`Step`], sleeps for its delay on the tokio clock
//! and returns its result. Once the script runs out the fallback step is
//! repeated.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use optiq_core::Transport;
use optiq_domain::{FetchError, RequestDescriptor};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub result: Result<Value, FetchError>,
}

impl Step {
    pub fn ok(value: Value) -> Self {
        Self { delay: Duration::ZERO, result: Ok(value) }
    }

    pub fn err(error: FetchError) -> Self {
        Self { delay: Duration::ZERO, result: Err(error) }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicUsize,
    log: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    /// Transport that answers every call with `fallback`
    pub fn always(fallback: Step) -> Self {
        Self::scripted(Vec::new(), fallback)
    }

    pub fn scripted(steps: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            fallback,
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(request.clone());

        let step = self.script.lock().pop_front().unwrap_or_else(|| self.fallback.clone());
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result
    }
}
