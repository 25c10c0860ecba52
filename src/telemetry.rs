// SPDX-License-Identifier: GPL-3.0-only

//! Usage telemetry
//!
//! Events are fire-and-forget. A sink may fail or even panic; [`emit`] swallows
//! both so a broken analytics backend can never stop a capture.

use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, info};

/// Named event with one numeric payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryEvent {
    pub name: &'static str,
    pub key: &'static str,
    pub value: u64,
}

impl TelemetryEvent {
    pub fn new(name: &'static str, key: &'static str, value: u64) -> Self {
        Self { name, key, value }
    }
}

/// Error reported by a telemetry sink
#[derive(Debug, Clone)]
pub struct TelemetryError(pub String);

impl std::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Telemetry error: {}", self.0)
    }
}

impl std::error::Error for TelemetryError {}

/// Destination for telemetry events
pub trait TelemetrySink: Send + Sync {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let payload =
            serde_json::to_string(event).map_err(|e| TelemetryError(e.to_string()))?;
        info!(target: "telemetry", event = event.name, %payload, "Telemetry event");
        Ok(())
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn track(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Send an event, discarding any error or panic from the sink
pub fn emit(sink: &dyn TelemetrySink, event: TelemetryEvent) {
    match catch_unwind(AssertUnwindSafe(|| sink.track(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(event = event.name, error = %e, "Telemetry event dropped"),
        Err(_) => debug!(event = event.name, "Telemetry sink panicked, event dropped"),
    }
}
