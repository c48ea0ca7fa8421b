//! Collaborator sinks: telemetry shipping and remote-display frames
//!
//! Both sinks are best-effort. The engine never fails an operation because
//! a sink rejected a payload; callers swallow push errors.

use async_trait::async_trait;

/// Severity for shipped telemetry events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Telemetry collaborator
///
/// Receives a structured event for every failing or state-changing public
/// call, tagged with the owning task so the collector can route it.
pub trait TelemetrySink: Send + Sync {
    fn log(&self, level: LogLevel, task: &str, message: &str, detail: Option<&str>);
}

/// Remote-display collaborator
///
/// Receives a rendered JPEG frame on a named channel after interactive
/// operations so an operator can watch the session live.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn push_frame(&self, channel: &str, jpeg: &[u8]) -> crate::Result<()>;
}

/// Telemetry sink that drops every event
#[derive(Debug, Default)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn log(&self, _level: LogLevel, _task: &str, _message: &str, _detail: Option<&str>) {}
}

/// Frame sink that drops every frame
#[derive(Debug, Default)]
pub struct NullFrameSink;

#[async_trait]
impl FrameSink for NullFrameSink {
    async fn push_frame(&self, _channel: &str, _jpeg: &[u8]) -> crate::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_sinks() {
        let telemetry = NullTelemetry;
        telemetry.log(LogLevel::Error, "task-1", "click failed", Some("#btn"));

        let frames = NullFrameSink;
        frames.push_frame("task-1", &[0xFF, 0xD8]).await.unwrap();
    }
}
