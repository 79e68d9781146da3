pub mod export_flow;
pub mod progress;

pub use export_flow::{ExportFlow, ExportOutcome, ExportStats};
pub use progress::{ExportPhase, ExportProgress, NoopProgress, ProgressSink, TracingProgress};
