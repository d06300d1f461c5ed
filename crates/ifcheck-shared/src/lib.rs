//! Interface health checks over RESTCONF telemetry.
//!
//! A device response is unwrapped into a `TelemetryDocument` by the adapter
//! for its YANG model, then each `CheckSpec` of the model's catalog is applied
//! by `evaluate`. Reports are rendered from the results only.

pub mod check;
pub mod error;
pub mod evaluate;
pub mod policy;
pub mod report;
pub mod schema;
pub mod status;
pub mod telemetry;
pub mod version;

pub use check::{CheckSpec, Comparison};
pub use error::IfcheckError;
pub use evaluate::{evaluate, evaluate_catalog, AggregateResult, CheckResult, NaReason, Verdict};
pub use report::DeviceReport;
pub use schema::YangModel;
pub use telemetry::{EntityRecord, FieldPath, Observed, TelemetryDocument};
