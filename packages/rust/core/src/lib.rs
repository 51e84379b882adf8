//! The kubeintent pipeline.
//!
//! This crate ties together fragment assembly, intent validation, and
//! action dispatch, plus the request telemetry the agent serves and the
//! bridge driver (`run_bridge`) that feeds the agent from a reasoning engine.

pub mod assembler;
pub mod bridge;
pub mod dispatcher;
pub mod status;
pub mod validator;

pub use assembler::{FragmentAssembler, assemble};
pub use bridge::{BridgeOutcome, BridgeProgress, SilentBridgeProgress, run_bridge};
pub use dispatcher::{ActionDispatcher, CREATE_ACCEPTED, DELETE_ACCEPTED};
pub use status::{StatusReport, StatusReporter};
pub use validator::validate;
