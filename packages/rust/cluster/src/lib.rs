//! Cluster gateways for kubeintent.
//!
//! This crate provides:
//! - [`KubeGateway`]: server-side apply and foreground delete against a real cluster
//! - [`MemoryGateway`]: an in-process gateway that records calls (dry runs, tests)
//! - [`deployment_manifest`]: the `WorkloadSpec` → Deployment rendering

mod kubernetes;
mod manifest;
mod memory;

pub use kubernetes::KubeGateway;
pub use manifest::{APP_LABEL, deployment_manifest};
pub use memory::{GatewayCall, MemoryGateway};
