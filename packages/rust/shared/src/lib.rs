//! Shared types, error model, and configuration for kubeintent.
//!
//! This crate is the foundation depended on by all other kubeintent crates.
//! It provides:
//! - [`KubeIntentError`]: the unified error type
//! - Domain types ([`WorkloadSpec`], [`Intent`], [`DispatchResult`], [`ClusterContext`])
//! - The [`ClusterGateway`] seam implemented by `kubeintent-cluster`
//! - Configuration ([`AppConfig`], [`BridgeConfig`], config loading)

pub mod config;
pub mod error;
pub mod gateway;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AgentConfig, AppConfig, BridgeConfig, ClusterConfig, EngineConfig, ServerConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, parse_url,
};
pub use error::{KubeIntentError, Result};
pub use gateway::ClusterGateway;
pub use types::{
    Action, CauseKind, ClusterContext, DispatchResult, DispatchStatus, Intent, PodSummary,
    ResourceKind, WorkloadRef, WorkloadSpec,
};
