//! Coordinator module containing stack tracking, builder pattern, and configuration.
//!
//! The [`DownloadCoordinator`] starts individual downloads and stacks of
//! downloads, reports when a whole stack has finished, and cancels stacks.
//!
//! - `coordinator` - the coordinator and its stack registry
//! - `group` - stack identifiers and per-stack bookkeeping
//! - `builder` - [`CoordinatorBuilder`] for configuring a coordinator
//! - `config` - configuration structures

pub mod builder;
pub mod config;
#[allow(clippy::module_inception)]
pub mod coordinator;
pub mod group;

pub use builder::CoordinatorBuilder;
pub use config::CoordinatorConfig;
pub use coordinator::DownloadCoordinator;
pub use group::GroupId;

pub(crate) use group::GroupDelegate;
