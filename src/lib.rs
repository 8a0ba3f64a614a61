//! Student training-application submission.
//!
//! The [`workflows::training`] module holds the form model, payload assembly and the
//! [`workflows::training::ApplicationSubmitter`] view-model; the remaining modules carry the
//! configuration, logging and error plumbing shared with the `training-apply` binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
