//! Bloodlink: Generative Flows for Blood Donation
//!
//! Typed adapters that turn structured requests (blood request fulfillment,
//! donor notifications, supply and demand insights) into prompts for a
//! text-generation backend, and turn the backend's answers back into
//! validated, structured results.
//!
//! Every flow follows the same contract: validate the input against its
//! schema, render the flow's prompt template, submit the prompt together with
//! the output schema, and coerce the answer into the declared output shape.

pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod logging;
pub mod provider;
pub mod schema;
pub mod stats;
pub mod template;
pub mod types;
