pub mod attributes;
pub mod client;
pub mod config;
pub mod context;
pub mod controller;
pub mod credential;
pub mod error;
pub mod page;
pub mod payload;
pub mod toast;

pub use client::{SubmissionClient, Submitter};
pub use config::Config;
pub use controller::{Attempt, Controller, CredentialResponse, Phase};
pub use error::{AuthError, Channel, FederatedError};
pub use payload::SubmissionRecord;
