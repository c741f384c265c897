//! HTTP networking module
//!
//! Provides the authenticated client used by every resource wrapper.

mod client;
mod user_agent;

pub use client::{user_path, ApiClient, UserAppId};
pub use user_agent::sdk_user_agent;
