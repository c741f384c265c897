//! Resource wrappers
//!
//! Thin handles over the account, app, dataset and input endpoints, used to
//! stage the data that searches run against.

mod app;
mod dataset;
mod inputs;
mod user;

pub use app::App;
pub use dataset::Dataset;
pub use inputs::{InputBuilder, Inputs, UPLOAD_BATCH_SIZE};
pub use user::User;
