pub mod client;
pub mod contents;
pub mod error;
pub mod models;

pub use client::GithubClient;
pub use error::ApiError;
