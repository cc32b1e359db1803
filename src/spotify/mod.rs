pub mod client;
pub mod error;
pub mod link;
pub mod models;
pub mod parser;
pub mod routes;
pub mod token;

pub use client::{SpotifyClient, SpotifySettings};
pub use error::{ApiError, AuthError, SpotifyError};
