pub mod client;
pub mod library;
pub mod models;
pub mod player;
pub mod search;

pub use client::SpotifyClient;
pub use search::SEARCH_LIMIT;
