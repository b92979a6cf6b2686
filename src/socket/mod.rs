pub mod client;

pub use client::spawn_feeds;
