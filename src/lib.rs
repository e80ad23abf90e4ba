//! News Digest - a news aggregator with a daily digest
//!
//! This crate fetches RSS feeds, top headlines and social posts, sorts them
//! into Local, National, Global and Hindi buckets, and serves them through a
//! web interface, a digest file, an email and a quiz.

pub mod categorize;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetcher;
pub mod headlines;
pub mod mailer;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod quiz;
pub mod registry;
pub mod routes;
pub mod search;
pub mod session;
pub mod social;
