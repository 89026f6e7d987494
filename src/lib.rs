pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod listener;
pub mod origins;
pub mod reactions;
pub mod search;
