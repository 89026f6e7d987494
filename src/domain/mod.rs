pub mod models;

pub use models::{apply_toggle, Post, RawPost, ReactionKind, Visibility};
