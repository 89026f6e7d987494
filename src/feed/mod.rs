pub mod aggregator;
pub mod store;

pub use aggregator::FeedAggregator;
pub use store::FeedStore;
