//! Trackers for the most frequent items of a stream.
//!
//! [`CountAllTopK`] ranks items by their count-min sketch estimate and supports weighted
//! insertions. [`HeavyKeeperTopK`] keeps counts in a decaying fingerprint sketch, which favours
//! items that dominate the stream.

mod count_all_top_k;
mod heavy_keeper;

pub use self::count_all_top_k::CountAllTopK;
pub use self::heavy_keeper::HeavyKeeperTopK;
