pub mod order;
pub mod stats;
