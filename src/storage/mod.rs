pub mod models;
pub mod output;

pub use output::{emit, OutputOptions};
