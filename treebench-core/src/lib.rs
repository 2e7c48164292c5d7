//! Core types and workload generation for authenticated tree benchmarks.

pub mod types;
pub mod error;
pub mod generate;
pub mod ordering;
pub mod rng;

pub use types::*;
pub use error::*;
pub use generate::*;
pub use ordering::*;
pub use rng::RunRng;
