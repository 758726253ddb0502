pub mod engine;
pub mod polars_engine;
pub mod result;

pub use engine::*;
pub use polars_engine::*;
pub use result::*;
