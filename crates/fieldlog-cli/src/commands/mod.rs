pub mod common;
pub mod conflicts;
pub mod refresh;
pub mod status;
pub mod sync;
