//! Output files.

pub mod trajectory;
pub use trajectory::{format_sci, read_trajectory, write_trajectory};
