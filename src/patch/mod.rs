pub mod filter;
pub mod generator;
pub mod layout;

pub use filter::FileFilter;
pub use generator::{PatchGenerator, PatchRequest};
pub use layout::LayoutMode;
