pub mod audio;
pub mod picker;
pub mod storage;
pub mod types;

pub use audio::*;
pub use picker::*;
pub use storage::*;
pub use types::*;
