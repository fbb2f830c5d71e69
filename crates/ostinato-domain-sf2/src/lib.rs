pub mod error;
pub mod hydra;
pub mod load;
pub mod model;
pub mod render;
pub mod riff;
#[cfg(feature = "testutil")]
pub mod testutil;

pub use error::*;
pub use load::*;
pub use model::*;
pub use render::*;
