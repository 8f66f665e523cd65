//! Built-in transpilation passes.

pub mod basis;
pub mod expand;
pub mod remap;
pub mod routing;

pub use basis::{BasisDecomposition, Target};
pub use expand::ExpandThreeQubit;
pub use remap::UsageRemap;
pub use routing::SabreRouting;
