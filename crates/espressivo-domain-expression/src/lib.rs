pub mod apex;
pub mod curve;
pub mod onset;
pub mod preset;
pub mod velocity;

pub use apex::*;
pub use curve::*;
pub use onset::*;
pub use preset::*;
pub use velocity::*;
