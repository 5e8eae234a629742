pub mod midi;
pub mod note_map;
pub mod storage;
pub mod types;

pub use midi::*;
pub use note_map::*;
pub use storage::*;
pub use types::*;
