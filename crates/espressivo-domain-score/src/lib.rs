pub mod midi_export;
pub mod midi_import;
pub mod model;
pub mod note_map;
pub mod part;
pub mod time_model;

pub use midi_export::*;
pub use midi_import::*;
pub use model::*;
pub use note_map::*;
pub use part::*;
pub use time_model::*;
