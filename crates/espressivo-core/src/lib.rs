pub mod history;
pub mod ipc;
pub mod jobs;
pub mod note_maps;
pub mod render;
pub mod session;

pub use history::*;
pub use ipc::*;
pub use jobs::*;
pub use note_maps::*;
pub use render::*;
pub use session::*;
