mod add_video;
mod navigate_playlist;
mod remove_video;
mod reorder_playlist;

pub use add_video::*;
pub use navigate_playlist::*;
pub use remove_video::*;
pub use reorder_playlist::*;
