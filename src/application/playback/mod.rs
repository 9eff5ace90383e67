mod change_video;
mod control_playback;
mod request_sync;

pub use change_video::*;
pub use control_playback::*;
pub use request_sync::*;
