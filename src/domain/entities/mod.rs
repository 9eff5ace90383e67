mod membership;
mod playback_state;
mod playlist_item;
mod room;

pub use membership::*;
pub use playback_state::*;
pub use playlist_item::*;
pub use room::*;
