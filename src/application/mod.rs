mod access;
mod command_lock;
mod error;

pub mod playback;
pub mod playlist;
pub mod rooms;

pub use access::{is_member, RoomSnapshot};
pub use command_lock::{RoomCommandGuard, RoomCommandLocks};
pub use error::{ErrorKind, SyncError};
