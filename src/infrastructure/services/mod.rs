mod room_hub;

pub use room_hub::{RoomHub, Subscriber};
