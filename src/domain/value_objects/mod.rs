mod room_settings;
mod video_spec;

pub use room_settings::*;
pub use video_spec::*;
