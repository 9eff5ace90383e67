//! Client half of the playback protocol: drift correction against the
//! authoritative clock and suppression of a client's own echoed commands.

mod drift;
mod echo;

pub use drift::*;
pub use echo::*;
