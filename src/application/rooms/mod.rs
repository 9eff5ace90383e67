mod create_room;
mod delete_room;
mod get_room;
mod join_room;
mod leave_room;
mod list_members;
mod list_rooms;
mod update_member_role;
mod update_room;

pub use create_room::*;
pub use delete_room::*;
pub use get_room::*;
pub use join_room::*;
pub use leave_room::*;
pub use list_members::*;
pub use list_rooms::*;
pub use update_member_role::*;
pub use update_room::*;
