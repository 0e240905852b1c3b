mod activity;
mod capability;
mod models;
mod role;

pub use activity::*;
pub use capability::Capabilities;
pub use models::*;
pub use role::{OrgRole, ParseEnumError, Role, SpaceRole, ViewType};
