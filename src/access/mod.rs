mod resolver;

pub use resolver::{Access, AccessSource, Grant, PermissionResolver};
