mod activities;
pub mod dto;
mod pages;
pub mod response;
mod roles;
mod router;
mod shares;

pub use router::{AppState, create_router};
