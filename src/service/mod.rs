mod page;
mod workspace;

pub use page::{CreatePage, PageService, PublicPage, StarredPage};
pub use workspace::WorkspaceService;
