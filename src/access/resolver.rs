use std::collections::HashSet;

use serde::Serialize;

use crate::error::Result;
use crate::store::Store;
use crate::types::{Capabilities, Page, Role, SpaceRole, User};

/// Read access to what resolution needs. Blanket-implemented for every store.
pub trait AccessSource {
    fn page(&self, id: i64) -> Result<Option<Page>>;
    /// The user's own row on the page, matched by id or by email.
    fn direct_role(&self, page_id: i64, user: &User) -> Result<Option<Role>>;
    fn space_role(&self, space_id: i64, user_id: i64) -> Result<Option<SpaceRole>>;
}

impl<S: Store + ?Sized> AccessSource for S {
    fn page(&self, id: i64) -> Result<Option<Page>> {
        self.get_page(id)
    }

    fn direct_role(&self, page_id: i64, user: &User) -> Result<Option<Role>> {
        Ok(self
            .find_page_role_for_user(page_id, user)?
            .map(|row| row.role))
    }

    fn space_role(&self, space_id: i64, user_id: i64) -> Result<Option<SpaceRole>> {
        Ok(self
            .get_space_member(space_id, user_id)?
            .map(|member| member.role))
    }
}

/// Where an effective role came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Not a member of the page's space.
    NoMembership,
    SpaceOwner,
    /// An explicit row on `page_id`.
    Direct { page_id: i64 },
    /// The general role of `page_id`.
    General { page_id: i64 },
    /// Every page on the chain delegates; members fall back to viewer.
    Default,
    /// The chain ended without anything the user may use.
    Nothing,
    /// The parent chain loops or runs past the page's depth.
    BrokenChain,
}

/// The outcome of resolving one user against one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Access {
    /// `None` when the user has no access at all.
    pub role: Option<Role>,
    pub capabilities: Capabilities,
    pub grant: Grant,
}

impl Access {
    fn none(grant: Grant) -> Self {
        Self {
            role: None,
            capabilities: Capabilities::NONE,
            grant,
        }
    }

    fn from_role(role: Role, grant: Grant) -> Self {
        let capabilities = role.capabilities();
        if capabilities.is_empty() {
            return Self::none(grant);
        }
        Self {
            role: Some(role),
            capabilities,
            grant,
        }
    }

    pub fn can_view(&self) -> bool {
        self.capabilities.can_view()
    }

    pub fn can_comment(&self) -> bool {
        self.capabilities.can_comment()
    }

    pub fn can_edit(&self) -> bool {
        self.capabilities.can_edit()
    }

    pub fn can_manage(&self) -> bool {
        self.capabilities.can_manage()
    }

    pub fn has(&self, required: Capabilities) -> bool {
        self.capabilities.has(required)
    }
}

/// Resolves what a user may do on a page.
///
/// Space membership is checked first: without it there is no access, and a
/// space owner may do everything. Otherwise the walk goes from the page up
/// through its ancestors. The first explicit row for the user that is not
/// `inherit` settles the answer. If the walk reaches the top without one, the
/// nearest general role that is not `inherit` applies, for members only.
///
/// The walk takes at most `depth + 1` steps. A repeated page or a longer chain
/// means corrupt parent links and resolves to no access.
pub struct PermissionResolver<'a, S: AccessSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: AccessSource + ?Sized> PermissionResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn resolve(&self, user: &User, page: &Page) -> Result<Access> {
        let space_role = match self.source.space_role(page.space_id, user.id)? {
            Some(role) => role,
            None => return Ok(Access::none(Grant::NoMembership)),
        };

        if space_role == SpaceRole::Owner {
            return Ok(Access::from_role(Role::Owner, Grant::SpaceOwner));
        }

        let max_steps = page.depth() + 1;
        let mut visited = HashSet::with_capacity(max_steps);
        let mut general: Option<(Role, i64)> = None;
        let mut current = Some(page.clone());

        while let Some(node) = current.take() {
            if !visited.insert(node.id) {
                tracing::warn!("Page {} has a cyclic parent chain", page.id);
                return Ok(Access::none(Grant::BrokenChain));
            }
            if visited.len() > max_steps {
                tracing::warn!("Page {} has a parent chain longer than its path", page.id);
                return Ok(Access::none(Grant::BrokenChain));
            }

            if let Some(role) = self.source.direct_role(node.id, user)? {
                if role.is_decisive() {
                    tracing::debug!(
                        "User {} resolves to {role} on page {} via page {}",
                        user.id,
                        page.id,
                        node.id
                    );
                    return Ok(Access::from_role(role, Grant::Direct { page_id: node.id }));
                }
            }

            if general.is_none() && node.general_role.is_decisive() {
                general = Some((node.general_role, node.id));
            }

            current = match node.parent_id {
                Some(parent_id) => self.source.page(parent_id)?,
                None => None,
            };
        }

        if space_role == SpaceRole::Guest {
            return Ok(Access::none(Grant::Nothing));
        }

        Ok(match general {
            Some((role, page_id)) => Access::from_role(role, Grant::General { page_id }),
            None => Access::from_role(Role::Viewer, Grant::Default),
        })
    }

    pub fn can(&self, user: &User, page: &Page, required: Capabilities) -> Result<bool> {
        Ok(self.resolve(user, page)?.has(required))
    }
}
