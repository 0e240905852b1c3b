use std::fmt;

use serde::{Deserialize, Serialize};

/// Capabilities is a bitmask of what a user may do on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const VIEW: Capabilities = Capabilities(1 << 0); // 1
    pub const COMMENT: Capabilities = Capabilities(1 << 1); // 2
    pub const EDIT: Capabilities = Capabilities(1 << 2); // 4
    pub const MANAGE: Capabilities = Capabilities(1 << 3); // 8

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if this bitmask contains the required capability.
    #[must_use]
    pub const fn has(self, required: Capabilities) -> bool {
        self.0 & required.0 == required.0
    }

    #[must_use]
    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Expands a bitmask to include implied capabilities.
    /// manage implies edit implies comment implies view.
    #[must_use]
    pub fn expand_implied(self) -> Capabilities {
        let mut result = self.0;

        if self.has(Self::MANAGE) {
            result |= Self::EDIT.0;
        }
        if Capabilities(result).has(Self::EDIT) {
            result |= Self::COMMENT.0;
        }
        if Capabilities(result).has(Self::COMMENT) {
            result |= Self::VIEW.0;
        }

        Capabilities(result)
    }

    pub fn can_view(self) -> bool {
        self.has(Self::VIEW)
    }

    pub fn can_comment(self) -> bool {
        self.has(Self::COMMENT)
    }

    pub fn can_edit(self) -> bool {
        self.has(Self::EDIT)
    }

    pub fn can_manage(self) -> bool {
        self.has(Self::MANAGE)
    }

    #[must_use]
    pub fn to_strings(self) -> Vec<&'static str> {
        let mut caps = Vec::new();
        if self.has(Self::VIEW) {
            caps.push("view");
        }
        if self.has(Self::COMMENT) {
            caps.push("comment");
        }
        if self.has(Self::EDIT) {
            caps.push("edit");
        }
        if self.has(Self::MANAGE) {
            caps.push("manage");
        }
        caps
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strings().join(", "))
    }
}
