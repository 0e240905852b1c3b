use thiserror::Error;

use super::Capabilities;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::types::ParseEnumError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::types::ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;

string_enum! {
    /// Role held on a page, either by a specific grantee or as the page's general role.
    pub enum Role("page role") {
        Owner => "owner",
        Editor => "editor",
        Commenter => "commenter",
        Viewer => "viewer",
        /// Grants nothing and stops propagation.
        Restrict => "restrict",
        /// Defers to the parent page for this identity.
        Inherit => "inherit",
    }
}

impl Role {
    /// Fixed role to capability table. `Inherit` resolves to nothing on its own.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Role::Owner => Capabilities::new(
                Capabilities::VIEW.bits()
                    | Capabilities::COMMENT.bits()
                    | Capabilities::EDIT.bits()
                    | Capabilities::MANAGE.bits(),
            ),
            Role::Editor => Capabilities::new(
                Capabilities::VIEW.bits() | Capabilities::COMMENT.bits() | Capabilities::EDIT.bits(),
            ),
            Role::Commenter => {
                Capabilities::new(Capabilities::VIEW.bits() | Capabilities::COMMENT.bits())
            }
            Role::Viewer => Capabilities::VIEW,
            Role::Restrict | Role::Inherit => Capabilities::NONE,
        }
    }

    /// Whether a row with this role settles resolution at its page.
    pub const fn is_decisive(self) -> bool {
        !matches!(self, Role::Inherit)
    }

    /// Roles that may be handed out to a grantee.
    pub const fn is_grantable(self) -> bool {
        !matches!(self, Role::Inherit)
    }

    /// General role assigned to a new page.
    pub const fn default_general(is_root: bool) -> Role {
        if is_root { Role::Restrict } else { Role::Inherit }
    }
}

string_enum! {
    /// Membership role within a space. Gates page visibility before page roles are consulted.
    pub enum SpaceRole("space role") {
        /// Manages every page in the space.
        Owner => "owner",
        /// Sees pages through page roles and general roles.
        Member => "member",
        /// Sees pages through explicit page roles only.
        Guest => "guest",
    }
}

string_enum! {
    pub enum OrgRole("organization role") {
        Owner => "owner",
        Admin => "admin",
        Member => "member",
    }
}

string_enum! {
    pub enum ViewType("view type") {
        Document => "document",
        Table => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_table_is_ordered() {
        let owner = Role::Owner.capabilities();
        let editor = Role::Editor.capabilities();
        let commenter = Role::Commenter.capabilities();
        let viewer = Role::Viewer.capabilities();

        assert!(owner.has(editor));
        assert!(editor.has(commenter));
        assert!(commenter.has(viewer));
        assert!(viewer.can_view());
        assert!(!viewer.can_comment());
        assert!(Role::Restrict.capabilities().is_empty());
        assert!(Role::Inherit.capabilities().is_empty());
        assert!(owner.can_manage());
        assert!(!editor.can_manage());
    }

    #[test]
    fn test_role_table_matches_expansion() {
        for role in Role::ALL {
            let caps = role.capabilities();
            assert_eq!(caps, caps.expand_implied(), "{role} is not closed under implication");
        }
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("owner".parse::<Role>(), Ok(Role::Owner));
        assert_eq!("inherit".parse::<Role>(), Ok(Role::Inherit));
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "page role");
        assert_eq!(err.value, "admin");
    }

    #[test]
    fn test_roundtrip_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        for role in SpaceRole::ALL {
            assert_eq!(role.to_string().parse::<SpaceRole>().unwrap(), *role);
        }
        assert_eq!("table".parse::<ViewType>(), Ok(ViewType::Table));
    }

    #[test]
    fn test_default_general_role() {
        assert_eq!(Role::default_general(true), Role::Restrict);
        assert_eq!(Role::default_general(false), Role::Inherit);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Role::Commenter).unwrap();
        assert_eq!(json, "\"commenter\"");
        let parsed: SpaceRole = serde_json::from_str("\"guest\"").unwrap();
        assert_eq!(parsed, SpaceRole::Guest);
    }
}
