use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role tier.
///
/// Ordering is privilege, not sequence: `Unverified` and `Normal` are both
/// non-privileged, they differ only in whether the email has been proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum AccountRole {
    #[default]
    Unverified = 0,
    Normal = 1,
    Admin = 2,
    SuperAdmin = 3,
}

impl AccountRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use AccountRole::*;
        match self {
            Unverified => "unverified",
            Normal => "normal",
            Admin => "admin",
            SuperAdmin => "super_admin",
        }
    }

    #[inline]
    pub const fn is_admin_or_higher(&self) -> bool {
        use AccountRole::*;
        matches!(self, Admin | SuperAdmin)
    }

    #[inline]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, AccountRole::SuperAdmin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use AccountRole::*;
        match id {
            0 => Some(Unverified),
            1 => Some(Normal),
            2 => Some(Admin),
            3 => Some(SuperAdmin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use AccountRole::*;
        match code {
            "unverified" => Some(Unverified),
            "normal" => Some(Normal),
            "admin" => Some(Admin),
            "super_admin" => Some(SuperAdmin),
            _ => None,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
