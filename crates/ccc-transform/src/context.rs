//! Per-import settings shared by every row.

use std::fmt;

/// How file-like records obtain and check their content identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Validate identifiers the row carries, register the rest.
    #[default]
    Register,
    /// Validate identifiers the row carries; a row without one fails.
    ValidateOnly,
    /// Make no service calls; rows without an identifier get a
    /// deterministic placeholder derived from their path.
    SkipWithPlaceholder,
}

impl IdentityPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::ValidateOnly => "validate-only",
            Self::SkipWithPlaceholder => "skip",
        }
    }

    /// Returns true when the policy talks to the identity service.
    pub fn uses_service(&self) -> bool {
        !matches!(self, Self::SkipWithPlaceholder)
    }
}

impl fmt::Display for IdentityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who is importing, for which project, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeContext {
    pub site_id: String,
    pub user: String,
    pub project_code: String,
    pub identity: IdentityPolicy,
}

impl NormalizeContext {
    pub fn new(
        site_id: impl Into<String>,
        user: impl Into<String>,
        project_code: impl Into<String>,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            user: user.into(),
            project_code: project_code.into(),
            identity: IdentityPolicy::default(),
        }
    }

    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.identity = policy;
        self
    }
}
