//! Server-scope configuration records.
//!
//! A [`ServerConfig`] holds what one server scope has *explicitly* set. Every
//! setting lives in [`ScopeProps`] as an `Option`, so "not configured here"
//! (inherit) and "configured to off/zero" stay distinct through clearing,
//! copying, applying and merging.

mod merge;
mod section;

pub use merge::merge_server_scopes;
pub use section::{SectionFrame, parse_section_header};
pub(crate) use section::collect_members;

use serde::Serialize;

use crate::pass::PassId;
use crate::types::{DomainGroup, KeySpec, RenewMode, RenewTiming, RequireHttps};

/// The settings a scope may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeProps {
    /// Auto-add names from matching virtual hosts.
    pub transitive: Option<bool>,
    /// http to https redirect policy.
    pub require_https: Option<RequireHttps>,
    /// Renewal driving mode.
    pub renew_mode: Option<RenewMode>,
    /// Must-Staple flag.
    pub must_staple: Option<bool>,
    /// Private key parameters.
    pub pkey_spec: Option<KeySpec>,
    /// Normalized lifetime and renewal window, always set as a pair.
    pub renew_timing: Option<RenewTiming>,
    /// ACME directory URL.
    pub ca_url: Option<String>,
    /// Certificate protocol.
    pub ca_proto: Option<String>,
    /// Accepted terms-of-service agreement.
    pub ca_agreement: Option<String>,
    /// Allowed challenge types.
    pub ca_challenges: Option<Vec<String>>,
}

impl ScopeProps {
    /// Reset every setting to unset.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy the settings that are set here onto `md`.
    ///
    /// Settings that are unset here leave `md` untouched.
    pub fn apply_onto(&self, md: &mut DomainGroup) {
        if let Some(require_https) = self.require_https {
            md.require_https = Some(require_https);
        }
        if let Some(transitive) = self.transitive {
            md.transitive = Some(transitive);
        }
        if let Some(renew_mode) = self.renew_mode {
            md.renew_mode = Some(renew_mode);
        }
        if let Some(must_staple) = self.must_staple {
            md.must_staple = Some(must_staple);
        }
        if let Some(pkey_spec) = self.pkey_spec {
            md.pkey_spec = Some(pkey_spec);
        }
        if let Some(timing) = self.renew_timing {
            md.renew_timing = Some(timing);
        }
        if let Some(ca_url) = &self.ca_url {
            md.ca_url = Some(ca_url.clone());
        }
        if let Some(ca_proto) = &self.ca_proto {
            md.ca_proto = Some(ca_proto.clone());
        }
        if let Some(ca_agreement) = &self.ca_agreement {
            md.ca_agreement = Some(ca_agreement.clone());
        }
        if let Some(challenges) = &self.ca_challenges {
            md.ca_challenges = Some(challenges.clone());
        }
    }
}

/// Configuration record of one server scope.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Diagnostic name, e.g. `srv[www.example.org]`.
    pub name: String,
    /// Explicitly configured settings.
    #[serde(flatten)]
    pub props: ScopeProps,
    /// Name of the managed domain this server was assigned to, if any.
    ///
    /// Written by the certificate-management side once domains are matched
    /// to servers; resolution only clears it when scopes are merged.
    pub assigned: Option<String>,
    #[serde(skip)]
    pub(crate) global: Option<PassId>,
    /// Managed domain being populated while inside a section body.
    #[serde(skip)]
    pub(crate) current: Option<DomainGroup>,
}

impl ServerConfig {
    /// A scope with nothing set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: ScopeProps::default(),
            assigned: None,
            global: None,
            current: None,
        }
    }

    pub(crate) fn bound_to(mut self, pass: PassId) -> Self {
        self.global = Some(pass);
        self
    }

    /// Compiled-in defaults, with every defaultable setting present.
    #[must_use]
    pub fn defaults() -> Self {
        let mut config = Self::new("default");
        config.props = crate::resolve::default_props();
        config
    }

    /// The configuration pass this scope belongs to.
    #[must_use]
    pub fn pass(&self) -> Option<PassId> {
        self.global
    }

    /// Reset every setting to unset.
    pub fn clear(&mut self) {
        self.props.clear();
    }

    /// Overwrite this scope's settings with a verbatim copy of `from`'s.
    pub fn copy_props_from(&mut self, from: &Self) {
        self.props.clone_from(&from.props);
    }

    /// Copy the settings set on this scope onto `md`.
    pub fn apply_onto(&self, md: &mut DomainGroup) {
        self.props.apply_onto(md);
    }

    /// The managed domain currently being populated, if inside a section.
    #[must_use]
    pub fn section(&self) -> Option<&DomainGroup> {
        self.current.as_ref()
    }

    /// Mutable access to the managed domain being populated.
    pub fn section_mut(&mut self) -> Option<&mut DomainGroup> {
        self.current.as_mut()
    }

    /// Whether a section body is being processed against this scope.
    #[must_use]
    pub fn in_section(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests;
