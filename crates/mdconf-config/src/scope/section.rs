//! Save/clear/apply/restore around a managed-domain section body.
//!
//! Entering a section moves the scope's settings into a [`SectionFrame`] and
//! leaves the scope cleared and bound to the new domain. Directives in the
//! body then write into the cleared scope exactly as they would outside a
//! section. Leaving applies what they set onto the domain and puts the saved
//! settings back, on success and failure alike.

use tracing::debug;

use super::{ScopeProps, ServerConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::names::DomainNameSet;
use crate::types::DomainGroup;
use crate::values::{MemberToken, classify_member};

/// Settings of a scope saved while a section body runs.
#[derive(Debug)]
#[must_use = "a section frame must be passed back to `exit_section`"]
pub struct SectionFrame {
    saved: ScopeProps,
}

impl ServerConfig {
    /// Start populating `group` from this scope.
    ///
    /// # Errors
    ///
    /// Returns a context error if a section is already open on this scope.
    pub fn enter_section(&mut self, group: DomainGroup) -> ConfigResult<SectionFrame> {
        if let Some(open) = &self.current {
            return Err(ConfigError::Context {
                directive: format!("<MDomainSet {}>", group.name),
                message: format!("cannot be nested inside the section for '{}'", open.name),
            });
        }
        debug!(scope = %self.name, md = %group.name, "entering managed domain section");
        let saved = std::mem::take(&mut self.props);
        self.current = Some(group);
        Ok(SectionFrame { saved })
    }

    /// Close the open section and restore the settings saved in `frame`.
    ///
    /// When `completed` is true the settings accumulated by the body are
    /// applied onto the domain, which is returned; otherwise the domain is
    /// discarded.
    pub fn exit_section(&mut self, frame: SectionFrame, completed: bool) -> Option<DomainGroup> {
        let group = self.current.take();
        let finished = if completed {
            group.map(|mut md| {
                self.props.apply_onto(&mut md);
                md
            })
        } else {
            None
        };
        self.props = frame.saved;
        debug!(scope = %self.name, completed, "left managed domain section");
        finished
    }
}

/// Parse the arguments of a `<MDomainSet …>` header.
///
/// The first word is always a domain name; later words are offered to the
/// member interpreters (`auto`/`manual`) before being taken as names.
///
/// # Errors
///
/// Returns a semantic error if the closing `>` is missing or no domain name
/// is given.
pub fn parse_section_header(raw: &str) -> ConfigResult<(DomainNameSet, Option<bool>)> {
    let Some(end) = raw.rfind('>') else {
        return Err(ConfigError::semantic(
            "<MDomainSet> directive missing closing '>'",
        ));
    };
    let mut words = raw.get(..end).unwrap_or_default().split_whitespace();
    let Some(first) = words.next() else {
        return Err(ConfigError::semantic(
            "<MDomainSet > section must specify a unique domain name",
        ));
    };

    let rest: Vec<&str> = words.collect();
    let (members, transitive) = collect_members(&rest);
    let mut names = DomainNameSet::new();
    names.insert(first);
    for name in &members {
        names.insert(name);
    }
    Ok((names, transitive))
}

/// Collect a member list where every word may be `auto`/`manual` or a name.
#[must_use]
pub(crate) fn collect_members<S: AsRef<str>>(words: &[S]) -> (DomainNameSet, Option<bool>) {
    let mut names = DomainNameSet::new();
    let mut transitive = None;
    for word in words {
        match classify_member(word.as_ref()) {
            MemberToken::Transitive(value) => transitive = Some(value),
            MemberToken::Domain(name) => {
                names.insert(name);
            },
        }
    }
    (names, transitive)
}
