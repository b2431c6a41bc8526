//! Parsed configuration directives and the position they occur in.

use crate::error::{ConfigError, ConfigResult};

/// Section names that open a managed-domain section.
pub const MD_SECTIONS: &[&str] = &["<MDomainSet", "<MDomain"];

const VIRTUAL_HOST: &str = "<VirtualHost";

const DIR_LOC_FILE: &[&str] = &[
    "<Directory",
    "<DirectoryMatch",
    "<Location",
    "<LocationMatch",
    "<Files",
    "<FilesMatch",
    "<Limit",
    "<LimitExcept",
];

/// One node of a parsed configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Name as written; sections keep their leading `<`.
    pub name: String,
    /// Arguments split into words, quotes removed.
    pub args: Vec<String>,
    /// Argument text as written. For sections this includes the closing `>`.
    pub raw_args: String,
    /// File the directive was read from.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Nested directives of a section.
    pub children: Vec<Directive>,
}

impl Directive {
    /// Whether this node is a `<Section>` container.
    #[must_use]
    pub fn is_section(&self) -> bool {
        self.name.starts_with('<')
    }

    /// Whether this node has the given name (case-insensitive).
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Position rules a directive can be held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextCheck {
    /// Not inside `<VirtualHost>` nor any directory-like section.
    GlobalOnly,
    /// Not inside `<Directory>`, `<Location>`, `<Files>` or `<Limit>`.
    NotInDirLocFile,
}

/// Where a directive occurs: itself plus the names of its enclosing sections,
/// outermost first.
#[derive(Debug, Clone, Copy)]
pub struct CmdContext<'a> {
    directive: &'a str,
    parents: &'a [String],
}

impl<'a> CmdContext<'a> {
    /// Describe `directive` nested in `parents`.
    #[must_use]
    pub fn new(directive: &'a str, parents: &'a [String]) -> Self {
        Self { directive, parents }
    }

    /// Whether any enclosing section is named `section` (case-insensitive).
    #[must_use]
    pub fn inside_section(&self, section: &str) -> bool {
        self.parents
            .iter()
            .any(|parent| parent.eq_ignore_ascii_case(section))
    }

    /// Whether an enclosing section is a managed-domain section.
    #[must_use]
    pub fn inside_md_section(&self) -> bool {
        MD_SECTIONS.iter().any(|section| self.inside_section(section))
    }

    /// Reject the directive when it occurs in a forbidden position.
    ///
    /// # Errors
    ///
    /// Returns a context error naming the offending enclosing section.
    pub fn check(&self, rule: ContextCheck) -> ConfigResult<()> {
        if rule == ContextCheck::GlobalOnly && self.inside_section(VIRTUAL_HOST) {
            return Err(self.context_error("cannot occur within <VirtualHost> section"));
        }
        if DIR_LOC_FILE.iter().any(|section| self.inside_section(section)) {
            return Err(self.context_error("cannot occur within <Directory/Location/Files> section"));
        }
        Ok(())
    }

    /// Error for a directive that must be inside an MD section.
    #[must_use]
    pub fn not_in_section(&self) -> ConfigError {
        self.context_error("is only valid inside a '<MDomainSet' context, not here")
    }

    fn context_error(&self, message: &str) -> ConfigError {
        ConfigError::Context {
            directive: self.directive.to_owned(),
            message: message.to_owned(),
        }
    }
}
