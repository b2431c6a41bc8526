#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Scoped configuration resolution for managed TLS domains.
//!
//! Directives are declared at three nested scopes: the process-wide global
//! scope, a server scope per virtual host, and a managed-domain section.
//! Each effective setting resolves by most-specific-wins, and the result is
//! a list of [`DomainGroup`] records for the certificate manager.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let resolved = mdconf_config::load(Path::new("/etc/httpd/conf/httpd.conf"), None).unwrap();
//! for md in resolved.completed_domains() {
//!     println!("{}: {:?}", md.name, md.renew_mode);
//! }
//! ```
//!
//! # Scopes
//!
//! Settings that are not configured stay `None` at every scope, so "unset"
//! is never confused with a configured `off` or zero. Virtual hosts are
//! merged onto the main server field by field (see
//! [`scope::merge_server_scopes`]); a `<MDomainSet>` section temporarily
//! clears its server scope, lets its body populate it, and applies what was
//! set onto the new domain (see [`ConfigPass::with_section`]).

/// Directive table and tree walker.
pub mod commands;
/// Parsed directives and position checks.
pub mod directive;
/// Configuration error types.
pub mod error;
/// Process-wide settings and the domain registry.
pub mod global;
/// Loading a configuration in one call.
pub mod loader;
/// Domain name sets.
pub mod names;
/// Ownership of one configuration pass.
pub mod pass;
/// Accessors with compiled-in defaults.
pub mod resolve;
/// Server scopes, merging and sections.
pub mod scope;
/// Resolved configuration display and serialization.
pub mod show;
/// Configuration text reader.
pub mod text;
/// Shared value types.
pub mod types;
/// Directive argument parsers.
pub mod values;

pub use error::{ConfigError, ConfigResult, ErrorKind};
pub use global::GlobalConfig;
pub use loader::{load, load_str};
pub use names::DomainNameSet;
pub use pass::{ConfigPass, PassId, ServerId};
pub use resolve::{DurationVar, IntVar, ServerView, StrVar};
pub use scope::{ScopeProps, ServerConfig, merge_server_scopes};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;
