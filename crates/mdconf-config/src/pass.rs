//! Ownership of everything created during one configuration pass.
//!
//! A [`ConfigPass`] owns the global scope and all server scopes. It is
//! threaded through every directive handler instead of living in ambient
//! global storage. Handles ([`ServerId`]) carry the id of the pass that
//! issued them, so a handle kept across [`ConfigPass::teardown`] is rejected
//! instead of silently reaching into a fresh pass.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::global::GlobalConfig;
use crate::scope::{ServerConfig, merge_server_scopes};
use crate::show::ResolvedConfig;
use crate::types::DomainGroup;

static NEXT_PASS: AtomicU64 = AtomicU64::new(1);

/// Identity of one configuration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(u64);

impl PassId {
    fn next() -> Self {
        Self(NEXT_PASS.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass#{}", self.0)
    }
}

/// Handle to a server scope inside a [`ConfigPass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerId {
    pass: PassId,
    index: usize,
}

impl ServerId {
    /// Whether this is the main (base) server scope.
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.index == 0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server#{}@{}", self.index, self.pass)
    }
}

/// State of one configuration pass.
#[derive(Debug)]
pub struct ConfigPass {
    id: PassId,
    global: Option<GlobalConfig>,
    servers: Vec<ServerConfig>,
}

impl Default for ConfigPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPass {
    /// Start a new pass with no scopes allocated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: PassId::next(),
            global: None,
            servers: Vec::new(),
        }
    }

    /// Identity of this pass.
    #[must_use]
    pub fn id(&self) -> PassId {
        self.id
    }

    /// The global scope, created on first use.
    pub fn global_mut(&mut self) -> &mut GlobalConfig {
        self.global.get_or_insert_with(|| {
            debug!(pass = %self.id, "creating global scope");
            GlobalConfig::default()
        })
    }

    /// The global scope if it has been created.
    #[must_use]
    pub fn global(&self) -> Option<&GlobalConfig> {
        self.global.as_ref()
    }

    /// Allocate a server scope named `srv[<name>]`.
    pub fn add_server(&mut self, name: &str) -> ServerId {
        self.global_mut();
        let index = self.servers.len();
        self.servers
            .push(ServerConfig::new(format!("srv[{name}]")).bound_to(self.id));
        debug!(pass = %self.id, index, name, "created server scope");
        ServerId {
            pass: self.id,
            index,
        }
    }

    /// The main server scope, created on first use.
    pub fn main_server(&mut self) -> ServerId {
        if self.servers.is_empty() {
            return self.add_server("default");
        }
        ServerId {
            pass: self.id,
            index: 0,
        }
    }

    fn check(&self, id: ServerId) -> ConfigResult<usize> {
        if id.pass != self.id || id.index >= self.servers.len() {
            return Err(ConfigError::StaleScope {
                scope: id.to_string(),
            });
        }
        Ok(id.index)
    }

    /// Look up a server scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleScope`] for a handle from another pass.
    pub fn server(&self, id: ServerId) -> ConfigResult<&ServerConfig> {
        let index = self.check(id)?;
        self.servers
            .get(index)
            .ok_or_else(|| ConfigError::StaleScope {
                scope: id.to_string(),
            })
    }

    /// Mutable lookup of a server scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleScope`] for a handle from another pass.
    pub fn server_mut(&mut self, id: ServerId) -> ConfigResult<&mut ServerConfig> {
        let index = self.check(id)?;
        self.servers
            .get_mut(index)
            .ok_or_else(|| ConfigError::StaleScope {
                scope: id.to_string(),
            })
    }

    /// Number of server scopes allocated so far.
    #[must_use]
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Append a managed domain to the global scope.
    pub fn register_domain_group(&mut self, md: DomainGroup) {
        self.global_mut().register_domain_group(md);
    }

    /// Run `body` with `group` open as a section on `server`.
    ///
    /// The scope's settings are saved and cleared before `body` runs and
    /// restored afterwards whatever `body` returns. Only when `body`
    /// succeeds are the settings it made applied onto `group`, and the group
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or a context error if `server` already
    /// has a section open.
    pub fn with_section<F>(&mut self, server: ServerId, group: DomainGroup, body: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Self) -> ConfigResult<()>,
    {
        let frame = self.server_mut(server)?.enter_section(group)?;
        let outcome = body(self);
        let finished = self
            .server_mut(server)?
            .exit_section(frame, outcome.is_ok());
        outcome?;
        if let Some(md) = finished {
            self.register_domain_group(md);
        }
        Ok(())
    }

    /// Drop all scopes and start over under a new pass id.
    pub fn teardown(&mut self) {
        debug!(pass = %self.id, servers = self.servers.len(), "tearing down configuration pass");
        self.global = None;
        self.servers.clear();
        self.id = PassId::next();
    }

    /// Fill in derived global values.
    pub fn post_config(&mut self, state_dir: Option<&Path>) {
        self.global_mut().post_config(state_dir);
    }

    /// End the pass: derive global values and merge every virtual host onto
    /// the main server.
    #[must_use]
    pub fn finish(mut self, state_dir: Option<&Path>) -> ResolvedConfig {
        self.post_config(state_dir);
        self.main_server();

        let mut servers = std::mem::take(&mut self.servers).into_iter();
        let mut resolved = Vec::new();
        if let Some(main) = servers.next() {
            for vhost in servers {
                let mut merged = merge_server_scopes(&main, &vhost);
                merged.name.clone_from(&vhost.name);
                resolved.push(merged);
            }
            resolved.insert(0, main);
        }

        let global = self.global.take().unwrap_or_default();
        info!(
            pass = %self.id,
            servers = resolved.len(),
            domains = global.mds.len(),
            "configuration resolved"
        );
        ResolvedConfig {
            global,
            servers: resolved,
            loaded_files: Vec::new(),
        }
    }
}
