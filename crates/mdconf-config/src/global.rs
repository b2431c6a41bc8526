//! Process-wide settings of one configuration pass.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ConfigResult;
use crate::types::{DomainGroup, HSTS_MAX_AGE_DEFAULT};
use crate::values::parse_port_map;

/// Store directory used when none is configured, relative to the state dir.
pub const DEFAULT_BASE_DIR: &str = "md";

/// Environment key holding the dns-01 setup/teardown command.
pub const DNS01_CMD_KEY: &str = "cmd-dns-01";

/// Settings shared by all server scopes, plus the declared managed domains.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize)]
pub struct GlobalConfig {
    /// Directory for managed domain storage.
    pub base_dir: Option<String>,
    /// Outbound proxy for CA traffic.
    pub proxy_url: Option<String>,
    /// Local port reachable as port 80, `0` if unreachable.
    pub local_80: u16,
    /// Local port reachable as port 443, `0` if unreachable.
    pub local_443: u16,
    /// Whether the base server (outside virtual hosts) may be managed.
    pub manage_base_server: bool,
    /// HSTS `max-age`; `0` disables the header.
    pub hsts_max_age: u32,
    /// `Strict-Transport-Security` value derived after configuration.
    pub hsts_header: Option<String>,
    /// Command run when a domain's certificate was renewed.
    pub notify_cmd: Option<String>,
    /// Extra settings passed to helper programs.
    pub env: BTreeMap<String, String>,
    /// Show managed domains on the server-status page.
    pub server_status_enabled: bool,
    /// Expose the certificate-status resource.
    pub certificate_status_enabled: bool,
    /// Managed domains in declaration order.
    pub mds: Vec<DomainGroup>,
    /// Names of domains no longer in use.
    pub unused_names: Vec<String>,
    /// Names being watched.
    pub watched_names: Vec<String>,
    /// Initialization errors per domain name, filled by later stages.
    #[serde(skip)]
    pub init_errors: HashMap<String, String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            proxy_url: None,
            local_80: 80,
            local_443: 443,
            manage_base_server: false,
            hsts_max_age: HSTS_MAX_AGE_DEFAULT,
            hsts_header: None,
            notify_cmd: None,
            env: BTreeMap::new(),
            server_status_enabled: true,
            certificate_status_enabled: true,
            mds: Vec::new(),
            unused_names: Vec::new(),
            watched_names: Vec::new(),
            init_errors: HashMap::new(),
        }
    }
}

impl GlobalConfig {
    /// Parse a port mapping and record it for port 80 or 443.
    ///
    /// # Errors
    ///
    /// Propagates the parser's format or semantic error; nothing is changed.
    pub fn set_port_map(&mut self, value: &str) -> ConfigResult<()> {
        let map = parse_port_map(value)?;
        if map.net_port == 80 {
            self.local_80 = map.local_port;
        } else {
            self.local_443 = map.local_port;
        }
        debug!(net = map.net_port, local = map.local_port, "port mapping");
        Ok(())
    }

    /// Append a managed domain.
    ///
    /// Names claimed by more than one domain are not detected here.
    pub fn register_domain_group(&mut self, md: DomainGroup) {
        info!(
            md = %md.name,
            domains = md.domains.len(),
            file = md.defn_name.as_deref().unwrap_or("-"),
            "registered managed domain"
        );
        self.mds.push(md);
    }

    /// Look up a managed domain by name.
    #[must_use]
    pub fn domain_group(&self, name: &str) -> Option<&DomainGroup> {
        self.mds.iter().find(|md| md.name.eq_ignore_ascii_case(name))
    }

    /// Record the dns-01 challenge command.
    pub fn set_dns01_cmd(&mut self, cmd: &str) {
        self.env.insert(DNS01_CMD_KEY.to_owned(), cmd.to_owned());
    }

    /// The dns-01 challenge command, if configured.
    #[must_use]
    pub fn dns01_cmd(&self) -> Option<&str> {
        self.env.get(DNS01_CMD_KEY).map(String::as_str)
    }

    /// Fill in values derived once all directives have been read.
    ///
    /// Computes the HSTS header and, without `MDStoreDir`, places the store
    /// at [`DEFAULT_BASE_DIR`] below `state_dir`.
    pub fn post_config(&mut self, state_dir: Option<&Path>) {
        self.hsts_header = (self.hsts_max_age > 0).then(|| format!("max-age={}", self.hsts_max_age));
        if self.base_dir.is_none() {
            let dir = state_dir.map_or_else(
                || DEFAULT_BASE_DIR.to_owned(),
                |state| state.join(DEFAULT_BASE_DIR).to_string_lossy().into_owned(),
            );
            debug!(base_dir = %dir, "using default store directory");
            self.base_dir = Some(dir);
        }
    }
}
