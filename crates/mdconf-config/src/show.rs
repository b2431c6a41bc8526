//! The result of a finished configuration pass and its display for
//! `mdconf show`.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::global::GlobalConfig;
use crate::resolve::ServerView;
use crate::scope::ServerConfig;
use crate::types::DomainGroup;

/// Immutable outcome of one configuration pass.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Global scope, including the registered domain groups.
    pub global: GlobalConfig,
    /// The main server first, then every virtual host merged onto it.
    pub servers: Vec<ServerConfig>,
    /// Configuration files read during the pass.
    #[serde(skip)]
    pub loaded_files: Vec<String>,
}

/// Output format for `mdconf show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with a comment header.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// The main server scope.
    #[must_use]
    pub fn main(&self) -> Option<ServerView<'_>> {
        self.servers
            .first()
            .map(|server| ServerView::new(server, &self.global))
    }

    /// Look up a server scope by its diagnostic name (`srv[...]`) or by the
    /// bare name inside the brackets.
    #[must_use]
    pub fn server(&self, name: &str) -> Option<ServerView<'_>> {
        self.servers
            .iter()
            .find(|server| {
                server.name.eq_ignore_ascii_case(name)
                    || server
                        .name
                        .strip_prefix("srv[")
                        .and_then(|rest| rest.strip_suffix(']'))
                        .is_some_and(|bare| bare.eq_ignore_ascii_case(name))
            })
            .map(|server| ServerView::new(server, &self.global))
    }

    /// Registered domain groups, as declared.
    #[must_use]
    pub fn domains(&self) -> &[DomainGroup] {
        &self.global.mds
    }

    /// Domain groups with every unset policy filled from the main server.
    #[must_use]
    pub fn completed_domains(&self) -> Vec<DomainGroup> {
        let Some(main) = self.main() else {
            return self.global.mds.clone();
        };
        self.global
            .mds
            .iter()
            .map(|md| {
                let mut md = md.clone();
                md.complete_from(&main);
                md
            })
            .collect()
    }

    /// Render the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show(&self, format: ShowFormat) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(),
            ShowFormat::Json => serde_json::to_string_pretty(self).map_err(|_| fmt::Error),
        }
    }

    fn show_toml(&self) -> Result<String, fmt::Error> {
        let body = toml::to_string_pretty(self).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved managed domain configuration\n");
        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files:\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');
        output.push_str(&body);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::DomainNameSet;
    use crate::pass::ConfigPass;
    use crate::types::{RenewMode, RenewTiming};

    fn sample() -> ResolvedConfig {
        let mut pass = ConfigPass::new();
        let main = pass.main_server();
        let vhost = pass.add_server("www.example.org");
        pass.server_mut(main).unwrap().props.renew_mode = Some(RenewMode::Manual);
        pass.server_mut(vhost).unwrap().props.must_staple = Some(true);

        let names: DomainNameSet = ["example.org", "www.example.org"].into_iter().collect();
        let mut md = DomainGroup::new(names).unwrap();
        md.renew_timing = Some(RenewTiming::percentage(20));
        pass.register_domain_group(md);

        let mut resolved = pass.finish(None);
        resolved.loaded_files.push("/etc/httpd/conf/httpd.conf".to_owned());
        resolved
    }

    #[test]
    fn toml_output_has_header_and_domains() {
        let output = sample().show(ShowFormat::Toml).unwrap();
        assert!(output.starts_with("# Resolved managed domain configuration"));
        assert!(output.contains("#   1. /etc/httpd/conf/httpd.conf"));
        assert!(output.contains("[[global.mds]]"));
        assert!(output.contains("www.example.org"));
    }

    #[test]
    fn json_output_parses() {
        let output = sample().show(ShowFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["global"]["mds"][0]["name"], "example.org");
        assert_eq!(value["global"]["mds"][0]["renew_timing"]["window"], 1_728_000);
        assert_eq!(value["servers"][1]["must_staple"], true);
        assert_eq!(value["servers"][1]["renew_mode"], "manual");
    }

    #[test]
    fn servers_found_by_bare_name() {
        let resolved = sample();
        let view = resolved.server("WWW.example.org").unwrap();
        assert!(view.must_staple());
        assert_eq!(view.renew_mode(), RenewMode::Manual);
        assert!(resolved.server("srv[default]").is_some());
        assert!(resolved.server("other.example").is_none());
    }

    #[test]
    fn completed_domains_inherit_from_main() {
        let resolved = sample();
        assert_eq!(resolved.domains()[0].renew_mode, None);
        let completed = resolved.completed_domains();
        assert_eq!(completed[0].renew_mode, Some(RenewMode::Manual));
        assert_eq!(completed[0].renew_timing, Some(RenewTiming::percentage(20)));
    }
}
