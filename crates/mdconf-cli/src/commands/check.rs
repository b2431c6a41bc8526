//! CLI handler for `mdconf check`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use mdconf_config::ResolvedConfig;

/// Resolve the configuration and list its managed domains.
///
/// Exits with status 1 if the configuration is rejected.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn check_config(file: &Path) -> Result<()> {
    match mdconf_config::load(file, None) {
        Ok(resolved) => {
            print!("{}", summary(&resolved));
            Ok(())
        },
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        },
    }
}

/// One line per managed domain, then the loaded files.
pub(crate) fn summary(resolved: &ResolvedConfig) -> String {
    let mut out = String::new();
    let domains = resolved.completed_domains();
    if domains.is_empty() {
        out.push_str("Configuration is valid. No managed domains declared.\n");
    } else {
        let _ = writeln!(out, "Configuration is valid. {} managed domain(s):", domains.len());
        for md in &domains {
            let names: Vec<&str> = md.domains.iter().collect();
            let mode = md
                .renew_mode
                .map_or_else(|| "-".to_owned(), |mode| format!("{mode:?}").to_lowercase());
            let _ = writeln!(out, "  {} [{}] renew={mode}", md.name, names.join(", "));
        }
    }
    if !resolved.loaded_files.is_empty() {
        out.push_str("\nLoaded files:\n");
        for path in &resolved.loaded_files {
            let _ = writeln!(out, "  - {path}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdconf_test::{MIXED_SCOPES, SECTION_SCENARIO};

    #[test]
    fn test_summary_lists_domains() {
        let resolved = mdconf_config::load_str(SECTION_SCENARIO, "httpd.conf", None).unwrap();
        let out = summary(&resolved);
        assert!(out.starts_with("Configuration is valid. 1 managed domain(s):"));
        assert!(out.contains("example.com [example.com, www.example.com] renew=always"));
    }

    #[test]
    fn test_summary_uses_inherited_mode() {
        let resolved = mdconf_config::load_str(MIXED_SCOPES, "httpd.conf", None).unwrap();
        let out = summary(&resolved);
        assert!(out.contains("shop.example.org [shop.example.org, cart.example.org] renew=manual"));
    }

    #[test]
    fn test_summary_without_domains() {
        let resolved = mdconf_config::load_str("MDMustStaple on\n", "httpd.conf", None).unwrap();
        assert!(summary(&resolved).contains("No managed domains declared"));
    }
}
