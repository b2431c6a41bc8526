//! Read access to resolved settings with compiled-in fallbacks.
//!
//! A [`ServerView`] pairs a server scope with the global scope. Each
//! accessor returns the scope's value when set and otherwise the compiled-in
//! default; an unset enum never reads as zero.

use std::time::Duration;

use crate::global::GlobalConfig;
use crate::scope::{ScopeProps, ServerConfig};
use crate::types::{
    DomainGroup, KeySpec, RENEW_NORM, RENEW_WINDOW_DEFAULT, RenewMode, RenewTiming, RequireHttps,
};

/// Certificate protocol used when none is configured.
pub const DEFAULT_CA_PROTO: &str = "ACME";

const DEFAULT_TIMING: RenewTiming = RenewTiming {
    norm: RENEW_NORM,
    window: RENEW_WINDOW_DEFAULT,
};

/// The compiled-in default settings.
#[must_use]
pub fn default_props() -> ScopeProps {
    ScopeProps {
        transitive: Some(true),
        require_https: Some(RequireHttps::Off),
        renew_mode: Some(RenewMode::Auto),
        must_staple: Some(false),
        pkey_spec: None,
        renew_timing: Some(DEFAULT_TIMING),
        ca_url: None,
        ca_proto: Some(DEFAULT_CA_PROTO.to_owned()),
        ca_agreement: None,
        ca_challenges: None,
    }
}

/// String-valued settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrVar {
    /// ACME directory URL.
    CaUrl,
    /// Certificate protocol.
    CaProto,
    /// Store directory.
    BaseDir,
    /// Outbound proxy URL.
    Proxy,
    /// Accepted CA agreement.
    CaAgreement,
    /// Renewal notification command.
    NotifyCmd,
}

/// Integer-valued settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntVar {
    /// See [`RenewMode::code`].
    RenewMode,
    /// Local port for 80.
    Local80,
    /// Local port for 443.
    Local443,
    /// `1` for auto, `0` for manual.
    Transitive,
    /// See [`RequireHttps::code`].
    RequireHttps,
    /// `1` if set.
    MustStaple,
}

/// Duration-valued settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationVar {
    /// Normalized certificate lifetime (zero for a literal window).
    RenewNorm,
    /// Renewal lead time.
    RenewWindow,
}

/// A server scope read together with its global scope.
#[derive(Debug, Clone, Copy)]
pub struct ServerView<'a> {
    server: &'a ServerConfig,
    global: &'a GlobalConfig,
}

impl<'a> ServerView<'a> {
    /// Pair `server` with `global`.
    #[must_use]
    pub fn new(server: &'a ServerConfig, global: &'a GlobalConfig) -> Self {
        Self { server, global }
    }

    /// The underlying scope.
    #[must_use]
    pub fn server(&self) -> &'a ServerConfig {
        self.server
    }

    /// Look up a string setting.
    #[must_use]
    pub fn get_str(&self, var: StrVar) -> Option<&'a str> {
        let props = &self.server.props;
        match var {
            StrVar::CaUrl => props.ca_url.as_deref(),
            StrVar::CaProto => Some(props.ca_proto.as_deref().unwrap_or(DEFAULT_CA_PROTO)),
            StrVar::BaseDir => self.global.base_dir.as_deref(),
            StrVar::Proxy => self.global.proxy_url.as_deref(),
            StrVar::CaAgreement => props.ca_agreement.as_deref(),
            StrVar::NotifyCmd => self.global.notify_cmd.as_deref(),
        }
    }

    /// Look up an integer setting.
    #[must_use]
    pub fn get_int(&self, var: IntVar) -> i64 {
        match var {
            IntVar::RenewMode => self.renew_mode().code(),
            IntVar::Local80 => i64::from(self.global.local_80),
            IntVar::Local443 => i64::from(self.global.local_443),
            IntVar::Transitive => i64::from(self.transitive()),
            IntVar::RequireHttps => self.require_https().code(),
            IntVar::MustStaple => i64::from(self.must_staple()),
        }
    }

    /// Look up a duration setting.
    #[must_use]
    pub fn get_duration(&self, var: DurationVar) -> Duration {
        let timing = self.renew_timing();
        match var {
            DurationVar::RenewNorm => timing.norm,
            DurationVar::RenewWindow => timing.window,
        }
    }

    /// Renewal mode.
    #[must_use]
    pub fn renew_mode(&self) -> RenewMode {
        self.server.props.renew_mode.unwrap_or(RenewMode::Auto)
    }

    /// Transitive membership.
    #[must_use]
    pub fn transitive(&self) -> bool {
        self.server.props.transitive.unwrap_or(true)
    }

    /// Redirect policy.
    #[must_use]
    pub fn require_https(&self) -> RequireHttps {
        self.server.props.require_https.unwrap_or(RequireHttps::Off)
    }

    /// Must-Staple flag.
    #[must_use]
    pub fn must_staple(&self) -> bool {
        self.server.props.must_staple.unwrap_or(false)
    }

    /// Lifetime/window pair.
    #[must_use]
    pub fn renew_timing(&self) -> RenewTiming {
        self.server.props.renew_timing.unwrap_or(DEFAULT_TIMING)
    }

    /// Key parameters, if any scope chose them.
    #[must_use]
    pub fn pkey_spec(&self) -> Option<KeySpec> {
        self.server.props.pkey_spec
    }

    /// Challenge types, if configured.
    #[must_use]
    pub fn ca_challenges(&self) -> Option<&'a [String]> {
        self.server.props.ca_challenges.as_deref()
    }
}

impl DomainGroup {
    /// Fill every unset policy field from `view`.
    ///
    /// Fields the domain already has are kept.
    pub fn complete_from(&mut self, view: &ServerView<'_>) {
        self.transitive.get_or_insert(view.transitive());
        self.renew_mode.get_or_insert(view.renew_mode());
        self.must_staple.get_or_insert(view.must_staple());
        self.require_https.get_or_insert(view.require_https());
        self.renew_timing.get_or_insert(view.renew_timing());
        if self.pkey_spec.is_none() {
            self.pkey_spec = view.pkey_spec();
        }
        if self.ca_url.is_none() {
            self.ca_url = view.get_str(StrVar::CaUrl).map(str::to_owned);
        }
        if self.ca_proto.is_none() {
            self.ca_proto = view.get_str(StrVar::CaProto).map(str::to_owned);
        }
        if self.ca_agreement.is_none() {
            self.ca_agreement = view.get_str(StrVar::CaAgreement).map(str::to_owned);
        }
        if self.ca_challenges.is_none() {
            self.ca_challenges = view.ca_challenges().map(<[String]>::to_vec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::DomainNameSet;
    use crate::scope::merge_server_scopes;

    #[test]
    fn unset_values_fall_back_to_defaults() {
        let server = ServerConfig::new("srv[test]");
        let global = GlobalConfig::default();
        let view = ServerView::new(&server, &global);

        assert_eq!(view.get_int(IntVar::RenewMode), RenewMode::Auto.code());
        assert_eq!(view.get_int(IntVar::Transitive), 1);
        assert_eq!(view.get_int(IntVar::RequireHttps), 0);
        assert_eq!(view.get_int(IntVar::MustStaple), 0);
        assert_eq!(view.get_int(IntVar::Local80), 80);
        assert_eq!(view.get_int(IntVar::Local443), 443);
        assert_eq!(view.get_str(StrVar::CaProto), Some("ACME"));
        assert_eq!(view.get_str(StrVar::CaUrl), None);
        assert_eq!(view.get_duration(DurationVar::RenewNorm), RENEW_NORM);
        assert_eq!(view.get_duration(DurationVar::RenewWindow), RENEW_WINDOW_DEFAULT);
    }

    #[test]
    fn manual_renew_mode_is_not_mistaken_for_unset() {
        let mut server = ServerConfig::new("srv[test]");
        server.props.renew_mode = Some(RenewMode::Manual);
        let global = GlobalConfig::default();
        let view = ServerView::new(&server, &global);
        assert_eq!(view.get_int(IntVar::RenewMode), 0);
        assert_eq!(view.renew_mode(), RenewMode::Manual);
    }

    #[test]
    fn literal_window_reports_zero_norm() {
        let mut server = ServerConfig::new("srv[test]");
        server.props.renew_timing = Some(RenewTiming::literal(Duration::from_secs(86_400)));
        let global = GlobalConfig::default();
        let view = ServerView::new(&server, &global);
        assert_eq!(view.get_duration(DurationVar::RenewNorm), Duration::ZERO);
        assert_eq!(view.get_duration(DurationVar::RenewWindow), Duration::from_secs(86_400));
    }

    #[test]
    fn global_strings_come_from_global_scope() {
        let server = ServerConfig::new("srv[test]");
        let global = GlobalConfig {
            proxy_url: Some("http://proxy:3128".to_owned()),
            notify_cmd: Some("/bin/notify".to_owned()),
            base_dir: Some("/srv/md".to_owned()),
            ..GlobalConfig::default()
        };
        let view = ServerView::new(&server, &global);
        assert_eq!(view.get_str(StrVar::Proxy), Some("http://proxy:3128"));
        assert_eq!(view.get_str(StrVar::NotifyCmd), Some("/bin/notify"));
        assert_eq!(view.get_str(StrVar::BaseDir), Some("/srv/md"));
    }

    #[test]
    fn merging_onto_defaults_sets_everything_defaultable() {
        let mut server = ServerConfig::new("srv[test]");
        server.props.must_staple = Some(true);
        let merged = merge_server_scopes(&ServerConfig::defaults(), &server);
        assert_eq!(merged.props.must_staple, Some(true));
        assert_eq!(merged.props.renew_mode, Some(RenewMode::Auto));
        assert_eq!(merged.props.transitive, Some(true));
        assert_eq!(merged.props.ca_proto.as_deref(), Some("ACME"));
    }

    #[test]
    fn complete_keeps_explicit_domain_values() {
        let names: DomainNameSet = ["example.org"].into_iter().collect();
        let mut md = DomainGroup::new(names).unwrap();
        md.renew_mode = Some(RenewMode::Always);

        let mut server = ServerConfig::new("srv[test]");
        server.props.renew_mode = Some(RenewMode::Manual);
        server.props.ca_url = Some("https://acme.example/dir".to_owned());
        let global = GlobalConfig::default();
        md.complete_from(&ServerView::new(&server, &global));

        assert_eq!(md.renew_mode, Some(RenewMode::Always));
        assert_eq!(md.ca_url.as_deref(), Some("https://acme.example/dir"));
        assert_eq!(md.ca_proto.as_deref(), Some("ACME"));
        assert_eq!(md.must_staple, Some(false));
    }
}
