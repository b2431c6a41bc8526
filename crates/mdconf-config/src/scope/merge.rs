use super::{ScopeProps, ServerConfig};

/// Combine two server scopes, preferring `add` wherever it has a value.
///
/// Used when a virtual host (`add`) inherits from the main server (`base`).
/// The result is never mid-section and has no assigned domain.
#[must_use]
pub fn merge_server_scopes(base: &ServerConfig, add: &ServerConfig) -> ServerConfig {
    ServerConfig {
        name: format!("[{}, {}]", add.name, base.name),
        props: merge_props(&base.props, &add.props),
        assigned: None,
        global: add.global.or(base.global),
        current: None,
    }
}

fn merge_props(base: &ScopeProps, add: &ScopeProps) -> ScopeProps {
    ScopeProps {
        transitive: add.transitive.or(base.transitive),
        require_https: add.require_https.or(base.require_https),
        renew_mode: add.renew_mode.or(base.renew_mode),
        must_staple: add.must_staple.or(base.must_staple),
        pkey_spec: add.pkey_spec.or(base.pkey_spec),
        renew_timing: add.renew_timing.or(base.renew_timing),
        ca_url: add.ca_url.clone().or_else(|| base.ca_url.clone()),
        ca_proto: add.ca_proto.clone().or_else(|| base.ca_proto.clone()),
        ca_agreement: add
            .ca_agreement
            .clone()
            .or_else(|| base.ca_agreement.clone()),
        ca_challenges: add
            .ca_challenges
            .clone()
            .or_else(|| base.ca_challenges.clone()),
    }
}
