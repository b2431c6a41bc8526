//! Value types shared by scopes and managed domains.
//!
//! Optional settings are modelled as `Option<T>` throughout: `None` means
//! "not configured at this scope" and is never confused with a configured
//! `false`, `off` or zero.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};
use crate::names::DomainNameSet;

/// Default RSA key length when `MDPrivateKeys RSA` gives none.
pub const RSA_BITS_DEFAULT: u32 = 2048;
/// Smallest RSA key length considered safe.
pub const RSA_BITS_MIN: u32 = 2048;

/// Normalized certificate lifetime (100 days) used for percentage windows.
pub const RENEW_NORM: Duration = Duration::from_secs(8_640_000);
/// Default renewal window (33 days before expiry).
pub const RENEW_WINDOW_DEFAULT: Duration = Duration::from_secs(2_851_200);

/// Default HSTS `max-age` in seconds.
pub const HSTS_MAX_AGE_DEFAULT: u32 = 15_768_000;

/// Local port value meaning "not reachable from the outside".
pub const PORT_UNREACHABLE: u16 = 0;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How certificate renewal is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenewMode {
    /// Never renew automatically.
    Manual,
    /// Renew when the window is reached.
    Auto,
    /// Renew even when a static certificate is configured.
    Always,
}

impl RenewMode {
    /// Integer encoding used by the keyed accessors.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Manual => 0,
            Self::Auto => 1,
            Self::Always => 2,
        }
    }
}

/// Redirect policy for plain-http requests to a managed domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequireHttps {
    /// No redirect.
    Off,
    /// Temporary (302) redirect.
    Temporary,
    /// Permanent (301) redirect plus HSTS.
    Permanent,
}

impl RequireHttps {
    /// Integer encoding used by the keyed accessors.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Temporary => 1,
            Self::Permanent => 2,
        }
    }
}

/// Private key generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeySpec {
    /// Whatever the certificate subsystem considers the default.
    Default,
    /// RSA with the given modulus length.
    Rsa {
        /// Key length in bits.
        bits: u32,
    },
}

// ---------------------------------------------------------------------------
// RenewTiming
// ---------------------------------------------------------------------------

/// Normalized lifetime and renewal window, always set and inherited as a pair.
///
/// A zero `norm` means `window` is a literal lead time; otherwise `window`
/// was derived as a fraction of `norm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenewTiming {
    /// Normalized certificate lifetime.
    #[serde(serialize_with = "as_secs")]
    pub norm: Duration,
    /// Time before expiry at which renewal starts.
    #[serde(serialize_with = "as_secs")]
    pub window: Duration,
}

impl RenewTiming {
    /// A literal window independent of certificate lifetime.
    #[must_use]
    pub fn literal(window: Duration) -> Self {
        Self {
            norm: Duration::ZERO,
            window,
        }
    }

    /// A window of `percent` of the normalized lifetime [`RENEW_NORM`].
    #[must_use]
    pub fn percentage(percent: u8) -> Self {
        let window_secs = RENEW_NORM
            .as_secs()
            .saturating_mul(u64::from(percent))
            .checked_div(100)
            .unwrap_or_default();
        Self {
            norm: RENEW_NORM,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Whether the window was given as a literal duration.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.norm.is_zero()
    }
}

fn as_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs())
}

// ---------------------------------------------------------------------------
// DomainGroup
// ---------------------------------------------------------------------------

/// A managed domain: the names covered by one certificate plus its policy.
///
/// Policy fields stay `None` until some scope configures them; see
/// [`DomainGroup::complete_from`] for filling them from a resolved server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainGroup {
    /// Identifier, the first declared domain name.
    pub name: String,
    /// Covered names, lower-cased and unique.
    pub domains: DomainNameSet,
    /// Whether matching virtual host names are pulled in automatically.
    pub transitive: Option<bool>,
    /// Renewal driving mode.
    pub renew_mode: Option<RenewMode>,
    /// Must-Staple extension on new certificates.
    pub must_staple: Option<bool>,
    /// http to https redirect policy.
    pub require_https: Option<RequireHttps>,
    /// Private key parameters.
    pub pkey_spec: Option<KeySpec>,
    /// Renewal lifetime and window.
    pub renew_timing: Option<RenewTiming>,
    /// ACME directory URL.
    pub ca_url: Option<String>,
    /// Certificate protocol name.
    pub ca_proto: Option<String>,
    /// Accepted terms-of-service agreement.
    pub ca_agreement: Option<String>,
    /// Allowed challenge types, in preference order.
    pub ca_challenges: Option<Vec<String>>,
    /// Static certificate (chain) file.
    pub cert_file: Option<PathBuf>,
    /// Static private key file.
    pub pkey_file: Option<PathBuf>,
    /// File the group was declared in.
    pub defn_name: Option<String>,
    /// Line the group was declared on.
    pub defn_line_number: Option<usize>,
}

impl DomainGroup {
    /// Create a group covering `domains`.
    ///
    /// # Errors
    ///
    /// Returns a semantic error if `domains` is empty.
    pub fn new(domains: DomainNameSet) -> ConfigResult<Self> {
        let Some(name) = domains.first().map(str::to_owned) else {
            return Err(ConfigError::semantic("needs at least one domain name"));
        };
        Ok(Self {
            name,
            domains,
            transitive: None,
            renew_mode: None,
            must_staple: None,
            require_https: None,
            pkey_spec: None,
            renew_timing: None,
            ca_url: None,
            ca_proto: None,
            ca_agreement: None,
            ca_challenges: None,
            cert_file: None,
            pkey_file: None,
            defn_name: None,
            defn_line_number: None,
        })
    }

    /// Record where the group was declared.
    #[must_use]
    pub fn with_definition(mut self, file: &str, line: usize) -> Self {
        self.defn_name = Some(file.to_owned());
        self.defn_line_number = Some(line);
        self
    }

    /// Add a domain name, keeping the set unique.
    pub fn add_domain(&mut self, name: &str) -> bool {
        self.domains.insert(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_window_scales_norm() {
        let timing = RenewTiming::percentage(20);
        assert_eq!(timing.norm, RENEW_NORM);
        assert_eq!(timing.window, Duration::from_secs(20 * 86_400));
        assert!(!timing.is_literal());
    }

    #[test]
    fn literal_window_has_zero_norm() {
        let timing = RenewTiming::literal(Duration::from_secs(14 * 86_400));
        assert!(timing.is_literal());
        assert_eq!(timing.window.as_secs(), 1_209_600);
    }

    #[test]
    fn group_requires_a_name() {
        let err = DomainGroup::new(DomainNameSet::new()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Semantic);
    }

    #[test]
    fn group_name_is_first_domain() {
        let names: DomainNameSet = ["Example.org", "www.example.org"].into_iter().collect();
        let md = DomainGroup::new(names).unwrap();
        assert_eq!(md.name, "example.org");
        assert_eq!(md.renew_mode, None);
        assert_eq!(md.must_staple, None);
    }

    #[test]
    fn codes_match_accessor_encoding() {
        assert_eq!(RenewMode::Manual.code(), 0);
        assert_eq!(RenewMode::Always.code(), 2);
        assert_eq!(RequireHttps::Temporary.code(), 1);
    }
}
