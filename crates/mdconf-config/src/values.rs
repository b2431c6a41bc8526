//! Typed parsers for directive arguments.
//!
//! Each parser is a pure function from argument text to a typed value. Errors
//! are [`ConfigError::Format`] when the text does not match the grammar and
//! [`ConfigError::Semantic`] when it parses but is out of range.

use std::time::Duration;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{KeySpec, RSA_BITS_DEFAULT, RSA_BITS_MIN, RenewMode, RenewTiming, RequireHttps};

/// Parse `on` / `off` (case-insensitive).
///
/// # Errors
///
/// Any other text is a format error.
pub fn parse_on_off(value: &str) -> ConfigResult<bool> {
    if value.eq_ignore_ascii_case("off") {
        Ok(false)
    } else if value.eq_ignore_ascii_case("on") {
        Ok(true)
    } else {
        Err(ConfigError::format(format!(
            "unknown '{value}', supported parameter values are 'on' and 'off'"
        )))
    }
}

/// Interpret `auto` / `manual` as the transitive-membership flag.
///
/// Returns `None` for any other text: the token is not a transitive keyword
/// and the caller decides what else it could be.
#[must_use]
pub fn parse_transitive(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("auto") {
        Some(true)
    } else if value.eq_ignore_ascii_case("manual") {
        Some(false)
    } else {
        None
    }
}

/// Meaning of one token in a domain member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberToken<'a> {
    /// `auto` or `manual`.
    Transitive(bool),
    /// Anything else is a domain name.
    Domain(&'a str),
}

type MemberInterpreter = for<'a> fn(&'a str) -> Option<MemberToken<'a>>;

fn transitive_token(token: &str) -> Option<MemberToken<'_>> {
    parse_transitive(token).map(MemberToken::Transitive)
}

/// Interpreters tried in order before falling back to a domain name.
const MEMBER_INTERPRETERS: &[MemberInterpreter] = &[transitive_token];

/// Classify a member-list token; the first accepting interpreter wins.
#[must_use]
pub fn classify_member(token: &str) -> MemberToken<'_> {
    MEMBER_INTERPRETERS
        .iter()
        .find_map(|interpret| interpret(token))
        .unwrap_or(MemberToken::Domain(token))
}

/// Split a leading (optionally signed) decimal integer off `text`.
fn split_leading_int(text: &str) -> Option<(i64, &str)> {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text
        .get(sign_len..)?
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    let end = sign_len.checked_add(digits)?;
    let number = text.get(..end)?.parse::<i64>().ok()?;
    Some((number, text.get(end..)?))
}

/// Parse a duration such as `14d`, `12h`, `30mi`, `90s` or `500ms`.
///
/// A bare number takes `default_unit`. Units are case-insensitive.
///
/// # Errors
///
/// Returns a format error for a missing number, a negative value, an unknown
/// unit or a value that overflows.
pub fn parse_duration(value: &str, default_unit: &str) -> ConfigResult<Duration> {
    let Some((number, rest)) = split_leading_int(value) else {
        return Err(ConfigError::format(format!("'{value}' is not a duration")));
    };
    let Ok(number) = u64::try_from(number) else {
        return Err(ConfigError::format(format!("duration '{value}' is negative")));
    };
    let unit = if rest.is_empty() { default_unit } else { rest };

    let secs_per_unit: u64 = match unit.to_ascii_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(number)),
        "s" => 1,
        "mi" => 60,
        "h" => 3_600,
        "d" => 86_400,
        _ => {
            return Err(ConfigError::format(format!(
                "unknown time unit '{unit}' in '{value}'"
            )));
        },
    };
    number
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::format(format!("duration '{value}' is too large")))
}

/// Parse `N%` with `0 <= N < 100`.
///
/// Returns `Ok(None)` when the text is not shaped like a percentage.
fn parse_percentage(value: &str) -> ConfigResult<Option<u8>> {
    let Some((number, rest)) = split_leading_int(value) else {
        return Ok(None);
    };
    if rest != "%" {
        return Ok(None);
    }
    match u8::try_from(number) {
        Ok(percent) if percent < 100 => Ok(Some(percent)),
        _ => Err(ConfigError::semantic("percent must be less than 100")),
    }
}

/// A renewal window as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewWindowSpec {
    /// Literal lead time before expiry.
    Duration(Duration),
    /// Fraction of the normalized certificate lifetime.
    Percent(u8),
}

impl RenewWindowSpec {
    /// Resolve into the lifetime/window pair stored on scopes.
    #[must_use]
    pub fn timing(self) -> RenewTiming {
        match self {
            Self::Duration(window) => RenewTiming::literal(window),
            Self::Percent(percent) => {
                let timing = RenewTiming::percentage(percent);
                debug!(
                    norm = timing.norm.as_secs(),
                    window = timing.window.as_secs(),
                    "configured renewal window"
                );
                timing
            },
        }
    }
}

/// Parse a renewal window: a duration (default unit days) or `N%`.
///
/// # Errors
///
/// Returns a semantic error for percentages of 100 or more, and a format
/// error for anything that is neither a duration nor a percentage.
pub fn parse_renew_window(value: &str) -> ConfigResult<RenewWindowSpec> {
    if let Ok(window) = parse_duration(value, "d") {
        return Ok(RenewWindowSpec::Duration(window));
    }
    match parse_percentage(value)? {
        Some(percent) => Ok(RenewWindowSpec::Percent(percent)),
        None => Err(ConfigError::format(format!(
            "unrecognized format '{value}', expected a duration or a percentage"
        ))),
    }
}

/// Parse a renewal mode keyword.
///
/// # Errors
///
/// Returns a format error for unknown keywords.
pub fn parse_renew_mode(value: &str) -> ConfigResult<RenewMode> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        "auto" | "automatic" => Ok(RenewMode::Auto),
        "always" => Ok(RenewMode::Always),
        "manual" | "stick" => Ok(RenewMode::Manual),
        _ => Err(ConfigError::format(format!("unknown MDDriveMode {value}"))),
    }
}

/// Parse an http to https redirect policy.
///
/// # Errors
///
/// Returns a format error for unknown keywords.
pub fn parse_require_https(value: &str) -> ConfigResult<RequireHttps> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        "off" => Ok(RequireHttps::Off),
        "temporary" => Ok(RequireHttps::Temporary),
        "permanent" => Ok(RequireHttps::Permanent),
        _ => Err(ConfigError::format(format!(
            "unknown '{value}', supported parameter values are 'temporary' and 'permanent'"
        ))),
    }
}

/// A mapping of an internet-facing port to the local port serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMap {
    /// Port as seen from the internet, 80 or 443.
    pub net_port: u16,
    /// Local port, or [`crate::types::PORT_UNREACHABLE`].
    pub local_port: u16,
}

/// Parse `http:PORT`, `https:PORT` or `NET:PORT`, where `PORT` may be `-`.
///
/// # Errors
///
/// Returns a format error when either side does not parse, and a semantic
/// error when the local port is outside `]0,65535]` or the net port is not
/// 80 or 443.
pub fn parse_port_map(value: &str) -> ConfigResult<PortMap> {
    let (net_port, rest): (i64, &str) = if let Some(rest) = value.strip_prefix("http:") {
        (80, rest)
    } else if let Some(rest) = value.strip_prefix("https:") {
        (443, rest)
    } else {
        let Some((net_port, rest)) = split_leading_int(value) else {
            return Err(ConfigError::format("unable to parse first port number"));
        };
        let Some(rest) = rest.strip_prefix(':') else {
            return Err(ConfigError::format("no ':' after first port number"));
        };
        (net_port, rest)
    };

    let local_port = if rest == "-" {
        crate::types::PORT_UNREACHABLE
    } else {
        let Ok(port) = rest.trim().parse::<i64>() else {
            return Err(ConfigError::format("unable to parse second port number"));
        };
        match u16::try_from(port) {
            Ok(port) if port > 0 => port,
            _ => {
                return Err(ConfigError::semantic(
                    "invalid number for port map, must be in ]0,65535]",
                ));
            },
        }
    };

    let net_port = match net_port {
        80 => 80,
        443 => 443,
        _ => return Err(ConfigError::semantic("mapped port number must be 80 or 443")),
    };
    Ok(PortMap {
        net_port,
        local_port,
    })
}

/// Parse `MDPrivateKeys` arguments: `Default` or `RSA [bits]`.
///
/// # Errors
///
/// Returns a format error for a missing or unknown type, wrong arity, or a
/// non-numeric bit count, and a semantic error for a bit count below
/// [`RSA_BITS_MIN`] or not representable.
pub fn parse_key_spec<S: AsRef<str>>(args: &[S]) -> ConfigResult<KeySpec> {
    let Some(ptype) = args.first().map(AsRef::as_ref) else {
        return Err(ConfigError::format("needs to specify the private key type"));
    };

    if ptype.eq_ignore_ascii_case("Default") {
        if args.len() > 1 {
            return Err(ConfigError::format("type 'Default' takes no parameter"));
        }
        return Ok(KeySpec::Default);
    }

    if ptype.eq_ignore_ascii_case("RSA") {
        let bits = match args {
            [_] => RSA_BITS_DEFAULT,
            [_, bits] => parse_rsa_bits(bits.as_ref())?,
            _ => {
                return Err(ConfigError::format(
                    "key type 'RSA' has only one optional parameter, the number of bits",
                ));
            },
        };
        return Ok(KeySpec::Rsa { bits });
    }

    Err(ConfigError::format(format!(
        "unsupported private key type \"{ptype}\""
    )))
}

fn parse_rsa_bits(value: &str) -> ConfigResult<u32> {
    let Ok(bits) = value.trim().parse::<i64>() else {
        return Err(ConfigError::format(format!(
            "'{value}' is not a number of bits"
        )));
    };
    match u32::try_from(bits) {
        Ok(bits) if bits >= RSA_BITS_MIN && i64::from(bits) < i64::from(i32::MAX) => Ok(bits),
        _ => Err(ConfigError::semantic(format!(
            "{value} bits: must be {RSA_BITS_MIN} or higher in order to be considered safe. \
             Too large a value will slow down everything. Larger than 4096 probably does not \
             make sense unless quantum cryptography really changes spin."
        ))),
    }
}

/// Check that `value` is an absolute `http:` or `https:` URL with a host.
///
/// # Errors
///
/// Returns a format error otherwise.
pub fn parse_http_url(value: &str) -> ConfigResult<String> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::format(format!("'{value}' is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::format(format!(
            "'{value}' must use the http or https scheme"
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::format(format!("'{value}' has no host")));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn on_off_accepts_exactly_on_and_off() {
        for spelling in ["on", "ON", "On", "oN"] {
            assert!(parse_on_off(spelling).unwrap());
        }
        for spelling in ["off", "OFF", "Off"] {
            assert!(!parse_on_off(spelling).unwrap());
        }
        for bad in ["", "yes", "no", "true", "1", "0", "onn", " on"] {
            let err = parse_on_off(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{bad:?} accepted");
        }
    }

    #[test]
    fn transitive_soft_match() {
        assert_eq!(parse_transitive("AUTO"), Some(true));
        assert_eq!(parse_transitive("manual"), Some(false));
        assert_eq!(parse_transitive("example.com"), None);
    }

    #[test]
    fn member_tokens_fall_back_to_domain() {
        assert_eq!(classify_member("Auto"), MemberToken::Transitive(true));
        assert_eq!(
            classify_member("www.example.com"),
            MemberToken::Domain("www.example.com")
        );
    }

    #[test]
    fn durations_with_units() {
        assert_eq!(parse_duration("14d", "d").unwrap(), Duration::from_secs(1_209_600));
        assert_eq!(parse_duration("14", "d").unwrap(), Duration::from_secs(1_209_600));
        assert_eq!(parse_duration("12H", "d").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("30mi", "d").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_duration("90s", "d").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("250ms", "d").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("5x", "d").is_err());
        assert!(parse_duration("d", "d").is_err());
        assert!(parse_duration("-3d", "d").is_err());
    }

    #[test]
    fn renew_window_literal_duration() {
        let spec = parse_renew_window("14d").unwrap();
        assert_eq!(spec, RenewWindowSpec::Duration(Duration::from_secs(1_209_600)));
        assert!(spec.timing().is_literal());
    }

    #[test]
    fn renew_window_percentage() {
        let spec = parse_renew_window("20%").unwrap();
        assert_eq!(spec, RenewWindowSpec::Percent(20));
        let timing = spec.timing();
        assert_eq!(timing.norm, crate::types::RENEW_NORM);
        assert_eq!(timing.window, Duration::from_secs(20 * 86_400));
        assert_eq!(parse_renew_window("0%").unwrap(), RenewWindowSpec::Percent(0));
    }

    #[test]
    fn renew_window_rejects_large_percentages() {
        assert_eq!(parse_renew_window("120%").unwrap_err().kind(), ErrorKind::Semantic);
        assert_eq!(parse_renew_window("100%").unwrap_err().kind(), ErrorKind::Semantic);
        assert_eq!(parse_renew_window("-1%").unwrap_err().kind(), ErrorKind::Semantic);
    }

    #[test]
    fn renew_window_rejects_garbage() {
        assert_eq!(parse_renew_window("soon").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(parse_renew_window("10%%").unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn renew_modes() {
        assert_eq!(parse_renew_mode("Automatic").unwrap(), RenewMode::Auto);
        assert_eq!(parse_renew_mode("auto").unwrap(), RenewMode::Auto);
        assert_eq!(parse_renew_mode("always").unwrap(), RenewMode::Always);
        assert_eq!(parse_renew_mode("stick").unwrap(), RenewMode::Manual);
        assert!(parse_renew_mode("sometimes").is_err());
    }

    #[test]
    fn require_https_modes() {
        assert_eq!(parse_require_https("OFF").unwrap(), RequireHttps::Off);
        assert_eq!(parse_require_https("temporary").unwrap(), RequireHttps::Temporary);
        assert_eq!(parse_require_https("permanent").unwrap(), RequireHttps::Permanent);
        assert_eq!(parse_require_https("on").unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn port_map_schemes_and_numbers() {
        assert_eq!(
            parse_port_map("http:8080").unwrap(),
            PortMap { net_port: 80, local_port: 8080 }
        );
        assert_eq!(
            parse_port_map("https:8443").unwrap(),
            PortMap { net_port: 443, local_port: 8443 }
        );
        assert_eq!(
            parse_port_map("443:-").unwrap(),
            PortMap { net_port: 443, local_port: 0 }
        );
        assert_eq!(
            parse_port_map("80:5002").unwrap(),
            PortMap { net_port: 80, local_port: 5002 }
        );
    }

    #[test]
    fn port_map_errors() {
        assert_eq!(parse_port_map("8081:443").unwrap_err().kind(), ErrorKind::Semantic);
        assert_eq!(parse_port_map("80:0").unwrap_err().kind(), ErrorKind::Semantic);
        assert_eq!(parse_port_map("80:65536").unwrap_err().kind(), ErrorKind::Semantic);
        assert_eq!(parse_port_map("80").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(parse_port_map("web:80").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(parse_port_map("80:abc").unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn key_specs() {
        assert_eq!(parse_key_spec(&["RSA", "2048"]).unwrap(), KeySpec::Rsa { bits: 2048 });
        assert_eq!(parse_key_spec(&["rsa"]).unwrap(), KeySpec::Rsa { bits: RSA_BITS_DEFAULT });
        assert_eq!(parse_key_spec(&["default"]).unwrap(), KeySpec::Default);
    }

    #[test]
    fn key_spec_errors() {
        let err = parse_key_spec(&["RSA", "512"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(err.to_string().contains("2048 or higher"));

        assert_eq!(parse_key_spec(&["Default", "extra"]).unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(
            parse_key_spec(&["RSA", "2048", "4096"]).unwrap_err().kind(),
            ErrorKind::Format
        );
        assert_eq!(parse_key_spec::<&str>(&[]).unwrap_err().kind(), ErrorKind::Format);

        let err = parse_key_spec(&["DSA"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("\"DSA\""));
    }

    #[test]
    fn rsa_bits_must_be_numeric() {
        let err = parse_key_spec(&["RSA", "abc"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("'abc' is not a number of bits"));

        let err = parse_key_spec(&["RSA", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn http_urls() {
        assert!(parse_http_url("http://proxy.local:3128").is_ok());
        assert!(parse_http_url("https://proxy.local/").is_ok());
        assert!(parse_http_url("ftp://proxy.local").is_err());
        assert!(parse_http_url("proxy.local:3128").is_err());
    }
}
