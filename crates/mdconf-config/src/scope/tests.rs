use std::time::Duration;

use super::*;
use crate::error::ErrorKind;
use crate::names::DomainNameSet;

fn group(names: &[&str]) -> DomainGroup {
    DomainGroup::new(names.iter().collect::<DomainNameSet>()).unwrap()
}

fn configured() -> ServerConfig {
    let mut sc = ServerConfig::new("srv[test]");
    sc.props.must_staple = Some(false);
    sc.props.renew_mode = Some(RenewMode::Manual);
    sc.props.ca_url = Some("https://acme.example/directory".to_owned());
    sc.props.renew_timing = Some(RenewTiming::literal(Duration::from_secs(86_400)));
    sc
}

#[test]
fn test_clear_unsets_everything() {
    let mut sc = configured();
    sc.clear();
    assert!(sc.props.is_empty());
    assert_eq!(sc.name, "srv[test]");
}

#[test]
fn test_copy_is_verbatim() {
    let from = configured();
    let mut to = ServerConfig::new("srv[other]");
    to.props.transitive = Some(false);
    to.copy_props_from(&from);
    assert_eq!(to.props, from.props);
    assert_eq!(to.props.transitive, None);
    assert_eq!(to.name, "srv[other]");
}

#[test]
fn test_apply_only_touches_set_fields() {
    let mut sc = ServerConfig::new("srv[test]");
    sc.props.must_staple = Some(false);

    let mut md = group(&["example.org"]);
    md.renew_mode = Some(RenewMode::Always);
    sc.apply_onto(&mut md);

    assert_eq!(md.must_staple, Some(false));
    assert_eq!(md.renew_mode, Some(RenewMode::Always));
    assert_eq!(md.ca_url, None);
}

#[test]
fn test_apply_copies_timing_as_a_pair() {
    let mut sc = ServerConfig::new("srv[test]");
    sc.props.renew_timing = Some(RenewTiming::percentage(25));
    let mut md = group(&["example.org"]);
    sc.apply_onto(&mut md);
    let timing = md.renew_timing.unwrap();
    assert_eq!(timing.norm, crate::types::RENEW_NORM);
    assert_eq!(timing.window, Duration::from_secs(25 * 86_400));
}

#[test]
fn test_merge_add_wins_when_set() {
    let base = ServerConfig::new("base");
    let mut add = ServerConfig::new("add");
    add.props.must_staple = Some(true);
    assert_eq!(merge_server_scopes(&base, &add).props.must_staple, Some(true));
}

#[test]
fn test_merge_falls_back_to_base() {
    let mut base = ServerConfig::new("base");
    base.props.must_staple = Some(true);
    let add = ServerConfig::new("add");
    assert_eq!(merge_server_scopes(&base, &add).props.must_staple, Some(true));
}

#[test]
fn test_merge_keeps_explicit_false_over_base_true() {
    let mut base = ServerConfig::new("base");
    base.props.must_staple = Some(true);
    base.props.renew_mode = Some(RenewMode::Always);
    let mut add = ServerConfig::new("add");
    add.props.must_staple = Some(false);
    add.props.renew_mode = Some(RenewMode::Manual);

    let merged = merge_server_scopes(&base, &add);
    assert_eq!(merged.props.must_staple, Some(false));
    assert_eq!(merged.props.renew_mode, Some(RenewMode::Manual));
}

#[test]
fn test_merge_resets_transient_state() {
    let mut base = ServerConfig::new("base");
    base.assigned = Some("example.org".to_owned());
    let mut add = ServerConfig::new("add");
    let _frame = add.enter_section(group(&["example.org"])).unwrap();

    let merged = merge_server_scopes(&base, &add);
    assert_eq!(merged.name, "[add, base]");
    assert!(merged.assigned.is_none());
    assert!(!merged.in_section());
}

#[test]
fn test_merge_both_unset_stays_unset() {
    let merged = merge_server_scopes(&ServerConfig::new("a"), &ServerConfig::new("b"));
    assert!(merged.props.is_empty());
}

#[test]
fn test_section_enter_clears_and_binds() {
    let mut sc = configured();
    let frame = sc.enter_section(group(&["example.org"])).unwrap();
    assert!(sc.props.is_empty());
    assert_eq!(sc.section().unwrap().name, "example.org");

    sc.props.must_staple = Some(true);
    let md = sc.exit_section(frame, true).unwrap();
    assert_eq!(md.must_staple, Some(true));
    assert_eq!(md.renew_mode, None);
    assert_eq!(sc.props, configured().props);
    assert!(!sc.in_section());
}

#[test]
fn test_section_round_trip_on_failure() {
    let mut sc = configured();
    let frame = sc.enter_section(group(&["example.org"])).unwrap();
    sc.props.must_staple = Some(true);
    sc.props.ca_url = None;

    assert!(sc.exit_section(frame, false).is_none());
    assert_eq!(sc.props, configured().props);
    assert!(!sc.in_section());
}

#[test]
fn test_nested_section_is_rejected() {
    let mut sc = ServerConfig::new("srv[test]");
    let frame = sc.enter_section(group(&["a.example"])).unwrap();
    let err = sc.enter_section(group(&["b.example"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Context);
    assert_eq!(sc.section().unwrap().name, "a.example");
    let _ = sc.exit_section(frame, false);
}

#[test]
fn test_section_header_words() {
    let (names, transitive) =
        parse_section_header("Example.com www.example.com manual>").unwrap();
    assert_eq!(names.as_slice(), ["example.com", "www.example.com"]);
    assert_eq!(transitive, Some(false));
}

#[test]
fn test_section_header_first_word_is_always_a_name() {
    let (names, transitive) = parse_section_header("auto example.org>").unwrap();
    assert_eq!(names.as_slice(), ["auto", "example.org"]);
    assert_eq!(transitive, None);
}

#[test]
fn test_section_header_repeats_collapse_onto_first_name() {
    let (names, transitive) =
        parse_section_header("example.com auto WWW.example.com EXAMPLE.com www.example.com>")
            .unwrap();
    assert_eq!(names.as_slice(), ["example.com", "www.example.com"]);
    assert_eq!(transitive, Some(true));
}

#[test]
fn test_section_header_errors() {
    let err = parse_section_header("example.org").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
    assert!(err.to_string().contains("missing closing '>'"));

    let err = parse_section_header("  >").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
    assert!(err.to_string().contains("unique domain name"));
}

#[test]
fn test_defaults_are_fully_set() {
    let defaults = ServerConfig::defaults();
    assert_eq!(defaults.props.transitive, Some(true));
    assert_eq!(defaults.props.require_https, Some(RequireHttps::Off));
    assert_eq!(defaults.props.renew_mode, Some(RenewMode::Auto));
    assert_eq!(defaults.props.must_staple, Some(false));
    assert_eq!(defaults.props.ca_proto.as_deref(), Some("ACME"));
    assert!(defaults.props.renew_timing.is_some());
    assert_eq!(defaults.props.pkey_spec, None);
}
