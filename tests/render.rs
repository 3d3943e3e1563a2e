//! Rendering from a rules file against a known-good configuration.

use std::path::Path;

use haproxy_ingress::rules::file::load_rules;
use haproxy_ingress::synth::{ConfigSynthesizer, TemplateParams};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn test_rules_file_renders_expected_config() {
    let rules = load_rules(&fixture("foo_bar.toml")).unwrap();
    let expected = std::fs::read_to_string(fixture("foo_bar.cfg")).unwrap();

    let synthesis = ConfigSynthesizer::new("example.com", TemplateParams::default())
        .unwrap()
        .synthesize(&rules)
        .unwrap();

    assert_eq!(synthesis.text, expected);
}

#[test]
fn test_rendering_is_deterministic() {
    let rules = load_rules(&fixture("foo_bar.toml")).unwrap();
    let synthesizer = ConfigSynthesizer::new("example.com", TemplateParams::default()).unwrap();

    let first = synthesizer.synthesize(&rules).unwrap();
    let second = synthesizer.synthesize(&rules).unwrap();
    assert_eq!(first.text, second.text);
}

#[test]
fn test_json_view_lists_derived_features() {
    let rules = load_rules(&fixture("foo_bar.toml")).unwrap();
    let synthesis = ConfigSynthesizer::new("example.com", TemplateParams::default())
        .unwrap()
        .synthesize(&rules)
        .unwrap();

    let json = serde_json::to_value(&synthesis).unwrap();
    assert_eq!(json["backends"][0]["name"], "default_foo");
    assert_eq!(json["backends"][1]["server"], "bar bar.default.svc.cluster.local:9000");
    assert_eq!(json["host_acls"][1]["name"], "is_default_bar");
    assert_eq!(json["frontends"][1]["path_acl"]["matcher"], "path_beg /my/path");
}
