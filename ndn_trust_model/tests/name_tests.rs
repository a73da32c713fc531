// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndn_trust_model::{ModelError, Name, NameComponent};

#[test]
fn uri_escaping_keeps_unreserved_and_escapes_the_rest() {
    let component = NameComponent::new(b"a b/c~".to_vec());
    assert_eq!(component.to_escaped(), "a%20b%2Fc~");
    assert_eq!(
        NameComponent::from_escaped("a%20b%2Fc~").unwrap(),
        component
    );
}

#[test]
fn period_only_components_gain_three_periods() {
    assert_eq!(NameComponent::new(Vec::new()).to_escaped(), "...");
    assert_eq!(NameComponent::from(".").to_escaped(), "....");
    assert_eq!(NameComponent::from_escaped("...").unwrap().len(), 0);
    assert_eq!(
        NameComponent::from_escaped("..").unwrap_err(),
        ModelError::IllegalPeriodComponent(2)
    );
}

#[test]
fn bad_percent_escape_is_rejected() {
    assert!(matches!(
        NameComponent::from_escaped("ab%4"),
        Err(ModelError::InvalidEscape(_))
    ));
    assert!(matches!(
        NameComponent::from_escaped("%zz"),
        Err(ModelError::InvalidEscape(_))
    ));
    assert!(matches!(
        NameComponent::from_escaped("%+1"),
        Err(ModelError::InvalidEscape(_))
    ));
}

#[test]
fn percent_escape_accepts_either_hex_case() {
    assert_eq!(NameComponent::from_escaped("%aF").unwrap().value(), &[0xAF]);
}

#[test]
fn component_order_is_shorter_first() {
    let short = NameComponent::from("zz");
    let long = NameComponent::from("aaa");
    assert!(short < long);
    assert!(NameComponent::from("ab") < NameComponent::from("ac"));
}

#[test]
fn name_order_puts_prefix_first() {
    let parent: Name = "/a/b".parse().unwrap();
    let child: Name = "/a/b/c".parse().unwrap();
    let sibling: Name = "/a/c".parse().unwrap();
    assert!(parent < child);
    assert!(child < sibling);
}

#[test]
fn uri_parsing_accepts_scheme_and_ignores_empty_segments() {
    let name = Name::from_uri("ndn:/a//b/").unwrap();
    assert_eq!(name.size(), 2);
    assert_eq!(name.to_uri(), "/a/b");
    assert_eq!(Name::from_uri("/").unwrap().to_uri(), "/");
}

#[test]
fn get_prefix_supports_negative_counts() {
    let name: Name = "/a/b/c/d".parse().unwrap();
    assert_eq!(name.get_prefix(2).to_uri(), "/a/b");
    assert_eq!(name.get_prefix(-1).to_uri(), "/a/b/c");
    assert_eq!(name.get_prefix(-10).size(), 0);
    assert_eq!(name.get_prefix(10), name);
}

#[test]
fn prefix_checks() {
    let prefix: Name = "/a/b".parse().unwrap();
    let full: Name = "/a/b/c".parse().unwrap();
    assert!(prefix.is_prefix_of(&full));
    assert!(full.is_prefix_of(&full));
    assert!(!full.is_prefix_of(&prefix));
    assert!(Name::new().is_prefix_of(&full));
}

#[test]
fn version_components_render_escaped() {
    let name = Name::from_uri("/a/KEY/dsk-1")
        .unwrap()
        .with(NameComponent::from_version(1));
    assert_eq!(name.to_uri(), "/a/KEY/dsk-1/%FD%01");
    let parsed = Name::from_uri("/a/KEY/dsk-1/%FD%01").unwrap();
    assert_eq!(parsed.last().unwrap().to_version().unwrap(), 1);
}
