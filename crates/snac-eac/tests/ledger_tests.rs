use proptest::prelude::*;
use snac_eac::{EacElement, EacParser};
use snac_test_utils::{eac_with_unknown_control_child, MINIMAL_EAC};

fn unrecognized_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z]{2,12}"
        .prop_filter("must not be a mapped element", |name| {
            matches!(EacElement::from_local_name(name), EacElement::Unrecognized(_))
        })
}

#[test]
fn unknown_control_child_is_recorded_once() {
    let xml = eac_with_unknown_control_child("bogus");
    let (graph, ledger) = snac_eac::parse(xml.as_bytes()).unwrap();

    assert_eq!(graph.ark.as_deref(), Some("ark:/99166/w6tb1zzb"));
    assert_eq!(ledger.len(), 1);
    let entry = &ledger.entries()[0];
    assert!(!entry.is_attribute);
    assert_eq!(entry.name, "bogus");
    assert_eq!(entry.structural_path.to_string(), "eac-cpf/control/bogus");
    assert_eq!(entry.value, r#"<bogus note="x">payload</bogus>"#);
}

#[test]
fn unknown_attribute_is_recorded_on_its_element() {
    let xml = MINIMAL_EAC.replace(
        r#"<nameEntry preferenceScore="99">"#,
        r#"<nameEntry preferenceScore="99" snac:weight="3" xmlns:snac="http://socialarchive.iath.virginia.edu/">"#,
    );
    let (graph, ledger) = snac_eac::parse(xml.as_bytes()).unwrap();
    assert_eq!(graph.name_entries[0].preference_score, Some(99.0));
    assert_eq!(ledger.len(), 1);
    let entry = &ledger.entries()[0];
    assert!(entry.is_attribute);
    assert_eq!(entry.name, "weight");
    assert_eq!(entry.value, "3");
    assert_eq!(
        entry.structural_path.to_string(),
        "eac-cpf/cpfDescription/identity/nameEntry"
    );
}

#[test]
fn ledger_does_not_affect_emission() {
    let (plain, _) = snac_eac::parse(MINIMAL_EAC.as_bytes()).unwrap();
    let xml = eac_with_unknown_control_child("bogus");
    let (with_unknown, ledger) = snac_eac::parse(xml.as_bytes()).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(
        snac_eac::serialize(&plain).unwrap(),
        snac_eac::serialize(&with_unknown).unwrap()
    );
}

#[test]
fn drain_hands_entries_to_the_caller() {
    let xml = eac_with_unknown_control_child("bogus");
    let (_, mut ledger) = EacParser::default().parse(xml.as_bytes()).unwrap();
    let drained = ledger.drain();
    assert_eq!(drained.len(), 1);
    assert!(ledger.is_empty());
}

proptest! {
    #[test]
    fn any_unknown_control_child_lands_in_the_ledger(name in unrecognized_name()) {
        let xml = eac_with_unknown_control_child(&name);
        let (_, ledger) = snac_eac::parse(xml.as_bytes()).unwrap();
        prop_assert_eq!(ledger.len(), 1);
        prop_assert_eq!(ledger.ending_with(&["control", name.as_str()]).count(), 1);
    }
}
