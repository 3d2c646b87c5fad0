//! Unit tests for the PKL parser

use std::path::Path;

use crate::codegen::generate_pkl;
use crate::csm::CollaborativeStateMachine;
use crate::description::ActionDescription;
use crate::fixtures::{root_machine, sample_csm};
use crate::parser::{
    loader_for_path, parse_pkl, parse_pkl_value, DescriptionLoader, JsonLoader, ParseError,
    PklLoader,
};

#[test]
fn test_parse_minimal_csm() {
    let source = r#"
        name: "csm"
        version: "1.0"
        stateMachines {}
    "#;

    let description = parse_pkl(source).expect("Should parse successfully");
    assert_eq!(description.name, "csm");
    assert_eq!(description.version, "1.0");
    assert!(description.state_machines.is_empty());
    assert!(description.local_context.is_empty());
}

#[test]
fn test_parse_accepts_header_and_comments() {
    let source = r#"
        amends "package://example.org/csm@1.0#/Csm.pkl"

        // the root
        name: "csm"
        version: "1.0" // trailing
    "#;

    let description = parse_pkl(source).expect("Should parse successfully");
    assert_eq!(description.name, "csm");
}

#[test]
fn test_parse_state_with_transition() {
    let source = "name: \"csm\"\nversion: \"1.0\"\nstateMachines {\n\tnew {\n\t\tname: \"Root\"\n\t\tstates {\n\t\t\tnew {\n\t\t\t\tname: \"Initial\"\n\t\t\t\tinitial: true\n\t\t\t\ton {\n\t\t\t\t\tnew {\n\t\t\t\t\t\ttarget: Terminal\n\t\t\t\t\t\tevent: \"go\"\n\t\t\t\t\t\tguards {\n\t\t\t\t\t\t\tnew {\n\t\t\t\t\t\t\t\texpression: \"x > 0\"\n\t\t\t\t\t\t\t}\n\t\t\t\t\t\t}\n\t\t\t\t\t}\n\t\t\t\t}\n\t\t\t}\n\t\t}\n\t}\n}\n";

    let description = parse_pkl(source).expect("Should parse successfully");
    let state = &description.state_machines[0].states[0];
    assert_eq!(state.name, "Initial");
    assert!(state.initial);
    assert!(!state.terminal);
    assert_eq!(state.on[0].target, "Terminal");
    assert_eq!(state.on[0].event.as_deref(), Some("go"));
    assert_eq!(state.on[0].guards[0].expression, "x > 0");
    assert!(state.on[0].else_target.is_none());
}

#[test]
fn test_parse_unescapes_strings() {
    let value = parse_pkl_value(r#"text: "a \"b\" \\ c\nd\te""#).expect("parse");
    assert_eq!(value["text"], "a \"b\" \\ c\nd\te");
}

#[test]
fn test_parse_boolean_needs_word_boundary() {
    let value = parse_pkl_value("a: true\nb: trueish\nc: false").expect("parse");
    assert_eq!(value["a"], true);
    assert_eq!(value["b"], "trueish");
    assert_eq!(value["c"], false);
}

#[test]
fn test_parse_rejects_mixed_block() {
    let err = parse_pkl_value("items {\n\tnew {}\n\tname: \"x\"\n}").unwrap_err();
    assert!(matches!(err, ParseError::MixedBlock { key } if key == "items"));
}

#[test]
fn test_parse_rejects_duplicate_key() {
    let err = parse_pkl_value("name: \"a\"\nname: \"b\"").unwrap_err();
    assert!(matches!(err, ParseError::DuplicateKey { key } if key == "name"));
}

#[test]
fn test_parse_rejects_unterminated_block() {
    let err = parse_pkl_value("stateMachines {\n\tnew {\n").unwrap_err();
    assert!(matches!(err, ParseError::PestError(_)));
}

#[test]
fn test_parse_reports_schema_mismatch() {
    let err = parse_pkl("version: \"1.0\"").unwrap_err();
    assert!(matches!(err, ParseError::Schema(_)));
}

#[test]
fn test_unknown_action_type_parses_as_unknown() {
    let source = r#"
        name: "csm"
        version: "1.0"
        stateMachines {
            new {
                name: "M"
                states {
                    new {
                        name: "A"
                        entry {
                            new {
                                type: "teleport"
                            }
                        }
                    }
                }
            }
        }
    "#;

    let description = parse_pkl(source).expect("Should parse successfully");
    assert_eq!(
        description.state_machines[0].states[0].entry,
        vec![ActionDescription::Unknown]
    );
}

#[test]
fn test_round_trip_root_machine() {
    let csm = CollaborativeStateMachine::new("csm", "1.0").with_state_machine(root_machine());
    let description = csm.to_description();
    let text = generate_pkl(&description).expect("generate");
    assert_eq!(parse_pkl(&text).expect("parse"), description);
}

#[test]
fn test_round_trip_sample_csm() {
    let description = sample_csm().to_description();
    let text = generate_pkl(&description).expect("generate");
    let parsed = parse_pkl(&text).expect("parse");
    assert_eq!(parsed, description);

    let rebuilt = CollaborativeStateMachine::from_description(&parsed).expect("rebuild");
    assert_eq!(rebuilt.all_state_machines().len(), 3);
}

#[test]
fn test_loaders_agree() {
    let description = sample_csm().to_description();
    let json = serde_json::to_string(&description).expect("serialize");
    let pkl = generate_pkl(&description).expect("generate");

    assert_eq!(JsonLoader.load(&json).expect("json"), description);
    assert_eq!(PklLoader.load(&pkl).expect("pkl"), description);
}

#[test]
fn test_loader_for_path_by_extension() {
    assert_eq!(
        loader_for_path(Path::new("machine.PKL")).expect("pkl").format(),
        "pkl"
    );
    assert_eq!(
        loader_for_path(Path::new("dir/machine.json")).expect("json").format(),
        "json"
    );
    assert!(matches!(
        loader_for_path(Path::new("machine.yaml")),
        Err(ParseError::UnsupportedFormat(_))
    ));
}
