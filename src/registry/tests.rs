//! Unit tests for name registries

use crate::registry::{NameCategory, NameRegistry, Registries};

#[test]
fn test_register_twice_fails() {
    let mut registry = NameRegistry::new(NameCategory::Action);
    assert!(registry.register_name("send"));
    assert!(!registry.register_name("send"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_unregister_frees_name() {
    let mut registry = NameRegistry::new(NameCategory::Guard);
    registry.register_name("g1");
    assert!(!registry.is_name_unique("g1"));
    assert!(registry.unregister_name("g1"));
    assert!(registry.is_name_unique("g1"));
    assert!(!registry.unregister_name("g1"));
}

#[test]
fn test_generated_names_skip_taken_ones() {
    let mut registry = NameRegistry::new(NameCategory::StateOrStateMachine);
    registry.register_name("State2");

    let first = registry.generate_unique_name("State");
    assert_eq!(first, "State1");
    registry.register_name(&first);
    assert_eq!(registry.generate_unique_name("State"), "State3");
}

#[test]
fn test_counter_is_never_reused() {
    let mut registry = NameRegistry::new(NameCategory::StateOrStateMachine);
    let first = registry.generate_unique_name("State");
    registry.register_name(&first);
    registry.unregister_name(&first);

    assert_eq!(registry.generate_unique_name("State"), "State2");
}

#[test]
fn test_generated_name_is_not_registered() {
    let mut registry = NameRegistry::new(NameCategory::Event);
    let name = registry.generate_unique_name("event");
    assert!(registry.is_name_unique(&name));
    assert!(registry.is_empty());
}

#[test]
fn test_categories_are_independent() {
    let mut registries = Registries::default();
    assert!(registries
        .get_mut(NameCategory::Action)
        .register_name("shared"));
    assert!(registries
        .get_mut(NameCategory::Guard)
        .register_name("shared"));
    assert!(registries
        .get(NameCategory::StateOrStateMachine)
        .is_name_unique("shared"));
}

#[test]
fn test_reset_clears_every_registry() {
    let mut registries = Registries::default();
    for category in NameCategory::ALL {
        let registry = registries.get_mut(category);
        let name = registry.generate_unique_name("x");
        registry.register_name(&name);
    }

    registries.reset();

    for category in NameCategory::ALL {
        let registry = registries.get_mut(category);
        assert!(registry.is_empty(), "{category}");
        assert_eq!(registry.generate_unique_name("x"), "x1");
    }
}
