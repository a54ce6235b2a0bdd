use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use shipyard_core::{EntityKind, FieldValue};
use shipyard_generate::{GenerationError, Generator, Producer, RuleRegistry};

fn no_overrides() -> Vec<(&'static str, FieldValue)> {
    Vec::new()
}

#[test]
fn constant_rule_sets_field_value() {
    let mut registry = RuleRegistry::with_defaults();
    registry
        .add(EntityKind::Hull, "armor", Producer::Constant(FieldValue::Int(100)))
        .expect("register armor rule");
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let hull = Generator::new(&registry)
        .generate(EntityKind::Hull, [("hull", FieldValue::from("H1"))], &mut rng)
        .expect("generate hull");

    assert_eq!(hull.identity(), "H1");
    assert_eq!(hull.get("armor"), Some(FieldValue::Int(100)));
}

#[test]
fn scoped_ship_rules_apply_only_inside_scope() {
    let mut registry = RuleRegistry::with_defaults();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    {
        let mut scope = registry.scope();
        scope
            .add(EntityKind::Ship, "hull", Producer::pool(["HX"]))
            .expect("push hull rule");
        scope
            .add(EntityKind::Ship, "weapon", Producer::pool(["WX"]))
            .expect("push weapon rule");

        let generator = Generator::new(&scope);
        for _ in 0..5 {
            let ship = generator
                .generate(
                    EntityKind::Ship,
                    [("engine", FieldValue::from("E1"))],
                    &mut rng,
                )
                .expect("generate ship");
            assert_eq!(ship.get("hull"), Some(FieldValue::from("HX")));
            assert_eq!(ship.get("weapon"), Some(FieldValue::from("WX")));
        }
    }

    let err = Generator::new(&registry)
        .generate(
            EntityKind::Ship,
            [("engine", FieldValue::from("E1"))],
            &mut rng,
        )
        .unwrap_err();
    match err {
        GenerationError::MissingFields { kind, fields } => {
            assert_eq!(kind, EntityKind::Ship);
            assert_eq!(fields, vec!["weapon".to_string(), "hull".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn later_rule_wins_and_overrides_win_over_rules() {
    let mut registry = RuleRegistry::with_defaults();
    registry
        .add(EntityKind::Engine, "power", Producer::Constant(FieldValue::Int(1)))
        .expect("first power rule");
    registry
        .add(EntityKind::Engine, "power", Producer::Constant(FieldValue::Int(2)))
        .expect("second power rule");
    let generator = Generator::new(&registry);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let engine = generator
        .generate(EntityKind::Engine, no_overrides(), &mut rng)
        .expect("generate engine");
    assert_eq!(engine.get("power"), Some(FieldValue::Int(2)));

    let engine = generator
        .generate(EntityKind::Engine, [("power", FieldValue::Int(9))], &mut rng)
        .expect("generate engine with override");
    assert_eq!(engine.get("power"), Some(FieldValue::Int(9)));
}

#[test]
fn overrides_are_limited_and_type_checked() {
    let registry = RuleRegistry::with_defaults();
    let generator = Generator::new(&registry);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let err = generator
        .generate(
            EntityKind::Engine,
            [
                ("engine", FieldValue::from("E1")),
                ("power", FieldValue::Int(5000)),
                ("type", FieldValue::Int(2)),
            ],
            &mut rng,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::TooManyOverrides {
            given: 3,
            limit: 3,
            ..
        }
    ));

    let err = generator
        .generate(EntityKind::Hull, [("armor", FieldValue::from("thick"))], &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Core(shipyard_core::Error::TypeMismatch { .. })
    ));

    let err = generator
        .generate(EntityKind::Hull, [("power", FieldValue::Int(1))], &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Core(shipyard_core::Error::UnknownField { .. })
    ));
}

#[test]
fn generation_is_deterministic_for_a_seed() {
    let registry = RuleRegistry::with_defaults();
    let generator = Generator::new(&registry);

    let mut rng_a = ChaCha8Rng::seed_from_u64(42);
    let mut rng_b = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..10 {
        let a = generator
            .generate(EntityKind::Weapon, no_overrides(), &mut rng_a)
            .expect("weapon a");
        let b = generator
            .generate(EntityKind::Weapon, no_overrides(), &mut rng_b)
            .expect("weapon b");
        assert_eq!(a, b);
    }
}
