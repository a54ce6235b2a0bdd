use std::fmt;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use shipyard_core::{EntityKind, FieldType, FieldValue};

use crate::errors::GenerationError;

/// Arbitrary value producer; receives the session random source.
pub type ProducerFn = dyn Fn(&mut dyn RngCore) -> FieldValue + Send + Sync;

/// How a rule produces a value each time it is invoked.
#[derive(Clone)]
pub enum Producer {
    /// Always the same value.
    Constant(FieldValue),
    /// Uniform over `min, min + step, ...` strictly below `max`.
    IntRange { min: i64, max: i64, step: i64 },
    /// `prefix` followed by an integer uniform in `[min, max)`.
    Prefixed { prefix: String, min: i64, max: i64 },
    /// Uniform choice from an explicit candidate pool.
    Pool(Arc<[FieldValue]>),
    Custom(Arc<ProducerFn>),
}

impl Producer {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> FieldValue + Send + Sync + 'static,
    {
        Producer::Custom(Arc::new(f))
    }

    pub fn pool<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Producer::Pool(values.into_iter().map(Into::into).collect())
    }

    /// Output type when it is known without invoking the producer.
    pub fn value_type(&self) -> Option<FieldType> {
        match self {
            Producer::Constant(value) => Some(value.field_type()),
            Producer::IntRange { .. } => Some(FieldType::Integer),
            Producer::Prefixed { .. } => Some(FieldType::Text),
            Producer::Pool(values) => values.first().map(FieldValue::field_type),
            Producer::Custom(_) => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Producer::IntRange { min, max, step } => {
                if *step <= 0 {
                    return Err(format!("step must be positive, got {step}"));
                }
                if min >= max {
                    return Err(format!("empty range [{min}, {max})"));
                }
                if range_slots(*min, *max, *step).is_none() {
                    return Err(format!(
                        "range [{min}, {max}) step {step} has too many values"
                    ));
                }
                Ok(())
            }
            Producer::Prefixed { min, max, .. } => {
                if min >= max {
                    return Err(format!("empty range [{min}, {max})"));
                }
                Ok(())
            }
            Producer::Pool(values) => {
                let Some(first) = values.first() else {
                    return Ok(());
                };
                if values
                    .iter()
                    .any(|value| value.field_type() != first.field_type())
                {
                    return Err("pool mixes text and integer values".to_string());
                }
                Ok(())
            }
            Producer::Constant(_) | Producer::Custom(_) => Ok(()),
        }
    }

    /// Produce one value; `None` when the producer has nothing to draw from.
    pub fn produce(&self, rng: &mut dyn RngCore) -> Option<FieldValue> {
        match self {
            Producer::Constant(value) => Some(value.clone()),
            Producer::IntRange { min, max, step } => {
                let slots = range_slots(*min, *max, *step)?;
                let slot = rng.random_range(0..slots);
                let value = i128::from(*min) + i128::from(slot) * i128::from(*step);
                i64::try_from(value).ok().map(FieldValue::Int)
            }
            Producer::Prefixed { prefix, min, max } => {
                if min >= max {
                    return None;
                }
                let number = rng.random_range(*min..*max);
                Some(FieldValue::Text(format!("{prefix}{number}")))
            }
            Producer::Pool(values) => sample_pool(&values[..], rng).cloned(),
            Producer::Custom(f) => Some(f(rng)),
        }
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Producer::IntRange { min, max, step } => f
                .debug_struct("IntRange")
                .field("min", min)
                .field("max", max)
                .field("step", step)
                .finish(),
            Producer::Prefixed { prefix, min, max } => f
                .debug_struct("Prefixed")
                .field("prefix", prefix)
                .field("min", min)
                .field("max", max)
                .finish(),
            Producer::Pool(values) => f.debug_tuple("Pool").field(&values.len()).finish(),
            Producer::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Number of values `min, min + step, ...` below `max`, if it fits an `i64`.
fn range_slots(min: i64, max: i64, step: i64) -> Option<i64> {
    if step <= 0 || min >= max {
        return None;
    }
    let width = i128::from(max) - i128::from(min);
    let step = i128::from(step);
    i64::try_from((width + step - 1) / step).ok()
}

/// Uniformly pick one candidate from `pool`.
pub fn sample_pool<'a, T, R>(pool: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    pool.choose(rng)
}

/// A value-producing rule bound to one declared field of one entity kind.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: EntityKind,
    field: &'static str,
    producer: Producer,
}

impl Rule {
    /// Validate the field against the kind's schema and the producer output
    /// against the field type.
    pub fn new(kind: EntityKind, field: &str, producer: Producer) -> Result<Self, GenerationError> {
        let spec = kind.require_field(field)?;
        let invalid = |message: String| GenerationError::InvalidRule {
            kind,
            field: spec.name.to_string(),
            message,
        };

        producer.validate().map_err(invalid)?;
        if let Some(value_type) = producer.value_type() {
            if value_type != spec.field_type {
                return Err(invalid(format!(
                    "produces {value_type} values for a {} field",
                    spec.field_type
                )));
            }
        }

        Ok(Self {
            kind,
            field: spec.name,
            producer,
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn matches(&self, kind: EntityKind, field: &str) -> bool {
        self.kind == kind && self.field == field
    }

    /// Invoke the producer and check the value against the field type.
    pub fn produce(&self, rng: &mut dyn RngCore) -> Result<FieldValue, GenerationError> {
        let value = self
            .producer
            .produce(rng)
            .ok_or_else(|| GenerationError::EmptyPool {
                kind: self.kind,
                field: self.field.to_string(),
            })?;

        let expected = self.kind.require_field(self.field)?.field_type;
        if value.field_type() != expected {
            return Err(shipyard_core::Error::TypeMismatch {
                kind: self.kind,
                field: self.field.to_string(),
                expected,
            }
            .into());
        }
        Ok(value)
    }
}

/// Serializable rule declaration used by configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub kind: EntityKind,
    pub field: String,
    pub producer: ProducerSpec,
}

/// Serializable producer declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProducerSpec {
    Constant {
        value: FieldValue,
    },
    IntRange {
        min: i64,
        max: i64,
        #[serde(default = "default_step")]
        step: i64,
    },
    Prefixed {
        prefix: String,
        min: i64,
        max: i64,
    },
    Pool {
        values: Vec<FieldValue>,
    },
}

fn default_step() -> i64 {
    1
}

impl From<&ProducerSpec> for Producer {
    fn from(spec: &ProducerSpec) -> Self {
        match spec {
            ProducerSpec::Constant { value } => Producer::Constant(value.clone()),
            ProducerSpec::IntRange { min, max, step } => Producer::IntRange {
                min: *min,
                max: *max,
                step: *step,
            },
            ProducerSpec::Prefixed { prefix, min, max } => Producer::Prefixed {
                prefix: prefix.clone(),
                min: *min,
                max: *max,
            },
            ProducerSpec::Pool { values } => Producer::pool(values.iter().cloned()),
        }
    }
}

impl RuleSpec {
    pub fn to_rule(&self) -> Result<Rule, GenerationError> {
        Rule::new(self.kind, &self.field, Producer::from(&self.producer))
    }
}

/// The stock rule table covering every field except Ship foreign keys.
///
/// Ship references are filled from existing pools by the assembler.
pub fn default_rules() -> Vec<Rule> {
    use EntityKind::{Engine, Hull, Ship, Weapon};

    vec![
        stock(Hull, "hull", prefixed("hull_")),
        stock(Hull, "armor", range(30, 500, 10)),
        stock(Hull, "type", range(1, 10, 1)),
        stock(Hull, "capacity", range(100, 800, 10)),
        stock(Engine, "engine", prefixed("engine_")),
        stock(Engine, "power", range(4000, 10000, 100)),
        stock(Engine, "type", range(1, 10, 1)),
        stock(Weapon, "weapon", prefixed("weapon_")),
        stock(Weapon, "reload_speed", range(3, 30, 1)),
        stock(Weapon, "rotational_speed", range(15, 60, 3)),
        stock(Weapon, "diameter", range(3, 30, 1)),
        stock(Weapon, "power_volley", range(100, 2000, 30)),
        stock(Weapon, "count", range(1, 4, 1)),
        stock(Ship, "ship", prefixed("ship_")),
    ]
}

fn stock(kind: EntityKind, field: &'static str, producer: Producer) -> Rule {
    Rule {
        kind,
        field,
        producer,
    }
}

fn prefixed(prefix: &str) -> Producer {
    Producer::Prefixed {
        prefix: prefix.to_string(),
        min: 1,
        max: 900_000,
    }
}

fn range(min: i64, max: i64, step: i64) -> Producer {
    Producer::IntRange { min, max, step }
}
