use std::ops::Deref;

use tracing::debug;

use shipyard_core::EntityKind;

use crate::errors::GenerationError;
use crate::rules::{Producer, Rule, RuleSpec, default_rules};

/// Ordered rule collection.
///
/// Order is significant: when several rules target the same field, the one
/// registered last wins during generation.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Registry pre-loaded with the stock rule table.
    pub fn with_defaults() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Validate and append a rule.
    pub fn add(
        &mut self,
        kind: EntityKind,
        field: &str,
        producer: Producer,
    ) -> Result<(), GenerationError> {
        self.add_rule(Rule::new(kind, field, producer)?);
        Ok(())
    }

    pub fn add_spec(&mut self, spec: &RuleSpec) -> Result<(), GenerationError> {
        self.add_rule(spec.to_rule()?);
        Ok(())
    }

    /// Remove the most recently added rule.
    pub fn pop_rule(&mut self) -> Option<Rule> {
        self.rules.pop()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules targeting `kind`, in registration order.
    pub fn matching(&self, kind: EntityKind) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.kind() == kind)
    }

    /// Rules targeting `kind.field`, in registration order.
    pub fn matching_field<'a>(
        &'a self,
        kind: EntityKind,
        field: &'a str,
    ) -> impl Iterator<Item = &'a Rule> {
        self.rules
            .iter()
            .filter(move |rule| rule.matches(kind, field))
    }

    pub fn first_for(&self, kind: EntityKind, field: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(kind, field))
    }

    /// The highest-precedence rule for `kind.field`.
    pub fn last_for(&self, kind: EntityKind, field: &str) -> Option<&Rule> {
        self.rules.iter().rev().find(|rule| rule.matches(kind, field))
    }

    /// Open a scope whose rules are removed when the scope is dropped.
    pub fn scope(&mut self) -> RuleScope<'_> {
        RuleScope {
            registry: self,
            pushed: 0,
        }
    }
}

/// Temporary extension of a registry.
///
/// Rules pushed through the scope are popped in reverse order when it is
/// dropped, including on early returns and unwinding. The scope only hands
/// out shared access to the registry, so nothing can pop underneath it.
pub struct RuleScope<'a> {
    registry: &'a mut RuleRegistry,
    pushed: usize,
}

impl RuleScope<'_> {
    pub fn push(&mut self, rule: Rule) {
        self.registry.add_rule(rule);
        self.pushed += 1;
    }

    /// Validate and push a rule.
    pub fn add(
        &mut self,
        kind: EntityKind,
        field: &str,
        producer: Producer,
    ) -> Result<(), GenerationError> {
        self.push(Rule::new(kind, field, producer)?);
        Ok(())
    }

    /// Number of rules this scope will remove.
    pub fn pushed(&self) -> usize {
        self.pushed
    }
}

impl Deref for RuleScope<'_> {
    type Target = RuleRegistry;

    fn deref(&self) -> &Self::Target {
        self.registry
    }
}

impl Drop for RuleScope<'_> {
    fn drop(&mut self) {
        for _ in 0..self.pushed {
            self.registry.pop_rule();
        }
        debug!(rules = self.pushed, "rule scope released");
    }
}
