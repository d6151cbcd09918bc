// Constraint trait and failure descriptions

use sieve_core::{RuleFault, Value};
use std::borrow::Cow;

/// One rejection, still in template form.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Message template, e.g. `{{name}} must be a string`
    pub template: Cow<'static, str>,
    /// Placeholder values other than `name`
    pub params: Vec<(&'static str, String)>,
    /// Explicit `{{name}}`; the rendered value is used when unset
    pub name: Option<String>,
}

impl Failure {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            params: Vec::new(),
            name: None,
        }
    }

    pub fn with_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A single check inside a rule chain.
pub trait Constraint: Send + Sync {
    fn id(&self) -> &str;

    /// Failures for `value` (`None` when absent); empty when accepted.
    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault>;

    /// Failure reported when this constraint is negated and still passes.
    fn negated(&self) -> Failure;
}
