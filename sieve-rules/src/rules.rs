// Rule chains

use crate::message::{self, render};
use crate::traits::{Constraint, Failure};
use crate::validators::{
    ALNUM, ALPHA, Between, Callback, DIGIT, EMAIL, INT_TYPE, Length, NOT_EMPTY, NO_WHITESPACE,
    NUMERIC, OneOf, POSITIVE, Pattern, STRING_TYPE, URL, UUID,
};
use sieve_core::{Context, Rule, RuleFault, Value};
use std::fmt;
use std::sync::Arc;

/// All-of chain of constraints.
///
/// Every step runs, and the failures of all of them are reported in order.
/// A chain is itself a [`Rule`] and can be placed directly in a
/// [`RuleTree`](sieve_core::RuleTree).
///
/// ```
/// use sieve_core::{Context, Rule, Value};
///
/// let username = sieve_rules::alnum().no_whitespace().length_between(1, 5);
/// let messages = username
///     .check(Some(&Value::from("davidepastore")), &Context::verbatim())
///     .unwrap();
///
/// assert_eq!(messages, vec!["\"davidepastore\" must have a length between 1 and 5"]);
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn Constraint>>,
    name: Option<String>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any constraint, including another chain.
    pub fn with<C: Constraint + 'static>(mut self, constraint: C) -> Self {
        self.steps.push(Arc::new(constraint));
        self
    }

    /// Name shown as `{{name}}` in place of the rendered value.
    ///
    /// Applies to every step that has no name of its own.
    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn alnum(self) -> Self {
        self.with(ALNUM)
    }

    pub fn alpha(self) -> Self {
        self.with(ALPHA)
    }

    pub fn digit(self) -> Self {
        self.with(DIGIT)
    }

    pub fn no_whitespace(self) -> Self {
        self.with(NO_WHITESPACE)
    }

    pub fn not_empty(self) -> Self {
        self.with(NOT_EMPTY)
    }

    pub fn string_type(self) -> Self {
        self.with(STRING_TYPE)
    }

    pub fn int_type(self) -> Self {
        self.with(INT_TYPE)
    }

    pub fn numeric_val(self) -> Self {
        self.with(NUMERIC)
    }

    pub fn positive(self) -> Self {
        self.with(POSITIVE)
    }

    pub fn email(self) -> Self {
        self.with(EMAIL)
    }

    pub fn url(self) -> Self {
        self.with(URL)
    }

    pub fn uuid(self) -> Self {
        self.with(UUID)
    }

    /// Length with optional inclusive bounds.
    pub fn length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.with(Length { min, max })
    }

    pub fn length_between(self, min: usize, max: usize) -> Self {
        self.length(Some(min), Some(max))
    }

    /// Inclusive numeric range.
    pub fn between(self, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        self.with(Between {
            min: Some(min.into()),
            max: Some(max.into()),
        })
    }

    pub fn min(self, min: impl Into<f64>) -> Self {
        self.with(Between {
            min: Some(min.into()),
            max: None,
        })
    }

    pub fn max(self, max: impl Into<f64>) -> Self {
        self.with(Between {
            min: None,
            max: Some(max.into()),
        })
    }

    pub fn regex(self, pattern: &str) -> Result<Self, regex::Error> {
        Ok(self.with(Pattern::new(pattern)?))
    }

    pub fn in_list<V: Into<Value>>(self, haystack: impl IntoIterator<Item = V>) -> Self {
        self.with(OneOf(haystack.into_iter().map(Into::into).collect()))
    }

    pub fn callback<F>(self, id: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<bool, RuleFault> + Send + Sync + 'static,
    {
        self.with(Callback::new(id, check))
    }

    /// Failures for `value` with templates still unrendered.
    pub fn failures(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        Constraint::evaluate(self, value)
    }

    fn named(&self, mut failure: Failure) -> Failure {
        if failure.name.is_none() {
            failure.name = self.name.clone();
        }
        failure
    }
}

impl Constraint for Chain {
    fn id(&self) -> &str {
        match self.steps.as_slice() {
            [single] => single.id(),
            _ => "allOf",
        }
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        let mut failures = Vec::new();
        for step in &self.steps {
            for failure in step.evaluate(value)? {
                failures.push(self.named(failure));
            }
        }
        Ok(failures)
    }

    fn negated(&self) -> Failure {
        match self.steps.as_slice() {
            [single] => self.named(single.negated()),
            _ => self.named(Failure::new(message::ALL_OF_NOT)),
        }
    }
}

impl Rule for Chain {
    fn id(&self) -> &str {
        Constraint::id(self)
    }

    fn check(&self, value: Option<&Value>, ctx: &Context<'_>) -> Result<Vec<String>, RuleFault> {
        Ok(self
            .failures(value)?
            .iter()
            .map(|failure| render(failure, value, ctx))
            .collect())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.steps.iter().map(|step| step.id()).collect();
        f.debug_struct("Chain")
            .field("steps", &ids)
            .field("name", &self.name)
            .finish()
    }
}

/// Passes absent values, `null` and the empty string; anything else must
/// satisfy the inner chain.
#[derive(Debug, Clone)]
pub struct Optional(pub Chain);

impl Optional {
    fn skips(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }
}

impl Constraint for Optional {
    fn id(&self) -> &str {
        "optional"
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if Self::skips(value) {
            Ok(vec![])
        } else {
            self.0.evaluate(value)
        }
    }

    fn negated(&self) -> Failure {
        self.0.negated()
    }
}

/// Inverts the inner chain: fails with its negated message when the inner
/// chain accepts.
#[derive(Debug, Clone)]
pub struct Not(pub Chain);

impl Constraint for Not {
    fn id(&self) -> &str {
        "not"
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if self.0.evaluate(value)?.is_empty() {
            Ok(vec![self.0.negated()])
        } else {
            Ok(vec![])
        }
    }

    fn negated(&self) -> Failure {
        Failure::new(message::CALLBACK)
    }
}

pub fn alnum() -> Chain {
    Chain::new().alnum()
}

pub fn alpha() -> Chain {
    Chain::new().alpha()
}

pub fn digit() -> Chain {
    Chain::new().digit()
}

pub fn no_whitespace() -> Chain {
    Chain::new().no_whitespace()
}

pub fn not_empty() -> Chain {
    Chain::new().not_empty()
}

pub fn string_type() -> Chain {
    Chain::new().string_type()
}

pub fn int_type() -> Chain {
    Chain::new().int_type()
}

pub fn numeric_val() -> Chain {
    Chain::new().numeric_val()
}

pub fn positive() -> Chain {
    Chain::new().positive()
}

pub fn email() -> Chain {
    Chain::new().email()
}

pub fn url() -> Chain {
    Chain::new().url()
}

pub fn uuid() -> Chain {
    Chain::new().uuid()
}

pub fn length(min: Option<usize>, max: Option<usize>) -> Chain {
    Chain::new().length(min, max)
}

pub fn between(min: impl Into<f64>, max: impl Into<f64>) -> Chain {
    Chain::new().between(min, max)
}

pub fn min(min: impl Into<f64>) -> Chain {
    Chain::new().min(min)
}

pub fn max(max: impl Into<f64>) -> Chain {
    Chain::new().max(max)
}

pub fn regex(pattern: &str) -> Result<Chain, regex::Error> {
    Chain::new().regex(pattern)
}

pub fn in_list<V: Into<Value>>(haystack: impl IntoIterator<Item = V>) -> Chain {
    Chain::new().in_list(haystack)
}

pub fn callback<F>(id: impl Into<String>, check: F) -> Chain
where
    F: Fn(Option<&Value>) -> Result<bool, RuleFault> + Send + Sync + 'static,
{
    Chain::new().callback(id, check)
}

pub fn optional(inner: Chain) -> Chain {
    Chain::new().with(Optional(inner))
}

pub fn not(inner: Chain) -> Chain {
    Chain::new().with(Not(inner))
}

/// Chain of chains, all of which must pass.
pub fn all_of(chains: impl IntoIterator<Item = Chain>) -> Chain {
    chains.into_iter().fold(Chain::new(), Chain::with)
}
