// Built-in constraints

use crate::message::{self, format_number};
use crate::traits::{Constraint, Failure};
use once_cell::sync::Lazy;
use regex::Regex;
use sieve_core::{RuleFault, Value};
use std::borrow::Cow;
use std::sync::Arc;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Scalar text form of a value; `None` for anything that is not a
/// string or number.
fn scalar_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Int(i) => Some(Cow::Owned(i.to_string())),
        Value::Float(f) => Some(Cow::Owned(f.to_string())),
        _ => None,
    }
}

/// Numeric reading of ints, floats and numeric strings.
pub(crate) fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn text_matches(regex: &Regex, value: Option<&Value>) -> bool {
    scalar_text(value).is_some_and(|text| regex.is_match(&text))
}

/// A parameterless yes/no check with fixed templates.
#[derive(Clone, Copy)]
pub struct Predicate {
    id: &'static str,
    accepts: fn(Option<&Value>) -> bool,
    template: &'static str,
    negated: &'static str,
}

impl Predicate {
    pub const fn new(
        id: &'static str,
        accepts: fn(Option<&Value>) -> bool,
        template: &'static str,
        negated: &'static str,
    ) -> Self {
        Self {
            id,
            accepts,
            template,
            negated,
        }
    }

    pub fn accepts(&self, value: Option<&Value>) -> bool {
        (self.accepts)(value)
    }
}

impl Constraint for Predicate {
    fn id(&self) -> &str {
        self.id
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if self.accepts(value) {
            Ok(vec![])
        } else {
            Ok(vec![Failure::new(self.template)])
        }
    }

    fn negated(&self) -> Failure {
        Failure::new(self.negated)
    }
}

pub const ALNUM: Predicate = Predicate::new(
    "alnum",
    |v| text_matches(&ALPHANUMERIC_REGEX, v),
    message::ALNUM,
    message::ALNUM_NOT,
);

pub const ALPHA: Predicate = Predicate::new(
    "alpha",
    |v| text_matches(&ALPHA_REGEX, v),
    message::ALPHA,
    message::ALPHA_NOT,
);

pub const DIGIT: Predicate = Predicate::new(
    "digit",
    |v| text_matches(&DIGIT_REGEX, v),
    message::DIGIT,
    message::DIGIT_NOT,
);

/// Absent and null values contain no whitespace.
pub const NO_WHITESPACE: Predicate = Predicate::new(
    "noWhitespace",
    |v| match v {
        None | Some(Value::Null) => true,
        other => scalar_text(other).is_some_and(|text| !text.chars().any(char::is_whitespace)),
    },
    message::NO_WHITESPACE,
    message::NO_WHITESPACE_NOT,
);

pub const NOT_EMPTY: Predicate = Predicate::new(
    "notEmpty",
    |v| match v {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::List(items)) => !items.is_empty(),
        Some(Value::Map(map)) => !map.is_empty(),
        Some(Value::Element(element)) => {
            !element.children.is_empty() || !element.text.trim().is_empty()
        }
        Some(_) => true,
    },
    message::NOT_EMPTY,
    message::NOT_EMPTY_NOT,
);

pub const STRING_TYPE: Predicate = Predicate::new(
    "stringType",
    |v| matches!(v, Some(Value::String(_))),
    message::STRING_TYPE,
    message::STRING_TYPE_NOT,
);

pub const INT_TYPE: Predicate = Predicate::new(
    "intType",
    |v| matches!(v, Some(Value::Int(_))),
    message::INT_TYPE,
    message::INT_TYPE_NOT,
);

pub const NUMERIC: Predicate = Predicate::new(
    "numericVal",
    |v| as_number(v).is_some(),
    message::NUMERIC,
    message::NUMERIC_NOT,
);

pub const POSITIVE: Predicate = Predicate::new(
    "positive",
    |v| as_number(v).is_some_and(|n| n > 0.0),
    message::POSITIVE,
    message::POSITIVE_NOT,
);

pub const EMAIL: Predicate = Predicate::new(
    "email",
    |v| matches!(v, Some(Value::String(s)) if EMAIL_REGEX.is_match(s)),
    message::EMAIL,
    message::EMAIL_NOT,
);

pub const URL: Predicate = Predicate::new(
    "url",
    |v| matches!(v, Some(Value::String(s)) if URL_REGEX.is_match(s)),
    message::URL,
    message::URL_NOT,
);

pub const UUID: Predicate = Predicate::new(
    "uuid",
    |v| matches!(v, Some(Value::String(s)) if UUID_REGEX.is_match(s)),
    message::UUID,
    message::UUID_NOT,
);

/// Length of strings (in characters), integers (in digits, sign excluded) and
/// collections (in entries). Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Length {
    pub fn measure(value: Option<&Value>) -> Option<usize> {
        match value? {
            Value::String(s) => Some(s.chars().count()),
            Value::Int(i) => Some(i.unsigned_abs().to_string().len()),
            Value::List(items) => Some(items.len()),
            Value::Map(map) => Some(map.len()),
            Value::Element(element) => Some(element.children.len()),
            _ => None,
        }
    }

    fn failure(&self, positive: bool) -> Failure {
        let (template, negated) = match (self.min, self.max) {
            (Some(_), Some(_)) => (message::LENGTH_BETWEEN, message::LENGTH_BETWEEN_NOT),
            (Some(_), None) => (message::LENGTH_GREATER, message::LENGTH_GREATER_NOT),
            (None, _) => (message::LENGTH_LOWER, message::LENGTH_LOWER_NOT),
        };
        let mut failure = Failure::new(if positive { template } else { negated });
        if let Some(min) = self.min {
            failure = failure.with_param("minValue", min.to_string());
        }
        if let Some(max) = self.max {
            failure = failure.with_param("maxValue", max.to_string());
        }
        failure
    }
}

impl Constraint for Length {
    fn id(&self) -> &str {
        "length"
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if let Some((min, max)) = self.min.zip(self.max).filter(|(min, max)| min > max) {
            return Err(RuleFault::misconfigured(
                "length",
                format!("minimum {} is greater than maximum {}", min, max),
            ));
        }

        let accepted = Self::measure(value).is_some_and(|len| {
            self.min.is_none_or(|min| len >= min) && self.max.is_none_or(|max| len <= max)
        });

        Ok(if accepted { vec![] } else { vec![self.failure(true)] })
    }

    fn negated(&self) -> Failure {
        self.failure(false)
    }
}

/// Inclusive numeric range. Each bound reports its own message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Between {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Constraint for Between {
    fn id(&self) -> &str {
        match (self.min, self.max) {
            (Some(_), Some(_)) => "between",
            (Some(_), None) => "min",
            _ => "max",
        }
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        let Some(n) = as_number(value) else {
            return Ok(vec![self.bound_failure(true)]);
        };

        if let Some(min) = self.min.filter(|min| n < *min) {
            return Ok(vec![
                Failure::new(message::MIN).with_param("compareTo", format_number(min)),
            ]);
        }
        if let Some(max) = self.max.filter(|max| n > *max) {
            return Ok(vec![
                Failure::new(message::MAX).with_param("compareTo", format_number(max)),
            ]);
        }
        Ok(vec![])
    }

    fn negated(&self) -> Failure {
        self.bound_failure(false)
    }
}

impl Between {
    fn bound_failure(&self, positive: bool) -> Failure {
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                Failure::new(if positive { message::BETWEEN } else { message::BETWEEN_NOT })
                    .with_param("minValue", format_number(min))
                    .with_param("maxValue", format_number(max))
            }
            (Some(min), None) => Failure::new(if positive { message::MIN } else { message::MIN_NOT })
                .with_param("compareTo", format_number(min)),
            (None, max) => Failure::new(if positive { message::MAX } else { message::MAX_NOT })
                .with_param("compareTo", max.map(format_number).unwrap_or_default()),
        }
    }
}

/// Scalar text matching a user-supplied pattern.
#[derive(Debug, Clone)]
pub struct Pattern(pub Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self(Regex::new(pattern)?))
    }
}

impl Constraint for Pattern {
    fn id(&self) -> &str {
        "regex"
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if text_matches(&self.0, value) {
            Ok(vec![])
        } else {
            Ok(vec![Failure::new(message::REGEX).with_param("regex", self.0.as_str())])
        }
    }

    fn negated(&self) -> Failure {
        Failure::new(message::REGEX_NOT).with_param("regex", self.0.as_str())
    }
}

/// Membership in a fixed set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf(pub Vec<Value>);

impl OneOf {
    fn haystack(&self) -> String {
        Value::List(self.0.clone()).render()
    }
}

impl Constraint for OneOf {
    fn id(&self) -> &str {
        "in"
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if value.is_some_and(|v| self.0.contains(v)) {
            Ok(vec![])
        } else {
            Ok(vec![Failure::new(message::IN).with_param("haystack", self.haystack())])
        }
    }

    fn negated(&self) -> Failure {
        Failure::new(message::IN_NOT).with_param("haystack", self.haystack())
    }
}

type CallbackFn = dyn Fn(Option<&Value>) -> Result<bool, RuleFault> + Send + Sync;

/// Closure-backed check with its own templates.
#[derive(Clone)]
pub struct Callback {
    id: String,
    check: Arc<CallbackFn>,
    template: Cow<'static, str>,
    negated: Cow<'static, str>,
}

impl Callback {
    pub fn new<F>(id: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<bool, RuleFault> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            check: Arc::new(check),
            template: Cow::Borrowed(message::CALLBACK),
            negated: Cow::Borrowed(message::CALLBACK_NOT),
        }
    }

    pub fn with_template(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_negated_template(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.negated = template.into();
        self
    }
}

impl Constraint for Callback {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, value: Option<&Value>) -> Result<Vec<Failure>, RuleFault> {
        if (self.check)(value)? {
            Ok(vec![])
        } else {
            Ok(vec![Failure::new(self.template.clone())])
        }
    }

    fn negated(&self) -> Failure {
        Failure::new(self.negated.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_character_classes() {
        assert!(ALNUM.accepts(Some(&s("Josh123"))));
        assert!(!ALNUM.accepts(Some(&s("Josh 123"))));
        assert!(!ALNUM.accepts(Some(&s(""))));
        assert!(ALNUM.accepts(Some(&Value::Int(89))));
        assert!(!ALNUM.accepts(None));

        assert!(ALPHA.accepts(Some(&s("abc"))));
        assert!(!ALPHA.accepts(Some(&s("abc1"))));

        assert!(DIGIT.accepts(Some(&s("0123"))));
        assert!(!DIGIT.accepts(Some(&s("12a"))));
    }

    #[test]
    fn test_no_whitespace() {
        assert!(NO_WHITESPACE.accepts(None));
        assert!(NO_WHITESPACE.accepts(Some(&Value::Null)));
        assert!(NO_WHITESPACE.accepts(Some(&s("davidepastore"))));
        assert!(!NO_WHITESPACE.accepts(Some(&s("davide pastore"))));
        assert!(!NO_WHITESPACE.accepts(Some(&Value::List(vec![]))));
    }

    #[test]
    fn test_not_empty() {
        assert!(!NOT_EMPTY.accepts(None));
        assert!(!NOT_EMPTY.accepts(Some(&s("   "))));
        assert!(!NOT_EMPTY.accepts(Some(&Value::List(vec![]))));
        assert!(NOT_EMPTY.accepts(Some(&s("x"))));
        assert!(NOT_EMPTY.accepts(Some(&Value::Int(0))));
    }

    #[test]
    fn test_types_and_numbers() {
        assert!(STRING_TYPE.accepts(Some(&s("1"))));
        assert!(!STRING_TYPE.accepts(Some(&Value::Int(1))));
        assert!(INT_TYPE.accepts(Some(&Value::Int(1))));
        assert!(!INT_TYPE.accepts(Some(&s("1"))));

        assert!(NUMERIC.accepts(Some(&s("89"))));
        assert!(NUMERIC.accepts(Some(&s(" -2.5 "))));
        assert!(!NUMERIC.accepts(Some(&s("NaN"))));
        assert!(!NUMERIC.accepts(Some(&Value::Bool(true))));

        assert!(POSITIVE.accepts(Some(&Value::Float(0.1))));
        assert!(!POSITIVE.accepts(Some(&Value::Int(0))));
    }

    #[test]
    fn test_formats() {
        assert!(EMAIL.accepts(Some(&s("user@example.com"))));
        assert!(!EMAIL.accepts(Some(&s("not an email"))));
        assert!(URL.accepts(Some(&s("https://example.com/a"))));
        assert!(!URL.accepts(Some(&s("example.com"))));
        assert!(UUID.accepts(Some(&s("550e8400-e29b-41d4-a716-446655440000"))));
        assert!(!UUID.accepts(Some(&s("550e8400"))));
    }

    #[test]
    fn test_length_bounds() {
        let between = Length { min: Some(1), max: Some(5) };
        assert!(between.evaluate(Some(&s("Josh"))).unwrap().is_empty());
        assert!(between.evaluate(Some(&s("héllo"))).unwrap().is_empty());

        let failures = between.evaluate(Some(&s("davidepastore"))).unwrap();
        assert_eq!(failures[0].template, message::LENGTH_BETWEEN);
        assert_eq!(
            failures[0].params,
            vec![("minValue", "1".to_string()), ("maxValue", "5".to_string())]
        );

        let at_least = Length { min: Some(1), max: None };
        assert_eq!(
            at_least.evaluate(None).unwrap()[0].template,
            message::LENGTH_GREATER
        );
        assert!(at_least.evaluate(Some(&Value::Int(7))).unwrap().is_empty());
    }

    #[test]
    fn test_length_of_negative_integer_ignores_sign() {
        assert_eq!(Length::measure(Some(&Value::Int(-5))), Some(1));
        assert_eq!(Length::measure(Some(&Value::Int(-12345))), Some(5));
        assert_eq!(Length::measure(Some(&Value::Int(i64::MIN))), Some(19));

        let one_digit = Length { min: Some(1), max: Some(1) };
        assert!(one_digit.evaluate(Some(&Value::Int(-5))).unwrap().is_empty());
    }

    #[test]
    fn test_length_misconfigured() {
        let inverted = Length { min: Some(5), max: Some(1) };
        let fault = inverted.evaluate(Some(&s("abc"))).unwrap_err();
        assert!(matches!(fault, RuleFault::Misconfigured { .. }));
    }

    #[test]
    fn test_between_reports_violated_bound() {
        let range = Between { min: Some(20.0), max: Some(60.0) };
        assert!(range.evaluate(Some(&s("45"))).unwrap().is_empty());
        assert!(range.evaluate(Some(&Value::Int(60))).unwrap().is_empty());

        let high = range.evaluate(Some(&s("89"))).unwrap();
        assert_eq!(high[0].template, message::MAX);
        assert_eq!(high[0].params, vec![("compareTo", "60".to_string())]);

        let low = range.evaluate(Some(&Value::Int(3))).unwrap();
        assert_eq!(low[0].template, message::MIN);
        assert_eq!(low[0].params, vec![("compareTo", "20".to_string())]);

        let unreadable = range.evaluate(Some(&s("old"))).unwrap();
        assert_eq!(unreadable[0].template, message::BETWEEN);
    }

    #[test]
    fn test_pattern_and_one_of() {
        let pattern = Pattern::new(r"^[a-z]+-\d+$").unwrap();
        assert!(pattern.evaluate(Some(&s("abc-12"))).unwrap().is_empty());
        assert_eq!(
            pattern.evaluate(Some(&s("ABC"))).unwrap()[0].params,
            vec![("regex", r"^[a-z]+-\d+$".to_string())]
        );
        assert!(Pattern::new("(").is_err());

        let one_of = OneOf(vec![s("red"), s("green")]);
        assert!(one_of.evaluate(Some(&s("red"))).unwrap().is_empty());
        assert_eq!(
            one_of.evaluate(Some(&s("blue"))).unwrap()[0].params,
            vec![("haystack", "`{ \"red\", \"green\" }`".to_string())]
        );
    }

    #[test]
    fn test_callback_fault_propagates() {
        let failing = Callback::new("lookup", |_| Err(RuleFault::internal("lookup", "store offline")));
        assert!(failing.evaluate(Some(&s("x"))).is_err());

        let even = Callback::new("even", |v| Ok(matches!(v, Some(Value::Int(i)) if i % 2 == 0)))
            .with_template("{{name}} must be even");
        assert!(even.evaluate(Some(&Value::Int(4))).unwrap().is_empty());
        assert_eq!(
            even.evaluate(Some(&Value::Int(3))).unwrap()[0].template,
            "{{name}} must be even"
        );
    }
}
