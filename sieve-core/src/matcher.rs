//! Rule tree matching and error aggregation
//!
//! The matcher walks the rule tree, not the value tree. For every leaf rule
//! the value is looked up again from the root of the parameter tree along
//! the full dotted path, so every level is re-checked for being array-like
//! no matter what a parent rule saw. A nested rule tree whose container is
//! missing therefore evaluates each of its leaves against an absent value.
//!
//! ```
//! use sieve_core::{params, rule_fn, validate, RuleTree, Translator, Value};
//!
//! let rules = RuleTree::new().tree(
//!     "email",
//!     RuleTree::new().rule("name", rule_fn("required", |value, _| {
//!         Ok(match value {
//!             Some(_) => vec![],
//!             None => vec!["name is required".to_string()],
//!         })
//!     })),
//! );
//!
//! let report = validate(&params! { "email" => "not a map" }, &rules, &Translator::identity())?;
//! assert!(report.has_errors());
//! assert_eq!(report.errors.get("email.name"), Some(&vec!["name is required".to_string()][..]));
//! # Ok::<(), sieve_core::ValidationError>(())
//! ```

use crate::error::ValidationError;
use crate::rule::{RuleNode, RuleTree};
use crate::translator::{Context, Translator, TranslatorScope, default_translator, install_default};
use crate::value::{Map, Value};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Failure messages keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap {
    entries: IndexMap<String, Vec<String>>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record messages for `path`, replacing any earlier entry.
    pub fn insert(&mut self, path: impl Into<String>, messages: Vec<String>) {
        self.entries.insert(path.into(), messages);
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// `{ "path": ["message", ...], ... }`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or(serde_json::Value::Null)
    }
}

impl<'a> IntoIterator for &'a ErrorMap {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<P: Into<String>> FromIterator<(P, Vec<String>)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (P, Vec<String>)>>(iter: I) -> Self {
        let mut map = ErrorMap::new();
        for (path, messages) in iter {
            map.insert(path, messages);
        }
        map
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: ErrorMap,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> ErrorMap {
        self.errors
    }
}

/// Run every rule in `rules` against `values`.
///
/// Never stops at the first rejection. A [`RuleFault`](crate::RuleFault)
/// aborts the pass and is returned with the path it happened at.
pub fn validate(
    values: &Map,
    rules: &RuleTree,
    translator: &Translator,
) -> Result<ValidationReport, ValidationError> {
    let ctx = Context::new(Some(translator));
    run(values, rules, &ctx)
}

fn run(values: &Map, rules: &RuleTree, ctx: &Context<'_>) -> Result<ValidationReport, ValidationError> {
    debug!(
        rule_count = rules.leaf_count(),
        param_count = values.len(),
        "Starting validation pass"
    );

    let mut errors = ErrorMap::new();
    let mut segments = Vec::new();
    walk(values, rules, &mut segments, ctx, &mut errors)?;

    debug!(error_count = errors.len(), "Validation pass finished");
    Ok(ValidationReport { errors })
}

fn walk<'r>(
    values: &Map,
    rules: &'r RuleTree,
    segments: &mut Vec<&'r str>,
    ctx: &Context<'_>,
    errors: &mut ErrorMap,
) -> Result<(), ValidationError> {
    for (field, node) in rules.iter() {
        segments.push(field);

        match node {
            RuleNode::Subtree(tree) => walk(values, tree, segments, ctx, errors)?,
            RuleNode::Leaf(rule) => {
                let value = resolve(values, segments.as_slice());
                trace!(
                    path = %segments.join("."),
                    rule = rule.id(),
                    present = value.is_some(),
                    "Checking rule"
                );

                let messages = rule.check(value, ctx).map_err(|source| {
                    let path = segments.join(".");
                    warn!(path = %path, rule = rule.id(), error = %source, "Rule fault aborted validation");
                    ValidationError::RuleFault { path, source }
                })?;

                if !messages.is_empty() {
                    errors.insert(segments.join("."), messages);
                }
            }
        }

        segments.pop();
    }

    Ok(())
}

/// Look up the value at `path`, starting from the root every time.
///
/// Yields `None` as soon as a step lands on something that is not a
/// mapping or markup element, or the next key is missing. When the path is
/// exhausted the value there is returned as-is, sub-trees included.
pub fn resolve<'v, S: AsRef<str>>(values: &'v Map, path: &[S]) -> Option<&'v Value> {
    let (first, rest) = path.split_first()?;
    let mut current = values.get(first.as_ref())?;
    for segment in rest {
        current = current.as_array_like()?.get(segment.as_ref())?;
    }
    Some(current)
}

/// Stateful validator: rule tree and translator configuration plus the
/// errors of the most recent pass.
///
/// Only one pass may be in flight per instance; wrap it in a lock when
/// sharing it between tasks.
#[derive(Debug, Default)]
pub struct Validator {
    rules: Arc<RuleTree>,
    translator: Option<Translator>,
    scope: TranslatorScope,
    errors: ErrorMap,
}

impl Validator {
    pub fn new(rules: RuleTree) -> Self {
        Self {
            rules: Arc::new(rules),
            ..Default::default()
        }
    }

    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.set_translator(translator);
        self
    }

    /// Choose between an instance-owned and the process-wide translator.
    ///
    /// Switching to [`TranslatorScope::Global`] installs the current
    /// translator (if any) as the process-wide default.
    pub fn with_scope(mut self, scope: TranslatorScope) -> Self {
        self.scope = scope;
        if scope == TranslatorScope::Global {
            install_default(self.translator.clone());
        }
        self
    }

    pub fn rules(&self) -> &Arc<RuleTree> {
        &self.rules
    }

    /// Replace the whole rule tree.
    pub fn set_rules(&mut self, rules: RuleTree) {
        self.rules = Arc::new(rules);
    }

    pub fn translator(&self) -> Option<&Translator> {
        self.translator.as_ref()
    }

    pub fn scope(&self) -> TranslatorScope {
        self.scope
    }

    /// Translator the next pass will use, after applying the scope.
    pub fn effective_translator(&self) -> Option<Translator> {
        match self.scope {
            TranslatorScope::Instance => self.translator.clone(),
            TranslatorScope::Global => default_translator(),
        }
    }

    pub fn set_translator(&mut self, translator: Translator) {
        self.translator = Some(translator);
        if self.scope == TranslatorScope::Global {
            install_default(self.translator.clone());
        }
    }

    /// Go back to verbatim templates.
    pub fn clear_translator(&mut self) {
        self.translator = None;
        if self.scope == TranslatorScope::Global {
            install_default(None);
        }
    }

    /// Run one pass, replacing the errors of the previous one.
    ///
    /// On a rule fault the stored errors stay empty.
    pub fn validate(&mut self, values: &Map) -> Result<&ErrorMap, ValidationError> {
        self.errors.clear();

        let report = match self.scope {
            TranslatorScope::Instance => {
                run(values, &self.rules, &Context::new(self.translator.as_ref()))?
            }
            TranslatorScope::Global => {
                let global = default_translator();
                run(values, &self.rules, &Context::new(global.as_ref()))?
            }
        };

        self.errors = report.errors;
        Ok(&self.errors)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleFault;
    use crate::rule::{RuleFn, rule_fn};
    use crate::value::Element;
    use crate::params;
    use std::sync::Mutex;

    fn required() -> RuleFn {
        rule_fn("required", |value, _| {
            Ok(match value {
                Some(_) => vec![],
                None => vec!["missing".to_string()],
            })
        })
    }

    fn max_int(limit: i64) -> RuleFn {
        rule_fn("max", move |value, ctx| {
            Ok(match value {
                Some(Value::Int(i)) if *i <= limit => vec![],
                Some(Value::String(s)) if s.parse::<i64>().map(|i| i <= limit).unwrap_or(false) => {
                    vec![]
                }
                other => vec![format!(
                    "{} {}",
                    other.map(Value::render).unwrap_or_else(|| "null".to_string()),
                    ctx.translate("is too big")
                )],
            })
        })
    }

    #[test]
    fn test_resolve_paths() {
        let values = params! {
            "a" => params! { "b" => params! { "c" => 1 } },
            "s" => "scalar",
        };
        assert_eq!(resolve(&values, &["a", "b", "c"]), Some(&Value::Int(1)));
        assert!(matches!(resolve(&values, &["a", "b"]), Some(Value::Map(_))));
        assert_eq!(resolve(&values, &["a", "x"]), None);
        assert_eq!(resolve(&values, &["s", "x"]), None);
        assert_eq!(resolve(&values, &["missing"]), None);
        assert_eq!(resolve::<&str>(&values, &[]), None);
    }

    #[test]
    fn test_resolve_does_not_descend_into_lists() {
        let values = params! { "items" => vec![params! { "id" => 1 }] };
        assert_eq!(resolve(&values, &["items", "0"]), None);
        assert_eq!(resolve(&values, &["items", "id"]), None);
    }

    #[test]
    fn test_resolve_through_element() {
        let body = Element::new("person").with_child(
            Element::new("email").with_child(Element::new("name").with_text("rq3r")),
        );
        let values = params! { "person" => body };
        assert_eq!(
            resolve(&values, &["person", "email", "name"]),
            Some(&Value::from("rq3r"))
        );
        assert_eq!(resolve(&values, &["person", "email", "name", "x"]), None);
    }

    #[test]
    fn test_element_attributes_are_not_path_segments() {
        let body = Element::new("person").with_child(
            Element::new("email").with_attribute("type", "work").with_text("a@b.c"),
        );
        let values = params! { "person" => body };

        assert_eq!(resolve(&values, &["person", "email", "@attributes"]), None);
        assert_eq!(resolve(&values, &["person", "email", "type"]), None);
        let email = resolve(&values, &["person", "email"]);
        assert!(matches!(email, Some(Value::Element(e)) if e.attribute("type") == Some("work")));
    }

    #[test]
    fn test_null_is_not_absent() {
        let values = params! { "n" => Value::Null };
        assert_eq!(resolve(&values, &["n"]), Some(&Value::Null));
        let report = validate(&values, &RuleTree::new().rule("n", required()), &Translator::identity()).unwrap();
        assert!(!report.has_errors());
    }

    #[test]
    fn test_empty_tree_has_no_errors() {
        let report = validate(&params! { "a" => 1 }, &RuleTree::new(), &Translator::identity()).unwrap();
        assert!(!report.has_errors());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_nested_paths_and_stray_fields() {
        let rules = RuleTree::new().tree(
            "email",
            RuleTree::new().tree(
                "sub",
                RuleTree::new().tree("sub-sub", RuleTree::new().rule("finally", max_int(200))),
            ),
        );
        let values = params! {
            "finally" => 22,
            "email" => params! {
                "finally" => 33,
                "sub" => params! {
                    "finally" => 97,
                    "sub-sub" => params! { "finally" => 321 },
                },
            },
        };

        let report = validate(&values, &rules, &Translator::identity()).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors.get("email.sub.sub-sub.finally"),
            Some(&["321 is too big".to_string()][..])
        );
    }

    #[test]
    fn test_missing_container_evaluates_leaves_against_absent() {
        let rules = RuleTree::new().tree(
            "message",
            RuleTree::new().tree(
                "notification",
                RuleTree::new().rule("title", required()).rule("body", required()),
            ),
        );
        let values = params! { "message" => params! { "notification" => 1 } };

        let report = validate(&values, &rules, &Translator::identity()).unwrap();
        let paths: Vec<_> = report.errors.paths().cloned().collect();
        assert_eq!(paths, vec!["message.notification.title", "message.notification.body"]);
    }

    #[test]
    fn test_fault_propagates_with_path() {
        let faulty = rule_fn("boom", |_, _| Err(RuleFault::internal("boom", "cannot evaluate")));
        let rules = RuleTree::new()
            .rule("ok", required())
            .tree("deep", RuleTree::new().rule("bad", faulty));

        let err = validate(&params! { "ok" => 1 }, &rules, &Translator::identity()).unwrap_err();
        assert_eq!(err.path(), "deep.bad");
    }

    #[test]
    fn test_translator_reaches_rules() {
        let rules = RuleTree::new().rule("n", max_int(1));
        let values = params! { "n" => 5 };
        let italian = Translator::new(|t| if t == "is too big" { "è troppo grande".into() } else { t.into() });

        let report = validate(&values, &rules, &italian).unwrap();
        assert_eq!(report.errors.get("n"), Some(&["5 è troppo grande".to_string()][..]));
    }

    #[test]
    fn test_validator_resets_between_passes() {
        let mut validator = Validator::new(RuleTree::new().rule("n", max_int(10)));

        validator.validate(&params! { "n" => 50 }).unwrap();
        assert!(validator.has_errors());

        validator.validate(&params! { "n" => 5 }).unwrap();
        assert!(!validator.has_errors());
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_validator_is_idempotent() {
        let mut validator = Validator::new(RuleTree::new().rule("a", required()).rule("b", max_int(1)));
        let values = params! { "b" => 2 };
        let first = validator.validate(&values).unwrap().clone();
        let second = validator.validate(&values).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_validator_fault_leaves_errors_empty() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let flaky = rule_fn("flaky", move |_, _| {
            let mut n = counter.lock().unwrap();
            *n += 1;
            if *n > 1 {
                Err(RuleFault::internal("flaky", "second call"))
            } else {
                Ok(vec!["first".to_string()])
            }
        });
        let mut validator = Validator::new(RuleTree::new().rule("x", flaky));

        assert!(validator.validate(&Map::new()).unwrap().contains("x"));
        assert!(validator.validate(&Map::new()).is_err());
        assert!(!validator.has_errors());
    }

    #[test]
    fn test_set_rules_and_translator() {
        let mut validator = Validator::new(RuleTree::new());
        assert!(validator.translator().is_none());
        assert_eq!(validator.scope(), TranslatorScope::Instance);

        validator.set_rules(RuleTree::new().rule("n", max_int(1)));
        let t = Translator::new(|_| "no".to_string());
        validator.set_translator(t.clone());
        assert!(validator.translator().unwrap().ptr_eq(&t));
        assert!(validator.effective_translator().unwrap().ptr_eq(&t));

        validator.validate(&params! { "n" => 2 }).unwrap();
        assert_eq!(validator.errors().get("n"), Some(&["2 no".to_string()][..]));

        validator.clear_translator();
        assert!(validator.effective_translator().is_none());
        validator.validate(&params! { "n" => 2 }).unwrap();
        assert_eq!(validator.errors().get("n"), Some(&["2 is too big".to_string()][..]));
    }

    #[test]
    fn test_error_map_json() {
        let map: ErrorMap = vec![("a.b", vec!["x".to_string()])].into_iter().collect();
        assert_eq!(map.to_json(), serde_json::json!({"a.b": ["x"]}));
    }
}
