//! Rule tree validation for request parameters
//!
//! A [`RuleTree`] maps field names to rules or to nested rule trees. A
//! validation pass walks it against a [`Map`] of parameters and collects
//! every rejection into an [`ErrorMap`] keyed by dotted path
//! (`email.sub.name`). All rules run; nothing stops at the first failure.
//!
//! # Example
//!
//! ```
//! use sieve_core::{params, rule_fn, RuleTree, Validator, Value};
//!
//! let short = rule_fn("length", |value, _| {
//!     Ok(match value {
//!         Some(Value::String(s)) if s.chars().count() <= 5 => vec![],
//!         _ => vec!["too long".to_string()],
//!     })
//! });
//!
//! let mut validator = Validator::new(RuleTree::new().rule("username", short));
//! let errors = validator.validate(&params! { "username" => "davidepastore" })?;
//!
//! assert_eq!(errors.get("username"), Some(&["too long".to_string()][..]));
//! assert!(validator.has_errors());
//! # Ok::<(), sieve_core::ValidationError>(())
//! ```

pub mod error;
pub mod logging;
pub mod matcher;
pub mod params;
pub mod rule;
pub mod translator;
pub mod value;

pub use error::{CatalogError, Result, RuleFault, ValidationError};
pub use matcher::{ErrorMap, ValidationReport, Validator, resolve, validate};
pub use params::{ParamSources, body_entries, merge_params};
pub use rule::{Rule, RuleFn, RuleNode, RuleTree, rule_fn};
pub use translator::{
    Context, MessageCatalog, Translator, TranslatorScope, default_translator, install_default,
};
pub use value::{ArrayLike, Element, Map, Value};
