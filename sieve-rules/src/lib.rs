//! Chainable rules for sieve
//!
//! Every constructor returns a [`Chain`], which implements
//! [`sieve_core::Rule`] and can be extended with further constraints:
//!
//! ```
//! use sieve_core::{params, RuleTree, Validator};
//! use sieve_rules as v;
//!
//! let rules = RuleTree::new()
//!     .rule("username", v::alnum().no_whitespace().length_between(1, 15))
//!     .rule("age", v::numeric_val().positive().between(1, 100));
//!
//! let mut validator = Validator::new(rules);
//! validator.validate(&params! { "username" => "Josh", "age" => "101" })?;
//!
//! assert_eq!(
//!     validator.errors().get("age"),
//!     Some(&["\"101\" must be less than or equal to 100".to_string()][..])
//! );
//! # Ok::<(), sieve_core::ValidationError>(())
//! ```
//!
//! Messages are produced from the templates in [`message`]; a translator
//! sees the raw template, so catalogs are keyed by those constants.

pub mod message;
pub mod rules;
pub mod traits;
pub mod validators;

pub use rules::{
    Chain, Not, Optional, all_of, alnum, alpha, between, callback, digit, email, in_list,
    int_type, length, max, min, no_whitespace, not, not_empty, numeric_val, optional, positive,
    regex, string_type, url, uuid,
};
pub use traits::{Constraint, Failure};
pub use validators::{Between, Callback, Length, OneOf, Pattern, Predicate};
