// Sieve - rule tree validation for request parameters
//
// Nested rule trees are matched against merged query, body and route
// parameters; every rejection is collected under its dotted path.

// Re-export core functionality
pub use sieve_core::*;

// Re-export optional crates
#[cfg(feature = "rules")]
pub use sieve_rules as rules;

#[cfg(feature = "http")]
pub use sieve_http as http;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Context, ErrorMap, Map, MessageCatalog, Rule, RuleFault, RuleNode, RuleTree, Translator,
        TranslatorScope, ValidationError, Validator, Value, params, rule_fn,
    };

    #[cfg(feature = "rules")]
    pub use crate::rules::{self as v, Chain};

    #[cfg(feature = "http")]
    pub use crate::http::{
        HttpError, Middleware, MiddlewareChain, Request, Response, ValidationMiddleware,
        ValidationOptions,
    };
}
