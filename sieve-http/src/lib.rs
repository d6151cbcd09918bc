//! HTTP glue for sieve
//!
//! Decodes request bodies and query strings, merges them with route
//! captures, and runs a [`Validator`](sieve_core::Validator) over the result
//! as a middleware stage.
//!
//! ```
//! use sieve_core::{ErrorMap, RuleTree};
//! use sieve_http::{Request, ValidationMiddleware};
//!
//! let middleware = ValidationMiddleware::new(
//!     RuleTree::new().rule("age", sieve_rules::numeric_val().between(1, 60)),
//! );
//! let req = middleware.process(Request::get("/").with_query("age=89"))?;
//!
//! assert_eq!(req.attribute::<bool>("has_errors"), Some(&true));
//! let errors = req.attribute::<ErrorMap>("errors").unwrap();
//! assert_eq!(errors.get("age"), Some(&["\"89\" must be less than or equal to 60".to_string()][..]));
//! # Ok::<(), sieve_http::HttpError>(())
//! ```

pub mod body;
pub mod error;
pub mod middleware;
pub mod options;
pub mod request;
pub mod validation;

pub use body::{BodyFormat, decode_body, parse_form, parse_json, parse_query, parse_xml};
pub use error::{HttpError, Result};
pub use middleware::{BoxFuture, HandlerFn, Middleware, MiddlewareChain, Next, handler};
pub use options::ValidationOptions;
pub use request::{Attributes, Request, Response};
pub use validation::{ValidationMiddleware, request_params};
