//! Request validation middleware
//!
//! [`ValidationMiddleware`] merges query, body and route parameters, runs a
//! validation pass and attaches the outcome to the request before handing
//! it on. It never rejects a request for failing validation; handlers look
//! at the attached results and decide.
//!
//! | Attribute (default name) | Type                 |
//! |--------------------------|----------------------|
//! | `errors`                 | [`ErrorMap`]         |
//! | `has_errors`             | `bool`               |
//! | `validators`             | `Arc<RuleTree>`      |
//! | `translator`             | `Option<Translator>` |

use crate::body::{decode_body, parse_query};
use crate::error::{HttpError, Result};
use crate::middleware::{Middleware, Next};
use crate::options::ValidationOptions;
use crate::request::{Request, Response};
use async_trait::async_trait;
use parking_lot::Mutex;
use sieve_core::{
    ErrorMap, Map, ParamSources, RuleTree, Translator, TranslatorScope, Validator, Value,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Merged parameters of `req`: query, then body, then route captures.
pub fn request_params(req: &Request) -> Result<Map> {
    let mut sources = ParamSources::new();
    if !req.query.is_empty() {
        sources = sources.query(parse_query(&req.query)?);
    }
    if let Some(body) = decode_body(req)? {
        sources = sources.body(body);
    }
    if !req.path_params.is_empty() {
        sources = sources.route(
            req.path_params
                .iter()
                .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
                .collect(),
        );
    }
    Ok(sources.merge())
}

/// Validation stage of a middleware chain.
///
/// Passes and configuration changes are serialized on one lock, so a single
/// instance can be shared by concurrent requests.
pub struct ValidationMiddleware {
    validator: Mutex<Validator>,
    options: ValidationOptions,
}

impl ValidationMiddleware {
    pub fn new(rules: RuleTree) -> Self {
        Self::from_validator(Validator::new(rules))
    }

    pub fn from_validator(validator: Validator) -> Self {
        Self {
            validator: Mutex::new(validator),
            options: ValidationOptions::default(),
        }
    }

    pub fn with_translator(self, translator: Translator) -> Self {
        self.set_translator(translator);
        self
    }

    pub fn with_scope(self, scope: TranslatorScope) -> Self {
        {
            let mut validator = self.validator.lock();
            let configured = std::mem::take(&mut *validator);
            *validator = configured.with_scope(scope);
        }
        self
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    pub fn rules(&self) -> Arc<RuleTree> {
        self.validator.lock().rules().clone()
    }

    pub fn set_rules(&self, rules: RuleTree) {
        self.validator.lock().set_rules(rules);
    }

    pub fn translator(&self) -> Option<Translator> {
        self.validator.lock().effective_translator()
    }

    pub fn set_translator(&self, translator: Translator) {
        self.validator.lock().set_translator(translator);
    }

    pub fn clear_translator(&self) {
        self.validator.lock().clear_translator();
    }

    /// Errors of the most recent pass.
    pub fn errors(&self) -> ErrorMap {
        self.validator.lock().errors().clone()
    }

    pub fn has_errors(&self) -> bool {
        self.validator.lock().has_errors()
    }

    /// Validate `req` and attach the results to it.
    pub fn process(&self, mut req: Request) -> Result<Request> {
        let params = request_params(&req)?;

        let (errors, rules, translator) = {
            let mut validator = self.validator.lock();
            let errors = match validator.validate(&params) {
                Ok(errors) => errors.clone(),
                Err(e) => {
                    error!(path = %req.path, rule_path = e.path(), error = %e, "Validation aborted");
                    return Err(HttpError::Internal(e.to_string()));
                }
            };
            (errors, validator.rules().clone(), validator.effective_translator())
        };

        debug!(
            path = %req.path,
            param_count = params.len(),
            error_count = errors.len(),
            "Request validated"
        );

        let has_errors = !errors.is_empty();
        let attributes = &mut req.attributes;
        attributes.insert(self.options.errors_attribute.clone(), errors);
        attributes.insert(self.options.has_errors_attribute.clone(), has_errors);
        attributes.insert(self.options.validators_attribute.clone(), rules);
        attributes.insert(self.options.translator_attribute.clone(), translator);
        Ok(req)
    }
}

#[async_trait]
impl Middleware for ValidationMiddleware {
    async fn handle(&self, req: Request, next: Next) -> std::result::Result<Response, HttpError> {
        let req = self.process(req)?;
        next(req).await
    }
}
