//! Message templates
//!
//! Templates carry `{{placeholder}}` markers. The raw template is what a
//! [`Translator`](sieve_core::Translator) receives, so catalogs are keyed by
//! the constants below; placeholders are substituted afterwards.

use crate::traits::Failure;
use sieve_core::{Context, Value};

pub const ALNUM: &str = "{{name}} must contain only letters (a-z) and digits (0-9)";
pub const ALNUM_NOT: &str = "{{name}} must not contain letters (a-z) or digits (0-9)";
pub const ALPHA: &str = "{{name}} must contain only letters (a-z)";
pub const ALPHA_NOT: &str = "{{name}} must not contain letters (a-z)";
pub const DIGIT: &str = "{{name}} must contain only digits (0-9)";
pub const DIGIT_NOT: &str = "{{name}} must not contain digits (0-9)";
pub const NO_WHITESPACE: &str = "{{name}} must not contain whitespace";
pub const NO_WHITESPACE_NOT: &str = "{{name}} must contain whitespace";
pub const NOT_EMPTY: &str = "{{name}} must not be empty";
pub const NOT_EMPTY_NOT: &str = "{{name}} must be empty";
pub const STRING_TYPE: &str = "{{name}} must be a string";
pub const STRING_TYPE_NOT: &str = "{{name}} must not be a string";
pub const INT_TYPE: &str = "{{name}} must be of type integer";
pub const INT_TYPE_NOT: &str = "{{name}} must not be of type integer";
pub const NUMERIC: &str = "{{name}} must be numeric";
pub const NUMERIC_NOT: &str = "{{name}} must not be numeric";
pub const POSITIVE: &str = "{{name}} must be positive";
pub const POSITIVE_NOT: &str = "{{name}} must not be positive";

pub const LENGTH_BETWEEN: &str = "{{name}} must have a length between {{minValue}} and {{maxValue}}";
pub const LENGTH_BETWEEN_NOT: &str =
    "{{name}} must not have a length between {{minValue}} and {{maxValue}}";
pub const LENGTH_GREATER: &str = "{{name}} must have a length greater than {{minValue}}";
pub const LENGTH_GREATER_NOT: &str = "{{name}} must not have a length greater than {{minValue}}";
pub const LENGTH_LOWER: &str = "{{name}} must have a length lower than {{maxValue}}";
pub const LENGTH_LOWER_NOT: &str = "{{name}} must not have a length lower than {{maxValue}}";

pub const BETWEEN: &str = "{{name}} must be between {{minValue}} and {{maxValue}}";
pub const BETWEEN_NOT: &str = "{{name}} must not be between {{minValue}} and {{maxValue}}";
pub const MIN: &str = "{{name}} must be greater than or equal to {{compareTo}}";
pub const MIN_NOT: &str = "{{name}} must not be greater than or equal to {{compareTo}}";
pub const MAX: &str = "{{name}} must be less than or equal to {{compareTo}}";
pub const MAX_NOT: &str = "{{name}} must not be less than or equal to {{compareTo}}";

pub const EMAIL: &str = "{{name}} must be valid email";
pub const EMAIL_NOT: &str = "{{name}} must not be an email";
pub const URL: &str = "{{name}} must be a URL";
pub const URL_NOT: &str = "{{name}} must not be a URL";
pub const UUID: &str = "{{name}} must be a valid UUID";
pub const UUID_NOT: &str = "{{name}} must not be a valid UUID";
pub const REGEX: &str = "{{name}} must validate against {{regex}}";
pub const REGEX_NOT: &str = "{{name}} must not validate against {{regex}}";
pub const IN: &str = "{{name}} must be in {{haystack}}";
pub const IN_NOT: &str = "{{name}} must not be in {{haystack}}";
pub const CALLBACK: &str = "{{name}} must be valid";
pub const CALLBACK_NOT: &str = "{{name}} must not be valid";
pub const ALL_OF_NOT: &str = "None of these rules must pass for {{name}}";

/// Translate a failure's template, then fill in its placeholders.
///
/// `{{name}}` is the failure's explicit name, or the rendered value
/// (`null` when absent).
pub fn render(failure: &Failure, value: Option<&Value>, ctx: &Context<'_>) -> String {
    let mut message = ctx.translate(&failure.template);

    let name = match &failure.name {
        Some(name) => name.clone(),
        None => value.map(Value::render).unwrap_or_else(|| "null".to_string()),
    };
    message = message.replace("{{name}}", &name);

    for (key, param) in &failure.params {
        message = message.replace(&format!("{{{{{}}}}}", key), param);
    }

    message
}

/// Format a bound the way messages show it: integral values without a
/// fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
