//! Message translation
//!
//! A [`Translator`] maps a message template (for example
//! `{{name}} must be a string`) to a localized template. Rules receive the
//! active translator through a [`Context`] on every call, so two validators
//! with different translators can run side by side.
//!
//! For code that relies on a single process-wide translator there is a
//! default slot ([`install_default`] / [`default_translator`]). Validators
//! only read it when configured with [`TranslatorScope::Global`].

use crate::error::CatalogError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

type TranslateFn = dyn Fn(&str) -> String + Send + Sync;

/// Function from a message template to its localized form.
#[derive(Clone)]
pub struct Translator {
    inner: Arc<TranslateFn>,
}

impl Translator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Translator returning every template unchanged.
    pub fn identity() -> Self {
        Self::new(|template| template.to_string())
    }

    /// Translator backed by a message catalog.
    pub fn from_catalog(catalog: MessageCatalog) -> Self {
        Self::new(move |template| catalog.translate(template).to_string())
    }

    pub fn translate(&self, template: &str) -> String {
        (self.inner)(template)
    }

    /// Whether two handles share the same underlying function.
    pub fn ptr_eq(&self, other: &Translator) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator").finish_non_exhaustive()
    }
}

/// Template to localized-template lookup table.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a flat JSON object of `template: translation` pairs.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut catalog = Self::new();

        for (template, value) in data {
            match value {
                serde_json::Value::String(translation) => {
                    catalog.messages.insert(template, translation);
                }
                _ => return Err(CatalogError::InvalidEntry(template)),
            }
        }

        Ok(catalog)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn add(&mut self, template: impl Into<String>, translation: impl Into<String>) {
        self.messages.insert(template.into(), translation.into());
    }

    pub fn with(mut self, template: impl Into<String>, translation: impl Into<String>) -> Self {
        self.add(template, translation);
        self
    }

    /// Translation for `template`, or the template itself when unknown.
    pub fn translate<'a>(&'a self, template: &'a str) -> &'a str {
        self.messages
            .get(template)
            .map(String::as_str)
            .unwrap_or(template)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Per-call evaluation context handed to every rule.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    translator: Option<&'a Translator>,
}

impl<'a> Context<'a> {
    pub fn new(translator: Option<&'a Translator>) -> Self {
        Self { translator }
    }

    /// Context that leaves templates untouched.
    pub fn verbatim() -> Self {
        Self { translator: None }
    }

    pub fn translator(&self) -> Option<&'a Translator> {
        self.translator
    }

    pub fn translate(&self, template: &str) -> String {
        match self.translator {
            Some(translator) => translator.translate(template),
            None => template.to_string(),
        }
    }
}

/// Where a validator takes its translator from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TranslatorScope {
    /// The validator's own translator.
    #[default]
    Instance,
    /// The process-wide default; setting a translator re-installs it.
    Global,
}

static DEFAULT_TRANSLATOR: Lazy<RwLock<Option<Translator>>> = Lazy::new(|| RwLock::new(None));

/// Replace the process-wide default translator.
///
/// Affects every validator in [`TranslatorScope::Global`], including ones
/// owned by unrelated code in the same process.
pub fn install_default(translator: Option<Translator>) {
    tracing::debug!(
        installed = translator.is_some(),
        "Installing process-wide default translator"
    );
    *DEFAULT_TRANSLATOR.write() = translator;
}

pub fn default_translator() -> Option<Translator> {
    DEFAULT_TRANSLATOR.read().clone()
}
