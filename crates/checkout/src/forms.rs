//! Named checkout forms.
//!
//! A deployment can register extra validation under a form name; a
//! submission selects one with the `_request` field and its rules are
//! merged into the checkout validation pass.

use std::collections::HashMap;

use crate::rules::{Messages, RuleSet};

/// Extra validation registered under a form name.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    /// Rules merged into the validation pass when this form is selected.
    pub rules: RuleSet,

    /// Per-field message overrides.
    pub messages: Messages,
}

/// Registry of named checkout forms.
#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: HashMap<String, CheckoutForm>,
}

impl FormRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a form under a name, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, form: CheckoutForm) {
        self.forms.insert(name.into(), form);
    }

    /// Looks up a form by name.
    pub fn get(&self, name: &str) -> Option<&CheckoutForm> {
        self.forms.get(name)
    }
}
