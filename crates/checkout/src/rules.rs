//! Field validation rules.
//!
//! Rule sets are merged per request: base checkout rules, a named form's
//! rules, and the selected gateway's purchase rules all contribute to one
//! map evaluated in a single pass. Messages can be overridden per field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ValidationErrors;
use crate::request::CheckoutRequest;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// A single validation rule applied to one request field.
///
/// All rules except [`Rule::Required`] pass on absent or null values: a
/// field is nullable unless something requires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The field must be present and non-empty.
    Required,

    /// The field must look like an email address.
    Email,

    /// The field may not contain whitespace.
    NoWhitespace,

    /// The field must contain only ASCII digits.
    Numeric,
}

impl Rule {
    fn check(&self, field: &str, value: Option<&Value>) -> Result<(), String> {
        let text = value.and_then(Value::as_str);

        match self {
            Rule::Required => match value {
                None | Some(Value::Null) => Err(format!("The {field} field is required.")),
                Some(Value::String(s)) if s.is_empty() => {
                    Err(format!("The {field} field is required."))
                }
                _ => Ok(()),
            },
            Rule::Email => match text {
                Some(s) if !s.is_empty() && !EMAIL_RE.is_match(s) => {
                    Err(format!("The {field} must be a valid email address."))
                }
                _ => Ok(()),
            },
            Rule::NoWhitespace => match text {
                Some(s) if s.chars().any(char::is_whitespace) => {
                    Err(format!("The {field} may not contain any spaces."))
                }
                _ => Ok(()),
            },
            Rule::Numeric => match text {
                Some(s) if !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()) => {
                    Err(format!("The {field} must be numeric."))
                }
                _ => Ok(()),
            },
        }
    }
}

/// Field → rules map. Ordered so evaluation and error output are
/// deterministic.
pub type RuleSet = BTreeMap<String, Vec<Rule>>;

/// Field → message overrides. An override replaces every default message
/// produced for that field.
pub type Messages = BTreeMap<String, String>;

/// Merges `extra` rules into `base`, appending to any existing field.
pub fn merge_rules(base: &mut RuleSet, extra: RuleSet) {
    for (field, rules) in extra {
        base.entry(field).or_default().extend(rules);
    }
}

/// Evaluates a rule set against a request, collecting per-field failures.
pub fn evaluate(request: &CheckoutRequest, rules: &RuleSet, messages: &Messages) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (field, field_rules) in rules {
        for rule in field_rules {
            if let Err(default_message) = rule.check(field, request.get(field)) {
                let message = messages.get(field).cloned().unwrap_or(default_message);
                errors.add(field.clone(), message);
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(field: &str, rules: &[Rule]) -> RuleSet {
        let mut set = RuleSet::new();
        set.insert(field.to_string(), rules.to_vec());
        set
    }

    #[test]
    fn required_fails_on_missing_null_and_empty() {
        let set = rules("card_number", &[Rule::Required]);

        for request in [
            CheckoutRequest::new(),
            CheckoutRequest::new().set("card_number", json!(null)),
            CheckoutRequest::new().set("card_number", json!("")),
        ] {
            let errors = evaluate(&request, &set, &Messages::new());
            assert_eq!(
                errors.for_field("card_number"),
                ["The card_number field is required."]
            );
        }
    }

    #[test]
    fn email_is_nullable() {
        let set = rules("email", &[Rule::Email]);
        let errors = evaluate(&CheckoutRequest::new(), &set, &Messages::new());
        assert!(errors.is_empty());
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        let set = rules("email", &[Rule::Email]);
        let request = CheckoutRequest::new().set("email", json!("not-an-email"));
        let errors = evaluate(&request, &set, &Messages::new());
        assert_eq!(
            errors.for_field("email"),
            ["The email must be a valid email address."]
        );
    }

    #[test]
    fn email_with_spaces_fails_no_whitespace_rule() {
        let set = rules("email", &[Rule::Email, Rule::NoWhitespace]);
        let request = CheckoutRequest::new().set("email", json!("jo doe@example.com"));
        let errors = evaluate(&request, &set, &Messages::new());
        assert!(
            errors
                .for_field("email")
                .contains(&"The email may not contain any spaces.".to_string())
        );
    }

    #[test]
    fn numeric_rule() {
        let set = rules("card_number", &[Rule::Numeric]);

        let ok = CheckoutRequest::new().set("card_number", json!("4242424242424242"));
        assert!(evaluate(&ok, &set, &Messages::new()).is_empty());

        let bad = CheckoutRequest::new().set("card_number", json!("4242-4242"));
        assert!(!evaluate(&bad, &set, &Messages::new()).is_empty());
    }

    #[test]
    fn message_overrides_replace_defaults() {
        let set = rules("cvc", &[Rule::Required]);
        let mut messages = Messages::new();
        messages.insert("cvc".to_string(), "Please provide your card's CVC.".to_string());

        let errors = evaluate(&CheckoutRequest::new(), &set, &messages);
        assert_eq!(errors.for_field("cvc"), ["Please provide your card's CVC."]);
    }

    #[test]
    fn merge_rules_appends_to_existing_fields() {
        let mut base = rules("email", &[Rule::Email]);
        merge_rules(&mut base, rules("email", &[Rule::NoWhitespace]));
        merge_rules(&mut base, rules("card_number", &[Rule::Required]));

        assert_eq!(base["email"], vec![Rule::Email, Rule::NoWhitespace]);
        assert_eq!(base["card_number"], vec![Rule::Required]);
    }
}
