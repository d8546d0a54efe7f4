//! Customer record.

use std::collections::BTreeMap;

use common::OrderId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a new random customer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a customer ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer identity record, looked up by email.
///
/// Orders reference customers weakly by id. When customer storage has no
/// external record model, the customer carries its own order history as a
/// list of order ids (there is no relational join available).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    email: String,
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    published: bool,
    orders: Vec<OrderId>,
    data: BTreeMap<String, Value>,
}

impl Customer {
    /// Creates a new published customer with the given email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new(),
            email: email.into(),
            name: None,
            first_name: None,
            last_name: None,
            published: true,
            orders: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    /// Sets the full name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the split first/last name.
    pub fn with_split_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Returns the customer ID.
    pub fn id(&self) -> CustomerId {
        self.id
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the full name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the first name, if set.
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Returns the last name, if set.
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Returns whether the customer is published.
    pub fn published(&self) -> bool {
        self.published
    }

    /// Returns the in-band order history.
    pub fn orders(&self) -> &[OrderId] {
        &self.orders
    }

    /// Returns the free-form data bag.
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// Appends an order to the history. Recording the same order twice is
    /// a no-op.
    pub fn record_order(&mut self, order_id: OrderId) {
        if !self.orders.contains(&order_id) {
            self.orders.push(order_id);
        }
    }

    /// Merges the given fields, restricted to the whitelist.
    ///
    /// Identity keys (`name`, `first_name`, `last_name`, `email`) update
    /// the typed fields; anything else whitelisted lands in the data bag.
    pub fn merge_fields(&mut self, fields: &BTreeMap<String, Value>, whitelist: &[String]) {
        for key in whitelist {
            let Some(value) = fields.get(key) else {
                continue;
            };

            match (key.as_str(), value.as_str()) {
                ("name", Some(s)) => self.name = Some(s.to_string()),
                ("first_name", Some(s)) => self.first_name = Some(s.to_string()),
                ("last_name", Some(s)) => self.last_name = Some(s.to_string()),
                ("email", Some(s)) => self.email = s.to_string(),
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }
}
