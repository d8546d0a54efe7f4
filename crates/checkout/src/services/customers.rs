//! Customer directory trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Customer, CustomerId};

use crate::error::CheckoutError;

/// Directory of customer records, looked up by email.
///
/// A missing customer is a normal control path (`Ok(None)`), never an
/// error: the resolver creates one in response.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Finds a customer by exact email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CheckoutError>;

    /// Finds a customer by id.
    async fn find(&self, id: CustomerId) -> Result<Option<Customer>, CheckoutError>;

    /// Persists the customer.
    async fn save(&self, customer: &Customer) -> Result<(), CheckoutError>;

    /// Returns true when customer storage is backed by an external record
    /// model. When false, order history is kept in-band on the customer
    /// record because no relational join is available.
    fn uses_external_model(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct InMemoryCustomerState {
    customers: HashMap<CustomerId, Customer>,
    by_email: HashMap<String, CustomerId>,
}

/// In-memory customer directory for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerDirectory {
    state: Arc<RwLock<InMemoryCustomerState>>,
}

impl InMemoryCustomerDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored customers.
    pub fn customer_count(&self) -> usize {
        self.state.read().unwrap().customers.len()
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CheckoutError> {
        let state = self.state.read().unwrap();
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.customers.get(id))
            .cloned())
    }

    async fn find(&self, id: CustomerId) -> Result<Option<Customer>, CheckoutError> {
        Ok(self.state.read().unwrap().customers.get(&id).cloned())
    }

    async fn save(&self, customer: &Customer) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();
        state
            .by_email
            .insert(customer.email().to_string(), customer.id());
        state.customers.insert(customer.id(), customer.clone());
        Ok(())
    }
}
