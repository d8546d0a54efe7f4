//! Checkout configuration.

/// Field whitelists controlling which request fields bulk merges may
/// apply, per resource kind.
///
/// Whatever is not whitelisted is silently dropped by the merge stages;
/// the lists are ordered so merge behavior is deterministic.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Fields a checkout may set on a customer record.
    pub customer_fields: Vec<String>,

    /// Fields a checkout may set on an order's data bag.
    pub order_fields: Vec<String>,
}

impl CheckoutConfig {
    fn to_strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            customer_fields: Self::to_strings(&["name", "first_name", "last_name", "email"]),
            order_fields: Self::to_strings(&[
                "shipping_name",
                "shipping_address",
                "shipping_address_line2",
                "shipping_city",
                "shipping_region",
                "shipping_postal_code",
                "shipping_country",
                "shipping_note",
                "use_shipping_address_for_billing",
                "billing_name",
                "billing_address",
                "billing_city",
                "billing_region",
                "billing_postal_code",
                "billing_country",
            ]),
        }
    }
}
