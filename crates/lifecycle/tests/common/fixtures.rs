//! Test fixtures for lifecycle engine testing.
//!
//! This module provides the entity types the integration tests persist,
//! along with the capability traits some of them declare.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use docket_lifecycle::impl_capabilities;
use docket_lifecycle::registry::CapabilitySet;
use docket_lifecycle::types::{Entity, EntityMetadata};
use docket_lifecycle::validation::{Validate, Validator};

static SKU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]+-\d+$").unwrap());
static POSTCODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").unwrap());

// ============================================================================
// Capabilities
// ============================================================================

/// Entities owned by a tenant.
pub trait Tenanted {
    /// The owning tenant.
    fn tenant(&self) -> &str;
    /// Reassigns the owning tenant.
    fn set_tenant(&mut self, tenant: &str);
}

/// Entities carrying a free-text label that hooks may normalise.
pub trait Labelled {
    /// The label.
    fn label(&self) -> &str;
    /// Replaces the label.
    fn set_label(&mut self, label: String);
}

// ============================================================================
// Widget
// ============================================================================

/// A plain entity with no capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(flatten)]
    pub meta: EntityMetadata,
    pub name: String,
    #[serde(default)]
    pub size: u32,
}

impl Widget {
    /// Creates a transient widget.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMetadata::new(),
            name: name.into(),
            size: 1,
        }
    }

    /// Sets the size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

impl Validate for Widget {
    fn validate(&self, v: &mut Validator) {
        v.required("name", &self.name)
            .max_length("name", &self.name, 40)
            .range("size", self.size, 0, 1000);
    }
}

impl Entity for Widget {
    const TYPE_NAME: &'static str = "Widget";

    fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.meta
    }
}

// ============================================================================
// Order
// ============================================================================

/// A line of an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

impl Validate for OrderLine {
    fn validate(&self, v: &mut Validator) {
        v.required("sku", &self.sku)
            .pattern("sku", &self.sku, &SKU)
            .range("quantity", self.quantity, 1, 100);
    }
}

/// A shipping address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postcode: String,
}

impl Address {
    pub fn new(street: &str, city: &str, postcode: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
            postcode: postcode.to_string(),
        }
    }
}

impl Validate for Address {
    fn validate(&self, v: &mut Validator) {
        v.required("street", &self.street)
            .required("city", &self.city)
            .pattern("postcode", &self.postcode, &POSTCODE);
    }
}

/// A tenant-owned entity with nested validated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(flatten)]
    pub meta: EntityMetadata,
    pub customer_name: String,
    pub tenant: String,
    pub status: String,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Address>,
}

impl Order {
    /// Creates a transient open order for `tenant`.
    pub fn new(customer_name: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            meta: EntityMetadata::new(),
            customer_name: customer_name.into(),
            tenant: tenant.into(),
            status: "open".to_string(),
            lines: Vec::new(),
            shipping: None,
        }
    }

    /// Adds a line.
    pub fn with_line(mut self, sku: &str, quantity: u32) -> Self {
        self.lines.push(OrderLine::new(sku, quantity));
        self
    }

    /// Sets the shipping address.
    pub fn with_shipping(mut self, address: Address) -> Self {
        self.shipping = Some(address);
        self
    }
}

impl Validate for Order {
    fn validate(&self, v: &mut Validator) {
        v.required("customerName", &self.customer_name)
            .one_of("status", &self.status, &["open", "shipped", "cancelled"])
            .nested_each("lines", &self.lines)
            .nested_opt("shipping", &self.shipping);
    }
}

impl Tenanted for Order {
    fn tenant(&self) -> &str {
        &self.tenant
    }

    fn set_tenant(&mut self, tenant: &str) {
        self.tenant = tenant.to_string();
    }
}

impl Labelled for Order {
    fn label(&self) -> &str {
        &self.customer_name
    }

    fn set_label(&mut self, label: String) {
        self.customer_name = label;
    }
}

impl_capabilities!(Order => dyn Tenanted, dyn Labelled);

impl Entity for Order {
    const TYPE_NAME: &'static str = "Order";

    fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.meta
    }

    fn capabilities(set: &mut CapabilitySet<Self>) {
        set.declare::<dyn Tenanted>().declare::<dyn Labelled>();
    }
}

// ============================================================================
// Note
// ============================================================================

/// A tenant-owned entity without validation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub meta: EntityMetadata,
    pub body: String,
    pub tenant: String,
}

impl Note {
    pub fn new(body: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            meta: EntityMetadata::new(),
            body: body.into(),
            tenant: tenant.into(),
        }
    }
}

impl Validate for Note {}

impl Tenanted for Note {
    fn tenant(&self) -> &str {
        &self.tenant
    }

    fn set_tenant(&mut self, tenant: &str) {
        self.tenant = tenant.to_string();
    }
}

impl_capabilities!(Note => dyn Tenanted);

impl Entity for Note {
    const TYPE_NAME: &'static str = "Note";

    fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.meta
    }

    fn capabilities(set: &mut CapabilitySet<Self>) {
        set.declare::<dyn Tenanted>();
    }
}
