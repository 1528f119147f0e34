//! Normalized, storage-independent view of a catalog component.
//!
//! Catalog rows arrive with optional fields and mixed casing. [`Part`] normalizes them once
//! (trimmed, upper-cased, blanks turned into `None`, zero wattages treated as unknown) so the
//! compatibility checker and budget allocator never re-normalize inside their rules.

use crate::entities::component;
use serde::{Deserialize, Serialize};

/// Normalized component used by the pure build-composition functions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Catalog id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Upper-cased category name
    pub category: String,
    /// Unit price in dollars
    pub price: f64,
    /// Whether the part can be ordered
    pub stock_status: bool,
    /// Socket with whitespace removed, upper-cased
    pub socket: Option<String>,
    /// Chipset, upper-cased
    pub chipset: Option<String>,
    /// Form factor, upper-cased
    pub form_factor: Option<String>,
    /// Memory type, upper-cased
    pub ram_type: Option<String>,
    /// Storage interface, upper-cased
    pub storage_interface: Option<String>,
    /// Power draw in watts
    pub power_requirement: Option<u32>,
    /// PSU output in watts
    pub wattage: Option<u32>,
    /// Free-text specification line
    pub specifications: String,
    /// Legacy free-text compatibility hint
    pub compatibility: String,
}

impl Part {
    /// Starts a part with only identity, category and price set; the rest stays unknown.
    #[must_use]
    pub fn new(id: i64, name: &str, category: &str, price: f64) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            category: normalize_category(category),
            price,
            stock_status: true,
            ..Self::default()
        }
    }

    /// Sets the socket.
    #[must_use]
    pub fn with_socket(mut self, socket: &str) -> Self {
        self.socket = normalize_socket(Some(socket));
        self
    }

    /// Sets the chipset.
    #[must_use]
    pub fn with_chipset(mut self, chipset: &str) -> Self {
        self.chipset = normalize_text(Some(chipset));
        self
    }

    /// Sets the form factor.
    #[must_use]
    pub fn with_form_factor(mut self, form_factor: &str) -> Self {
        self.form_factor = normalize_text(Some(form_factor));
        self
    }

    /// Sets the memory type.
    #[must_use]
    pub fn with_ram_type(mut self, ram_type: &str) -> Self {
        self.ram_type = normalize_text(Some(ram_type));
        self
    }

    /// Sets the storage interface.
    #[must_use]
    pub fn with_storage_interface(mut self, interface: &str) -> Self {
        self.storage_interface = normalize_text(Some(interface));
        self
    }

    /// Sets the power draw.
    #[must_use]
    pub fn with_power_requirement(mut self, watts: u32) -> Self {
        self.power_requirement = (watts > 0).then_some(watts);
        self
    }

    /// Sets the PSU output.
    #[must_use]
    pub fn with_wattage(mut self, watts: u32) -> Self {
        self.wattage = (watts > 0).then_some(watts);
        self
    }

    /// Sets the free-text specification line.
    #[must_use]
    pub fn with_specifications(mut self, text: &str) -> Self {
        self.specifications = text.to_string();
        self
    }

    /// Sets the legacy compatibility hint.
    #[must_use]
    pub fn with_compatibility(mut self, text: &str) -> Self {
        self.compatibility = text.to_string();
        self
    }

    /// Marks the part as in or out of stock.
    #[must_use]
    pub const fn with_stock(mut self, in_stock: bool) -> Self {
        self.stock_status = in_stock;
        self
    }

    /// Whether the part belongs to `category` (case-insensitive).
    #[must_use]
    pub fn is_in(&self, category: &str) -> bool {
        self.category == normalize_category(category)
    }
}

impl From<&component::Model> for Part {
    fn from(model: &component::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.trim().to_string(),
            category: normalize_category(&model.category),
            price: model.price,
            stock_status: model.stock_status,
            socket: normalize_socket(model.socket.as_deref()),
            chipset: normalize_text(model.chipset.as_deref()),
            form_factor: normalize_text(model.form_factor.as_deref()),
            ram_type: normalize_text(model.ram_type.as_deref()),
            storage_interface: normalize_text(model.storage_interface.as_deref()),
            power_requirement: positive_watts(model.power_requirement),
            wattage: positive_watts(model.wattage),
            specifications: model.specifications.clone(),
            compatibility: model.compatibility.clone(),
        }
    }
}

impl From<component::Model> for Part {
    fn from(model: component::Model) -> Self {
        Self::from(&model)
    }
}

/// Trims and upper-cases a category name.
#[must_use]
pub fn normalize_category(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Trims and upper-cases, mapping blank strings to `None`.
#[must_use]
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

/// Socket names compare without internal whitespace ("LGA 1700" == "LGA1700").
#[must_use]
pub fn normalize_socket(value: Option<&str>) -> Option<String> {
    normalize_text(value).map(|v| v.split_whitespace().collect())
}

fn positive_watts(value: Option<i32>) -> Option<u32> {
    value
        .and_then(|w| u32::try_from(w).ok())
        .filter(|w| *w > 0)
}
