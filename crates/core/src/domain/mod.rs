pub mod category;
pub mod numeric;
pub mod product;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two record types the catalog owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Product,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category => f.write_str("Category"),
            Self::Product => f.write_str("Product"),
        }
    }
}

/// Trims a required name, rejecting values that are blank after trimming.
pub(crate) fn required_name(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty()).map(ToOwned::to_owned)
}
