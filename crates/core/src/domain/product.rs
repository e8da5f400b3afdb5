use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::{Category, CategoryId};
use crate::domain::numeric::{coerce_price, coerce_rating, coerce_stock, NumericInput};
use crate::domain::required_name;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    pub image: String,
}

/// Client-supplied fields for a new product, before validation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub price: Option<NumericInput>,
    pub stock: Option<NumericInput>,
    pub rating: Option<NumericInput>,
    pub image: Option<String>,
}

/// Validated product fields. The category reference is still unchecked: only the store can
/// resolve it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category_id: CategoryId,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub rating: Decimal,
    pub image: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub price: Option<NumericInput>,
    pub stock: Option<NumericInput>,
    pub rating: Option<NumericInput>,
    pub image: Option<String>,
}

/// A product alongside the category it references, if that category still resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithCategory {
    pub product: Product,
    pub category: Option<Category>,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        category_id: &CategoryId,
        price: impl Into<NumericInput>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            category_id: Some(category_id.0.clone()),
            price: Some(price.into()),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<ProductDraft, DomainError> {
        let name = required_name(self.name.as_deref());
        let category_id = self.category_id.filter(|value| !value.is_empty());
        let (Some(name), Some(price), Some(category_id)) = (name, self.price, category_id) else {
            return Err(DomainError::Validation(
                "Name, price and categoryId are required".to_owned(),
            ));
        };

        Ok(ProductDraft {
            name,
            category_id: CategoryId(category_id),
            description: self.description.unwrap_or_default(),
            price: coerce_price(&price)?,
            stock: coerce_stock(self.stock.as_ref())?,
            rating: coerce_rating(self.rating.as_ref())?,
            image: self.image.unwrap_or_default(),
        })
    }
}

impl ProductDraft {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category_id: self.category_id,
            description: self.description,
            price: self.price,
            stock: self.stock,
            rating: self.rating,
            image: self.image,
        }
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.rating.is_none()
            && self.image.is_none()
    }

    pub fn target_category(&self) -> Option<CategoryId> {
        self.category_id.clone().map(CategoryId)
    }

    /// Returns the patched copy of `product`. Any invalid field fails the whole patch, so the
    /// stored product is either fully updated or not touched at all.
    ///
    /// The category reference is copied verbatim; resolving it is the caller's job and must
    /// happen before this is called.
    pub fn apply_to(&self, product: &Product) -> Result<Product, DomainError> {
        if self.is_empty() {
            return Err(DomainError::Validation("Nothing to update".to_owned()));
        }

        let mut updated = product.clone();
        if let Some(category_id) = self.target_category() {
            updated.category_id = category_id;
        }
        if let Some(name) = &self.name {
            updated.name = required_name(Some(name))
                .ok_or_else(|| DomainError::Validation("Name must not be empty".to_owned()))?;
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(price) = &self.price {
            updated.price = coerce_price(price)?;
        }
        if self.stock.is_some() {
            updated.stock = coerce_stock(self.stock.as_ref())?;
        }
        if self.rating.is_some() {
            updated.rating = coerce_rating(self.rating.as_ref())?;
        }
        if let Some(image) = &self.image {
            updated.image = image.clone();
        }

        Ok(updated)
    }
}
