pub mod aggregate;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ids;

pub use aggregate::{aggregate, CategoryMetrics, CategoryWithProducts};
pub use domain::category::{Category, CategoryDraft, CategoryId, CategoryPatch, NewCategory};
pub use domain::numeric::NumericInput;
pub use domain::product::{
    NewProduct, Product, ProductDraft, ProductId, ProductPatch, ProductWithCategory,
};
pub use domain::EntityKind;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use ids::{IdentifierGenerator, RandomIdGenerator, SequentialIdGenerator};
