use serde::{Deserialize, Serialize};

use crate::domain::required_name;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// Client-supplied fields for a new category, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Validated category fields waiting for an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

/// Partial update for a category. `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(self) -> Result<CategoryDraft, DomainError> {
        let name = required_name(self.name.as_deref())
            .ok_or_else(|| DomainError::Validation("Name is required".to_owned()))?;
        let description =
            self.description.map(|value| value.trim().to_owned()).unwrap_or_default();

        Ok(CategoryDraft { name, description })
    }
}

impl CategoryDraft {
    pub fn into_category(self, id: CategoryId) -> Category {
        Category { id, name: self.name, description: self.description }
    }
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Returns the patched copy of `category`; the original is left untouched so callers can
    /// commit only after every supplied field has validated.
    pub fn apply_to(&self, category: &Category) -> Result<Category, DomainError> {
        if self.is_empty() {
            return Err(DomainError::Validation("Nothing to update".to_owned()));
        }

        let mut updated = category.clone();
        if let Some(name) = &self.name {
            updated.name = required_name(Some(name))
                .ok_or_else(|| DomainError::Validation("Name must not be empty".to_owned()))?;
        }
        if let Some(description) = &self.description {
            updated.description = description.trim().to_owned();
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CategoryId, CategoryPatch, NewCategory};
    use crate::errors::DomainError;

    fn guitars() -> Category {
        Category {
            id: CategoryId("C1".to_string()),
            name: "Guitars".to_string(),
            description: "Electric and acoustic".to_string(),
        }
    }

    #[test]
    fn new_category_trims_name_and_defaults_description() {
        let draft = NewCategory::named("  Guitars  ").validate().expect("valid category");

        assert_eq!(draft.name, "Guitars");
        assert_eq!(draft.description, "");
    }

    #[test]
    fn new_category_rejects_missing_or_blank_name() {
        let missing = NewCategory::default().validate().expect_err("missing name");
        let blank = NewCategory::named("   ").validate().expect_err("blank name");

        assert_eq!(missing, DomainError::Validation("Name is required".to_string()));
        assert_eq!(blank, missing);
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let patch = CategoryPatch { description: Some("  Basses too ".to_string()), name: None };
        let updated = patch.apply_to(&guitars()).expect("patch applies");

        assert_eq!(updated.name, "Guitars");
        assert_eq!(updated.description, "Basses too");
        assert_eq!(updated.id, guitars().id);
    }

    #[test]
    fn empty_patch_is_rejected() {
        let error = CategoryPatch::default().apply_to(&guitars()).expect_err("empty patch");
        assert_eq!(error, DomainError::Validation("Nothing to update".to_string()));
    }

    #[test]
    fn blank_name_in_patch_is_rejected() {
        let patch = CategoryPatch { name: Some(" ".to_string()), description: Some("x".into()) };
        assert!(matches!(patch.apply_to(&guitars()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_deserializes_null_as_absent() {
        let patch: CategoryPatch =
            serde_json::from_str(r#"{"name": null, "unknown": 1}"#).expect("patch json");
        assert!(patch.is_empty());
    }
}
