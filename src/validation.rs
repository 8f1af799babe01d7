//! Declarative field validation. Each rule set walks every field and collects
//! all failures into a [`FieldErrors`] map so a form can be corrected in one
//! round trip.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::auth::dto::{ProfileForm, RegistrationForm};
use crate::recipes::dto::RecipeForm;
use crate::recipes::repo::RecipePatch;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered collection of per-field validation failures. Serializes as
/// `[{"field": ..., "message": ...}, ...]`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message recorded for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn check_username(errors: &mut FieldErrors, username: &str) {
    let len = username.chars().count();
    if len < 3 || len > 30 {
        errors.push("username", "Username must be between 3 and 30 characters");
    }
    if !username.is_empty() && !USERNAME_RE.is_match(username) {
        errors.push(
            "username",
            "Username can only contain letters, numbers, and underscores",
        );
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        errors.push("email", "Please enter a valid email address");
    }
}

pub fn validate_registration(form: &RegistrationForm) -> FieldErrors {
    let mut errors = FieldErrors::default();

    check_username(&mut errors, form.username.trim());
    check_email(&mut errors, &normalize_email(&form.email));

    if form.password.chars().count() < 6 {
        errors.push("password", "Password must be at least 6 characters long");
    }
    if !form.password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password", "Password must contain at least one number");
    }
    if form.confirm_password != form.password {
        errors.push("confirm_password", "Passwords do not match");
    }

    errors
}

/// Profile edits are partial; only supplied fields are checked.
pub fn validate_profile(form: &ProfileForm) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if let Some(username) = &form.username {
        check_username(&mut errors, username.trim());
    }
    if let Some(email) = &form.email {
        check_email(&mut errors, &normalize_email(email));
    }

    errors
}

pub fn validate_recipe(form: &RecipeForm) -> FieldErrors {
    let mut errors = FieldErrors::default();

    let title = form.title.trim();
    if title.is_empty() {
        errors.push("title", "Title is required");
    } else if title.chars().count() > 100 {
        errors.push("title", "Title must be 100 characters or less");
    }

    let description = form.description.trim();
    if description.is_empty() {
        errors.push("description", "Description is required");
    } else if description.chars().count() > 500 {
        errors.push("description", "Description must be 500 characters or less");
    }

    if form.ingredients.trim().is_empty() {
        errors.push("ingredients", "Ingredients are required");
    }
    if form.instructions.trim().is_empty() {
        errors.push("instructions", "Instructions are required");
    }

    if !form.prep_time.is_some_and(|v| v >= 1) {
        errors.push("prep_time", "Prep time must be at least 1 minute");
    }
    if !form.cook_time.is_some_and(|v| v >= 0) {
        errors.push("cook_time", "Cook time cannot be negative");
    }
    if !form.servings.is_some_and(|v| v >= 1) {
        errors.push("servings", "Servings must be at least 1");
    }

    if form.category.trim().is_empty() {
        errors.push("category", "Category is required");
    }

    errors
}

/// Patch variant: rules apply only to fields that are present.
pub fn validate_recipe_patch(patch: &RecipePatch) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if let Some(title) = &patch.title {
        let title = title.trim();
        if title.is_empty() {
            errors.push("title", "Title is required");
        } else if title.chars().count() > 100 {
            errors.push("title", "Title must be 100 characters or less");
        }
    }
    if let Some(description) = &patch.description {
        let description = description.trim();
        if description.is_empty() {
            errors.push("description", "Description is required");
        } else if description.chars().count() > 500 {
            errors.push("description", "Description must be 500 characters or less");
        }
    }
    if let Some(ingredients) = &patch.ingredients {
        if ingredients.trim().is_empty() {
            errors.push("ingredients", "Ingredients are required");
        }
    }
    if let Some(instructions) = &patch.instructions {
        if instructions.trim().is_empty() {
            errors.push("instructions", "Instructions are required");
        }
    }
    if patch.prep_time.is_some_and(|v| v < 1) {
        errors.push("prep_time", "Prep time must be at least 1 minute");
    }
    if patch.cook_time.is_some_and(|v| v < 0) {
        errors.push("cook_time", "Cook time cannot be negative");
    }
    if patch.servings.is_some_and(|v| v < 1) {
        errors.push("servings", "Servings must be at least 1");
    }
    if let Some(category) = &patch.category {
        if category.trim().is_empty() {
            errors.push("category", "Category is required");
        }
    }

    errors
}

pub fn validate_rating(rating: Option<i32>) -> FieldErrors {
    match rating {
        Some(r) if (1..=5).contains(&r) => FieldErrors::default(),
        _ => FieldErrors::single("rating", "Rating must be between 1 and 5"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegistrationForm {
        RegistrationForm {
            username: "alice_1".into(),
            email: "alice@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&valid_registration()).is_empty());
    }

    #[test]
    fn registration_collects_every_failing_field() {
        let form = RegistrationForm {
            username: "a!".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            confirm_password: "different".into(),
        };
        let errors = validate_registration(&form);
        assert!(errors.message_for("username").is_some());
        assert!(errors.message_for("email").is_some());
        assert!(errors.message_for("password").is_some());
        assert!(errors.message_for("confirm_password").is_some());
    }

    #[test]
    fn username_length_and_charset_are_separate_rules() {
        let form = RegistrationForm {
            username: "a!".into(),
            ..valid_registration()
        };
        let errors = validate_registration(&form);
        assert_eq!(
            errors.message_for("username"),
            Some("Username must be between 3 and 30 characters")
        );
        // both the length and charset rules fire
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn password_requires_a_digit() {
        let form = RegistrationForm {
            password: "abcdefgh".into(),
            confirm_password: "abcdefgh".into(),
            ..valid_registration()
        };
        let errors = validate_registration(&form);
        assert_eq!(
            errors.message_for("password"),
            Some("Password must contain at least one number")
        );
    }

    #[test]
    fn email_is_normalized_before_the_format_check() {
        let form = RegistrationForm {
            email: "  Alice@Example.COM  ".into(),
            ..valid_registration()
        };
        assert!(validate_registration(&form).is_empty());
        assert_eq!(normalize_email("  Alice@Example.COM  "), "alice@example.com");
    }

    fn valid_recipe() -> RecipeForm {
        RecipeForm {
            title: "Classic Pancakes".into(),
            description: "Fluffy pancakes.".into(),
            ingredients: "flour\nmilk\negg".into(),
            instructions: "mix\ncook".into(),
            prep_time: Some(10),
            cook_time: Some(15),
            servings: Some(4),
            category: "Breakfast".into(),
            image: None,
        }
    }

    #[test]
    fn valid_recipe_passes() {
        assert!(validate_recipe(&valid_recipe()).is_empty());
    }

    #[test]
    fn recipe_rejects_missing_and_out_of_range_fields() {
        let form = RecipeForm {
            title: "".into(),
            description: "d".repeat(501),
            ingredients: "  ".into(),
            instructions: "".into(),
            prep_time: Some(0),
            cook_time: Some(-1),
            servings: None,
            category: " ".into(),
            image: None,
        };
        let errors = validate_recipe(&form);
        for field in [
            "title",
            "description",
            "ingredients",
            "instructions",
            "prep_time",
            "cook_time",
            "servings",
            "category",
        ] {
            assert!(errors.message_for(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn zero_cook_time_is_allowed() {
        let form = RecipeForm {
            cook_time: Some(0),
            ..valid_recipe()
        };
        assert!(validate_recipe(&form).is_empty());
    }

    #[test]
    fn patch_only_checks_supplied_fields() {
        let patch = RecipePatch {
            title: Some("New title".into()),
            ..RecipePatch::default()
        };
        assert!(validate_recipe_patch(&patch).is_empty());

        let patch = RecipePatch {
            servings: Some(0),
            ..RecipePatch::default()
        };
        assert_eq!(
            validate_recipe_patch(&patch).message_for("servings"),
            Some("Servings must be at least 1")
        );
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(Some(1)).is_empty());
        assert!(validate_rating(Some(5)).is_empty());
        assert!(!validate_rating(Some(0)).is_empty());
        assert!(!validate_rating(Some(6)).is_empty());
        assert!(!validate_rating(None).is_empty());
    }

    #[test]
    fn profile_validation_skips_absent_fields() {
        let form = ProfileForm {
            username: None,
            email: None,
            profile_image: Some("uploads/profiles/p.jpg".into()),
        };
        assert!(validate_profile(&form).is_empty());

        let form = ProfileForm {
            username: Some("x".into()),
            email: Some("bad".into()),
            profile_image: None,
        };
        let errors = validate_profile(&form);
        assert!(errors.message_for("username").is_some());
        assert!(errors.message_for("email").is_some());
    }
}
