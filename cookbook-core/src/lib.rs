pub mod error;
pub mod types;
pub mod unit;
pub mod validation;

pub use error::UnknownUnit;
pub use types::{Ingredient, IngredientRequest, Recipe, RecipeDraft, RecipeId, RecipeRequest};
pub use unit::Unit;
pub use validation::{validate, FieldErrors, Rule, ValidationResult, Violation};
