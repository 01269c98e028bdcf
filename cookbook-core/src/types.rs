use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::unit::Unit;

/// Storage-assigned recipe identity.
pub type RecipeId = i32;

/// One line of a recipe's ingredient list. Has no identity of its own: it
/// exists only inside the recipe that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub quantity: i32,
    pub unit: Unit,
    /// Set only when `unit` is [`Unit::Other`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_unit_description: Option<String>,
}

/// A stored recipe. This is the aggregate root: ingredients and instructions
/// are held by value and only change when the whole recipe is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[schema(value_type = i32)]
    pub id: RecipeId,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated recipe content, ready to be written.
///
/// The only way to obtain one is `RecipeDraft::try_from(RecipeRequest)`, so a
/// draft always satisfies the validation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub(crate) name: String,
    pub(crate) ingredients: Vec<Ingredient>,
    pub(crate) instructions: Vec<String>,
}

impl RecipeDraft {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }
}

/// Create/update request body. Missing and `null` fields default to empty
/// values so that they are reported as field errors instead of failing to
/// decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeRequest {
    #[schema(example = "Red Beans & Rice")]
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ingredients: Vec<IngredientRequest>,
    #[serde(deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// `None` when the value is missing or is not a whole number, e.g. `null`,
    /// `2.5` or `"2"`.
    #[serde(deserialize_with = "whole_number")]
    #[schema(value_type = i64)]
    pub quantity: Option<i64>,
    /// One of the names returned by `GET /units`.
    #[serde(deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_unit_description: Option<String>,
}

impl From<&Ingredient> for IngredientRequest {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            quantity: Some(i64::from(ingredient.quantity)),
            unit: ingredient.unit.to_string(),
            other_unit_description: ingredient.other_unit_description.clone(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Integer(i64),
    Float(f64),
    Other(IgnoredAny),
}

fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawQuantity::deserialize(deserializer)? {
        RawQuantity::Integer(n) => Some(n),
        RawQuantity::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
        RawQuantity::Float(_) | RawQuantity::Other(_) => None,
    })
}

impl From<&Recipe> for RecipeRequest {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.iter().map(IngredientRequest::from).collect(),
            instructions: recipe.instructions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_wire_format_is_camel_case() {
        let ingredient = Ingredient {
            name: "Saffron".to_string(),
            quantity: 1,
            unit: Unit::Other,
            other_unit_description: Some("pinch".to_string()),
        };
        let json = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Saffron",
                "quantity": 1,
                "unit": "Other",
                "otherUnitDescription": "pinch"
            })
        );
    }

    #[test]
    fn test_ingredient_omits_absent_description() {
        let ingredient = Ingredient {
            name: "Rice".to_string(),
            quantity: 2,
            unit: Unit::Cup,
            other_unit_description: None,
        };
        let json = serde_json::to_value(&ingredient).unwrap();
        assert!(json.get("otherUnitDescription").is_none());
    }

    #[test]
    fn test_request_defaults_missing_fields() {
        let request: RecipeRequest =
            serde_json::from_str(r#"{"ingredients": [{"name": "Salt"}]}"#).unwrap();
        assert_eq!(request.name, "");
        assert!(request.instructions.is_empty());
        assert_eq!(request.ingredients[0].quantity, None);
        assert_eq!(request.ingredients[0].unit, "");
        assert_eq!(request.ingredients[0].other_unit_description, None);
    }

    #[test]
    fn test_request_treats_null_as_missing() {
        let request: RecipeRequest = serde_json::from_str(
            r#"{"name": null, "ingredients": [{"name": null, "quantity": null, "unit": null}], "instructions": null}"#,
        )
        .unwrap();
        assert_eq!(request.name, "");
        assert!(request.instructions.is_empty());
        assert_eq!(request.ingredients[0].name, "");
        assert_eq!(request.ingredients[0].quantity, None);
        assert_eq!(request.ingredients[0].unit, "");
    }

    #[test]
    fn test_quantity_accepts_only_whole_numbers() {
        let quantity = |raw: &str| {
            let json = format!(r#"{{"ingredients": [{{"quantity": {}}}]}}"#, raw);
            serde_json::from_str::<RecipeRequest>(&json).unwrap().ingredients[0].quantity
        };
        assert_eq!(quantity("2"), Some(2));
        assert_eq!(quantity("-4"), Some(-4));
        assert_eq!(quantity("3.0"), Some(3));
        assert_eq!(quantity("2.5"), None);
        assert_eq!(quantity("\"2\""), None);
        assert_eq!(quantity("[1]"), None);
        assert_eq!(quantity("1e300"), None);
    }
}
