use chrono::NaiveDateTime;
use cookbook_core::{Ingredient, Recipe, RecipeDraft};
use diesel::prelude::*;

use crate::error::StorageError;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeRow {
    pub id: i32,
    pub name: String,
    /// JSON array of [`Ingredient`], in recipe order.
    pub ingredients: String,
    /// JSON array of strings, in recipe order.
    pub instructions: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RecipeRow {
    pub fn into_recipe(self) -> Result<Recipe, StorageError> {
        let ingredients: Vec<Ingredient> =
            serde_json::from_str(&self.ingredients).map_err(|source| StorageError::Corrupt {
                id: self.id,
                column: "ingredients",
                source,
            })?;
        let instructions: Vec<String> =
            serde_json::from_str(&self.instructions).map_err(|source| StorageError::Corrupt {
                id: self.id,
                column: "instructions",
                source,
            })?;

        Ok(Recipe {
            id: self.id,
            name: self.name,
            ingredients,
            instructions,
            created_at: self.created_at.and_utc(),
            updated_at: self.updated_at.and_utc(),
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub name: &'a str,
    pub ingredients: String,
    pub instructions: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full replacement of a recipe's content. Owned collections are always
/// rewritten whole.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChanges<'a> {
    pub name: &'a str,
    pub ingredients: String,
    pub instructions: String,
    pub updated_at: NaiveDateTime,
}

/// Serialized owned collections of a draft, shared by inserts and updates.
pub struct EncodedContent {
    pub ingredients: String,
    pub instructions: String,
}

impl EncodedContent {
    pub fn from_draft(draft: &RecipeDraft) -> Result<Self, StorageError> {
        Ok(Self {
            ingredients: serde_json::to_string(draft.ingredients()).map_err(StorageError::Encode)?,
            instructions: serde_json::to_string(draft.instructions())
                .map_err(StorageError::Encode)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cookbook_core::Unit;

    fn row(ingredients: &str, instructions: &str) -> RecipeRow {
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        RecipeRow {
            id: 7,
            name: "Gumbo".to_string(),
            ingredients: ingredients.to_string(),
            instructions: instructions.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_into_recipe_decodes_owned_collections_in_order() {
        let recipe = row(
            r#"[{"name":"Roux","quantity":1,"unit":"Cup"},{"name":"File","quantity":2,"unit":"Other","otherUnitDescription":"dash"}]"#,
            r#"["Make the roux.","Add stock."]"#,
        )
        .into_recipe()
        .unwrap();

        assert_eq!(recipe.id, 7);
        assert_eq!(recipe.ingredients[0].unit, Unit::Cup);
        assert_eq!(recipe.ingredients[1].other_unit_description.as_deref(), Some("dash"));
        assert_eq!(recipe.instructions, vec!["Make the roux.", "Add stock."]);
        assert_eq!(recipe.created_at.to_rfc3339(), "2024-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_into_recipe_reports_unknown_stored_unit() {
        let err = row(r#"[{"name":"Roux","quantity":1,"unit":"Bucket"}]"#, "[]")
            .into_recipe()
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Corrupt {
                id: 7,
                column: "ingredients",
                ..
            }
        ));
    }
}
