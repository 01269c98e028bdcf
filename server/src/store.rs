//! Persistence gateway for the recipe aggregate.
//!
//! A recipe's ingredients and instructions live in the recipe row, so every
//! create, update, and delete is a single statement: the aggregate is written
//! or removed as one unit and no child can outlive its recipe.

use chrono::Utc;
use cookbook_core::{Recipe, RecipeDraft, RecipeId};
use diesel::prelude::*;

use crate::db::DbPool;
use crate::error::StorageError;
use crate::models::{EncodedContent, NewRecipe, RecipeChanges, RecipeRow};
use crate::schema::recipes;

pub trait RecipeStore: Send + Sync {
    /// All recipes with full detail, ordered by id.
    fn list(&self) -> Result<Vec<Recipe>, StorageError>;

    /// `None` when no recipe has this id.
    fn get(&self, id: RecipeId) -> Result<Option<Recipe>, StorageError>;

    /// Store a new recipe and return it with its assigned id.
    fn create(&self, draft: &RecipeDraft) -> Result<Recipe, StorageError>;

    /// Replace name, ingredients, and instructions. `None` when no recipe has
    /// this id, in which case nothing was written.
    fn update(&self, id: RecipeId, draft: &RecipeDraft) -> Result<Option<Recipe>, StorageError>;

    /// Remove the recipe and everything it owns. `false` when it did not exist.
    fn delete(&self, id: RecipeId) -> Result<bool, StorageError>;
}

pub struct SqliteRecipeStore {
    pool: DbPool,
}

impl SqliteRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RecipeStore for SqliteRecipeStore {
    fn list(&self) -> Result<Vec<Recipe>, StorageError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<RecipeRow> = tracing::info_span!("db.query", op = "list_recipes")
            .in_scope(|| {
                recipes::table
                    .select(RecipeRow::as_select())
                    .order(recipes::id.asc())
                    .load(&mut conn)
            })?;

        rows.into_iter().map(RecipeRow::into_recipe).collect()
    }

    fn get(&self, id: RecipeId) -> Result<Option<Recipe>, StorageError> {
        let mut conn = self.pool.get()?;
        let row: Option<RecipeRow> = tracing::info_span!("db.query", op = "get_recipe", id)
            .in_scope(|| {
                recipes::table
                    .find(id)
                    .select(RecipeRow::as_select())
                    .first(&mut conn)
                    .optional()
            })?;

        row.map(RecipeRow::into_recipe).transpose()
    }

    fn create(&self, draft: &RecipeDraft) -> Result<Recipe, StorageError> {
        let content = EncodedContent::from_draft(draft)?;
        let now = Utc::now().naive_utc();
        let new_recipe = NewRecipe {
            name: draft.name(),
            ingredients: content.ingredients,
            instructions: content.instructions,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.get()?;
        let row: RecipeRow = tracing::info_span!("db.query", op = "insert_recipe").in_scope(|| {
            diesel::insert_into(recipes::table)
                .values(&new_recipe)
                .returning(RecipeRow::as_returning())
                .get_result(&mut conn)
        })?;

        tracing::debug!(id = row.id, "created recipe");
        row.into_recipe()
    }

    fn update(&self, id: RecipeId, draft: &RecipeDraft) -> Result<Option<Recipe>, StorageError> {
        let content = EncodedContent::from_draft(draft)?;
        let changes = RecipeChanges {
            name: draft.name(),
            ingredients: content.ingredients,
            instructions: content.instructions,
            updated_at: Utc::now().naive_utc(),
        };

        let mut conn = self.pool.get()?;
        let row: Option<RecipeRow> = tracing::info_span!("db.query", op = "update_recipe", id)
            .in_scope(|| {
                diesel::update(recipes::table.find(id))
                    .set(&changes)
                    .returning(RecipeRow::as_returning())
                    .get_result(&mut conn)
                    .optional()
            })?;

        row.map(RecipeRow::into_recipe).transpose()
    }

    fn delete(&self, id: RecipeId) -> Result<bool, StorageError> {
        let mut conn = self.pool.get()?;
        let deleted = tracing::info_span!("db.query", op = "delete_recipe", id)
            .in_scope(|| diesel::delete(recipes::table.find(id)).execute(&mut conn))?;

        Ok(deleted > 0)
    }
}
