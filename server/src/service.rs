use std::sync::Arc;

use cookbook_core::{Recipe, RecipeDraft, RecipeId, RecipeRequest, Unit};

use crate::error::ServiceError;
use crate::store::RecipeStore;

/// Recipe operations as the HTTP layer sees them.
///
/// Writes are validated before the store is touched; an invalid request comes
/// back as [`ServiceError::Validation`] carrying every field error at once.
/// Concurrent updates of the same recipe are last-write-wins.
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
}

impl RecipeService {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Recipe>, ServiceError> {
        Ok(self.store.list()?)
    }

    pub fn get(&self, id: RecipeId) -> Result<Recipe, ServiceError> {
        self.store.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    pub fn create(&self, request: RecipeRequest) -> Result<Recipe, ServiceError> {
        let draft = RecipeDraft::try_from(request).map_err(ServiceError::Validation)?;
        Ok(self.store.create(&draft)?)
    }

    pub fn update(&self, id: RecipeId, request: RecipeRequest) -> Result<Recipe, ServiceError> {
        let draft = RecipeDraft::try_from(request).map_err(ServiceError::Validation)?;
        self.store
            .update(id, &draft)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn delete(&self, id: RecipeId) -> Result<(), ServiceError> {
        if self.store.delete(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }

    pub fn units(&self) -> Vec<&'static str> {
        Unit::sorted_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use cookbook_core::{IngredientRequest, Rule};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that counts calls and fails every write, so any write reaching it
    /// is visible.
    #[derive(Default)]
    struct RecordingStore {
        writes: AtomicUsize,
    }

    impl RecordingStore {
        fn refuse(&self) -> StorageError {
            self.writes.fetch_add(1, Ordering::SeqCst);
            StorageError::Query(diesel::result::Error::RollbackTransaction)
        }
    }

    impl RecipeStore for RecordingStore {
        fn list(&self) -> Result<Vec<Recipe>, StorageError> {
            Ok(Vec::new())
        }

        fn get(&self, _id: RecipeId) -> Result<Option<Recipe>, StorageError> {
            Ok(None)
        }

        fn create(&self, _draft: &RecipeDraft) -> Result<Recipe, StorageError> {
            Err(self.refuse())
        }

        fn update(&self, _id: RecipeId, _draft: &RecipeDraft) -> Result<Option<Recipe>, StorageError> {
            Err(self.refuse())
        }

        fn delete(&self, _id: RecipeId) -> Result<bool, StorageError> {
            Err(self.refuse())
        }
    }

    fn service() -> (RecipeService, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        (RecipeService::new(store.clone()), store)
    }

    fn nameless() -> RecipeRequest {
        RecipeRequest {
            name: String::new(),
            ingredients: vec![IngredientRequest {
                name: "Salt".to_string(),
                quantity: Some(1),
                unit: "Teaspoon".to_string(),
                other_unit_description: None,
            }],
            instructions: vec!["Season.".to_string()],
        }
    }

    #[test]
    fn test_invalid_create_never_reaches_store() {
        let (service, store) = service();
        let err = service.create(nameless()).unwrap_err();

        match err {
            ServiceError::Validation(errors) => {
                assert_eq!(errors.rules("name"), vec![Rule::Required]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_update_never_reaches_store() {
        let (service, store) = service();
        let err = service.update(1, nameless()).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_valid_create_propagates_storage_errors() {
        let (service, store) = service();
        let mut request = nameless();
        request.name = "Salted".to_string();

        let err = service.create(request).unwrap_err();
        assert!(matches!(err, ServiceError::Storage(StorageError::Query(_))));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (service, _) = service();
        assert!(matches!(service.get(42), Err(ServiceError::NotFound(42))));
    }

    #[test]
    fn test_units_include_other() {
        let (service, _) = service();
        let units = service.units();
        assert_eq!(units.len(), 10);
        assert!(units.contains(&"Other"));
    }
}
