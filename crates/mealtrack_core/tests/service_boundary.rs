//! The façade's no-throw contract: internal failures and unresolvable
//! inputs degrade to absence/emptiness/no-op, never an error.

use mealtrack_core::{MealDataService, MealModel, Mood};
use uuid::Uuid;

#[test]
fn change_meal_without_identity_performs_no_mutation() {
    let service = MealDataService::open_in_memory().unwrap();
    let id = service
        .add_new_meal(&MealModel::new("untouched", 1_700_000_000_000))
        .unwrap();

    let mut no_id = MealModel::new("imposter", 1_700_000_900_000);
    no_id.mood = Some(Mood::Great);
    service.change_meal(&no_id);

    let meals = service.fetch_all_meals().unwrap();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].id, Some(id));
    assert_eq!(meals[0].name, "untouched");
}

#[test]
fn change_meal_with_unresolvable_identity_is_a_no_op() {
    let service = MealDataService::open_in_memory().unwrap();
    service
        .add_new_meal(&MealModel::new("kept", 1_700_000_000_000))
        .unwrap();

    let mut phantom = MealModel::new("phantom", 1_700_000_900_000);
    phantom.id = Some(Uuid::new_v4());
    service.change_meal(&phantom);

    let meals = service.fetch_all_meals().unwrap();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].name, "kept");
}

#[test]
fn change_meal_with_identity_overwrites_and_replaces_tags() {
    let service = MealDataService::open_in_memory().unwrap();
    let mut meal = MealModel::new("before", 1_700_000_000_000);
    meal.tags = vec!["old".to_string()];
    let id = service.add_new_meal(&meal).unwrap();

    let mut changed = service.meal_by_id(id).unwrap();
    changed.name = "after".to_string();
    changed.mood_after = Some(Mood::Good);
    changed.tags = vec!["new".to_string(), "fresh".to_string()];
    service.change_meal(&changed);

    let loaded = service.meal_by_id(id).unwrap();
    assert_eq!(loaded.name, "after");
    assert_eq!(loaded.mood_after, Some(Mood::Good));
    assert_eq!(loaded.tags, vec!["fresh", "new"]);
}

#[test]
fn remove_meal_without_identity_is_a_no_op() {
    let service = MealDataService::open_in_memory().unwrap();
    service
        .add_new_meal(&MealModel::new("stays", 1_700_000_000_000))
        .unwrap();

    service.remove_meal(&MealModel::new("stays", 1_700_000_000_000));
    assert_eq!(service.fetch_all_meals().unwrap().len(), 1);
}

#[test]
fn remove_meal_deletes_meal_and_its_tags() {
    let service = MealDataService::open_in_memory().unwrap();
    let mut meal = MealModel::new("gone", 1_700_000_000_000);
    meal.tags = vec!["a".to_string(), "b".to_string()];
    let id = service.add_new_meal(&meal).unwrap();

    let persisted = service.meal_by_id(id).unwrap();
    service.remove_meal(&persisted);

    assert!(service.meal_by_id(id).is_none());
    assert!(service.fetch_popular_tags(10).unwrap().is_empty());
}

#[test]
fn queries_on_empty_store_return_empty_not_absent() {
    let service = MealDataService::open_in_memory().unwrap();

    assert!(service.fetch_recent_meal().is_none());
    assert_eq!(service.fetch_all_meals().unwrap(), Vec::new());
    assert_eq!(service.fetch_meal_statistics().unwrap(), Vec::new());
    assert_eq!(service.fetch_popular_tags(5).unwrap().len(), 0);
    assert!(service.meal_by_id(Uuid::new_v4()).is_none());
}

#[test]
fn save_changes_is_fire_and_forget() {
    let service = MealDataService::open_in_memory().unwrap();
    service
        .add_new_meal(&MealModel::new("flushed", 1_700_000_000_000))
        .unwrap();

    // No observable effect to assert beyond "does not panic or error".
    service.save_changes();
    service.save_changes();
    assert_eq!(service.fetch_all_meals().unwrap().len(), 1);
}

#[test]
fn data_survives_reopen_of_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meals.db");

    let id = {
        let service = MealDataService::open(&path).unwrap();
        let mut meal = MealModel::new("persisted", 1_700_000_000_000);
        meal.tags = vec!["keeper".to_string()];
        let id = service.add_new_meal(&meal).unwrap();
        service.save_changes();
        id
    };

    let reopened = MealDataService::open(&path).unwrap();
    let loaded = reopened.meal_by_id(id).expect("meal should survive reopen");
    assert_eq!(loaded.name, "persisted");
    assert_eq!(loaded.tags, vec!["keeper"]);
}
