use mealtrack_core::db::open_db_in_memory;
use mealtrack_core::{MealModel, MealRepository, Mood, RepoError, SqliteMealRepository};
use rusqlite::params;
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMealRepository::try_new(&mut conn).unwrap();

    let mut meal = MealModel::new("ramen", 1_700_000_000_000);
    meal.picture = Some(vec![0xff, 0xd8, 0xff, 0xe0]);
    meal.mood = Some(Mood::Bad);
    meal.mood_after = Some(Mood::Great);
    let id = repo.create_meal(&meal).unwrap();

    let loaded = repo.get_meal(id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.name, "ramen");
    assert_eq!(loaded.date, 1_700_000_000_000);
    assert_eq!(loaded.picture.as_deref(), Some(&[0xff, 0xd8, 0xff, 0xe0][..]));
    assert_eq!(loaded.mood, Some(Mood::Bad));
    assert_eq!(loaded.mood_after, Some(Mood::Great));
    assert!(loaded.tags.is_empty());
}

#[test]
fn create_with_tags_links_one_row_per_tag_string() {
    let mut conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqliteMealRepository::try_new(&mut conn).unwrap();
        let mut meal = MealModel::new("salad", 1_700_000_100_000);
        meal.tags = vec!["soup".to_string(), "apple".to_string(), "green".to_string()];
        repo.create_meal(&meal).unwrap()
    };

    let row_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM tags WHERE meal_uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(row_count, 3);

    let repo = SqliteMealRepository::try_new(&mut conn).unwrap();
    let loaded = repo.get_meal(id).unwrap().unwrap();
    assert_eq!(loaded.tags, vec!["apple", "green", "soup"]);
}

#[test]
fn update_overwrites_scalars_and_replaces_tag_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMealRepository::try_new(&mut conn).unwrap();

    let mut meal = MealModel::new("draft", 1_700_000_000_000);
    meal.tags = vec!["old".to_string(), "stale".to_string()];
    let id = repo.create_meal(&meal).unwrap();

    meal.name = "pancakes".to_string();
    meal.date = 1_700_000_200_000;
    meal.mood = Some(Mood::Okay);
    meal.mood_after = None;
    meal.tags = vec!["sweet".to_string()];
    repo.update_meal(id, &meal).unwrap();

    let loaded = repo.get_meal(id).unwrap().unwrap();
    assert_eq!(loaded.name, "pancakes");
    assert_eq!(loaded.date, 1_700_000_200_000);
    assert_eq!(loaded.mood, Some(Mood::Okay));
    assert_eq!(loaded.mood_after, None);
    assert_eq!(loaded.tags, vec!["sweet"]);
}

#[test]
fn update_not_found_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMealRepository::try_new(&mut conn).unwrap();

    let missing = Uuid::new_v4();
    let meal = MealModel::new("missing", 1_700_000_000_000);
    let err = repo.update_meal(missing, &meal).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn delete_meal_cascades_to_its_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqliteMealRepository::try_new(&mut conn).unwrap();
        let mut meal = MealModel::new("doomed", 1_700_000_000_000);
        meal.tags = vec!["a".to_string(), "b".to_string()];
        let id = repo.create_meal(&meal).unwrap();
        repo.delete_meal(id).unwrap();
        id
    };

    let orphan_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM tags WHERE meal_uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_count, 0);

    let total_tags: i64 = conn
        .query_row("SELECT COUNT(*) FROM tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(total_tags, 0);
}

#[test]
fn delete_not_found_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMealRepository::try_new(&mut conn).unwrap();

    let missing = Uuid::new_v4();
    let err = repo.delete_meal(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn get_rejects_unknown_mood_code() {
    let mut conn = open_db_in_memory().unwrap();
    let bad_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO meals (uuid, name, date, mood) VALUES (?1, ?2, ?3, ?4);",
        params![bad_id.to_string(), "corrupt", 1_700_000_000_000_i64, 42],
    )
    .unwrap();

    let repo = SqliteMealRepository::try_new(&mut conn).unwrap();
    let err = repo.get_meal(bad_id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("mood")));
}

#[test]
fn meal_exists_tracks_lifecycle() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMealRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_meal(&MealModel::new("here", 1_700_000_000_000))
        .unwrap();
    assert!(repo.meal_exists(id).unwrap());

    repo.delete_meal(id).unwrap();
    assert!(!repo.meal_exists(id).unwrap());
    assert!(!repo.meal_exists(Uuid::new_v4()).unwrap());
}
