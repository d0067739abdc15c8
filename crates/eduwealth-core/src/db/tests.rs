//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest;
    use crate::recommend::{BrowseFilter, CourseCatalog};
    use chrono::{Duration, NaiveDate};

    fn new_user(db: &Database, email: &str) -> User {
        db.create_user(&NewUser {
            email: email.to_string(),
            name: Some("Test User".to_string()),
            password_hash: Some("hash".to_string()),
            google_id: None,
        })
        .unwrap()
    }

    fn new_expense(item: &str, amount: f64, category: &str) -> NewExpense {
        NewExpense {
            item_name: item.to_string(),
            amount,
            currency: "INR".to_string(),
            category: category.to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        }
    }

    fn new_course(title: &str, url: &str, price: Option<f64>, rating: Option<f64>) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            provider_name: "Udemy".to_string(),
            provider_slug: "udemy".to_string(),
            url: url.to_string(),
            price,
            currency: price.map(|_| "INR".to_string()),
            rating,
            duration: None,
            categories: Some(vec!["programming".to_string()]),
            thumbnail_url: None,
            description: Some("A course".to_string()),
            source_hash: ingest::source_hash("udemy", url),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
        assert_eq!(db.count_courses().unwrap(), 0);
    }

    #[test]
    fn test_file_backed_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eduwealth.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new_unencrypted(path).unwrap();
            new_user(&db, "student@example.com");
        }

        // Reopening runs migrations again; existing data survives
        let db = Database::new_unencrypted(path).unwrap();
        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();

        let user = new_user(&db, "student@example.com");
        assert!(user.id > 0);
        assert_eq!(user.currency, "INR");
        assert!(user.budget_amount.is_none());

        let fetched = db.get_user_by_email("student@example.com").unwrap().unwrap();
        assert_eq!(fetched.id, user.id);

        // Duplicate email is rejected
        let dup = db.create_user(&NewUser {
            email: "student@example.com".to_string(),
            name: None,
            password_hash: None,
            google_id: None,
        });
        assert!(matches!(dup, Err(crate::Error::Validation(_))));
    }

    #[test]
    fn test_profile_update_is_partial() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        let updated = db
            .update_profile(user.id, None, Some(5000.0), None)
            .unwrap();
        assert_eq!(updated.budget_amount, Some(5000.0));
        assert_eq!(updated.name.as_deref(), Some("Test User"));
        assert_eq!(updated.currency, "INR");

        let updated = db
            .update_profile(user.id, Some("Renamed"), None, Some("USD"))
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Renamed"));
        assert_eq!(updated.budget_amount, Some(5000.0));
        assert_eq!(updated.currency, "USD");
    }

    #[test]
    fn test_google_account_linking() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        assert!(db.get_user_by_google_id("goog-123").unwrap().is_none());
        db.link_google_id(user.id, "goog-123").unwrap();

        let linked = db.get_user_by_google_id("goog-123").unwrap().unwrap();
        assert_eq!(linked.id, user.id);
    }

    #[test]
    fn test_refresh_token_lifecycle() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        let expires = chrono::Utc::now() + Duration::days(7);
        db.insert_refresh_token(user.id, "tok-1", expires).unwrap();

        let record = db.get_refresh_token("tok-1").unwrap().unwrap();
        assert_eq!(record.user_id, user.id);

        assert!(db.delete_refresh_token("tok-1").unwrap());
        assert!(!db.delete_refresh_token("tok-1").unwrap());
        assert!(db.get_refresh_token("tok-1").unwrap().is_none());
    }

    #[test]
    fn test_purge_expired_tokens() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        db.insert_refresh_token(user.id, "stale", chrono::Utc::now() - Duration::days(1))
            .unwrap();
        db.insert_refresh_token(user.id, "fresh", chrono::Utc::now() + Duration::days(7))
            .unwrap();

        assert_eq!(db.purge_expired_tokens().unwrap(), 1);
        assert!(db.get_refresh_token("stale").unwrap().is_none());
        assert!(db.get_refresh_token("fresh").unwrap().is_some());
    }

    #[test]
    fn test_interest_get_or_create_is_lazy() {
        let db = Database::in_memory().unwrap();

        let first = db.get_or_create_interest("Machine Learning").unwrap();
        assert_eq!(first.slug, "machine-learning");

        // Same slug resolves to the same row, even with different casing
        let second = db.get_or_create_interest("machine learning").unwrap();
        assert_eq!(first.id, second.id);

        assert_eq!(db.list_interests().unwrap().len(), 1);
    }

    #[test]
    fn test_set_user_interests_replaces_selection() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        let names = vec!["Python".to_string(), "Design".to_string()];
        let saved = db.set_user_interests(user.id, &names).unwrap();
        assert_eq!(saved.len(), 2);

        // A second save replaces rather than accumulates
        let names = vec!["Finance".to_string()];
        let saved = db.set_user_interests(user.id, &names).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Finance");

        // Lazily-created interests stick around for other users
        assert_eq!(db.list_interests().unwrap().len(), 3);
    }

    #[test]
    fn test_expense_crud_and_totals() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        db.insert_expense(user.id, &new_expense("groceries", 250.0, "Food & Drinks"))
            .unwrap();
        db.insert_expense(user.id, &new_expense("bus pass", 100.0, "Transport"))
            .unwrap();

        let expenses = db.list_expenses(user.id, None, None, None).unwrap();
        assert_eq!(expenses.len(), 2);

        let total = db.sum_expenses(user.id, None, None, None).unwrap();
        assert_eq!(total, 350.0);

        let transport = db
            .list_expenses(user.id, None, None, Some("Transport"))
            .unwrap();
        assert_eq!(transport.len(), 1);
        assert_eq!(transport[0].item_name, "bus pass");
        assert_eq!(
            db.sum_expenses(user.id, None, None, Some("Transport"))
                .unwrap(),
            100.0
        );
    }

    #[test]
    fn test_expense_date_filters() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        let mut june = new_expense("a", 10.0, "Other");
        june.date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut july = new_expense("b", 20.0, "Other");
        july.date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        db.insert_expense(user.id, &june).unwrap();
        db.insert_expense(user.id, &july).unwrap();

        let filtered = db
            .list_expenses(
                user.id,
                Some(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
                None,
                None,
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item_name, "b");

        let filtered = db
            .list_expenses(
                user.id,
                None,
                Some(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
                None,
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item_name, "a");
    }

    #[test]
    fn test_expense_is_scoped_to_owner() {
        let db = Database::in_memory().unwrap();
        let alice = new_user(&db, "alice@example.com");
        let bob = new_user(&db, "bob@example.com");

        let expense = db
            .insert_expense(alice.id, &new_expense("coffee", 50.0, "Food & Drinks"))
            .unwrap();

        assert!(db.get_expense(bob.id, expense.id).unwrap().is_none());
        assert!(!db.delete_expense(bob.id, expense.id).unwrap());
        assert!(db.delete_expense(alice.id, expense.id).unwrap());
    }

    #[test]
    fn test_positive_amount_constraint() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        let result = db.insert_expense(user.id, &new_expense("bad", -5.0, "Other"));
        assert!(result.is_err());
    }

    #[test]
    fn test_deleting_user_cascades() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        db.insert_expense(user.id, &new_expense("snack", 30.0, "Food & Drinks"))
            .unwrap();
        db.insert_refresh_token(user.id, "tok", chrono::Utc::now() + Duration::days(7))
            .unwrap();
        db.set_user_interests(user.id, &["Python".to_string()])
            .unwrap();
        let course = new_course("Rust", "https://example.com/rust", Some(100.0), Some(4.5));
        let id = match db.upsert_course(&course).unwrap() {
            CourseUpsertResult::Inserted(id) => id,
            CourseUpsertResult::Updated(id) => id,
        };
        db.save_course_for_user(user.id, id).unwrap();

        assert!(db.delete_user(user.id).unwrap());

        assert_eq!(db.count_expenses(user.id).unwrap(), 0);
        assert!(db.get_refresh_token("tok").unwrap().is_none());
        assert!(db.list_user_interests(user.id).unwrap().is_empty());
        assert!(db.list_saved_courses(user.id).unwrap().is_empty());
        // Interests and courses themselves survive
        assert_eq!(db.list_interests().unwrap().len(), 1);
        assert_eq!(db.count_courses().unwrap(), 1);
    }

    #[test]
    fn test_course_upsert_by_hash_is_idempotent() {
        let db = Database::in_memory().unwrap();

        let mut course = new_course("Rust", "https://example.com/rust", Some(100.0), Some(4.5));
        let first = db.upsert_course(&course).unwrap();
        let id = match first {
            CourseUpsertResult::Inserted(id) => id,
            CourseUpsertResult::Updated(_) => panic!("expected insert"),
        };

        // Second save with the same hash updates in place
        course.title = "Rust 2024".to_string();
        course.price = Some(120.0);
        course.rating = Some(4.8);
        match db.upsert_course(&course).unwrap() {
            CourseUpsertResult::Updated(updated_id) => assert_eq!(updated_id, id),
            CourseUpsertResult::Inserted(_) => panic!("expected update"),
        }

        assert_eq!(db.count_courses().unwrap(), 1);
        let stored = db.get_course(id).unwrap().unwrap();
        assert_eq!(stored.title, "Rust 2024");
        assert_eq!(stored.price, Some(120.0));
        assert_eq!(stored.rating, Some(4.8));
    }

    #[test]
    fn test_price_band_query_ordering() {
        let db = Database::in_memory().unwrap();

        db.upsert_course(&new_course("A", "https://e/a", Some(90.0), Some(4.0)))
            .unwrap();
        db.upsert_course(&new_course("B", "https://e/b", Some(60.0), Some(4.9)))
            .unwrap();
        db.upsert_course(&new_course("C", "https://e/c", Some(80.0), Some(4.9)))
            .unwrap();
        // Out of band
        db.upsert_course(&new_course("D", "https://e/d", Some(500.0), Some(5.0)))
            .unwrap();
        // Wrong currency
        let mut usd = new_course("E", "https://e/e", Some(90.0), Some(5.0));
        usd.currency = Some("USD".to_string());
        db.upsert_course(&usd).unwrap();

        let courses = db.courses_in_price_band(50.0, 150.0, "INR", 3).unwrap();
        let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        // Rating desc, then price asc within equal ratings
        assert_eq!(titles, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_browse_candidates_filters() {
        let db = Database::in_memory().unwrap();

        let mut free = new_course("Free ML Course", "https://e/ml", None, Some(4.8));
        free.description = Some("Master machine learning".to_string());
        db.upsert_course(&free).unwrap();
        db.upsert_course(&new_course(
            "Pricey Python",
            "https://e/py",
            Some(900.0),
            Some(4.2),
        ))
        .unwrap();

        // Free courses always pass a max-price filter
        let filter = BrowseFilter {
            max_price: Some(100.0),
            ..Default::default()
        };
        let courses = db.browse_candidates(&filter, 60).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Free ML Course");

        // Search matches descriptions case-insensitively
        let filter = BrowseFilter {
            search: Some("MACHINE".to_string()),
            ..Default::default()
        };
        let courses = db.browse_candidates(&filter, 60).unwrap();
        assert_eq!(courses.len(), 1);

        // Interest filter works the same way against titles
        let filter = BrowseFilter {
            interest: Some("python".to_string()),
            ..Default::default()
        };
        let courses = db.browse_candidates(&filter, 60).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Pricey Python");
    }

    #[test]
    fn test_saved_courses_round_trip() {
        let db = Database::in_memory().unwrap();
        let user = new_user(&db, "student@example.com");

        let id = match db
            .upsert_course(&new_course("Rust", "https://e/rust", Some(100.0), Some(4.5)))
            .unwrap()
        {
            CourseUpsertResult::Inserted(id) => id,
            CourseUpsertResult::Updated(id) => id,
        };

        assert!(db.save_course_for_user(user.id, id).unwrap());
        // Saving again is a no-op
        assert!(!db.save_course_for_user(user.id, id).unwrap());

        let saved = db.list_saved_courses(user.id).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Rust");

        assert!(db.unsave_course_for_user(user.id, id).unwrap());
        assert!(!db.unsave_course_for_user(user.id, id).unwrap());
        assert!(db.list_saved_courses(user.id).unwrap().is_empty());
    }
}
