//! Integration tests for repository layer
//!
//! These tests verify that the SQLite repositories correctly persist and
//! load records, nest related rows, and keep the bulk update
//! all-or-nothing.

mod common;

use chrono::{Duration, Utc};
use common::{create_test_user, fixed_pub_date, seed_questions, setup_test_db};
use polls_api::domain::poll::{
    ChoiceChanges, ChoiceText, NewChoice, NewQuestion, QuestionChanges, QuestionPatch,
    QuestionText,
};
use polls_api::domain::repositories::{
    ChoiceRepository, GroupRepository, PageRequest, QuestionRepository, RepositoryError,
    UserRepository,
};
use polls_api::domain::user::{Email, GroupName, NewGroup, NewUser, UserChanges, Username};
use polls_api::infrastructure::repositories::{
    SqliteChoiceRepository, SqliteGroupRepository, SqliteQuestionRepository,
    SqliteUserRepository,
};

fn text(value: &str) -> QuestionText {
    QuestionText::new(value).unwrap()
}

#[tokio::test]
async fn test_question_create_and_find() {
    let db = setup_test_db().await;
    let repo = SqliteQuestionRepository::new(db.clone());

    let draft = NewQuestion::new(text("Favourite colour?"), fixed_pub_date());
    let created = repo.create(&draft).await.expect("Failed to create question");

    let found = repo
        .find_by_id(created.id())
        .await
        .expect("Failed to find question")
        .expect("Question should exist");

    assert_eq!(found.question_text(), "Favourite colour?");
    assert_eq!(found.pub_date(), fixed_pub_date());
    assert_eq!(found.date_created(), draft.date_created());
    assert!(found.choices().is_empty());

    assert!(repo.exists(created.id()).await.unwrap());
    assert!(!repo.exists(created.id() + 1).await.unwrap());
}

#[tokio::test]
async fn test_question_update_never_touches_date_created() {
    let db = setup_test_db().await;
    let repo = SqliteQuestionRepository::new(db.clone());
    let created = repo
        .create(&NewQuestion::new(text("Before"), fixed_pub_date()))
        .await
        .unwrap();

    let later = fixed_pub_date() + Duration::days(3);
    let updated = repo
        .update(
            created.id(),
            &QuestionChanges {
                question_text: Some(text("After")),
                pub_date: Some(later),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.question_text(), "After");
    assert_eq!(updated.pub_date(), later);
    assert_eq!(updated.date_created(), created.date_created());

    let unchanged = repo
        .update(created.id(), &QuestionChanges::default())
        .await
        .unwrap();
    assert_eq!(unchanged.question_text(), "After");
}

#[tokio::test]
async fn test_question_empty_update_of_missing_question() {
    let db = setup_test_db().await;
    let repo = SqliteQuestionRepository::new(db.clone());

    let err = repo
        .update(404, &QuestionChanges::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { id: 404, .. }));
}

#[tokio::test]
async fn test_bulk_update_applies_in_order() {
    let db = setup_test_db().await;
    let seeded = seed_questions(&db, 3, 2, 9).await;
    let repo = SqliteQuestionRepository::new(db.clone());

    let patches: Vec<QuestionPatch> = seeded
        .iter()
        .rev()
        .map(|q| QuestionPatch {
            id: q.id(),
            changes: QuestionChanges {
                question_text: Some(text(&format!("Patched {}", q.id()))),
                pub_date: None,
            },
        })
        .collect();

    let updated = repo.bulk_update(&patches).await.unwrap();

    let ids: Vec<i64> = updated.iter().map(|q| q.id()).collect();
    let expected: Vec<i64> = seeded.iter().rev().map(|q| q.id()).collect();
    assert_eq!(ids, expected);
    for (question, original) in updated.iter().zip(seeded.iter().rev()) {
        assert_eq!(question.question_text(), format!("Patched {}", original.id()));
        assert_eq!(question.date_created(), original.date_created());
        assert_eq!(question.choices(), original.choices());
    }
}

#[tokio::test]
async fn test_bulk_update_missing_id_changes_nothing() {
    let db = setup_test_db().await;
    let seeded = seed_questions(&db, 2, 0, 4).await;
    let repo = SqliteQuestionRepository::new(db.clone());

    let patch = |id: i64| QuestionPatch {
        id,
        changes: QuestionChanges {
            question_text: Some(text("Should not stick")),
            pub_date: None,
        },
    };
    let result = repo
        .bulk_update(&[patch(seeded[0].id()), patch(12345), patch(seeded[1].id())])
        .await;

    assert!(matches!(
        result,
        Err(RepositoryError::NotFound { id: 12345, .. })
    ));
    for original in &seeded {
        let current = repo.find_by_id(original.id()).await.unwrap().unwrap();
        assert_eq!(current.question_text(), original.question_text());
    }
}

#[tokio::test]
async fn test_delete_question_cascades() {
    let db = setup_test_db().await;
    let seeded = seed_questions(&db, 1, 0, 6).await;
    let questions = SqliteQuestionRepository::new(db.clone());
    let choices = SqliteChoiceRepository::new(db.clone());

    let choice = choices
        .create(&NewChoice {
            question_id: seeded[0].id(),
            choice_text: ChoiceText::new("Doomed").unwrap(),
            votes: 3,
        })
        .await
        .unwrap();

    questions.delete(seeded[0].id()).await.unwrap();

    assert!(choices.find_by_id(choice.id).await.unwrap().is_none());
    assert!(matches!(
        questions.delete(seeded[0].id()).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_choice_update() {
    let db = setup_test_db().await;
    let seeded = seed_questions(&db, 2, 0, 13).await;
    let choices = SqliteChoiceRepository::new(db.clone());

    let choice = choices
        .create(&NewChoice {
            question_id: seeded[0].id(),
            choice_text: ChoiceText::new("Maybe").unwrap(),
            votes: 0,
        })
        .await
        .unwrap();

    let updated = choices
        .update(
            choice.id,
            &ChoiceChanges {
                question_id: Some(seeded[1].id()),
                choice_text: None,
                votes: Some(8),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.question_id, seeded[1].id());
    assert_eq!(updated.choice_text.as_str(), "Maybe");
    assert_eq!(updated.votes, 8);

    assert!(matches!(
        choices.update(999, &ChoiceChanges::default()).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_user_groups_roundtrip() {
    let db = setup_test_db().await;
    let users = SqliteUserRepository::new(db.clone());
    let groups = SqliteGroupRepository::new(db.clone());

    let staff = groups
        .create(&NewGroup {
            name: GroupName::new("staff").unwrap(),
        })
        .await
        .unwrap();
    let audit = groups
        .create(&NewGroup {
            name: GroupName::new("audit").unwrap(),
        })
        .await
        .unwrap();

    let user = users
        .create(&NewUser {
            username: Username::new("dana").unwrap(),
            email: Some(Email::new("dana@example.com").unwrap()),
            password_hash: "!".to_string(),
            groups: vec![audit.id, staff.id, audit.id],
        })
        .await
        .unwrap();
    assert_eq!(user.groups, vec![staff.id, audit.id]);

    let loaded = users.find_with_groups(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.groups, vec![staff.id, audit.id]);
    assert_eq!(loaded.email, Some(Email::new("dana@example.com").unwrap()));

    let bare = users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(bare.groups.is_empty());

    let updated = users
        .update(
            user.id,
            &UserChanges {
                groups: Some(vec![staff.id]),
                email: Some(None),
                ..UserChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.groups, vec![staff.id]);
    assert_eq!(updated.email, None);

    groups.delete(staff.id).await.unwrap();
    let after = users.find_with_groups(user.id).await.unwrap().unwrap();
    assert!(after.groups.is_empty());

    assert_eq!(
        groups.missing_ids(&[staff.id, audit.id]).await.unwrap(),
        vec![staff.id]
    );
}

#[tokio::test]
async fn test_duplicate_names_conflict() {
    let db = setup_test_db().await;
    create_test_user(&db, "erin").await;

    let result = SqliteUserRepository::new(db.clone())
        .create(&NewUser {
            username: Username::new("erin").unwrap(),
            email: None,
            password_hash: "!".to_string(),
            groups: Vec::new(),
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    let groups = SqliteGroupRepository::new(db.clone());
    let name = GroupName::new("ops").unwrap();
    groups.create(&NewGroup { name: name.clone() }).await.unwrap();
    assert!(matches!(
        groups.create(&NewGroup { name }).await,
        Err(RepositoryError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_users_listed_newest_first() {
    let db = setup_test_db().await;
    let first = create_test_user(&db, "first").await;
    let second = create_test_user(&db, "second").await;
    assert!(second.date_joined >= first.date_joined);

    let page = SqliteUserRepository::new(db.clone())
        .list(PageRequest::new(1, 10))
        .await
        .unwrap();

    let names: Vec<&str> = page.items.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);
    assert!(page.items.iter().all(|u| u.date_joined <= Utc::now()));
}

#[tokio::test]
async fn test_seeded_fixtures_repeat() {
    let first = seed_questions(&setup_test_db().await, 8, 4, 77).await;
    let second = seed_questions(&setup_test_db().await, 8, 4, 77).await;

    let shape = |questions: &[polls_api::domain::poll::Question]| -> Vec<Vec<i32>> {
        questions
            .iter()
            .map(|q| q.choices().iter().map(|c| c.votes).collect())
            .collect()
    };
    assert_eq!(shape(&first), shape(&second));
    assert!(first.iter().all(|q| q.choices().len() <= 4));
}
