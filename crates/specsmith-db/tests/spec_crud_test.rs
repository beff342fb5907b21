//! Integration tests for spec and item queries.
//!
//! Each test creates a unique temporary database via the shared
//! PostgreSQL harness, runs migrations, and drops it on completion.

use std::time::Duration;

use uuid::Uuid;

use specsmith_db::queries::{items, specs};
use specsmith_test_utils::{create_test_db, drop_test_db};

#[tokio::test]
async fn insert_and_get_spec() {
    let (pool, db_name) = create_test_db().await;

    let spec = specs::insert_spec(&pool, "Build a chat app", "remote teams", "2 weeks", "agile")
        .await
        .expect("insert_spec should succeed");

    assert_eq!(spec.goal, "Build a chat app");
    assert_eq!(spec.users, "remote teams");
    assert_eq!(spec.constraints, "2 weeks");
    assert_eq!(spec.template, "agile");

    let fetched = specs::get_spec(&pool, spec.id)
        .await
        .expect("get_spec should succeed")
        .expect("spec should exist");
    assert_eq!(fetched, spec);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn get_missing_spec_returns_none() {
    let (pool, db_name) = create_test_db().await;

    let fetched = specs::get_spec(&pool, Uuid::new_v4()).await.unwrap();
    assert!(fetched.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_recent_orders_newest_first_and_honors_limit() {
    let (pool, db_name) = create_test_db().await;

    for i in 0..4 {
        specs::insert_spec(&pool, &format!("goal {i}"), "u", "c", "t")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let listed = specs::list_recent_specs(&pool, 3).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].goal, "goal 3");
    assert_eq!(listed[1].goal, "goal 2");
    assert_eq!(listed[2].goal, "goal 1");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn child_inserts_round_trip() {
    let (pool, db_name) = create_test_db().await;

    let spec = specs::insert_spec(&pool, "g", "u", "c", "t").await.unwrap();

    let story = items::insert_user_story(&pool, spec.id, Some("1"), "As a user, I want X")
        .await
        .unwrap();
    assert_eq!(story.external_id.as_deref(), Some("1"));
    assert_eq!(story.content, "As a user, I want X");
    assert_eq!(story.spec_id, spec.id);

    let task = items::insert_engineering_task(&pool, spec.id, Some("1"), "Provision database")
        .await
        .unwrap();
    assert_eq!(task.content, "Provision database");

    let risk = items::insert_risk(&pool, spec.id, Some("1"), "Data loss", "Daily backups")
        .await
        .unwrap();
    assert_eq!(risk.risk, "Data loss");
    assert_eq!(risk.mitigation, "Daily backups");

    let stories = items::list_user_stories_for_spec(&pool, spec.id).await.unwrap();
    assert_eq!(stories, vec![story]);
    let tasks = items::list_engineering_tasks_for_spec(&pool, spec.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    let risks = items::list_risks_for_spec(&pool, spec.id).await.unwrap();
    assert_eq!(risks.len(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn children_keep_insertion_order() {
    let (pool, db_name) = create_test_db().await;

    let spec = specs::insert_spec(&pool, "g", "u", "c", "t").await.unwrap();
    for i in 0..3 {
        items::insert_engineering_task(&pool, spec.id, Some(&i.to_string()), &format!("task {i}"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let tasks = items::list_engineering_tasks_for_spec(&pool, spec.id)
        .await
        .unwrap();
    let contents: Vec<&str> = tasks.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["task 0", "task 1", "task 2"]);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn child_insert_requires_existing_spec() {
    let (pool, db_name) = create_test_db().await;

    let result = items::insert_user_story(&pool, Uuid::new_v4(), None, "orphan").await;
    assert!(result.is_err(), "foreign key violation should surface");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn batched_fetch_groups_children_by_spec() {
    let (pool, db_name) = create_test_db().await;

    let first = specs::insert_spec(&pool, "g1", "u", "c", "t").await.unwrap();
    let second = specs::insert_spec(&pool, "g2", "u", "c", "t").await.unwrap();

    items::insert_user_story(&pool, first.id, Some("1"), "first story")
        .await
        .unwrap();
    items::insert_user_story(&pool, second.id, Some("1"), "second story")
        .await
        .unwrap();
    items::insert_risk(&pool, second.id, Some("1"), "r", "m")
        .await
        .unwrap();

    let stories = items::user_stories_for_specs(&pool, &[first.id, second.id])
        .await
        .unwrap();
    assert_eq!(stories.len(), 2);

    let risks = items::risks_for_specs(&pool, &[first.id]).await.unwrap();
    assert!(risks.is_empty());
    let risks = items::risks_for_specs(&pool, &[second.id]).await.unwrap();
    assert_eq!(risks.len(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn external_id_is_not_unique() {
    let (pool, db_name) = create_test_db().await;

    let spec = specs::insert_spec(&pool, "g", "u", "c", "t").await.unwrap();
    items::insert_user_story(&pool, spec.id, Some("1"), "a").await.unwrap();
    items::insert_user_story(&pool, spec.id, Some("1"), "b").await.unwrap();

    let stories = items::list_user_stories_for_spec(&pool, spec.id).await.unwrap();
    assert_eq!(stories.len(), 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}
