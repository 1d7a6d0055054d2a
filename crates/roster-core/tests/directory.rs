use std::sync::Arc;

use chrono::NaiveDate;
use roster_core::validation::MailKeywordRule;
use roster_core::Directory;
use roster_storage::{SearchField, UserId};
use roster_store_sqlite::seed::NewUser;
use roster_store_sqlite::SqliteStore;

async fn directory() -> (Directory<SqliteStore>, Vec<UserId>) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let seed = store.seed();
    let office = seed.office("Tokyo HQ").await.unwrap();
    let icon = seed.file("default.png").await.unwrap();

    let mut ids = Vec::new();
    for (i, (name, kana, mail)) in [
        ("Yamada", "やまだ", "popy@example.com"),
        ("Yamamoto", "ヤマモト", "yamamoto@example.com"),
        ("Sato", "さとう", "sato@example.com"),
    ]
    .into_iter()
    .enumerate()
    {
        let id = seed
            .user(&NewUser {
                user_name: name.to_string(),
                kana: kana.to_string(),
                mail: mail.to_string(),
                password_hash: format!("hash-{}", i),
                entry_date: NaiveDate::from_ymd_opt(2020 + i as i32, 4, 1).unwrap(),
                office_id: office.clone(),
                user_icon_id: icon.clone(),
                goal: String::new(),
            })
            .await
            .unwrap();
        ids.push(id);
    }

    (Directory::new(Arc::new(store)), ids)
}

#[tokio::test]
async fn kana_search_requires_kana_keyword() {
    let (directory, ids) = directory().await;

    let hits = directory.search(SearchField::Kana, "やま").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_id, ids[0]);

    assert!(directory
        .search(SearchField::Kana, "yama")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn mail_search_honours_allowed_characters() {
    let (directory, ids) = directory().await;

    let hits = directory.search(SearchField::Mail, "popy").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_id, ids[0]);

    // 's' and 't' are outside the default set
    assert!(directory
        .search(SearchField::Mail, "sato")
        .await
        .unwrap()
        .is_empty());

    let directory = directory.with_mail_rule(MailKeywordRule::new("asto").unwrap());
    let hits = directory.search(SearchField::Mail, "sato").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_id, ids[2]);
}

#[tokio::test]
async fn login_and_listing() {
    let (directory, ids) = directory().await;

    assert_eq!(
        directory
            .authenticate("sato@example.com", "hash-2")
            .await
            .unwrap(),
        Some(ids[2].clone())
    );
    assert_eq!(
        directory
            .authenticate("sato@example.com", "hash-0")
            .await
            .unwrap(),
        None
    );

    let page = directory.with_max_page_size(2).list_users(10, 0).await.unwrap();
    let names: Vec<_> = page.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, vec!["Yamada", "Yamamoto"]);
}

#[tokio::test]
async fn bulk_lookup_skips_unknown_ids() {
    let (directory, ids) = directory().await;

    assert!(directory.users_by_ids(&[]).await.unwrap().is_empty());

    let mut wanted: Vec<UserId> = (0..35_000).map(|_| UserId(uuid::Uuid::new_v4())).collect();
    wanted.push(ids[2].clone());
    wanted.push(ids[0].clone());
    let users = directory.users_by_ids(&wanted).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, vec!["Yamada", "Sato"]);
}

#[tokio::test]
async fn owner_view_for_filters() {
    let (directory, ids) = directory().await;

    let owner = directory.user_for_filter(&ids[1]).await.unwrap().unwrap();
    assert_eq!(owner.user_name, "Yamamoto");
    assert_eq!(owner.office_name, "Tokyo HQ");
    assert_eq!(owner.department_name, None);
    assert!(owner.skill_names.is_empty());

    assert!(directory
        .user_for_filter(&UserId(uuid::Uuid::new_v4()))
        .await
        .unwrap()
        .is_none());
}
