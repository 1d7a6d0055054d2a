//! Shared fixtures for server tests.

use std::sync::Arc;

use chrono::NaiveDate;
use roster_storage::UserId;
use roster_store_sqlite::seed::NewUser;
use roster_store_sqlite::SqliteStore;

use crate::backend::StoreBackend;

pub struct Fixture {
    pub backend: StoreBackend,
    pub alice: UserId,
    pub bob: UserId,
    pub carol: UserId,
}

/// alice and bob work in Development at Tokyo, carol in Sales at Osaka.
/// alice and bob already shared a match group.
pub async fn seeded_backend() -> Fixture {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let seed = store.seed();

    let tokyo = seed.office("Tokyo HQ").await.unwrap();
    let osaka = seed.office("Osaka Branch").await.unwrap();
    let icon = seed.file("default.png").await.unwrap();
    let dev = seed.department("Development", true).await.unwrap();
    let sales = seed.department("Sales", true).await.unwrap();
    let member = seed.role("Member", true).await.unwrap();

    let mut users = Vec::new();
    for (i, (name, kana, office)) in [
        ("Alice", "ありす", &tokyo),
        ("Bob", "ぼぶ", &tokyo),
        ("Carol", "きゃろる", &osaka),
    ]
    .into_iter()
    .enumerate()
    {
        let id = seed
            .user(&NewUser {
                user_name: name.to_string(),
                kana: kana.to_string(),
                mail: format!("{}@example.com", name.to_lowercase()),
                password_hash: format!("hash-{}", name.to_lowercase()),
                entry_date: NaiveDate::from_ymd_opt(2020 + i as i32, 4, 1).unwrap(),
                office_id: office.clone(),
                user_icon_id: icon.clone(),
                goal: String::new(),
            })
            .await
            .unwrap();
        users.push(id);
    }
    let [alice, bob, carol]: [UserId; 3] = users.try_into().unwrap();

    let joined = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
    seed.membership(&dev, &member, &alice, joined, true).await.unwrap();
    seed.membership(&dev, &member, &bob, joined, true).await.unwrap();
    seed.membership(&sales, &member, &carol, joined, true).await.unwrap();
    seed.match_group(&[alice.clone(), bob.clone()]).await.unwrap();

    Fixture {
        backend: StoreBackend::Sqlite(Arc::new(store)),
        alice,
        bob,
        carol,
    }
}
