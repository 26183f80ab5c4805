mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use citelaw_resolver::store::StatuteStore;
use citelaw_resolver::types::{JurisdictionLevel, Statute, StatuteRecord};
use citelaw_store::statutes;

fn record(citation: &str, content: &str) -> StatuteRecord {
    StatuteRecord::new(
        Statute {
            id: "usc/title_18/chapter_47/section_1001".into(),
            citation: citation.into(),
            jurisdiction: "FEDERAL".into(),
            title: "§ 1001. Statements or entries generally".into(),
            content: content.into(),
            section: "1001".into(),
            source_url: Some("https://law.example.test/usc/18/1001".into()),
            effective_date: Some("2024-01-01".into()),
        },
        JurisdictionLevel::Federal,
    )
}

#[tokio::test]
async fn test_upsert_and_get_statute() {
    let db = common::TestDb::new().await;

    let stored = statutes::upsert_statute(&db.pool, &record("18 U.S.C. § 1001", "Whoever..."))
        .await
        .unwrap();
    assert_eq!(stored.level, JurisdictionLevel::Federal);
    assert_eq!(stored.chapter.as_deref(), Some("chapter_47"));
    assert_eq!(stored.source, "openlaws");

    let found = statutes::get_statute(&db.pool, "18 U.S.C. § 1001", "FEDERAL")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.statute, stored.statute);

    let missing = statutes::get_statute(&db.pool, "18 U.S.C. § 1001", "CA")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_upsert_replaces_on_conflict() {
    let db = common::TestDb::new().await;

    statutes::upsert_statute(&db.pool, &record("18 U.S.C. § 1001", "old text"))
        .await
        .unwrap();
    let updated = statutes::upsert_statute(&db.pool, &record("18 U.S.C. § 1001", "new text"))
        .await
        .unwrap();
    assert_eq!(updated.statute.content, "new text");

    let counts = statutes::count_by_jurisdiction(&db.pool).await.unwrap();
    assert_eq!(counts, vec![("FEDERAL".to_string(), 1)]);
}

#[tokio::test]
async fn test_deactivate_statute() {
    let db = common::TestDb::new().await;

    statutes::upsert_statute(&db.pool, &record("18 U.S.C. § 1001", "text"))
        .await
        .unwrap();

    assert!(statutes::deactivate_statute(&db.pool, "18 U.S.C. § 1001", "FEDERAL")
        .await
        .unwrap());
    assert!(!statutes::deactivate_statute(&db.pool, "18 USC 1001", "FEDERAL")
        .await
        .unwrap());

    let found = statutes::get_statute(&db.pool, "18 U.S.C. § 1001", "FEDERAL")
        .await
        .unwrap()
        .unwrap();
    assert!(!found.is_active);
    assert!(statutes::count_by_jurisdiction(&db.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pg_store_implements_port() {
    let db = common::TestDb::new().await;
    let store: Arc<dyn StatuteStore> = Arc::new(db.store());

    store.upsert(&record("18 U.S.C. § 1001", "text")).await.unwrap();
    let found = store.get("18 U.S.C. § 1001", "FEDERAL").await.unwrap().unwrap();
    assert_eq!(found.statute.content, "text");
}
