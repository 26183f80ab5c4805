use std::sync::Arc;
use std::time::Duration;

use citelaw_resolver::api::test_support::{branch, leaf, FakeDivisionsApi};
use citelaw_resolver::api::{DivisionsApi, HttpDivisionsApi};
use citelaw_resolver::config::{ApiConfig, TraversalOptions};
use citelaw_resolver::pacing::NoPacing;
use citelaw_resolver::registry::JurisdictionRegistry;
use citelaw_resolver::service::{CacheFirstResolver, Resolution, ResolveOptions};
use citelaw_resolver::store::{MemoryStore, StatuteStore};
use citelaw_resolver::traversal::DivisionTraversal;
use citelaw_resolver::types::LawCompilation;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(server.uri())
        .with_api_key("test-key")
        .with_retry_delays(Duration::from_millis(1), Duration::from_millis(1))
}

fn http_resolver(server: &MockServer, store: Arc<dyn StatuteStore>) -> CacheFirstResolver {
    CacheFirstResolver::from_config(
        &fast_config(server),
        TraversalOptions::default(),
        JurisdictionRegistry::builtin(),
        store,
    )
    .unwrap()
    .with_pacer(Arc::new(NoPacing))
}

async fn mount_json(server: &MockServer, url_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

const CA_ROOT: &str = "/jurisdictions/ca/laws/CA-CODES/divisions";

#[tokio::test]
async fn test_california_penal_code_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CA_ROOT))
        .and(query_param("depth", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"path": "civ", "display_name": "Civil Code", "display_children": []},
            {
                "path": "pen",
                "display_name": "Penal Code",
                "display_children": [{"display_name": "Part 1", "path": "pen/part_1"}]
            }
        ])))
        .mount(&mock_server)
        .await;

    mount_json(
        &mock_server,
        &format!("{CA_ROOT}/pen/part_1"),
        json!({
            "path": "pen/part_1",
            "display_name": "Part 1. Of Crimes and Punishments",
            "display_children": [
                {"display_name": "Section 1870", "path": "pen/part_1/section_1870"},
                {"display_name": "Section 187", "path": "pen/part_1/section_187"}
            ]
        }),
    )
    .await;

    mount_json(
        &mock_server,
        &format!("{CA_ROOT}/pen/part_1/section_187"),
        json!({
            "path": "pen/part_1/section_187",
            "display_name": "Section 187",
            "division_type": "section",
            "plaintext_content": "(a) Murder is the unlawful killing of a human being,\r\n\r\n\r\nor a fetus, with malice aforethought.",
            "url": "https://law.example.test/ca/pen/187",
            "display_children": []
        }),
    )
    .await;

    let resolver = http_resolver(&mock_server, Arc::new(MemoryStore::new()));
    let statute = resolver
        .get_statute_by_citation("Cal. Penal Code § 187", ResolveOptions::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(statute.id, "pen/part_1/section_187");
    assert_eq!(statute.jurisdiction, "CA");
    assert_eq!(
        statute.content,
        "(a) Murder is the unlawful killing of a human being,\n\nor a fetus, with malice aforethought."
    );
    assert_eq!(
        statute.source_url.as_deref(),
        Some("https://law.example.test/ca/pen/187")
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| !r.url.path().ends_with("section_1870")));
}

#[tokio::test]
async fn test_new_jersey_colon_section() {
    let mock_server = MockServer::start().await;
    let root = "/jurisdictions/nj/laws/NJ-STATUTES/divisions";

    mount_json(
        &mock_server,
        root,
        json!([{
            "path": "title_2c",
            "display_name": "Title 2C. The New Jersey Code of Criminal Justice",
            "display_children": [{"display_name": "Chapter 15. Robbery", "path": "title_2c/chapter_15"}]
        }]),
    )
    .await;

    mount_json(
        &mock_server,
        &format!("{root}/title_2c/chapter_15"),
        json!({
            "path": "title_2c/chapter_15",
            "display_name": "Chapter 15. Robbery",
            "display_children": [
                {"display_name": "2C:15-10 Something else", "path": "title_2c/chapter_15/section_2c_15_10"},
                {"display_name": "2C:15-1 Robbery defined", "path": "title_2c/chapter_15/section_2c_15_1"}
            ]
        }),
    )
    .await;

    mount_json(
        &mock_server,
        &format!("{root}/title_2c/chapter_15/section_2c_15_1"),
        json!({
            "path": "title_2c/chapter_15/section_2c_15_1",
            "display_name": "2C:15-1 Robbery defined",
            "plaintext_content": "A person is guilty of robbery if, in the course of committing a theft, he inflicts bodily injury."
        }),
    )
    .await;

    let resolver = http_resolver(&mock_server, Arc::new(MemoryStore::new()));
    let statute = resolver
        .get_new_jersey_statute("2C:15-1", ResolveOptions::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(statute.id, "title_2c/chapter_15/section_2c_15_1");
    assert_eq!(statute.section, "2C:15-1");
    assert_eq!(statute.title, "2C:15-1 Robbery defined");
}

#[tokio::test]
async fn test_federal_title_hint_orders_compilations() {
    let mock_server = MockServer::start().await;
    let root = "/jurisdictions/us/laws/USC/divisions";

    mount_json(
        &mock_server,
        root,
        json!([
            {"path": "title_1", "display_name": "Title 1 - General Provisions", "display_children": []},
            {"path": "title_17", "display_name": "Title 17 - Copyrights", "display_children": []},
            {
                "path": "title_18",
                "display_name": "Title 18 - Crimes and Criminal Procedure",
                "display_children": [{"display_name": "Chapter 47 - Fraud and False Statements", "path": "title_18/chapter_47"}]
            }
        ]),
    )
    .await;

    mount_json(
        &mock_server,
        &format!("{root}/title_18/chapter_47"),
        json!({
            "path": "title_18/chapter_47",
            "display_name": "Chapter 47 - Fraud and False Statements",
            "display_children": [{"display_name": "§ 1001. Statements or entries generally", "path": "title_18/chapter_47/section_1001"}]
        }),
    )
    .await;

    mount_json(
        &mock_server,
        &format!("{root}/title_18/chapter_47/section_1001"),
        json!({
            "path": "title_18/chapter_47/section_1001",
            "display_name": "§ 1001. Statements or entries generally",
            "markdown_content": "## § 1001\n\nWhoever **knowingly and willfully** falsifies a material fact shall be fined."
        }),
    )
    .await;

    let resolver = http_resolver(&mock_server, Arc::new(MemoryStore::new()));
    let statute = resolver
        .get_federal_statute(18, "1001", ResolveOptions::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(statute.jurisdiction, "FEDERAL");
    assert_eq!(
        statute.content,
        "§ 1001\n\nWhoever knowingly and willfully falsifies a material fact shall be fined."
    );
}

#[tokio::test]
async fn test_rate_limited_branch_is_dropped() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        CA_ROOT,
        json!([{
            "path": "pen",
            "display_name": "Penal Code",
            "display_children": [
                {"display_name": "Part 1", "path": "pen/part_1"},
                {"display_name": "Part 2", "path": "pen/part_2"}
            ]
        }]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!("{CA_ROOT}/pen/part_1")))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    mount_json(
        &mock_server,
        &format!("{CA_ROOT}/pen/part_2"),
        json!({
            "path": "pen/part_2",
            "display_name": "Part 2",
            "display_children": [{"display_name": "Section 187", "path": "pen/part_2/section_187"}]
        }),
    )
    .await;

    mount_json(
        &mock_server,
        &format!("{CA_ROOT}/pen/part_2/section_187"),
        json!({"path": "pen/part_2/section_187", "plaintext_content": "Murder."}),
    )
    .await;

    let resolver = http_resolver(&mock_server, Arc::new(MemoryStore::new()));
    let resolution = resolver
        .resolve("Cal. Penal Code § 187", ResolveOptions::default())
        .await
        .unwrap();

    let statute = resolution.into_statute().unwrap();
    assert_eq!(statute.id, "pen/part_2/section_187");
    assert_eq!(statute.title, "Section 187");
}

#[tokio::test]
async fn test_root_exhaustion_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CA_ROOT))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let resolver = http_resolver(&mock_server, Arc::new(MemoryStore::new()));
    let result = resolver
        .resolve("Cal. Penal Code § 187", ResolveOptions::default())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_http_api_listings() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/jurisdictions",
        json!({"data": [{"jurisdiction_key": "ca", "display_name": "California"}]}),
    )
    .await;
    mount_json(
        &mock_server,
        "/jurisdictions/ca/laws",
        json!([{"law_key": "CA-CODES", "name": "California Codes"}]),
    )
    .await;

    let api = HttpDivisionsApi::new(&fast_config(&mock_server)).unwrap();
    let jurisdictions = api.list_jurisdictions().await.unwrap();
    assert_eq!(jurisdictions[0].key, "ca");
    assert_eq!(jurisdictions[0].name, "California");

    let laws = api.list_laws("ca").await.unwrap();
    assert_eq!(laws[0].key, "CA-CODES");
}

/// A wide tree with no match anywhere.
fn haystack(width: usize) -> FakeDivisionsApi {
    let top_children: Vec<(String, String)> = (0..width)
        .map(|i| (format!("Part {i}"), format!("pen/part_{i}")))
        .collect();
    let refs: Vec<(&str, &str)> = top_children
        .iter()
        .map(|(name, path)| (name.as_str(), path.as_str()))
        .collect();

    let mut api = FakeDivisionsApi::new(vec![branch("pen", "Penal Code", &refs)]);
    for (_, part) in &top_children {
        let chapters: Vec<(String, String)> = (0..width)
            .map(|j| (format!("Chapter {j}"), format!("{part}/chapter_{j}")))
            .collect();
        let refs: Vec<(&str, &str)> = chapters
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_str()))
            .collect();
        api = api.with_node(branch(part, "Part", &refs));
        for (_, chapter) in &chapters {
            api = api.with_node(branch(chapter, "Chapter", &[]));
        }
    }
    api
}

#[tokio::test]
async fn test_budget_is_never_exceeded() {
    for budget in [0, 1, 7, 20] {
        let api = haystack(6);
        let options = TraversalOptions::default().with_call_budget(budget);
        let traversal = DivisionTraversal::new(&api, &NoPacing, &options);

        let (hit, report) = traversal
            .search_with_report(&LawCompilation::new("ca", "CA-CODES"), "187", None, 6)
            .await
            .unwrap();

        assert!(hit.is_none());
        assert!(api.calls() <= budget, "budget {budget}, calls {}", api.calls());
        assert_eq!(report.api_calls, api.calls());
    }
}

#[tokio::test]
async fn test_import_then_resolve_is_served_from_store() {
    let api = Arc::new(
        FakeDivisionsApi::new(vec![branch(
            "pen",
            "Penal Code",
            &[("Section 187", "pen/section_187")],
        )])
        .with_node(leaf("pen/section_187", "Section 187", "Murder is the unlawful killing.")),
    );
    let store = Arc::new(MemoryStore::new());
    let resolver = CacheFirstResolver::new(
        Arc::new(JurisdictionRegistry::builtin()),
        api.clone(),
        store.clone(),
    )
    .with_pacer(Arc::new(NoPacing));

    let first = resolver
        .resolve("Cal. Penal Code § 187", ResolveOptions::importing())
        .await
        .unwrap();
    assert!(matches!(first, Resolution::Resolved { imported: true, .. }));
    let calls = api.calls();
    assert!(calls > 0);

    let second = resolver
        .resolve("Cal. Penal Code § 187", ResolveOptions::default())
        .await
        .unwrap();

    assert!(matches!(second, Resolution::Cached(_)));
    assert_eq!(api.calls(), calls);
    assert_eq!(
        first.statute().map(|s| &s.content),
        second.statute().map(|s| &s.content)
    );
    assert_eq!(store.len().await, 1);
}
