use std::sync::Arc;

use ad_resource::facebook::{base_url, Ad, Campaign, API_VERSION};
use ad_resource::framework::mock::MockTransport;
use ad_resource::framework::{Client, Method, Policy, Resource, ResourceError};
use ad_resource::runtime::try_setup_tracing;
use serde_json::json;

const CAMPAIGNS_URL: &str = "https://graph.facebook.com/v11.0/act_42/campaigns";

fn client(mock: &MockTransport) -> Client {
    try_setup_tracing();
    Client::new(Arc::new(mock.clone()), base_url(API_VERSION)).with_access_token("token")
}

fn first_page() -> serde_json::Value {
    json!({
        "data": [{ "id": "1", "name": "one" }, { "id": "2", "name": "two" }],
        "paging": { "cursors": { "before": "B", "after": "AFTER_2" } }
    })
}

fn last_page() -> serde_json::Value {
    json!({ "data": [{ "id": "3", "name": "three" }], "paging": {} })
}

/// Two pages of two and one rows yield three resources and no third request.
#[tokio::test]
async fn test_enumeration_follows_cursors() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(first_page());
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());

    let relation = Resource::<Campaign>::all(&client(&mock)).filter([("account_id", json!(42))]);
    let campaigns = relation.to_vec().await.expect("Failed to enumerate campaigns");

    // Check the rows and the cursor hand-off
    let names: Vec<_> = campaigns.iter().map(|c| c.get("name").to_string()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].query().contains_key("after"));
    assert_eq!(requests[1].query()["after"], json!("AFTER_2"));
    mock.verify();
}

/// Every yielded row is a clean, persisted resource with its parent key filled in.
#[tokio::test]
async fn test_rows_are_clean_and_back_injected() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());

    let campaign = Resource::<Campaign>::all(&client(&mock))
        .filter([("account_id", json!(42))])
        .first()
        .await
        .expect("Failed to load first campaign")
        .expect("Expected one campaign");

    assert!(campaign.is_persisted());
    assert!(!campaign.is_changed());
    assert!(campaign.last_response().is_some_and(|r| r.is_success()));
    assert_eq!(campaign.account_id().as_i64(), Some(42));
}

/// A limit smaller than the first page never fetches the second.
#[tokio::test]
async fn test_limit_stops_early() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(first_page());

    let relation = Resource::<Campaign>::all(&client(&mock))
        .filter([("account_id", json!(42))])
        .limit(2);
    let campaigns = relation.to_vec().await.unwrap();

    assert_eq!(campaigns.len(), 2);
    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.requests()[0].query()["limit"], json!(2));
    mock.verify();
}

/// Chaining returns new relations and leaves the receiver untouched.
#[test]
fn test_chaining_is_immutable() {
    let mock = MockTransport::new();
    let base = Resource::<Campaign>::all(&client(&mock)).filter([("effective_status", json!(["ACTIVE"]))]);

    let widened = base.filter([("effective_status", json!(["PAUSED", "ACTIVE"]))]);
    let replaced = base.refilter([("effective_status", json!(["ARCHIVED"]))]);
    let limited = base.limit(5).offset("CURSOR");

    assert_eq!(base.filters()["effective_status"], json!(["ACTIVE"]));
    assert_eq!(widened.filters()["effective_status"], json!(["ACTIVE", "PAUSED"]));
    assert_eq!(replaced.filters()["effective_status"], json!(["ARCHIVED"]));
    assert_eq!(base.limit_value(), None);
    assert_eq!(limited.limit_value(), Some(5));
    assert_eq!(limited.offset_value(), Some("CURSOR"));
}

/// An offset is sent as the cursor of the first request.
#[tokio::test]
async fn test_offset_starts_at_cursor() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());

    let relation = Resource::<Campaign>::all(&client(&mock))
        .filter([("account_id", json!(42))])
        .offset("AFTER_2");
    assert_eq!(relation.count().await.unwrap(), 1);

    assert_eq!(mock.requests()[0].query()["after"], json!("AFTER_2"));
}

/// Under the default policy a failed page is an error.
#[tokio::test]
async fn test_failed_page_is_an_error_when_strict() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(first_page());
    mock.expect(Method::Get, CAMPAIGNS_URL).return_error(500, "Please reduce the amount of data");

    let relation = Resource::<Campaign>::all(&client(&mock)).filter([("account_id", json!(42))]);
    let mut records = relation.iter();
    assert!(records.next().await.unwrap().is_some());
    assert!(records.next().await.unwrap().is_some());

    match records.next().await {
        Err(ResourceError::PageNotLoaded { kind, response }) => {
            assert_eq!(kind, "campaign");
            assert_eq!(response.status(), 500);
        }
        other => panic!("expected PageNotLoaded, got {:?}", other.map(|r| r.map(|c| c.id().clone()))),
    }
    assert_eq!(records.yielded(), 2);
}

/// With lenient pagination a failed page just ends the enumeration.
#[tokio::test]
async fn test_failed_page_ends_quietly_when_lenient() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(first_page());
    mock.expect(Method::Get, CAMPAIGNS_URL).return_error(500, "Please reduce the amount of data");
    let client = client(&mock).with_policy(Policy {
        strict_pagination: false,
        ..Policy::default()
    });

    let campaigns = Resource::<Campaign>::all(&client)
        .filter([("account_id", json!(42))])
        .to_vec()
        .await
        .expect("Lenient enumeration should not fail");

    assert_eq!(campaigns.len(), 2);
    mock.verify();
}

/// Enumerating twice replays the first page from memory and re-fetches the rest.
#[tokio::test]
async fn test_reenumeration_reuses_first_page() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(first_page());
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());

    let relation = Resource::<Campaign>::all(&client(&mock)).filter([("account_id", json!(42))]);
    assert_eq!(relation.count().await.unwrap(), 3);
    assert_eq!(relation.count().await.unwrap(), 3);

    // Page one once, page two twice
    assert_eq!(mock.request_count(), 3);
    mock.verify();
}

/// Clones and reloaded relations start over from the platform.
#[tokio::test]
async fn test_clone_and_reload_drop_the_memo() {
    let mock = MockTransport::new();
    for _ in 0..3 {
        mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());
    }

    let mut relation = Resource::<Campaign>::all(&client(&mock)).filter([("account_id", json!(42))]);
    relation.first().await.unwrap();
    relation.first().await.unwrap();
    assert_eq!(mock.request_count(), 1);

    relation.clone().first().await.unwrap();
    assert_eq!(mock.request_count(), 2);

    relation.reload();
    relation.first().await.unwrap();
    assert_eq!(mock.request_count(), 3);
    mock.verify();
}

/// A failed first page is not remembered.
#[tokio::test]
async fn test_failed_first_page_is_not_memoized() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, CAMPAIGNS_URL).return_error(500, "Temporarily unavailable");
    mock.expect(Method::Get, CAMPAIGNS_URL).return_ok(last_page());

    let relation = Resource::<Campaign>::all(&client(&mock)).filter([("account_id", json!(42))]);
    assert!(relation.first().await.is_err());
    assert!(relation.first().await.unwrap().is_some());
    mock.verify();
}

/// Only scalar foreign keys are copied into rows, under their wire names.
#[tokio::test]
async fn test_back_injection_uses_wire_names() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, "https://graph.facebook.com/v11.0/77/ads")
        .return_ok(json!({ "data": [{ "id": "5", "name": "ad" }], "paging": {} }));

    let ads = Resource::<Ad>::all(&client(&mock))
        .filter([("ad_set_id", json!(77)), ("campaign_id", json!([1, 2]))])
        .to_vec()
        .await
        .unwrap();

    assert_eq!(ads[0].ad_set_id().as_i64(), Some(77));
    assert!(ads[0].campaign_id().is_null());
    assert!(!ads[0].is_changed());
}

/// A collection needs a parent key; without one nothing is sent.
#[tokio::test]
async fn test_missing_parent_is_a_request_error() {
    let mock = MockTransport::new();

    let result = Resource::<Campaign>::all(&client(&mock)).to_vec().await;

    assert!(matches!(result, Err(ResourceError::Request(_))));
    assert_eq!(mock.request_count(), 0);
}
