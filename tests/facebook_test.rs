use std::sync::Arc;

use ad_resource::config::Config;
use ad_resource::facebook::{base_url, Account, Business, Campaign, Pixel, SavedAudience, API_VERSION};
use ad_resource::framework::mock::MockTransport;
use ad_resource::framework::{Client, Method, Params, Policy, Resource, ResourceError, Value};
use ad_resource::runtime::try_setup_tracing;
use serde_json::json;

const GRAPH: &str = "https://graph.facebook.com/v11.0";

fn client(mock: &MockTransport) -> Client {
    try_setup_tracing();
    Client::new(Arc::new(mock.clone()), base_url(API_VERSION)).with_access_token("token")
}

/// Walks from an account to its campaigns and pauses the active ones.
#[tokio::test]
async fn test_account_to_campaigns_navigation() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, format!("{GRAPH}/act_42"))
        .return_ok(json!({ "id": "act_42", "account_id": "42", "name": "Main" }));
    mock.expect(Method::Get, format!("{GRAPH}/act_42/campaigns")).return_ok(json!({
        "data": [
            { "id": "900", "name": "Spring", "status": "ACTIVE" },
            { "id": "901", "name": "Summer", "status": "PAUSED" }
        ],
        "paging": {}
    }));
    mock.expect(Method::Post, format!("{GRAPH}/900"))
        .return_ok(json!({ "success": true }));

    // Step 1: Load the account
    let account = Resource::<Account>::find_strict(&client(&mock), 42)
        .await
        .expect("Failed to find account");

    // Step 2: List its campaigns
    let campaigns = account
        .campaigns()
        .expect("Failed to scope campaigns")
        .to_vec()
        .await
        .expect("Failed to list campaigns");
    assert_eq!(campaigns.len(), 2);
    assert!(campaigns.iter().all(|c| c.account_id() == &Value::Integer(42)));

    // Step 3: Pause the active one; the paused one sends nothing
    for mut campaign in campaigns {
        campaign.set("status", "PAUSED").expect("Failed to set status");
        campaign.save_strict().await.expect("Failed to save campaign");
    }

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].json_body().cloned().unwrap()["status"], json!("PAUSED"));
    mock.verify();
}

/// A missing parent comes back as a failed resource by default and as an error under strict associations.
#[tokio::test]
async fn test_belongs_to_follows_association_policy() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, format!("{GRAPH}/act_42")).return_error(400, "Unsupported get request");
    mock.expect(Method::Get, format!("{GRAPH}/act_42")).return_error(400, "Unsupported get request");
    let row = json!({ "id": 900, "account_id": 42 });

    let lenient = Resource::<Campaign>::stale(&client(&mock), row.clone()).unwrap();
    let account = lenient
        .account()
        .await
        .expect("Lenient lookup should not fail")
        .expect("Expected an account");
    assert_eq!(account.last_response().map(|r| r.status()), Some(400));

    let strict_client = client(&mock).with_policy(Policy {
        strict_associations: true,
        ..Policy::default()
    });
    let strict = Resource::<Campaign>::stale(&strict_client, row).unwrap();
    assert!(matches!(strict.account().await, Err(ResourceError::RecordNotFound { .. })));
    mock.verify();
}

/// An account addressed by its `act_` form lists its saved audiences.
#[tokio::test]
async fn test_account_saved_audiences() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, format!("{GRAPH}/act_123"))
        .return_ok(json!({ "id": "act_123", "account_id": "123", "name": "Main" }));
    mock.expect(Method::Get, format!("{GRAPH}/act_123/saved_audiences")).return_ok(json!({
        "data": [{ "id": "1", "name": "Runners" }, { "id": "2", "name": "Cyclists" }]
    }));

    // Step 1: Find the account by its prefixed id
    let account = Resource::<Account>::find_strict(&client(&mock), "act_123")
        .await
        .expect("Failed to find account");
    assert_eq!(account.id(), &Value::Integer(123));

    // Step 2: List its saved audiences
    let audiences: Vec<Resource<SavedAudience>> = account
        .saved_audiences()
        .expect("Failed to scope saved audiences")
        .to_vec()
        .await
        .expect("Failed to list saved audiences");

    let ids: Vec<&Value> = audiences.iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec![&Value::Integer(1), &Value::Integer(2)]);
    assert!(audiences.iter().all(|a| a.account_id() == &Value::Integer(123)));
    mock.verify();
}

/// A business resolves its primary page through `page_id`.
#[tokio::test]
async fn test_business_page() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, format!("{GRAPH}/100"))
        .return_ok(json!({ "id": "100", "name": "Corner Shop" }));
    let mut business = Resource::<Business>::stale(&client(&mock), json!({ "id": 77 })).unwrap();

    // Step 1: Point the business at a page
    business.set("page_id", "100").expect("Failed to set page_id");

    // Step 2: Follow the association
    let page = business
        .page()
        .await
        .expect("Failed to load page")
        .expect("Expected a page");

    assert_eq!(page.get("name").as_str(), Some("Corner Shop"));
    mock.verify();
}

/// `create_strict` posts under the account and skips validation when asked.
#[tokio::test]
async fn test_create_campaign_without_validation() {
    let mock = MockTransport::new();
    mock.expect(Method::Post, format!("{GRAPH}/act_900/campaigns"))
        .return_ok(json!({ "id": "555" }));

    let campaign = Resource::<Campaign>::create_strict(
        &client(&mock),
        json!({ "account_id": 900, "validate": false }),
    )
    .await
    .expect("Failed to create campaign");

    assert_eq!(campaign.id(), &Value::Integer(555));
    let body = mock.requests()[0].json_body().cloned().unwrap();
    assert!(!body.contains_key("validate"));
    assert!(!body.contains_key("account_id"));
    mock.verify();
}

/// Without the flag the same attributes fail validation and nothing is sent.
#[tokio::test]
async fn test_create_campaign_validates_by_default() {
    let mock = MockTransport::new();

    let campaign = Resource::<Campaign>::create(&client(&mock), json!({ "account_id": 900 }))
        .await
        .expect("Failed to build campaign");

    assert!(campaign.is_new());
    assert_eq!(campaign.errors().on("name"), vec!["can't be blank"]);
    assert_eq!(mock.request_count(), 0);
}

/// An unset foreign key means no parent and no request.
#[tokio::test]
async fn test_belongs_to_without_key() {
    let mock = MockTransport::new();
    let campaign = Resource::<Campaign>::stale(&client(&mock), json!({ "id": 900 })).unwrap();

    assert!(campaign.account().await.unwrap().is_none());
    assert_eq!(mock.request_count(), 0);
}

/// Sharing a pixel with an account posts to the pixel's shared accounts.
#[tokio::test]
async fn test_pixel_link_and_unlink() {
    let mock = MockTransport::new();
    mock.expect(Method::Post, format!("{GRAPH}/5/shared_accounts"))
        .return_ok(json!({ "success": true }));
    mock.expect(Method::Delete, format!("{GRAPH}/5/shared_accounts"))
        .return_error(400, "Pixel is not shared with this account");
    let mut pixel = Resource::<Pixel>::stale(&client(&mock), json!({ "id": 5 })).unwrap();
    let params = Params::from([("account_id".to_string(), json!(123))]);

    pixel.link_strict(params.clone()).await.expect("Failed to link pixel");
    assert_eq!(mock.requests()[0].query()["account_id"], json!(123));

    let error = pixel.unlink_strict(params).await.unwrap_err();
    assert!(matches!(error, ResourceError::RecordNotUnlinked { .. }));
    assert_eq!(
        error.response().and_then(|r| r.error_message()),
        Some("Pixel is not shared with this account")
    );
    mock.verify();
}

/// A client built from TOML configuration reaches the configured API version.
#[tokio::test]
async fn test_connect_from_configuration() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, "https://graph.facebook.com/v12.0/900")
        .return_ok(json!({ "id": "900", "name": "Spring" }));
    let config = Config::from_toml(
        r#"
        platform = "facebook"
        access_token = "from-file"
        api_version = "12.0"

        [policy]
        strict_associations = true
        "#,
    )
    .expect("Failed to parse configuration");

    let client = config
        .platform
        .connect(&config, Arc::new(mock.clone()))
        .expect("Failed to connect");
    assert!(client.policy().strict_associations);
    assert!(client.policy().strict_pagination);

    let campaign = Resource::<Campaign>::find_strict(&client, 900).await.unwrap();
    assert_eq!(campaign.get("name").as_str(), Some("Spring"));
    assert_eq!(mock.requests()[0].query()["access_token"], json!("from-file"));
}

/// A refused token exchange surfaces the platform's answer.
#[tokio::test]
async fn test_login_failure() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, format!("{GRAPH}/oauth/access_token"))
        .return_error(400, "Error validating client secret.");
    let config = Config {
        app_id: Some("app".to_string()),
        app_secret: Some("wrong".to_string()),
        ..Config::default()
    };

    let error = config
        .platform
        .login(&config, Arc::new(mock.clone()), "short")
        .await
        .unwrap_err();

    assert!(matches!(error, ResourceError::Login { .. }));
    assert_eq!(error.to_string(), "Login failed: Error validating client secret.");
}
