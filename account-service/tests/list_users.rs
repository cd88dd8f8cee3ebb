mod support;

use anyhow::Result;
use axum::http::StatusCode;
use common_auth::Role;
use serde_json::{json, Value};
use support::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};

const LIST_USERS: &str = "/oauth.OAuth/ListUsers";
const DELETE_USER: &str = "/oauth.OAuth/DeleteUser";

async fn admin_app(extra_users: usize) -> Result<(TestApp, String)> {
    let app = TestApp::new()?;
    app.seed_admin().await?;
    for idx in 0..extra_users {
        app.seed_account(&format!("user{idx}@x.com"), "pw1", Role::User)
            .await?;
    }
    let (access, _) = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    Ok((app, access))
}

fn emails(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["email"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn pages_walk_accounts_in_id_order() -> Result<()> {
    let (app, access) = admin_app(4).await?;

    let (status, first) = app
        .call_as(LIST_USERS, json!({ "page_number": 1, "page_size": 2 }), &access)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total_count"], 5);
    assert_eq!(first["total_pages"], 3);
    assert_eq!(first["page_number"], 1);
    assert_eq!(emails(&first), vec![ADMIN_EMAIL, "user0@x.com"]);

    let (_, last) = app
        .call_as(LIST_USERS, json!({ "page_number": 3, "page_size": 2 }), &access)
        .await?;
    assert_eq!(emails(&last), vec!["user3@x.com"]);

    let (status, beyond) = app
        .call_as(LIST_USERS, json!({ "page_number": 4, "page_size": 2 }), &access)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(emails(&beyond).is_empty());
    assert_eq!(beyond["total_pages"], 3);
    Ok(())
}

#[tokio::test]
async fn page_past_a_short_listing_is_empty_with_one_page() -> Result<()> {
    let (app, access) = admin_app(4).await?;

    let (status, page) = app
        .call_as(LIST_USERS, json!({ "page_number": 2, "page_size": 10 }), &access)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(emails(&page).is_empty());
    assert_eq!(page["total_count"], 5);
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["page_number"], 2);
    Ok(())
}

#[tokio::test]
async fn largest_page_size_is_accepted() -> Result<()> {
    let (app, access) = admin_app(1).await?;

    let (status, page) = app
        .call_as(
            LIST_USERS,
            json!({ "page_number": 1, "page_size": i64::MAX }),
            &access,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(emails(&page), vec![ADMIN_EMAIL, "user0@x.com"]);
    assert_eq!(page["total_pages"], 1);
    Ok(())
}

#[tokio::test]
async fn listed_items_expose_public_fields_only() -> Result<()> {
    let (app, access) = admin_app(0).await?;

    let (_, page) = app
        .call_as(LIST_USERS, json!({ "page_number": 1, "page_size": 10 }), &access)
        .await?;
    let item = &page["items"][0];
    assert_eq!(item["role"], "admin");
    assert_eq!(item["birthday"], Value::Null);
    assert!(item["created"].is_string());
    assert!(item.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn non_positive_paging_is_a_validation_error() -> Result<()> {
    let (app, access) = admin_app(0).await?;

    for request in [
        json!({ "page_number": 0, "page_size": 10 }),
        json!({ "page_number": 1, "page_size": 0 }),
        json!({ "page_number": -3, "page_size": 10 }),
    ] {
        let (status, body) = app.call_as(LIST_USERS, request, &access).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_account() -> Result<()> {
    let (app, access) = admin_app(1).await?;
    let target = app.store.get_user("user0@x.com").await?;

    let (status, body) = app
        .call_as(DELETE_USER, json!({ "id": target.id }), &access)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "removed" }));

    let (status, body) = app
        .call(
            "/oauth.OAuth/Token",
            json!({ "email": "user0@x.com", "password": "pw1" }),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (_, page) = app
        .call_as(LIST_USERS, json!({ "page_number": 1, "page_size": 10 }), &access)
        .await?;
    assert_eq!(page["total_count"], 1);
    Ok(())
}

#[tokio::test]
async fn deleting_an_unknown_account_reports_failure_as_data() -> Result<()> {
    let (app, access) = admin_app(0).await?;

    let (status, body) = app
        .call_as(DELETE_USER, json!({ "id": 9999 }), &access)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "account not found");
    Ok(())
}
