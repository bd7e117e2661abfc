mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn test_content_is_public_read_admin_write() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;

    let (status, _) = send(&app, get("/api/content/home_banner", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let banner = json!({ "he": "ספרי קודש במחירים מיוחדים", "en": "Holy books on sale" });
    let (status, _) = send(
        &app,
        json_request("POST", "/api/content/home_banner", None, banner.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/content/home_banner", Some(&cookie), banner.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/content/home_banner", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], json!("home_banner"));
    assert_eq!(body["value"], banner);

    // Writing again replaces the value
    let (_, _) = send(
        &app,
        json_request("POST", "/api/content/home_banner", Some(&cookie), json!("short")),
    )
    .await;
    let (_, body) = send(&app, get("/api/content/home_banner", None)).await;
    assert_eq!(body["value"], json!("short"));
}

#[tokio::test]
async fn test_settings_and_content_are_separate() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/settings/shipping_price", Some(&cookie), json!(35)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/settings/shipping_price", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], json!(35));

    let (status, _) = send(&app, get("/api/content/shipping_price", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wishlist_add_list_remove() {
    let (state, app) = setup().await;
    let cookie = user_cookie(&state, &app).await;
    let first = create_book(&state, "פרקי אבות", 15.0, vec![]).await;
    let second = create_book(&state, "מסילת ישרים", 25.0, vec![]).await;

    let (status, _) = send(&app, get("/api/wishlist", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for book_id in [first.id, second.id, first.id] {
        let (status, _) = send(
            &app,
            json_request("POST", "/api/wishlist", Some(&cookie), json!({ "book_id": book_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/api/wishlist", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let mut saved = ids(&body);
    saved.sort();
    assert_eq!(saved, vec![first.id as i64, second.id as i64]);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/wishlist", Some(&cookie), json!({ "book_id": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/wishlist/{}/delete", first.id),
                Some(&cookie),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, get("/api/wishlist", Some(&cookie))).await;
    assert_eq!(ids(&body), vec![second.id as i64]);
}

#[tokio::test]
async fn test_wishlists_are_per_user() {
    let (state, app) = setup().await;
    let reader = user_cookie(&state, &app).await;
    let admin = admin_cookie(&state, &app).await;
    let book = create_book(&state, "Book", 10.0, vec![]).await;

    send(
        &app,
        json_request("POST", "/api/wishlist", Some(&reader), json!({ "book_id": book.id })),
    )
    .await;

    let (_, body) = send(&app, get("/api/wishlist", Some(&admin))).await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_profile_update() {
    let (state, app) = setup().await;
    let cookie = user_cookie(&state, &app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/profile",
            Some(&cookie),
            json!({ "city": "צפת", "address": "  הארי 5 ", "phone": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], json!("צפת"));
    assert_eq!(body["address"], json!("הארי 5"));
    assert_eq!(body["phone"], json!(null));
    // Untouched
    assert_eq!(body["name"], json!("Test User"));
    assert_eq!(body["email"], json!(USER_EMAIL));

    let (status, body) = send(&app, get("/api/profile", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], json!("צפת"));
}

#[tokio::test]
async fn test_health_and_category_listing() {
    let (state, app) = setup().await;
    create_category(&state, "תנ\"ך").await;
    create_category(&state, "Kids").await;

    let (status, _) = send(&app, get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}
