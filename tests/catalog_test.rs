mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use sefer_store::catalog::CatalogFilter;
use sefer_store::models::BookInput;

#[tokio::test]
async fn test_category_filter_with_inclusive_min_price() {
    let (state, app) = setup().await;
    let torah = create_category(&state, "תורה").await;
    let halacha = create_category(&state, "הלכה").await;
    let other = create_category(&state, "Children").await;

    let at_bound = create_book(&state, "חומש", 50.0, vec![torah.id]).await;
    let below = create_book(&state, "משנה", 49.99, vec![halacha.id]).await;
    let both = create_book(&state, "קיצור שולחן ערוך", 70.0, vec![torah.id, halacha.id]).await;
    create_book(&state, "Aleph Bet", 80.0, vec![other.id]).await;
    create_book(&state, "סידור", 90.0, vec![]).await;

    let uri = format!(
        "/api/books?categories={},{}&minPrice=50",
        torah.id, halacha.id
    );
    let (status, body) = send(&app, get(&uri, None)).await;

    assert_eq!(status, StatusCode::OK);
    let found = ids(&body);
    assert!(found.contains(&(at_bound.id as i64)), "price 50 is inclusive");
    assert!(!found.contains(&(below.id as i64)));
    // A book in both categories appears once
    assert_eq!(
        found.iter().filter(|id| **id == both.id as i64).count(),
        1
    );
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_max_price_bound_and_newest_first() {
    let (state, app) = setup().await;
    let cheap = create_book(&state, "A", 10.0, vec![]).await;
    let mid = create_book(&state, "B", 20.0, vec![]).await;
    create_book(&state, "C", 30.0, vec![]).await;

    let (status, body) = send(&app, get("/api/books?maxPrice=20", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![mid.id as i64, cheap.id as i64]);
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_fields() {
    let (state, app) = setup().await;
    let by_title = create_book(&state, "Mishnah Berurah", 85.0, vec![]).await;
    let by_author = state
        .book_repo
        .create(BookInput {
            title: "ספר החינוך".to_string(),
            author: Some("Rabbi Aharon HaLevi".to_string()),
            price: 40.0,
            ..Default::default()
        })
        .await
        .unwrap();
    let by_isbn = state
        .book_repo
        .create(BookInput {
            title: "תניא".to_string(),
            isbn: Some("978-965-123".to_string()),
            price: 30.0,
            ..Default::default()
        })
        .await
        .unwrap();

    let (_, body) = send(&app, get("/api/books?search=BERURAH", None)).await;
    assert_eq!(ids(&body), vec![by_title.id as i64]);

    let (_, body) = send(&app, get("/api/books?search=halevi", None)).await;
    assert_eq!(ids(&body), vec![by_author.id as i64]);

    let (_, body) = send(&app, get("/api/books?search=965-123", None)).await;
    assert_eq!(ids(&body), vec![by_isbn.id as i64]);

    // Hebrew search term, percent-encoded
    let (_, body) = send(&app, get("/api/books?search=%D7%AA%D7%A0%D7%99%D7%90", None)).await;
    assert_eq!(ids(&body), vec![by_isbn.id as i64]);
}

#[tokio::test]
async fn test_search_with_accented_capitals() {
    let (state, app) = setup().await;
    let etude = create_book(&state, "Étude Talmudique", 45.0, vec![]).await;
    create_book(&state, "Etude sans accent", 45.0, vec![]).await;

    // "Étude" and "ÉTUDE", percent-encoded
    for uri in [
        "/api/books?search=%C3%89tude",
        "/api/books?search=%C3%89TUDE",
        "/api/books?search=%C3%89tude%20TALMUDIQUE",
    ] {
        let (status, body) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![etude.id as i64], "{uri}");
    }
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let (state, app) = setup().await;
    create_book(&state, "Plain title", 10.0, vec![]).await;
    let literal = create_book(&state, "100% Kosher", 10.0, vec![]).await;

    let (_, body) = send(&app, get("/api/books?search=%25", None)).await;
    assert_eq!(ids(&body), vec![literal.id as i64]);

    let (_, body) = send(&app, get("/api/books?search=_", None)).await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_promotion_flags() {
    let (state, app) = setup().await;
    let arrival = state
        .book_repo
        .create(BookInput {
            title: "New".to_string(),
            price: 10.0,
            is_new_arrival: true,
            ..Default::default()
        })
        .await
        .unwrap();
    let market = state
        .book_repo
        .create(BookInput {
            title: "Fresh".to_string(),
            price: 10.0,
            is_new_in_market: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let (_, body) = send(&app, get("/api/books?filter=newArrivals", None)).await;
    assert_eq!(ids(&body), vec![arrival.id as i64]);

    let (_, body) = send(&app, get("/api/books?filter=newInMarket", None)).await;
    assert_eq!(ids(&body), vec![market.id as i64]);

    let (_, body) = send(&app, get("/api/books?filter=somethingElse", None)).await;
    assert_eq!(ids(&body).len(), 2);
}

#[tokio::test]
async fn test_malformed_numbers_and_categories_are_ignored() {
    let (state, app) = setup().await;
    create_book(&state, "A", 10.0, vec![]).await;
    create_book(&state, "B", 99.0, vec![]).await;

    let (status, body) = send(
        &app,
        get("/api/books?minPrice=abc&maxPrice=&categories=x,,y", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body).len(), 2);
}

#[tokio::test]
async fn test_books_without_categories_have_empty_list() {
    let (state, app) = setup().await;
    let cat = create_category(&state, "תהלים").await;
    let plain = create_book(&state, "Plain", 10.0, vec![]).await;
    let tagged = create_book(&state, "Tagged", 10.0, vec![cat.id]).await;

    let (_, body) = send(&app, get(&format!("/api/books/{}", plain.id), None)).await;
    assert_eq!(body["categories"], json!([]));
    assert_eq!(body["category"], json!(null));

    let (_, body) = send(&app, get(&format!("/api/books/{}", tagged.id), None)).await;
    assert_eq!(body["categories"], json!(["תהלים"]));
    assert_eq!(body["category_ids"], json!([cat.id]));
    assert_eq!(body["category"], json!("תהלים"));
}

#[tokio::test]
async fn test_repository_filter_matches_http_filter() {
    let (state, _app) = setup().await;
    let cat = create_category(&state, "גמרא").await;
    let book = create_book(&state, "ברכות", 65.0, vec![cat.id]).await;
    create_book(&state, "שבת", 65.0, vec![]).await;

    let filter = CatalogFilter {
        category_ids: vec![cat.id],
        ..Default::default()
    };
    let books = state.book_repo.find_all(filter).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, book.id);
}

#[tokio::test]
async fn test_admin_book_lifecycle() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;
    let first = create_category(&state, "First").await;
    let second = create_category(&state, "Second").await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/books",
            Some(&cookie),
            json!({
                "title": "ליקוטי מוהר\"ן",
                "price": 55,
                "category_ids": [first.id],
                "image_url": "/uploads/a.jpg"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["images"], json!(["/uploads/a.jpg"]));
    assert_eq!(created["is_available"], json!(true));
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/books/{id}"),
            Some(&cookie),
            json!({ "title": "ליקוטי מוהר\"ן", "price": 60, "category_ids": [second.id] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], json!(60.0));
    assert_eq!(updated["category_ids"], json!([second.id]));

    let (status, _) = send(
        &app,
        json_request("POST", &format!("/api/books/{id}/delete"), Some(&cookie), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get(&format!("/api/books/{id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request("POST", &format!("/api/books/{id}/delete"), Some(&cookie), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_validation() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;

    let cases = [
        json!({ "title": "", "price": 10 }),
        json!({ "title": "Negative", "price": -1 }),
        json!({ "title": "Unknown category", "price": 10, "category_ids": [999] }),
    ];
    for payload in cases {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/books", Some(&cookie), payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(body["error"].is_string());
    }

    // Nothing half-written by the rejected category link
    let books = state.book_repo.find_all(CatalogFilter::default()).await.unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
async fn test_category_delete_detaches_children_and_books() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;
    let parent = create_category(&state, "Parent").await;

    let (status, child) = send(
        &app,
        json_request(
            "POST",
            "/api/categories",
            Some(&cookie),
            json!({ "name": "Child", "parent_id": parent.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let child_id = child["id"].as_i64().unwrap();
    let book = create_book(&state, "Linked", 10.0, vec![parent.id]).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/categories/{}/delete", parent.id),
            Some(&cookie),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, child) = send(&app, get(&format!("/api/categories/{child_id}"), None)).await;
    assert_eq!(child["parent_id"], json!(null));

    let (_, linked) = send(&app, get(&format!("/api/books/{}", book.id), None)).await;
    assert_eq!(linked["categories"], json!([]));
}

#[tokio::test]
async fn test_category_cannot_be_its_own_parent() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;
    let cat = create_category(&state, "Loop").await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/categories/{}", cat.id),
            Some(&cookie),
            json!({ "name": "Loop", "parent_id": cat.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
