//! Integration tests for the HTMX cart endpoints.
//!
//! Each test plays a browser: the `cart` cookie set by one response is sent
//! with the next request.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ajay_experience_integration_tests::{HOODIE_ID, POSTER_ID, TestContext};
use axum::http::StatusCode;

#[tokio::test]
async fn test_add_same_product_twice_merges_lines() {
    let mut ctx = TestContext::new();

    let first = ctx.add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Black")).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.item_count(), Some(1));
    assert!(first.cart_cookie().is_some());

    let second = ctx.add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Black")).await;
    assert_eq!(second.item_count(), Some(2));
    assert_eq!(
        second.notifications(),
        vec!["Added 1 Logo Hoodie to cart".to_string()]
    );

    let cart = ctx.cart_json().unwrap();
    let lines = cart.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(lines[0]["variant"], "Black");
}

#[tokio::test]
async fn test_variants_are_separate_lines() {
    let mut ctx = TestContext::new();

    ctx.add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Black")).await;
    let response = ctx
        .add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Heather Grey"))
        .await;

    assert_eq!(response.item_count(), Some(2));
    assert_eq!(ctx.cart_json().unwrap().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_from_sidebar_swaps_elements_and_opens() {
    let mut ctx = TestContext::new();

    let response = ctx.add(POSTER_ID, "Summer Set Poster", "15", None).await;

    assert!(response.body.contains(r#"id="cartCount""#));
    assert!(response.body.contains(r#"id="cartItems""#));
    assert!(response.body.contains(r#"id="cartTotal""#));
    assert!(response.body.contains("hx-swap-oob"));
    assert!(response.body.contains("Summer Set Poster"));
    assert!(response.body.contains("$15.00"));
    assert_eq!(response.trigger().unwrap()["cart-open"], true);
}

#[tokio::test]
async fn test_invalid_add_is_rejected_without_touching_cart() {
    let mut ctx = TestContext::new();

    let response = ctx
        .post_form(
            "/cart/add",
            &[("id", HOODIE_ID), ("name", "Logo Hoodie"), ("price", "-5")],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.cart_cookie().is_none());
    assert!(response.trigger().is_none());
    assert!(ctx.cart_json().is_none());
}

#[tokio::test]
async fn test_add_without_id_is_rejected() {
    let mut ctx = TestContext::new();

    let response = ctx
        .post_form("/cart/add", &[("name", "Logo Hoodie"), ("price", "54.99")])
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_quantity_and_remove_at_zero() {
    let mut ctx = TestContext::new();
    ctx.add(POSTER_ID, "Summer Set Poster", "15", None).await;

    let updated = ctx
        .post_form(
            "/cart/update",
            &[("id", POSTER_ID), ("quantity", "4"), ("context", "page")],
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.item_count(), Some(4));
    assert_eq!(
        updated.notifications(),
        vec!["Updated Summer Set Poster quantity to 4".to_string()]
    );
    assert!(updated.body.contains("$60.00"));

    let removed = ctx
        .post_form(
            "/cart/update",
            &[("id", POSTER_ID), ("quantity", "0"), ("context", "page")],
        )
        .await;
    assert_eq!(removed.item_count(), Some(0));
    assert_eq!(
        removed.notifications(),
        vec!["Removed Summer Set Poster from cart".to_string()]
    );
    assert!(removed.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_increment_and_decrement_floor_at_one() {
    let mut ctx = TestContext::new();
    ctx.add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Black")).await;

    let line = [("id", HOODIE_ID), ("variant", "Black"), ("context", "page")];

    let up = ctx.post_form("/cart/increment", &line).await;
    assert_eq!(up.item_count(), Some(2));

    let down = ctx.post_form("/cart/decrement", &line).await;
    assert_eq!(down.item_count(), Some(1));

    let floor = ctx.post_form("/cart/decrement", &line).await;
    assert_eq!(floor.status, StatusCode::OK);
    assert_eq!(floor.item_count(), Some(1));
    assert!(floor.body.contains("disabled"));
}

#[tokio::test]
async fn test_remove_missing_line_is_noop() {
    let mut ctx = TestContext::new();
    ctx.add(POSTER_ID, "Summer Set Poster", "15", None).await;

    let response = ctx
        .post_form("/cart/remove", &[("id", "not-in-cart")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.item_count(), Some(1));
    assert!(response.notifications().is_empty());
}

#[tokio::test]
async fn test_remove_only_touches_matching_variant() {
    let mut ctx = TestContext::new();
    ctx.add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Black")).await;
    ctx.add(HOODIE_ID, "Logo Hoodie", "54.99", Some("Heather Grey")).await;

    let response = ctx
        .post_form("/cart/remove", &[("id", HOODIE_ID), ("variant", "Black")])
        .await;

    assert_eq!(response.item_count(), Some(1));
    let cart = ctx.cart_json().unwrap();
    assert_eq!(cart[0]["variant"], "Heather Grey");
}

#[tokio::test]
async fn test_cart_page_renders_stored_lines() {
    let mut ctx = TestContext::new().with_cart_json(
        r#"[{"id":"ajay-tote","name":"Record Tote","price":18,"image":"/static/images/merch/tote.jpg","variant":"Natural","quantity":2}]"#,
    );

    let response = ctx.get("/cart").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Record Tote"));
    assert!(response.body.contains("Color: Natural"));
    assert!(response.body.contains("$36.00"));
    assert!(response.body.contains(r#"id="empty-cart""#));
}

#[tokio::test]
async fn test_empty_cart_page_shows_empty_state() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/cart").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Your cart is empty"));
    assert!(response.body.contains("Continue Shopping"));
}

#[tokio::test]
async fn test_malformed_cookie_reads_as_empty_cart() {
    let mut ctx = TestContext::new().with_raw_cookie("not%20json");

    let count = ctx.get("/cart/count").await;
    assert_eq!(count.status, StatusCode::OK);
    assert!(count.body.contains(">0<"));

    let added = ctx.add(POSTER_ID, "Summer Set Poster", "15", None).await;
    assert_eq!(added.item_count(), Some(1));
}

#[tokio::test]
async fn test_sidebar_fragment_reflects_cookie() {
    let mut ctx = TestContext::new().with_cart_json(
        r#"[{"id":"ajay-poster","name":"Summer Set Poster","price":15,"image":"","quantity":3}]"#,
    );

    let response = ctx.get("/cart/sidebar").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.item_count(), Some(3));
    assert!(response.body.contains("$45.00"));
    assert!(response.body.contains("/static/images/placeholder.svg"));
}

#[tokio::test]
async fn test_add_with_blank_quantity_adds_one() {
    let mut ctx = TestContext::new();

    let response = ctx
        .post_form(
            "/cart/add",
            &[
                ("id", POSTER_ID),
                ("name", "Summer Set Poster"),
                ("price", "15"),
                ("image", "/static/images/merch/poster.jpg"),
                ("variant", ""),
                ("quantity", ""),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.item_count(), Some(1));
    assert_eq!(ctx.cart_json().unwrap()[0]["variant"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_truncates_fractions_and_blank_removes() {
    let mut ctx = TestContext::new();
    ctx.add(POSTER_ID, "Summer Set Poster", "15", None).await;

    let fractional = ctx
        .post_form(
            "/cart/update",
            &[("id", POSTER_ID), ("quantity", "2.5"), ("context", "page")],
        )
        .await;
    assert_eq!(fractional.status, StatusCode::OK);
    assert_eq!(fractional.item_count(), Some(2));

    let blank = ctx
        .post_form(
            "/cart/update",
            &[("id", POSTER_ID), ("quantity", ""), ("context", "page")],
        )
        .await;
    assert_eq!(blank.status, StatusCode::OK);
    assert_eq!(blank.item_count(), Some(0));
}

#[tokio::test]
async fn test_add_by_id_fills_in_from_catalog() {
    let mut ctx = TestContext::new();

    let response = ctx
        .post_form("/cart/add", &[("id", HOODIE_ID), ("quantity", "2")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.item_count(), Some(2));
    let cart = ctx.cart_json().unwrap();
    assert_eq!(cart[0]["name"], "Logo Hoodie");
    assert_eq!(cart[0]["price"], 54.99);
    assert_eq!(cart[0]["variant"], "Black");

    let unknown = ctx
        .post_form("/cart/add", &[("id", "not-in-catalog")])
        .await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_out_of_range_stored_price_is_dropped() {
    let mut ctx = TestContext::new().with_cart_json(
        r#"[
            {"id":"x","name":"Oversized","price":5e28,"image":"x.jpg","quantity":2},
            {"id":"ajay-poster","name":"Summer Set Poster","price":15,"image":"p.jpg","quantity":1}
        ]"#,
    );

    let page = ctx.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(!page.body.contains("Oversized"));
    assert!(page.body.contains("$15.00"));

    let sidebar = ctx.get("/cart/sidebar").await;
    assert_eq!(sidebar.item_count(), Some(1));
}
