//! Accounts, access control, menu, tables, settings, POS and finance over HTTP

mod common;

use common::{TestApp, future_date};
use http::{StatusCode, header};
use serde_json::json;

// ==================== Auth ====================

#[tokio::test]
async fn protected_routes_need_a_session() {
    let app = TestApp::spawn().await;

    let res = app.get("/api/reservations", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/api/auth/me", Some("not-a-token")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // public surface
    assert_eq!(app.get("/api/menu", None).await.status, StatusCode::OK);
    assert_eq!(app.get("/api/settings/public", None).await.status, StatusCode::OK);
    assert_eq!(app.get("/health", None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn customers_are_kept_off_admin_routes() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.register_customer("alice").await;

    for uri in ["/api/users", "/api/orders", "/api/finance/summary", "/api/settings"] {
        let res = app.get(uri, Some(&alice)).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "{uri}");
    }
    let res = app
        .post("/api/tables", Some(&alice), json!({ "number": 1, "capacity": 2 }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_login_and_session_cookie() {
    let app = TestApp::spawn().await;
    let res = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "username": "maria",
                "email": "Maria@Example.com",
                "password": "bacalhau-2024",
                "full_name": "Maria Silva",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["user"]["role"], "customer");
    assert_eq!(res.body["user"]["email"], "maria@example.com");
    assert!(res.body["user"].get("password_hash").is_none());
    let cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("mesa_session="));
    assert!(cookie.contains("HttpOnly"));

    let dup = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "username": "maria",
                "email": "other@example.com",
                "password": "bacalhau-2024",
                "full_name": "Maria Two",
            }),
        )
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let dup = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "username": "maria2",
                "email": "maria@example.com",
                "password": "bacalhau-2024",
                "full_name": "Maria Two",
            }),
        )
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let wrong = app
        .post(
            "/api/auth/login",
            None,
            json!({ "login": "maria", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let token = app.login("maria@example.com", "bacalhau-2024").await;
    let me = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "maria");
}

#[tokio::test]
async fn password_change_requires_the_current_password() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.register_customer("alice").await;

    let res = app
        .put(
            "/api/auth/password",
            Some(&alice),
            json!({ "current_password": "guess-guess", "new_password": "new-secret-1" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .put(
            "/api/auth/password",
            Some(&alice),
            json!({ "current_password": "correct-horse", "new_password": "new-secret-1" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    app.login("alice", "new-secret-1").await;
}

#[tokio::test]
async fn disabled_accounts_cannot_log_in() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (alice_id, _) = app.register_customer("alice").await;

    let res = app.delete(&format!("/api/users/{alice_id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = app
        .post(
            "/api/auth/login",
            None,
            json!({ "login": "alice", "password": "correct-horse" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivation_ends_open_sessions() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let table = app.create_table(&admin, 1, 4).await;
    let (alice_id, alice) = app.register_customer("alice").await;

    let res = app.delete(&format!("/api/users/{alice_id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = app.book(&alice, table, &future_date(3), "19:00", 2, json!([])).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", res.body);
    assert_eq!(res.body["code"], 1007);

    // reactivating does not bring the old token back
    let res = app
        .put(
            &format!("/api/users/{alice_id}"),
            Some(&admin),
            json!({ "is_active": true }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let res = app.get("/api/auth/me", Some(&alice)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let fresh = app.login("alice", "correct-horse").await;
    assert_eq!(app.get("/api/auth/me", Some(&fresh)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn role_changes_apply_to_existing_tokens() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (bob_id, bob) = app.register_customer("bob").await;
    let user_uri = format!("/api/users/{bob_id}");

    let res = app.put(&user_uri, Some(&admin), json!({ "role": "admin" })).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(app.get("/api/users", Some(&bob)).await.status, StatusCode::OK);

    let res = app.put(&user_uri, Some(&admin), json!({ "role": "customer" })).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(app.get("/api/users", Some(&bob)).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_revokes_the_bearer_token() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.register_customer("alice").await;
    let other_device = app.login("alice", "correct-horse").await;

    let res = app.post("/api/auth/logout", Some(&alice), json!({})).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    for token in [&alice, &other_device] {
        let res = app.get("/api/auth/me", Some(token)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    // logging out without a session is harmless
    let res = app.post("/api/auth/logout", None, json!({})).await;
    assert_eq!(res.status, StatusCode::OK);

    let token = app.login("alice", "correct-horse").await;
    assert_eq!(app.get("/api/auth/me", Some(&token)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn admins_cannot_remove_themselves() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let me = app.get("/api/auth/me", Some(&admin)).await;
    let admin_id = me.body["id"].as_i64().unwrap();

    let res = app.delete(&format!("/api/users/{admin_id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put(
            &format!("/api/users/{admin_id}"),
            Some(&admin),
            json!({ "role": "customer" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

// ==================== Menu & tables ====================

#[tokio::test]
async fn category_with_items_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Entradas").await;
    let item = app.create_item(&admin, category, "Caldo verde", 4.5).await;

    let dup = app
        .post("/api/menu/categories", Some(&admin), json!({ "name": "Entradas" }))
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let res = app
        .delete(&format!("/api/menu/categories/{category}"), Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.delete(&format!("/api/menu/items/{item}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["deleted"], true);

    let res = app
        .delete(&format!("/api/menu/categories/{category}"), Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[tokio::test]
async fn menu_prices_are_bounded() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Bebidas").await;

    for price in [-1.0, 1_000_000.5] {
        let res = app
            .post(
                "/api/menu/items",
                Some(&admin),
                json!({ "category_id": category, "name": "Vinho verde", "price": price }),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{price}");
        assert_eq!(res.body["code"], 6002);
    }

    let item = app.create_item(&admin, category, "Vinho verde", 4.5).await;
    let res = app
        .put(&format!("/api/menu/items/{item}"), Some(&admin), json!({ "price": -0.5 }))
        .await;
    assert_eq!(res.body["code"], 6002);
}

#[tokio::test]
async fn unavailable_items_leave_the_public_menu() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Peixe").await;
    let sardinhas = app.create_item(&admin, category, "Sardinhas", 11.0).await;
    app.create_item(&admin, category, "Polvo", 19.0).await;

    let res = app
        .put(
            &format!("/api/menu/items/{sardinhas}/availability"),
            Some(&admin),
            json!({ "is_available": false }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let menu = app.get("/api/menu", None).await;
    let items = menu.body[0]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Polvo");
}

#[tokio::test]
async fn table_numbers_are_unique_and_used_tables_are_archived() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let table = app.create_table(&admin, 7, 4).await;

    let dup = app
        .post("/api/tables", Some(&admin), json!({ "number": 7, "capacity": 2 }))
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let (_, alice) = app.register_customer("alice").await;
    let booked = app.book(&alice, table, &future_date(2), "19:00", 2, json!([])).await;
    let id = booked.body["id"].as_i64().unwrap();

    let res = app.delete(&format!("/api/tables/{table}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST, "upcoming booking blocks delete");

    app.post(&format!("/api/reservations/{id}/cancel"), Some(&alice), json!({}))
        .await;
    let res = app.delete(&format!("/api/tables/{table}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["archived"], true);

    let res = app.get(&format!("/api/tables/{table}"), Some(&admin)).await;
    assert_eq!(res.body["is_active"], false);
}

// ==================== Settings ====================

#[tokio::test]
async fn settings_updates_are_validated_all_or_nothing() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .put("/api/settings", Some(&admin), json!({ "wifi_password": "x" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put(
            "/api/settings",
            Some(&admin),
            json!({ "restaurant_name": "Tasca", "opening_time": "25:00" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let current = app.get("/api/settings", Some(&admin)).await;
    assert_eq!(current.body["restaurant_name"], "Mesa");

    let res = app
        .put(
            "/api/settings",
            Some(&admin),
            json!({ "restaurant_name": "Tasca", "max_party_size": 8 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["restaurant_name"], "Tasca");
    assert_eq!(res.body["max_party_size"], 8);

    let public = app.get("/api/settings/public", None).await;
    assert_eq!(public.body["restaurant_name"], "Tasca");
}

// ==================== POS & finance ====================

#[tokio::test]
async fn cash_payment_needs_enough_tender_and_returns_change() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let table = app.create_table(&admin, 3, 4).await;
    let category = app.create_category(&admin, "Bebidas").await;
    let vinho = app.create_item(&admin, category, "Vinho verde", 12.0).await;
    let cafe = app.create_item(&admin, category, "Bica", 0.8).await;

    let created = app
        .post(
            "/api/orders",
            Some(&admin),
            json!({
                "table_id": table,
                "items": [
                    { "menu_item_id": vinho, "quantity": 1 },
                    { "menu_item_id": cafe, "quantity": 2 },
                ],
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["total"].as_f64(), Some(13.6));
    let order_id = created.body["id"].as_i64().unwrap();
    let pay_uri = format!("/api/orders/{order_id}/pay");

    let short = app
        .post(&pay_uri, Some(&admin), json!({ "method": "cash", "amount_tendered": 10.0 }))
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let huge = app
        .post(&pay_uri, Some(&admin), json!({ "method": "cash", "amount_tendered": 100_000.5 }))
        .await;
    assert_eq!(huge.status, StatusCode::BAD_REQUEST);

    let online = app.post(&pay_uri, Some(&admin), json!({ "method": "mbway" })).await;
    assert_eq!(online.status, StatusCode::BAD_REQUEST);

    let paid = app
        .post(&pay_uri, Some(&admin), json!({ "method": "cash", "amount_tendered": 20.0 }))
        .await;
    assert_eq!(paid.status, StatusCode::OK, "{}", paid.body);
    assert_eq!(paid.body["change"].as_f64(), Some(6.4));
    assert_eq!(paid.body["order"]["status"], "paid");
    assert_eq!(paid.body["payment"]["provider"], "manual");

    let again = app
        .post(&pay_uri, Some(&admin), json!({ "method": "card" }))
        .await;
    assert_ne!(again.status, StatusCode::OK);

    let summary = app.get("/api/finance/summary", Some(&admin)).await;
    assert_eq!(summary.status, StatusCode::OK, "{}", summary.body);
    assert_eq!(summary.body["revenue_total"].as_f64(), Some(13.6));
    assert_eq!(summary.body["payment_count"], 1);
}

#[tokio::test]
async fn order_lines_can_be_added_and_removed_while_open() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Petiscos").await;
    let pao = app.create_item(&admin, category, "Pao com chourico", 3.5).await;

    let created = app.post("/api/orders", Some(&admin), json!({})).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let order_id = created.body["id"].as_i64().unwrap();

    let added = app
        .post(
            &format!("/api/orders/{order_id}/items"),
            Some(&admin),
            json!({ "items": [{ "menu_item_id": pao, "quantity": 2 }] }),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK, "{}", added.body);
    assert_eq!(added.body["total"].as_f64(), Some(7.0));
    let line_id = added.body["items"][0]["id"].as_i64().unwrap();

    let removed = app
        .delete(&format!("/api/orders/{order_id}/items/{line_id}"), Some(&admin))
        .await;
    assert_eq!(removed.status, StatusCode::OK, "{}", removed.body);
    assert_eq!(removed.body["total"].as_f64(), Some(0.0));

    let empty = app
        .post(
            &format!("/api/orders/{order_id}/pay"),
            Some(&admin),
            json!({ "method": "card" }),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let cancelled = app
        .post(&format!("/api/orders/{order_id}/cancel"), Some(&admin), json!({}))
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["status"], "cancelled");
}

#[tokio::test]
async fn finance_rejects_inverted_ranges() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let res = app
        .get("/api/finance/summary?from=2026-03-10&to=2026-03-01", Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .get("/api/finance/payments?from=2026-03-01&to=2026-03-10", Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.as_array().unwrap().is_empty());
}
