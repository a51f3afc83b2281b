//! Page handlers driven through `dispatch`.

use std::sync::Arc;

use fleet_admin::http::{Request, Response};
use fleet_admin::{dispatch, AdminConfig, AppContext, DocumentStore, SqliteDocumentStore};
use fleet_forms::MemoryUrlRegistry;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;

async fn context(config: AdminConfig) -> AppContext {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    let store = SqliteDocumentStore::new(pool);
    store.init().await.expect("Failed to create tables");
    AppContext::new(config, Arc::new(store), Arc::new(MemoryUrlRegistry::new()))
}

fn body(res: &Response) -> String {
    res.body_string().unwrap()
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(&res.body).unwrap()
}

const VALID_VEHICLE: &str =
    "registration=AB12+CDE&make=Volvo&model=FH16&vehicle_type=hgv&axles=3&mot_due=2030-05-01&active=on";

async fn seed_vehicles(ctx: &AppContext) {
    for (reg, make, mot) in [
        ("KX70 ABC", "Volvo", "2030-01-10"),
        ("LM19 XYZ", "Scania", "2030-03-02"),
        ("PN21 DEF", "Volvo", "2030-02-15"),
    ] {
        ctx.store
            .create(
                "vehicles",
                json!({
                    "registration": reg,
                    "make": make,
                    "model": "",
                    "vehicle_type": "hgv",
                    "axles": "3",
                    "mot_due": mot,
                    "tax_due": null,
                    "active": true
                }),
            )
            .await
            .unwrap();
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_browser_post_redirects_to_list() {
    let ctx = context(AdminConfig::new()).await;

    let res = dispatch(&ctx, &Request::post("/vehicles/add/").form_body(VALID_VEHICLE)).await;
    assert_eq!(res.status, 302);
    assert_eq!(res.get_header("Location"), Some("/vehicles/"));

    let docs = ctx.store.list("vehicles").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].body["registration"], "AB12 CDE");
    assert_eq!(docs[0].body["axles"], 3);
    assert_eq!(docs[0].body["mot_due"], "2030-05-01");
    assert_eq!(docs[0].body["active"], true);

    let list = dispatch(&ctx, &Request::get("/vehicles/")).await;
    assert_eq!(list.status, 200);
    assert!(body(&list).contains("AB12 CDE"));
}

#[tokio::test]
async fn test_json_client_gets_created_envelope() {
    let ctx = context(AdminConfig::new()).await;

    let req = Request::post("/vehicles/add/")
        .header("Accept", "application/json")
        .form_body(VALID_VEHICLE);
    let res = dispatch(&ctx, &req).await;

    assert_eq!(res.status, 201);
    let envelope = json_body(&res);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["message"], "Vehicle created.");
    let id = envelope["data"]["id"].as_str().unwrap();
    assert!(ctx.store.get("vehicles", id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_json_body_is_accepted() {
    let ctx = context(AdminConfig::new()).await;

    let req = Request::post("/drivers/add/")
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .body(
            json!({
                "full_name": "Zoë Price",
                "licence_number": "PRICE812157ZP9AB",
                "licence_category": "ce",
                "licence_expiry": "2031-08-01",
                "active": true
            })
            .to_string(),
        );
    let res = dispatch(&ctx, &req).await;

    assert_eq!(res.status, 201, "{}", body(&res));
    let docs = ctx.store.list("drivers").await.unwrap();
    assert_eq!(docs[0].body["full_name"], "Zoë Price");
    assert_eq!(docs[0].body["active"], true);
}

#[tokio::test]
async fn test_unchecked_switch_is_stored_as_false() {
    let ctx = context(AdminConfig::new()).await;

    let posted = VALID_VEHICLE.replace("&active=on", "");
    let res = dispatch(&ctx, &Request::post("/vehicles/add/").form_body(posted)).await;
    assert_eq!(res.status, 302);

    let docs = ctx.store.list("vehicles").await.unwrap();
    assert_eq!(docs[0].body["active"], false);
}

#[tokio::test]
async fn test_invalid_json_post_lists_field_errors() {
    let ctx = context(AdminConfig::new()).await;

    let req = Request::post("/vehicles/add/")
        .header("Accept", "application/json")
        .form_body("registration=%3F%3F&make=Volvo&vehicle_type=hgv");
    let res = dispatch(&ctx, &req).await;

    assert_eq!(res.status, 422);
    let envelope = json_body(&res);
    assert_eq!(envelope["success"], false);
    assert!(envelope["errors"]["registration"].is_array());
    assert!(envelope["errors"]["mot_due"].is_array());
    assert!(envelope.get("data").is_none());
    assert!(ctx.store.list("vehicles").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_browser_post_shows_form_again() {
    let ctx = context(AdminConfig::new()).await;

    let posted = VALID_VEHICLE.replace("mot_due=2030-05-01", "mot_due=01%2F05%2F2030");
    let res = dispatch(&ctx, &Request::post("/vehicles/add/").form_body(posted)).await;

    assert_eq!(res.status, 422);
    let html = body(&res);
    assert!(html.contains("Please correct the errors below."));
    assert!(html.contains(r#"value="Volvo""#));
    assert!(html.contains("is-invalid"));
    assert!(ctx.store.list("vehicles").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cross_field_error_is_reported_for_the_whole_form() {
    let ctx = context(AdminConfig::new()).await;

    let req = Request::post("/training/add/")
        .header("Accept", "application/json")
        .form_body("driver_name=Tom+Reed&course=cpc&completed_on=2025-02-10&expires_on=2024-02-10");
    let res = dispatch(&ctx, &req).await;

    assert_eq!(res.status, 422);
    assert!(json_body(&res)["errors"]["__all__"].is_array());
}

#[tokio::test]
async fn test_unknown_vehicle_type_is_refused() {
    let ctx = context(AdminConfig::new()).await;

    let posted = VALID_VEHICLE.replace("vehicle_type=hgv", "vehicle_type=spaceship");
    let req = Request::post("/vehicles/add/")
        .header("Accept", "application/json")
        .form_body(posted);
    let res = dispatch(&ctx, &req).await;

    assert_eq!(res.status, 422);
    assert_eq!(json_body(&res)["errors"]["vehicle_type"][0], "Select a valid choice.");
    assert!(ctx.store.list("vehicles").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_posted_to_a_record_without_uploads_is_refused() {
    let ctx = context(AdminConfig::new()).await;

    let mut multipart = String::new();
    for pair in VALID_VEHICLE.split('&') {
        let (name, value) = pair.split_once('=').unwrap();
        let value = value.replace('+', " ");
        multipart.push_str(&format!(
            "--XyZ\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    multipart.push_str(
        "--XyZ\r\n\
Content-Disposition: form-data; name=\"photo\"; filename=\"cab.jpg\"\r\n\
Content-Type: image/jpeg\r\n\r\n\
JPEG\r\n\
--XyZ--\r\n",
    );
    let req = Request::post("/vehicles/add/")
        .header("Content-Type", "multipart/form-data; boundary=XyZ")
        .body(multipart);
    let res = dispatch(&ctx, &req).await;

    assert_eq!(res.status, 422);
    assert!(body(&res).contains("Unexpected file upload: photo."));
    assert!(ctx.store.list("vehicles").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_form_renders() {
    let ctx = context(AdminConfig::new()).await;

    let res = dispatch(&ctx, &Request::get("/working-time/add/")).await;
    assert_eq!(res.status, 200);
    let html = body(&res);
    assert!(html.contains(r#"action="/working-time/add/""#));
    assert!(html.contains(r#"name="week_commencing""#));
    assert!(html.contains("Add working time record"));
}

// =============================================================================
// Lists
// =============================================================================

#[tokio::test]
async fn test_list_search_sort_and_page() {
    let ctx = context(AdminConfig::new().page_size(2)).await;
    seed_vehicles(&ctx).await;

    let html = body(&dispatch(&ctx, &Request::get("/vehicles/?q=volvo")).await);
    assert!(html.contains("KX70 ABC"));
    assert!(html.contains("PN21 DEF"));
    assert!(!html.contains("LM19 XYZ"));

    let html = body(&dispatch(&ctx, &Request::get("/vehicles/?o=-registration")).await);
    let first = html.find("PN21 DEF").unwrap();
    let second = html.find("LM19 XYZ").unwrap();
    assert!(first < second);
    assert!(!html.contains("KX70 ABC"));

    let html = body(&dispatch(&ctx, &Request::get("/vehicles/?o=-registration&page=9")).await);
    assert!(html.contains("KX70 ABC"));
    assert!(html.contains("Showing 3"));
}

#[tokio::test]
async fn test_search_miss_and_empty_list() {
    let ctx = context(AdminConfig::new()).await;

    let html = body(&dispatch(&ctx, &Request::get("/drivers/")).await);
    assert!(html.contains("No items found."));

    seed_vehicles(&ctx).await;
    let html = body(&dispatch(&ctx, &Request::get("/vehicles/?q=daf")).await);
    assert!(html.contains("No results for"));
}

#[tokio::test]
async fn test_json_list() {
    let ctx = context(AdminConfig::new()).await;
    seed_vehicles(&ctx).await;

    let res = dispatch(
        &ctx,
        &Request::get("/vehicles/").header("Accept", "application/json"),
    )
    .await;
    assert_eq!(res.status, 200);
    let envelope = json_body(&res);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"].as_array().unwrap().len(), 3);
    assert_eq!(envelope["data"][0]["collection"], "vehicles");
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_unknown_paths_and_methods() {
    let ctx = context(AdminConfig::new()).await;

    assert_eq!(dispatch(&ctx, &Request::get("/fuel-cards/")).await.status, 404);
    assert_eq!(dispatch(&ctx, &Request::get("/vehicles/1/edit/")).await.status, 404);
    assert_eq!(dispatch(&ctx, &Request::post("/vehicles/")).await.status, 405);
    assert_eq!(
        dispatch(&ctx, &Request::new(fleet_admin::http::Method::Put, "/drivers/add/"))
            .await
            .status,
        405
    );
}

#[tokio::test]
async fn test_dashboard_counts_records() {
    let ctx = context(AdminConfig::new().site_title("Haulco")).await;
    seed_vehicles(&ctx).await;

    let html = body(&dispatch(&ctx, &Request::get("/")).await);
    assert!(html.contains("Dashboard | Haulco"));
    assert!(html.contains("3 records"));
    assert!(html.contains(r#"href="/drivers/add/""#));
    assert!(!html.contains(r#"href="/subscriptions/add/""#));
}

// =============================================================================
// Navigation flags
// =============================================================================

#[tokio::test]
async fn test_toggle_persists_in_cookie() {
    let ctx = context(AdminConfig::new()).await;

    let res = dispatch(&ctx, &Request::post("/settings/nav/").form_body("id=training")).await;
    assert_eq!(res.status, 302);
    let set_cookie = res.get_header("Set-Cookie").unwrap();
    assert!(set_cookie.starts_with("fleet_nav="));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let html = body(&dispatch(&ctx, &Request::get("/").header("Cookie", cookie)).await);
    assert!(!html.contains(r#"href="/training/""#));
    assert!(html.contains(r#"href="/vehicles/""#));
}

#[tokio::test]
async fn test_toggle_rejects_unknown_links() {
    let ctx = context(AdminConfig::new()).await;

    let res = dispatch(&ctx, &Request::post("/settings/nav/").form_body("id=fuel-cards")).await;
    assert_eq!(res.status, 400);
    assert!(res.get_header("Set-Cookie").is_none());
}

#[tokio::test]
async fn test_bad_cookie_hides_every_link() {
    let ctx = context(AdminConfig::new()).await;

    let req = Request::get("/").header("Cookie", "fleet_nav=not-json");
    let html = body(&dispatch(&ctx, &req).await);
    assert!(html.contains("All sections are hidden."));
    assert!(html.contains("Every section is hidden."));
}
