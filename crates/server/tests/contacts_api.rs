mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};
use support::spawn_app;

#[tokio::test]
async fn health_and_docs() -> anyhow::Result<()> {
    let t = spawn_app().await?;
    let (status, body) = t.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, doc) = t.get("/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/contacts"].is_object());
    Ok(())
}

#[tokio::test]
async fn contacts_crud_round() -> anyhow::Result<()> {
    let t = spawn_app().await?;

    let (status, list) = t.get("/api/contacts", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, created) = t
        .send_json("POST", "/api/contacts", None, json!({"name": "Ann", "phone": "111", "id": "client-id"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("id").to_string();
    assert_ne!(id, "client-id");
    assert_eq!(created["name"], "Ann");

    let (status, fetched) = t.get(&format!("/api/contacts/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = t
        .send_json("PUT", &format!("/api/contacts/{id}"), None, json!({"phone": "222", "id": "other"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({"id": id, "name": "Ann", "phone": "222"}));

    let (status, body) = t.send_json("DELETE", &format!("/api/contacts/{id}"), None, Value::Null).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "contact deleted"}));

    let (status, body) = t.get(&format!("/api/contacts/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
    let (status, _) = t.send_json("DELETE", &format!("/api/contacts/{id}"), None, Value::Null).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = t.send_json("PUT", &format!("/api/contacts/{id}"), None, json!({"name": "x"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn contacts_reject_empty_bodies() -> anyhow::Result<()> {
    let t = spawn_app().await?;
    let (status, body) = t.send_json("POST", "/api/contacts", None, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "missing fields");

    let (status, _) = t.send_json("POST", "/api/contacts", None, json!(["not", "an", "object"])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, created) = t.send_json("POST", "/api/contacts", None, json!({"name": "Bo"})).await?;
    let id = created["id"].as_str().expect("id");
    let (status, body) = t.send_json("PUT", &format!("/api/contacts/{id}"), None, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "missing fields");
    Ok(())
}

#[tokio::test]
async fn contacts_keep_insertion_order_on_disk() -> anyhow::Result<()> {
    let t = spawn_app().await?;
    for name in ["a", "b", "c"] {
        let (status, _) = t.send_json("POST", "/api/contacts", None, json!({ "name": name })).await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    let raw = std::fs::read_to_string(t.dir.join("data").join("contacts.json"))?;
    let on_disk: Vec<Value> = serde_json::from_str(&raw)?;
    let names: Vec<&str> = on_disk.iter().filter_map(|c| c["name"].as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);

    let (_, listed) = t.get("/api/contacts", None).await?;
    assert_eq!(listed, Value::Array(on_disk));
    Ok(())
}
