//! Router tests against [`MemoryStore`].

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode},
};
use hifz_core::kv::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, api_router};

fn app() -> Router {
  api_router(AppState::new(MemoryStore::new()))
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(body) => builder
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Create a configuration from the memorization template and return it.
async fn memorization(app: &Router, subscriber: Uuid) -> Value {
  let (status, draft) = send(
    app,
    Method::POST,
    &format!("/subscribers/{subscriber}/drafts"),
    Some(json!({ "name": "حفظ", "template": "memorization" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, config) = send(
    app,
    Method::POST,
    &format!("/subscribers/{subscriber}/configurations"),
    Some(draft),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  config
}

fn field_ids(config: &Value) -> Vec<String> {
  config["groups"]
    .as_array()
    .unwrap()
    .iter()
    .flat_map(|g| g["sub_groups"].as_array().unwrap().iter())
    .flat_map(|s| s["fields"].as_array().unwrap().iter())
    .map(|f| f["id"].as_str().unwrap().to_owned())
    .collect()
}

/// A field id → value object.
fn values(pairs: &[(&String, &str)]) -> Value {
  Value::Object(
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), Value::from(*v)))
      .collect(),
  )
}

#[tokio::test]
async fn templates_are_listed() {
  let (status, body) = send(&app(), Method::GET, "/templates", None).await;
  assert_eq!(status, StatusCode::OK);
  let keys: Vec<&str> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t["key"].as_str().unwrap())
    .collect();
  assert_eq!(keys, ["memorization", "revision"]);
}

#[tokio::test]
async fn unknown_template_is_bad_request() {
  let (status, body) = send(
    &app(),
    Method::POST,
    &format!("/subscribers/{}/drafts", Uuid::new_v4()),
    Some(json!({ "name": "x", "template": "nope" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn empty_name_is_bad_request() {
  let subscriber = Uuid::new_v4();
  let (status, _) = send(
    &app(),
    Method::POST,
    &format!("/subscribers/{subscriber}/configurations"),
    Some(json!({ "subscriber_id": subscriber, "name": " " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn import_then_save_then_lookup() {
  let app = app();
  let subscriber = Uuid::new_v4();
  let config = memorization(&app, subscriber).await;
  let id = config["id"].as_str().unwrap();
  let fields = field_ids(&config);

  let (status, report) = send(
    &app,
    Method::POST,
    &format!("/configurations/{id}/import"),
    Some(json!({ "text": "البقرة\t1\t5\tممتاز\t0\t\nالبقرة\t1\t5\tممتاز\t0" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["accepted"].as_array().unwrap().len(), 1);
  assert_eq!(
    report["failed"][0]["reason"],
    "column count mismatch, expected 6 got 5"
  );

  let (status, _) = send(
    &app,
    Method::PUT,
    &format!("/configurations/{id}/records"),
    Some(report["accepted"].clone()),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let candidate =
    values(&[(&fields[0], " البقرة "), (&fields[1], "1"), (&fields[2], "5")]);
  let (status, found) = send(
    &app,
    Method::POST,
    &format!("/configurations/{id}/lookup"),
    Some(candidate),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(found["data"][&fields[3]], "ممتاز");

  let miss =
    values(&[(&fields[0], "البقرة"), (&fields[1], "1"), (&fields[2], "6")]);
  let (_, found) = send(
    &app,
    Method::POST,
    &format!("/configurations/{id}/lookup"),
    Some(miss),
  )
  .await;
  assert!(found.is_null());

  let (_, values) = send(
    &app,
    Method::GET,
    &format!("/configurations/{id}/fields/{}/values", fields[0]),
    None,
  )
  .await;
  assert_eq!(values, json!(["البقرة"]));
}

#[tokio::test]
async fn delete_configuration_cascades() {
  let app = app();
  let subscriber = Uuid::new_v4();
  let config = memorization(&app, subscriber).await;
  let id = config["id"].as_str().unwrap();
  let fields = field_ids(&config);

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/configurations/{id}/records"),
    Some(values(&[
      (&fields[0], "البقرة"),
      (&fields[1], "1"),
      (&fields[2], "5"),
    ])),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) =
    send(&app, Method::DELETE, &format!("/configurations/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["records_removed"], 1);

  let (status, _) =
    send(&app, Method::GET, &format!("/configurations/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lesson_plan_approval_flow() {
  let app = app();
  let subscriber = Uuid::new_v4();
  let mut config = memorization(&app, subscriber).await;
  config["target_classification_ids"] = json!(["hifz"]);
  let (status, config) = send(
    &app,
    Method::POST,
    &format!("/subscribers/{subscriber}/configurations"),
    Some(config),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let fields = field_ids(&config);
  let halaqa = Uuid::new_v4();

  let (_, teacher) = send(
    &app,
    Method::POST,
    &format!("/subscribers/{subscriber}/teachers"),
    Some(json!({ "name": "خالد", "classification_id": "hifz" })),
  )
  .await;

  let (status, student) = send(
    &app,
    Method::POST,
    &format!("/subscribers/{subscriber}/students"),
    Some(json!({ "name": "أحمد", "halaqa_id": halaqa })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let mut body = json!({
    "subscriber_id": subscriber,
    "teacher_id": teacher["id"],
    "halaqa_id": halaqa,
    "plan_config_id": config["id"],
    "date": "2026-10-19",
    "values": { "not-a-field": "junk" },
  });
  let (status, _) =
    send(&app, Method::POST, "/lesson-plans", Some(body.clone())).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  body["values"] = values(&[(&fields[0], "البقرة")]);
  let (status, plan) =
    send(&app, Method::POST, "/lesson-plans", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(plan["status"], "draft");
  let pid = plan["id"].as_str().unwrap();

  let (status, _) =
    send(&app, Method::POST, &format!("/lesson-plans/{pid}/submit"), None)
      .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/lesson-plans/{pid}/reject"),
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, approved) = send(
    &app,
    Method::POST,
    &format!("/lesson-plans/{pid}/approve"),
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(approved["status"], "approved");

  let (status, _) = send(
    &app,
    Method::PUT,
    &format!("/lesson-plans/{pid}/values"),
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, copy) = send(
    &app,
    Method::POST,
    &format!("/lesson-plans/{pid}/duplicate"),
    Some(json!({ "date": "2026-10-20" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(copy["status"], "draft");
  assert_eq!(copy["values"][&fields[0]], "البقرة");
  assert!(copy["supervisor_note"].is_null());

  let (status, applied) =
    send(&app, Method::POST, &format!("/lesson-plans/{pid}/apply"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(applied[0]["student_id"], student["id"]);
}

#[tokio::test]
async fn teacher_sees_only_assigned_configurations() {
  let app = app();
  let subscriber = Uuid::new_v4();
  let config = memorization(&app, subscriber).await;

  let (_, teacher) = send(
    &app,
    Method::POST,
    &format!("/subscribers/{subscriber}/teachers"),
    Some(json!({ "name": "خالد", "classification_id": "hifz" })),
  )
  .await;
  let tid = teacher["id"].as_str().unwrap();

  let (_, none) = send(
    &app,
    Method::GET,
    &format!("/teachers/{tid}/configurations"),
    None,
  )
  .await;
  assert_eq!(none, json!([]));

  let mut assigned = config.clone();
  assigned["target_classification_ids"] = json!(["hifz"]);
  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/subscribers/{subscriber}/configurations"),
    Some(assigned),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/subscribers/{}/configurations", Uuid::new_v4()),
    Some(config.clone()),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, some) = send(
    &app,
    Method::GET,
    &format!("/teachers/{tid}/configurations"),
    None,
  )
  .await;
  assert_eq!(some[0]["id"], config["id"]);
}
