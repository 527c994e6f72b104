//! HTTP tests for leads, history, chat, the dashboard and uploads.

mod common;

use axum::body::{Body, HttpBody};
use axum::http::{Request, StatusCode, header};
use common::*;
use leadflow_server::ServerConfig;
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};

fn new_lead(contact: &str) -> Value {
    json!({
        "contactNumber": contact,
        "firstName": "Asha",
        "city": "Pune",
        "leadSource": "Website",
        "leadMode": "ONLINE"
    })
}

async fn create_lead(app: &axum::Router, token: &str, contact: &str) -> Value {
    let response = send(
        app,
        json_request("POST", "/api/leads", Some(token), &new_lead(contact)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Lead created successfully");
    body["data"].clone()
}

#[tokio::test]
async fn create_get_update_delete_round() {
    let app = app().await;
    let token = login(&app, DA, PASSWORD).await;

    let lead = create_lead(&app, &token, "9800000001").await;
    let id = lead["id"].as_str().unwrap().to_string();
    assert_eq!(lead["status"], "NEW");
    assert_eq!(lead["leadMode"], "ONLINE");

    let response = send(&app, get(&format!("/api/leads/{id}"), Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"]["contactNumber"], "9800000001");

    let mut update = new_lead("9800000001");
    update["city"] = json!("Mumbai");
    update["status"] = json!("QUALIFIED");
    let response = send(
        &app,
        json_request("PUT", &format!("/api/leads/{id}"), Some(&token), &update),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Lead updated successfully");
    assert_eq!(body["data"]["city"], "Mumbai");
    assert_eq!(body["data"]["status"], "QUALIFIED");

    let response = send(&app, delete(&format!("/api/leads/{id}"), &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"], "Lead deleted");

    let response = send(&app, get(&format!("/api/leads/{id}"), Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["message"], "Lead not found");

    let response = send(
        &app,
        get(&format!("/api/leads/{id}/modifications"), Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = read_json(response).await["data"].clone();
    let fields: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["modifiedField"].as_str().unwrap())
        .collect();
    assert_eq!(fields.first(), Some(&"DELETED"));
    assert_eq!(fields.last(), Some(&"CREATED"));
    assert!(fields.contains(&"city"));
    assert!(fields.contains(&"status"));
    assert!(history.as_array().unwrap().iter().all(|m| m["modifiedBy"] == DA));
}

#[tokio::test]
async fn duplicate_contact_number_is_409() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;
    create_lead(&app, &token, "9800000002").await;

    let response = send(
        &app,
        json_request("POST", "/api/leads", Some(&token), &new_lead("9800000002")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["success"], false);
}

#[tokio::test]
async fn missing_required_field_is_400() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/leads",
            Some(&token),
            &json!({ "contactNumber": "", "firstName": "Asha" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_id_is_400() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;
    let response = send(&app, get("/api/leads/not-a-uuid", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filters_by_status_city_and_date() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;
    create_lead(&app, &token, "9800000003").await;

    let response = send(
        &app,
        get("/api/leads/filter/status?status=new", Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Leads filtered by status");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = send(
        &app,
        get("/api/leads/filter/status?status=WON", Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, get("/api/leads/filter/city?city=Pune", Some(&token))).await;
    assert_eq!(read_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = send(
        &app,
        get(
            "/api/leads/filter/date?fromDate=2000-01-01T00:00:00Z&toDate=2999-12-31T23:59:59Z",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = send(
        &app,
        get(
            "/api/leads/filter/date?fromDate=2999-01-01T00:00:00&toDate=2000-01-01T00:00:00",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_send_and_history() {
    let app = app().await;
    let token = login(&app, DA, PASSWORD).await;
    let lead = create_lead(&app, &token, "9800000004").await;
    let id = lead["id"].as_str().unwrap();

    for text in ["first", "second"] {
        let response = send(
            &app,
            json_request(
                "POST",
                &format!("/api/chat/{id}"),
                Some(&token),
                &json!({ "message": text }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Message sent successfully");
        assert_eq!(body["data"]["sender"], DA);
    }

    let response = send(&app, get(&format!("/api/chat/{id}"), Some(&token))).await;
    let body = read_json(response).await;
    let messages: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, ["first", "second"]);

    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/chat/{id}"),
            Some(&token),
            &json!({ "message": "   " }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_counts_current_month() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;
    let lead = create_lead(&app, &token, "9800000005").await;
    create_lead(&app, &token, "9800000006").await;

    let mut qualified = new_lead("9800000005");
    qualified["status"] = json!("QUALIFIED");
    let id = lead["id"].as_str().unwrap();
    let response = send(
        &app,
        json_request("PUT", &format!("/api/leads/{id}"), Some(&token), &qualified),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get("/api/dashboard", Some(&token))).await;
    let body = read_json(response).await;
    assert_eq!(body["message"], "Dashboard stats retrieved successfully");
    assert_eq!(body["data"]["totalLeads"], 2);
    assert_eq!(body["data"]["qualifiedLeads"], 1);
    assert_eq!(body["data"]["pendingLeads"], 1);
    assert_eq!(body["data"]["conversionRate"], 50.0);
    assert_eq!(body["data"]["sourceDistribution"]["Website"], 2);
}

fn spreadsheet() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows = [
        ["contactNumber", "firstName", "city"],
        ["9700000001", "Ravi", "Nashik"],
        ["9700000002", "Meera", "Pune"],
        ["9700000001", "Dup", "Pune"],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn multipart(field: &str, bytes: &[u8], token: &str) -> Request<Body> {
    let boundary = "leadflow-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"leads.xlsx\"\r\nContent-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_imports_rows_and_reports_failures() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;

    let response = send(&app, multipart("file", &spreadsheet(), &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File uploaded successfully. 3 records processed.");
    assert_eq!(body["data"]["totalRecords"], 3);
    assert_eq!(body["data"]["successfulRecords"], 2);
    assert_eq!(body["data"]["failedRecords"], 1);

    let response = send(&app, get("/api/leads", Some(&token))).await;
    assert_eq!(read_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn upload_without_file_field_is_400() {
    let app = app().await;
    let token = login(&app, HO, PASSWORD).await;
    let response = send(&app, multipart("other", b"ignored", &token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_requires_authentication() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversize_upload_is_413_in_the_envelope() {
    let app = app_with(ServerConfig {
        max_upload_bytes: 1024,
        ..test_config()
    })
    .await;
    let token = login(&app, HO, PASSWORD).await;

    let mut request = multipart("file", &[0u8; 4096], &token);
    let length = request.body().size_hint().exact().unwrap();
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, length.into());

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Uploaded file exceeds the maximum allowed size");
}
