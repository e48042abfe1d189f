use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;

mod common;

// ============================================================================
// Credential gate
// ============================================================================

#[tokio::test]
async fn test_missing_api_key_issues_zero_gateway_calls() {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = common::unconfigured_client_for(&server);
    let reply = common::call(&client, "list_experiments", json!({})).await;

    assert!(!reply.is_error);
    assert!(reply.text.contains("ELABFTW_API_KEY"));
    list_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_guidance_tool_needs_no_key_and_no_network() {
    let server = MockServer::start_async().await;
    let client = common::unconfigured_client_for(&server);

    let reply = common::call(&client, "lab_prompt_elabftw", json!({})).await;

    assert!(!reply.is_error);
    assert!(reply.text.contains("lab assistant"));
}

// ============================================================================
// Argument validation and clamping
// ============================================================================

#[tokio::test]
async fn test_limit_above_ceiling_is_clamped_on_the_wire() {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/experiments")
                .query_param("limit", "100")
                .query_param("offset", "0");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "list_experiments", json!({ "limit": 500 })).await;

    assert!(!reply.is_error);
    assert!(reply.text.starts_with("Found 0 experiments"));
    list_mock.assert_async().await;
}

#[tokio::test]
async fn test_update_with_no_fields_fails_before_any_network_call() {
    let server = MockServer::start_async().await;
    let patch_mock = server
        .mock_async(|when, then| {
            when.method(PATCH).path("/experiments/7");
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "update_experiment", json!({ "experiment_id": 7 })).await;

    assert!(reply.is_error);
    assert!(reply.text.contains("At least one field"));
    patch_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_missing_required_argument_names_the_key() {
    let server = MockServer::start_async().await;
    let client = common::client_for(&server);

    let reply = common::call(&client, "get_item", json!({})).await;

    assert!(reply.is_error);
    assert_eq!(reply.text, "Missing required argument: item_id");
}

#[tokio::test]
async fn test_unknown_tool_is_an_informative_reply() {
    let server = MockServer::start_async().await;
    let client = common::client_for(&server);

    let reply = common::call(&client, "definitely_not_a_tool", json!({})).await;

    assert!(!reply.is_error);
    assert_eq!(reply.text, "Unknown tool: definitely_not_a_tool");
}

// ============================================================================
// Two-step create commit (Location header round-trip)
// ============================================================================

#[tokio::test]
async fn test_create_experiment_round_trips_the_location_id() {
    let server = MockServer::start_async().await;
    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/experiments");
            then.status(201)
                .header("Location", "https://lab.example.com/api/v2/experiments/42");
        })
        .await;
    let get_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments/42");
            then.status(200)
                .json_body(json!({ "id": 42, "title": "Calibration run" }));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(
        &client,
        "create_experiment",
        json!({ "title": "Calibration run" }),
    )
    .await;

    assert!(!reply.is_error);
    assert!(reply.text.starts_with("Successfully created experiment"));
    assert!(reply.text.contains("\"id\": 42"));
    post_mock.assert_async().await;
    get_mock.assert_async().await;
}

#[tokio::test]
async fn test_create_without_location_header_is_a_degraded_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/experiments");
            then.status(201);
        })
        .await;
    let get_mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/experiments/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "create_experiment", json!({ "title": "Orphan" })).await;

    assert!(!reply.is_error);
    assert!(reply.text.contains("did not return its id"));
    get_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_create_item_patches_title_then_materializes() {
    let server = MockServer::start_async().await;
    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/items")
                .json_body(json!({ "category_id": 3 }));
            then.status(201)
                .header("Location", "https://lab.example.com/api/v2/items/7");
        })
        .await;
    let patch_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/items/7")
                .json_body(json!({ "title": "EtOH 96%", "body": "flammable" }));
            then.status(200).json_body(json!({}));
        })
        .await;
    let get_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/items/7");
            then.status(200)
                .json_body(json!({ "id": 7, "title": "EtOH 96%" }));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(
        &client,
        "create_item",
        json!({ "category": 3, "title": "EtOH 96%", "body": "flammable" }),
    )
    .await;

    assert!(!reply.is_error);
    assert!(reply.text.contains("Successfully created item with ID 7"));
    post_mock.assert_async().await;
    patch_mock.assert_async().await;
    get_mock.assert_async().await;
}

// ============================================================================
// Best-effort tag attachment
// ============================================================================

#[tokio::test]
async fn test_one_failed_tag_does_not_fail_the_creation() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/experiments");
            then.status(201)
                .header("Location", "https://lab.example.com/api/v2/experiments/42");
        })
        .await;
    let good_tag_a = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/experiments/42/tags")
                .json_body(json!({ "tag": "pcr" }));
            then.status(201);
        })
        .await;
    let conflicting_tag = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/experiments/42/tags")
                .json_body(json!({ "tag": "duplicate" }));
            then.status(409).body("tag already exists");
        })
        .await;
    let good_tag_b = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/experiments/42/tags")
                .json_body(json!({ "tag": "biophysics" }));
            then.status(201);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments/42");
            then.status(200)
                .json_body(json!({ "id": 42, "title": "Tagged run" }));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(
        &client,
        "create_experiment",
        json!({ "title": "Tagged run", "tags": ["pcr", "duplicate", "biophysics"] }),
    )
    .await;

    // The conflict is suppressed: creation still reports success and the
    // failure stays out of the primary response text.
    assert!(!reply.is_error);
    assert!(reply.text.starts_with("Successfully created experiment"));
    assert!(!reply.text.contains("already exists"));
    assert!(!reply.text.contains("409"));
    good_tag_a.assert_async().await;
    conflicting_tag.assert_async().await;
    good_tag_b.assert_async().await;
}

#[tokio::test]
async fn test_failed_tag_attachments_are_recorded_as_suppressed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/experiments");
            then.status(201)
                .header("Location", "https://lab.example.com/api/v2/experiments/42");
        })
        .await;
    for tag in ["pcr", "biophysics"] {
        server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path("/experiments/42/tags")
                    .json_body(json!({ "tag": tag }));
                then.status(201);
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/experiments/42/tags")
                .json_body(json!({ "tag": "duplicate" }));
            then.status(409).body("tag already exists");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments/42");
            then.status(200).json_body(json!({ "id": 42 }));
        })
        .await;

    let client = common::client_for(&server);
    let outcome = client
        .create_experiment(elabftw_mcp::gateway::NewExperiment {
            title: "Tagged run".to_string(),
            tags: vec![
                "pcr".to_string(),
                "duplicate".to_string(),
                "biophysics".to_string(),
            ],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.id, Some(42));
    assert_eq!(outcome.suppressed.len(), 1);
    assert!(outcome.suppressed[0].starts_with("tag 'duplicate':"));
    assert!(outcome.suppressed[0].contains("409"));
}

// ============================================================================
// Error surfacing
// ============================================================================

#[tokio::test]
async fn test_remote_404_keeps_status_and_body_verbatim() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments/999");
            then.status(404).body("Nothing to show with this id");
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "get_experiment", json!({ "experiment_id": 999 })).await;

    assert!(reply.is_error);
    assert!(reply.text.contains("404"));
    assert!(reply.text.contains("Nothing to show with this id"));
    assert!(reply.text.starts_with("Error communicating with eLabFTW"));
}

#[tokio::test]
async fn test_transport_failure_wording_differs_from_http_failure() {
    let client = common::unreachable_client();
    let reply = common::call(&client, "get_experiment", json!({ "experiment_id": 1 })).await;

    assert!(reply.is_error);
    assert!(reply.text.starts_with("Error connecting to eLabFTW server"));
    assert!(reply.text.contains("ELABFTW_VERIFY_SSL"));
    assert!(!reply.text.starts_with("Error communicating with eLabFTW"));
}

// ============================================================================
// Listing projections and composite reads
// ============================================================================

#[tokio::test]
async fn test_list_experiments_projects_to_summary_fields() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments");
            then.status(200).json_body(json!([{
                "id": 12,
                "title": "PCR run",
                "created_at": "2024-01-15 09:00:00",
                "modified_at": "2024-01-16 10:00:00",
                "category": 3,
                "status": 1,
                "userid": 2,
                "fullname": "Ada Lovelace",
                "body": "<p>very long body</p>"
            }]));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "list_experiments", json!({})).await;

    assert!(reply.text.starts_with("Found 1 experiments"));
    assert!(reply.text.contains("\"owner_name\": \"Ada Lovelace\""));
    assert!(!reply.text.contains("very long body"));
}

#[tokio::test]
async fn test_get_bookable_items_filters_and_fans_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/items");
            then.status(200).json_body(json!([
                { "id": 5, "title": "Laser", "is_bookable": 1 },
                { "id": 6, "title": "Notebook", "is_bookable": 0 }
            ]));
        })
        .await;
    let detail_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/items/5");
            then.status(200).json_body(json!({
                "id": 5,
                "title": "Laser",
                "category_title": "Setups",
                "book_max_minutes": 120,
                "book_is_cancellable": 1
            }));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "get_bookable_items", json!({})).await;

    assert!(!reply.is_error);
    assert!(reply.text.starts_with("Found 1 bookable items"));
    assert!(reply.text.contains("\"max_duration_minutes\": 120"));
    detail_mock.assert_async().await;
}

#[tokio::test]
async fn test_create_booking_without_location_reports_plain_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/events");
            then.status(201);
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(
        &client,
        "create_booking",
        json!({
            "item_id": 5,
            "start": "2024-01-15T09:00:00",
            "end": "2024-01-15T17:00:00"
        }),
    )
    .await;

    assert!(!reply.is_error);
    assert!(reply.text.contains("Booking created successfully"));
}

#[tokio::test]
async fn test_set_experiment_status_patches_then_reads_back() {
    let server = MockServer::start_async().await;
    let patch_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/experiments/7")
                .json_body(json!({ "status": 2 }));
            then.status(200).json_body(json!({}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/experiments/7");
            then.status(200).json_body(json!({ "id": 7, "status": 2 }));
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(
        &client,
        "set_experiment_status",
        json!({ "experiment_id": 7, "status_id": 2 }),
    )
    .await;

    assert!(!reply.is_error);
    assert!(reply
        .text
        .starts_with("Successfully updated status for experiment 7"));
    patch_mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_item_reports_success_message() {
    let server = MockServer::start_async().await;
    let delete_mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/items/9");
            then.status(204);
        })
        .await;

    let client = common::client_for(&server);
    let reply = common::call(&client, "delete_item", json!({ "item_id": 9 })).await;

    assert!(!reply.is_error);
    assert!(reply.text.contains("Item 9 has been deleted"));
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn test_link_item_rejects_invalid_link_type() {
    let server = MockServer::start_async().await;
    let client = common::client_for(&server);

    let reply = common::call(
        &client,
        "link_item",
        json!({ "experiment_id": 1, "link_id": 2, "link_type": "bananas" }),
    )
    .await;

    assert!(reply.is_error);
    assert!(reply.text.contains("link_type must be"));
}
