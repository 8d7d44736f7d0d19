//! Integration tests for the Airflow client against a mock HTTP server.

use airflow_client::{AirflowClient, Error, PoolRequest, TriggerDagRunRequest, Variable};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AirflowClient {
    AirflowClient::builder()
        .base_url(server.uri())
        .basic_auth("admin", "admin")
        .build()
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// DAG runs
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_trigger_dag_run_posts_conf() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/dags/sales_etl/dagRuns"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .and(body_json(json!({"dag_run_id": "run-1", "conf": {"region": "eu"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dag_run_id": "run-1",
            "dag_id": "sales_etl",
            "state": "queued",
            "conf": {"region": "eu"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = TriggerDagRunRequest {
        dag_run_id: Some("run-1".to_string()),
        ..Default::default()
    };
    request.conf.insert("region".to_string(), json!("eu"));

    let run = client_for(&server)
        .dag_runs()
        .trigger("sales_etl", &request)
        .await
        .unwrap();
    assert_eq!(run.dag_run_id.as_deref(), Some("run-1"));
    assert_eq!(run.state.as_deref(), Some("queued"));
}

#[tokio::test]
async fn test_get_dag_run_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dags/sales_etl/dagRuns/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "about:blank",
            "title": "DAGRun not found",
            "status": 404,
            "detail": "DAGRun with DAG ID: 'sales_etl' and DagRun ID: 'gone' not found"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .dag_runs()
        .get("sales_etl", "gone")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("DagRun ID: 'gone'"));
}

#[tokio::test]
async fn test_conflict_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/dags/sales_etl/dagRuns"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "title": "Conflict",
            "status": 409,
            "detail": "DAGRun with DAG ID: 'sales_etl' and DAGRun ID: 'dup' already exists"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .dag_runs()
        .trigger("sales_etl", &TriggerDagRunRequest::default())
        .await
        .unwrap_err();
    match err {
        Error::Api { status, title, .. } => {
            assert_eq!(status, 409);
            assert_eq!(title, "Conflict");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dags/secret"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client_for(&server).dags().get("secret").await.unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = AirflowClient::builder()
        .base_url("http://127.0.0.1:9")
        .build()
        .unwrap();
    let err = client.dags().get("any").await.unwrap_err();
    assert!(err.is_transport());
}

// ─────────────────────────────────────────────────────────────────────────────
// DAGs / variables / pools
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pause_dag_sends_update_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/dags/sales_etl"))
        .and(query_param("update_mask", "is_paused"))
        .and(body_json(json!({"is_paused": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dag_id": "sales_etl",
            "is_paused": true,
            "is_active": true,
            "is_subdag": false,
            "fileloc": "/dags/sales.py",
            "file_token": "abc",
            "description": null,
            "root_dag_id": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dag = client_for(&server)
        .dags()
        .set_paused("sales_etl", true)
        .await
        .unwrap();
    assert_eq!(dag.is_paused, Some(true));
    assert_eq!(dag.fileloc, "/dags/sales.py");
}

#[tokio::test]
async fn test_bearer_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/variables/region"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"key": "region", "value": "eu"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AirflowClient::builder()
        .base_url(server.uri())
        .bearer_token("tok-123")
        .build()
        .unwrap();
    let variable = client.variables().get("region").await.unwrap();
    assert_eq!(
        variable,
        Variable {
            key: "region".to_string(),
            value: "eu".to_string(),
            description: None,
        }
    );
}

#[tokio::test]
async fn test_delete_pool_success_and_missing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/pools/etl"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/pools/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pools = client_for(&server).pools();
    pools.delete("etl").await.unwrap();
    let err = pools.delete("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_pool_sends_slots_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/pools/etl"))
        .and(query_param("update_mask", "slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "etl",
            "slots": 8,
            "occupied_slots": 1,
            "used_slots": 1,
            "queued_slots": 0,
            "open_slots": 7
        })))
        .mount(&server)
        .await;

    let pool = client_for(&server)
        .pools()
        .update(
            "etl",
            &PoolRequest {
                name: "etl".to_string(),
                slots: 8,
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(pool.open_slots, 7);
}
