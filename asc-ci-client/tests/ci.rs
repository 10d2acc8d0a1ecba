mod common;

use asc_ci_client::{
    ci::TESTFLIGHT_INTERNAL_TESTERS,
    resources::{CiBuildActionAttributes, CompletionStatus, ExecutionProgress},
    Error, Selector,
};
use serde_json::json;

use common::{route, StubServer};

fn products() -> serde_json::Value {
    json!({
        "data": [
            { "type": "ciProducts", "id": "prod-1", "attributes": { "name": "HeadshotAirBattle", "productType": "APP" } },
            { "type": "ciProducts", "id": "prod-2", "attributes": { "name": "Companion", "productType": "APP" } }
        ]
    })
}

fn workflows() -> serde_json::Value {
    json!({
        "data": [
            { "type": "ciWorkflows", "id": "wf-1", "attributes": { "name": "Default", "isEnabled": true } },
            { "type": "ciWorkflows", "id": "wf-2", "attributes": { "name": "Release", "isEnabled": false } }
        ]
    })
}

#[test]
fn test_select_workflow_by_name() {
    let server = StubServer::start(vec![
        route("GET", "/v1/ciProducts", 200, products()),
        route("GET", "/v1/ciProducts/prod-2/workflows", 200, workflows()),
    ]);
    let client = server.client();

    let (product, workflow) = client
        .select_workflow(
            &Selector::Match("Companion".into()),
            &Selector::Match("Release".into()),
        )
        .unwrap();

    assert_eq!(product.id, "prod-2");
    assert_eq!(workflow.id, "wf-2");
    assert_eq!(workflow.attrs().is_enabled, Some(false));
}

#[test]
fn test_select_workflow_first_and_missing() {
    let server = StubServer::start(vec![
        route("GET", "/v1/ciProducts", 200, products()),
        route("GET", "/v1/ciProducts/prod-1/workflows", 200, workflows()),
    ]);
    let client = server.client();

    let (product, workflow) = client
        .select_workflow(&Selector::First, &Selector::First)
        .unwrap();
    assert_eq!(product.id, "prod-1");
    assert_eq!(workflow.id, "wf-1");

    let err = client
        .select_workflow(&Selector::First, &Selector::Match("Nightly".into()))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "workflow", .. }));
}

#[test]
fn test_list_build_runs_query() {
    let server = StubServer::start(vec![route(
        "GET",
        "/v1/ciWorkflows/wf-1/buildRuns",
        200,
        json!({
            "data": [{
                "type": "ciBuildRuns",
                "id": "run-30",
                "attributes": {
                    "number": 30,
                    "executionProgress": "COMPLETE",
                    "completionStatus": "SUCCEEDED",
                    "startedDate": "2024-03-01T10:00:00.000Z",
                    "finishedDate": "2024-03-01T10:15:00.000Z"
                }
            }]
        }),
    )]);
    let client = server.client();

    let runs = client.list_build_runs("wf-1", 10).unwrap();

    let request = server.next_request();
    assert_eq!(request.url, "/v1/ciWorkflows/wf-1/buildRuns?limit=10&sort=-number");

    assert_eq!(runs.len(), 1);
    let attrs = runs[0].attrs();
    assert_eq!(attrs.number, Some(30));
    assert_eq!(attrs.execution_progress, Some(ExecutionProgress::Complete));
    assert_eq!(attrs.completion_status, Some(CompletionStatus::Succeeded));
    assert_eq!(attrs.duration_minutes(), Some(15.0));
}

#[test]
fn test_start_build_run_on_branch() {
    let server = StubServer::start(vec![
        route(
            "GET",
            "/v1/scmRepositories/repo-1/gitReferences",
            200,
            json!({
                "data": [
                    { "type": "scmGitReferences", "id": "ref-old", "attributes": { "name": "main", "canonicalName": "refs/heads/main", "isDeleted": true } },
                    { "type": "scmGitReferences", "id": "ref-tag", "attributes": { "name": "v1.0", "canonicalName": "refs/tags/v1.0", "isDeleted": false } },
                    { "type": "scmGitReferences", "id": "ref-main", "attributes": { "name": "main", "canonicalName": "refs/heads/main", "isDeleted": false } }
                ]
            }),
        ),
        route(
            "POST",
            "/v1/ciBuildRuns",
            201,
            json!({ "data": { "type": "ciBuildRuns", "id": "run-31", "attributes": { "number": 31 } } }),
        ),
    ]);
    let client = server.client();

    let reference = client.find_git_reference("repo-1", "main").unwrap();
    assert_eq!(reference.id, "ref-main");
    server.next_request();

    let run = client.start_build_run("wf-1", Some(&reference.id)).unwrap();
    assert_eq!(run.id, "run-31");
    assert_eq!(run.attrs().number, Some(31));

    let request = server.next_request();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.body_json(),
        json!({
            "data": {
                "type": "ciBuildRuns",
                "relationships": {
                    "sourceBranchOrTag": { "data": { "type": "scmGitReferences", "id": "ref-main" } },
                    "workflow": { "data": { "type": "ciWorkflows", "id": "wf-1" } }
                }
            }
        })
    );

    let err = client.find_git_reference("repo-1", "develop").unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "git reference", .. }));
}

#[test]
fn test_set_workflow_repository() {
    let server = StubServer::start(vec![route(
        "PATCH",
        "/v1/ciWorkflows/wf-1",
        200,
        json!({
            "data": {
                "type": "ciWorkflows",
                "id": "wf-1",
                "relationships": { "repository": { "data": { "type": "scmRepositories", "id": "repo-2" } } }
            }
        }),
    )]);
    let client = server.client();

    let workflow = client.set_workflow_repository("wf-1", "repo-2").unwrap();
    assert_eq!(workflow.related_id("repository"), Some("repo-2"));

    assert_eq!(
        server.next_request().body_json(),
        json!({
            "data": {
                "type": "ciWorkflows",
                "id": "wf-1",
                "relationships": { "repository": { "data": { "type": "scmRepositories", "id": "repo-2" } } }
            }
        })
    );
}

#[test]
fn test_create_build_action_and_test_destination() {
    let server = StubServer::start(vec![
        route("POST", "/v1/ciBuildActions", 201, json!({ "data": { "type": "ciBuildActions", "id": "act-1" } })),
        route("POST", "/v1/ciTestDestinations", 409, json!({ "errors": [{ "status": "409" }] })),
    ]);
    let client = server.client();

    let action = client
        .create_build_action(
            "wf-1",
            CiBuildActionAttributes {
                name: Some("Archive - iOS".into()),
                action_type: Some("ARCHIVE".into()),
                platform: Some("IOS".into()),
                build_distribution_audience: Some("APP_STORE_ELIGIBLE".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(action.id, "act-1");
    assert_eq!(
        server.next_request().body_json()["data"]["attributes"],
        json!({
            "name": "Archive - iOS",
            "actionType": "ARCHIVE",
            "platform": "IOS",
            "buildDistributionAudience": "APP_STORE_ELIGIBLE"
        })
    );

    let err = client
        .create_test_destination("wf-1", TESTFLIGHT_INTERNAL_TESTERS)
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(
        server.next_request().body_json()["data"]["attributes"]["destination"],
        "TESTFLIGHT_INTERNAL_TESTERS"
    );
}

#[test]
fn test_list_apps_by_bundle_id() {
    let server = StubServer::start(vec![route(
        "GET",
        "/v1/apps",
        200,
        json!({
            "data": [{
                "type": "apps",
                "id": "1234567890",
                "attributes": { "name": "HeadshotAirBattle", "bundleId": "com.headshotairbattle", "sku": "HAB001" }
            }]
        }),
    )]);
    let client = server.client();

    let apps = client.list_apps(Some("com.headshotairbattle")).unwrap();
    assert_eq!(apps[0].attrs().bundle_id.as_deref(), Some("com.headshotairbattle"));
    assert_eq!(
        server.next_request().url,
        "/v1/apps?filter%5BbundleId%5D=com.headshotairbattle"
    );
}

#[test]
fn test_list_apps_bundle_id_is_encoded() {
    let server = StubServer::start(vec![route("GET", "/v1/apps", 200, json!({ "data": [] }))]);
    let client = server.client();

    let apps = client.list_apps(Some("com.a&limit=1#b")).unwrap();
    assert!(apps.is_empty());
    assert_eq!(
        server.next_request().url,
        "/v1/apps?filter%5BbundleId%5D=com.a%26limit%3D1%23b"
    );
}
