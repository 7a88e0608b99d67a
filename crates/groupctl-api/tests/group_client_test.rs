// Integration tests for `GroupServiceClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupctl_api::types::CreateGroupBody;
use groupctl_api::types::MemberIds;
use groupctl_api::{
    Error, GetQuery, GroupCollection, GroupPatchBody, GroupServiceClient, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GroupServiceClient) {
    let server = MockServer::start().await;
    let client = GroupServiceClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_owned()).collect()
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_host_groups_with_members() {
    let (server, client) = setup().await;

    let body = json!({
        "result": [
            {
                "groupid": "1",
                "name": "Linux servers",
                "hosts": [
                    { "hostid": "10084", "name": "web-01" },
                    { "hostid": "10085" }
                ],
                "subgroups": ["Linux servers/Web"],
                "permissions": ["Read"]
            },
            { "groupid": "2", "name": "Empty", "member_count": 0 }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/hostgroups/get"))
        .and(body_json(json!({
            "sortfield": "name",
            "sortorder": "ASC",
            "selectHosts": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let query = GetQuery::with_members(GroupCollection::HostGroups);
    let groups = client
        .list_groups("prod", GroupCollection::HostGroups, &query)
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group_id, "1");
    let hosts = groups[0].hosts.as_ref().unwrap();
    assert_eq!(hosts[0].id, "10084");
    assert_eq!(hosts[0].name.as_deref(), Some("web-01"));
    assert_eq!(hosts[1].name, None);
    assert_eq!(groups[0].subgroups, vec!["Linux servers/Web".to_owned()]);
    assert_eq!(groups[1].member_count, Some(0));
    assert!(groups[1].permissions.is_empty());
}

#[tokio::test]
async fn test_template_member_alias() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/templategroups/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{
                "groupid": "7",
                "name": "Templates/OS",
                "templates": [{ "templateid": "10001", "name": "Linux by agent" }]
            }]
        })))
        .mount(&server)
        .await;

    let query = GetQuery::with_members(GroupCollection::TemplateGroups);
    let groups = client
        .list_groups("prod", GroupCollection::TemplateGroups, &query)
        .await
        .unwrap();

    assert_eq!(groups[0].templates.as_ref().unwrap()[0].id, "10001");
}

#[tokio::test]
async fn test_create_group_sends_member_ids() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/hostgroups/create"))
        .and(body_json(json!({
            "name": "Databases",
            "permissions": ["Read-write"],
            "hostids": ["10084", "10085"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "groupid": "12", "name": "Databases", "permissions": ["Read-write"] }
        })))
        .mount(&server)
        .await;

    let body = CreateGroupBody {
        name: "Databases".into(),
        description: None,
        permissions: ids(&["Read-write"]),
        members: MemberIds::for_collection(GroupCollection::HostGroups, ids(&["10084", "10085"])),
    };
    let created = client
        .create_group("prod", GroupCollection::HostGroups, &body)
        .await
        .unwrap();

    assert_eq!(created.group_id, "12");
    assert_eq!(created.permissions, ids(&["Read-write"]));
}

#[tokio::test]
async fn test_update_flattens_patch_next_to_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/hostgroups/update"))
        .and(body_json(json!({ "id": "12", "name": "DB" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "groupid": "12", "name": "DB" }
        })))
        .mount(&server)
        .await;

    let patch = GroupPatchBody {
        name: Some("DB".into()),
        ..GroupPatchBody::default()
    };
    let updated = client
        .update_group("prod", GroupCollection::HostGroups, "12", &patch)
        .await
        .unwrap();

    assert_eq!(updated.name, "DB");
}

#[tokio::test]
async fn test_delete_sends_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/hostgroups/delete"))
        .and(body_json(json!(["1", "2"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "groupids": ["1", "2"] }
        })))
        .mount(&server)
        .await;

    let result = client
        .delete_groups("prod", GroupCollection::HostGroups, &ids(&["1", "2"]))
        .await
        .unwrap();

    assert_eq!(result.groupids, Some(ids(&["1", "2"])));
}

#[tokio::test]
async fn test_mass_remove_uses_template_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/templategroups/massremove"))
        .and(body_json(json!({
            "groupids": ["7"],
            "templateids": ["10001"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "groupids": ["7"] }
        })))
        .mount(&server)
        .await;

    client
        .mass_remove(
            "prod",
            GroupCollection::TemplateGroups,
            &ids(&["7"]),
            &ids(&["10001"]),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_propagate_wraps_permissions_in_patch() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/hostgroups/propagate"))
        .and(body_json(json!({
            "ids": ["1", "2"],
            "patch": { "permissions": ["Read"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "groupids": ["1", "2"] }
        })))
        .mount(&server)
        .await;

    let result = client
        .propagate(
            "prod",
            GroupCollection::HostGroups,
            &ids(&["1", "2"]),
            &ids(&["Read"]),
        )
        .await
        .unwrap();

    assert_eq!(result.groupids.unwrap().len(), 2);
}

#[tokio::test]
async fn test_bearer_token_header() {
    let server = MockServer::start().await;
    let token = SecretString::from("s3cret".to_owned());
    let client =
        GroupServiceClient::from_token(&server.uri(), &token, &TransportConfig::default())
            .unwrap();

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client
        .list_groups("prod", GroupCollection::HostGroups, &GetQuery::default())
        .await
        .unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_project_id_is_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/team%2Fa/hostgroups/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_groups("team/a", GroupCollection::HostGroups, &GetQuery::default())
        .await
        .unwrap();
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_error_envelope_with_http_200() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/prod/hostgroups/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "code": -32602,
                "message": "Invalid params.",
                "data": "Host group \"Databases\" already exists."
            }
        })))
        .mount(&server)
        .await;

    let body = CreateGroupBody {
        name: "Databases".into(),
        description: None,
        permissions: Vec::new(),
        members: MemberIds::default(),
    };
    let err = client
        .create_group("prod", GroupCollection::HostGroups, &body)
        .await
        .unwrap_err();

    match err {
        Error::Remote {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 200);
            assert_eq!(code, Some(-32602));
            assert!(message.contains("already exists"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client
        .list_groups("prod", GroupCollection::HostGroups, &GetQuery::default())
        .await
        .unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_session_error_envelope_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "code": -32602,
                "message": "Invalid params.",
                "data": "Session terminated, re-login, please."
            }
        })))
        .mount(&server)
        .await;

    let err = client
        .list_groups("prod", GroupCollection::HostGroups, &GetQuery::default())
        .await
        .unwrap_err();

    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client
        .delete_groups("prod", GroupCollection::HostGroups, &ids(&["1"]))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    match err {
        Error::Remote { status, message, .. } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": -32500, "message": "No such project." }
        })))
        .mount(&server)
        .await;

    let err = client
        .list_groups("nope", GroupCollection::HostGroups, &GetQuery::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client
        .list_groups("prod", GroupCollection::HostGroups, &GetQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Deserialization { .. }));
}

#[test]
fn test_invalid_base_url() {
    let err = GroupServiceClient::from_reqwest("not a url", reqwest::Client::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}
