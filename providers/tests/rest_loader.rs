//! REST loader tests against a mock repository.

use content_tree_providers::content_tree_core::content_tree_types::{
    LocationId, PageSize, RestInfo, Subtree,
};
use content_tree_providers::content_tree_core::{LoadError, LocationLoader};
use content_tree_providers::{LOAD_SUBITEMS_ENDPOINT, LOAD_SUBTREE_ENDPOINT, RestLocationLoader};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rest_info() -> RestInfo {
    RestInfo::new("csrf-123", "admin")
}

fn loader(server: &MockServer) -> RestLocationLoader {
    RestLocationLoader::with_client(reqwest::Client::new(), server.uri())
}

#[tokio::test]
async fn loads_a_page_of_subitems() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "ContentTreeNode": {
            "locationId": 43,
            "contentId": 41,
            "name": "Articles",
            "contentTypeIdentifier": "folder",
            "isContainer": true,
            "isInvisible": false,
            "displayLimit": 10,
            "totalChildrenCount": 12,
            "children": [
                { "locationId": 60, "name": "Tenth", "totalChildrenCount": 0, "children": [] },
                { "locationId": 61, "name": "Eleventh", "totalChildrenCount": 0, "children": [] }
            ]
        }
    });
    Mock::given(method("GET"))
        .and(path(format!("{LOAD_SUBITEMS_ENDPOINT}/43/10/10")))
        .and(header("accept", "application/vnd.ez.api.ContentTreeNode+json"))
        .and(header("x-siteaccess", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let location = loader(&server)
        .load_location_items(&rest_info(), LocationId::new(43), 10, 10)
        .await
        .unwrap();

    assert_eq!(location.location_id, LocationId::new(43));
    assert_eq!(location.total_subitems_count, Some(12));
    let names: Vec<&str> = location
        .subitems()
        .iter()
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(names, vec!["Tenth", "Eleventh"]);
}

#[tokio::test]
async fn posts_subtree_descriptor_and_maps_response() {
    let server = MockServer::start().await;
    let mut subtree = Subtree::initial(LocationId::new(2), PageSize::default());
    subtree.expand_path(&[LocationId::new(43)], PageSize::default());

    let expected_request = serde_json::json!({
        "LoadSubtreeRequest": {
            "_media-type": "application/vnd.ez.api.ContentTreeLoadSubtreeRequest",
            "nodes": [{
                "_media-type": "application/vnd.ez.api.ContentTreeLoadSubtreeRequestNode",
                "locationId": 2,
                "limit": 10,
                "offset": 0,
                "children": [{
                    "_media-type": "application/vnd.ez.api.ContentTreeLoadSubtreeRequestNode",
                    "locationId": 43,
                    "limit": 10,
                    "offset": 0,
                    "children": []
                }]
            }]
        }
    });
    let response = serde_json::json!({
        "ContentTreeRoot": {
            "ContentTreeNodeList": [{
                "locationId": 2,
                "name": "Home",
                "isContainer": true,
                "totalChildrenCount": 1,
                "children": [{
                    "locationId": 43,
                    "name": "Articles",
                    "isContainer": true,
                    "totalChildrenCount": 0,
                    "children": []
                }]
            }]
        }
    });
    Mock::given(method("POST"))
        .and(path(LOAD_SUBTREE_ENDPOINT))
        .and(header("x-csrf-token", "csrf-123"))
        .and(header("x-siteaccess", "admin"))
        .and(header(
            "content-type",
            "application/vnd.ez.api.ContentTreeLoadSubtreeRequest+json",
        ))
        .and(body_partial_json(expected_request))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let loaded = loader(&server)
        .load_subtree(&rest_info(), &subtree)
        .await
        .unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Home");
    assert_eq!(loaded[0].subitems()[0].location_id, LocationId::new(43));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOAD_SUBTREE_ENDPOINT))
        .respond_with(ResponseTemplate::new(401).set_body_string("CSRF token invalid"))
        .mount(&server)
        .await;

    let err = loader(&server)
        .load_subtree(
            &rest_info(),
            &Subtree::initial(LocationId::new(2), PageSize::default()),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LoadError::Status {
            status: 401,
            body: "CSRF token invalid".to_string()
        }
    );
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{LOAD_SUBITEMS_ENDPOINT}/43/10/0")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = loader(&server)
        .load_location_items(&rest_info(), LocationId::new(43), 10, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Decode(_)));
}
