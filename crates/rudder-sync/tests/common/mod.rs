//! Mock Rudder API servers for integration tests.

#![allow(dead_code)]

use rudder_sync::config::{Profile, ProfileName, SyncConfig, SyncSettings};
use rudder_sync::{ApiClient, ObjectKind, Reconciler};
use serde_json::{Map, Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const SOURCE_TOKEN: &str = "source-key";
pub const DEST_TOKEN: &str = "dest-key";

pub fn envelope(kind: &str, objects: Value) -> Value {
    let mut data = Map::new();
    data.insert(kind.to_string(), objects);
    json!({"result": "success", "data": data})
}

/// Server answering list calls for each kind and accepting every mutation.
pub async fn api_server(directives: Value, groups: Value, rules: Value) -> MockServer {
    let server = MockServer::start().await;
    for (kind, objects) in [
        (ObjectKind::Directives, directives),
        (ObjectKind::Groups, groups),
        (ObjectKind::Rules, rules),
    ] {
        let name = kind.collection();
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(name, objects)))
            .mount(&server)
            .await;
    }
    accept_mutations(&server).await;
    server
}

pub async fn accept_mutations(server: &MockServer) {
    for verb in ["PUT", "POST", "DELETE"] {
        Mock::given(method(verb))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
            .mount(server)
            .await;
    }
}

pub fn config(source: &MockServer, dest: &MockServer, settings: SyncSettings) -> SyncConfig {
    SyncConfig {
        source: Profile::new(ProfileName::Source, &source.uri(), SOURCE_TOKEN),
        dest: Profile::new(ProfileName::Dest, &dest.uri(), DEST_TOKEN),
        settings,
    }
}

pub fn reconciler(source: &MockServer, dest: &MockServer, settings: SyncSettings) -> Reconciler {
    Reconciler::new(config(source, dest, settings)).expect("client")
}

pub fn client(server: &MockServer) -> ApiClient {
    let profile = Profile::new(ProfileName::Dest, &server.uri(), DEST_TOKEN);
    ApiClient::new(profile, &SyncSettings::default()).expect("client")
}

/// Non-GET requests in arrival order.
pub async fn mutations(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.method.as_str() != "GET")
        .collect()
}

/// "METHOD /path" labels, handy for order assertions.
pub fn labels(requests: &[Request]) -> Vec<String> {
    requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

/// Decoded form body of a request.
pub fn form(request: &Request) -> Map<String, Value> {
    url::form_urlencoded::parse(&request.body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}
