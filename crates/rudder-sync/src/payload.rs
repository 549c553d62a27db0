//! Per-kind request shaping for create, update and delete.
//!
//! Everything here is pure: it turns a [`ConfigObject`] into the list of
//! calls that [`crate::mutate`] will issue, so the shape of each request can
//! be checked without a server.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::config::SyncSettings;
use crate::object::{ConfigObject, ObjectKind};

/// One planned API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: Method,
    pub path: String,
    pub body: Map<String, Value>,
}

impl ApiCall {
    fn new(method: Method, path: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// Calls needed to create `obj` in a destination.
pub fn create_calls(kind: ObjectKind, obj: &ConfigObject, settings: &SyncSettings) -> Vec<ApiCall> {
    let collection = kind.collection();
    match kind {
        ObjectKind::Directives if settings.directive_two_step_create => {
            let mut first = obj.fields().clone();
            let parameters = first.remove("parameters");
            let mut calls = vec![ApiCall::new(Method::PUT, collection, first)];
            if let Some(parameters) = parameters {
                let mut follow_up = Map::new();
                follow_up.insert("parameters".into(), json_string(&parameters));
                calls.push(ApiCall::new(
                    Method::POST,
                    kind.object_path(obj.id()),
                    follow_up,
                ));
            }
            calls
        }
        ObjectKind::Directives => {
            vec![ApiCall::new(Method::PUT, collection, directive_payload(obj))]
        }
        ObjectKind::Groups => {
            let body = group_payload(obj, &settings.group_root_category);
            vec![ApiCall::new(Method::PUT, collection, body)]
        }
        ObjectKind::Rules => vec![ApiCall::new(Method::PUT, collection, obj.fields().clone())],
    }
}

/// Full-object update of an existing record.
pub fn update_call(kind: ObjectKind, obj: &ConfigObject, settings: &SyncSettings) -> ApiCall {
    ApiCall::new(
        Method::POST,
        kind.object_path(obj.id()),
        update_payload(kind, obj, settings),
    )
}

pub fn delete_call(kind: ObjectKind, id: &str) -> ApiCall {
    ApiCall::new(
        Method::DELETE,
        kind.object_path(id),
        Map::new(),
    )
}

/// Body sent on update, also the normal form used to decide whether a
/// source and destination copy differ.
pub fn update_payload(
    kind: ObjectKind,
    obj: &ConfigObject,
    settings: &SyncSettings,
) -> Map<String, Value> {
    match kind {
        ObjectKind::Directives => directive_payload(obj),
        ObjectKind::Groups => group_payload(obj, &settings.group_root_category),
        ObjectKind::Rules => obj.fields().clone(),
    }
}

/// Directive with `parameters` carried as an embedded JSON string.
pub fn directive_payload(obj: &ConfigObject) -> Map<String, Value> {
    let mut body = obj.fields().clone();
    if let Some(parameters) = body.get_mut("parameters") {
        *parameters = json_string(parameters);
    }
    body
}

/// Group without membership, with its query as a JSON string and pinned to
/// the root category.
pub fn group_payload(obj: &ConfigObject, root_category: &str) -> Map<String, Value> {
    let mut body = obj.fields().clone();
    body.remove("nodeIds");
    if let Some(query) = body.get_mut("query") {
        *query = json_string(query);
    }
    body.insert(
        "nodeGroupCategory".into(),
        Value::String(root_category.to_string()),
    );
    body
}

fn json_string(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ConfigObject {
        ConfigObject::from_value(value).unwrap()
    }

    #[test]
    fn directive_create_is_split_in_two_calls() {
        let directive = object(json!({
            "id": "d1",
            "displayName": "SSH",
            "parameters": {"foo": "bar"},
        }));
        let calls = create_calls(ObjectKind::Directives, &directive, &SyncSettings::default());

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[0].path, "directives");
        assert!(!calls[0].body.contains_key("parameters"));
        assert_eq!(calls[0].body["displayName"], "SSH");

        assert_eq!(calls[1].method, Method::POST);
        assert_eq!(calls[1].path, "directives/d1");
        assert_eq!(calls[1].body.len(), 1);
        let encoded = calls[1].body["parameters"].as_str().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(encoded).unwrap(),
            json!({"foo": "bar"})
        );
    }

    #[test]
    fn directive_without_parameters_needs_no_follow_up() {
        let directive = object(json!({"id": "d2"}));
        let calls = create_calls(ObjectKind::Directives, &directive, &SyncSettings::default());
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn single_call_directive_create_embeds_parameters() {
        let settings = SyncSettings {
            directive_two_step_create: false,
            ..Default::default()
        };
        let directive = object(json!({"id": "d1", "parameters": {"foo": "bar"}}));
        let calls = create_calls(ObjectKind::Directives, &directive, &settings);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body["parameters"], r#"{"foo":"bar"}"#);
    }

    #[test]
    fn group_create_strips_nodes_and_forces_root_category() {
        let group = object(json!({
            "id": "g1",
            "nodeIds": ["n1", "n2"],
            "query": {"select": "node", "composition": "And", "where": []},
            "nodeGroupCategory": "SomeOtherCategory",
            "dynamic": true,
        }));
        let calls = create_calls(ObjectKind::Groups, &group, &SyncSettings::default());

        assert_eq!(calls.len(), 1);
        let body = &calls[0].body;
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[0].path, "groups");
        assert!(!body.contains_key("nodeIds"));
        assert_eq!(body["nodeGroupCategory"], "GroupRoot");
        let query = body["query"].as_str().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(query).unwrap(),
            json!({"select": "node", "composition": "And", "where": []})
        );
        assert_eq!(body["dynamic"], true);
    }

    #[test]
    fn rules_are_submitted_as_is() {
        let rule = object(json!({"id": "r1", "directives": ["d1"], "targets": ["group:g1"]}));
        let calls = create_calls(ObjectKind::Rules, &rule, &SyncSettings::default());
        assert_eq!(calls.len(), 1);
        assert_eq!(&calls[0].body, rule.fields());
    }

    #[test]
    fn group_payload_ignores_membership_differences() {
        let settings = SyncSettings::default();
        let a = object(json!({"id": "g1", "nodeIds": ["n1"], "query": {"where": []}}));
        let b = object(json!({
            "id": "g1",
            "nodeIds": ["n2", "n3"],
            "query": {"where": []},
            "nodeGroupCategory": "Elsewhere",
        }));
        assert_eq!(
            update_payload(ObjectKind::Groups, &a, &settings),
            update_payload(ObjectKind::Groups, &b, &settings)
        );
    }

    #[test]
    fn delete_targets_object_path() {
        let call = delete_call(ObjectKind::Rules, "r9");
        assert_eq!(call.method, Method::DELETE);
        assert_eq!(call.path, "rules/r9");
        assert!(call.body.is_empty());
    }
}
