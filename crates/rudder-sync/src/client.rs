use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{Profile, SyncSettings};
use crate::error::{ApiError, ApiResult};
use crate::object::{ConfigObject, ObjectKind};

/// Header carrying the profile's API key.
pub const API_TOKEN_HEADER: &str = "X-API-Token";

/// Client bound to a single server profile.
pub struct ApiClient {
    http: reqwest::Client,
    profile: Profile,
}

impl ApiClient {
    pub fn new(profile: Profile, settings: &SyncSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { http, profile })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.profile.base_url, path.trim_start_matches('/'))
    }

    /// Issue one call. `params` go to the query string, `body` is sent
    /// form-encoded. Every failure is logged with the full request context.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Map<String, Value>,
        body: &Map<String, Value>,
    ) -> ApiResult<Value> {
        let url = self.url(path);
        let query = encode_fields(params);
        let form = encode_fields(body);
        debug!(profile = %self.profile.name, %method, %url, "API request");

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(API_TOKEN_HEADER, self.profile.token())
            .header("Accept", "application/json");
        if !query.is_empty() {
            req = req.query(&query);
        }
        if !form.is_empty() {
            req = req.form(&form);
        }

        let transport = |e: reqwest::Error| {
            warn!(%method, %url, params = ?query, body = ?form, error = %e, "Transport failure");
            ApiError::Transport {
                method: method.to_string(),
                url: url.clone(),
                message: e.to_string(),
            }
        };
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport)?;

        let json = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };
        let details = json.as_ref().and_then(error_details);

        if !status.is_success() {
            warn!(
                %method,
                %url,
                status = status.as_u16(),
                params = ?query,
                body = ?form,
                details = details.as_deref().unwrap_or(""),
                "HTTP error pushing data to API"
            );
            return Err(ApiError::HttpStatus {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                details,
            });
        }

        if let Some(details) = details {
            warn!(%method, %url, %details, "API error");
            return Err(ApiError::Api {
                method: method.to_string(),
                url,
                details,
            });
        }

        match json {
            Some(value) => Ok(value),
            None if text.trim().is_empty() => Ok(Value::Null),
            None => {
                warn!(%method, %url, "Response body is not JSON");
                Err(ApiError::decode(url, "body is not valid JSON"))
            }
        }
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::GET, path, &Map::new(), &Map::new())
            .await
    }

    pub async fn put(&self, path: &str, body: &Map<String, Value>) -> ApiResult<Value> {
        self.request(Method::PUT, path, &Map::new(), body).await
    }

    pub async fn post(&self, path: &str, body: &Map<String, Value>) -> ApiResult<Value> {
        self.request(Method::POST, path, &Map::new(), body).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, path, &Map::new(), &Map::new())
            .await
    }

    // --- accessors ---

    /// Full collection of one kind. Records without a string `id` are
    /// logged and dropped.
    pub async fn list(&self, kind: ObjectKind) -> ApiResult<Vec<ConfigObject>> {
        let raw = self.list_type(kind.collection()).await?;
        let mut objects = Vec::with_capacity(raw.len());
        for value in raw {
            match ConfigObject::from_value(value) {
                Ok(obj) => objects.push(obj),
                Err(e) => {
                    warn!(profile = %self.profile.name, %kind, error = %e, "Skipping invalid object")
                }
            }
        }
        Ok(objects)
    }

    pub async fn list_directives(&self) -> ApiResult<Vec<ConfigObject>> {
        self.list(ObjectKind::Directives).await
    }

    pub async fn list_groups(&self) -> ApiResult<Vec<ConfigObject>> {
        self.list(ObjectKind::Groups).await
    }

    pub async fn list_rules(&self) -> ApiResult<Vec<ConfigObject>> {
        self.list(ObjectKind::Rules).await
    }

    /// Any `/{type}` collection, unwrapped from `data.{type}`.
    pub async fn list_type(&self, type_name: &str) -> ApiResult<Vec<Value>> {
        let resp = self.get(type_name).await?;
        resp.get("data")
            .and_then(|d| d.get(type_name))
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                ApiError::decode(self.url(type_name), format!("missing data.{type_name} list"))
            })
    }

    pub async fn get_directive(&self, id: &str) -> ApiResult<Value> {
        let path = ObjectKind::Directives.object_path(id);
        let resp = self.get(&path).await?;
        let data = resp
            .get("data")
            .ok_or_else(|| ApiError::decode(self.url(&path), "missing data envelope"))?;
        match data
            .get("directives")
            .and_then(Value::as_array)
            .and_then(|list| list.first())
        {
            Some(directive) => Ok(directive.clone()),
            None => Ok(data.clone()),
        }
    }
}

/// Render fields as the strings the API expects. Booleans become
/// `"true"`/`"false"`; nested values are JSON-encoded.
pub fn encode_fields(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Bool(b) => b.to_string(),
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => value.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

fn error_details(body: &Value) -> Option<String> {
    match body.get("errorDetails")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
