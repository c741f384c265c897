//! In-process stand-in for the platform API.
//!
//! Stores apps and inputs in memory and evaluates input searches the way the
//! hosted service does: clauses are ANDed, conditions inside a clause ORed.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const PAT: &str = "test-pat";

/// Largest `page * per_page` the fake accepts
pub const MAX_RESULT_WINDOW: u64 = 10_000;

#[derive(Default)]
struct State {
    apps: Vec<String>,
    datasets: Vec<String>,
    inputs: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<State>>,
}

#[derive(Clone, Copy)]
enum Endpoint {
    CreateApps,
    ListApps,
    DeleteApp,
    CreateDatasets,
    PostInputs,
    ListInputs,
    DeleteInputs,
    Searches,
}

struct Route {
    platform: FakePlatform,
    endpoint: Endpoint,
}

impl Respond for Route {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let path = request.url.path().to_string();
        match self.endpoint {
            Endpoint::CreateApps => self.platform.create_apps(&body),
            Endpoint::ListApps => self.platform.list_apps(),
            Endpoint::DeleteApp => self.platform.delete_app(&path),
            Endpoint::CreateDatasets => self.platform.create_datasets(&body),
            Endpoint::PostInputs => self.platform.post_inputs(&body),
            Endpoint::ListInputs => self.platform.list_inputs(),
            Endpoint::DeleteInputs => self.platform.delete_inputs(&body),
            Endpoint::Searches => self.platform.search(&body),
        }
    }
}

/// Start a mock server backed by an empty fake platform
pub async fn start() -> (MockServer, FakePlatform) {
    let server = MockServer::start().await;
    let platform = FakePlatform::default();

    let routes = [
        ("POST", r"^/v2/users/[^/]+/apps$", Endpoint::CreateApps),
        ("GET", r"^/v2/users/[^/]+/apps$", Endpoint::ListApps),
        ("DELETE", r"^/v2/users/[^/]+/apps/[^/]+$", Endpoint::DeleteApp),
        ("POST", r"^/v2/users/[^/]+/apps/[^/]+/datasets$", Endpoint::CreateDatasets),
        ("POST", r"^/v2/users/[^/]+/apps/[^/]+/inputs$", Endpoint::PostInputs),
        ("GET", r"^/v2/users/[^/]+/apps/[^/]+/inputs$", Endpoint::ListInputs),
        ("DELETE", r"^/v2/users/[^/]+/apps/[^/]+/inputs$", Endpoint::DeleteInputs),
        ("POST", r"^/v2/users/[^/]+/apps/[^/]+/inputs/searches$", Endpoint::Searches),
    ];

    for (verb, pattern, endpoint) in routes {
        Mock::given(method(verb))
            .and(path_regex(pattern))
            .and(header("authorization", format!("Key {}", PAT).as_str()))
            .respond_with(Route {
                platform: platform.clone(),
                endpoint,
            })
            .mount(&server)
            .await;
    }

    (server, platform)
}

/// Bodies of all search requests the server received, in order
pub async fn search_requests(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().ends_with("/inputs/searches"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

fn ok() -> Value {
    json!({"code": 10000, "description": "Ok"})
}

fn ok_with(key: &str, items: Vec<Value>) -> ResponseTemplate {
    let mut body = json!({"status": ok()});
    body[key] = Value::Array(items);
    ResponseTemplate::new(200).set_body_json(body)
}

impl FakePlatform {
    pub fn input_count(&self) -> usize {
        self.state.lock().unwrap().inputs.len()
    }

    pub fn inputs(&self) -> Vec<Value> {
        self.state.lock().unwrap().inputs.clone()
    }

    pub fn apps(&self) -> Vec<String> {
        self.state.lock().unwrap().apps.clone()
    }

    fn create_apps(&self, body: &Value) -> ResponseTemplate {
        let apps = body["apps"].as_array().cloned().unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        for app in &apps {
            state.apps.push(app["id"].as_str().unwrap_or_default().to_string());
        }
        ok_with("apps", apps)
    }

    fn list_apps(&self) -> ResponseTemplate {
        let apps = self
            .state
            .lock()
            .unwrap()
            .apps
            .iter()
            .map(|id| json!({"id": id}))
            .collect();
        ok_with("apps", apps)
    }

    fn delete_app(&self, path: &str) -> ResponseTemplate {
        let app_id = path.rsplit('/').next().unwrap_or_default().to_string();
        let mut state = self.state.lock().unwrap();
        if !state.apps.contains(&app_id) {
            return ResponseTemplate::new(404).set_body_json(json!({
                "status": {
                    "code": 11101,
                    "description": "Resource does not exist",
                    "details": format!("app '{}' not found", app_id)
                }
            }));
        }
        state.apps.retain(|id| *id != app_id);
        state.datasets.clear();
        state.inputs.clear();
        ResponseTemplate::new(200).set_body_json(json!({"status": ok()}))
    }

    fn create_datasets(&self, body: &Value) -> ResponseTemplate {
        let datasets = body["datasets"].as_array().cloned().unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        for dataset in &datasets {
            state
                .datasets
                .push(dataset["id"].as_str().unwrap_or_default().to_string());
        }
        ok_with("datasets", datasets)
    }

    fn post_inputs(&self, body: &Value) -> ResponseTemplate {
        let mut stored = Vec::new();
        let mut state = self.state.lock().unwrap();
        for input in body["inputs"].as_array().cloned().unwrap_or_default() {
            let mut input = input;
            input["status"] = json!({"code": 30000, "description": "Download complete"});
            state.inputs.push(input.clone());
            stored.push(input);
        }
        ok_with("inputs", stored)
    }

    fn list_inputs(&self) -> ResponseTemplate {
        ok_with("inputs", self.inputs())
    }

    fn delete_inputs(&self, body: &Value) -> ResponseTemplate {
        let ids: Vec<&str> = body["ids"]
            .as_array()
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        self.state
            .lock()
            .unwrap()
            .inputs
            .retain(|input| !ids.contains(&input["id"].as_str().unwrap_or_default()));
        ResponseTemplate::new(200).set_body_json(json!({"status": ok()}))
    }

    fn search(&self, body: &Value) -> ResponseTemplate {
        let search = &body["searches"][0];
        let page = body["pagination"]["page"].as_u64().unwrap_or(1).max(1);
        let per_page = body["pagination"]["per_page"].as_u64().unwrap_or(128);

        if page * per_page > MAX_RESULT_WINDOW {
            return ResponseTemplate::new(400).set_body_json(json!({
                "status": {
                    "code": 11102,
                    "description": "Invalid request",
                    "details": format!("page * perPage cannot exceed {}", MAX_RESULT_WINDOW)
                }
            }));
        }

        let filters = search["query"]["filters"].as_array().cloned().unwrap_or_default();
        let ranks = search["query"]["ranks"].as_array().cloned().unwrap_or_default();

        let state = self.state.lock().unwrap();
        let mut matched: Vec<(f64, &Value)> = state
            .inputs
            .iter()
            .filter(|input| filters.iter().all(|f| matches_filter(input, f)))
            .map(|input| (rank_score(input, &ranks), input))
            .collect();
        matched.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

        let hits: Vec<Value> = matched
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .map(|(score, input)| json!({"score": score, "input": input}))
            .collect();

        // Like protobuf JSON, an empty repeated field is left out entirely
        let mut response = json!({"status": ok()});
        if !hits.is_empty() {
            response["hits"] = Value::Array(hits);
        }
        ResponseTemplate::new(200).set_body_json(response)
    }
}

fn matches_filter(input: &Value, filter: &Value) -> bool {
    let mut conditions = Vec::new();

    if let Some(data) = filter.pointer("/annotation/data") {
        for concept in data["concepts"].as_array().into_iter().flatten() {
            let wanted = concept["value"].as_f64().unwrap_or(1.0) > 0.5;
            conditions.push(has_concept(input, concept) == wanted);
        }
        if let Some(metadata) = data.get("metadata").and_then(Value::as_object) {
            conditions.push(metadata_matches(input, metadata));
        }
        if let Some(geo) = data.get("geo") {
            conditions.push(within_geo_limit(input, geo));
        }
        if let Some(url) = data.pointer("/image/url") {
            conditions.push(input.pointer("/data/image/url") == Some(url));
        }
    }

    if let Some(filter_input) = filter.get("input") {
        if let Some(types) = filter_input.get("data").and_then(Value::as_object) {
            for media in types.keys() {
                conditions.push(input.pointer(&format!("/data/{}", media)).is_some());
            }
        }
        for dataset_id in filter_input["dataset_ids"].as_array().into_iter().flatten() {
            let in_dataset = input["dataset_ids"]
                .as_array()
                .is_some_and(|ids| ids.contains(dataset_id));
            conditions.push(in_dataset);
        }
        if let Some(code) = filter_input.pointer("/status/code") {
            conditions.push(input.pointer("/status/code") == Some(code));
        }
    }

    conditions.is_empty() || conditions.into_iter().any(|c| c)
}

fn has_concept(input: &Value, concept: &Value) -> bool {
    input["data"]["concepts"]
        .as_array()
        .into_iter()
        .flatten()
        .any(|stored| {
            let same_name = concept.get("name").is_some() && stored.get("name") == concept.get("name");
            let same_id = concept.get("id").is_some() && stored.get("id") == concept.get("id");
            (same_name || same_id) && stored["value"].as_f64().unwrap_or(0.0) > 0.5
        })
}

fn metadata_matches(input: &Value, wanted: &Map<String, Value>) -> bool {
    let Some(stored) = input.pointer("/data/metadata").and_then(Value::as_object) else {
        return false;
    };
    wanted.iter().all(|(key, value)| stored.get(key) == Some(value))
}

fn within_geo_limit(input: &Value, geo: &Value) -> bool {
    let Some(point) = input.pointer("/data/geo/geo_point") else {
        return false;
    };
    let distance = haversine_km(
        (point["latitude"].as_f64().unwrap_or_default(), point["longitude"].as_f64().unwrap_or_default()),
        (
            geo["geo_point"]["latitude"].as_f64().unwrap_or_default(),
            geo["geo_point"]["longitude"].as_f64().unwrap_or_default(),
        ),
    );
    distance <= geo["geo_limit"]["value"].as_f64().unwrap_or_default()
}

fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Exact image match ranks first; everything else ties
fn rank_score(input: &Value, ranks: &[Value]) -> f64 {
    if ranks.is_empty() {
        return 1.0;
    }
    let exact = ranks.iter().any(|rank| {
        rank.pointer("/annotation/data/image/url")
            .is_some_and(|url| input.pointer("/data/image/url") == Some(url))
    });
    if exact {
        1.0
    } else {
        0.5
    }
}
