//! In-memory JSON resource.
//!
//! Items are scoped by their parent ids, so `parents/1/children/5` and
//! `parents/2/children/5` are different items. Ids are generated from a
//! per-resource counter on POST.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::RestError;
use crate::resource::{HandlerResult, Payload, QueryParameters, Reply, ResourceHandler};

/// Query parameter capping the number of items returned by GetMany.
pub const LIMIT_PARAM: &str = "limit";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    parents: Vec<String>,
    id: String,
}

#[derive(Debug, Serialize)]
struct Item<'a> {
    id: &'a str,
    data: &'a Value,
}

#[derive(Debug, Serialize)]
struct Created {
    id: String,
}

/// A concurrent map of JSON documents exposed through all six capabilities.
#[derive(Debug)]
pub struct MemoryResource {
    name: String,
    items: DashMap<ItemKey, Value>,
    next_id: AtomicU64,
}

impl MemoryResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stored items across all parent scopes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn key(id: &str, parent_ids: &[String]) -> ItemKey {
        ItemKey {
            parents: parent_ids.to_vec(),
            id: id.to_string(),
        }
    }

    fn parse(&self, payload: &Payload) -> Result<Value, RestError> {
        serde_json::from_slice(payload).map_err(|e| {
            RestError::handler(
                StatusCode::BAD_REQUEST,
                format!("invalid {} payload: {}", self.name, e),
            )
        })
    }

    fn missing(&self, id: &str) -> RestError {
        RestError::handler(
            StatusCode::NOT_FOUND,
            format!("{} {} not found", self.name, id),
        )
    }
}

/// Every query parameter except `limit` must equal a top-level field.
fn matches_query(value: &Value, query: &QueryParameters) -> bool {
    query
        .iter()
        .filter(|(name, _)| name.as_str() != LIMIT_PARAM)
        .all(|(name, wanted)| match value.get(name) {
            Some(Value::String(s)) => wanted.iter().any(|w| w == s),
            Some(other) => wanted.iter().any(|w| *w == other.to_string()),
            None => false,
        })
}

fn limit(query: &QueryParameters) -> Result<Option<usize>, RestError> {
    match query.get(LIMIT_PARAM).and_then(|values| values.first()) {
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            RestError::handler(
                StatusCode::BAD_REQUEST,
                format!("invalid {} value `{}`", LIMIT_PARAM, raw),
            )
        }),
        None => Ok(None),
    }
}

impl ResourceHandler for MemoryResource {
    fn post(&self, parent_ids: &[String], payload: Payload) -> HandlerResult {
        let value = self.parse(&payload)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        self.items.insert(Self::key(&id, parent_ids), value);

        tracing::debug!(resource = %self.name, id = %id, parents = ?parent_ids, "Item created");
        Reply::json(&Created { id })
    }

    fn get(&self, id: &str, parent_ids: &[String]) -> HandlerResult {
        match self.items.get(&Self::key(id, parent_ids)) {
            Some(entry) => Reply::json(&Item {
                id,
                data: entry.value(),
            }),
            None => Err(self.missing(id)),
        }
    }

    fn get_many(&self, parent_ids: &[String], query: &QueryParameters) -> HandlerResult {
        let limit = limit(query)?;

        let mut found: Vec<(String, Value)> = self
            .items
            .iter()
            .filter(|entry| entry.key().parents == parent_ids)
            .filter(|entry| matches_query(entry.value(), query))
            .map(|entry| (entry.key().id.clone(), entry.value().clone()))
            .collect();
        // Generated ids are decimal, so shorter sorts first.
        found.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        if let Some(limit) = limit {
            found.truncate(limit);
        }

        let items: Vec<Item<'_>> = found
            .iter()
            .map(|(id, data)| Item { id, data })
            .collect();
        Reply::json(&items)
    }

    fn put(&self, id: &str, parent_ids: &[String], payload: Payload) -> HandlerResult {
        let value = self.parse(&payload)?;
        match self.items.get_mut(&Self::key(id, parent_ids)) {
            Some(mut entry) => {
                *entry.value_mut() = value;
                Ok(Reply::empty())
            }
            None => Err(self.missing(id)),
        }
    }

    fn delete(&self, id: &str, parent_ids: &[String]) -> HandlerResult {
        match self.items.remove(&Self::key(id, parent_ids)) {
            Some(_) => Ok(Reply::empty()),
            None => Err(self.missing(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(parents: &[&str]) -> Vec<String> {
        parents.iter().map(|s| s.to_string()).collect()
    }

    fn body(json: &str) -> Payload {
        Payload::from(json.to_string())
    }

    fn created_id(reply: Reply) -> String {
        let value: Value = serde_json::from_slice(&reply.body).unwrap();
        value["id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_items_are_scoped_by_parents() {
        let children = MemoryResource::new("child");
        let id = created_id(children.post(&ids(&["1"]), body(r#"{"name":"a"}"#)).unwrap());

        assert!(children.get(&id, &ids(&["1"])).is_ok());
        let err = children.get(&id, &ids(&["2"])).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), format!("child {} not found", id));
    }

    #[test]
    fn test_get_many_filters_and_limits() {
        let widgets = MemoryResource::new("widget");
        for colour in ["red", "blue", "red", "red"] {
            widgets
                .post(&[], body(&format!(r#"{{"colour":"{}"}}"#, colour)))
                .unwrap();
        }

        let mut query = QueryParameters::new();
        query.insert("colour".into(), vec!["red".into()]);
        query.insert(LIMIT_PARAM.into(), vec!["2".into()]);
        let reply = widgets.get_many(&[], &query).unwrap();
        let items: Value = serde_json::from_slice(&reply.body).unwrap();

        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], "1");
        assert_eq!(items[1]["id"], "3");
    }

    #[test]
    fn test_put_and_delete() {
        let widgets = MemoryResource::new("widget");
        let id = created_id(widgets.post(&[], body(r#"{"v":1}"#)).unwrap());

        widgets.put(&id, &[], body(r#"{"v":2}"#)).unwrap();
        let reply = widgets.get(&id, &[]).unwrap();
        let item: Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(item["data"]["v"], 2);

        widgets.delete(&id, &[]).unwrap();
        assert!(widgets.is_empty());
        assert_eq!(
            widgets.delete(&id, &[]).unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            widgets.put(&id, &[], body("{}")).unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_invalid_payload_is_bad_request() {
        let widgets = MemoryResource::new("widget");
        let err = widgets.post(&[], body("not json")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(widgets.is_empty());
    }
}
