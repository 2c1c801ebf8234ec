//! Model decoding
//!
//! [`Model`] is the seam between raw JSON and typed resources. [`Resource`]
//! is a generic implementation that works for any ARM resource type.

use super::response::ResponseHeaders;
use crate::error::{ArmError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A decoded resource that can carry the headers of the call that produced it
pub trait Model: Sized + Send + 'static {
    /// Decode one resource from a response body or one element of a `value` array
    fn from_json(value: Value) -> Result<Self>;

    /// Look up a field by name; dotted names address nested objects
    fn field(&self, name: &str) -> Option<&Value>;

    fn attach_headers(&mut self, headers: ResponseHeaders);

    fn response_headers(&self) -> Option<&ResponseHeaders>;
}

/// Generic ARM resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Untagged resources may send `"tags": null`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Map<String, Value>,
    #[serde(default)]
    pub properties: Value,
    /// Full body as received, used for field lookups
    #[serde(skip)]
    raw: Value,
    #[serde(skip)]
    headers: Option<ResponseHeaders>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Resource {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Resource group parsed out of the resource id
    pub fn resource_group(&self) -> Option<&str> {
        let id = self.id.as_deref()?;
        let mut parts = id.split('/');
        while let Some(part) = parts.next() {
            if part.eq_ignore_ascii_case("resourceGroups") {
                return parts.next().filter(|g| !g.is_empty());
            }
        }
        None
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .get("provisioningState")
            .and_then(|v| v.as_str())
    }
}

impl PartialEq for Resource {
    /// Structural equality over the body; headers differ call to call
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Model for Resource {
    fn from_json(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ArmError::Decode(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        let mut resource: Resource = serde_json::from_value(value.clone())?;
        resource.raw = value;
        Ok(resource)
    }

    fn field(&self, name: &str) -> Option<&Value> {
        lookup_path(&self.raw, name)
    }

    fn attach_headers(&mut self, headers: ResponseHeaders) {
        self.headers = Some(headers);
    }

    fn response_headers(&self) -> Option<&ResponseHeaders> {
        self.headers.as_ref()
    }
}

/// Walk a dot-notation path; numeric parts index into arrays
pub fn lookup_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if let Some(direct) = value.get(path) {
        return Some(direct);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) if current.is_array() => current.get(idx)?,
            _ => current.get(part)?,
        };
    }
    Some(current)
}

/// Decode a single-resource body, attaching the call's headers
pub fn decode_one<M: Model>(body: &str, headers: &ResponseHeaders) -> Result<M> {
    if body.trim().is_empty() {
        return Err(ArmError::Decode("empty response body".to_string()));
    }
    let value: Value = serde_json::from_str(body)?;
    let mut model = M::from_json(value)?;
    model.attach_headers(headers.clone());
    Ok(model)
}

/// Decode the `value` array of a collection body together with its `nextLink`.
/// Each element carries the headers of the call.
pub fn decode_page<M: Model>(
    body: &str,
    headers: &ResponseHeaders,
) -> Result<(Vec<M>, Option<String>)> {
    if body.trim().is_empty() {
        return Err(ArmError::Decode("empty response body".to_string()));
    }
    let value: Value = serde_json::from_str(body)?;

    let next_link = value
        .get("nextLink")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let elements = match value {
        Value::Object(mut map) => match map.remove("value") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ArmError::Decode(format!(
                    "expected `value` to be an array, got {}",
                    json_kind(&other)
                )))
            },
        },
        Value::Array(items) => items,
        other => {
            return Err(ArmError::Decode(format!(
                "expected a collection object, got {}",
                json_kind(&other)
            )))
        },
    };

    let items = elements
        .into_iter()
        .map(|element| {
            let mut model = M::from_json(element)?;
            model.attach_headers(headers.clone());
            Ok(model)
        })
        .collect::<Result<Vec<M>>>()?;

    Ok((items, next_link))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn vm_json() -> Value {
        json!({
            "id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
            "name": "vm1",
            "type": "Microsoft.Compute/virtualMachines",
            "location": "eastus",
            "tags": {"env": "dev"},
            "properties": {
                "provisioningState": "Succeeded",
                "storageProfile": {"dataDisks": [{"name": "disk0"}]}
            }
        })
    }

    #[test]
    fn test_resource_decodes_common_fields() {
        let r = Resource::from_json(vm_json()).unwrap();
        assert_eq!(r.name.as_deref(), Some("vm1"));
        assert_eq!(r.location.as_deref(), Some("eastus"));
        assert_eq!(r.resource_type.as_deref(), Some("Microsoft.Compute/virtualMachines"));
        assert_eq!(r.resource_group(), Some("rg1"));
        assert_eq!(r.provisioning_state(), Some("Succeeded"));
        assert!(r.response_headers().is_none());
    }

    #[test]
    fn test_field_lookup_by_path() {
        let r = Resource::from_json(vm_json()).unwrap();
        assert_eq!(r.field("location"), Some(&json!("eastus")));
        assert_eq!(r.field("tags.env"), Some(&json!("dev")));
        assert_eq!(
            r.field("properties.storageProfile.dataDisks.0.name"),
            Some(&json!("disk0"))
        );
        assert_eq!(r.field("properties.missing"), None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = Resource::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ArmError::Decode(_)));
    }

    #[test]
    fn test_decode_one_attaches_headers() {
        let headers = ResponseHeaders::new(200, BTreeMap::new());
        let r: Resource = decode_one(&vm_json().to_string(), &headers).unwrap();
        assert_eq!(r.response_headers(), Some(&headers));
    }

    #[test]
    fn test_decode_one_empty_body_is_error() {
        let headers = ResponseHeaders::default();
        let err = decode_one::<Resource>("  ", &headers).unwrap_err();
        assert!(matches!(err, ArmError::Decode(_)));
        let err = decode_one::<Resource>("{not json", &headers).unwrap_err();
        assert!(matches!(err, ArmError::Json(_)));
    }

    #[test]
    fn test_decode_page_reads_value_and_next_link() {
        let body = json!({
            "value": [vm_json(), {"name": "vm2"}],
            "nextLink": "https://management.azure.com/next?$skiptoken=x"
        });
        let headers = ResponseHeaders::new(200, BTreeMap::new());
        let (items, next): (Vec<Resource>, _) = decode_page(&body.to_string(), &headers).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name.as_deref(), Some("vm2"));
        assert!(items.iter().all(|r| r.response_headers() == Some(&headers)));
        assert_eq!(next.as_deref(), Some("https://management.azure.com/next?$skiptoken=x"));
    }

    #[test]
    fn test_null_tags_decode_as_empty() {
        let body = json!({"value": [{"name": "a", "tags": null}, {"name": "b"}]});
        let (items, _): (Vec<Resource>, _) =
            decode_page(&body.to_string(), &ResponseHeaders::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.tags.is_empty()));
        assert_eq!(items[0].field("tags"), Some(&Value::Null));
    }

    #[test]
    fn test_decode_page_without_value_is_empty() {
        let (items, next): (Vec<Resource>, _) =
            decode_page("{}", &ResponseHeaders::default()).unwrap();
        assert!(items.is_empty());
        assert!(next.is_none());
    }

    #[test]
    fn test_decode_page_rejects_non_array_value() {
        let err = decode_page::<Resource>(r#"{"value": 3}"#, &ResponseHeaders::default())
            .unwrap_err();
        assert!(matches!(err, ArmError::Decode(_)));
    }
}
