//! Local filtering of decoded collections

use super::model::Model;
use serde_json::Value;

/// Exact-match condition on one field of a decoded resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceFilter {
    pub field: String,
    pub value: Value,
}

impl ResourceFilter {
    pub fn new(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Parse `field=value`. The value is kept as text; [`matches`] also
    /// accepts a boolean, number or null field whose JSON form is that text,
    /// so `enabled=true` matches `true` and `name=123` matches `"123"`.
    ///
    /// [`matches`]: ResourceFilter::matches
    pub fn parse(expr: &str) -> Option<Self> {
        let (field, raw) = expr.split_once('=')?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, raw))
    }

    pub fn matches<M: Model>(&self, model: &M) -> bool {
        match (model.field(&self.field), &self.value) {
            (None, _) => false,
            (Some(found), Value::String(text)) => found == &self.value || scalar_text_eq(found, text),
            (Some(found), expected) => found == expected,
        }
    }
}

/// A non-string scalar compared against its textual form
fn scalar_text_eq(found: &Value, text: &str) -> bool {
    match found {
        Value::Bool(_) | Value::Number(_) | Value::Null => {
            serde_json::from_str::<Value>(text).is_ok_and(|parsed| &parsed == found)
        },
        _ => false,
    }
}

/// True when every filter holds; an empty filter set matches everything
pub fn matches_all<M: Model>(model: &M, filters: &[ResourceFilter]) -> bool {
    filters.iter().all(|f| f.matches(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::model::Resource;
    use serde_json::json;

    fn resource(location: &str) -> Resource {
        Resource::from_json(json!({
            "name": "r",
            "location": location,
            "properties": {"enabled": true, "count": 3, "zone": null}
        }))
        .unwrap()
    }

    #[test]
    fn test_exact_match_only() {
        let f = ResourceFilter::new("location", "eastus");
        assert!(f.matches(&resource("eastus")));
        assert!(!f.matches(&resource("EastUS")));
        assert!(!f.matches(&resource("eastus2")));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let f = ResourceFilter::new("sku", "Standard");
        assert!(!f.matches(&resource("eastus")));
    }

    #[test]
    fn test_all_filters_must_hold() {
        let r = resource("westus");
        let filters = vec![
            ResourceFilter::new("location", "westus"),
            ResourceFilter::new("properties.enabled", true),
        ];
        assert!(matches_all(&r, &filters));
        assert!(matches_all(&r, &[]));
        assert!(!matches_all(
            &r,
            &[filters[0].clone(), ResourceFilter::new("name", "other")]
        ));
    }

    #[test]
    fn test_parse_expression() {
        assert_eq!(
            ResourceFilter::parse("location=eastus"),
            Some(ResourceFilter::new("location", "eastus"))
        );
        assert_eq!(
            ResourceFilter::parse("tags.build=42"),
            Some(ResourceFilter::new("tags.build", "42"))
        );
        assert_eq!(ResourceFilter::parse("no-equals"), None);
        assert_eq!(ResourceFilter::parse("=value"), None);
    }

    #[test]
    fn test_parsed_numeric_text_matches_string_fields() {
        let r = Resource::from_json(json!({"name": "123", "tags": {"build": "42"}})).unwrap();
        assert!(ResourceFilter::parse("name=123").unwrap().matches(&r));
        assert!(ResourceFilter::parse("tags.build=42").unwrap().matches(&r));
        assert!(!ResourceFilter::parse("tags.build=42.0").unwrap().matches(&r));
    }

    #[test]
    fn test_parsed_text_matches_scalar_fields() {
        let r = resource("eastus");
        assert!(ResourceFilter::parse("properties.enabled=true").unwrap().matches(&r));
        assert!(!ResourceFilter::parse("properties.enabled=false").unwrap().matches(&r));
        assert!(ResourceFilter::parse("properties.count=3").unwrap().matches(&r));
        assert!(ResourceFilter::parse("properties.zone=null").unwrap().matches(&r));
        assert!(!ResourceFilter::parse("properties.count=three").unwrap().matches(&r));
    }

    #[test]
    fn test_typed_filter_does_not_coerce() {
        let r = Resource::from_json(json!({"name": "123"})).unwrap();
        assert!(!ResourceFilter::new("name", 123).matches(&r));
    }
}
