//! Precondition guards run before any request is built

use crate::error::{ArmError, Result};

/// Resolve and check the resource group, returning it when present and non-empty
pub fn require_resource_group(resource_group: Option<&str>) -> Result<&str> {
    match resource_group {
        Some(group) if !group.is_empty() => Ok(group),
        _ => Err(ArmError::Configuration(
            "resource group must be specified".to_string(),
        )),
    }
}

pub fn require_resource_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(ArmError::Configuration("name must be specified".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_guard() {
        assert_eq!(require_resource_group(Some("rg1")).ok(), Some("rg1"));
        assert!(matches!(
            require_resource_group(None),
            Err(ArmError::Configuration(_))
        ));
        assert!(matches!(
            require_resource_group(Some("")),
            Err(ArmError::Configuration(_))
        ));
    }

    #[test]
    fn test_name_guard() {
        assert_eq!(require_resource_name("vm1").ok(), Some("vm1"));
        assert!(matches!(
            require_resource_name(""),
            Err(ArmError::Configuration(_))
        ));
    }
}
