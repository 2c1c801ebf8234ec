//! Service Registry - Load service definitions from JSON
//!
//! Well-known ARM resource types are described in embedded JSON files so a
//! new type only needs a provider namespace, a type name and an API version.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded service JSON files (compiled into the binary)
const SERVICE_FILES: &[&str] = &[
    include_str!("../resources/compute.json"),
    include_str!("../resources/network.json"),
    include_str!("../resources/storage.json"),
];

/// Identity of one resource type as exposed by ARM
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDef {
    /// Name used in diagnostics, e.g. `VirtualMachineService`
    pub service_name: String,
    /// Provider namespace, e.g. `Microsoft.Compute`
    pub provider: String,
    /// Resource type under the provider, e.g. `virtualMachines`
    pub resource_type: String,
    pub api_version: String,
    /// Whether the API offers a subscription-wide list endpoint
    #[serde(default = "default_list_all")]
    pub list_all: bool,
}

fn default_list_all() -> bool {
    true
}

impl ServiceDef {
    pub fn new(service_name: &str, provider: &str, resource_type: &str, api_version: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            provider: provider.to_string(),
            resource_type: resource_type.to_string(),
            api_version: api_version.to_string(),
            list_all: true,
        }
    }

    pub fn without_list_all(mut self) -> Self {
        self.list_all = false;
        self
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub services: HashMap<String, ServiceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ServiceConfig> = OnceLock::new();

/// Get the service registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ServiceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ServiceConfig {
            services: HashMap::new(),
        };

        for content in SERVICE_FILES {
            let partial: ServiceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded service JSON: {}", e));
            final_config.services.extend(partial.services);
        }

        final_config
    })
}

/// Get a service definition by key
pub fn get_service(key: &str) -> Option<&'static ServiceDef> {
    get_registry().services.get(key)
}

/// All service keys, sorted
pub fn get_all_service_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .services
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
