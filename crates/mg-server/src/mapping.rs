//! Operator model-mapping table
//!
//! Built immutably from a configuration snapshot; configuration changes
//! swap a freshly built table into the engine (late binding) rather than
//! mutating this one, so requests mid-decision keep the table they already
//! consulted.

use std::collections::HashMap;

use mg_config::AppConfig;
use mg_routing::ModelMapper;

pub struct MappingTable {
    rules: HashMap<String, String>,
}

impl MappingTable {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut rules = HashMap::new();
        for rule in &config.model_mappings {
            let from = rule.from.trim();
            let to = rule.to.trim();
            // An empty target disables the rule without deleting it
            if from.is_empty() || to.is_empty() {
                continue;
            }
            rules.insert(from.to_string(), to.to_string());
        }
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl ModelMapper for MappingTable {
    fn map_model(&self, model: &str) -> Option<String> {
        self.rules.get(model).cloned()
    }
}
