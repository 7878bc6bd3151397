//! Scenario registry
//!
//! Central registry of all contract scenarios, in the order they run.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use super::traits::Scenario;
use super::{CorsScenario, CreateScenario, DeleteScenario, UpdateScenario};

/// Global registry of all available scenarios
///
/// Uses IndexMap to preserve insertion order, so reports always list
/// scenarios in the same sequence.
pub static SCENARIOS: Lazy<IndexMap<&'static str, Arc<dyn Scenario>>> = Lazy::new(|| {
    let mut m: IndexMap<&'static str, Arc<dyn Scenario>> = IndexMap::new();

    m.insert("cors", Arc::new(CorsScenario));
    m.insert("create", Arc::new(CreateScenario));
    m.insert("update", Arc::new(UpdateScenario));
    m.insert("delete", Arc::new(DeleteScenario));

    m
});

/// Get a scenario by name
pub fn get_scenario(name: &str) -> Option<Arc<dyn Scenario>> {
    SCENARIOS.get(name).cloned()
}

/// List all scenario names in run order
pub fn list_scenarios() -> Vec<&'static str> {
    SCENARIOS.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_registered() {
        assert_eq!(list_scenarios(), vec!["cors", "create", "update", "delete"]);
    }

    #[test]
    fn test_registry_keys_match_names() {
        for (key, scenario) in SCENARIOS.iter() {
            assert_eq!(*key, scenario.name());
        }
    }

    #[test]
    fn test_get_scenario() {
        let scenario = get_scenario("delete");
        assert!(scenario.is_some());
        assert_eq!(scenario.unwrap().title(), "Delete Todo Item");

        assert!(get_scenario("pagination").is_none());
    }
}
