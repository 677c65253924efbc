//! Name → strategy lookup used by the authentication middleware.

use std::collections::HashMap;
use std::sync::Arc;

use crate::strategy::Strategy;

pub type SharedStrategy<U> = Arc<dyn Strategy<User = U>>;

/// Strategies available to the router, keyed by their configured name.
pub struct StrategyRegistry<U> {
    strategies: HashMap<String, SharedStrategy<U>>,
}

impl<U> Default for StrategyRegistry<U> {
    fn default() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }
}

impl<U: Send + 'static> StrategyRegistry<U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the strategy's own name, replacing any previous entry.
    pub fn register<S>(&mut self, strategy: S) -> &mut Self
    where
        S: Strategy<User = U> + 'static,
    {
        let name = strategy.name().to_string();
        if self
            .strategies
            .insert(name.clone(), Arc::new(strategy))
            .is_some()
        {
            tracing::warn!(strategy = %name, "replacing previously registered strategy");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<SharedStrategy<U>> {
        self.strategies.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AuthRequest;
    use crate::strategy::Outcome;
    use async_trait::async_trait;
    use axum::http::HeaderMap;

    struct Fixed {
        name: &'static str,
        user: u32,
    }

    #[async_trait]
    impl Strategy for Fixed {
        type User = u32;

        fn name(&self) -> &str {
            self.name
        }

        async fn authenticate(&self, _request: &AuthRequest) -> Outcome<u32> {
            Outcome::Success(self.user)
        }
    }

    #[tokio::test]
    async fn test_register_and_dispatch_by_name() {
        let mut registry = StrategyRegistry::new();
        registry
            .register(Fixed { name: "openam-fetch", user: 1 })
            .register(Fixed { name: "openam-do-not-fetch", user: 2 });

        assert_eq!(registry.names(), vec!["openam-do-not-fetch", "openam-fetch"]);

        let req = AuthRequest::new("/".parse().unwrap(), HeaderMap::new());
        let strategy = registry.get("openam-fetch").unwrap();
        assert!(matches!(strategy.authenticate(&req).await, Outcome::Success(1)));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let mut registry = StrategyRegistry::new();
        registry.register(Fixed { name: "openam", user: 1 });
        registry.register(Fixed { name: "openam", user: 2 });
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
