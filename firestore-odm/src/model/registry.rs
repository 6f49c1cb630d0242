use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::ModelDescriptor;
use std::fmt::{Debug, Formatter};

/// The set of active models.
///
/// Recorded once when the database is built and only read afterwards. Cascade deletion
/// looks up child types here, so a model missing from the registry is never visited.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: Vec<&'static ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        ModelRegistry { models: Vec::new() }
    }

    /// Adds a model. Registering the same model twice is a no-op.
    pub fn register(&mut self, descriptor: &'static ModelDescriptor) {
        if !self.contains(descriptor) {
            self.models.push(descriptor);
        }
    }

    pub fn contains(&self, descriptor: &ModelDescriptor) -> bool {
        self.models.iter().any(|m| *m == descriptor)
    }

    pub fn models(&self) -> &[&'static ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Every registered model whose declared parent is exactly `descriptor`, in
    /// registration order.
    pub fn child_types(&self, descriptor: &ModelDescriptor) -> Vec<&'static ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.is_child_of(descriptor))
            .copied()
            .collect()
    }

    /// Checks that the parent edges form a forest over registered models.
    pub fn validate(&self) -> OdmResult<()> {
        for model in &self.models {
            if let Some(parent) = model.parent() {
                if !self.contains(parent) {
                    log::error!(
                        "{} declares parent {} which is not registered",
                        model.model_name(),
                        parent.model_name()
                    );
                    return Err(OdmError::new(
                        &format!(
                            "{} declares parent {} which is not registered",
                            model.model_name(),
                            parent.model_name()
                        ),
                        ErrorKind::InvalidOperation,
                    ));
                }
            }

            let mut seen: Vec<&ModelDescriptor> = vec![*model];
            let mut current = model.parent();
            while let Some(parent) = current {
                if seen.contains(&parent) {
                    log::error!("Model {} has a cyclic parent chain", model.model_name());
                    return Err(OdmError::new(
                        &format!("Model {} has a cyclic parent chain", model.model_name()),
                        ErrorKind::InvalidOperation,
                    ));
                }
                seen.push(parent);
                current = parent.parent();
            }
        }
        Ok(())
    }
}

impl Debug for ModelRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.models.iter().map(|m| m.model_name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> &'static ModelDescriptor {
        static USERS: ModelDescriptor = ModelDescriptor::new("User", "users", None, &[]);
        &USERS
    }

    fn posts() -> &'static ModelDescriptor {
        static POSTS: ModelDescriptor = ModelDescriptor::new("Post", "posts", Some(users), &[]);
        &POSTS
    }

    fn comments() -> &'static ModelDescriptor {
        static COMMENTS: ModelDescriptor =
            ModelDescriptor::new("Comment", "comments", Some(posts), &[]);
        &COMMENTS
    }

    fn likes() -> &'static ModelDescriptor {
        static LIKES: ModelDescriptor = ModelDescriptor::new("Like", "likes", Some(posts), &[]);
        &LIKES
    }

    fn ping() -> &'static ModelDescriptor {
        static PING: ModelDescriptor = ModelDescriptor::new("Ping", "pings", Some(pong), &[]);
        &PING
    }

    fn pong() -> &'static ModelDescriptor {
        static PONG: ModelDescriptor = ModelDescriptor::new("Pong", "pongs", Some(ping), &[]);
        &PONG
    }

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry.register(users());
        registry.register(posts());
        registry.register(comments());
        registry.register(likes());
        registry
    }

    #[test]
    fn child_types_follow_parent_edges() {
        let registry = registry();
        assert_eq!(registry.child_types(users()), vec![posts()]);
        assert_eq!(registry.child_types(posts()), vec![comments(), likes()]);
        assert!(registry.child_types(comments()).is_empty());
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = registry();
        registry.register(users());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn unregistered_children_are_invisible() {
        let mut registry = ModelRegistry::new();
        registry.register(users());
        registry.register(posts());
        assert!(registry.child_types(posts()).is_empty());
    }

    #[test]
    fn validate_accepts_forest() {
        assert!(registry().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unregistered_parent() {
        let mut registry = ModelRegistry::new();
        registry.register(comments());
        let err = registry.validate().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn validate_rejects_cycles() {
        let mut registry = ModelRegistry::new();
        registry.register(ping());
        registry.register(pong());
        let err = registry.validate().unwrap_err();
        assert!(err.message().contains("cyclic"));
    }
}
