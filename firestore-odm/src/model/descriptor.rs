use std::fmt::{Debug, Formatter};

/// Static description of one declared data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    alias: Option<&'static str>,
    has_default: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str) -> Self {
        FieldSpec {
            name,
            alias: None,
            has_default: false,
        }
    }

    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub const fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn alias(&self) -> Option<&'static str> {
        self.alias
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// Key the field is stored under: the alias when `by_alias` and one is declared.
    pub fn wire_name(&self, by_alias: bool) -> &'static str {
        match (by_alias, self.alias) {
            (true, Some(alias)) => alias,
            _ => self.name,
        }
    }
}

/// Static schema metadata of a document model.
///
/// One descriptor exists per model type, as a `static`. The parent edge is a function
/// pointer so that models can refer to types declared later in the crate; the model
/// registry checks that the edges form a forest.
pub struct ModelDescriptor {
    model_name: &'static str,
    collection_name: &'static str,
    parent: Option<fn() -> &'static ModelDescriptor>,
    fields: &'static [FieldSpec],
}

impl ModelDescriptor {
    pub const fn new(
        model_name: &'static str,
        collection_name: &'static str,
        parent: Option<fn() -> &'static ModelDescriptor>,
        fields: &'static [FieldSpec],
    ) -> Self {
        ModelDescriptor {
            model_name,
            collection_name,
            parent,
            fields,
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model_name
    }

    pub fn collection_name(&self) -> &'static str {
        self.collection_name
    }

    pub fn parent(&self) -> Option<&'static ModelDescriptor> {
        self.parent.map(|parent| parent())
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Returns `true` when `other` is the declared parent type.
    pub fn is_child_of(&self, other: &ModelDescriptor) -> bool {
        self.parent().is_some_and(|parent| parent == other)
    }

    /// Number of ancestors along the declared parent chain. Stops counting if the chain
    /// loops, which the registry rejects anyway.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(parent) = current {
            depth += 1;
            if depth > 64 || parent == self {
                break;
            }
            current = parent.parent();
        }
        depth
    }
}

impl PartialEq for ModelDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ModelDescriptor {}

impl Debug for ModelDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("model_name", &self.model_name)
            .field("collection_name", &self.collection_name)
            .field("parent", &self.parent().map(|p| p.model_name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: [FieldSpec; 2] = [
        FieldSpec::new("name"),
        FieldSpec::new("display_name").with_alias("displayName").with_default(),
    ];

    fn root() -> &'static ModelDescriptor {
        static ROOT: ModelDescriptor = ModelDescriptor::new("Root", "roots", None, &FIELDS);
        &ROOT
    }

    fn child() -> &'static ModelDescriptor {
        static CHILD: ModelDescriptor = ModelDescriptor::new("Child", "children", Some(root), &[]);
        &CHILD
    }

    fn grandchild() -> &'static ModelDescriptor {
        static GRANDCHILD: ModelDescriptor =
            ModelDescriptor::new("Grandchild", "grandchildren", Some(child), &[]);
        &GRANDCHILD
    }

    #[test]
    fn wire_name_prefers_alias() {
        assert_eq!(FIELDS[1].wire_name(true), "displayName");
        assert_eq!(FIELDS[1].wire_name(false), "display_name");
        assert_eq!(FIELDS[0].wire_name(true), "name");
        assert!(FIELDS[1].has_default());
    }

    #[test]
    fn parent_edges_resolve() {
        assert!(root().is_top_level());
        assert_eq!(child().parent(), Some(root()));
        assert!(grandchild().is_child_of(child()));
        assert!(!grandchild().is_child_of(root()));
    }

    #[test]
    fn depth_counts_ancestors() {
        assert_eq!(root().depth(), 0);
        assert_eq!(child().depth(), 1);
        assert_eq!(grandchild().depth(), 2);
    }

    #[test]
    fn descriptors_compare_by_identity() {
        assert_eq!(root(), root());
        assert_ne!(root(), child());
    }
}
