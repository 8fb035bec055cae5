// Type registry for polymorphic node reconstruction
//
// This module provides a global registry mapping node type tags to the structural kind used to
// build them. Tags can be registered at runtime by both metagraph-core and downstream crates
// (e.g. a crawler registering "ScrapeSession" as a meta node).

use crate::properties::{NodeKind, DIR_NODE_TAG, FILE_NODE_TAG, META_NODE_TAG, ROOT_META_TAG};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Global singleton type registry with the built-in node types
pub static TYPES: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::create);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub kind: NodeKind,
    pub description: &'static str,
}

impl TypeDefinition {
    pub fn new(kind: NodeKind) -> Self {
        TypeDefinition {
            kind,
            description: "",
        }
    }

    pub fn described(kind: NodeKind, description: &'static str) -> Self {
        TypeDefinition { kind, description }
    }
}

/// Thread-safe registry of node type definitions
///
/// The load path looks every `type_tag` up here; a tag that was never registered makes the
/// document unloadable.
pub struct TypeRegistry(Arc<RwLock<HashMap<String, Arc<TypeDefinition>>>>);

impl Clone for TypeRegistry {
    fn clone(&self) -> Self {
        TypeRegistry(self.0.clone())
    }
}

impl TypeRegistry {
    /// Create registry with built-in types
    pub fn create() -> Self {
        let registry = TypeRegistry(Arc::new(RwLock::new(HashMap::new())));

        registry.register(
            META_NODE_TAG.to_string(),
            TypeDefinition::described(NodeKind::Meta, "Free-standing metadata record"),
        );
        registry.register(
            FILE_NODE_TAG.to_string(),
            TypeDefinition::described(NodeKind::File, "File on disk"),
        );
        registry.register(
            DIR_NODE_TAG.to_string(),
            TypeDefinition::described(NodeKind::Dir, "Directory on disk"),
        );
        registry.register(
            ROOT_META_TAG.to_string(),
            TypeDefinition::described(NodeKind::Root, "Graph root directory"),
        );

        registry
    }

    /// Register a type definition
    ///
    /// If a type with this tag already exists, it will be overwritten and a log message emitted.
    pub fn register(&self, type_tag: String, definition: TypeDefinition) {
        let mut writer = self.0.write();

        if let Some(existing) = writer.get(&type_tag) {
            tracing::info!(
                "[TypeRegistry::register] Overwriting existing type '{}' ({} -> {})",
                type_tag,
                existing.kind,
                definition.kind
            );
        }

        writer.insert(type_tag, Arc::new(definition));
    }

    /// Retrieve a type definition by tag
    pub fn get(&self, type_tag: &str) -> Option<Arc<TypeDefinition>> {
        self.0.read().get(type_tag).cloned()
    }

    pub fn kind_of(&self, type_tag: &str) -> Option<NodeKind> {
        self.0.read().get(type_tag).map(|def| def.kind)
    }

    /// List all registered type tags, sorted
    pub fn list_types(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.0.read().keys().cloned().collect();
        tags.sort();
        tags
    }
}
