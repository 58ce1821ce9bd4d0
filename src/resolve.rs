//! Method set resolution with one level of embedded-type promotion.

use tracing::debug;

use crate::aggregate::TypeRegistry;
use crate::analysis::{Import, Method};

/// Ordered candidate methods and imports for one target type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The target's own methods, then each embedded type's methods in
    /// embedding order.
    pub methods: Vec<Method>,
    /// The target's own imports. Embedded types' imports are not included.
    pub imports: Vec<Import>,
}

/// Resolve the method set of `type_name`.
///
/// An unknown target resolves to an empty result. Embedded names without
/// a record (library types, qualified names) are skipped. Promotion stops
/// after one hop: types embedded by embedded types are not followed.
pub fn resolve(type_name: &str, registry: &TypeRegistry) -> ResolutionResult {
    let Some(record) = registry.get(type_name) else {
        debug!(type_name, "no declarations found for target type");
        return ResolutionResult::default();
    };

    let mut result = ResolutionResult {
        methods: record.methods.clone(),
        imports: record.imports.clone(),
    };

    for embedded in record.embedded_names() {
        match registry.get(embedded) {
            Some(inner) => {
                debug!(
                    type_name,
                    embedded = %embedded,
                    methods = inner.methods.len(),
                    "promoting embedded methods"
                );
                result.methods.extend(inner.methods.iter().cloned());
            }
            None => debug!(type_name, embedded = %embedded, "embedded type not parsed, skipping"),
        }
    }

    result
}
