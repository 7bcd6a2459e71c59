use crate::host::namespace::qualify;
use crate::host::Runtime;

/// Fully qualified names of the callables bound directly in `namespace`.
///
/// Scalars, arrays and child namespaces are not included. An unknown or empty
/// namespace yields an empty list.
pub fn list_callables(rt: &Runtime, namespace: &str) -> Vec<String> {
    rt.namespace(namespace)
        .map(|ns| {
            ns.callable_members()
                .map(|member| qualify(namespace, member))
                .collect()
        })
        .unwrap_or_default()
}
