//! Local forwarders for inherited methods, so they can be wrapped per class.

use super::introspect::list_callables;
use crate::host::namespace::{qualify, split_qualified};
use crate::host::{Runtime, Sub};
use crate::{Error, Result};
use std::collections::HashSet;
use tracing::debug;

/// Bind in `namespace` a forwarder for every inherited, non-overridden method.
///
/// Only the direct parents are consulted, in declared order, and the first
/// parent defining a name wins. Methods further up stay reachable through
/// normal inheritance and are not forwarded. A forwarder delegates, at call
/// time, to the nearest implementation above `namespace`. Returns the
/// qualified names of the forwarders created.
pub fn expand(rt: &mut Runtime, namespace: &str) -> Result<Vec<String>> {
    let parents = rt.parents(namespace).to_vec();
    if parents.is_empty() {
        return Ok(Vec::new());
    }

    let mut taken: HashSet<String> = list_callables(rt, namespace)
        .iter()
        .filter_map(|name| split_qualified(name).map(|(_, member)| member.to_string()))
        .collect();

    let mut inherited = Vec::new();
    for parent in &parents {
        for name in list_callables(rt, parent) {
            if let Some((_, member)) = split_qualified(&name) {
                if taken.insert(member.to_string()) {
                    inherited.push(member.to_string());
                }
            }
        }
    }

    let mut created = Vec::with_capacity(inherited.len());
    for method in inherited {
        let qualified = qualify(namespace, &method);
        rt.define_sub(&qualified, forwarder(namespace, &method))?;
        debug!(forwarder = %qualified, "Synthesized inherited-method forwarder");
        created.push(qualified);
    }
    Ok(created)
}

fn forwarder(namespace: &str, method: &str) -> Sub {
    let class = namespace.to_string();
    let method = method.to_string();
    Sub::new(qualify(namespace, &method), move |rt, shape, args| {
        // `args` still starts with the invocant.
        let next = rt
            .resolve_method_above(&class, &method)
            .ok_or_else(|| Error::MethodNotFound {
                class: class.clone(),
                method: method.clone(),
            })?;
        next.call(rt, shape, args)
    })
}
