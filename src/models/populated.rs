use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

/// A stored reference, replaced by the referenced entity when it still exists.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Populated<T> {
    Resolved(T),
    Missing(Uuid),
}

impl<T: Clone> Populated<T> {
    pub fn lookup(id: Uuid, found: &HashMap<Uuid, T>) -> Self {
        match found.get(&id) {
            Some(value) => Populated::Resolved(value.clone()),
            None => Populated::Missing(id),
        }
    }
}
