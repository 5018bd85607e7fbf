//! Path-order extractor (spec §4.9): walks a document in document order,
//! registering every map key and list slot into a `path -> index` map that
//! the sorter later consults.

use crate::identifier::list_item_identifier;
use crate::path::Path;
use crate::value::Value;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PathOrder {
    index: HashMap<String, usize>,
    next: usize,
}

impl PathOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every path reachable from `value`, in deterministic
    /// document order. Only the first registration for a given path wins --
    /// walking a second document after the first extends the index with
    /// whatever paths weren't already seen.
    pub fn record(&mut self, value: &Value, additional_identifiers: &[String]) {
        self.walk(value, &Path::root(), additional_identifiers);
    }

    fn register(&mut self, path: &Path) {
        self.index.entry(path.to_dot_string()).or_insert_with(|| {
            let i = self.next;
            self.next += 1;
            i
        });
    }

    fn walk(&mut self, value: &Value, path: &Path, additional_identifiers: &[String]) {
        self.register(path);
        match value {
            Value::Map(map) => {
                // Ordered maps walk their key list already (insertion order);
                // a map without that guarantee would walk sorted keys -- our
                // `OrderedMap` is always the former, so this is just
                // insertion order.
                for key in map.keys() {
                    let child = path.push(key);
                    self.walk(map.get(key).expect("key came from map.keys()"), &child, additional_identifiers);
                }
            }
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    let child = match list_item_identifier(item, additional_identifiers) {
                        Some(id) => path.push(id.to_string().as_str()),
                        None => path.push(index),
                    };
                    self.walk(item, &child, additional_identifiers);
                }
            }
            _ => {}
        }
    }

    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }
}
