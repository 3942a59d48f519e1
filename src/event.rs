//! Event records addressed by JSON pointer.

use std::collections::HashMap;

use crate::{
    pointer::{JsonPointer, PointerError},
    value::Value,
};

/// A structured event: a tree of values with an object at the root.
///
/// The evaluator only reads from events. [`Event::put`] exists for the code
/// that builds events before they reach a pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    data: HashMap<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a value as an event. Non-object values are stored under the
    /// empty key so that `/` still addresses them.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Event { data },
            other => {
                let mut data = HashMap::new();
                data.insert(String::new(), other);
                Event { data }
            }
        }
    }

    /// Look up the value at `pointer`.
    ///
    /// Objects are indexed by key and arrays by decimal index. Returns `None`
    /// when any segment is missing.
    pub fn get(&self, pointer: &JsonPointer) -> Option<&Value> {
        let mut segments = pointer.segments().iter();
        let first = segments.next()?;
        let mut current = self.data.get(first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Look up a value by pointer text.
    pub fn get_path(&self, path: &str) -> Result<Option<&Value>, PointerError> {
        let pointer = JsonPointer::parse(path)?;
        Ok(self.get(&pointer))
    }

    /// Set the value at `pointer`, creating intermediate objects as needed.
    ///
    /// An intermediate non-object value is replaced by an object.
    pub fn put(&mut self, pointer: &JsonPointer, value: Value) {
        let Some((last, parents)) = pointer.segments().split_last() else {
            return;
        };

        let mut map = &mut self.data;
        for segment in parents {
            let entry = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(HashMap::new()));
            if !matches!(entry, Value::Object(_)) {
                *entry = Value::Object(HashMap::new());
            }
            map = match entry {
                Value::Object(inner) => inner,
                _ => unreachable!("entry was just made an object"),
            };
        }
        map.insert(last.clone(), value);
    }

    pub fn contains(&self, pointer: &JsonPointer) -> bool {
        self.get(pointer).is_some()
    }

    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.data
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

impl From<serde_json::Value> for Event {
    fn from(v: serde_json::Value) -> Self {
        Event::from_value(Value::from(v))
    }
}

impl From<Event> for serde_json::Value {
    fn from(event: Event) -> Self {
        event.into_value().into()
    }
}

/// Anything the router can route: a record carrying an event.
pub trait Record {
    fn event(&self) -> &Event;
}

impl Record for Event {
    fn event(&self) -> &Event {
        self
    }
}

impl<R: Record + ?Sized> Record for std::sync::Arc<R> {
    fn event(&self) -> &Event {
        (**self).event()
    }
}
