//! Shared aliases and strongly-typed values used across the weave crates.
//!
//! ```rust
//! use wcommon::{GenerationOptions, MetadataMap, SessionId, TraceId};
//!
//! let session = SessionId::from("chat-1");
//! let trace = TraceId::new("trace-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3).with_max_tokens(64);
//! assert_eq!(session.as_str(), "chat-1");
//! assert_eq!(trace.to_string(), "trace-1");
//! assert_eq!(options.max_tokens, Some(64));
//! ```

pub mod future {
    //! Boxed future alias shared by every async trait in the workspace.
    //!
    //! ```rust
    //! use wcommon::BoxFuture;
    //!
    //! fn word_count<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.split_whitespace().count() })
    //! }
    //!
    //! let _future = word_count("hello there");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes and free-form metadata attached to turns and tool calls.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($name:ident) => {
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(SessionId);
    string_id!(TraceId);

    impl Default for SessionId {
        fn default() -> Self {
            Self::new("default")
        }
    }
}

pub mod model {
    //! Sampling settings carried by every model request.
    //!
    //! ```rust
    //! use wcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128)
    //!     .with_top_p(0.9);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.top_p, Some(0.9));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub top_p: Option<f32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }
    }
}

pub mod registry {
    //! Ordered name-keyed registry used by the tool set.
    //!
    //! Iteration follows key order so anything derived from a registry (tool
    //! definitions sent to a provider, for instance) is deterministic.
    //!
    //! ```rust
    //! use wcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! assert!(registry.try_insert("beta".to_string(), 2_u32).is_ok());
    //! assert!(registry.try_insert("alpha".to_string(), 1_u32).is_ok());
    //! assert!(registry.try_insert("alpha".to_string(), 3_u32).is_err());
    //!
    //! let keys: Vec<_> = registry.keys().cloned().collect();
    //! assert_eq!(keys, vec!["alpha".to_string(), "beta".to_string()]);
    //! ```

    use std::borrow::Borrow;
    use std::collections::BTreeMap;
    use std::collections::btree_map::Entry;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: BTreeMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Ord,
    {
        fn default() -> Self {
            Self {
                items: BTreeMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Ord,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        /// Inserts only when `key` is vacant; hands the value back otherwise.
        pub fn try_insert(&mut self, key: K, value: V) -> Result<(), V> {
            match self.items.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                    Ok(())
                }
                Entry::Occupied(_) => Err(value),
            }
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, SessionId, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{GenerationOptions, Registry, SessionId, TraceId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("chat-1");
        let trace = TraceId::from("trace-1");

        assert_eq!(session.as_str(), "chat-1");
        assert_eq!(trace.as_str(), "trace-1");
        assert_eq!(session.to_string(), "chat-1");
        assert_eq!(SessionId::default().as_str(), "default");
    }

    #[test]
    fn generation_options_default_to_provider_defaults() {
        let options = GenerationOptions::default();
        assert_eq!(options.temperature, None);
        assert_eq!(options.max_tokens, None);
        assert_eq!(options.top_p, None);

        let tuned = options.with_temperature(0.3).with_max_tokens(123);
        assert_eq!(tuned.temperature, Some(0.3));
        assert_eq!(tuned.max_tokens, Some(123));
    }

    #[test]
    fn registry_rejects_duplicate_keys_and_iterates_in_order() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.try_insert("zeta".to_string(), 1_u32).expect("vacant");
        registry.try_insert("alpha".to_string(), 2_u32).expect("vacant");
        let rejected = registry.try_insert("alpha".to_string(), 9_u32);
        assert_eq!(rejected, Err(9));

        assert_eq!(registry.get("alpha"), Some(&2));
        let values: Vec<_> = registry.values().copied().collect();
        assert_eq!(values, vec![2, 1]);

        assert_eq!(registry.remove("alpha"), Some(2));
        assert_eq!(registry.len(), 1);
    }
}
