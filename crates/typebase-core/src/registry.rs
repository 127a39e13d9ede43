//! TypeRegistry - the process-wide descriptor cache.
//!
//! The registry maps Rust types to their canonical [`TypeDescriptor`]s. It is
//! created on first access, lives for the rest of the process and is never
//! reinitialised.
//!
//! # Storage Model
//!
//! - **Types**: descriptors are leaked on registration and indexed by
//!   `TypeId` (static lookup), canonical name and [`TypeHash`] (dynamic
//!   lookup).
//! - **Conversions**: user conversions between two registered types, keyed
//!   by the `(from, to)` pair of `TypeId`s.
//!
//! # Thread Safety
//!
//! Lookups take a shared `parking_lot::RwLock` read lock. A type's first
//! registration builds its descriptor without holding any lock (describing a
//! type may register the types it refers to), then inserts under the write
//! lock. If another thread won the race its descriptor is kept and ours is
//! discarded, so pointer identity holds for every type.
//!
//! # Example
//!
//! ```
//! use typebase_core::TypeRegistry;
//!
//! let registry = TypeRegistry::global();
//! let int = registry.find("int").unwrap();
//! assert_eq!(int.name(), "int");
//!
//! let zero = registry.create("int").unwrap();
//! assert_eq!(zero.get::<i32>().unwrap(), 0);
//!
//! assert!(registry.find("NoSuchType").is_err());
//! ```

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::TypeHash;
use crate::config::RegistryConfig;
use crate::descriptor::{ErasedValue, TypeDescriptor};
use crate::error::{ConversionError, ReflectError};
use crate::reflect::Reflect;
use crate::variant::Variant;

/// Erased user conversion from one registered type to another.
pub type ConvertFn =
    Arc<dyn Fn(&ErasedValue) -> Result<Arc<ErasedValue>, ConversionError> + Send + Sync>;

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

#[derive(Default)]
struct Tables {
    types: FxHashMap<TypeId, &'static TypeDescriptor>,
    names: FxHashMap<String, &'static TypeDescriptor>,
    hashes: FxHashMap<TypeHash, &'static TypeDescriptor>,
}

/// Registry of type descriptors and user conversions.
pub struct TypeRegistry {
    config: RegistryConfig,
    tables: RwLock<Tables>,
    conversions: RwLock<FxHashMap<(TypeId, TypeId), ConvertFn>>,
}

impl TypeRegistry {
    /// A registry separate from the global one.
    ///
    /// Only its own tables are local. Handle descriptors still resolve their
    /// pointee through `T::descriptor()`, and the conversion table still
    /// reads custom conversions from [`TypeRegistry::global`], so using a
    /// local registry can register types in the global one too.
    pub(crate) fn with_config(config: RegistryConfig) -> Self {
        let registry = Self {
            config,
            tables: RwLock::new(Tables::default()),
            conversions: RwLock::new(FxHashMap::default()),
        };
        registry.register_primitives();
        registry
    }

    // Must not go through `global()`: this runs inside its initialiser.
    fn register_primitives(&self) {
        self.descriptor_for::<()>();
        self.descriptor_for::<bool>();
        self.descriptor_for::<i8>();
        self.descriptor_for::<i16>();
        self.descriptor_for::<i32>();
        self.descriptor_for::<i64>();
        self.descriptor_for::<u8>();
        self.descriptor_for::<u16>();
        self.descriptor_for::<u32>();
        self.descriptor_for::<u64>();
        self.descriptor_for::<f32>();
        self.descriptor_for::<f64>();
        self.descriptor_for::<String>();
    }

    /// The process-wide registry, created with the default configuration on
    /// first access unless [`init_global`](Self::init_global) ran first.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(|| TypeRegistry::with_config(RegistryConfig::default()))
    }

    /// Create the global registry with a specific configuration.
    ///
    /// Fails with [`ReflectError::AlreadyInitialized`] once the registry
    /// exists; the existing registry is left untouched.
    pub fn init_global(config: RegistryConfig) -> Result<&'static TypeRegistry, ReflectError> {
        let mut created = false;
        let registry = GLOBAL.get_or_init(|| {
            created = true;
            TypeRegistry::with_config(config)
        });
        if created {
            Ok(registry)
        } else {
            tracing::warn!("type registry already initialized; configuration ignored");
            Err(ReflectError::AlreadyInitialized)
        }
    }

    /// Conversion policy of this registry.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Get the descriptor for `T`, registering it on first use.
    pub fn descriptor_for<T: Reflect>(&self) -> &'static TypeDescriptor {
        if let Some(desc) = self.tables.read().types.get(&TypeId::of::<T>()).copied() {
            return desc;
        }
        self.insert(T::describe().build())
    }

    /// Register `T` ahead of its first use, so it can be found by name.
    pub fn register<T: Reflect>(&self) -> &'static TypeDescriptor {
        self.descriptor_for::<T>()
    }

    fn insert(&self, desc: TypeDescriptor) -> &'static TypeDescriptor {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.types.get(&desc.type_id).copied() {
            return existing;
        }

        let desc: &'static TypeDescriptor = Box::leak(Box::new(desc));
        tables.types.insert(desc.type_id, desc);
        match tables.names.entry(desc.name.clone()) {
            Entry::Occupied(entry) => {
                tracing::warn!(
                    name = %desc.name,
                    existing = entry.get().rust_name(),
                    ignored = desc.rust_name(),
                    "type name already registered; keeping first binding"
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(desc);
                tables.hashes.insert(desc.hash, desc);
            }
        }

        tracing::debug!(
            name = %desc.name,
            category = %desc.category,
            rust_name = desc.rust_name,
            "registered type"
        );
        desc
    }

    /// Register a conversion from `From` to `To`.
    ///
    /// Custom conversions take part in the conversion table as a single step;
    /// they are never chained with other rules. A custom conversion between
    /// two built-in types replaces the built-in rule for that pair, even one
    /// the configuration switches off. Registering the same pair again
    /// replaces the previous function.
    pub fn register_conversion<From, To, F>(&self, convert: F)
    where
        From: Reflect,
        To: Reflect,
        F: Fn(&From) -> Result<To, ConversionError> + Send + Sync + 'static,
    {
        let from = self.descriptor_for::<From>();
        let to = self.descriptor_for::<To>();
        let erased: ConvertFn = Arc::new(move |value: &ErasedValue| {
            let value = value
                .downcast_ref::<From>()
                .ok_or_else(|| ConversionError::Custom(format!("expected {}", from.name())))?;
            let converted: Arc<ErasedValue> = Arc::new(convert(value)?);
            Ok(converted)
        });
        tracing::debug!(from = %from, to = %to, "registered conversion");
        self.conversions.write().insert((from.type_id, to.type_id), erased);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find a descriptor by canonical name.
    pub fn find(&self, name: &str) -> Result<&'static TypeDescriptor, ReflectError> {
        self.tables
            .read()
            .names
            .get(name)
            .copied()
            .ok_or_else(|| ReflectError::UnsupportedType {
                name: name.to_string(),
            })
    }

    /// Find a descriptor by the hash of its canonical name.
    pub fn find_by_hash(&self, hash: TypeHash) -> Option<&'static TypeDescriptor> {
        self.tables.read().hashes.get(&hash).copied()
    }

    /// Check if a type is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.read().names.contains_key(name)
    }

    /// All registered descriptors, sorted by name.
    pub fn descriptors(&self) -> Vec<&'static TypeDescriptor> {
        let mut all: Vec<_> = self.tables.read().types.values().copied().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    pub fn len(&self) -> usize {
        self.tables.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().types.is_empty()
    }

    /// The user conversion registered for `from -> to`, if any.
    pub fn custom_conversion(
        &self,
        from: &TypeDescriptor,
        to: &TypeDescriptor,
    ) -> Option<ConvertFn> {
        self.conversions
            .read()
            .get(&(from.type_id, to.type_id))
            .cloned()
    }

    // ==========================================================================
    // Construction
    // ==========================================================================

    /// Construct the default value of a type by name.
    pub fn create(&self, name: &str) -> Result<Variant, ReflectError> {
        let desc = self.find(name)?;
        let default = desc.vtable.default.ok_or_else(|| ReflectError::NotConstructible {
            type_name: desc.name.clone(),
        })?;
        Ok(Variant::from_parts(desc, default()))
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("config", &self.config)
            .field("types", &self.len())
            .field("conversions", &self.conversions.read().len())
            .finish()
    }
}
