//! Package name interner.
//!
//! Package names recur across every class of a bundle, so graph and diff
//! stages work with `PackageRef` handles instead of strings. Handles are
//! dense `u32` indices in first-seen order; they compare cheaply but say
//! nothing about lexical order. Sort by name when output order matters.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Handle to an interned package name.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageRef(u32);

impl PackageRef {
    /// Raw index into the owning interner.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        PackageRef(raw)
    }
}

impl fmt::Debug for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageRef({})", self.0)
    }
}

/// Error when interning a package name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct packages.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "package interner exceeded capacity: {} names, max is {}",
                count,
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

struct InternTable {
    map: FxHashMap<Arc<str>, u32>,
    names: Vec<Arc<str>>,
}

/// Thread-safe package interner.
///
/// Reads take a shared lock; only the first sighting of a name takes the
/// write lock.
pub struct PackageInterner {
    table: RwLock<InternTable>,
}

impl PackageInterner {
    pub fn new() -> Self {
        PackageInterner {
            table: RwLock::new(InternTable {
                map: FxHashMap::default(),
                names: Vec::with_capacity(64),
            }),
        }
    }

    /// Try to intern a dotted package name.
    pub fn try_intern(&self, name: &str) -> Result<PackageRef, InternError> {
        // Fast path: already interned
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(name) {
                return Ok(PackageRef(idx));
            }
        }

        let mut guard = self.table.write();

        // Double-check after acquiring write lock
        if let Some(&idx) = guard.map.get(name) {
            return Ok(PackageRef(idx));
        }

        let idx = u32::try_from(guard.names.len()).map_err(|_| InternError::Overflow {
            count: guard.names.len(),
        })?;
        let shared: Arc<str> = Arc::from(name);
        guard.names.push(Arc::clone(&shared));
        guard.map.insert(shared, idx);
        Ok(PackageRef(idx))
    }

    /// Intern a dotted package name.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` packages are interned.
    /// Use `try_intern` for fallible interning.
    pub fn intern(&self, name: &str) -> PackageRef {
        self.try_intern(name).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Find a previously interned name without inserting it.
    pub fn get(&self, name: &str) -> Option<PackageRef> {
        self.table.read().map.get(name).map(|&idx| PackageRef(idx))
    }

    /// Look up the name behind a handle.
    ///
    /// # Panics
    /// Panics if `package` was produced by a different interner.
    pub fn lookup(&self, package: PackageRef) -> Arc<str> {
        Arc::clone(&self.table.read().names[package.index()])
    }

    pub fn len(&self) -> usize {
        self.table.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PackageInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared interner handle for stages that run on worker threads.
#[derive(Clone)]
pub struct SharedPackageInterner(Arc<PackageInterner>);

impl SharedPackageInterner {
    pub fn new() -> Self {
        SharedPackageInterner(Arc::new(PackageInterner::new()))
    }
}

impl Default for SharedPackageInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedPackageInterner {
    type Target = PackageInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
