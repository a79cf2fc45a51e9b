//! Accessible method index
//!
//! A method declared on a non-public class, or with non-public visibility,
//! cannot be called by templates even when it overrides a public one. The
//! index maps each method signature to the public declaration reachable
//! through the nearest public class or interface in the hierarchy, so the
//! introspectors can substitute an accessible equivalent for every accessor
//! they discover.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::host::{HostClass, MethodRef};
use crate::value::ParamType;

/// Method name plus parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: String,
    params: Vec<ParamType>,
}

impl MethodSignature {
    /// Create a signature
    pub fn new(name: &str, params: Vec<ParamType>) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Signature → publicly reachable method for one class
#[derive(Debug, Default)]
pub struct AccessibleMethodIndex {
    methods: FxHashMap<MethodSignature, MethodRef>,
}

impl AccessibleMethodIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index for a class
    ///
    /// A public class contributes all of its public methods (most-derived
    /// declaration per signature). A non-public class contributes nothing
    /// itself; its interfaces and superclass are searched instead.
    pub fn for_class(class: &HostClass) -> Self {
        let mut index = Self::new();
        index.populate(class);
        index
    }

    fn populate(&mut self, class: &HostClass) {
        if class.is_public() {
            for method in class.public_methods() {
                self.methods.entry(method.signature()).or_insert(method);
            }
        } else {
            for iface in class.interfaces() {
                self.populate(iface);
            }
            if let Some(parent) = class.parent() {
                self.populate(parent);
            }
        }
    }

    /// Accessible method for a signature
    pub fn get(&self, signature: &MethodSignature) -> Option<&MethodRef> {
        self.methods.get(signature)
    }

    /// Number of accessible signatures
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether nothing is accessible
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Public equivalent of a possibly-inaccessible method, if one exists
pub fn get_accessible_method(
    method: Option<&MethodRef>,
    index: &AccessibleMethodIndex,
) -> Option<MethodRef> {
    let method = method?;
    index.get(&method.signature()).cloned()
}
