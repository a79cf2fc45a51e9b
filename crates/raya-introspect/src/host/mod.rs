//! Host reflection model
//!
//! Describes the classes, methods, fields and instances of the host platform
//! in a form the introspectors can enumerate. Embedders describe each exposed
//! type once with [`ClassBuilder`] and implement [`HostObject`] for its
//! instances.
//!
//! ## Metadata order
//!
//! The platform reports members ancestor-first: a parent's declarations come
//! before its child's, and an interface's declarations come before the class
//! that implements it. Overrides therefore appear *after* the declaration
//! they override, and the same method name may be reported more than once.
//! Properties are the exception: each name is reported once, with the most
//! derived declaration.

mod builder;

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::accessible::MethodSignature;
use crate::error::{HostFault, IntrospectError, IntrospectResult};
use crate::member::PropertyInfo;
use crate::value::{HostValue, ParamType};

pub use builder::ClassBuilder;

// ============================================================================
// Identity
// ============================================================================

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_METHOD_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique class identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-unique method identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(u64);

impl MethodId {
    fn next() -> Self {
        MethodId(NEXT_METHOD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-unique field identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    fn next() -> Self {
        FieldId(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Visibility of a class or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Reachable from anywhere
    #[default]
    Public,
    /// Reachable only from the declaring package
    Package,
    /// Reachable only from the declaring class
    Private,
}

// ============================================================================
// Host Objects
// ============================================================================

/// An instance of a host class
pub trait HostObject: Any + Send + Sync {
    /// Runtime class of this instance
    fn host_class(&self) -> Arc<HostClass>;

    /// Access the concrete value for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Downcast a host object to its concrete type
pub fn downcast<T: HostObject>(obj: &dyn HostObject) -> Result<&T, HostFault> {
    obj.as_any().downcast_ref::<T>().ok_or_else(|| {
        HostFault::new(format!(
            "receiver of class {} is not a {}",
            obj.host_class().name(),
            std::any::type_name::<T>()
        ))
    })
}

/// Callable body of a host method
pub type Invoker =
    Arc<dyn Fn(&dyn HostObject, &[HostValue]) -> Result<HostValue, HostFault> + Send + Sync>;

/// Reader of a host field
pub type FieldReader = Arc<dyn Fn(&dyn HostObject) -> Result<HostValue, HostFault> + Send + Sync>;

/// Shared handle to a host method
pub type MethodRef = Arc<HostMethod>;

/// Shared handle to a host field
pub type FieldRef = Arc<HostField>;

// ============================================================================
// Methods and Fields
// ============================================================================

/// Reflective metadata for one host method
pub struct HostMethod {
    id: MethodId,
    name: String,
    declaring_class: String,
    params: Vec<ParamType>,
    visibility: Visibility,
    /// `None` for abstract (interface) methods
    invoker: Option<Invoker>,
}

impl HostMethod {
    pub(crate) fn new(
        name: String,
        declaring_class: String,
        params: Vec<ParamType>,
        visibility: Visibility,
        invoker: Option<Invoker>,
    ) -> Self {
        Self {
            id: MethodId::next(),
            name,
            declaring_class,
            params,
            visibility,
            invoker,
        }
    }

    /// Method identity
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the declaring class
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Declared parameter types
    pub fn param_types(&self) -> &[ParamType] {
        &self.params
    }

    /// Declared visibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the method is public
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the method has no body
    pub fn is_abstract(&self) -> bool {
        self.invoker.is_none()
    }

    /// Name and parameter types
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(&self.name, self.params.clone())
    }

    /// `Class.method` form used in diagnostics and safety rules
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_class, self.name)
    }

    /// Run this exact method body against a receiver
    pub fn invoke(&self, target: &dyn HostObject, args: &[HostValue]) -> Result<HostValue, HostFault> {
        match &self.invoker {
            Some(invoker) => invoker(target, args),
            None => Err(HostFault::new(format!(
                "{} is abstract",
                self.qualified_name()
            ))),
        }
    }
}

impl fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(
            f,
            "{:?} {}({})",
            self.visibility,
            self.qualified_name(),
            params.join(", ")
        )
    }
}

/// Reflective metadata for one host field
pub struct HostField {
    id: FieldId,
    name: String,
    declaring_class: String,
    visibility: Visibility,
    reader: FieldReader,
}

impl HostField {
    /// Field identity
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the declaring class
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Whether the field is public
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Read the field from a receiver
    pub fn read(&self, target: &dyn HostObject) -> Result<HostValue, HostFault> {
        (self.reader)(target)
    }
}

impl fmt::Debug for HostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}.{}", self.visibility, self.declaring_class, self.name)
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Reflective metadata for one host class or interface
pub struct HostClass {
    id: ClassId,
    name: String,
    visibility: Visibility,
    is_interface: bool,
    parent: Option<Arc<HostClass>>,
    interfaces: Vec<Arc<HostClass>>,
    methods: Vec<MethodRef>,
    properties: Vec<PropertyInfo>,
    fields: Vec<FieldRef>,
    /// Set when the platform refuses to hand out metadata for this class
    denial: Option<String>,
}

impl HostClass {
    /// Start describing a public class
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name.into())
    }

    /// Class identity
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the class itself is public
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Direct superclass
    pub fn parent(&self) -> Option<&Arc<HostClass>> {
        self.parent.as_ref()
    }

    /// Directly implemented interfaces
    pub fn interfaces(&self) -> &[Arc<HostClass>] {
        &self.interfaces
    }

    /// Methods declared by this class only
    pub fn declared_methods(&self) -> &[MethodRef] {
        &self.methods
    }

    /// Properties declared by this class only
    pub fn declared_properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// Superclass chain starting with this class and ending at the root
    pub fn ancestry(&self) -> Vec<&HostClass> {
        let mut chain = vec![self];
        let mut current = self.parent.as_deref();
        while let Some(class) = current {
            chain.push(class);
            current = class.parent.as_deref();
        }
        chain
    }

    /// Whether this class is, extends or implements the named class
    pub fn is_a(&self, name: &str) -> bool {
        self.ancestry().into_iter().any(|class| {
            class.name == name || class.interfaces.iter().any(|iface| iface.is_a(name))
        })
    }

    /// Most-derived concrete implementation of a signature (virtual dispatch)
    pub fn find_method(&self, signature: &MethodSignature) -> Option<&MethodRef> {
        self.ancestry().into_iter().find_map(|class| {
            class
                .methods
                .iter()
                .find(|m| !m.is_abstract() && m.signature() == *signature)
        })
    }

    /// Most-derived method of any visibility with the given name and arity
    pub fn find_method_by_name(&self, name: &str, arity: usize) -> Option<&MethodRef> {
        self.ancestry().into_iter().find_map(|class| {
            class
                .methods
                .iter()
                .find(|m| m.name() == name && m.param_types().len() == arity)
        })
    }

    /// Public methods callable on this class, one per signature, most derived first
    pub fn public_methods(&self) -> Vec<MethodRef> {
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        self.collect_public_methods(&mut seen, &mut result);
        result
    }

    fn collect_public_methods(
        &self,
        seen: &mut FxHashSet<MethodSignature>,
        out: &mut Vec<MethodRef>,
    ) {
        for method in &self.methods {
            // A non-public redeclaration still hides the ancestor's signature
            if seen.insert(method.signature()) && method.is_public() {
                out.push(method.clone());
            }
        }
        if let Some(parent) = &self.parent {
            parent.collect_public_methods(seen, out);
        }
        for iface in &self.interfaces {
            iface.collect_public_methods(seen, out);
        }
    }

    /// Fail if the platform refuses to introspect this class
    pub fn check_introspectable(&self) -> IntrospectResult<()> {
        match &self.denial {
            Some(reason) => Err(IntrospectError::Introspection {
                class: self.name.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// All declared methods of the hierarchy, ancestors first
    pub fn hierarchy_methods(&self) -> Vec<MethodRef> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for class in self.ancestry().into_iter().rev() {
            for iface in &class.interfaces {
                iface.collect_interface_methods(&mut seen, &mut out);
            }
            for method in &class.methods {
                if seen.insert(method.id()) {
                    out.push(method.clone());
                }
            }
        }
        out
    }

    fn collect_interface_methods(&self, seen: &mut FxHashSet<MethodId>, out: &mut Vec<MethodRef>) {
        for iface in &self.interfaces {
            iface.collect_interface_methods(seen, out);
        }
        for method in &self.methods {
            if seen.insert(method.id()) {
                out.push(method.clone());
            }
        }
    }

    /// Properties of the hierarchy, ancestors first, one per name
    ///
    /// A property redeclared by a subclass replaces the ancestor's
    /// declaration, even when it names a different getter. The surviving
    /// descriptor keeps the position of the first declaration.
    pub fn hierarchy_properties(&self) -> Vec<PropertyInfo> {
        let mut winners: FxHashMap<&str, &PropertyInfo> = FxHashMap::default();
        for class in self.ancestry() {
            for property in &class.properties {
                winners.entry(property.name()).or_insert(property);
            }
        }

        let mut seen = FxHashSet::default();
        let mut out = Vec::with_capacity(winners.len());
        for class in self.ancestry().into_iter().rev() {
            for property in &class.properties {
                let name = property.name();
                if seen.insert(name) {
                    if let Some(winner) = winners.get(name) {
                        out.push((*winner).clone());
                    }
                }
            }
        }
        out
    }

    /// All declared fields of the hierarchy, ancestors first
    pub fn hierarchy_fields(&self) -> Vec<FieldRef> {
        self.ancestry()
            .into_iter()
            .rev()
            .flat_map(|class| class.fields.iter().cloned())
            .collect()
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("is_interface", &self.is_interface)
            .field("parent", &self.parent.as_ref().map(|p| p.name().to_string()))
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}
