//! Member descriptors and the per-class member table

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{IntrospectError, IntrospectResult};
use crate::host::{FieldId, FieldRef, MethodId, MethodRef};
use crate::value::{ParamType, TemplateValue};

// ============================================================================
// Property Descriptors
// ============================================================================

/// A property read through a zero-argument accessor
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    read_method: Option<MethodRef>,
}

impl PropertyDescriptor {
    /// Create a property descriptor
    pub fn new(name: String, read_method: Option<MethodRef>) -> Self {
        Self { name, read_method }
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read accessor
    pub fn read_method(&self) -> Option<&MethodRef> {
        self.read_method.as_ref()
    }
}

/// A property read through a one-argument (index) accessor
#[derive(Debug, Clone)]
pub struct IndexedPropertyDescriptor {
    name: String,
    read_method: Option<MethodRef>,
    indexed_read_method: Option<MethodRef>,
}

impl IndexedPropertyDescriptor {
    /// Create an indexed property descriptor
    pub fn new(
        name: String,
        read_method: Option<MethodRef>,
        indexed_read_method: Option<MethodRef>,
    ) -> Self {
        Self {
            name,
            read_method,
            indexed_read_method,
        }
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whole-value read accessor, if any
    pub fn read_method(&self) -> Option<&MethodRef> {
        self.read_method.as_ref()
    }

    /// Indexed read accessor
    pub fn indexed_read_method(&self) -> Option<&MethodRef> {
        self.indexed_read_method.as_ref()
    }
}

/// Raw property metadata as reported by the platform
#[derive(Debug, Clone)]
pub enum PropertyInfo {
    /// Plain property
    Simple(PropertyDescriptor),
    /// Indexed property
    Indexed(IndexedPropertyDescriptor),
}

impl PropertyInfo {
    /// Property name
    pub fn name(&self) -> &str {
        match self {
            PropertyInfo::Simple(pd) => pd.name(),
            PropertyInfo::Indexed(ipd) => ipd.name(),
        }
    }

    /// Whether this is an indexed property
    pub fn is_indexed(&self) -> bool {
        matches!(self, PropertyInfo::Indexed(_))
    }
}

// ============================================================================
// Overloaded Methods
// ============================================================================

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

/// Methods sharing one exposed name, distinguished at call time
#[derive(Debug, Clone)]
pub struct OverloadedMethods {
    id: u64,
    name: String,
    methods: Vec<MethodRef>,
}

impl OverloadedMethods {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Group identity
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Exposed name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candidate methods in insertion order
    pub fn methods(&self) -> &[MethodRef] {
        &self.methods
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the group has no candidates
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Add a candidate; returns false if that exact method is already present
    pub fn add_method(&mut self, method: MethodRef) -> bool {
        if self.methods.iter().any(|m| m.id() == method.id()) {
            return false;
        }
        self.methods.push(method);
        true
    }

    /// Pick the candidate that best fits the arguments
    ///
    /// Only candidates with matching arity are considered. Each argument is
    /// scored against its parameter type; the highest total wins. No
    /// applicable candidate, or a tie for the best score, is an error.
    pub fn select(&self, args: &[TemplateValue]) -> IntrospectResult<&MethodRef> {
        let mut best: Option<(u32, &MethodRef)> = None;
        let mut ambiguous = false;

        for method in &self.methods {
            let params = method.param_types();
            if params.len() != args.len() {
                continue;
            }
            let score = params
                .iter()
                .zip(args)
                .try_fold(0u32, |acc, (param, arg)| {
                    param.match_score(arg).map(|s| acc + s as u32)
                });
            let Some(score) = score else {
                continue;
            };
            match best {
                Some((best_score, _)) if score < best_score => {}
                Some((best_score, _)) if score == best_score => ambiguous = true,
                _ => {
                    best = Some((score, method));
                    ambiguous = false;
                }
            }
        }

        let arg_types: Vec<&str> = args.iter().map(|a| a.type_name()).collect();
        match best {
            Some(_) if ambiguous => Err(IntrospectError::model(format!(
                "ambiguous call to {}({})",
                self.name,
                arg_types.join(", ")
            ))),
            Some((_, method)) => Ok(method),
            None => Err(IntrospectError::model(format!(
                "no overload of {} accepts ({})",
                self.name,
                arg_types.join(", ")
            ))),
        }
    }
}

// ============================================================================
// Member Descriptor
// ============================================================================

/// How to read or invoke one template-visible member
#[derive(Debug, Clone)]
pub enum MemberDescriptor {
    /// Plain property, read on every access
    Property(PropertyDescriptor),
    /// Indexed property, exposed as a callable
    IndexedProperty(IndexedPropertyDescriptor),
    /// Public field, read on every access
    Field(FieldRef),
    /// Single method
    Method(MethodRef),
    /// Several methods sharing one name
    Overloaded(OverloadedMethods),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DescriptorKey {
    Property(Option<MethodId>),
    IndexedProperty(Option<MethodId>),
    Field(FieldId),
    Method(MethodId),
    Overloaded(u64),
}

impl MemberDescriptor {
    fn key(&self) -> DescriptorKey {
        match self {
            MemberDescriptor::Property(pd) => {
                DescriptorKey::Property(pd.read_method().map(|m| m.id()))
            }
            MemberDescriptor::IndexedProperty(ipd) => {
                DescriptorKey::IndexedProperty(ipd.indexed_read_method().map(|m| m.id()))
            }
            MemberDescriptor::Field(field) => DescriptorKey::Field(field.id()),
            MemberDescriptor::Method(method) => DescriptorKey::Method(method.id()),
            MemberDescriptor::Overloaded(group) => DescriptorKey::Overloaded(group.id()),
        }
    }

    /// Whether resolved adapters for this member may be cached per instance
    ///
    /// Properties and fields are re-read on every access since the value may
    /// change between accesses.
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            MemberDescriptor::IndexedProperty(_)
                | MemberDescriptor::Method(_)
                | MemberDescriptor::Overloaded(_)
        )
    }

    /// Short kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            MemberDescriptor::Property(_) => "property",
            MemberDescriptor::IndexedProperty(_) => "indexed property",
            MemberDescriptor::Field(_) => "field",
            MemberDescriptor::Method(_) => "method",
            MemberDescriptor::Overloaded(_) => "overloaded method",
        }
    }
}

impl PartialEq for MemberDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for MemberDescriptor {}

impl Hash for MemberDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

// ============================================================================
// Class Introspection Table
// ============================================================================

/// Method → declared parameter types, for methods exposed without overloading
#[derive(Debug, Default, Clone)]
pub struct ArgTypeIndex {
    types: FxHashMap<MethodId, Arc<[ParamType]>>,
}

impl ArgTypeIndex {
    /// Record a method's parameter types
    pub fn insert(&mut self, method: &MethodRef) {
        self.types
            .insert(method.id(), Arc::from(method.param_types().to_vec()));
    }

    /// Forget a method
    pub fn remove(&mut self, method: &MethodRef) -> bool {
        self.types.remove(&method.id()).is_some()
    }

    /// Parameter types of a method
    pub fn get(&self, method: &MethodRef) -> Option<Arc<[ParamType]>> {
        self.types.get(&method.id()).cloned()
    }

    /// Whether a method is recorded
    pub fn contains(&self, method: &MethodRef) -> bool {
        self.types.contains_key(&method.id())
    }

    /// Number of recorded methods
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Member name → descriptor for one class. Immutable once built.
#[derive(Debug)]
pub struct ClassIntrospectionTable {
    class_name: String,
    members: FxHashMap<String, MemberDescriptor>,
    arg_types: ArgTypeIndex,
}

impl ClassIntrospectionTable {
    /// Table with no members
    pub fn empty(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            members: FxHashMap::default(),
            arg_types: ArgTypeIndex::default(),
        }
    }

    /// Name of the introspected class
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Descriptor for a member name
    pub fn get(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.get(name)
    }

    /// Whether a member exists
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Member names (unordered)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(|k| k.as_str())
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Parameter type index
    pub fn arg_types(&self) -> &ArgTypeIndex {
        &self.arg_types
    }

    /// Parameter types recorded for an exposed method
    pub fn arg_types_of(&self, method: &MethodRef) -> IntrospectResult<Arc<[ParamType]>> {
        self.arg_types.get(method).ok_or_else(|| {
            IntrospectError::model(format!(
                "no argument types recorded for {} in {}",
                method.qualified_name(),
                self.class_name
            ))
        })
    }
}

/// Mutable table under construction
///
/// Insertions follow "last write wins" per name. [`finish`](Self::finish)
/// hands out the immutable table.
#[derive(Debug)]
pub struct ClassTableBuilder {
    table: ClassIntrospectionTable,
}

impl ClassTableBuilder {
    /// Start an empty table
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            table: ClassIntrospectionTable::empty(class_name),
        }
    }

    /// Insert or overwrite a member, returning the previous descriptor
    pub fn put(&mut self, name: &str, desc: MemberDescriptor) -> Option<MemberDescriptor> {
        self.table.members.insert(name.to_string(), desc)
    }

    /// Current descriptor for a name
    pub fn get(&self, name: &str) -> Option<&MemberDescriptor> {
        self.table.members.get(name)
    }

    /// Current descriptor for a name, mutably
    pub fn get_mut(&mut self, name: &str) -> Option<&mut MemberDescriptor> {
        self.table.members.get_mut(name)
    }

    /// Parameter type index being built
    pub fn arg_types_mut(&mut self) -> &mut ArgTypeIndex {
        &mut self.table.arg_types
    }

    /// Drop a method's parameter types unless another member still binds it
    ///
    /// An accessor can be reachable both as an indexed property and as a
    /// plain method under different names; its entry stays while either
    /// remains in the table.
    pub fn release_arg_types(&mut self, method: &MethodRef) -> bool {
        let id = method.id();
        let still_bound = self.table.members.values().any(|desc| match desc {
            MemberDescriptor::Method(m) => m.id() == id,
            MemberDescriptor::IndexedProperty(ipd) => {
                ipd.indexed_read_method().map(|m| m.id()) == Some(id)
            }
            _ => false,
        });
        !still_bound && self.table.arg_types.remove(method)
    }

    /// Finish construction
    pub fn finish(self) -> ClassIntrospectionTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostClass, HostObject};
    use crate::value::HostValue;
    use std::any::Any;

    struct Obj;

    impl HostObject for Obj {
        fn host_class(&self) -> Arc<HostClass> {
            unreachable!("not invoked")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn formatter_methods() -> Vec<MethodRef> {
        HostClass::builder("Formatter")
            .method("format", vec![ParamType::Int], |_: &Obj, _| Ok(HostValue::Null))
            .method("format", vec![ParamType::Float], |_: &Obj, _| Ok(HostValue::Null))
            .method("format", vec![ParamType::Str, ParamType::Int], |_: &Obj, _| {
                Ok(HostValue::Null)
            })
            .method("format", vec![ParamType::Any], |_: &Obj, _| Ok(HostValue::Null))
            .build()
            .unwrap()
            .declared_methods()
            .to_vec()
    }

    fn group_of(methods: &[MethodRef]) -> OverloadedMethods {
        let mut group = OverloadedMethods::new("format");
        for m in methods {
            group.add_method(m.clone());
        }
        group
    }

    #[test]
    fn test_group_rejects_duplicates() {
        let methods = formatter_methods();
        let mut group = OverloadedMethods::new("format");
        assert!(group.add_method(methods[0].clone()));
        assert!(!group.add_method(methods[0].clone()));
        assert!(group.add_method(methods[1].clone()));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_select_prefers_exact_match() {
        let methods = formatter_methods();
        let group = group_of(&methods);

        let picked = group.select(&[TemplateValue::Int(1)]).unwrap();
        assert_eq!(picked.id(), methods[0].id());

        let picked = group.select(&[TemplateValue::Float(1.5)]).unwrap();
        assert_eq!(picked.id(), methods[1].id());

        let picked = group.select(&["x".into(), TemplateValue::Int(2)]).unwrap();
        assert_eq!(picked.id(), methods[2].id());

        let picked = group.select(&[TemplateValue::Bool(true)]).unwrap();
        assert_eq!(picked.id(), methods[3].id());
    }

    #[test]
    fn test_select_no_match_or_ambiguous() {
        let methods = formatter_methods();
        let group = group_of(&methods);
        assert!(group.select(&[]).is_err());
        assert!(group.select(&["x".into()]).is_ok());

        // Int widens to Float and Any accepts anything: both are loose matches
        let tie = group_of(&[methods[1].clone(), methods[3].clone()]);
        assert!(matches!(
            tie.select(&[TemplateValue::Int(1)]),
            Err(IntrospectError::Model(_))
        ));
    }

    #[test]
    fn test_descriptor_identity() {
        let methods = formatter_methods();
        let a = MemberDescriptor::Method(methods[0].clone());
        let b = MemberDescriptor::Method(methods[0].clone());
        let c = MemberDescriptor::Method(methods[1].clone());
        assert_eq!(a, b);
        assert_ne!(a, c);

        let g = MemberDescriptor::Overloaded(group_of(&methods));
        assert_eq!(g.clone(), g);
        assert!(g.is_cacheable());
        assert!(!MemberDescriptor::Property(PropertyDescriptor::new("p".into(), None)).is_cacheable());
    }

    #[test]
    fn test_builder_last_write_wins() {
        let methods = formatter_methods();
        let mut builder = ClassTableBuilder::new("Formatter");
        builder.put("format", MemberDescriptor::Method(methods[0].clone()));
        let previous = builder.put("format", MemberDescriptor::Method(methods[1].clone()));
        assert!(previous.is_some());

        let table = builder.finish();
        assert_eq!(table.len(), 1);
        match table.get("format") {
            Some(MemberDescriptor::Method(m)) => assert_eq!(m.id(), methods[1].id()),
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_release_keeps_types_still_bound() {
        let methods = formatter_methods();
        let mut builder = ClassTableBuilder::new("Formatter");
        builder.arg_types_mut().insert(&methods[0]);
        builder.put(
            "cell",
            MemberDescriptor::IndexedProperty(IndexedPropertyDescriptor::new(
                "cell".into(),
                None,
                Some(methods[0].clone()),
            )),
        );
        builder.put("format", MemberDescriptor::Overloaded(group_of(&methods)));

        assert!(!builder.release_arg_types(&methods[0]));
        assert!(builder.arg_types_mut().contains(&methods[0]));

        builder.put("cell", MemberDescriptor::Method(methods[1].clone()));
        assert!(builder.release_arg_types(&methods[0]));
        assert!(!builder.arg_types_mut().contains(&methods[0]));
    }
}
