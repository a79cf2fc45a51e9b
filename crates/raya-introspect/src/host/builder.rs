//! Fluent builder for describing host classes
//!
//! ```ignore
//! let point = HostClass::builder("Point")
//!     .method("get_x", vec![], |p: &Point, _| Ok(p.x().into()))
//!     .method("move_by", vec![ParamType::Int], |p: &Point, args| { ... })
//!     .property("x", "get_x")
//!     .build()?;
//! ```

use std::sync::Arc;

use super::{
    downcast, ClassId, FieldId, FieldReader, HostClass, HostField, HostMethod, HostObject, Invoker,
    MethodRef, Visibility,
};
use crate::error::{HostFault, IntrospectError, IntrospectResult};
use crate::member::{IndexedPropertyDescriptor, PropertyDescriptor, PropertyInfo};
use crate::value::{HostValue, ParamType};

struct MethodSpec {
    name: String,
    params: Vec<ParamType>,
    visibility: Visibility,
    invoker: Option<Invoker>,
}

struct FieldSpec {
    name: String,
    visibility: Visibility,
    reader: FieldReader,
}

enum PropertySpec {
    Simple { name: String, getter: String },
    Indexed { name: String, getter: String },
}

/// Builder for [`HostClass`]
///
/// Created by [`HostClass::builder`].
pub struct ClassBuilder {
    name: String,
    visibility: Visibility,
    is_interface: bool,
    parent: Option<Arc<HostClass>>,
    interfaces: Vec<Arc<HostClass>>,
    methods: Vec<MethodSpec>,
    properties: Vec<PropertySpec>,
    fields: Vec<FieldSpec>,
    denial: Option<String>,
}

impl ClassBuilder {
    pub(super) fn new(name: String) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            is_interface: false,
            parent: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            fields: Vec::new(),
            denial: None,
        }
    }

    /// Make the class package-private
    pub fn package_private(mut self) -> Self {
        self.visibility = Visibility::Package;
        self
    }

    /// Make this an interface
    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    /// Set the superclass
    pub fn extends(mut self, parent: Arc<HostClass>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, iface: Arc<HostClass>) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Refuse reflective metadata for this class (e.g. sandboxed)
    pub fn deny_introspection(mut self, reason: impl Into<String>) -> Self {
        self.denial = Some(reason.into());
        self
    }

    /// Add a public method with a typed receiver
    pub fn method<T, F>(self, name: &str, params: Vec<ParamType>, body: F) -> Self
    where
        T: HostObject,
        F: Fn(&T, &[HostValue]) -> Result<HostValue, HostFault> + Send + Sync + 'static,
    {
        self.method_with_visibility(name, params, Visibility::Public, body)
    }

    /// Add a method with explicit visibility
    pub fn method_with_visibility<T, F>(
        mut self,
        name: &str,
        params: Vec<ParamType>,
        visibility: Visibility,
        body: F,
    ) -> Self
    where
        T: HostObject,
        F: Fn(&T, &[HostValue]) -> Result<HostValue, HostFault> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(move |target: &dyn HostObject, args: &[HostValue]| {
            body(downcast::<T>(target)?, args)
        });
        self.methods.push(MethodSpec {
            name: name.to_string(),
            params,
            visibility,
            invoker: Some(invoker),
        });
        self
    }

    /// Add a public method without a body (interface member)
    pub fn abstract_method(mut self, name: &str, params: Vec<ParamType>) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            params,
            visibility: Visibility::Public,
            invoker: None,
        });
        self
    }

    /// Declare a property read through a zero-argument getter
    pub fn property(mut self, name: &str, getter: &str) -> Self {
        self.properties.push(PropertySpec::Simple {
            name: name.to_string(),
            getter: getter.to_string(),
        });
        self
    }

    /// Declare an indexed property read through a one-argument getter
    pub fn indexed_property(mut self, name: &str, getter: &str) -> Self {
        self.properties.push(PropertySpec::Indexed {
            name: name.to_string(),
            getter: getter.to_string(),
        });
        self
    }

    /// Add a public field
    pub fn field<T, F>(self, name: &str, read: F) -> Self
    where
        T: HostObject,
        F: Fn(&T) -> Result<HostValue, HostFault> + Send + Sync + 'static,
    {
        self.field_with_visibility(name, Visibility::Public, read)
    }

    /// Add a field with explicit visibility
    pub fn field_with_visibility<T, F>(mut self, name: &str, visibility: Visibility, read: F) -> Self
    where
        T: HostObject,
        F: Fn(&T) -> Result<HostValue, HostFault> + Send + Sync + 'static,
    {
        let reader: FieldReader =
            Arc::new(move |target: &dyn HostObject| read(downcast::<T>(target)?));
        self.fields.push(FieldSpec {
            name: name.to_string(),
            visibility,
            reader,
        });
        self
    }

    /// Finish the class
    ///
    /// Fails if a property names a getter that neither this class nor an
    /// ancestor declares with the right arity.
    pub fn build(self) -> IntrospectResult<Arc<HostClass>> {
        let class_name = self.name;

        let methods: Vec<MethodRef> = self
            .methods
            .into_iter()
            .map(|spec| {
                Arc::new(HostMethod::new(
                    spec.name,
                    class_name.clone(),
                    spec.params,
                    spec.visibility,
                    spec.invoker,
                ))
            })
            .collect();

        let find_getter = |getter: &str, arity: usize| -> IntrospectResult<MethodRef> {
            methods
                .iter()
                .find(|m| m.name() == getter && m.param_types().len() == arity)
                .or_else(|| {
                    self.parent
                        .as_ref()
                        .and_then(|p| p.find_method_by_name(getter, arity))
                })
                .cloned()
                .ok_or_else(|| IntrospectError::Introspection {
                    class: class_name.clone(),
                    reason: format!("no getter {} taking {} argument(s)", getter, arity),
                })
        };

        let mut properties = Vec::with_capacity(self.properties.len());
        for spec in &self.properties {
            properties.push(match spec {
                PropertySpec::Simple { name, getter } => PropertyInfo::Simple(
                    PropertyDescriptor::new(name.clone(), Some(find_getter(getter, 0)?)),
                ),
                PropertySpec::Indexed { name, getter } => {
                    PropertyInfo::Indexed(IndexedPropertyDescriptor::new(
                        name.clone(),
                        None,
                        Some(find_getter(getter, 1)?),
                    ))
                }
            });
        }

        let fields = self
            .fields
            .into_iter()
            .map(|spec| {
                Arc::new(HostField {
                    id: FieldId::next(),
                    name: spec.name,
                    declaring_class: class_name.clone(),
                    visibility: spec.visibility,
                    reader: spec.reader,
                })
            })
            .collect();

        Ok(Arc::new(HostClass {
            id: ClassId::next(),
            name: class_name,
            visibility: self.visibility,
            is_interface: self.is_interface,
            parent: self.parent,
            interfaces: self.interfaces,
            methods,
            properties,
            fields,
            denial: self.denial,
        }))
    }
}
