//! Raya Introspect - Host object introspection for templates
//!
//! Exposes host objects to the template engine as named members: properties,
//! public fields, methods and overload groups. Member tables are built once
//! per class and shared; callable adapters are built once per instance and
//! cached on the instance.
//!
//! # Example
//!
//! ```ignore
//! use raya_introspect::{HostWrapper, IntrospectConfig, TemplateValue};
//!
//! let wrapper = HostWrapper::new(IntrospectConfig::default())?;
//! let point = wrapper.wrap_object(Arc::new(Point::new(1, 2)));
//!
//! assert_eq!(point.get("x")?, TemplateValue::Int(1));
//! let moved = point.get("move")?;
//! moved.as_method().unwrap().call(&[TemplateValue::Int(3)])?;
//! ```
//!
//! # Strategies
//!
//! Class metadata comes from one of two [`Introspector`]s, chosen once per
//! process by [`introspector::get_instance`]:
//!
//! - [`BeanInfoIntrospector`] uses the properties each class declares
//! - [`ConventionIntrospector`] derives properties from `get_`/`is_` names

#![warn(missing_docs)]

pub mod accessible;
pub mod callable;
pub mod config;
pub mod error;
pub mod host;
pub mod introspector;
pub mod member;
pub mod model;
pub mod policy;
pub mod value;
pub mod wrapper;

pub use accessible::{get_accessible_method, AccessibleMethodIndex, MethodSignature};
pub use callable::{OverloadedMethodsModel, SimpleMethodModel, TemplateMethod};
pub use config::{ConfigError, IntrospectConfig};
pub use error::{HostFault, IntrospectError, IntrospectResult};
pub use host::{
    downcast, ClassBuilder, ClassId, FieldRef, HostClass, HostField, HostMethod, HostObject,
    MethodId, MethodRef, Visibility,
};
pub use introspector::{
    BeanInfo, BeanInfoIntrospector, CapabilityProbe, ConventionIntrospector, Introspector,
};
pub use member::{
    ClassIntrospectionTable, IndexedPropertyDescriptor, MemberDescriptor, OverloadedMethods,
    PropertyDescriptor, PropertyInfo,
};
pub use model::BeanModel;
pub use policy::{ExposureLevel, SafetyPolicy, UnsafeMethods};
pub use value::{HostValue, ParamType, TemplateValue};
pub use wrapper::HostWrapper;
