//! Reduced introspection from method naming conventions
//!
//! Used where declared property metadata is unavailable. Properties are
//! derived from accessor names instead:
//!
//! - `get_foo()` and `is_foo()` give a plain property `foo`
//! - `get_foo(int)` gives an indexed property `foo`
//!
//! Declared properties are ignored, and classes that refuse introspection
//! still fail.

use crate::error::IntrospectResult;
use crate::host::{HostClass, MethodRef};
use crate::member::{IndexedPropertyDescriptor, PropertyDescriptor, PropertyInfo};
use crate::value::ParamType;

use super::{BeanInfo, Introspector, CONVENTION_INTROSPECTOR};

/// Derives properties from `get_`/`is_` accessor names
#[derive(Debug, Default, Clone, Copy)]
pub struct ConventionIntrospector;

impl Introspector for ConventionIntrospector {
    fn name(&self) -> &'static str {
        CONVENTION_INTROSPECTOR
    }

    fn bean_info(&self, class: &HostClass) -> IntrospectResult<BeanInfo> {
        class.check_introspectable()?;
        let methods = class.hierarchy_methods();
        Ok(BeanInfo {
            properties: derive_properties(&methods),
            methods,
            fields: class.hierarchy_fields(),
        })
    }
}

fn derive_properties(methods: &[MethodRef]) -> Vec<PropertyInfo> {
    methods.iter().filter_map(property_for).collect()
}

fn property_for(method: &MethodRef) -> Option<PropertyInfo> {
    if let Some(name) = method.name().strip_prefix("get_").filter(|n| !n.is_empty()) {
        return match method.param_types() {
            [] => Some(PropertyInfo::Simple(PropertyDescriptor::new(
                name.to_string(),
                Some(method.clone()),
            ))),
            [ParamType::Int] => Some(PropertyInfo::Indexed(IndexedPropertyDescriptor::new(
                name.to_string(),
                None,
                Some(method.clone()),
            ))),
            _ => None,
        };
    }

    let name = method.name().strip_prefix("is_").filter(|n| !n.is_empty())?;
    method.param_types().is_empty().then(|| {
        PropertyInfo::Simple(PropertyDescriptor::new(name.to_string(), Some(method.clone())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostObject;
    use crate::value::HostValue;
    use std::any::Any;
    use std::sync::Arc;

    struct Account;

    impl HostObject for Account {
        fn host_class(&self) -> Arc<HostClass> {
            unreachable!("not invoked")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_properties_from_accessor_names() {
        let class = HostClass::builder("Account")
            .method("get_balance", vec![], |_: &Account, _| Ok(HostValue::Int(10)))
            .method("is_open", vec![], |_: &Account, _| Ok(true.into()))
            .method("get_entry", vec![ParamType::Int], |_: &Account, _| Ok(HostValue::Null))
            .method("get_", vec![], |_: &Account, _| Ok(HostValue::Null))
            .method("get_pair", vec![ParamType::Int, ParamType::Int], |_: &Account, _| {
                Ok(HostValue::Null)
            })
            .method("is_valid_for", vec![ParamType::Str], |_: &Account, _| Ok(true.into()))
            .method("close", vec![], |_: &Account, _| Ok(HostValue::Null))
            .build()
            .unwrap();

        let info = ConventionIntrospector.bean_info(&class).unwrap();
        let props: Vec<(&str, bool)> = info
            .properties
            .iter()
            .map(|p| (p.name(), p.is_indexed()))
            .collect();
        assert_eq!(props, vec![("balance", false), ("open", false), ("entry", true)]);
        assert_eq!(info.methods.len(), 7);
    }

    #[test]
    fn test_declared_properties_ignored() {
        let class = HostClass::builder("Tagged")
            .method("label", vec![], |_: &Account, _| Ok("t".into()))
            .property("tag", "label")
            .build()
            .unwrap();
        let info = ConventionIntrospector.bean_info(&class).unwrap();
        assert!(info.properties.is_empty());
    }
}
