//! Full introspection from declared class metadata

use crate::error::IntrospectResult;
use crate::host::HostClass;

use super::{BeanInfo, Introspector, BEAN_INFO_INTROSPECTOR};

/// Reads properties, methods and fields exactly as the class declares them
#[derive(Debug, Default, Clone, Copy)]
pub struct BeanInfoIntrospector;

impl Introspector for BeanInfoIntrospector {
    fn name(&self) -> &'static str {
        BEAN_INFO_INTROSPECTOR
    }

    fn bean_info(&self, class: &HostClass) -> IntrospectResult<BeanInfo> {
        class.check_introspectable()?;
        Ok(BeanInfo {
            properties: class.hierarchy_properties(),
            methods: class.hierarchy_methods(),
            fields: class.hierarchy_fields(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntrospectError;
    use crate::host::HostObject;
    use crate::value::HostValue;
    use std::any::Any;
    use std::sync::Arc;

    struct Item;

    impl HostObject for Item {
        fn host_class(&self) -> Arc<HostClass> {
            unreachable!("not invoked")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_declared_properties_ancestors_first() {
        let base = HostClass::builder("Base")
            .method("get_id", vec![], |_: &Item, _| Ok(HostValue::Int(1)))
            .property("id", "get_id")
            .build()
            .unwrap();
        let item = HostClass::builder("Item")
            .extends(base)
            .method("get_label", vec![], |_: &Item, _| Ok("x".into()))
            .property("label", "get_label")
            .build()
            .unwrap();

        let info = BeanInfoIntrospector.bean_info(&item).unwrap();
        let names: Vec<&str> = info.properties.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["id", "label"]);
        assert_eq!(info.methods.len(), 2);
    }

    #[test]
    fn test_denied_class_is_an_error() {
        let class = HostClass::builder("Sealed")
            .deny_introspection("no reflection")
            .build()
            .unwrap();
        assert!(matches!(
            BeanInfoIntrospector.bean_info(&class),
            Err(IntrospectError::Introspection { .. })
        ));
    }
}
