//! Class table construction shared by every strategy
//!
//! Metadata arrives ancestor-first and is walked in reverse, so entries from
//! the most derived class are written first and later writes for the same
//! name replace them. Every accessor and method is swapped for its publicly
//! accessible counterpart before it is stored, and anything with no such
//! counterpart, or rejected by the safety policy, is left out.

use crate::accessible::{get_accessible_method, AccessibleMethodIndex};
use crate::host::{HostClass, MethodRef};
use crate::member::{
    ClassIntrospectionTable, ClassTableBuilder, IndexedPropertyDescriptor, MemberDescriptor,
    OverloadedMethods, PropertyDescriptor, PropertyInfo,
};
use crate::wrapper::HostWrapper;

use super::BeanInfo;

pub(crate) fn build_class_table(
    wrapper: &HostWrapper,
    class: &HostClass,
    info: &BeanInfo,
    accessible: &AccessibleMethodIndex,
) -> ClassIntrospectionTable {
    let mut builder = ClassTableBuilder::new(class.name());

    if wrapper.config().expose_fields {
        for field in info.fields.iter().filter(|f| f.is_public()) {
            builder.put(field.name(), MemberDescriptor::Field(field.clone()));
        }
    }

    for property in info.properties.iter().rev() {
        add_property(wrapper, class, property, accessible, &mut builder);
    }

    if wrapper.exposure_level().exposes_methods() {
        for method in info.methods.iter().rev() {
            add_method(wrapper, class, method, accessible, &mut builder);
        }
    }

    builder.finish()
}

/// Accessible counterpart of `method`, if it exists and passes the safety policy
fn safe_accessible(
    wrapper: &HostWrapper,
    method: Option<&MethodRef>,
    accessible: &AccessibleMethodIndex,
) -> Option<MethodRef> {
    get_accessible_method(method, accessible).filter(|m| wrapper.is_safe_method(m))
}

fn add_property(
    wrapper: &HostWrapper,
    class: &HostClass,
    property: &PropertyInfo,
    accessible: &AccessibleMethodIndex,
    builder: &mut ClassTableBuilder,
) {
    match property {
        PropertyInfo::Indexed(ipd) => {
            let Some(read) = safe_accessible(wrapper, ipd.indexed_read_method(), accessible) else {
                tracing::warn!(
                    class = class.name(),
                    property = ipd.name(),
                    "skipping indexed property without an accessible, safe read method"
                );
                return;
            };
            let same = ipd.indexed_read_method().map(|m| m.id()) == Some(read.id());
            let desc = if same {
                ipd.clone()
            } else {
                IndexedPropertyDescriptor::new(
                    ipd.name().to_string(),
                    ipd.read_method().cloned(),
                    Some(read.clone()),
                )
            };
            builder.arg_types_mut().insert(&read);
            replace(builder, ipd.name(), MemberDescriptor::IndexedProperty(desc));
        }
        PropertyInfo::Simple(pd) => {
            let Some(read) = safe_accessible(wrapper, pd.read_method(), accessible) else {
                tracing::warn!(
                    class = class.name(),
                    property = pd.name(),
                    "skipping property without an accessible, safe read method"
                );
                return;
            };
            let same = pd.read_method().map(|m| m.id()) == Some(read.id());
            let desc = if same {
                pd.clone()
            } else {
                PropertyDescriptor::new(pd.name().to_string(), Some(read))
            };
            replace(builder, pd.name(), MemberDescriptor::Property(desc));
        }
    }
}

fn add_method(
    wrapper: &HostWrapper,
    class: &HostClass,
    method: &MethodRef,
    accessible: &AccessibleMethodIndex,
    builder: &mut ClassTableBuilder,
) {
    let Some(public) = safe_accessible(wrapper, Some(method), accessible) else {
        tracing::warn!(
            class = class.name(),
            method = %method.qualified_name(),
            "skipping method without an accessible, safe counterpart"
        );
        return;
    };
    let name = public.name();

    match builder.get_mut(name) {
        Some(MemberDescriptor::Method(prev)) if prev.id() == public.id() => {}
        Some(MemberDescriptor::Method(prev)) => {
            let prev = prev.clone();
            let mut group = OverloadedMethods::new(name);
            group.add_method(prev.clone());
            group.add_method(public.clone());
            builder.put(name, MemberDescriptor::Overloaded(group));
            builder.release_arg_types(&prev);
        }
        Some(MemberDescriptor::Overloaded(group)) => {
            group.add_method(public.clone());
        }
        _ => {
            builder.arg_types_mut().insert(&public);
            replace(builder, name, MemberDescriptor::Method(public.clone()));
        }
    }
}

/// Overwrite an entry and drop parameter types only the old entry needed
fn replace(builder: &mut ClassTableBuilder, name: &str, desc: MemberDescriptor) {
    let bound = match builder.put(name, desc) {
        Some(MemberDescriptor::Method(m)) => Some(m),
        Some(MemberDescriptor::IndexedProperty(ipd)) => ipd.indexed_read_method().cloned(),
        _ => None,
    };
    if let Some(method) = bound {
        builder.release_arg_types(&method);
    }
}
