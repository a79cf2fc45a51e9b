//! Member resolution against one instance
//!
//! Properties and fields are read through to the host on every access.
//! Methods, overload groups and indexed properties resolve to callable
//! adapters that are cached on the instance: adapters are built outside the
//! cache lock and the first one inserted for a descriptor is the one every
//! caller gets back.

use std::sync::Arc;

use crate::callable::{OverloadedMethodsModel, SimpleMethodModel};
use crate::error::{IntrospectError, IntrospectResult};
use crate::member::{ClassIntrospectionTable, MemberDescriptor};
use crate::model::BeanModel;
use crate::value::TemplateValue;

pub(crate) fn invoke_through_descriptor(
    model: &BeanModel,
    desc: &MemberDescriptor,
    table: &ClassIntrospectionTable,
) -> IntrospectResult<TemplateValue> {
    if let Some(member) = model.cached_member(desc) {
        tracing::trace!(class = table.class_name(), kind = desc.kind(), "member cache hit");
        return Ok(member);
    }

    let object = model.object();
    let wrapper = model.wrapper();

    let member = match desc {
        MemberDescriptor::Property(pd) => {
            let read = pd.read_method().ok_or_else(|| {
                IntrospectError::model(format!(
                    "property {} of {} has no read method",
                    pd.name(),
                    table.class_name()
                ))
            })?;
            return wrapper.invoke_method(object, read, &[]);
        }
        MemberDescriptor::Field(field) => return wrapper.read_field(object, field),
        MemberDescriptor::IndexedProperty(ipd) => {
            let read = ipd.indexed_read_method().ok_or_else(|| {
                IntrospectError::model(format!(
                    "indexed property {} of {} has no indexed read method",
                    ipd.name(),
                    table.class_name()
                ))
            })?;
            let adapter = SimpleMethodModel::new(
                object.clone(),
                read.clone(),
                table.arg_types_of(read)?,
                wrapper.clone(),
            );
            TemplateValue::Method(Arc::new(adapter))
        }
        MemberDescriptor::Method(method) => {
            let adapter = SimpleMethodModel::new(
                object.clone(),
                method.clone(),
                table.arg_types_of(method)?,
                wrapper.clone(),
            );
            TemplateValue::Method(Arc::new(adapter))
        }
        MemberDescriptor::Overloaded(group) => {
            let adapter =
                OverloadedMethodsModel::new(object.clone(), Arc::new(group.clone()), wrapper.clone());
            TemplateValue::Method(Arc::new(adapter))
        }
    };

    tracing::trace!(
        class = table.class_name(),
        kind = desc.kind(),
        "caching member adapter"
    );
    Ok(model.cache_member(desc, member))
}
