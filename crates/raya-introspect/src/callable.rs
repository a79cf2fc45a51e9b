//! Callable adapters bound to a host instance

use std::fmt;
use std::sync::Arc;

use crate::error::IntrospectResult;
use crate::host::{HostObject, MethodRef};
use crate::member::OverloadedMethods;
use crate::value::{ParamType, TemplateValue};
use crate::wrapper::HostWrapper;

/// A member the template engine can call
pub trait TemplateMethod: Send + Sync + fmt::Debug {
    /// Call with template arguments
    fn call(&self, args: &[TemplateValue]) -> IntrospectResult<TemplateValue>;
}

/// Single method bound to a receiver
pub struct SimpleMethodModel {
    object: Arc<dyn HostObject>,
    method: MethodRef,
    arg_types: Arc<[ParamType]>,
    wrapper: Arc<HostWrapper>,
}

impl SimpleMethodModel {
    /// Bind a method to a receiver
    pub fn new(
        object: Arc<dyn HostObject>,
        method: MethodRef,
        arg_types: Arc<[ParamType]>,
        wrapper: Arc<HostWrapper>,
    ) -> Self {
        Self {
            object,
            method,
            arg_types,
            wrapper,
        }
    }

    /// The bound method
    pub fn method(&self) -> &MethodRef {
        &self.method
    }
}

impl TemplateMethod for SimpleMethodModel {
    fn call(&self, args: &[TemplateValue]) -> IntrospectResult<TemplateValue> {
        let host_args = self.wrapper.unwrap_args(&self.method, &self.arg_types, args)?;
        self.wrapper.invoke_method(&self.object, &self.method, &host_args)
    }
}

impl fmt::Debug for SimpleMethodModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleMethodModel({:?})", self.method)
    }
}

/// Overload group bound to a receiver; the candidate is chosen per call
pub struct OverloadedMethodsModel {
    object: Arc<dyn HostObject>,
    methods: Arc<OverloadedMethods>,
    wrapper: Arc<HostWrapper>,
}

impl OverloadedMethodsModel {
    /// Bind an overload group to a receiver
    pub fn new(
        object: Arc<dyn HostObject>,
        methods: Arc<OverloadedMethods>,
        wrapper: Arc<HostWrapper>,
    ) -> Self {
        Self {
            object,
            methods,
            wrapper,
        }
    }

    /// The bound group
    pub fn methods(&self) -> &OverloadedMethods {
        &self.methods
    }
}

impl TemplateMethod for OverloadedMethodsModel {
    fn call(&self, args: &[TemplateValue]) -> IntrospectResult<TemplateValue> {
        let method = self.methods.select(args)?;
        let host_args = self.wrapper.unwrap_args(method, method.param_types(), args)?;
        self.wrapper.invoke_method(&self.object, method, &host_args)
    }
}

impl fmt::Debug for OverloadedMethodsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OverloadedMethodsModel({}, {} candidates)",
            self.methods.name(),
            self.methods.len()
        )
    }
}
