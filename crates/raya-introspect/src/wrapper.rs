//! Host wrapper: value wrapping, invocation and the class table cache
//!
//! One `HostWrapper` is shared by every [`BeanModel`] it creates. It owns the
//! configuration, the safety policy and the per-class member tables. Tables
//! are built at most once per class. Each class gets its own once-cell; the
//! map shard is locked only long enough to fetch that cell, and the build
//! runs outside it. Concurrent first lookups of the same class wait on the
//! cell for the single builder instead of racing it.
//!
//! A build may look up tables of *other* classes through the same wrapper.
//! Looking up the class currently being built from inside its own build
//! blocks forever.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::accessible::AccessibleMethodIndex;
use crate::config::IntrospectConfig;
use crate::error::{IntrospectError, IntrospectResult};
use crate::host::{ClassId, FieldRef, HostClass, HostMethod, HostObject, MethodRef};
use crate::introspector::{self, Introspector};
use crate::member::ClassIntrospectionTable;
use crate::model::BeanModel;
use crate::policy::{ExposureLevel, SafetyPolicy};
use crate::value::{HostValue, ParamType, TemplateValue};

/// Wraps host values for templates and caches class member tables
pub struct HostWrapper {
    config: IntrospectConfig,
    policy: Box<dyn SafetyPolicy>,
    introspector: &'static dyn Introspector,
    class_cache: DashMap<ClassId, Arc<OnceCell<Arc<ClassIntrospectionTable>>>>,
}

impl HostWrapper {
    /// Create a wrapper using the process-wide introspector
    ///
    /// Fails if no introspection strategy could be loaded at startup, or if
    /// the configuration is invalid.
    pub fn new(config: IntrospectConfig) -> IntrospectResult<Arc<Self>> {
        let introspector = introspector::get_instance()?;
        Self::with_introspector(config, introspector)
    }

    /// Create a wrapper with an explicit introspector
    pub fn with_introspector(
        config: IntrospectConfig,
        introspector: &'static dyn Introspector,
    ) -> IntrospectResult<Arc<Self>> {
        let policy = config
            .unsafe_method_policy()
            .map_err(|e| IntrospectError::Config(e.to_string()))?;
        Ok(Self::with_policy(config, introspector, Box::new(policy)))
    }

    /// Create a wrapper with a custom safety policy
    ///
    /// The config's `unsafe_methods` list is ignored in favor of `policy`.
    pub fn with_policy(
        config: IntrospectConfig,
        introspector: &'static dyn Introspector,
        policy: Box<dyn SafetyPolicy>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            policy,
            introspector,
            class_cache: DashMap::new(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &IntrospectConfig {
        &self.config
    }

    /// Active exposure level
    pub fn exposure_level(&self) -> ExposureLevel {
        self.config.exposure
    }

    /// Introspection strategy used by this wrapper
    pub fn introspector(&self) -> &'static dyn Introspector {
        self.introspector
    }

    /// Whether a method may be exposed to templates
    ///
    /// Under [`ExposureLevel::All`] every method is considered safe.
    pub fn is_safe_method(&self, method: &HostMethod) -> bool {
        !self.config.exposure.checks_safety() || self.policy.is_safe_method(method)
    }

    // ========================================================================
    // Class Tables
    // ========================================================================

    /// Member table for a class, built on first request
    ///
    /// A failed build caches nothing; the next request builds again.
    pub fn class_table(&self, class: &HostClass) -> IntrospectResult<Arc<ClassIntrospectionTable>> {
        let cell = match self.class_cache.get(&class.id()) {
            Some(cell) => cell.clone(),
            None => self.class_cache.entry(class.id()).or_default().clone(),
        };

        let table = cell.get_or_try_init(|| {
            let table = Arc::new(self.build_class_table(class)?);
            tracing::debug!(
                class = class.name(),
                members = table.len(),
                strategy = self.introspector.name(),
                exposure = %self.config.exposure,
                "built class introspection table"
            );
            Ok::<_, IntrospectError>(table)
        })?;
        Ok(table.clone())
    }

    fn build_class_table(&self, class: &HostClass) -> IntrospectResult<ClassIntrospectionTable> {
        if self.config.exposure == ExposureLevel::Nothing {
            return Ok(ClassIntrospectionTable::empty(class.name()));
        }
        let accessible = AccessibleMethodIndex::for_class(class);
        self.introspector.build_class_table(self, class, &accessible)
    }

    /// Number of classes with a cached table
    pub fn cached_class_count(&self) -> usize {
        self.class_cache
            .iter()
            .filter(|cell| cell.value().get().is_some())
            .count()
    }

    // ========================================================================
    // Wrapping
    // ========================================================================

    /// Convert a host value into a template value
    pub fn wrap(self: &Arc<Self>, value: HostValue) -> TemplateValue {
        match value {
            HostValue::Null => TemplateValue::Null,
            HostValue::Bool(b) => TemplateValue::Bool(b),
            HostValue::Int(i) => TemplateValue::Int(i),
            HostValue::Float(f) => TemplateValue::Float(f),
            HostValue::Str(s) => TemplateValue::String(Arc::from(s)),
            HostValue::List(items) => {
                TemplateValue::Sequence(items.into_iter().map(|v| self.wrap(v)).collect())
            }
            HostValue::Object(obj) => TemplateValue::Bean(self.wrap_object(obj)),
        }
    }

    /// Wrap a host object as a bean model
    pub fn wrap_object(self: &Arc<Self>, object: Arc<dyn HostObject>) -> Arc<BeanModel> {
        Arc::new(BeanModel::new(object, self.clone()))
    }

    /// Convert template arguments into host arguments for a method
    pub fn unwrap_args(
        &self,
        method: &HostMethod,
        arg_types: &[ParamType],
        args: &[TemplateValue],
    ) -> IntrospectResult<Vec<HostValue>> {
        if arg_types.len() != args.len() {
            return Err(IntrospectError::model(format!(
                "{} expects {} argument(s), got {}",
                method.qualified_name(),
                arg_types.len(),
                args.len()
            )));
        }

        arg_types
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (param, arg))| {
                param.unwrap(arg).ok_or_else(|| {
                    IntrospectError::model(format!(
                        "argument {} of {}: expected {}, got {}",
                        i + 1,
                        method.qualified_name(),
                        param,
                        arg.type_name()
                    ))
                })
            })
            .collect()
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Invoke a method on a receiver and wrap the result
    ///
    /// Dispatches to the receiver class's most-derived implementation of the
    /// method's signature.
    pub fn invoke_method(
        self: &Arc<Self>,
        object: &Arc<dyn HostObject>,
        method: &MethodRef,
        args: &[HostValue],
    ) -> IntrospectResult<TemplateValue> {
        if !method.is_public() {
            return Err(IntrospectError::IllegalAccess(format!(
                "{} is not public",
                method.qualified_name()
            )));
        }

        let class = object.host_class();
        if !class.is_a(method.declaring_class()) {
            return Err(IntrospectError::IllegalAccess(format!(
                "{} cannot be invoked on an instance of {}",
                method.qualified_name(),
                class.name()
            )));
        }

        let target = class.find_method(&method.signature()).unwrap_or(method);
        let result = target
            .invoke(object.as_ref(), args)
            .map_err(|source| IntrospectError::Invocation {
                member: method.qualified_name(),
                source,
            })?;
        Ok(self.wrap(result))
    }

    /// Read a field from a receiver and wrap the value
    pub fn read_field(
        self: &Arc<Self>,
        object: &Arc<dyn HostObject>,
        field: &FieldRef,
    ) -> IntrospectResult<TemplateValue> {
        let member = format!("{}.{}", field.declaring_class(), field.name());
        if !field.is_public() {
            return Err(IntrospectError::IllegalAccess(format!("{} is not public", member)));
        }
        let value = field
            .read(object.as_ref())
            .map_err(|source| IntrospectError::Invocation { member, source })?;
        Ok(self.wrap(value))
    }
}

impl fmt::Debug for HostWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostWrapper")
            .field("config", &self.config)
            .field("introspector", &self.introspector.name())
            .field("cached_classes", &self.class_cache.len())
            .finish()
    }
}
