//! Introspection strategies
//!
//! An [`Introspector`] turns a host class into a [`ClassIntrospectionTable`]
//! and resolves table entries against instances. Two strategies exist:
//!
//! | Strategy                    | Metadata source                                   |
//! |-----------------------------|---------------------------------------------------|
//! | [`BeanInfoIntrospector`]    | Declared properties, methods and fields           |
//! | [`ConventionIntrospector`]  | Methods only; properties from `get_`/`is_` names  |
//!
//! Both share the same table-building and resolution rules; they differ only
//! in where property metadata comes from.
//!
//! ## Process-wide instance
//!
//! [`get_instance`] selects a strategy once, on first access, and never
//! changes it afterwards: tables built under one strategy stay valid for the
//! life of the process. If the selected strategy cannot be loaded the
//! failure is permanent and every caller receives it.

mod bean_info;
mod convention;
mod resolve;
mod table;

use once_cell::sync::Lazy;

use crate::accessible::AccessibleMethodIndex;
use crate::error::{IntrospectError, IntrospectResult};
use crate::host::{FieldRef, HostClass, MethodRef};
use crate::member::{ClassIntrospectionTable, MemberDescriptor, PropertyInfo};
use crate::model::BeanModel;
use crate::value::TemplateValue;
use crate::wrapper::HostWrapper;

pub use bean_info::BeanInfoIntrospector;
pub use convention::ConventionIntrospector;

/// Registered name of the full strategy
pub const BEAN_INFO_INTROSPECTOR: &str = "raya_introspect::BeanInfoIntrospector";

/// Registered name of the reduced strategy
pub const CONVENTION_INTROSPECTOR: &str = "raya_introspect::ConventionIntrospector";

/// Environment variable that forbids bean-info introspection when set to `reduced`
pub const MODE_ENV: &str = "RAYA_INTROSPECT_MODE";

/// Raw, ordered metadata for one class (ancestors first)
#[derive(Debug, Clone, Default)]
pub struct BeanInfo {
    /// Property metadata
    pub properties: Vec<PropertyInfo>,
    /// Method metadata
    pub methods: Vec<MethodRef>,
    /// Field metadata
    pub fields: Vec<FieldRef>,
}

/// Strategy for enumerating class metadata and resolving members
pub trait Introspector: Send + Sync {
    /// Registered strategy name
    fn name(&self) -> &'static str;

    /// Enumerate raw metadata for a class
    fn bean_info(&self, class: &HostClass) -> IntrospectResult<BeanInfo>;

    /// Build the member table for a class
    ///
    /// Runs while `class` is marked as being built in the wrapper's cache.
    /// Tables of other classes may be requested through `wrapper`; asking
    /// for `class` itself from here never returns.
    fn build_class_table(
        &self,
        wrapper: &HostWrapper,
        class: &HostClass,
        accessible: &AccessibleMethodIndex,
    ) -> IntrospectResult<ClassIntrospectionTable> {
        let info = self.bean_info(class)?;
        Ok(table::build_class_table(wrapper, class, &info, accessible))
    }

    /// Resolve a member of the model's instance
    fn resolve(
        &self,
        model: &BeanModel,
        desc: &MemberDescriptor,
        table: &ClassIntrospectionTable,
    ) -> IntrospectResult<TemplateValue> {
        resolve::invoke_through_descriptor(model, desc, table)
    }
}

// ============================================================================
// Strategy Selection
// ============================================================================

/// Probes the runtime for introspection capabilities
pub trait CapabilityProbe {
    /// Whether full bean-info introspection is available
    fn has_bean_info(&self) -> bool;

    /// Load a strategy by registered name
    fn load(&self, name: &str) -> Option<Box<dyn Introspector>> {
        load_builtin(name)
    }
}

/// Probe used by [`get_instance`]
///
/// Bean-info is available when the `bean-info` feature is compiled in and
/// the mode is not `reduced`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProbe {
    reduced: bool,
}

impl DefaultProbe {
    /// Probe configured from `RAYA_INTROSPECT_MODE`
    pub fn from_env() -> Self {
        Self::from_mode(std::env::var(MODE_ENV).ok().as_deref())
    }

    /// Probe configured from an explicit mode value (case-insensitive)
    pub fn from_mode(mode: Option<&str>) -> Self {
        Self {
            reduced: mode.map_or(false, |m| m.eq_ignore_ascii_case("reduced")),
        }
    }
}

impl CapabilityProbe for DefaultProbe {
    fn has_bean_info(&self) -> bool {
        cfg!(feature = "bean-info") && !self.reduced
    }
}

/// Load one of the built-in strategies by name
pub fn load_builtin(name: &str) -> Option<Box<dyn Introspector>> {
    match name {
        BEAN_INFO_INTROSPECTOR if cfg!(feature = "bean-info") => Some(Box::new(BeanInfoIntrospector)),
        CONVENTION_INTROSPECTOR => Some(Box::new(ConventionIntrospector)),
        _ => None,
    }
}

/// Choose and load a strategy
///
/// Picks the bean-info strategy when the probe reports it available and the
/// convention strategy otherwise. Failing to load the chosen strategy is an
/// error; there is no second attempt.
pub fn select_strategy(probe: &dyn CapabilityProbe) -> IntrospectResult<Box<dyn Introspector>> {
    let name = if probe.has_bean_info() {
        BEAN_INFO_INTROSPECTOR
    } else {
        CONVENTION_INTROSPECTOR
    };

    match probe.load(name) {
        Some(introspector) => {
            tracing::debug!(strategy = name, "selected introspection strategy");
            Ok(introspector)
        }
        None => Err(IntrospectError::StrategyUnavailable(format!(
            "failed to load {}",
            name
        ))),
    }
}

static INSTANCE: Lazy<IntrospectResult<Box<dyn Introspector>>> =
    Lazy::new(|| select_strategy(&DefaultProbe::from_env()));

/// Process-wide introspector, selected on first access
pub fn get_instance() -> IntrospectResult<&'static dyn Introspector> {
    match &*INSTANCE {
        Ok(introspector) => Ok(introspector.as_ref()),
        Err(e) => Err(e.clone()),
    }
}
