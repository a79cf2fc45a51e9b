//! Template view of one host instance
//!
//! A [`BeanModel`] pairs a host object with the wrapper that created it and
//! keeps the instance's member cache: adapters for methods, overload groups
//! and indexed properties are built once per instance and reused on every
//! later lookup of the same member.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::IntrospectResult;
use crate::host::HostObject;
use crate::member::MemberDescriptor;
use crate::value::TemplateValue;
use crate::wrapper::HostWrapper;

/// Wrapped host object as seen by templates
pub struct BeanModel {
    object: Arc<dyn HostObject>,
    wrapper: Arc<HostWrapper>,
    /// Created on the first cacheable lookup
    members: Mutex<Option<FxHashMap<MemberDescriptor, TemplateValue>>>,
}

impl BeanModel {
    /// Wrap a host object
    pub fn new(object: Arc<dyn HostObject>, wrapper: Arc<HostWrapper>) -> Self {
        Self {
            object,
            wrapper,
            members: Mutex::new(None),
        }
    }

    /// The wrapped host object
    pub fn object(&self) -> &Arc<dyn HostObject> {
        &self.object
    }

    /// The wrapper that created this model
    pub fn wrapper(&self) -> &Arc<HostWrapper> {
        &self.wrapper
    }

    /// Look up a member by name
    ///
    /// Returns [`TemplateValue::Nothing`] when the class exposes no member
    /// with that name.
    pub fn get(&self, name: &str) -> IntrospectResult<TemplateValue> {
        let table = self.wrapper.class_table(&self.object.host_class())?;
        match table.get(name) {
            Some(desc) => self.wrapper.introspector().resolve(self, desc, &table),
            None => Ok(TemplateValue::Nothing),
        }
    }

    /// Names of all exposed members, sorted
    pub fn keys(&self) -> IntrospectResult<Vec<String>> {
        let table = self.wrapper.class_table(&self.object.host_class())?;
        let mut keys: Vec<String> = table.names().map(str::to_string).collect();
        keys.sort();
        Ok(keys)
    }

    /// Whether the class exposes no members
    pub fn is_empty(&self) -> IntrospectResult<bool> {
        Ok(self.wrapper.class_table(&self.object.host_class())?.is_empty())
    }

    /// Cached adapter for a descriptor
    pub(crate) fn cached_member(&self, desc: &MemberDescriptor) -> Option<TemplateValue> {
        self.members.lock().as_ref()?.get(desc).cloned()
    }

    /// Cache an adapter, returning whichever adapter ends up cached
    ///
    /// Two threads missing on the same descriptor both construct an adapter;
    /// the first one inserted wins and is returned to both.
    pub(crate) fn cache_member(&self, desc: &MemberDescriptor, member: TemplateValue) -> TemplateValue {
        let mut members = self.members.lock();
        members
            .get_or_insert_with(FxHashMap::default)
            .entry(desc.clone())
            .or_insert(member)
            .clone()
    }

    /// Number of cached member adapters
    pub fn cached_members(&self) -> usize {
        self.members.lock().as_ref().map_or(0, |m| m.len())
    }
}

impl fmt::Debug for BeanModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanModel")
            .field("class", &self.object.host_class().name())
            .field("cached_members", &self.cached_members())
            .finish()
    }
}
