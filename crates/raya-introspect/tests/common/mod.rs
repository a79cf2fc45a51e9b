//! Shared host fixtures for integration tests

#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use raya_introspect::{
    BeanInfoIntrospector, ConventionIntrospector, ExposureLevel, HostClass, HostFault, HostObject,
    HostValue, HostWrapper, IntrospectConfig, Introspector, ParamType, Visibility,
};

pub static BEAN_INFO: BeanInfoIntrospector = BeanInfoIntrospector;
pub static CONVENTION: ConventionIntrospector = ConventionIntrospector;

/// Both strategies, for tests that must hold under either
pub fn strategies() -> [&'static dyn Introspector; 2] {
    [&BEAN_INFO, &CONVENTION]
}

/// Route introspection logs to the test output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn wrapper_with(introspector: &'static dyn Introspector, exposure: ExposureLevel) -> Arc<HostWrapper> {
    init_tracing();
    let config = IntrospectConfig {
        exposure,
        ..IntrospectConfig::default()
    };
    HostWrapper::with_introspector(config, introspector).unwrap()
}

pub fn safe_wrapper() -> Arc<HostWrapper> {
    wrapper_with(&BEAN_INFO, ExposureLevel::Safe)
}

fn int_arg(args: &[HostValue], index: usize) -> Result<i64, HostFault> {
    args.get(index)
        .and_then(HostValue::as_int)
        .ok_or_else(|| HostFault::new(format!("argument {} must be an int", index)))
}

// ============================================================================
// Point
// ============================================================================

/// Mutable 2D point with `x`/`y` properties and an overloaded `move`
pub struct Point {
    x: AtomicI64,
    y: AtomicI64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Arc<Self> {
        Arc::new(Self {
            x: AtomicI64::new(x),
            y: AtomicI64::new(y),
        })
    }
}

impl HostObject for Point {
    fn host_class(&self) -> Arc<HostClass> {
        POINT_CLASS.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub static POINT_CLASS: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("Point")
        .method("get_x", vec![], |p: &Point, _| {
            Ok(HostValue::Int(p.x.load(Ordering::SeqCst)))
        })
        .method("get_y", vec![], |p: &Point, _| {
            Ok(HostValue::Int(p.y.load(Ordering::SeqCst)))
        })
        .method("move", vec![ParamType::Int], |p: &Point, args| {
            p.x.fetch_add(int_arg(args, 0)?, Ordering::SeqCst);
            Ok(HostValue::Null)
        })
        .method("move", vec![ParamType::Int, ParamType::Int], |p: &Point, args| {
            p.x.fetch_add(int_arg(args, 0)?, Ordering::SeqCst);
            p.y.fetch_add(int_arg(args, 1)?, Ordering::SeqCst);
            Ok(HostValue::Null)
        })
        .method("explode", vec![], |_: &Point, _| Err(HostFault::new("boom")))
        .method("mirror", vec![], |p: &Point, _| {
            let mirrored: Arc<dyn HostObject> =
                Point::new(p.y.load(Ordering::SeqCst), p.x.load(Ordering::SeqCst));
            Ok(HostValue::Object(mirrored))
        })
        .property("x", "get_x")
        .property("y", "get_y")
        .build()
        .unwrap()
});

// ============================================================================
// Greeter hierarchy
// ============================================================================

/// Instance of `BaseGreeter` or `LoudGreeter`
pub struct Greeter {
    class: Arc<HostClass>,
}

impl HostObject for Greeter {
    fn host_class(&self) -> Arc<HostClass> {
        self.class.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub static BASE_GREETER: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("BaseGreeter")
        .method("get_greeting", vec![], |_: &Greeter, _| Ok("hello".into()))
        .property("greeting", "get_greeting")
        .build()
        .unwrap()
});

/// Overrides the greeting accessor and redeclares the property
pub static LOUD_GREETER: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("LoudGreeter")
        .extends(BASE_GREETER.clone())
        .method("get_greeting", vec![], |_: &Greeter, _| Ok("HELLO".into()))
        .property("greeting", "get_greeting")
        .build()
        .unwrap()
});

/// Redeclares the greeting property with an accessor of a different name
pub static SHOUTING_GREETER: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("ShoutingGreeter")
        .extends(BASE_GREETER.clone())
        .method("shout", vec![], |_: &Greeter, _| Ok("HELLO".into()))
        .property("greeting", "shout")
        .build()
        .unwrap()
});

pub fn greeter(class: &Arc<HostClass>) -> Arc<Greeter> {
    Arc::new(Greeter {
        class: class.clone(),
    })
}

// ============================================================================
// Hidden implementation behind a public interface
// ============================================================================

pub struct Hidden;

pub static NAMED: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("Named")
        .interface()
        .abstract_method("get_name", vec![])
        .build()
        .unwrap()
});

/// Package-private class whose only public surface is `Named`
pub static HIDDEN_CLASS: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("Hidden")
        .package_private()
        .implements(NAMED.clone())
        .method("get_name", vec![], |_: &Hidden, _| Ok("hidden".into()))
        .method("get_secret", vec![], |_: &Hidden, _| Ok("s3cret".into()))
        .property("name", "get_name")
        .property("secret", "get_secret")
        .build()
        .unwrap()
});

impl HostObject for Hidden {
    fn host_class(&self) -> Arc<HostClass> {
        HIDDEN_CLASS.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Runtime (unsafe methods)
// ============================================================================

pub struct Runtime;

pub static RUNTIME_CLASS: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("Runtime")
        .method("exec", vec![ParamType::Str], |_: &Runtime, _| Ok(HostValue::Int(0)))
        .method("get_version", vec![], |_: &Runtime, _| Ok("1.0".into()))
        .method("finalize", vec![], |_: &Runtime, _| Ok(HostValue::Null))
        .property("version", "get_version")
        .build()
        .unwrap()
});

impl HostObject for Runtime {
    fn host_class(&self) -> Arc<HostClass> {
        RUNTIME_CLASS.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Record (fields) and Row (indexed property)
// ============================================================================

pub struct Record {
    pub label: String,
    pub cells: Vec<i64>,
}

pub static RECORD_CLASS: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("Record")
        .field("label", |r: &Record| Ok(r.label.as_str().into()))
        .field_with_visibility("cells", Visibility::Private, |r: &Record| {
            Ok(HostValue::Int(r.cells.len() as i64))
        })
        .method("get_cell", vec![ParamType::Int], |r: &Record, args| {
            let index = int_arg(args, 0)?;
            r.cells
                .get(index as usize)
                .map(|c| HostValue::Int(*c))
                .ok_or_else(|| HostFault::new(format!("no cell {}", index)))
        })
        .method("size", vec![], |r: &Record, _| Ok(HostValue::Int(r.cells.len() as i64)))
        .indexed_property("cell", "get_cell")
        .build()
        .unwrap()
});

impl HostObject for Record {
    fn host_class(&self) -> Arc<HostClass> {
        RECORD_CLASS.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn record(label: &str, cells: Vec<i64>) -> Arc<Record> {
    Arc::new(Record {
        label: label.to_string(),
        cells,
    })
}

// ============================================================================
// Meter (mutable public field)
// ============================================================================

pub struct Meter {
    reading: AtomicI64,
}

impl Meter {
    pub fn new(reading: i64) -> Arc<Self> {
        Arc::new(Self {
            reading: AtomicI64::new(reading),
        })
    }

    pub fn advance(&self, by: i64) {
        self.reading.fetch_add(by, Ordering::SeqCst);
    }
}

pub static METER_CLASS: Lazy<Arc<HostClass>> = Lazy::new(|| {
    HostClass::builder("Meter")
        .field("reading", |m: &Meter| Ok(HostValue::Int(m.reading.load(Ordering::SeqCst))))
        .build()
        .unwrap()
});

impl HostObject for Meter {
    fn host_class(&self) -> Arc<HostClass> {
        METER_CLASS.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
