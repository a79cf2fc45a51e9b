use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use raya_introspect::{
    BeanInfoIntrospector, ConventionIntrospector, ExposureLevel, HostClass, HostObject, HostValue,
    HostWrapper, IntrospectConfig, Introspector, ParamType, TemplateValue,
};

static BEAN_INFO: BeanInfoIntrospector = BeanInfoIntrospector;
static CONVENTION: ConventionIntrospector = ConventionIntrospector;

struct Counter {
    class: Arc<HostClass>,
    value: AtomicI64,
}

impl HostObject for Counter {
    fn host_class(&self) -> Arc<HostClass> {
        self.class.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A class with `width` properties and as many overloaded `add` methods
fn counter_class(width: usize) -> Arc<HostClass> {
    let mut builder = HostClass::builder("Counter");
    for i in 0..width {
        let getter = format!("get_p{}", i);
        builder = builder
            .method(&getter, vec![], |c: &Counter, _| {
                Ok(HostValue::Int(c.value.load(Ordering::Relaxed)))
            })
            .property(&format!("p{}", i), &getter);
    }
    builder
        .method("add", vec![ParamType::Int], |c: &Counter, args| {
            let delta = args[0].as_int().unwrap_or(0);
            Ok(HostValue::Int(c.value.fetch_add(delta, Ordering::Relaxed)))
        })
        .method("add", vec![ParamType::Float], |c: &Counter, _| {
            Ok(HostValue::Int(c.value.load(Ordering::Relaxed)))
        })
        .build()
        .unwrap()
}

fn wrapper(introspector: &'static dyn Introspector) -> Arc<HostWrapper> {
    let config = IntrospectConfig {
        exposure: ExposureLevel::Safe,
        ..IntrospectConfig::default()
    };
    HostWrapper::with_introspector(config, introspector).unwrap()
}

fn bench_table_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_build");
    let strategies: [&'static dyn Introspector; 2] = [&BEAN_INFO, &CONVENTION];

    for width in [4, 32, 128] {
        let class = counter_class(width);
        for introspector in strategies {
            group.bench_with_input(
                BenchmarkId::new(introspector.name(), width),
                &class,
                |b, class| {
                    b.iter(|| {
                        let wrapper = wrapper(introspector);
                        wrapper.class_table(black_box(class)).unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_member_lookup(c: &mut Criterion) {
    let class = counter_class(32);
    let wrapper = wrapper(&BEAN_INFO);
    let model = wrapper.wrap_object(Arc::new(Counter {
        class,
        value: AtomicI64::new(0),
    }));

    c.bench_function("property_read", |b| {
        b.iter(|| model.get(black_box("p7")).unwrap());
    });

    c.bench_function("cached_method_lookup", |b| {
        b.iter(|| model.get(black_box("add")).unwrap());
    });

    let add = model.get("add").unwrap();
    let add = add.as_method().unwrap().clone();
    c.bench_function("overloaded_call", |b| {
        b.iter(|| add.call(black_box(&[TemplateValue::Int(1)])).unwrap());
    });
}

criterion_group!(benches, bench_table_build, bench_member_lookup);

criterion_main!(benches);
