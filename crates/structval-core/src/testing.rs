//! Proptest strategies shared by the codec tests.

use proptest::prelude::*;

use crate::value::{Struct, StructuredValue};

fn arb_leaf() -> impl Strategy<Value = StructuredValue> {
    prop_oneof![
        Just(StructuredValue::Null),
        any::<bool>().prop_map(StructuredValue::Bool),
        any::<i32>().prop_map(StructuredValue::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(StructuredValue::Number),
        "\\PC{0,16}".prop_map(StructuredValue::String),
    ]
}

/// Trees with no absent entries and only finite numbers.
pub(crate) fn arb_finite_value() -> impl Strategy<Value = StructuredValue> {
    arb_leaf().prop_recursive(
        4,  // depth
        64, // desired size
        8,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(StructuredValue::from),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..8)
                    .prop_map(|m| StructuredValue::Struct(m.into_iter().collect())),
            ]
        },
    )
}

/// Encodable trees wrapped in at least `min_depth` containers.
pub(crate) fn arb_nested_value(min_depth: usize) -> BoxedStrategy<StructuredValue> {
    let mut strategy = arb_finite_value().boxed();
    for _ in 0..min_depth {
        strategy = (strategy, any::<bool>(), "[a-z]{1,8}")
            .prop_map(|(value, as_list, key)| {
                if as_list {
                    StructuredValue::from(vec![value])
                } else {
                    let mut s = Struct::new();
                    s.insert(key, value);
                    StructuredValue::Struct(s)
                }
            })
            .boxed();
    }
    strategy
}

/// Structs whose top-level entries may be absent.
pub(crate) fn arb_struct_with_absent() -> impl Strategy<Value = Struct> {
    prop::collection::btree_map("[a-z]{1,8}", prop::option::of(arb_finite_value()), 0..8)
        .prop_map(|m| m.into_iter().collect())
}
