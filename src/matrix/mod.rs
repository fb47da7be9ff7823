//! Type matrix: representative sample values keyed by type name.
//!
//! Samples are chosen for edge behaviour (zero and negative integers, signed
//! zero floats, empty containers). Entries without a literal form are written
//! as construction expressions.

mod case_key;

pub use case_key::{Arity, CaseKey};

use serde::Serialize;

use crate::error::HarnessFault;
use crate::Value;

/// Bumped whenever a type or sample is added, removed or changed.
pub const MATRIX_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum SampleValue {
    Literal(Value),
    /// Construction expression for values with no literal, e.g. `frozenset()`.
    Expr(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeSample {
    pub type_name: &'static str,
    pub value: SampleValue,
}

impl TypeSample {
    pub fn literal(type_name: &'static str, value: Value) -> Self {
        Self {
            type_name,
            value: SampleValue::Literal(value),
        }
    }

    pub fn expr(type_name: &'static str, source: impl Into<String>) -> Self {
        Self {
            type_name,
            value: SampleValue::Expr(source.into()),
        }
    }
}

#[derive(Debug, Clone)]
struct MatrixEntry {
    type_name: &'static str,
    samples: Vec<TypeSample>,
}

#[derive(Debug, Clone)]
pub struct TypeMatrix {
    entries: Vec<MatrixEntry>,
}

impl TypeMatrix {
    /// An empty matrix; populate it with [`TypeMatrix::with_type`].
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_type(mut self, type_name: &'static str, samples: Vec<TypeSample>) -> Self {
        self.entries.retain(|e| e.type_name != type_name);
        self.entries.push(MatrixEntry { type_name, samples });
        self
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.type_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.iter().any(|e| e.type_name == type_name)
    }

    pub fn sample_for(&self, type_name: &str) -> Result<&[TypeSample], HarnessFault> {
        self.entries
            .iter()
            .find(|e| e.type_name == type_name)
            .map(|e| e.samples.as_slice())
            .ok_or_else(|| HarnessFault::matrix_lookup_miss(type_name))
    }
}

impl Default for TypeMatrix {
    fn default() -> Self {
        use Value as V;

        let s = |v: &str| V::Str(v.to_string());
        let b = |v: &str| V::Bytes(v.as_bytes().to_vec());

        Self::empty()
            .with_type(
                "bool",
                vec![
                    TypeSample::literal("bool", V::Bool(true)),
                    TypeSample::literal("bool", V::Bool(false)),
                ],
            )
            .with_type(
                "bytearray",
                vec![
                    TypeSample::expr("bytearray", "bytearray()"),
                    TypeSample::expr("bytearray", "bytearray(1)"),
                    TypeSample::expr("bytearray", "bytearray([1, 2, 3])"),
                ],
            )
            .with_type(
                "bytes",
                vec![
                    TypeSample::literal("bytes", b("")),
                    TypeSample::literal("bytes", b("This is another string of bytes")),
                ],
            )
            .with_type(
                "complex",
                vec![
                    TypeSample::literal("complex", V::Complex { re: 0.0, im: 1.0 }),
                    TypeSample::literal("complex", V::Complex { re: 1.0, im: 2.0 }),
                    TypeSample::literal("complex", V::Complex { re: 0.0, im: -5.0 }),
                ],
            )
            .with_type(
                "dict",
                vec![
                    TypeSample::literal("dict", V::Dict(vec![])),
                    TypeSample::literal(
                        "dict",
                        V::Dict(vec![
                            (s("a"), V::Int(1)),
                            (s("c"), V::Float(2.3456)),
                            (s("d"), s("another")),
                        ]),
                    ),
                ],
            )
            .with_type(
                "float",
                vec![
                    TypeSample::literal("float", V::Float(2.3456)),
                    TypeSample::literal("float", V::Float(0.0)),
                    TypeSample::literal("float", V::Float(-3.14159)),
                    TypeSample::literal("float", V::Float(-0.0)),
                ],
            )
            .with_type(
                "frozenset",
                vec![
                    TypeSample::expr("frozenset", "frozenset()"),
                    TypeSample::expr("frozenset", "frozenset({1, 2.3456, 'another'})"),
                ],
            )
            .with_type(
                "int",
                vec![
                    TypeSample::literal("int", V::Int(3)),
                    TypeSample::literal("int", V::Int(0)),
                    TypeSample::literal("int", V::Int(-5)),
                ],
            )
            .with_type(
                "list",
                vec![
                    TypeSample::literal("list", V::List(vec![])),
                    TypeSample::literal("list", V::List(vec![V::Int(3), V::Int(4), V::Int(5)])),
                ],
            )
            .with_type("None", vec![TypeSample::literal("None", V::None)])
            .with_type(
                "NotImplemented",
                vec![TypeSample::literal("NotImplemented", V::NotImplemented)],
            )
            .with_type(
                "range",
                vec![
                    TypeSample::expr("range", "range(0)"),
                    TypeSample::expr("range", "range(5)"),
                    TypeSample::expr("range", "range(2, 7, 2)"),
                ],
            )
            .with_type(
                "set",
                vec![
                    TypeSample::expr("set", "set()"),
                    TypeSample::literal(
                        "set",
                        V::Set(vec![V::Int(1), V::Float(2.3456), s("another")]),
                    ),
                ],
            )
            .with_type(
                "slice",
                vec![
                    TypeSample::expr("slice", "slice(0)"),
                    TypeSample::expr("slice", "slice(1, 5, 2)"),
                ],
            )
            .with_type(
                "str",
                vec![
                    TypeSample::literal("str", s("")),
                    TypeSample::literal("str", s("This is another string")),
                ],
            )
            .with_type(
                "tuple",
                vec![
                    TypeSample::literal("tuple", V::Tuple(vec![])),
                    TypeSample::literal("tuple", V::Tuple(vec![V::Int(1), V::Int(2)])),
                ],
            )
    }
}
