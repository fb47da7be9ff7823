//! Value representation for results printed by a backend.
//!
//! Backends report results as `repr` text. Comparing that text directly would
//! make `{1, 2}` and `{2, 1}` differ, so results are parsed into this model
//! and compared with [`Value::equivalent`].
mod repr;

pub use repr::parse_repr;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    None,
    NotImplemented,
    Ellipsis,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex { re: f64, im: f64 },
    Str(String),
    Bytes(Vec<u8>),
    ByteArray(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    FrozenSet(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    /// Constructor-shaped reprs such as `range(0, 5)` or `slice(1, 2, None)`.
    Call { callee: String, args: Vec<Value> },
    /// Anything the repr parser does not model, kept verbatim.
    Opaque(String),
}

impl Value {
    /// Canonical equality used by the outcome comparator.
    ///
    /// Numbers compare by value across int and float, sequences compare in
    /// order, sets and dicts ignore order. NaN equals NaN and the sign of a
    /// floating zero is significant.
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None)
            | (Value::NotImplemented, Value::NotImplemented)
            | (Value::Ellipsis, Value::Ellipsis) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => floats_equal(*a, *b),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                int_float_equal(*a, *b)
            }
            (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => {
                floats_equal(*ar, *br) && floats_equal(*ai, *bi)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) | (Value::ByteArray(a), Value::ByteArray(b)) => {
                a == b
            }
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                sequences_equal(a, b)
            }
            (Value::Set(a), Value::Set(b)) | (Value::FrozenSet(a), Value::FrozenSet(b)) => {
                unordered_equal(a, b)
            }
            (Value::Dict(a), Value::Dict(b)) => dicts_equal(a, b),
            (
                Value::Call {
                    callee: a_callee,
                    args: a_args,
                },
                Value::Call {
                    callee: b_callee,
                    args: b_args,
                },
            ) => a_callee == b_callee && sequences_equal(a_args, b_args),
            (Value::Opaque(a), Value::Opaque(b)) => {
                normalize_addresses(a) == normalize_addresses(b)
            }
            _ => false,
        }
    }

    /// Source literal for this value, if the language has one.
    ///
    /// Empty sets, frozensets, bytearrays, constructor calls, opaque values
    /// and non-finite floats have no literal form and return `None`.
    pub fn literal(&self) -> Option<String> {
        match self {
            Value::None => Some("None".to_string()),
            Value::NotImplemented => Some("NotImplemented".to_string()),
            Value::Ellipsis => Some("...".to_string()),
            Value::Bool(true) => Some("True".to_string()),
            Value::Bool(false) => Some("False".to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => float_literal(*f),
            Value::Complex { re, im } => {
                if !re.is_finite() || !im.is_finite() {
                    return None;
                }
                if *re == 0.0 && !re.is_sign_negative() {
                    return Some(format!("{}j", float_literal(*im)?));
                }
                let sign = if im.is_sign_negative() { '-' } else { '+' };
                Some(format!(
                    "({}{}{}j)",
                    float_literal(*re)?,
                    sign,
                    float_literal(im.abs())?
                ))
            }
            Value::Str(s) => Some(quote_str(s)),
            Value::Bytes(b) => Some(quote_bytes(b)),
            Value::List(items) => Some(format!("[{}]", join_literals(items)?)),
            Value::Tuple(items) if items.len() == 1 => {
                Some(format!("({},)", items[0].literal()?))
            }
            Value::Tuple(items) => Some(format!("({})", join_literals(items)?)),
            Value::Set(items) if !items.is_empty() => Some(format!("{{{}}}", join_literals(items)?)),
            Value::Dict(entries) => {
                let rendered = entries
                    .iter()
                    .map(|(k, v)| Some(format!("{}: {}", k.literal()?, v.literal()?)))
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("{{{}}}", rendered.join(", ")))
            }
            Value::Set(_)
            | Value::FrozenSet(_)
            | Value::ByteArray(_)
            | Value::Call { .. }
            | Value::Opaque(_) => None,
        }
    }
}

fn floats_equal(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    a == b && a.is_sign_negative() == b.is_sign_negative()
}

/// Exact comparison: an `i64` beyond 2^53 is not rounded to the float.
fn int_float_equal(int: i64, float: f64) -> bool {
    // 2^63, the first float above i64::MAX.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if !float.is_finite() || float.fract() != 0.0 || (float == 0.0 && float.is_sign_negative()) {
        return false;
    }
    (-BOUND..BOUND).contains(&float) && float as i64 == int
}

fn sequences_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
}

fn unordered_equal(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        let found = b
            .iter()
            .enumerate()
            .position(|(i, y)| !used[i] && x.equivalent(y));
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn dicts_equal(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    a.len() == b.len()
        && a.iter().all(|(ak, av)| {
            b.iter()
                .find(|(bk, _)| ak.equivalent(bk))
                .is_some_and(|(_, bv)| av.equivalent(bv))
        })
}

/// Replaces hex addresses such as `0x7f3a2c` with `0x?` so object reprs from
/// different processes can be compared.
pub fn normalize_addresses(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '0' && matches!(chars.peek(), Some('x') | Some('X')) {
            let mut lookahead = chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|d| d.is_ascii_hexdigit()) {
                chars.next();
                while chars.peek().is_some_and(|d| d.is_ascii_hexdigit()) {
                    chars.next();
                }
                out.push_str("0x?");
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn float_literal(f: f64) -> Option<String> {
    if !f.is_finite() {
        return None;
    }
    // Debug keeps a fractional part ("0.0", "-0.0") which the grammar needs.
    Some(format!("{f:?}"))
}

fn join_literals(items: &[Value]) -> Option<String> {
    let rendered = items.iter().map(Value::literal).collect::<Option<Vec<_>>>()?;
    Some(rendered.join(", "))
}

fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('\'');
    out
}
