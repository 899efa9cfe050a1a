// Sorting, grouping and joining all need the same thing from a column: a
// totally ordered key per physical row. An accessor produces those keys
// once, up front, either as primitive longs or as object values, and the
// algorithms downstream are written once, generically, over `K: Ord`.

use crate::column::{Column, Value};
use ringtab_base::{capacity, type_mismatch, Result};
use std::{cmp::Ordering, fmt};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Long(i64),
    Obj(Value),
}

impl Key {
    pub fn to_value(&self) -> Value {
        match self {
            Key::Long(v) => Value::Long(*v),
            Key::Obj(v) => v.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Long(v) => write!(f, "{}", v),
            Key::Obj(v) => write!(f, "{}", v),
        }
    }
}

/// Keys for every physical row of a column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keys {
    Longs(Vec<i64>),
    Objs(Vec<Value>),
}

impl Keys {
    pub fn len(&self) -> usize {
        match self {
            Keys::Longs(v) => v.len(),
            Keys::Objs(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Key> {
        match self {
            Keys::Longs(v) => v.get(row).map(|x| Key::Long(*x)),
            Keys::Objs(v) => v.get(row).map(|x| Key::Obj(x.clone())),
        }
    }

    /// Compare the keys of two physical rows. Out-of-range rows sort last.
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        fn cmp<K: Ord>(v: &[K], a: usize, b: usize) -> Ordering {
            match (v.get(a), v.get(b)) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        match self {
            Keys::Longs(v) => cmp(v, a, b),
            Keys::Objs(v) => cmp(v, a, b),
        }
    }

    /// A column holding the keys of `rows`, in that order.
    pub fn gather(&self, rows: &[usize]) -> Result<Column> {
        fn pick<K: Clone>(v: &[K], rows: &[usize]) -> Result<Vec<K>> {
            rows.iter()
                .map(|r| {
                    v.get(*r).cloned().ok_or_else(|| {
                        capacity(format!("row {} out of range for {} keys", r, v.len()))
                    })
                })
                .collect()
        }
        Ok(match self {
            Keys::Longs(v) => Column::from(pick(v.as_slice(), rows)?),
            Keys::Objs(v) => Column::from(pick(v.as_slice(), rows)?),
        })
    }
}

type LongFn<'f> = Box<dyn Fn(i64) -> i64 + 'f>;
type ObjFn<'f> = Box<dyn Fn(Value) -> Value + 'f>;

pub enum Accessor<'f> {
    Long(Option<LongFn<'f>>),
    Obj(Option<ObjFn<'f>>),
}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Long(m) => write!(f, "Accessor::Long(mapped: {})", m.is_some()),
            Accessor::Obj(m) => write!(f, "Accessor::Obj(mapped: {})", m.is_some()),
        }
    }
}

impl<'f> Accessor<'f> {
    /// Integral elements as-is.
    pub fn long() -> Self {
        Accessor::Long(None)
    }

    pub fn long_with(f: impl Fn(i64) -> i64 + 'f) -> Self {
        Accessor::Long(Some(Box::new(f)))
    }

    /// Any element as its `Value`.
    pub fn obj() -> Self {
        Accessor::Obj(None)
    }

    pub fn obj_with(f: impl Fn(Value) -> Value + 'f) -> Self {
        Accessor::Obj(Some(Box::new(f)))
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Accessor::Long(_))
    }

    pub fn keys(&self, column: &Column) -> Result<Keys> {
        let n = column.len();
        match self {
            Accessor::Long(map) => {
                if !column.column_type().is_integral() && !matches!(column, Column::Object(_)) {
                    return Err(type_mismatch(format!(
                        "long accessor over {} column",
                        column.column_type()
                    )));
                }
                let mut out = Vec::with_capacity(n);
                for row in 0..n {
                    let v = column.get_long(row).ok_or_else(|| {
                        type_mismatch(format!("row {} has no long value", row))
                    })?;
                    out.push(match map {
                        Some(f) => f(v),
                        None => v,
                    });
                }
                Ok(Keys::Longs(out))
            }
            Accessor::Obj(map) => {
                let mut out = Vec::with_capacity(n);
                for row in 0..n {
                    let v = column.get(row).unwrap_or_default();
                    out.push(match map {
                        Some(f) => f(v),
                        None => v,
                    });
                }
                Ok(Keys::Objs(out))
            }
        }
    }
}
