// The boundary between the engine and record types living outside it.
// Anything that can produce a `Value` for "the pos-th column of type ty at
// the current row" is a `Row`; a record type knows how to build itself from
// a `Row` by implementing `Combine`. Absent or null fields fall back to a
// per-type default registered once for the whole process.

use crate::{
    column::{ColumnType, Value},
    cursor::RowCursor,
    table::Table,
};
use ringtab_base::{missing, type_mismatch, ErrorKind, Result};
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::{Mutex, OnceLock},
};
use tracing::debug;

pub trait FromValue: Sized {
    fn from_value(v: Value) -> Result<Self>;
}

fn wrong<T>(v: &Value) -> ringtab_base::Error {
    type_mismatch(format!("cannot read {:?} as {}", v, type_name::<T>()))
}

impl FromValue for Value {
    fn from_value(v: Value) -> Result<Self> {
        Ok(v)
    }
}

impl FromValue for i64 {
    fn from_value(v: Value) -> Result<Self> {
        v.as_long().ok_or_else(|| wrong::<i64>(&v))
    }
}

impl FromValue for i32 {
    fn from_value(v: Value) -> Result<Self> {
        let n = i64::from_value(v)?;
        Ok(i32::try_from(n)?)
    }
}

impl FromValue for bool {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(b),
            Value::Long(0) => Ok(false),
            Value::Long(1) => Ok(true),
            other => Err(wrong::<bool>(&other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Double(d) => Ok(d.into_inner()),
            Value::Long(n) => Ok(n as f64),
            other => Err(wrong::<f64>(&other)),
        }
    }
}

impl FromValue for String {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Text(s) => Ok(s),
            other => Err(wrong::<String>(&other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::List(vs) => vs.into_iter().map(T::from_value).collect(),
            other => Err(wrong::<Vec<T>>(&other)),
        }
    }
}

pub trait Row {
    /// The `pos`-th column of type `ty` at the current row.
    fn value(&self, ty: ColumnType, pos: usize) -> Result<Value>;

    fn get<T: FromValue>(&self, pos: usize, ty: ColumnType) -> Result<T> {
        T::from_value(self.value(ty, pos)?)
    }

    /// Elements of a list-valued (nested) column.
    fn get_many<T: FromValue>(&self, pos: usize, ty: ColumnType) -> Result<Vec<T>> {
        Vec::<T>::from_value(self.value(ty, pos)?)
    }

    fn get_long(&self, pos: usize) -> Result<i64> {
        self.get(pos, ColumnType::Long)
    }

    /// Like `get`, but a null value or a missing column yields the
    /// registered default for `T`.
    fn get_or_default<T: FromValue + Any + Clone>(&self, pos: usize, ty: ColumnType) -> Result<T> {
        match self.value(ty, pos) {
            Ok(Value::Null) => default_of::<T>(),
            Ok(v) => T::from_value(v),
            Err(e) if e.kind() == ErrorKind::MissingReference => default_of::<T>(),
            Err(e) => Err(e),
        }
    }
}

/// A record type that builds itself from one row.
pub trait Combine: Sized {
    fn combine(row: &impl Row) -> Result<Self>;
}

/// Combine every remaining row under `cursor`.
pub fn combine_rows<T: Combine>(cursor: &mut RowCursor) -> Result<Vec<T>> {
    let mut out = Vec::new();
    while cursor.advance() {
        out.push(T::combine(&*cursor)?);
    }
    Ok(out)
}

impl Table {
    /// One `T` per row, in logical order.
    pub fn combine<T: Combine>(&self) -> Result<Vec<T>> {
        debug!(target: "ringtab", table = self.id(), rows = self.rows(), ty = type_name::<T>(), "combine");
        combine_rows(&mut self.cursor())
    }
}

type Defaults = Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>;

fn defaults() -> &'static Defaults {
    static DEFAULTS: OnceLock<Defaults> = OnceLock::new();
    DEFAULTS.get_or_init(Default::default)
}

/// Register the zero value of `T`. Registering an equal value again is
/// fine; a different one is rejected.
pub fn register_default<T: Any + Clone + PartialEq + Send + Sync>(value: T) -> Result<()> {
    let mut map = defaults().lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = map.get(&TypeId::of::<T>()) {
        return match existing.downcast_ref::<T>() {
            Some(v) if *v == value => Ok(()),
            _ => Err(type_mismatch(format!(
                "conflicting default already registered for {}",
                type_name::<T>()
            ))),
        };
    }
    map.insert(TypeId::of::<T>(), Box::new(value));
    Ok(())
}

pub fn default_of<T: Any + Clone>() -> Result<T> {
    let map = defaults().lock().unwrap_or_else(|e| e.into_inner());
    map.get(&TypeId::of::<T>())
        .and_then(|v| v.downcast_ref::<T>())
        .cloned()
        .ok_or_else(|| missing(format!("no default registered for {}", type_name::<T>())))
}
