// Columns are immutable, reference-counted arrays. A table never writes
// into a column it has registered: it replaces the handle instead. That is
// what makes `view`/`export` sharing safe, a clone that "modifies" a column
// just points its slot at a new handle and the source never notices.
//
// Primitive columns hold a plain array of their element type. Object
// columns (Text, Object, Nested) hold references. A dictionary-coded
// column keeps its sorted distinct values plus a per-row rank index and is
// typed as whatever its values are.

use crate::index::CompactIndex;
use ordered_float::OrderedFloat;
use ringtab_base::{err, precondition, type_mismatch, Ordinal, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, rc::Rc};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColumnType {
    Bool = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Double = 5,
    Text = 6,
    Object = 7,
    Nested = 8,
}

impl ColumnType {
    pub const ALL: [ColumnType; 9] = [
        ColumnType::Bool,
        ColumnType::Byte,
        ColumnType::Short,
        ColumnType::Int,
        ColumnType::Long,
        ColumnType::Double,
        ColumnType::Text,
        ColumnType::Object,
        ColumnType::Nested,
    ];

    pub fn from_u8_low_5_bits(u: u8) -> Option<Self> {
        Self::ALL.get((u & 0b1_1111) as usize).copied()
    }

    pub fn ordinal(self) -> Ordinal {
        Ordinal::new(self as usize).unwrap_or_default()
    }

    /// Types whose elements read back as an i64 through `get_long`.
    pub fn is_integral(self) -> bool {
        (self as u8) <= (ColumnType::Long as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::Byte => "byte",
            ColumnType::Short => "short",
            ColumnType::Int => "int",
            ColumnType::Long => "long",
            ColumnType::Double => "double",
            ColumnType::Text => "text",
            ColumnType::Object => "object",
            ColumnType::Nested => "nested",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single element read out of any column.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Long(i64),
    Double(OrderedFloat<f64>),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::List(vs) => {
                f.write_str("[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(OrderedFloat(v))
    }
}
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// The dictionary form of a column: sorted distinct values and, per
/// physical row, the rank of that row's value.
#[derive(Clone, Debug, PartialEq)]
pub struct Coded {
    pub(crate) values: Column,
    pub(crate) ranks: CompactIndex,
}

impl Coded {
    pub fn values(&self) -> &Column {
        &self.values
    }
    pub fn ranks(&self) -> &CompactIndex {
        &self.ranks
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Bool(Rc<[bool]>),
    Byte(Rc<[i8]>),
    Short(Rc<[i16]>),
    Int(Rc<[i32]>),
    Long(Rc<[i64]>),
    Double(Rc<[f64]>),
    Text(Rc<[String]>),
    Object(Rc<[Value]>),
    Nested(Rc<[Column]>),
    Coded(Rc<Coded>),
}

macro_rules! column_from_vec {
    ($t:ty, $variant:ident) => {
        impl From<Vec<$t>> for Column {
            fn from(v: Vec<$t>) -> Self {
                Column::$variant(v.into())
            }
        }
    };
}
column_from_vec!(bool, Bool);
column_from_vec!(i8, Byte);
column_from_vec!(i16, Short);
column_from_vec!(i32, Int);
column_from_vec!(i64, Long);
column_from_vec!(f64, Double);
column_from_vec!(String, Text);
column_from_vec!(Value, Object);

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Text(v.into_iter().map(String::from).collect())
    }
}

impl Column {
    pub fn text<S: Into<String>>(vals: impl IntoIterator<Item = S>) -> Column {
        Column::Text(vals.into_iter().map(Into::into).collect())
    }

    /// A list-valued column. Every part must share one element type.
    pub fn nested(parts: Vec<Column>) -> Result<Column> {
        let mut tys = parts.iter().map(|c| c.column_type());
        if let Some(first) = tys.next() {
            if let Some(other) = tys.find(|t| *t != first) {
                return Err(type_mismatch(format!(
                    "nested column mixes {} and {} parts",
                    first, other
                )));
            }
        }
        Ok(Column::Nested(parts.into()))
    }

    pub fn empty(ty: ColumnType) -> Column {
        match ty {
            ColumnType::Bool => Column::Bool(Vec::<bool>::new().into()),
            ColumnType::Byte => Column::Byte(Vec::<i8>::new().into()),
            ColumnType::Short => Column::Short(Vec::<i16>::new().into()),
            ColumnType::Int => Column::Int(Vec::<i32>::new().into()),
            ColumnType::Long => Column::Long(Vec::<i64>::new().into()),
            ColumnType::Double => Column::Double(Vec::<f64>::new().into()),
            ColumnType::Text => Column::Text(Vec::<String>::new().into()),
            ColumnType::Object => Column::Object(Vec::<Value>::new().into()),
            ColumnType::Nested => Column::Nested(Vec::<Column>::new().into()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Bool(v) => v.len(),
            Column::Byte(v) => v.len(),
            Column::Short(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Long(v) => v.len(),
            Column::Double(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Object(v) => v.len(),
            Column::Nested(v) => v.len(),
            Column::Coded(c) => c.ranks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Bool(_) => ColumnType::Bool,
            Column::Byte(_) => ColumnType::Byte,
            Column::Short(_) => ColumnType::Short,
            Column::Int(_) => ColumnType::Int,
            Column::Long(_) => ColumnType::Long,
            Column::Double(_) => ColumnType::Double,
            Column::Text(_) => ColumnType::Text,
            Column::Object(_) => ColumnType::Object,
            Column::Nested(_) => ColumnType::Nested,
            Column::Coded(c) => c.values.column_type(),
        }
    }

    pub fn is_coded(&self) -> bool {
        matches!(self, Column::Coded(_))
    }

    /// The backing array in creation-time order. Fails once the column has
    /// been dictionary-coded, since there is no flat array left to hand out.
    pub fn source(&self) -> Result<&Column> {
        match self {
            Column::Coded(_) => Err(precondition(
                "column has been dictionary-coded and holds no flat array",
            )),
            flat => Ok(flat),
        }
    }

    pub fn as_longs(&self) -> Option<&[i64]> {
        match self {
            Column::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_texts(&self) -> Option<&[String]> {
        match self {
            Column::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_parts(&self) -> Option<&[Column]> {
        match self {
            Column::Nested(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_coded(&self) -> Option<&Coded> {
        match self {
            Column::Coded(c) => Some(c),
            _ => None,
        }
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        Some(match self {
            Column::Bool(v) => Value::Bool(*v.get(row)?),
            Column::Byte(v) => Value::Long(*v.get(row)? as i64),
            Column::Short(v) => Value::Long(*v.get(row)? as i64),
            Column::Int(v) => Value::Long(*v.get(row)? as i64),
            Column::Long(v) => Value::Long(*v.get(row)?),
            Column::Double(v) => Value::Double(OrderedFloat(*v.get(row)?)),
            Column::Text(v) => Value::Text(v.get(row)?.clone()),
            Column::Object(v) => v.get(row)?.clone(),
            Column::Nested(v) => {
                let part = v.get(row)?;
                Value::List((0..part.len()).filter_map(|i| part.get(i)).collect())
            }
            Column::Coded(c) => c.values.get(c.ranks.get(row).ok()?)?,
        })
    }

    pub fn get_long(&self, row: usize) -> Option<i64> {
        match self {
            Column::Bool(v) => v.get(row).map(|b| *b as i64),
            Column::Byte(v) => v.get(row).map(|x| *x as i64),
            Column::Short(v) => v.get(row).map(|x| *x as i64),
            Column::Int(v) => v.get(row).map(|x| *x as i64),
            Column::Long(v) => v.get(row).copied(),
            Column::Object(v) => v.get(row).and_then(Value::as_long),
            Column::Coded(c) => c.values.get_long(c.ranks.get(row).ok()?),
            Column::Double(_) | Column::Text(_) | Column::Nested(_) => None,
        }
    }

    /// A new flat column holding the elements at `rows`, in that order.
    pub fn gather(&self, rows: &[usize]) -> Result<Column> {
        fn pick<T: Clone>(v: &[T], rows: &[usize]) -> Result<Rc<[T]>> {
            rows.iter()
                .map(|r| {
                    v.get(*r)
                        .cloned()
                        .ok_or_else(|| err(format!("gather row {} out of bounds ({})", r, v.len())))
                })
                .collect()
        }
        Ok(match self {
            Column::Bool(v) => Column::Bool(pick(v, rows)?),
            Column::Byte(v) => Column::Byte(pick(v, rows)?),
            Column::Short(v) => Column::Short(pick(v, rows)?),
            Column::Int(v) => Column::Int(pick(v, rows)?),
            Column::Long(v) => Column::Long(pick(v, rows)?),
            Column::Double(v) => Column::Double(pick(v, rows)?),
            Column::Text(v) => Column::Text(pick(v, rows)?),
            Column::Object(v) => Column::Object(pick(v, rows)?),
            Column::Nested(v) => Column::Nested(pick(v, rows)?),
            Column::Coded(c) => {
                let ranks = rows
                    .iter()
                    .map(|r| c.ranks.get(*r))
                    .collect::<Result<Vec<usize>>>()?;
                c.values.gather(&ranks)?
            }
        })
    }

    /// The flat equivalent of this column; cheap for columns that are flat.
    pub fn decode(&self) -> Result<Column> {
        match self {
            Column::Coded(c) => {
                let ranks = c.ranks.to_vec();
                c.values.gather(&ranks)
            }
            flat => Ok(flat.clone()),
        }
    }
}
