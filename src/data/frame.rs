//! Typed access to polars data frames

use crate::data::Value;
use crate::error::{PdpError, Result};
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::index;
use rand::Rng;

/// Column accessors the engine and prediction functions read frames through
pub trait FrameExt {
    fn has_column(&self, name: &str) -> bool;

    /// Numeric column cast to `f64`; nulls read as NaN
    fn numeric(&self, name: &str) -> Result<Array1<f64>>;

    /// Text column; nulls read as empty labels
    fn text(&self, name: &str) -> Result<Vec<String>>;

    /// Cells of a numeric or text column as [`Value`]s
    fn values(&self, name: &str) -> Result<Vec<Value>>;
}

impl FrameExt for DataFrame {
    fn has_column(&self, name: &str) -> bool {
        self.column(name).is_ok()
    }

    fn numeric(&self, name: &str) -> Result<Array1<f64>> {
        let column = lookup(self, name)?;
        if is_text(column) {
            return Err(type_mismatch(name, "number", column));
        }
        let cast = column.cast(&DataType::Float64)?;
        Ok(cast
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    fn text(&self, name: &str) -> Result<Vec<String>> {
        let column = lookup(self, name)?;
        let ca = column
            .str()
            .map_err(|_| type_mismatch(name, "text", column))?;
        Ok(ca
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    fn values(&self, name: &str) -> Result<Vec<Value>> {
        if is_text(lookup(self, name)?) {
            Ok(self.text(name)?.into_iter().map(Value::Text).collect())
        } else {
            Ok(self.numeric(name)?.into_iter().map(Value::Number).collect())
        }
    }
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PdpError::ColumnNotFound(name.to_string()))
}

fn is_text(column: &Column) -> bool {
    matches!(column.dtype(), DataType::String)
}

fn type_mismatch(name: &str, expected: &str, column: &Column) -> PdpError {
    PdpError::TypeMismatch {
        column: name.to_string(),
        expected: expected.to_string(),
        actual: column.dtype().to_string(),
    }
}

/// A column of `height` copies of `value`, typed to match `like`
pub fn constant_series(name: &str, value: &Value, height: usize, like: &Column) -> Result<Series> {
    match (value, is_text(like)) {
        (Value::Number(v), false) => Ok(Series::new(name.into(), vec![*v; height])),
        (Value::Text(s), true) => Ok(Series::new(name.into(), vec![s.as_str(); height])),
        (value, _) => Err(PdpError::TypeMismatch {
            column: name.to_string(),
            expected: like.dtype().to_string(),
            actual: value.type_name().to_string(),
        }),
    }
}

/// Draw `n` distinct rows uniformly at random
pub fn sample_rows<R: Rng + ?Sized>(df: &DataFrame, n: usize, rng: &mut R) -> Result<DataFrame> {
    if n > df.height() {
        return Err(PdpError::InvalidParameter {
            name: "n".to_string(),
            value: n.to_string(),
            reason: format!("cannot sample more than {} rows without replacement", df.height()),
        });
    }
    let rows: Vec<IdxSize> = index::sample(rng, df.height(), n)
        .into_iter()
        .map(|i| i as IdxSize)
        .collect();
    let idx = IdxCa::from_vec("rows".into(), rows);
    Ok(df.take(&idx)?)
}

/// Cell-for-cell equality; floats compare by bit pattern so NaN cells match
pub fn bitwise_eq(a: &DataFrame, b: &DataFrame) -> bool {
    a.shape() == b.shape()
        && a.get_columns().iter().all(|left| {
            b.column(left.name().as_str())
                .map_or(false, |right| columns_bitwise_eq(left, right))
        })
}

fn columns_bitwise_eq(left: &Column, right: &Column) -> bool {
    if left.dtype() != right.dtype() {
        return false;
    }
    if is_text(left) {
        return match (left.str(), right.str()) {
            (Ok(l), Ok(r)) => l.into_iter().eq(r.into_iter()),
            _ => false,
        };
    }
    match (left.cast(&DataType::Float64), right.cast(&DataType::Float64)) {
        (Ok(l), Ok(r)) => match (l.f64(), r.f64()) {
            (Ok(l), Ok(r)) => l
                .into_iter()
                .map(|v| v.map(f64::to_bits))
                .eq(r.into_iter().map(|v| v.map(f64::to_bits))),
            _ => false,
        },
        _ => false,
    }
}
