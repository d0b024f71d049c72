use std::cell::{Ref, RefCell, RefMut};

use super::value::{Scalar, Value};
use super::RuntimeError;

/// A rectangular matrix of scalars in row-major order. The dimensions are
/// fixed at construction; only the elements may be assigned afterwards,
/// and element writes are visible through every handle to the matrix.
///
/// Invariant: `height == 0` exactly when `width == 0`, and the element
/// buffer always holds `height * width` scalars.
#[derive(Debug, PartialEq)]
pub struct Matrix {
    height: u32,
    width: u32,
    elems: RefCell<Vec<Scalar>>,
}

impl Matrix {
    /// A zero-filled `height` by `width` matrix.
    pub fn new(height: u32, width: u32) -> Matrix {
        let nelems = height as usize * width as usize;
        Matrix {
            height,
            width,
            elems: RefCell::new(vec![0.0; nelems]),
        }
    }

    /// Build a matrix from a row-major element buffer.
    pub fn from_vec(height: u32, width: u32, elems: Vec<Scalar>) -> Matrix {
        debug_assert_eq!(elems.len(), height as usize * width as usize);
        Matrix {
            height,
            width,
            elems: RefCell::new(elems),
        }
    }

    /// Build a matrix from the values a matrix literal pushed on the stack.
    /// Every element must be a scalar.
    pub fn construct(elems: &[Value], height: u32, width: u32) -> Result<Matrix, RuntimeError> {
        let mut buf = Vec::with_capacity(elems.len());
        for v in elems {
            match v {
                Value::Scalar(x) => buf.push(*x),
                other => {
                    return Err(RuntimeError(format!(
                        "matrix element is {} (scalar expected)",
                        other.kind_name()
                    )))
                }
            }
        }
        Ok(Matrix::from_vec(height, width, buf))
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn elems(&self) -> Ref<'_, Vec<Scalar>> {
        self.elems.borrow()
    }

    pub fn elems_mut(&self) -> RefMut<'_, Vec<Scalar>> {
        self.elems.borrow_mut()
    }

    /// One-based linear indexing over the row-major buffer.
    pub fn get1(&self, elem: &Value) -> Result<Value, RuntimeError> {
        let num = self.linear_index(elem)?;
        Ok(Value::Scalar(self.elems.borrow()[num - 1]))
    }

    /// One-based (row, column) indexing.
    pub fn get2(&self, row: &Value, col: &Value) -> Result<Value, RuntimeError> {
        let index = self.pair_index(row, col)?;
        Ok(Value::Scalar(self.elems.borrow()[index]))
    }

    pub fn set1(&self, elem: &Value, v: &Value) -> Result<(), RuntimeError> {
        let num = self.linear_index(elem)?;
        let x = Self::assignable(v)?;
        self.elems.borrow_mut()[num - 1] = x;
        Ok(())
    }

    pub fn set2(&self, row: &Value, col: &Value, v: &Value) -> Result<(), RuntimeError> {
        let index = self.pair_index(row, col)?;
        let x = Self::assignable(v)?;
        self.elems.borrow_mut()[index] = x;
        Ok(())
    }

    fn linear_index(&self, elem: &Value) -> Result<usize, RuntimeError> {
        let Value::Scalar(x) = elem else {
            return Err(RuntimeError(format!(
                "cannot index matrix with {} value",
                elem.kind_name()
            )));
        };
        let num = x.trunc();
        let nelems = self.height as usize * self.width as usize;
        if num < 1.0 || num > nelems as Scalar {
            return Err(RuntimeError("element number out of range".to_owned()));
        }
        Ok(num as usize)
    }

    fn pair_index(&self, row: &Value, col: &Value) -> Result<usize, RuntimeError> {
        let (Value::Scalar(r), Value::Scalar(c)) = (row, col) else {
            return Err(RuntimeError(format!(
                "cannot index matrix with ({}, {}) values",
                row.kind_name(),
                col.kind_name()
            )));
        };
        let i = r.trunc();
        let j = c.trunc();
        if i < 1.0 || i > self.height as Scalar {
            return Err(RuntimeError("row number out of range".to_owned()));
        }
        if j < 1.0 || j > self.width as Scalar {
            return Err(RuntimeError("column number out of range".to_owned()));
        }
        Ok((i as usize - 1) * self.width as usize + (j as usize - 1))
    }

    fn assignable(v: &Value) -> Result<Scalar, RuntimeError> {
        match v {
            Value::Scalar(x) => Ok(*x),
            other => Err(RuntimeError(format!(
                "cannot assign matrix element a {} value",
                other.kind_name()
            ))),
        }
    }
}
