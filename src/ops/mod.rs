//! The standard operator set. Arithmetic extends elementwise over
//! matrices where linear algebra allows it; comparisons and logic work on
//! scalars and truthiness. Everything registers through the same plug-in
//! contract a host would use for its own operators.

mod builtins;

use std::rc::Rc;

use crate::lexer::{Assoc, Op};
use crate::runtime::Runtime;
use crate::vm::matrix::Matrix;
use crate::vm::value::{Scalar, Value};
use crate::vm::RuntimeError;

/// Register the standard operators, intrinsic functions and constants.
pub fn install(rt: &mut Runtime) {
    rt.register_ambig_op(
        "-",
        Op::unary(Assoc::Right, 100, neg),
        Op::binary(Assoc::Left, 1, sub),
    );
    rt.register_op("+", Op::binary(Assoc::Left, 1, add));
    rt.register_op("*", Op::binary(Assoc::Left, 2, mul));
    rt.register_op("/", Op::binary(Assoc::Left, 2, div));
    rt.register_op("%", Op::binary(Assoc::Left, 2, rem));
    rt.register_op("^", Op::binary(Assoc::Right, 3, pow));

    rt.register_op("!", Op::unary(Assoc::Right, 0, not));
    rt.register_op("&&", Op::binary(Assoc::Left, 0, and));
    rt.register_op("||", Op::binary(Assoc::Left, 0, or));

    rt.register_op("<", Op::binary(Assoc::Left, 0, lt));
    rt.register_op("<=", Op::binary(Assoc::Left, 0, le));
    rt.register_op("==", Op::binary(Assoc::Left, 0, eq));
    rt.register_op("!=", Op::binary(Assoc::Left, 0, ne));
    rt.register_op(">", Op::binary(Assoc::Left, 0, gt));
    rt.register_op(">=", Op::binary(Assoc::Left, 0, ge));

    builtins::install(rt);
}

fn eqdim(x: &Matrix, y: &Matrix) -> bool {
    x.height() == y.height() && x.width() == y.width()
}

fn elementwise(x: &Matrix, y: &Matrix, f: impl Fn(Scalar, Scalar) -> Scalar) -> Matrix {
    let a = x.elems();
    let b = y.elems();
    let elems = a.iter().zip(b.iter()).map(|(&p, &q)| f(p, q)).collect();
    Matrix::from_vec(x.height(), x.width(), elems)
}

fn scale(s: Scalar, m: &Matrix) -> Matrix {
    let elems = m.elems().iter().map(|&x| s * x).collect();
    Matrix::from_vec(m.height(), m.width(), elems)
}

fn neg(a: Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Scalar(x) => Ok(Value::Scalar(-x)),
        Value::Matrix(m) => {
            let elems = m.elems().iter().map(|&x| -x).collect();
            Ok(Value::Matrix(Rc::new(Matrix::from_vec(
                m.height(),
                m.width(),
                elems,
            ))))
        }
        other => Err(RuntimeError(format!(
            "cannot negate {} value",
            other.kind_name()
        ))),
    }
}

fn add(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Matrix(x), Value::Matrix(y)) => {
            if !eqdim(x, y) {
                return Err(RuntimeError(
                    "matrices unconformable for addition".to_owned(),
                ));
            }
            Ok(Value::Matrix(Rc::new(elementwise(x, y, |p, q| p + q))))
        }
        (Value::Scalar(x), Value::Scalar(y)) => Ok(Value::Scalar(x + y)),
        _ => Err(RuntimeError(format!(
            "cannot add {} to {}",
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

fn sub(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Matrix(x), Value::Matrix(y)) => {
            if !eqdim(x, y) {
                return Err(RuntimeError(
                    "matrices unconformable for subtraction".to_owned(),
                ));
            }
            Ok(Value::Matrix(Rc::new(elementwise(x, y, |p, q| p - q))))
        }
        (Value::Scalar(x), Value::Scalar(y)) => Ok(Value::Scalar(x - y)),
        _ => Err(RuntimeError(format!(
            "cannot subtract {} from {}",
            b.kind_name(),
            a.kind_name()
        ))),
    }
}

fn mul(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Matrix(x), Value::Matrix(y)) => {
            if x.width() != y.height() {
                return Err(RuntimeError(
                    "matrices unconformable for multiplication".to_owned(),
                ));
            }
            let (m, n, p) = (
                x.height() as usize,
                x.width() as usize,
                y.width() as usize,
            );
            let lhs = x.elems();
            let rhs = y.elems();
            let mut elems = vec![0.0; m * p];
            for i in 0..m {
                for j in 0..p {
                    let mut acc = 0.0;
                    for k in 0..n {
                        acc += lhs[i * n + k] * rhs[k * p + j];
                    }
                    elems[i * p + j] = acc;
                }
            }
            Ok(Value::Matrix(Rc::new(Matrix::from_vec(
                x.height(),
                y.width(),
                elems,
            ))))
        }
        (Value::Scalar(x), Value::Scalar(y)) => Ok(Value::Scalar(x * y)),
        (Value::Scalar(x), Value::Matrix(y)) => Ok(Value::Matrix(Rc::new(scale(*x, y)))),
        (Value::Matrix(x), Value::Scalar(y)) => Ok(Value::Matrix(Rc::new(scale(*y, x)))),
        _ => Err(RuntimeError(format!(
            "cannot multiply {} by {}",
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

fn div(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Scalar(x), Value::Scalar(y)) => Ok(Value::Scalar(x / y)),
        _ => Err(RuntimeError(format!(
            "cannot divide {} by {}",
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

fn rem(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Scalar(x), Value::Scalar(y)) => Ok(Value::Scalar(x % y)),
        _ => Err(RuntimeError(format!(
            "cannot calculate remainder of {} divided by {}",
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

fn pow(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Scalar(x), Value::Scalar(y)) => Ok(Value::Scalar(x.powf(*y))),
        _ => Err(RuntimeError(format!(
            "cannot raise {} to power of {}",
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

fn truth(yes: bool) -> Value {
    Value::Scalar(yes as u8 as Scalar)
}

macro_rules! comparison {
    ($name:ident, $op:tt) => {
        fn $name(a: Value, b: Value) -> Result<Value, RuntimeError> {
            match (&a, &b) {
                (Value::Scalar(x), Value::Scalar(y)) => Ok(truth(x $op y)),
                _ => Err(RuntimeError(format!(
                    "cannot compare {} and {}",
                    a.kind_name(),
                    b.kind_name()
                ))),
            }
        }
    };
}

comparison!(lt, <);
comparison!(le, <=);
comparison!(gt, >);
comparison!(ge, >=);

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Scalar(x), Value::Scalar(y)) => x == y,
        (Value::Matrix(x), Value::Matrix(y)) => eqdim(x, y) && *x.elems() == *y.elems(),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Builtin(f), Value::Builtin(g)) => f == g,
        (Value::Func(x), Value::Func(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn eq(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(truth(value_eq(&a, &b)))
}

fn ne(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(truth(!value_eq(&a, &b)))
}

fn not(a: Value) -> Result<Value, RuntimeError> {
    Ok(truth(!a.is_truthy()))
}

fn and(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(truth(a.is_truthy() && b.is_truthy()))
}

fn or(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(truth(a.is_truthy() || b.is_truthy()))
}
