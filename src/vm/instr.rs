use std::rc::Rc;

use super::value::{Scalar, Value};
use super::RuntimeError;

/// Executor of a unary operator.
pub type UnaryFn = fn(Value) -> Result<Value, RuntimeError>;

/// Executor of a binary operator.
pub type BinaryFn = fn(Value, Value) -> Result<Value, RuntimeError>;

/// A single virtual machine instruction.
///
/// Jump offsets are relative to the index of the jump instruction itself;
/// the offset of a `Function` instruction spans its inline body, so adding
/// it to the instruction's index lands just past the body.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    Print,
    LoadScalar(Scalar),
    /// The literal as it appeared in the source, quotes included.
    /// Unescaping happens when the instruction executes.
    LoadStr(Rc<str>),
    Load(Rc<str>),
    LoadFast(u32),
    Store(Rc<str>),
    StoreFast(u32),
    LoadAt(u32),
    StoreAt(u32),
    OpUnary(UnaryFn),
    OpBinary(BinaryFn),
    Call(u32),
    Matrix { height: u32, width: u32 },
    Jump(isize),
    JumpUnless(isize),
    Function { nargs: u32, nlocals: u32, offset: usize },
    Return,
    Exit,
    /// Source line marker. A no-op at run time; the back-trace printer
    /// scans backward for the nearest one to locate a failing instruction.
    Quark(u32),
}

/// An immutable instruction sequence produced by one compilation, together
/// with the name of the source it was compiled from.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub code: Rc<[Instr]>,
    pub src: Rc<str>,
}
