use std::rc::Rc;

use super::instr::Instr;

/// A user-defined function. The body is the function's own copy of the
/// instructions between its `Function` marker and the matching `Exit`;
/// cloning the value clones the handle, never the code.
#[derive(Debug, PartialEq)]
pub struct Func {
    pub nargs: u32,
    pub nlocals: u32,
    pub body: Rc<[Instr]>,
    /// Name of the source the function was compiled from, for back-traces.
    pub src: Rc<str>,
}
