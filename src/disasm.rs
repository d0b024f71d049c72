//! A plain-text disassembler for compiled chunks, used by the `-d` flag
//! and the `DisAsm` built-in.

use crate::vm::instr::Instr;
use crate::vm::value::format_scalar;

pub fn print(code: &[Instr]) {
    for (i, instr) in code.iter().enumerate() {
        print!("{i:8} | ");
        match instr {
            Instr::Print => println!("print"),
            Instr::LoadScalar(x) => println!("{:<16}{}", "load_scalar", format_scalar(*x)),
            Instr::LoadStr(lit) => println!("{:<16}{lit}", "load_str"),
            Instr::Load(name) => println!("{:<16}\"{name}\"", "load"),
            Instr::LoadFast(index) => println!("{:<16}{index}", "load_fast"),
            Instr::Store(name) => println!("{:<16}\"{name}\"", "store"),
            Instr::StoreFast(index) => println!("{:<16}{index}", "store_fast"),
            Instr::LoadAt(nindices) => println!("{:<16}{nindices}", "load_at"),
            Instr::StoreAt(nindices) => println!("{:<16}{nindices}", "store_at"),
            Instr::OpUnary(exec) => println!("{:<16}{:p}", "unary", *exec as *const ()),
            Instr::OpBinary(exec) => println!("{:<16}{:p}", "binary", *exec as *const ()),
            Instr::Call(nargs) => println!("{:<16}{nargs}", "call"),
            Instr::Matrix { height, width } => {
                println!("{:<16}{height}, {width}", "matrix")
            }
            Instr::Jump(offset) => {
                println!("{:<16}{offset:+} \t(-> {})", "jump", i as isize + offset)
            }
            Instr::JumpUnless(offset) => {
                println!("{:<16}{offset:+} \t(-> {})", "jump_unless", i as isize + offset)
            }
            Instr::Function {
                nargs,
                nlocals,
                offset,
            } => println!(
                "{:<16}nargs={nargs}, nlocals={nlocals}, +{offset} \t(-> {})",
                "function",
                i + offset
            ),
            Instr::Return => println!("return"),
            Instr::Exit => println!("exit"),
            Instr::Quark(line) => println!("{:<16}{line}", "quark"),
        }
    }
}
