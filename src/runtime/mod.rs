//! The runtime facade: one long-lived object wiring the symbol trie, the
//! compiler and the VM together behind the few operations a host needs.
//! Operators, keywords and globals are registered up front; every
//! `execute` then compiles one source and runs it against the same VM
//! state, so interactive input accumulates in a single session.

use std::error::Error;
use std::fmt::Display;

use log::debug;

use crate::compiler::{compile, ParseError};
use crate::disasm;
use crate::lexer::{AmbigOp, Op, TokenKind, Trie};
use crate::vm::instr::Chunk;
use crate::vm::value::Value;
use crate::vm::{RuntimeError, Vm};

#[derive(Debug)]
pub enum ExecError {
    Compile(ParseError),
    Runtime(RuntimeError),
}

impl Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::Compile(err) => err.fmt(f),
            ExecError::Runtime(err) => err.fmt(f),
        }
    }
}

impl Error for ExecError {}

impl From<ParseError> for ExecError {
    fn from(err: ParseError) -> ExecError {
        ExecError::Compile(err)
    }
}

impl From<RuntimeError> for ExecError {
    fn from(err: RuntimeError) -> ExecError {
        ExecError::Runtime(err)
    }
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("elif", TokenKind::Elif),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("do", TokenKind::Do),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("fu", TokenKind::Fu),
    ("return", TokenKind::Return),
    ("exit", TokenKind::Exit),
    ("end", TokenKind::End),
];

pub struct Runtime {
    trie: Trie,
    vm: Vm,
    disasm: bool,
}

impl Runtime {
    /// A runtime with the core symbols and keywords registered, but no
    /// operators or built-ins; see `ops::install` for the standard set.
    pub fn new() -> Runtime {
        let mut trie = Trie::new();
        trie.insert("=", TokenKind::Eq);
        trie.insert(":=", TokenKind::ColonEq);
        trie.insert("|", TokenKind::Bar);
        for (symbol, kind) in KEYWORDS {
            trie.insert(symbol, *kind);
        }
        Runtime {
            trie,
            vm: Vm::new(),
            disasm: false,
        }
    }

    pub fn register_op(&mut self, symbol: &str, op: Op) {
        self.trie.insert(symbol, TokenKind::Op(op));
    }

    pub fn register_ambig_op(&mut self, symbol: &str, prefix: Op, infix: Op) {
        self.trie
            .insert(symbol, TokenKind::AmbigOp(AmbigOp { prefix, infix }));
    }

    pub fn register_keyword(&mut self, symbol: &str, kind: TokenKind) {
        self.trie.insert(symbol, kind);
    }

    pub fn define_global(&mut self, name: &str, value: Value) {
        self.vm.define_global(name, value);
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.vm.global(name)
    }

    /// Disassemble compiled chunks instead of executing them.
    pub fn set_disasm(&mut self, on: bool) {
        self.disasm = on;
    }

    pub fn compile(&self, src_name: &str, source: &str) -> Result<Chunk, ParseError> {
        compile(source, src_name, &self.trie)
    }

    pub fn execute(&mut self, src_name: &str, source: &str) -> Result<(), ExecError> {
        let chunk = self.compile(src_name, source)?;
        debug!("compiled {src_name}: {} instructions", chunk.code.len());
        if self.disasm {
            disasm::print(&chunk.code);
            return Ok(());
        }
        self.vm.exec(&chunk)?;
        Ok(())
    }
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;
    use crate::vm::value::Value;

    fn runtime() -> Runtime {
        let mut rt = Runtime::new();
        ops::install(&mut rt);
        rt
    }

    fn scalar_global(rt: &Runtime, name: &str) -> f64 {
        match rt.global(name) {
            Some(Value::Scalar(x)) => x,
            other => panic!("global {name} is {other:?}"),
        }
    }

    #[test]
    fn test_arithmetic() {
        let mut rt = runtime();
        rt.execute("<test>", "x = 1 + 2 * 3").unwrap();
        assert_eq!(scalar_global(&rt, "x"), 7.0);
    }

    #[test]
    fn test_while_loop() {
        let mut rt = runtime();
        rt.execute("<test>", "x = 0; while x < 3 do x = x + 1 end")
            .unwrap();
        assert_eq!(scalar_global(&rt, "x"), 3.0);
    }

    #[test]
    fn test_for_loop_runs_the_step_on_continue() {
        let mut rt = runtime();
        rt.execute(
            "<test>",
            "s = 0; for i | 1; i <= 5; i + 1 do \
             if i == 3 then continue end; \
             s = s + i end",
        )
        .unwrap();
        assert_eq!(scalar_global(&rt, "s"), 12.0);
    }

    #[test]
    fn test_function_definition_and_call() {
        let mut rt = runtime();
        rt.execute("<test>", "fu f(x) return x * x end; y = f(5)")
            .unwrap();
        assert_eq!(scalar_global(&rt, "y"), 25.0);
    }

    #[test]
    fn test_recursion() {
        let mut rt = runtime();
        rt.execute(
            "<test>",
            "fu fact(n) if n <= 1 then return 1 end; return n * fact(n - 1) end; \
             x = fact(5)",
        )
        .unwrap();
        assert_eq!(scalar_global(&rt, "x"), 120.0);
    }

    #[test]
    fn test_matrix_literal_and_indexing() {
        let mut rt = runtime();
        rt.execute("<test>", "m = [1, 2; 3, 4]; v = m[2, 1]").unwrap();
        assert_eq!(scalar_global(&rt, "v"), 3.0);
    }

    #[test]
    fn test_globals_persist_across_executions() {
        let mut rt = runtime();
        rt.execute("<a>", "x = 1").unwrap();
        rt.execute("<b>", "y = x + 1").unwrap();
        assert_eq!(scalar_global(&rt, "y"), 2.0);
    }

    #[test]
    fn test_locals_do_not_leak_into_globals() {
        let mut rt = runtime();
        rt.execute("<test>", "x := 1").unwrap();
        assert_eq!(rt.global("x"), None);
    }

    #[test]
    fn test_compile_error_has_a_position() {
        let mut rt = runtime();
        let source = "[1, 2; 3]";
        let err = rt.execute("<test>", source).unwrap_err();
        let ExecError::Compile(err) = err else {
            panic!("expected a compile error, got {err:?}");
        };
        assert_eq!(err.message, "wrong row length");
        assert!(err.line_col(source).is_some());
    }

    #[test]
    fn test_runtime_error() {
        let mut rt = runtime();
        let err = rt.execute("<test>", "fu g() return undef end; g()").unwrap_err();
        let ExecError::Runtime(err) = err else {
            panic!("expected a runtime error, got {err:?}");
        };
        assert_eq!(err.0, "undefined variable 'undef'");
    }

    #[test]
    fn test_string_escapes_round_trip() {
        let mut rt = runtime();
        rt.execute("<test>", "s = \"a\\nb\\qc\\\\d\"").unwrap();
        assert_eq!(rt.global("s"), Some(Value::Str("a\nb\"c\\d".into())));
    }

    #[test]
    fn test_intrinsic_call() {
        let mut rt = runtime();
        rt.execute("<test>", "x = trunc(1.8) + floor(2.9)").unwrap();
        assert_eq!(scalar_global(&rt, "x"), 3.0);
    }

    #[test]
    fn test_defined_global_is_visible() {
        let mut rt = runtime();
        rt.define_global("answer", Value::Scalar(42.0));
        rt.execute("<test>", "x = answer").unwrap();
        assert_eq!(scalar_global(&rt, "x"), 42.0);
    }
}
