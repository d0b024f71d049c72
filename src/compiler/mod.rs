//! The parser/compiler: source text to bytecode in one pass.
//!
//! There is no syntax tree. Expressions are parsed by precedence climbing
//! and emit instructions as they go; statements back-patch their forward
//! jumps through per-construct fix-up lists. Each function (including the
//! implicit top-level one) keeps a table of its local names, and a sweep
//! over the freshly emitted region rewrites `Load name` into `LoadFast
//! index` for every name that turned out to be local.

mod fixup;

use std::error::Error;
use std::fmt::Display;
use std::rc::Rc;

use crate::lexer::{Assoc, Lexer, OpExec, Token, TokenKind, Trie};
use crate::names::NameTable;
use crate::vm::instr::{Chunk, Instr};
use crate::vm::value::parse_scalar;

use self::fixup::FixupStack;

/// Upper bound on declared function parameters.
pub const MAX_NARGS: u32 = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the offending token within the source.
    pub offset: usize,
    pub len: usize,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    /// Line and column of the error, computed against the source the
    /// failed compilation ran over.
    pub fn line_col(&self, source: &str) -> Option<(u32, usize)> {
        let span = self.span.as_ref()?;
        let line_start = source[..span.offset].rfind('\n').map_or(0, |at| at + 1);
        Some((span.line, span.offset - line_start + 1))
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Compile one complete source into a chunk that, when executed, calls its
/// own top-level body and prints the result.
pub fn compile(source: &str, src_name: &str, trie: &Trie) -> ParseResult<Chunk> {
    let compiler = Compiler::new(source, trie);
    let code = compiler.parse()?;
    Ok(Chunk {
        code: code.into(),
        src: Rc::from(src_name),
    })
}

/// Why an expression or statement routine returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stop {
    /// An operator below the current priority threshold (rolled back).
    Op,
    RParen,
    RBracket,
    Comma,
    Semicolon,
    Eq,
    ColonEq,
    /// A keyword that makes no sense in an expression.
    Nonsense,
    Then,
    Do,
    Eof,
    Elif,
    Else,
    End,
}

struct Compiler<'s, 't> {
    lexer: Lexer<'s, 't>,
    /// Whether the previous token completed a value. Distinguishes prefix
    /// from infix readings of ambiguous operators, calls from groupings,
    /// and indexing from matrix literals.
    expr_end: bool,
    code: Vec<Instr>,
    /// Holding buffer for a `for` loop's step expression, spliced into
    /// `code` after the body.
    aux: Vec<Instr>,
    fixup_cond: FixupStack,
    fixup_break: FixupStack,
    fixup_continue: FixupStack,
    /// One local-name table per function being compiled, innermost last.
    locals: Vec<NameTable>,
    /// Start of the not-yet-swept region for local binding.
    bind_from: usize,
    /// Line of the most recent `Quark` marker.
    line: u32,
}

impl<'s, 't> Compiler<'s, 't> {
    fn new(source: &'s str, trie: &'t Trie) -> Self {
        Self {
            lexer: Lexer::new(source, trie),
            expr_end: false,
            code: Vec::new(),
            aux: Vec::new(),
            fixup_cond: FixupStack::default(),
            fixup_break: FixupStack::default(),
            fixup_continue: FixupStack::default(),
            locals: Vec::new(),
            bind_from: 0,
            line: 0,
        }
    }

    fn parse(mut self) -> ParseResult<Vec<Instr>> {
        let fu_instr = self.func_begin();
        if self.stmt_seq()? != Stop::Eof {
            return self.err_there("syntax error");
        }
        self.func_end(fu_instr);

        self.code.push(Instr::Call(0));
        self.code.push(Instr::Print);
        self.code.push(Instr::Exit);
        Ok(self.code)
    }

    // ---- errors ----------------------------------------------------------

    fn err_at<T>(&self, token: &Token, message: &str) -> ParseResult<T> {
        Err(ParseError {
            message: message.to_owned(),
            span: Some(Span {
                offset: token.offset,
                len: token.text.len(),
                line: token.line,
            }),
        })
    }

    /// Report an error at the token the last `mark` points at.
    fn err_there<T>(&mut self, message: &str) -> ParseResult<T> {
        self.lexer.rollback();
        let token = self.lexer.next_token();
        self.err_at(&token, message)
    }

    fn check_value_done(&self, token: &Token) -> ParseResult<()> {
        if self.expr_end {
            Ok(())
        } else {
            self.err_at(token, "expected expression")
        }
    }

    fn check_value_position(&self, token: &Token) -> ParseResult<()> {
        if self.expr_end {
            self.err_at(token, "expected operator or end of expression")
        } else {
            Ok(())
        }
    }

    // ---- emission --------------------------------------------------------

    /// Emit an instruction, preceded by a `Quark` marker whenever the token
    /// starts a new source line.
    fn emit(&mut self, token: &Token, instr: Instr) {
        if token.line != self.line {
            self.code.push(Instr::Quark(token.line));
            self.line = token.line;
        }
        self.code.push(instr);
    }

    fn patch_jump(&mut self, at: usize, target: usize) {
        let offset = target as isize - at as isize;
        match &mut self.code[at] {
            Instr::Jump(o) | Instr::JumpUnless(o) => *o = offset,
            other => unreachable!("patching {other:?}"),
        }
    }

    /// The store instruction for an assignment to `name`. With `local` set
    /// the name is declared in the innermost function if new; otherwise an
    /// existing local is reused and unknown names fall through to the
    /// globals.
    fn assignment(&mut self, name: &str, local: bool) -> Instr {
        let table = self.locals.last_mut().expect("no function scope open");
        if local {
            let next = table.len() as u32;
            return Instr::StoreFast(table.put(name, next));
        }
        match table.get(name) {
            Some(index) => Instr::StoreFast(index),
            None => Instr::Store(Rc::from(name)),
        }
    }

    /// Rewrite `Load name` into `LoadFast index` over the unswept region,
    /// for every name in the innermost local table.
    fn bind_locals(&mut self) {
        let table = self.locals.last().expect("no function scope open");
        for instr in &mut self.code[self.bind_from..] {
            if let Instr::Load(name) = instr {
                if let Some(index) = table.get(name) {
                    *instr = Instr::LoadFast(index);
                }
            }
        }
        self.bind_from = self.code.len();
    }

    /// Open a function: sweep the enclosing one's region, push a fresh
    /// local table and a `Function` placeholder. Resetting the line memory
    /// guarantees the body starts with its own `Quark`, which keeps
    /// back-traces within the body's copied code.
    fn func_begin(&mut self) -> usize {
        if !self.code.is_empty() {
            self.bind_locals();
        }
        self.locals.push(NameTable::new(2));
        self.code.push(Instr::Function {
            nargs: 0,
            nlocals: 0,
            offset: 0,
        });
        self.line = 0;
        self.code.len() - 1
    }

    fn func_end(&mut self, fu_instr: usize) {
        self.bind_locals();
        let table = self.locals.pop().expect("no function scope open");
        let nnames = table.len() as u32;

        self.code.push(Instr::Exit);

        let end = self.code.len();
        match &mut self.code[fu_instr] {
            Instr::Function {
                nargs,
                nlocals,
                offset,
            } => {
                *nlocals = nnames - *nargs;
                *offset = end - fu_instr;
            }
            other => unreachable!("patching {other:?}"),
        }
    }

    /// Parse `name, name, …)` into the fresh function opened here, giving
    /// the parameters local slots 0, 1, ….
    fn paramlist(&mut self) -> ParseResult<usize> {
        let fu_instr = self.func_begin();

        let mut nargs: u32 = 0;
        let mut ident_expected = false;
        loop {
            let m = self.lexer.next_token();
            match m.kind {
                TokenKind::Ident => {
                    if !ident_expected && nargs != 0 {
                        return self.err_at(&m, "expected ',' or end of parameter list");
                    }
                    let table = self.locals.last_mut().expect("no function scope open");
                    if table.put(m.text, nargs) != nargs {
                        return self.err_at(&m, "duplicate parameter");
                    }
                    ident_expected = false;
                    nargs += 1;
                    if nargs > MAX_NARGS {
                        return self.err_at(&m, "too many parameters");
                    }
                }
                TokenKind::Comma => {
                    if nargs == 0 {
                        return self.err_at(&m, "expected parameter name or end of parameter list");
                    }
                    ident_expected = true;
                }
                TokenKind::RParen => {
                    if ident_expected {
                        return self.err_at(&m, "expected parameter name");
                    }
                    break;
                }
                _ => return self.err_at(&m, "expected parameter list"),
            }
        }

        match &mut self.code[fu_instr] {
            Instr::Function { nargs: n, .. } => *n = nargs,
            other => unreachable!("patching {other:?}"),
        }
        Ok(fu_instr)
    }

    // ---- expressions -----------------------------------------------------

    /// One matrix-literal row. Returns its width and whether the closing
    /// `]` was reached (as opposed to a `;` row separator).
    fn row(&mut self) -> ParseResult<(bool, u32)> {
        let mut width = 1u32;
        loop {
            match self.expr(-1)? {
                Stop::Comma => width += 1,
                Stop::Semicolon => return Ok((false, width)),
                Stop::RBracket => return Ok((true, width)),
                _ => return self.err_there("expected either ',' or ';' or ']'"),
            }
        }
    }

    fn expr(&mut self, min_priority: i32) -> ParseResult<Stop> {
        loop {
            self.lexer.mark();
            let m = self.lexer.next_token();

            match m.kind {
                TokenKind::Num => {
                    self.check_value_position(&m)?;
                    let Some(scalar) = parse_scalar(m.text) else {
                        return self.err_at(&m, "invalid number");
                    };
                    self.emit(&m, Instr::LoadScalar(scalar));
                    self.expr_end = true;
                }

                TokenKind::Str => {
                    self.check_value_position(&m)?;
                    self.emit(&m, Instr::LoadStr(Rc::from(m.text)));
                    self.expr_end = true;
                }

                TokenKind::Ident => {
                    self.check_value_position(&m)?;
                    self.emit(&m, Instr::Load(Rc::from(m.text)));
                    self.expr_end = true;
                }

                TokenKind::Op(_) | TokenKind::AmbigOp(_) => {
                    let op = match m.kind {
                        TokenKind::Op(op) => op,
                        TokenKind::AmbigOp(amb) => {
                            if self.expr_end {
                                amb.infix
                            } else {
                                amb.prefix
                            }
                        }
                        _ => unreachable!(),
                    };

                    // prefix operators apply wherever a value may start,
                    // regardless of the priority threshold
                    if (op.priority as i32) < min_priority
                        && !(op.is_unary() && op.assoc == Assoc::Right)
                    {
                        self.lexer.rollback();
                        return Ok(Stop::Op);
                    }

                    match op.exec {
                        OpExec::Unary(exec) if op.assoc == Assoc::Left => {
                            // postfix: operand is already emitted
                            self.check_value_done(&m)?;
                            self.emit(&m, Instr::OpUnary(exec));
                        }
                        OpExec::Unary(exec) => {
                            self.check_value_position(&m)?;
                            let stop = self.expr(op.priority as i32)?;
                            self.emit(&m, Instr::OpUnary(exec));
                            if stop != Stop::Op {
                                return Ok(stop);
                            }
                        }
                        OpExec::Binary(exec) => {
                            self.check_value_done(&m)?;
                            self.expr_end = false;
                            let bump = (op.assoc == Assoc::Left) as i32;
                            let stop = self.expr(op.priority as i32 + bump)?;
                            self.emit(&m, Instr::OpBinary(exec));
                            if stop != Stop::Op {
                                return Ok(stop);
                            }
                        }
                    }
                }

                TokenKind::LParen => {
                    if self.expr_end {
                        // call
                        self.lexer.mark();
                        let nargs = if self.lexer.next_token().kind == TokenKind::RParen {
                            0
                        } else {
                            self.lexer.rollback();
                            self.expr_end = false;
                            let mut nargs = 1u32;
                            loop {
                                match self.expr(-1)? {
                                    Stop::RParen => break,
                                    Stop::Comma => nargs += 1,
                                    _ => return self.err_there("expected either ',' or ')'"),
                                }
                            }
                            nargs
                        };
                        self.emit(&m, Instr::Call(nargs));
                    } else {
                        // grouping
                        if self.expr(-1)? != Stop::RParen {
                            return self.err_there("expected ')'");
                        }
                    }
                }

                TokenKind::LBracket => {
                    if self.expr_end {
                        // indexing
                        self.expr_end = false;
                        let mut nindices = 1u32;
                        loop {
                            match self.expr(-1)? {
                                Stop::RBracket => break,
                                Stop::Comma => nindices += 1,
                                _ => return self.err_there("expected either ',' or ']'"),
                            }
                        }
                        self.emit(&m, Instr::LoadAt(nindices));
                    } else {
                        // matrix literal
                        self.lexer.mark();
                        let (height, width) =
                            if self.lexer.next_token().kind == TokenKind::RBracket {
                                self.expr_end = true;
                                (0, 0)
                            } else {
                                self.lexer.rollback();
                                self.expr_end = false;
                                let (mut done, width) = self.row()?;
                                let mut height = 1u32;
                                while !done {
                                    let (row_done, row_width) = self.row()?;
                                    if row_width != width {
                                        return self.err_there("wrong row length");
                                    }
                                    done = row_done;
                                    height += 1;
                                }
                                (height, width)
                            };
                        self.emit(&m, Instr::Matrix { height, width });
                    }
                }

                TokenKind::Error(message) => return self.err_at(&m, message),

                TokenKind::Eof => {
                    self.check_value_done(&m)?;
                    return Ok(Stop::Eof);
                }
                TokenKind::RParen => {
                    self.check_value_done(&m)?;
                    return Ok(Stop::RParen);
                }
                TokenKind::RBracket => {
                    self.check_value_done(&m)?;
                    return Ok(Stop::RBracket);
                }
                TokenKind::Comma => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Comma);
                }
                TokenKind::Semicolon => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Semicolon);
                }
                TokenKind::Eq => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Eq);
                }
                TokenKind::ColonEq => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::ColonEq);
                }
                TokenKind::Then => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Then);
                }
                TokenKind::Do => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Do);
                }

                // keywords that may legally terminate the statement the
                // expression belongs to
                TokenKind::Elif => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Elif);
                }
                TokenKind::Else => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::Else);
                }
                TokenKind::End => {
                    self.check_value_done(&m)?;
                    self.expr_end = false;
                    return Ok(Stop::End);
                }

                TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fu
                | TokenKind::Return
                | TokenKind::Exit
                | TokenKind::Bar => return Ok(Stop::Nonsense),
            }
        }
    }

    // ---- statements ------------------------------------------------------

    /// Statements until something other than a separator.
    fn stmt_seq(&mut self) -> ParseResult<Stop> {
        loop {
            let stop = self.stmt()?;
            if stop != Stop::Semicolon {
                return Ok(stop);
            }
        }
    }

    /// The statement terminator: `;`, newline, EOF, or a block-closing
    /// keyword for the enclosing construct to consume.
    fn end_of_stmt(&mut self) -> ParseResult<Stop> {
        let m = self.lexer.next_token();
        match m.kind {
            TokenKind::Semicolon => Ok(Stop::Semicolon),
            TokenKind::Eof => Ok(Stop::Eof),
            TokenKind::Elif => Ok(Stop::Elif),
            TokenKind::Else => Ok(Stop::Else),
            TokenKind::End => Ok(Stop::End),
            _ => self.err_at(&m, "expected end of statement"),
        }
    }

    fn stmt(&mut self) -> ParseResult<Stop> {
        self.lexer.mark();
        let m = self.lexer.next_token();
        match m.kind {
            TokenKind::Semicolon => Ok(Stop::Semicolon),
            TokenKind::Eof => Ok(Stop::Eof),
            TokenKind::Elif => Ok(Stop::Elif),
            TokenKind::Else => Ok(Stop::Else),
            TokenKind::End => Ok(Stop::End),

            TokenKind::Break => {
                if self.fixup_break.is_empty() {
                    return self.err_at(&m, "'break' outside of a cycle");
                }
                self.fixup_break.add(self.code.len());
                self.code.push(Instr::Jump(0));
                self.end_of_stmt()
            }

            TokenKind::Continue => {
                if self.fixup_continue.is_empty() {
                    return self.err_at(&m, "'continue' outside of a cycle");
                }
                self.fixup_continue.add(self.code.len());
                self.code.push(Instr::Jump(0));
                self.end_of_stmt()
            }

            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Fu => self.fu_stmt(),

            TokenKind::Exit => {
                self.code.push(Instr::Exit);
                self.end_of_stmt()
            }

            TokenKind::Return => {
                let stop = self.expr(-1)?;
                self.code.push(Instr::Return);
                match stop {
                    Stop::Semicolon | Stop::Eof | Stop::Elif | Stop::Else | Stop::End => Ok(stop),
                    _ => self.err_there("expected end of expression"),
                }
            }

            _ => {
                self.lexer.rollback();
                self.expr_stmt()
            }
        }
    }

    fn expr_stmt(&mut self) -> ParseResult<Stop> {
        let stop = self.expr(-1)?;
        match stop {
            Stop::Semicolon | Stop::Eof | Stop::Elif | Stop::Else | Stop::End => {
                self.code.push(Instr::Print);
                Ok(stop)
            }
            Stop::Eq | Stop::ColonEq => {
                let store = match self.code.last().cloned() {
                    Some(Instr::Load(name)) => self.assignment(&name, stop == Stop::ColonEq),
                    Some(Instr::LoadAt(n)) if stop == Stop::Eq => Instr::StoreAt(n),
                    _ => return self.err_there("invalid assignment"),
                };
                self.code.pop();

                let stop = self.expr(-1)?;
                self.code.push(store);
                match stop {
                    Stop::Semicolon | Stop::Eof | Stop::Elif | Stop::Else | Stop::End => Ok(stop),
                    _ => self.err_there("syntax error"),
                }
            }
            _ => self.err_there("syntax error"),
        }
    }

    fn if_stmt(&mut self) -> ParseResult<Stop> {
        if self.expr(-1)? != Stop::Then {
            return self.err_there("expected 'then'");
        }

        self.fixup_cond.open();
        let mut prev_jump_unless = Some(self.code.len());
        self.code.push(Instr::JumpUnless(0));

        let mut else_seen = false;
        loop {
            match self.stmt_seq()? {
                Stop::End => break,
                Stop::Elif => {
                    if else_seen {
                        return self.err_there("'elif' after 'else'");
                    }
                    self.fixup_cond.add(self.code.len());
                    self.code.push(Instr::Jump(0));

                    let at = prev_jump_unless.expect("branch without a pending check");
                    let target = self.code.len();
                    self.patch_jump(at, target);

                    if self.expr(-1)? != Stop::Then {
                        return self.err_there("expected 'then'");
                    }
                    prev_jump_unless = Some(self.code.len());
                    self.code.push(Instr::JumpUnless(0));
                }
                Stop::Else => {
                    if else_seen {
                        return self.err_there("double 'else'");
                    }
                    self.fixup_cond.add(self.code.len());
                    self.code.push(Instr::Jump(0));

                    let at = prev_jump_unless.take().expect("branch without a pending check");
                    let target = self.code.len();
                    self.patch_jump(at, target);

                    else_seen = true;
                }
                _ => return self.err_there("expected 'elif', 'else' or 'end'"),
            }
        }

        let end = self.code.len();
        if let Some(at) = prev_jump_unless {
            self.patch_jump(at, end);
        }
        self.fixup_cond.patch(&mut self.code, end);

        self.expr_end = false;
        self.end_of_stmt()
    }

    fn while_stmt(&mut self) -> ParseResult<Stop> {
        let check_instr = self.code.len();

        self.fixup_break.open();
        self.fixup_continue.open();

        if self.expr(-1)? != Stop::Do {
            return self.err_there("expected 'do'");
        }

        let jump_instr = self.code.len();
        self.code.push(Instr::JumpUnless(0));

        if self.stmt_seq()? != Stop::End {
            return self.err_there("expected 'end'");
        }

        let at = self.code.len();
        self.code.push(Instr::Jump(check_instr as isize - at as isize));

        let end = self.code.len();
        self.patch_jump(jump_instr, end);
        self.fixup_break.patch(&mut self.code, end);
        self.fixup_continue.patch(&mut self.code, check_instr);

        self.expr_end = false;
        self.end_of_stmt()
    }

    fn for_stmt(&mut self) -> ParseResult<Stop> {
        let var = self.lexer.next_token();
        if var.kind != TokenKind::Ident {
            return self.err_at(&var, "expected identifier");
        }
        let bar = self.lexer.next_token();
        if bar.kind != TokenKind::Bar {
            return self.err_at(&bar, "expected '|'");
        }

        self.fixup_break.open();
        self.fixup_continue.open();

        // initial value
        if self.expr(-1)? != Stop::Semicolon {
            return self.err_there("expected ';'");
        }
        let init = self.assignment(var.text, true);
        self.code.push(init);

        // loop condition
        let check_instr = self.code.len();
        if self.expr(-1)? != Stop::Semicolon {
            return self.err_there("expected ';'");
        }
        let jump_instr = self.code.len();
        self.code.push(Instr::JumpUnless(0));

        // the step runs after the body, so compile it aside for splicing
        self.line = 0;
        let old_aux_len = self.aux.len();
        std::mem::swap(&mut self.code, &mut self.aux);
        let stop = self.expr(-1)?;
        if stop != Stop::Do {
            return self.err_there("expected 'do'");
        }
        let step = self.assignment(var.text, true);
        self.code.push(step);
        std::mem::swap(&mut self.code, &mut self.aux);

        // loop body
        if self.stmt_seq()? != Stop::End {
            return self.err_there("expected 'end'");
        }

        let cont_instr = self.code.len();
        self.code.extend(self.aux.drain(old_aux_len..));

        let at = self.code.len();
        self.code.push(Instr::Jump(check_instr as isize - at as isize));

        let end = self.code.len();
        self.patch_jump(jump_instr, end);
        self.fixup_break.patch(&mut self.code, end);
        self.fixup_continue.patch(&mut self.code, cont_instr);

        self.expr_end = false;
        self.end_of_stmt()
    }

    fn fu_stmt(&mut self) -> ParseResult<Stop> {
        let name = self.lexer.next_token();
        if name.kind != TokenKind::Ident {
            return self.err_at(&name, "expected identifier");
        }
        let lparen = self.lexer.next_token();
        if lparen.kind != TokenKind::LParen {
            return self.err_at(&lparen, "expected '('");
        }

        let fu_instr = self.paramlist()?;

        if self.stmt_seq()? != Stop::End {
            return self.err_there("expected 'end'");
        }
        self.func_end(fu_instr);

        let store = self.assignment(name.text, false);
        self.code.push(store);
        self.end_of_stmt()
    }
}
