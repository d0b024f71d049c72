use crate::vm::instr::Instr;

/// A stack of fix-up lists. Each open `if`/`while`/`for` pushes a list and
/// records into it the indices of jump instructions whose targets are not
/// known until the construct closes; closing the construct patches them
/// all and pops the list.
#[derive(Default)]
pub struct FixupStack {
    lists: Vec<Vec<usize>>,
}

impl FixupStack {
    pub fn open(&mut self) {
        self.lists.push(Vec::new());
    }

    /// Record a jump at instruction index `at` in the innermost list.
    pub fn add(&mut self, at: usize) {
        self.lists
            .last_mut()
            .expect("fix-up outside of an open construct")
            .push(at);
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Point every recorded jump of the innermost list at `target` and pop
    /// the list. Offsets are relative to the jump's own index, so the same
    /// formula serves forward and backward targets.
    pub fn patch(&mut self, code: &mut [Instr], target: usize) {
        let list = self.lists.pop().expect("no open fix-up list to patch");
        for at in list {
            let offset = target as isize - at as isize;
            match &mut code[at] {
                Instr::Jump(o) | Instr::JumpUnless(o) => *o = offset,
                other => unreachable!("fix-up points at {other:?}"),
            }
        }
    }
}
