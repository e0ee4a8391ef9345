//! Growable child-slot storage for expression nodes.

use crate::expr::Expr;

/// Extra slots reserved whenever the child array has to grow.
pub const OPERAND_MARGIN: usize = 10;

/// Ordered child handles of a compound node.
///
/// Appending to a full sequence reserves [`OPERAND_MARGIN`] more slots, so
/// parser chains that grow one child at a time do not reallocate on every push.
#[derive(Debug, Default)]
pub struct Operands {
    items: Vec<Expr>,
}

impl Operands {
    pub fn with_capacity(capacity: usize) -> Self {
        Operands {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vec(items: Vec<Expr>) -> Self {
        Operands { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn get(&self, idx: usize) -> &Expr {
        assert!(
            idx < self.items.len(),
            "operand index {idx} out of range for {} operands",
            self.items.len()
        );
        &self.items[idx]
    }

    pub fn as_slice(&self) -> &[Expr] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [Expr] {
        &mut self.items
    }

    pub fn push(&mut self, value: Expr) {
        if self.items.len() == self.items.capacity() {
            self.items.reserve_exact(OPERAND_MARGIN);
        }
        self.items.push(value);
    }

    /// Put `value` at `idx`, returning the handle it replaced.
    pub fn replace(&mut self, idx: usize, value: Expr) -> Expr {
        assert!(
            idx < self.items.len(),
            "replace position {idx} out of range for {} operands",
            self.items.len()
        );
        std::mem::replace(&mut self.items[idx], value)
    }

    /// Move every child out, leaving the sequence empty.
    pub fn take_all(&mut self) -> Vec<Expr> {
        std::mem::take(&mut self.items)
    }
}

impl Clone for Operands {
    // Shares every child and keeps the reserved capacity of the source.
    fn clone(&self) -> Self {
        let mut items = Vec::with_capacity(self.items.capacity());
        items.extend(self.items.iter().cloned());
        Operands { items }
    }
}
