//! Indented text dump of predicate trees.
//!
//! One line per node in `kind: value` form, children indented two spaces
//! below their parent. Operand lists print only their kind. The output is a
//! pure function of the tree, which makes it suitable for snapshot tests.
//!
//! # Examples
//!
//! ```
//! use layerfilter::parser::parse;
//!
//! let tree = parse("[age] >= 18").unwrap();
//! assert_eq!(
//!     tree.tree_str(0),
//!     "comp_op: >=\n  field: age\n  num_const: 18\n"
//! );
//! ```

use crate::ast::{Predicate, PredicateKind};

pub struct TreePrinter {
    base_indent: usize,
}

impl TreePrinter {
    pub fn new(base_indent: usize) -> Self {
        TreePrinter { base_indent }
    }

    pub fn print(&self, predicate: &Predicate) -> String {
        let mut out = String::new();
        self.print_node(predicate, self.base_indent, &mut out);
        out
    }

    fn print_node(&self, node: &Predicate, level: usize, out: &mut String) {
        out.push_str(&self.indent(level));
        out.push_str(node.kind().as_str());
        if node.kind() != PredicateKind::OperandList {
            out.push_str(": ");
            out.push_str(&node.value());
        }
        out.push('\n');

        for child in node.operands() {
            self.print_node(child, level + 1, out);
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

impl Predicate {
    /// Indented dump of this tree starting `indent` levels deep.
    pub fn tree_str(&self, indent: usize) -> String {
        TreePrinter::new(indent).print(self)
    }
}
