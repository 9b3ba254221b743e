use std::collections::BTreeSet;
use std::fmt;

use crate::ast::{CompOp, GeomOp, JoinOp};

/// A node of a parsed filter expression.
///
/// Every node kind is its own variant, so the arity of each kind is fixed by
/// the type: leaves carry no children, `Not` exactly one, the binary
/// operators exactly two and `OperandList` any number. Children are owned,
/// which keeps the tree a tree: a node has one parent and cycles cannot be
/// built.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    // Leaves
    /// Field reference (`[name]`)
    Field(String),

    /// Session variable (`{name}` or `{name:default}`), kept raw
    Variable(String),

    /// String constant
    Str(String),

    /// Integer constant
    Integer(i64),

    /// Floating point constant
    Float(f64),

    /// Boolean constant
    Boolean(bool),

    /// The named constant `null`
    Null,

    /// Opaque geometry payload, only meaningful as a spatial operand
    Geometry(serde_json::Value),

    /// Right-hand side of `in`
    ///
    /// # Example
    /// ```text
    /// ('north', 'south', {region})
    /// ```
    OperandList(Vec<Predicate>),

    // Operators
    /// Comparison (`comp_op`)
    ///
    /// # Examples
    /// ```text
    /// [age] >= 18
    /// [name] like 'Jo%'
    /// ```
    Compare {
        op: CompOp,
        left: Box<Predicate>,
        right: Box<Predicate>,
    },

    /// List membership (`func_op`); `list` is always an `OperandList`
    In {
        left: Box<Predicate>,
        list: Box<Predicate>,
    },

    /// Negation (`unary_op`)
    Not(Box<Predicate>),

    /// Logical connective (`join_op`)
    Join {
        op: JoinOp,
        left: Box<Predicate>,
        right: Box<Predicate>,
    },

    /// Spatial test (`geom_op`)
    Spatial {
        op: GeomOp,
        left: Box<Predicate>,
        right: Box<Predicate>,
    },
}

/// Node classification, mirroring the `kind` tag of the generic
/// `{kind, value, operands}` view of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Field,
    Variable,
    StrConst,
    NumConst,
    BoolConst,
    NamedConst,
    Geometry,
    OperandList,
    CompOp,
    FuncOp,
    UnaryOp,
    JoinOp,
    GeomOp,
}

impl PredicateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredicateKind::Field => "field",
            PredicateKind::Variable => "variable",
            PredicateKind::StrConst => "str_const",
            PredicateKind::NumConst => "num_const",
            PredicateKind::BoolConst => "bool_const",
            PredicateKind::NamedConst => "named_const",
            PredicateKind::Geometry => "geometry",
            PredicateKind::OperandList => "operand_list",
            PredicateKind::CompOp => "comp_op",
            PredicateKind::FuncOp => "func_op",
            PredicateKind::UnaryOp => "unary_op",
            PredicateKind::JoinOp => "join_op",
            PredicateKind::GeomOp => "geom_op",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deepest tree the parser and the description converter will build.
/// Evaluation and SQL generation recurse once per level.
pub const MAX_DEPTH: usize = 1000;

impl Predicate {
    /// The `true` constant.
    pub const TRUE: Predicate = Predicate::Boolean(true);

    /// The `false` constant.
    pub const FALSE: Predicate = Predicate::Boolean(false);

    pub fn kind(&self) -> PredicateKind {
        match self {
            Predicate::Field(_) => PredicateKind::Field,
            Predicate::Variable(_) => PredicateKind::Variable,
            Predicate::Str(_) => PredicateKind::StrConst,
            Predicate::Integer(_) | Predicate::Float(_) => PredicateKind::NumConst,
            Predicate::Boolean(_) => PredicateKind::BoolConst,
            Predicate::Null => PredicateKind::NamedConst,
            Predicate::Geometry(_) => PredicateKind::Geometry,
            Predicate::OperandList(_) => PredicateKind::OperandList,
            Predicate::Compare { .. } => PredicateKind::CompOp,
            Predicate::In { .. } => PredicateKind::FuncOp,
            Predicate::Not(_) => PredicateKind::UnaryOp,
            Predicate::Join { .. } => PredicateKind::JoinOp,
            Predicate::Spatial { .. } => PredicateKind::GeomOp,
        }
    }

    /// Operator symbol for operator nodes, literal text or name for leaves.
    pub fn value(&self) -> String {
        match self {
            Predicate::Field(name) | Predicate::Variable(name) | Predicate::Str(name) => {
                name.clone()
            }
            Predicate::Integer(n) => n.to_string(),
            Predicate::Float(n) => n.to_string(),
            Predicate::Boolean(b) => b.to_string(),
            Predicate::Null => "null".to_string(),
            Predicate::Geometry(payload) => payload.to_string(),
            Predicate::OperandList(_) => String::new(),
            Predicate::Compare { op, .. } => op.symbol().to_string(),
            Predicate::In { .. } => "in".to_string(),
            Predicate::Not(_) => "not".to_string(),
            Predicate::Join { op, .. } => op.symbol().to_string(),
            Predicate::Spatial { op, .. } => op.name().to_string(),
        }
    }

    /// Ordered children of this node.
    pub fn operands(&self) -> Vec<&Predicate> {
        match self {
            Predicate::OperandList(items) => items.iter().collect(),
            Predicate::Compare { left, right, .. }
            | Predicate::Join { left, right, .. }
            | Predicate::Spatial { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Predicate::In { left, list } => vec![left.as_ref(), list.as_ref()],
            Predicate::Not(inner) => vec![inner.as_ref()],
            Predicate::Field(_)
            | Predicate::Variable(_)
            | Predicate::Str(_)
            | Predicate::Integer(_)
            | Predicate::Float(_)
            | Predicate::Boolean(_)
            | Predicate::Null
            | Predicate::Geometry(_) => Vec::new(),
        }
    }

    /// Height of the tree; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.operands().into_iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Names of every field referenced in the tree, sorted and de-duplicated.
    pub fn field_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_fields(&mut names);
        names.into_iter().map(str::to_string).collect()
    }

    fn collect_fields<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        if let Predicate::Field(name) = self {
            names.insert(name.as_str());
        }
        for child in self.operands() {
            child.collect_fields(names);
        }
    }

    // Constructors used by the parser and by `new_from`

    pub fn compare(op: CompOp, left: Predicate, right: Predicate) -> Self {
        Predicate::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds an `in` node; a right side that is not already a list becomes a
    /// one-element list.
    pub fn is_in(left: Predicate, list: Predicate) -> Self {
        let list = match list {
            Predicate::OperandList(_) => list,
            single => Predicate::OperandList(vec![single]),
        };
        Predicate::In {
            left: Box::new(left),
            list: Box::new(list),
        }
    }

    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    pub fn join(op: JoinOp, left: Predicate, right: Predicate) -> Self {
        Predicate::Join {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn spatial(op: GeomOp, left: Predicate, right: Predicate) -> Self {
        Predicate::Spatial {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Renders the tree back into expression syntax.
///
/// Everything the parser accepts round-trips. Spatial nodes and geometry
/// payloads have no expression syntax and are printed for reading only.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Field(name) => write!(f, "[{name}]"),
            Predicate::Variable(name) => write!(f, "{{{name}}}"),
            Predicate::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Predicate::Integer(n) => write!(f, "{n}"),
            Predicate::Float(n) => {
                // keep a decimal point so the literal lexes back as a float
                let text = n.to_string();
                if n.is_finite() && !text.contains('.') {
                    write!(f, "{text}.0")
                } else {
                    f.write_str(&text)
                }
            }
            Predicate::Boolean(b) => write!(f, "{b}"),
            Predicate::Null => f.write_str("null"),
            Predicate::Geometry(payload) => write!(f, "<geometry {payload}>"),
            Predicate::OperandList(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Predicate::Compare { op, left, right } => write!(f, "{left} {op} {right}"),
            Predicate::In { left, list } => write!(f, "{left} in {list}"),
            Predicate::Not(inner) => match inner.as_ref() {
                Predicate::Join { .. } => write!(f, "not ({inner})"),
                _ => write!(f, "not {inner}"),
            },
            Predicate::Join { op, left, right } => {
                match left.as_ref() {
                    Predicate::Join { op: inner, .. } if inner != op => write!(f, "({left})")?,
                    _ => write!(f, "{left}")?,
                }
                write!(f, " {op} ")?;
                match right.as_ref() {
                    Predicate::Join { .. } => write!(f, "({right})"),
                    _ => write!(f, "{right}"),
                }
            }
            Predicate::Spatial { op, left, right } => write!(f, "{op}({left}, {right})"),
        }
    }
}
