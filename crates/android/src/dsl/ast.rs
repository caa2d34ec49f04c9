//! Statement tree of a parsed build script

/// A parsed build script
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `a.b = value`
    Assign {
        target: Vec<String>,
        value: Expr,
        line: usize,
    },
    /// `val name = value`
    Val {
        name: String,
        value: Expr,
        line: usize,
    },
    Invoke(Invocation),
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::Assign { line, .. } | Statement::Val { line, .. } => *line,
            Statement::Invoke(invocation) => invocation.line,
        }
    }
}

/// `name(args) { body }`, with arguments and body both optional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: Vec<String>,
    pub args: Vec<Argument>,
    /// Infix modifiers such as `version "1.0"` or `apply false`
    pub infix: Vec<(String, Expr)>,
    pub body: Option<Vec<Statement>>,
    pub line: usize,
}

impl Invocation {
    /// Dotted name, e.g. `jvmTarget.set`
    pub fn dotted_name(&self) -> String {
        self.name.join(".")
    }

    /// The single positional argument, if that is all there is
    pub fn sole_arg(&self) -> Option<&Expr> {
        match self.args.as_slice() {
            [Argument { name: None, value }] => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
    /// `a.b(c).d`
    Chain(Vec<Segment>),
}

impl Expr {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&[Segment]> {
        match self {
            Expr::Chain(segments) => Some(segments),
            _ => None,
        }
    }
}

/// One link of a reference chain; `args` is `Some` for calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub args: Option<Vec<Argument>>,
}

impl Segment {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            args: Some(args),
        }
    }

    /// `name()` with no arguments
    pub fn is_empty_call(&self, name: &str) -> bool {
        self.name == name && self.args.as_ref().is_some_and(Vec::is_empty)
    }
}
