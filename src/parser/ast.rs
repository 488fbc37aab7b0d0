//! Syntax tree for slot expressions

/// Constant written in an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

/// A slot expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// Named value from the scope
    Variable(String),
    /// `name(args)`
    Call { function: String, args: Vec<Expr> },
    /// `target.name`
    Attribute { target: Box<Expr>, name: String },
    /// `target.name(args)`
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    /// `[a, b, c]`
    List(Vec<Expr>),
}

impl Expr {
    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            function: function.into(),
            args,
        }
    }
}
