// Statement and expression trees consumed by the interpreter

use std::fmt;
use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A type as written in source, before resolution against the type table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    /// Untyped declaration (`var x = ...`)
    Var,
    Void,
    Bool,
    Int,
    Char,
    String,
    /// Fully-qualified class or enum name, e.g. `System.Exception`
    Named(String),
    Array(Box<TypeName>),
}

impl TypeName {
    pub fn named(name: &str) -> Self {
        TypeName::Named(name.to_string())
    }

    pub fn array_of(element: TypeName) -> Self {
        TypeName::Array(Box::new(element))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Var => write!(f, "var"),
            TypeName::Void => write!(f, "void"),
            TypeName::Bool => write!(f, "bool"),
            TypeName::Int => write!(f, "int"),
            TypeName::Char => write!(f, "char"),
            TypeName::String => write!(f, "string"),
            TypeName::Named(name) => write!(f, "{}", name),
            TypeName::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Not,     // !x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i32),
    Char(char),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, SourceLocation),
    Ident(String, SourceLocation),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        location: SourceLocation,
    },
    CompoundAssign {
        op: BinOp,
        target: Box<Expr>,
        value: Box<Expr>,
        location: SourceLocation,
    },
    /// Call of a global function by name
    Call {
        name: String,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    New {
        type_name: TypeName,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expr>,
        member: String,
        location: SourceLocation,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    ArrayLiteral {
        element_type: TypeName,
        items: Vec<Expr>,
        location: SourceLocation,
    },
    TypeOf(TypeName, SourceLocation),
    /// `Color.RED`
    EnumConst {
        type_name: TypeName,
        literal: String,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Literal(_, location) | Expr::Ident(_, location) | Expr::TypeOf(_, location) => {
                *location
            }
            Expr::Binary { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Assign { location, .. }
            | Expr::CompoundAssign { location, .. }
            | Expr::Call { location, .. }
            | Expr::MethodCall { location, .. }
            | Expr::New { location, .. }
            | Expr::Member { location, .. }
            | Expr::Index { location, .. }
            | Expr::ArrayLiteral { location, .. }
            | Expr::EnumConst { location, .. } => *location,
        }
    }
}

/// Body of a loop or an if-branch: either a braced block or a single statement.
///
/// A block gets its own scope when run, a single statement does not.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Block(Vec<Stmt>),
    Single(Box<Stmt>),
}

/// One `name [= init]` entry of a variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: TypeName,
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    /// `None` declares an untyped function
    pub return_type: Option<TypeName>,
    pub params: Vec<Param>,
    /// `None` when the declaration has no body; an empty one is synthesized
    pub body: Option<Vec<Stmt>>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    /// Visible only from the declaring module
    Internal,
}

/// Initializer slot of a `for` statement
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration {
        var_type: TypeName,
        declarators: Vec<Declarator>,
    },
    Expressions(Vec<Expr>),
}

/// Label of a `case` clause
#[derive(Debug, Clone, PartialEq)]
pub enum CaseLabel {
    Int(i32),
    Char(char),
    Str(String),
    Bool(bool),
    /// Bare identifier: an enum literal name when switching on an enum,
    /// a variable reference otherwise
    Ident(String),
    TypeOf(TypeName),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub label: CaseLabel,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub exception_type: TypeName,
    pub name: String,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        var_type: TypeName,
        declarators: Vec<Declarator>,
        location: SourceLocation,
    },
    FunctionDecl(Rc<FunctionDecl>),
    ClassDecl {
        name: String,
        parent: Option<TypeName>,
        visibility: Visibility,
        location: SourceLocation,
    },
    EnumDecl {
        name: String,
        literals: Vec<String>,
        location: SourceLocation,
    },
    Empty {
        location: SourceLocation,
    },
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
    /// Nested `{ ... }` block
    Block {
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Section,
        else_branch: Option<Section>,
        location: SourceLocation,
    },
    Switch {
        selector: Expr,
        cases: Vec<CaseClause>,
        default: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Section,
        location: SourceLocation,
    },
    DoWhile {
        body: Section,
        condition: Expr,
        location: SourceLocation,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expr>,
        post: Vec<Expr>,
        body: Section,
        location: SourceLocation,
    },
    ForEach {
        var_type: TypeName,
        var_name: String,
        iterable: Expr,
        body: Section,
        location: SourceLocation,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    Throw {
        expr: Expr,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
    Sync {
        lock: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::FunctionDecl(decl) => decl.location,
            Stmt::VarDecl { location, .. }
            | Stmt::ClassDecl { location, .. }
            | Stmt::EnumDecl { location, .. }
            | Stmt::Empty { location }
            | Stmt::Expression { location, .. }
            | Stmt::Block { location, .. }
            | Stmt::If { location, .. }
            | Stmt::Switch { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::ForEach { location, .. }
            | Stmt::Try { location, .. }
            | Stmt::Throw { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Return { location, .. }
            | Stmt::Sync { location, .. } => *location,
        }
    }

    /// Move the statement to another source line (column is kept)
    pub fn at(mut self, line: usize) -> Self {
        match &mut self {
            Stmt::FunctionDecl(decl) => Rc::make_mut(decl).location.line = line,
            Stmt::VarDecl { location, .. }
            | Stmt::ClassDecl { location, .. }
            | Stmt::EnumDecl { location, .. }
            | Stmt::Empty { location }
            | Stmt::Expression { location, .. }
            | Stmt::Block { location, .. }
            | Stmt::If { location, .. }
            | Stmt::Switch { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::ForEach { location, .. }
            | Stmt::Try { location, .. }
            | Stmt::Throw { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Return { location, .. }
            | Stmt::Sync { location, .. } => location.line = line,
        }
        self
    }

    /// Declarations never abort the enclosing statement list
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Stmt::VarDecl { .. }
                | Stmt::FunctionDecl(_)
                | Stmt::ClassDecl { .. }
                | Stmt::EnumDecl { .. }
        )
    }
}
