//! Constructors for building statement trees by hand
//!
//! Parsing lives outside this crate, so hosts and tests assemble programs with
//! these helpers. Every node is placed at line 1; use [`Stmt::at`] to move a
//! statement to another line when source positions matter.

use super::ast::*;
use std::rc::Rc;

fn loc() -> SourceLocation {
    SourceLocation::new(1, 1)
}

// Expressions

pub fn null() -> Expr {
    Expr::Literal(Literal::Null, loc())
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal(Literal::Bool(value), loc())
}

pub fn int(value: i32) -> Expr {
    Expr::Literal(Literal::Int(value), loc())
}

pub fn chr(value: char) -> Expr {
    Expr::Literal(Literal::Char(value), loc())
}

pub fn string(value: &str) -> Expr {
    Expr::Literal(Literal::Str(value.to_string()), loc())
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string(), loc())
}

pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        location: loc(),
    }
}

pub fn unary(op: UnOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
        location: loc(),
    }
}

/// `name++`
pub fn post_inc(name: &str) -> Expr {
    unary(UnOp::PostInc, ident(name))
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    Expr::Assign {
        target: Box::new(target),
        value: Box::new(value),
        location: loc(),
    }
}

/// `name = value`
pub fn set(name: &str, value: Expr) -> Expr {
    assign(ident(name), value)
}

/// `name += value`
pub fn add_assign(name: &str, value: Expr) -> Expr {
    Expr::CompoundAssign {
        op: BinOp::Add,
        target: Box::new(ident(name)),
        value: Box::new(value),
        location: loc(),
    }
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        name: name.to_string(),
        args,
        location: loc(),
    }
}

pub fn method(receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Expr::MethodCall {
        receiver: Box::new(receiver),
        method: method.to_string(),
        args,
        location: loc(),
    }
}

pub fn new_object(type_name: TypeName, args: Vec<Expr>) -> Expr {
    Expr::New {
        type_name,
        args,
        location: loc(),
    }
}

pub fn member(object: Expr, member: &str) -> Expr {
    Expr::Member {
        object: Box::new(object),
        member: member.to_string(),
        location: loc(),
    }
}

pub fn index(target: Expr, index: Expr) -> Expr {
    Expr::Index {
        target: Box::new(target),
        index: Box::new(index),
        location: loc(),
    }
}

pub fn array(element_type: TypeName, items: Vec<Expr>) -> Expr {
    Expr::ArrayLiteral {
        element_type,
        items,
        location: loc(),
    }
}

pub fn type_of(type_name: TypeName) -> Expr {
    Expr::TypeOf(type_name, loc())
}

pub fn enum_const(type_name: &str, literal: &str) -> Expr {
    Expr::EnumConst {
        type_name: TypeName::named(type_name),
        literal: literal.to_string(),
        location: loc(),
    }
}

// Statements

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expression {
        expr,
        location: loc(),
    }
}

pub fn empty() -> Stmt {
    Stmt::Empty { location: loc() }
}

pub fn var_decl(var_type: TypeName, name: &str, init: Option<Expr>) -> Stmt {
    var_decl_many(var_type, vec![(name, init)])
}

pub fn var_decl_many(var_type: TypeName, declarators: Vec<(&str, Option<Expr>)>) -> Stmt {
    Stmt::VarDecl {
        var_type,
        declarators: declarators
            .into_iter()
            .map(|(name, init)| Declarator {
                name: name.to_string(),
                init,
            })
            .collect(),
        location: loc(),
    }
}

pub fn function(
    name: &str,
    return_type: Option<TypeName>,
    params: Vec<(TypeName, &str)>,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::FunctionDecl(Rc::new(FunctionDecl {
        name: name.to_string(),
        return_type,
        params: params
            .into_iter()
            .map(|(param_type, name)| Param {
                name: name.to_string(),
                param_type,
            })
            .collect(),
        body: Some(body),
        location: loc(),
    }))
}

pub fn class_decl(name: &str, parent: Option<&str>) -> Stmt {
    Stmt::ClassDecl {
        name: name.to_string(),
        parent: parent.map(TypeName::named),
        visibility: Visibility::Public,
        location: loc(),
    }
}

pub fn enum_decl(name: &str, literals: &[&str]) -> Stmt {
    Stmt::EnumDecl {
        name: name.to_string(),
        literals: literals.iter().map(|l| l.to_string()).collect(),
        location: loc(),
    }
}

pub fn block(body: Vec<Stmt>) -> Stmt {
    Stmt::Block {
        body,
        location: loc(),
    }
}

pub fn if_stmt(condition: Expr, then_branch: Vec<Stmt>, else_branch: Option<Vec<Stmt>>) -> Stmt {
    Stmt::If {
        condition,
        then_branch: Section::Block(then_branch),
        else_branch: else_branch.map(Section::Block),
        location: loc(),
    }
}

/// `if (cond) stmt;` without braces
pub fn if_single(condition: Expr, then_branch: Stmt) -> Stmt {
    Stmt::If {
        condition,
        then_branch: Section::Single(Box::new(then_branch)),
        else_branch: None,
        location: loc(),
    }
}

pub fn case(label: CaseLabel, body: Vec<Stmt>) -> CaseClause {
    CaseClause {
        label,
        body,
        location: loc(),
    }
}

pub fn switch(selector: Expr, cases: Vec<CaseClause>, default: Option<Vec<Stmt>>) -> Stmt {
    Stmt::Switch {
        selector,
        cases,
        default,
        location: loc(),
    }
}

pub fn while_loop(condition: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While {
        condition,
        body: Section::Block(body),
        location: loc(),
    }
}

pub fn do_while(body: Vec<Stmt>, condition: Expr) -> Stmt {
    Stmt::DoWhile {
        body: Section::Block(body),
        condition,
        location: loc(),
    }
}

pub fn for_loop(
    init: Option<ForInit>,
    condition: Option<Expr>,
    post: Vec<Expr>,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::For {
        init,
        condition,
        post,
        body: Section::Block(body),
        location: loc(),
    }
}

/// `for (int name = start; name < end; name++) { body }`
pub fn counting_loop(name: &str, start: i32, end: i32, body: Vec<Stmt>) -> Stmt {
    for_loop(
        Some(ForInit::Declaration {
            var_type: TypeName::Int,
            declarators: vec![Declarator {
                name: name.to_string(),
                init: Some(int(start)),
            }],
        }),
        Some(binary(BinOp::Lt, ident(name), int(end))),
        vec![post_inc(name)],
        body,
    )
}

pub fn for_each(var_type: TypeName, var_name: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::ForEach {
        var_type,
        var_name: var_name.to_string(),
        iterable,
        body: Section::Block(body),
        location: loc(),
    }
}

pub fn catch(exception_type: &str, name: &str, body: Vec<Stmt>) -> CatchClause {
    CatchClause {
        exception_type: TypeName::named(exception_type),
        name: name.to_string(),
        body,
        location: loc(),
    }
}

pub fn try_stmt(body: Vec<Stmt>, catches: Vec<CatchClause>, finally: Option<Vec<Stmt>>) -> Stmt {
    Stmt::Try {
        body,
        catches,
        finally,
        location: loc(),
    }
}

pub fn throw(expr: Expr) -> Stmt {
    Stmt::Throw {
        expr,
        location: loc(),
    }
}

/// `throw new <class>("<message>");`
pub fn throw_new(class: &str, message: &str) -> Stmt {
    throw(new_object(TypeName::named(class), vec![string(message)]))
}

pub fn break_stmt() -> Stmt {
    Stmt::Break { location: loc() }
}

pub fn continue_stmt() -> Stmt {
    Stmt::Continue { location: loc() }
}

pub fn return_stmt(expr: Option<Expr>) -> Stmt {
    Stmt::Return {
        expr,
        location: loc(),
    }
}

pub fn sync(lock: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Sync {
        lock,
        body,
        location: loc(),
    }
}
