use crate::{
    ast, builtin,
    environment::{Env, Environment},
    object::{Function, Hash, HashPair, Object, ObjectType},
};
use std::rc::Rc;

type Result<T = Object> = std::result::Result<T, Error>;

/// Provides the context to evaluate a program in.
pub trait Context {
    /// Emit a line of program output.
    fn puts(&mut self, line: &str);
}

/// Writes program output to standard out.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Context for Stdout {
    fn puts(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects program output.
#[derive(Debug, Default, Clone)]
pub struct Captured {
    pub lines: Vec<String>,
}

impl Context for Captured {
    fn puts(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Runtime error.
/// Aborts evaluation of the program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Error {
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: ObjectType,
        op: &'static str,
        right: ObjectType,
    },

    #[error("unknown operator: {op}{right}")]
    UnknownPrefixOperator { op: &'static str, right: ObjectType },

    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        op: &'static str,
        right: ObjectType,
    },

    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("not a function: {0}")]
    NotAFunction(ObjectType),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(ObjectType),

    /// Integer division with a zero divisor.
    #[error("division by zero: {0} / 0")]
    DivisionByZero(i64),

    #[error("wrong number of arguments. Got {got}, want {want}")]
    WrongArgumentCount { got: usize, want: usize },

    #[error("argument to '{builtin}' not supported. Got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: ObjectType,
    },

    #[error("argument to '{builtin}' must be ARRAY. Got {got}")]
    ArgumentNotArray {
        builtin: &'static str,
        got: ObjectType,
    },
}

/// Evaluate a program.
/// Runtime errors are returned as an [`Object::Error`].
/// An empty program evaluates to `null`.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn eval(program: &ast::Program, env: &Env, ctx: &mut dyn Context) -> Object {
    match eval_program(program, env, ctx) {
        Ok(value) => value,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(%err);

            Object::Error(err)
        }
    }
}

fn eval_program(program: &ast::Program, env: &Env, ctx: &mut dyn Context) -> Result {
    let mut result = Object::NULL;
    for stmt in program.statements.iter() {
        result = eval_statement(stmt, env, ctx)?;
        if let Object::ReturnValue(value) = result {
            return Ok(*value);
        }
    }

    Ok(result)
}

/// A `return` is passed up still wrapped so enclosing blocks stop as well.
fn eval_block(block: &ast::Block, env: &Env, ctx: &mut dyn Context) -> Result {
    let mut result = Object::NULL;
    for stmt in block.statements.iter() {
        result = eval_statement(stmt, env, ctx)?;
        if matches!(result, Object::ReturnValue(_)) {
            return Ok(result);
        }
    }

    Ok(result)
}

fn eval_statement(stmt: &ast::Stmt, env: &Env, ctx: &mut dyn Context) -> Result {
    match stmt {
        ast::Stmt::Let(stmt) => {
            let value = eval_expr(&stmt.value, env, ctx)?;
            Ok(env.borrow_mut().set(stmt.name.value.clone(), value))
        }
        ast::Stmt::Return(stmt) => {
            let value = eval_expr(&stmt.value, env, ctx)?;
            Ok(Object::ReturnValue(Box::new(value)))
        }
        ast::Stmt::Expr(stmt) => eval_expr(&stmt.expr, env, ctx),
    }
}

fn eval_expr(expr: &ast::Expr, env: &Env, ctx: &mut dyn Context) -> Result {
    match expr {
        ast::Expr::Identifier(ident) => eval_identifier(ident, env),
        ast::Expr::Literal(literal) => eval_literal(literal, env, ctx),
        ast::Expr::Prefix(expr) => {
            let right = eval_expr(&expr.right, env, ctx)?;
            eval_prefix(expr.op, right)
        }
        ast::Expr::Infix(expr) => {
            let left = eval_expr(&expr.left, env, ctx)?;
            let right = eval_expr(&expr.right, env, ctx)?;
            eval_infix(expr.op, left, right)
        }
        ast::Expr::If(expr) => {
            let condition = eval_expr(&expr.condition, env, ctx)?;
            if condition.is_truthy() {
                eval_block(&expr.consequence, env, ctx)
            } else if let Some(alternative) = &expr.alternative {
                eval_block(alternative, env, ctx)
            } else {
                Ok(Object::NULL)
            }
        }
        ast::Expr::Call(expr) => {
            let function = eval_expr(&expr.function, env, ctx)?;
            let args = eval_exprs(&expr.arguments, env, ctx)?;
            apply_function(function, args, ctx)
        }
        ast::Expr::Index(expr) => {
            let left = eval_expr(&expr.left, env, ctx)?;
            let index = eval_expr(&expr.index, env, ctx)?;
            eval_index(left, index)
        }
    }
}

/// Bindings shadow builtins.
fn eval_identifier(ident: &ast::Identifier, env: &Env) -> Result {
    if let Some(value) = env.borrow().get(&ident.value) {
        return Ok(value);
    }

    builtin::lookup(&ident.value)
        .map(Object::Builtin)
        .ok_or_else(|| Error::IdentifierNotFound(ident.value.clone()))
}

fn eval_literal(literal: &ast::ExprLiteral, env: &Env, ctx: &mut dyn Context) -> Result {
    match literal {
        ast::ExprLiteral::Integer(value) => Ok(Object::Integer(value.value)),
        ast::ExprLiteral::String(value) => Ok(Object::String(value.value.clone())),
        ast::ExprLiteral::Bool(value) => Ok(Object::from_bool(value.value)),
        ast::ExprLiteral::Function(literal) => Ok(Object::Function(Rc::new(Function {
            literal: Rc::clone(literal),
            env: Rc::clone(env),
        }))),
        ast::ExprLiteral::Array(value) => {
            let elements = eval_exprs(&value.elements, env, ctx)?;
            Ok(Object::array(elements))
        }
        ast::ExprLiteral::Hash(value) => eval_hash(value, env, ctx),
    }
}

/// Evaluate left to right, stopping at the first error.
fn eval_exprs(exprs: &[ast::Expr], env: &Env, ctx: &mut dyn Context) -> Result<Vec<Object>> {
    exprs.iter().map(|expr| eval_expr(expr, env, ctx)).collect()
}

fn eval_hash(literal: &ast::LitHash, env: &Env, ctx: &mut dyn Context) -> Result {
    let mut hash = Hash::default();
    for (key, value) in literal.pairs.iter() {
        let key = eval_expr(key, env, ctx)?;
        let Some(hash_key) = key.hash_key() else {
            return Err(Error::UnusableAsHashKey(key.kind()));
        };

        let value = eval_expr(value, env, ctx)?;
        hash.insert(hash_key, HashPair { key, value });
    }

    Ok(Object::Hash(Rc::new(hash)))
}

fn eval_prefix(op: ast::OpPrefix, right: Object) -> Result {
    match op {
        ast::OpPrefix::Not => Ok(Object::from_bool(!right.is_truthy())),
        ast::OpPrefix::Minus => match right {
            Object::Integer(value) => Ok(Object::Integer(value.wrapping_neg())),
            _ => Err(Error::UnknownPrefixOperator {
                op: op.as_str(),
                right: right.kind(),
            }),
        },
    }
}

fn eval_infix(op: ast::OpInfix, left: Object, right: Object) -> Result {
    match (&left, &right) {
        (Object::Integer(left), Object::Integer(right)) => eval_integer_infix(op, *left, *right),
        (Object::String(l), Object::String(r)) => match op {
            ast::OpInfix::Add => Ok(Object::String(format!("{l}{r}"))),
            _ => Err(Error::UnknownInfixOperator {
                left: left.kind(),
                op: op.as_str(),
                right: right.kind(),
            }),
        },
        _ if left.kind() != right.kind() => Err(Error::TypeMismatch {
            left: left.kind(),
            op: op.as_str(),
            right: right.kind(),
        }),
        _ => match op {
            ast::OpInfix::Equal => Ok(Object::from_bool(left.is_identical(&right))),
            ast::OpInfix::NotEqual => Ok(Object::from_bool(!left.is_identical(&right))),
            _ => Err(Error::UnknownInfixOperator {
                left: left.kind(),
                op: op.as_str(),
                right: right.kind(),
            }),
        },
    }
}

/// Arithmetic wraps on overflow.
fn eval_integer_infix(op: ast::OpInfix, left: i64, right: i64) -> Result {
    let value = match op {
        ast::OpInfix::Add => Object::Integer(left.wrapping_add(right)),
        ast::OpInfix::Subtract => Object::Integer(left.wrapping_sub(right)),
        ast::OpInfix::Multiply => Object::Integer(left.wrapping_mul(right)),
        ast::OpInfix::Divide => {
            if right == 0 {
                return Err(Error::DivisionByZero(left));
            }
            Object::Integer(left.wrapping_div(right))
        }
        ast::OpInfix::Less => Object::from_bool(left < right),
        ast::OpInfix::Greater => Object::from_bool(left > right),
        ast::OpInfix::Equal => Object::from_bool(left == right),
        ast::OpInfix::NotEqual => Object::from_bool(left != right),
    };

    Ok(value)
}

fn eval_index(left: Object, index: Object) -> Result {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(idx)) => Ok(usize::try_from(*idx)
            .ok()
            .and_then(|idx| elements.get(idx))
            .cloned()
            .unwrap_or(Object::NULL)),
        (Object::Hash(hash), _) => {
            let Some(key) = index.hash_key() else {
                return Err(Error::UnusableAsHashKey(index.kind()));
            };

            Ok(hash
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::NULL))
        }
        _ => Err(Error::IndexNotSupported(left.kind())),
    }
}

/// Arguments are bound to parameters positionally.
/// Extra arguments are ignored and unbound parameters are left undefined.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
fn apply_function(function: Object, args: Vec<Object>, ctx: &mut dyn Context) -> Result {
    match function {
        Object::Function(function) => {
            #[cfg(feature = "tracing")]
            tracing::trace!(function = %function, args = args.len());

            let env = Environment::enclosed(Rc::clone(&function.env));
            {
                let mut scope = env.borrow_mut();
                for (param, arg) in function.parameters().iter().zip(args) {
                    scope.set(param.value.clone(), arg);
                }
            }

            match eval_block(function.body(), &env, ctx)? {
                Object::ReturnValue(value) => Ok(*value),
                value => Ok(value),
            }
        }
        Object::Builtin(builtin) => {
            #[cfg(feature = "tracing")]
            tracing::trace!(builtin = builtin.name, args = args.len());

            builtin.call(&args, ctx)
        }
        other => Err(Error::NotAFunction(other.kind())),
    }
}
