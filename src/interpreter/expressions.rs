//! Expression evaluation implementation
//!
//! This module handles evaluation of all expression types, including:
//!
//! - Literals, variables and `typeof(T)`
//! - Binary operators (arithmetic, comparison, logical, string concatenation)
//! - Unary operators (negation, not, pre/post increment/decrement)
//! - Assignment and compound assignment to variables, array/list elements and fields
//! - Function calls, method calls and object construction
//! - Array literals and enum constants
//!
//! # Safety
//!
//! All arithmetic uses checked math; overflow and division by zero raise
//! `System.ArithmeticException` instead of panicking.

use crate::interpreter::builtins::KnownException;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::Type;
use crate::memory::heap::ObjectData;
use crate::memory::value::{EnumValue, ObjRef, Value};
use crate::syntax::ast::*;

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal, _) => Ok(match literal {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(n) => Value::Int(*n),
                Literal::Char(c) => Value::Char(*c),
                Literal::Str(s) => Value::Str(s.clone()),
            }),

            Expr::Ident(name, _) => self.read_variable(name),

            Expr::Binary {
                op, left, right, ..
            } => self.evaluate_binary_op(*op, left, right),

            Expr::Unary { op, operand, .. } => self.evaluate_unary_op(*op, operand),

            Expr::Assign { target, value, .. } => {
                let value = self.evaluate_expr(value)?;
                self.assign_to_lvalue(target, value)
            }

            Expr::CompoundAssign {
                op, target, value, ..
            } => {
                let current = self.evaluate_expr(target)?;
                let operand = self.evaluate_expr(value)?;
                let result = self.arithmetic(*op, &current, &operand)?;
                self.assign_to_lvalue(target, result)
            }

            Expr::Call {
                name,
                args,
                location,
            } => {
                let callee = self.read_variable(name)?;
                let Value::Function(id) = callee else {
                    return Err(self.raise_known(
                        KnownException::RuntimeCheck,
                        format!("'{}' is not a function.", name),
                    ));
                };
                let args = self.evaluate_args(args)?;
                self.invoke_function(id, args, *location)
            }

            Expr::MethodCall {
                receiver,
                method,
                args,
                ..
            } => {
                let receiver = self.evaluate_expr(receiver)?;
                let args = self.evaluate_args(args)?;
                self.invoke_method(receiver, method, args)
            }

            Expr::New {
                type_name, args, ..
            } => {
                let ty = self.resolve_type(type_name)?;
                self.check_visibility(&ty)?;
                let Type::Class(class_id) = ty else {
                    return Err(self.raise_known(
                        KnownException::RuntimeCheck,
                        format!("Type '{}' cannot be instantiated.", type_name),
                    ));
                };
                let args = self.evaluate_args(args)?;
                self.construct_object(class_id, args)
            }

            Expr::Member { object, member, .. } => {
                let object = self.evaluate_expr(object)?;
                self.read_member(object, member)
            }

            Expr::Index { target, index, .. } => {
                let target = self.evaluate_expr(target)?;
                let index = self.evaluate_expr(index)?;
                self.read_index(target, index)
            }

            Expr::ArrayLiteral {
                element_type,
                items,
                ..
            } => {
                let element_type = self.resolve_type(element_type)?;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.evaluate_expr(item)?;
                    values.push(self.convert_for_slot(value, &element_type, "array element")?);
                }
                let obj = self.heap.allocate(
                    Type::Array(Box::new(element_type.clone())),
                    ObjectData::Array {
                        element_type,
                        items: values,
                    },
                );
                Ok(Value::Object(obj))
            }

            Expr::TypeOf(type_name, _) => Ok(Value::Type(self.resolve_type(type_name)?)),

            Expr::EnumConst {
                type_name, literal, ..
            } => {
                let ty = self.resolve_type(type_name)?;
                let ordinal = match ty {
                    Type::Enum(id) => self
                        .types
                        .enum_info(id)
                        .and_then(|e| e.literals.iter().position(|l| l == literal))
                        .map(|ordinal| (id, ordinal)),
                    _ => None,
                };
                match ordinal {
                    Some((enum_id, ordinal)) => Ok(Value::Enum(EnumValue {
                        enum_id,
                        ordinal,
                        literal: literal.clone(),
                    })),
                    None => Err(self.raise_known(
                        KnownException::UndefinedSymbol,
                        format!("'{}' has no constant '{}'.", type_name, literal),
                    )),
                }
            }
        }
    }

    fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate_expr(arg)).collect()
    }

    pub(crate) fn read_variable(&mut self, name: &str) -> Result<Value, RuntimeError> {
        match self.scopes.lookup(name) {
            Some(var) => Ok(var.value.clone()),
            None => Err(self.raise_known(
                KnownException::UndefinedSymbol,
                format!("Variable '{}' is not defined.", name),
            )),
        }
    }

    /// Store into a declared variable, converting to its type
    pub(crate) fn assign_variable(&mut self, name: &str, value: Value) -> Result<Value, RuntimeError> {
        let Some(var_type) = self.scopes.lookup(name).map(|v| v.var_type.clone()) else {
            return Err(self.raise_known(
                KnownException::UndefinedSymbol,
                format!("Variable '{}' is not defined.", name),
            ));
        };
        let converted = self.convert_for_slot(value, &var_type, name)?;
        if let Some(var) = self.scopes.lookup_mut(name) {
            var.value = converted.clone();
        }
        Ok(converted)
    }

    fn assign_to_lvalue(&mut self, target: &Expr, value: Value) -> Result<Value, RuntimeError> {
        match target {
            Expr::Ident(name, _) => self.assign_variable(name, value),
            Expr::Index { target, index, .. } => {
                let container = self.evaluate_expr(target)?;
                let index = self.evaluate_expr(index)?;
                self.write_index(container, index, value)
            }
            Expr::Member { object, member, .. } => {
                let object = self.evaluate_expr(object)?;
                self.write_member(object, member, value)
            }
            _ => Err(self.raise_known(
                KnownException::RuntimeCheck,
                "The left side of an assignment must be a variable, element or field.",
            )),
        }
    }

    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        use BinOp::*;

        if let And | Or = op {
            let left_val = self.evaluate_bool_operand(left)?;
            // Short-circuit
            if (op == And && !left_val) || (op == Or && left_val) {
                return Ok(Value::Bool(left_val));
            }
            return Ok(Value::Bool(self.evaluate_bool_operand(right)?));
        }

        let left_val = self.evaluate_expr(left)?;
        let right_val = self.evaluate_expr(right)?;
        match op {
            Eq => Ok(Value::Bool(left_val.script_eq(&right_val))),
            Ne => Ok(Value::Bool(!left_val.script_eq(&right_val))),
            Lt => self.compare_values(&left_val, &right_val, |a, b| a < b),
            Le => self.compare_values(&left_val, &right_val, |a, b| a <= b),
            Gt => self.compare_values(&left_val, &right_val, |a, b| a > b),
            Ge => self.compare_values(&left_val, &right_val, |a, b| a >= b),
            _ => self.arithmetic(op, &left_val, &right_val),
        }
    }

    fn evaluate_bool_operand(&mut self, expr: &Expr) -> Result<bool, RuntimeError> {
        match self.evaluate_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.type_mismatch("bool", &other)),
        }
    }

    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &Expr,
    ) -> Result<Value, RuntimeError> {
        let value = self.evaluate_expr(operand)?;
        match op {
            UnOp::Neg => match value {
                Value::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(|| {
                    self.raise_known(KnownException::Arithmetic, format!("Overflow in -({})", n))
                }),
                other => Err(self.type_mismatch("int", &other)),
            },
            UnOp::Not => match value {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(self.type_mismatch("bool", &other)),
            },
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                let step = if matches!(op, UnOp::PreInc | UnOp::PostInc) {
                    BinOp::Add
                } else {
                    BinOp::Sub
                };
                let updated = match &value {
                    Value::Char(c) => {
                        let code = self.arithmetic(step, &Value::Int(*c as i32), &Value::Int(1))?;
                        match code.as_int().and_then(|n| u32::try_from(n).ok()).and_then(char::from_u32) {
                            Some(ch) => Value::Char(ch),
                            None => {
                                return Err(self.raise_known(
                                    KnownException::Arithmetic,
                                    "Character out of range.",
                                ))
                            }
                        }
                    }
                    _ => self.arithmetic(step, &value, &Value::Int(1))?,
                };
                self.assign_to_lvalue(operand, updated.clone())?;
                if matches!(op, UnOp::PreInc | UnOp::PreDec) {
                    Ok(updated)
                } else {
                    Ok(value)
                }
            }
        }
    }

    /// `+ - * / %`; `+` concatenates when either side is a string
    pub(crate) fn arithmetic(
        &mut self,
        op: BinOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        if op == BinOp::Add {
            if let (Value::Str(_), _) | (_, Value::Str(_)) = (left, right) {
                if left.is_void() || right.is_void() {
                    return Err(self.type_mismatch("string", &Value::Void));
                }
                return Ok(Value::Str(format!("{}{}", left, right)));
            }
        }
        let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
            let offender = if left.as_int().is_none() { left } else { right };
            return Err(self.type_mismatch("int", offender));
        };
        let result = match op {
            BinOp::Add => a.checked_add(b),
            BinOp::Sub => a.checked_sub(b),
            BinOp::Mul => a.checked_mul(b),
            BinOp::Div | BinOp::Mod if b == 0 => {
                return Err(self.raise_known(KnownException::Arithmetic, "Division by zero."))
            }
            BinOp::Div => a.checked_div(b),
            BinOp::Mod => a.checked_rem(b),
            _ => {
                return Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    format!("{:?} is not an arithmetic operator.", op),
                ))
            }
        };
        result.map(Value::Int).ok_or_else(|| {
            self.raise_known(
                KnownException::Arithmetic,
                format!("Integer overflow in {} {:?} {}", a, op, b),
            )
        })
    }

    #[inline]
    pub(crate) fn compare_values<F>(
        &mut self,
        left: &Value,
        right: &Value,
        cmp: F,
    ) -> Result<Value, RuntimeError>
    where
        F: Fn(i32, i32) -> bool,
    {
        match (left.as_int(), right.as_int()) {
            (Some(a), Some(b)) => Ok(Value::Bool(cmp(a, b))),
            (None, _) => Err(self.type_mismatch("int", left)),
            (_, None) => Err(self.type_mismatch("int", right)),
        }
    }

    fn type_mismatch(&mut self, expected: &str, found: &Value) -> RuntimeError {
        let found = self.types.type_name(&self.runtime_type(found));
        self.raise_known(
            KnownException::TypeIncompatible,
            format!("Expected a value of type '{}' but found '{}'.", expected, found),
        )
    }

    /// Method call on an evaluated receiver
    pub(crate) fn invoke_method(
        &mut self,
        receiver: Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match receiver {
            Value::Object(obj) => self.call_native_method(obj, method, args),
            Value::Null => Err(self.raise_known(
                KnownException::NullReference,
                format!("Cannot call '{}' on null.", method),
            )),
            Value::Str(s) if method == "length" && args.is_empty() => {
                Ok(Value::Int(s.chars().count() as i32))
            }
            other => {
                let type_name = self.types.type_name(&self.runtime_type(&other));
                Err(self.raise_known(
                    KnownException::UndefinedSymbol,
                    format!("Type '{}' has no method '{}'.", type_name, method),
                ))
            }
        }
    }

    fn read_member(&mut self, object: Value, member: &str) -> Result<Value, RuntimeError> {
        let obj = match object {
            Value::Object(obj) => obj,
            Value::Null => {
                return Err(self.raise_known(
                    KnownException::NullReference,
                    format!("Cannot read '{}' of null.", member),
                ))
            }
            Value::Str(s) if member == "length" => return Ok(Value::Int(s.chars().count() as i32)),
            other => {
                let type_name = self.types.type_name(&self.runtime_type(&other));
                return Err(self.raise_known(
                    KnownException::UndefinedSymbol,
                    format!("Type '{}' has no member '{}'.", type_name, member),
                ));
            }
        };
        let found = match (self.heap.get(obj).map(|o| &o.data), member) {
            (Some(ObjectData::Array { items, .. }), "length") => Some(Value::Int(items.len() as i32)),
            (Some(ObjectData::Exception { message }), "message") => Some(Value::Str(message.clone())),
            (Some(ObjectData::Plain { fields }), _) => fields.get(member).cloned(),
            _ => None,
        };
        match found {
            Some(value) => Ok(value),
            None => Err(self.no_member(obj, member)),
        }
    }

    fn write_member(
        &mut self,
        object: Value,
        member: &str,
        value: Value,
    ) -> Result<Value, RuntimeError> {
        let obj = match object {
            Value::Object(obj) => obj,
            Value::Null => {
                return Err(self.raise_known(
                    KnownException::NullReference,
                    format!("Cannot write '{}' of null.", member),
                ))
            }
            _ => {
                return Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    format!("Cannot write member '{}' of a non-object.", member),
                ))
            }
        };
        if value.is_void() {
            return Err(self.type_mismatch("a value", &value));
        }
        match self.heap.get_mut(obj).map(|o| &mut o.data) {
            Some(ObjectData::Plain { fields }) => {
                fields.insert(member.to_string(), value.clone());
                Ok(value)
            }
            _ => Err(self.no_member(obj, member)),
        }
    }

    fn no_member(&mut self, obj: ObjRef, member: &str) -> RuntimeError {
        let type_name = self.types.type_name(&self.runtime_type(&Value::Object(obj)));
        self.raise_known(
            KnownException::UndefinedSymbol,
            format!("Type '{}' has no member '{}'.", type_name, member),
        )
    }

    fn element_index(&mut self, index: &Value, len: usize) -> Result<usize, RuntimeError> {
        match index {
            Value::Int(i) if *i >= 0 && (*i as usize) < len => Ok(*i as usize),
            Value::Int(i) => Err(self.raise_known(
                KnownException::ArrayOutOfRange,
                format!("Index {} is out of range for length {}.", i, len),
            )),
            other => Err(self.type_mismatch("int", other)),
        }
    }

    fn read_index(&mut self, target: Value, index: Value) -> Result<Value, RuntimeError> {
        let obj = match target {
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = self.element_index(&index, chars.len())?;
                return Ok(Value::Char(chars[i]));
            }
            Value::Object(obj) => obj,
            Value::Null => {
                return Err(self.raise_known(KnownException::NullReference, "Cannot index null."))
            }
            other => return Err(self.type_mismatch("array", &other)),
        };
        if self.heap.list(obj).is_some() {
            return self.call_native_method(obj, "get", vec![index]);
        }
        let items = match self.heap.get(obj).map(|o| &o.data) {
            Some(ObjectData::Array { items, .. }) => items.len(),
            _ => return Err(self.type_mismatch("array", &Value::Object(obj))),
        };
        let i = self.element_index(&index, items)?;
        match self.heap.get(obj).map(|o| &o.data) {
            Some(ObjectData::Array { items, .. }) => Ok(items[i].clone()),
            _ => Err(self.type_mismatch("array", &Value::Object(obj))),
        }
    }

    fn write_index(
        &mut self,
        target: Value,
        index: Value,
        value: Value,
    ) -> Result<Value, RuntimeError> {
        let obj = match target {
            Value::Object(obj) => obj,
            Value::Null => {
                return Err(self.raise_known(KnownException::NullReference, "Cannot index null."))
            }
            other => return Err(self.type_mismatch("array", &other)),
        };
        if self.heap.list(obj).is_some() {
            self.call_native_method(obj, "set", vec![index, value.clone()])?;
            return Ok(value);
        }
        let (len, element_type) = match self.heap.get(obj).map(|o| &o.data) {
            Some(ObjectData::Array {
                items,
                element_type,
            }) => (items.len(), element_type.clone()),
            _ => return Err(self.type_mismatch("array", &Value::Object(obj))),
        };
        let i = self.element_index(&index, len)?;
        let converted = self.convert_for_slot(value, &element_type, "array element")?;
        if let Some(ObjectData::Array { items, .. }) = self.heap.get_mut(obj).map(|o| &mut o.data) {
            items[i] = converted.clone();
        }
        Ok(converted)
    }
}
