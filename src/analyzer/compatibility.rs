//! Type resolution and the structural compatibility relation.
//!
//! `compatible(target, value)` answers whether a value of type `value` may
//! be stored where `target` is expected. The relation is directional:
//! numeric widening and object inheritance only go one way.

use std::collections::HashSet;

use crate::{
    ast::types::{ArrayType, FunctionType, PrimitiveKind, TemplateType, Type},
    errors::errors::{Error, ErrorImpl},
};

use super::symbol_table::{SymbolKind, SymbolTable};

/// Nesting limit for unions of unions and for base-class chains.
const MAX_DEPTH: usize = 32;

pub fn compatible(table: &SymbolTable, target: &Type, value: &Type) -> bool {
    compatible_at(table, target, value, 0, &mut HashSet::new())
}

/// `unions` holds the unions already expanded against this `value`. A union
/// reached a second time cannot accept anything new, so it answers false.
fn compatible_at(
    table: &SymbolTable,
    target: &Type,
    value: &Type,
    depth: usize,
    unions: &mut HashSet<String>,
) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }

    if target.is_dynamic() || value.is_dynamic() {
        return true;
    }
    if target.is_error() || value.is_error() {
        return false;
    }

    match (target, value) {
        (Type::Primitive(target), Type::Primitive(value)) => {
            target.kind == value.kind || widens(value.kind, target.kind)
        }
        (Type::Named(target), Type::Named(value)) => {
            target.name == value.name
                || derives_from(table, &value.name, &target.name)
                || union_accepts(table, &target.name, &Type::Named(value.clone()), depth, unions)
        }
        (Type::Array(target), Type::Array(value)) => compatible_at(
            table,
            &target.element,
            &value.element,
            depth + 1,
            &mut HashSet::new(),
        ),
        (Type::Function(target), Type::Function(value)) => {
            functions_compatible(table, target, value, depth)
        }
        (Type::Template(target), Type::Template(value)) => {
            templates_compatible(table, target, value, depth)
        }
        (Type::Named(_), Type::Primitive(primitive)) if primitive.kind == PrimitiveKind::Nil => true,
        (Type::Named(target), value) => union_accepts(table, &target.name, value, depth, unions),
        _ => false,
    }
}

/// Implicit one-way numeric promotions.
pub fn widens(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;

    matches!(
        (from, to),
        (Byte | Short, Int) | (Int | Short | Byte, Long) | (Int, Float) | (Int | Float, Double)
    )
}

/// Walks the single-inheritance chain of `derived` looking for `base`.
pub fn derives_from(table: &SymbolTable, derived: &str, base: &str) -> bool {
    let mut current = String::from(derived);

    for _ in 0..MAX_DEPTH {
        let Some(object) = table
            .lookup(&current)
            .and_then(|info| info.declaration.as_object())
        else {
            return false;
        };

        match &object.base_name {
            Some(parent) if parent == base => return true,
            Some(parent) => current = parent.clone(),
            None => return false,
        }
    }

    false
}

fn union_accepts(
    table: &SymbolTable,
    union_name: &str,
    value: &Type,
    depth: usize,
    unions: &mut HashSet<String>,
) -> bool {
    let Some(union) = table
        .lookup(union_name)
        .and_then(|info| info.declaration.as_union())
    else {
        return false;
    };

    if !unions.insert(String::from(union_name)) {
        return false;
    }

    union.member_types.iter().any(|member| {
        let member = resolve_quiet(table, member);
        compatible_at(table, &member, value, depth + 1, unions)
    })
}

/// True when `union_name` lists itself, directly or through other unions.
pub fn union_contains_itself(table: &SymbolTable, union_name: &str) -> bool {
    let mut pending = vec![String::from(union_name)];
    let mut seen = HashSet::new();

    while let Some(name) = pending.pop() {
        let Some(union) = table
            .lookup(&name)
            .and_then(|info| info.declaration.as_union())
        else {
            continue;
        };

        for member in &union.member_types {
            let Type::Named(member) = member else {
                continue;
            };
            if member.name == union_name {
                return true;
            }
            if seen.insert(member.name.clone()) {
                pending.push(member.name.clone());
            }
        }
    }

    false
}

fn functions_compatible(
    table: &SymbolTable,
    target: &FunctionType,
    value: &FunctionType,
    depth: usize,
) -> bool {
    let target_return = return_type_or_void(target);
    let value_return = return_type_or_void(value);

    compatible_at(table, &target_return, &value_return, depth + 1, &mut HashSet::new())
        && target.params.len() == value.params.len()
        && target
            .params
            .iter()
            .zip(&value.params)
            .all(|(target, value)| compatible_at(table, target, value, depth + 1, &mut HashSet::new()))
}

fn templates_compatible(
    table: &SymbolTable,
    target: &TemplateType,
    value: &TemplateType,
    depth: usize,
) -> bool {
    target.base == value.base
        && target.args.len() == value.args.len()
        && target
            .args
            .iter()
            .zip(&value.args)
            .all(|(target, value)| compatible_at(table, target, value, depth + 1, &mut HashSet::new()))
}

/// Declared return type of a signature; an absent one is `void`.
pub fn return_type_or_void(function: &FunctionType) -> Type {
    match &function.return_type {
        Some(return_type) => (**return_type).clone(),
        None => Type::primitive(PrimitiveKind::Void, function.location.clone()),
    }
}

/// Resolves named types against the table, building a fresh type value.
///
/// Unknown names and names that are not types push an error and resolve to
/// the error type. Template parameters resolve to `dynamic`.
pub fn resolve_type(table: &SymbolTable, ty: &Type, errors: &mut Vec<Error>) -> Type {
    match ty {
        Type::Primitive(_) | Type::Dynamic(_) | Type::Error(_) => ty.clone(),
        Type::Named(named) => resolve_name(table, &named.name, ty, errors),
        Type::Array(array) => Type::Array(ArrayType {
            element: Box::new(resolve_type(table, &array.element, errors)),
            size: array.size.clone(),
            location: array.location.clone(),
        }),
        Type::Function(function) => Type::Function(FunctionType {
            params: function
                .params
                .iter()
                .map(|param| resolve_type(table, param, errors))
                .collect(),
            return_type: function
                .return_type
                .as_ref()
                .map(|return_type| Box::new(resolve_type(table, return_type, errors))),
            location: function.location.clone(),
        }),
        Type::Template(template) => {
            let base = resolve_name(table, &template.base, ty, errors);
            let args = template
                .args
                .iter()
                .map(|arg| resolve_type(table, arg, errors))
                .collect();

            match base {
                Type::Named(_) => Type::Template(TemplateType {
                    base: template.base.clone(),
                    args,
                    location: template.location.clone(),
                }),
                other => other,
            }
        }
    }
}

/// `resolve_type` without diagnostics, for types already checked where
/// they were declared.
pub fn resolve_quiet(table: &SymbolTable, ty: &Type) -> Type {
    let mut ignored = vec![];
    resolve_type(table, ty, &mut ignored)
}

fn resolve_name(table: &SymbolTable, name: &str, ty: &Type, errors: &mut Vec<Error>) -> Type {
    let location = ty.location().clone();

    let Some(info) = table.lookup(name) else {
        errors.push(Error::new(
            ErrorImpl::UnknownType {
                type_: String::from(name),
            },
            location.clone(),
        ));
        return Type::Error(location);
    };

    match info.kind {
        SymbolKind::TemplateParam => Type::Dynamic(location),
        SymbolKind::Object | SymbolKind::Actor | SymbolKind::TypeAlias => {
            Type::named(name, location)
        }
        SymbolKind::Variable | SymbolKind::Function => {
            errors.push(Error::new(
                ErrorImpl::NotAType {
                    name: String::from(name),
                },
                location.clone(),
            ));
            Type::Error(location)
        }
    }
}
