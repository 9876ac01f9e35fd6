//! Scoped symbol table used during semantic analysis.
//!
//! The table is a stack of frames, one per lexical scope. The global frame
//! is pushed at construction and is never popped. Each symbol keeps a
//! reference to the AST node that declared it, so the table borrows the
//! program it describes.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    ast::{
        declarations::{
            FunctionDecl, MemberDecl, ObjectDecl, Parameter, TemplateParameter, UnionDecl, VarDecl,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    SourceLocation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Object,
    Actor,
    TypeAlias,
    TemplateParam,
}

/// The AST node a symbol was declared by.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Variable(&'a VarDecl),
    Parameter(&'a Parameter),
    Function(&'a FunctionDecl),
    Object(&'a ObjectDecl),
    Member(&'a MemberDecl),
    Union(&'a UnionDecl),
    TemplateParam(&'a TemplateParameter),
}

impl<'a> Declaration<'a> {
    /// Parameters of a callable declaration, used to count defaults.
    pub fn params(&self) -> Option<&'a [Parameter]> {
        match self {
            Declaration::Function(function) => Some(&function.params),
            Declaration::Member(member) => Some(&member.params),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&'a ObjectDecl> {
        match self {
            Declaration::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&'a UnionDecl> {
        match self {
            Declaration::Union(union) => Some(union),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolInfo<'a> {
    pub kind: SymbolKind,
    pub resolved_type: Type,
    pub declaration: Declaration<'a>,
    pub is_const: bool,
    pub is_static: bool,
    pub location: SourceLocation,
}

impl<'a> SymbolInfo<'a> {
    pub fn new(
        kind: SymbolKind,
        resolved_type: Type,
        declaration: Declaration<'a>,
        location: SourceLocation,
    ) -> Self {
        SymbolInfo {
            kind,
            resolved_type,
            declaration,
            is_const: false,
            is_static: false,
            location,
        }
    }

    pub fn with_modifiers(mut self, is_const: bool, is_static: bool) -> Self {
        self.is_const = is_const;
        self.is_static = is_static;
        self
    }
}

#[derive(Debug)]
pub struct SymbolTable<'a> {
    frames: Vec<HashMap<String, SymbolInfo<'a>>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        SymbolTable {
            frames: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
        trace!("enter scope, depth {}", self.frames.len());
    }

    /// Pops the innermost frame. The global frame cannot be popped.
    pub fn exit_scope(&mut self) -> Result<(), Error> {
        if self.frames.len() <= 1 {
            return Err(Error::new(ErrorImpl::ScopeUnderflow, SourceLocation::null()));
        }

        self.frames.pop();
        trace!("exit scope, depth {}", self.frames.len());
        Ok(())
    }

    /// Declares `name` in the innermost frame. A name already declared in
    /// that frame keeps its first declaration.
    pub fn declare(&mut self, name: &str, info: SymbolInfo<'a>) -> Result<(), Error> {
        let depth = self.frames.len();
        let Some(frame) = self.frames.last_mut() else {
            return Err(Error::new(ErrorImpl::ScopeUnderflow, info.location));
        };

        if let Some(previous) = frame.get(name) {
            return Err(Error::new(
                ErrorImpl::Redeclaration {
                    name: String::from(name),
                    previous_line: previous.location.line,
                },
                info.location,
            ));
        }

        trace!("declare {} as {:?} at depth {}", name, info.kind, depth);
        frame.insert(String::from(name), info);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo<'a>> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Like `lookup`, but skips symbols of any other kind.
    pub fn lookup_kind(&self, name: &str, kind: SymbolKind) -> Option<&SymbolInfo<'a>> {
        self.frames
            .iter()
            .rev()
            .filter_map(|frame| frame.get(name))
            .find(|info| info.kind == kind)
    }

    pub fn lookup_current_scope(&self, name: &str) -> Option<&SymbolInfo<'a>> {
        self.frames.last().and_then(|frame| frame.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames from outermost to innermost, symbols sorted by name.
    ///
    /// ```text
    /// Scope 0
    ///   a: Variable int [const]
    ///   main: Function () -> void
    /// ```
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();

        for (index, frame) in self.frames.iter().enumerate() {
            out.push_str(&format!("Scope {}\n", index));

            let mut names: Vec<&String> = frame.keys().collect();
            names.sort();

            for name in names {
                let info = &frame[name];
                out.push_str(&format!("  {}: {:?} {}", name, info.kind, info.resolved_type));
                if info.is_const {
                    out.push_str(" [const]");
                }
                if info.is_static {
                    out.push_str(" [static]");
                }
                out.push('\n');
            }
        }

        out
    }
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}
