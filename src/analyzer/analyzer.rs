//! The semantic analysis pass.
//!
//! A single forward walk over the program. Module-level types are declared
//! first, then module-level function signatures, so bodies may refer to
//! anything declared at module scope. Everything else must be declared
//! before use. Failed checks are reported and replaced by the error type,
//! which later checks treat as already diagnosed.

use tracing::debug;

use crate::{
    ast::{
        ast::{Program, Stmt},
        declarations::{
            FieldInitializer, FunctionDecl, MemberDecl, MemberKind, ObjectDecl, ObjectKind,
            OperatorOverload, Parameter, TemplateDecl, TemplateDefault, TemplateParameter,
            TemplateParameterKind, UnionDecl, VarDecl, VarDeclKind,
        },
        expressions::{
            ArrayAccessExpr, BinaryExpr, BinaryOperator, CallExpr, Expr, LambdaExpr, LiteralExpr,
            LiteralKind, MemberAccessExpr, NewExpr, StructInitializerExpr, TemplatePart, UnaryExpr,
            UnaryOperator, VarExpr,
        },
        statements::{BlockStmt, ReturnStmt},
        types::{PrimitiveKind, Type},
    },
    errors::{
        diagnostics::Diagnostic,
        errors::{Error, ErrorImpl},
    },
    SourceLocation,
};

use super::{
    compatibility::{
        compatible, derives_from, resolve_quiet, resolve_type, return_type_or_void,
        union_contains_itself,
    },
    symbol_table::{Declaration, SymbolInfo, SymbolKind, SymbolTable},
};

/// Limit on base-class chains walked during member lookup.
const MAX_BASE_DEPTH: usize = 32;

/// Analyzes `program`, returning its global scope and every diagnostic found.
pub fn analyze(program: &Program) -> (SymbolTable<'_>, Vec<Diagnostic>) {
    let mut analyzer = Analyzer::new();

    analyzer.predeclare(&program.declarations);
    for stmt in &program.declarations {
        analyzer.visit_top_level(stmt);
    }

    debug!(
        "analyzed {} declarations, {} diagnostics",
        program.declarations.len(),
        analyzer.diagnostics.len()
    );

    (analyzer.table, analyzer.diagnostics)
}

struct Analyzer<'a> {
    table: SymbolTable<'a>,
    diagnostics: Vec<Diagnostic>,
    /// Expected return type of each enclosing function, innermost last.
    return_types: Vec<Type>,
    /// Enclosing object bodies, innermost last.
    objects: Vec<&'a ObjectDecl>,
}

impl<'a> Analyzer<'a> {
    fn new() -> Self {
        Analyzer {
            table: SymbolTable::new(),
            diagnostics: vec![],
            return_types: vec![],
            objects: vec![],
        }
    }

    fn report(&mut self, error: Error) {
        self.diagnostics.push(Diagnostic::from(error));
    }

    fn error(&mut self, kind: ErrorImpl, location: &SourceLocation) {
        self.report(Error::new(kind, location.clone()));
    }

    fn declare(&mut self, name: &str, info: SymbolInfo<'a>) {
        if let Err(error) = self.table.declare(name, info) {
            self.report(error);
        }
    }

    fn enter_scope(&mut self) {
        self.table.enter_scope();
    }

    fn exit_scope(&mut self) {
        if let Err(error) = self.table.exit_scope() {
            self.report(error);
        }
    }

    fn resolve(&mut self, ty: &Type) -> Type {
        let mut errors = vec![];
        let resolved = resolve_type(&self.table, ty, &mut errors);
        for error in errors {
            self.report(error);
        }
        resolved
    }

    /// Resolves a type that was already checked where it was declared.
    /// Names no longer in scope, such as template parameters, become dynamic.
    fn resolve_known(&self, ty: &Type) -> Type {
        match resolve_quiet(&self.table, ty) {
            Type::Error(location) => Type::Dynamic(location),
            resolved => resolved,
        }
    }

    /// True when both types are valid and incompatible. Error types were
    /// reported where they came from, so they never mismatch again.
    fn is_mismatch(&self, target: &Type, value: &Type) -> bool {
        !target.is_error() && !value.is_error() && !compatible(&self.table, target, value)
    }

    fn signature(
        &mut self,
        params: &[Parameter],
        return_type: Option<&Type>,
        report: bool,
    ) -> (Vec<Type>, Option<Type>) {
        let mut errors = vec![];

        let param_types = params
            .iter()
            .map(|param| match &param.param_type {
                Some(ty) => resolve_type(&self.table, ty, &mut errors),
                None => Type::Dynamic(param.location.clone()),
            })
            .collect();
        let return_type = return_type.map(|ty| resolve_type(&self.table, ty, &mut errors));

        if report {
            for error in errors {
                self.report(error);
            }
        }

        (param_types, return_type)
    }

    // Declarations

    fn predeclare(&mut self, declarations: &'a [Stmt]) {
        for stmt in declarations {
            self.predeclare_type(stmt);
        }
        for stmt in declarations {
            self.predeclare_function(stmt);
        }
    }

    fn predeclare_type(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::ObjectDecl(object) => self.declare_object(object),
            Stmt::UnionDecl(union) => self.declare_union(union),
            Stmt::TemplateDecl(template) => self.predeclare_type(&template.inner),
            _ => {}
        }
    }

    fn predeclare_function(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::FunctionDecl(function) => {
                let (params, return_type) =
                    self.signature(&function.params, function.return_type.as_ref(), false);
                self.declare_function(function, params, return_type);
            }
            Stmt::TemplateDecl(template) => {
                if let Stmt::FunctionDecl(function) = &*template.inner {
                    self.enter_scope();
                    self.declare_template_params(&template.params, false);
                    let (params, return_type) =
                        self.signature(&function.params, function.return_type.as_ref(), false);
                    self.exit_scope();
                    self.declare_function(function, params, return_type);
                }
            }
            _ => {}
        }
    }

    fn declare_function(
        &mut self,
        function: &'a FunctionDecl,
        params: Vec<Type>,
        return_type: Option<Type>,
    ) {
        let function_type = Type::function(params, return_type, function.location.clone());
        self.declare(
            &function.name,
            SymbolInfo::new(
                SymbolKind::Function,
                function_type,
                Declaration::Function(function),
                function.location.clone(),
            ),
        );
    }

    fn declare_object(&mut self, object: &'a ObjectDecl) {
        let kind = match object.kind {
            ObjectKind::Actor => SymbolKind::Actor,
            ObjectKind::Class | ObjectKind::Struct => SymbolKind::Object,
        };

        self.declare(
            &object.name,
            SymbolInfo::new(
                kind,
                Type::named(&object.name, object.location.clone()),
                Declaration::Object(object),
                object.location.clone(),
            ),
        );
    }

    fn declare_union(&mut self, union: &'a UnionDecl) {
        self.declare(
            &union.name,
            SymbolInfo::new(
                SymbolKind::TypeAlias,
                Type::named(&union.name, union.location.clone()),
                Declaration::Union(union),
                union.location.clone(),
            ),
        );
    }

    fn declare_template_params(&mut self, params: &'a [TemplateParameter], check: bool) {
        for param in params {
            let param_type = match (param.kind, &param.param_type) {
                (TemplateParameterKind::NonType, Some(ty)) if check => self.resolve(ty),
                (TemplateParameterKind::NonType, Some(ty)) => self.resolve_known(ty),
                _ => Type::Dynamic(param.location.clone()),
            };

            if check {
                match &param.default {
                    Some(TemplateDefault::Value(value)) => {
                        let value_type = self.visit_expr(value);
                        if self.is_mismatch(&param_type, &value_type) {
                            self.error(
                                ErrorImpl::DefaultValueTypeMismatch {
                                    parameter: param.name.clone(),
                                    expected: param_type.to_string(),
                                    received: value_type.to_string(),
                                },
                                value.location(),
                            );
                        }
                    }
                    Some(TemplateDefault::Type(default)) => {
                        self.resolve(default);
                    }
                    None => {}
                }
            }

            let info = SymbolInfo::new(
                SymbolKind::TemplateParam,
                param_type,
                Declaration::TemplateParam(param),
                param.location.clone(),
            );
            if check {
                self.declare(&param.name, info);
            } else {
                self.table.declare(&param.name, info).ok();
            }
        }
    }

    fn visit_top_level(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::FunctionDecl(function) => self.visit_function_decl(function, false),
            Stmt::ObjectDecl(object) => self.visit_object(object, false),
            Stmt::UnionDecl(union) => self.visit_union(union, false),
            Stmt::TemplateDecl(template) => self.visit_template(template, true),
            other => self.visit_stmt(other),
        }
    }

    fn visit_var_decl(&mut self, var: &'a VarDecl) {
        let declared = var.var_type.as_ref().map(|ty| self.resolve(ty));
        let initialized = var
            .initializer
            .as_ref()
            .map(|initializer| self.visit_initializer(initializer, declared.as_ref()));

        let final_type = match var.kind {
            VarDeclKind::Dynamic => {
                if let Some(declared) = &declared {
                    if !declared.is_dynamic() && !declared.is_error() {
                        self.error(
                            ErrorImpl::DynamicTypeConflict {
                                name: var.name.clone(),
                                type_: declared.to_string(),
                            },
                            declared.location(),
                        );
                    }
                }
                Type::Dynamic(var.location.clone())
            }
            VarDeclKind::Static | VarDeclKind::ClassInit => match (declared, initialized) {
                (Some(declared), Some(initialized)) => {
                    if self.is_mismatch(&declared, &initialized) {
                        let location = var
                            .initializer
                            .as_ref()
                            .map_or(&var.location, |initializer| initializer.location());
                        self.error(
                            ErrorImpl::InitializerTypeMismatch {
                                expected: declared.to_string(),
                                received: initialized.to_string(),
                            },
                            location,
                        );
                    }
                    declared
                }
                (Some(declared), None) => declared,
                (None, Some(initialized)) => initialized,
                (None, None) => {
                    self.error(
                        ErrorImpl::MissingTypeOrInitializer {
                            name: var.name.clone(),
                        },
                        &var.location,
                    );
                    Type::Error(var.location.clone())
                }
            },
        };

        if var.is_const && var.initializer.is_none() {
            self.error(
                ErrorImpl::ConstWithoutInitializer {
                    name: var.name.clone(),
                },
                &var.location,
            );
        }

        self.declare(
            &var.name,
            SymbolInfo::new(
                SymbolKind::Variable,
                final_type,
                Declaration::Variable(var),
                var.location.clone(),
            )
            .with_modifiers(var.is_const, false),
        );
    }

    fn visit_function_decl(&mut self, function: &'a FunctionDecl, declare: bool) {
        let (params, return_type) =
            self.signature(&function.params, function.return_type.as_ref(), true);

        if declare {
            self.declare_function(function, params.clone(), return_type.clone());
        }

        let expected = return_type
            .unwrap_or_else(|| Type::primitive(PrimitiveKind::Void, function.location.clone()));
        self.visit_callable(&function.params, params, expected, &[], function.body.as_ref());
    }

    /// Shared by functions, lambdas, methods, constructors, handlers and
    /// operators: declares the parameters in a new scope and checks the body.
    fn visit_callable(
        &mut self,
        params: &'a [Parameter],
        param_types: Vec<Type>,
        return_type: Type,
        initializers: &'a [FieldInitializer],
        body: Option<&'a BlockStmt>,
    ) {
        self.return_types.push(return_type);
        self.enter_scope();

        for (param, param_type) in params.iter().zip(param_types) {
            if let Some(default) = &param.default_value {
                let default_type = self.visit_expr(default);
                if self.is_mismatch(&param_type, &default_type) {
                    self.error(
                        ErrorImpl::DefaultValueTypeMismatch {
                            parameter: param.name.clone(),
                            expected: param_type.to_string(),
                            received: default_type.to_string(),
                        },
                        default.location(),
                    );
                }
            }

            self.declare(
                &param.name,
                SymbolInfo::new(
                    SymbolKind::Variable,
                    param_type,
                    Declaration::Parameter(param),
                    param.location.clone(),
                ),
            );
        }

        for initializer in initializers {
            self.visit_field_initializer(initializer);
        }

        if let Some(body) = body {
            self.visit_block(body);
        }

        self.exit_scope();
        self.return_types.pop();
    }

    /// One `field(expr)` entry of a constructor's initializer list.
    fn visit_field_initializer(&mut self, initializer: &'a FieldInitializer) {
        let Some(object) = self.objects.last().copied() else {
            self.visit_expr(&initializer.value);
            return;
        };

        let field = self
            .find_member(&object.name, &initializer.field)
            .filter(|member| member.kind() == MemberKind::Field);

        let Some(field) = field else {
            self.visit_expr(&initializer.value);
            self.error(
                ErrorImpl::UnknownField {
                    type_: object.name.clone(),
                    field: initializer.field.clone(),
                },
                &initializer.location,
            );
            return;
        };

        let field_type = self.member_type(field);
        let value_type = self.visit_initializer(&initializer.value, Some(&field_type));
        if self.is_mismatch(&field_type, &value_type) {
            self.error(
                ErrorImpl::FieldTypeMatchError {
                    expected: field_type.to_string(),
                    received: value_type.to_string(),
                },
                initializer.value.location(),
            );
        }
    }

    fn visit_object(&mut self, object: &'a ObjectDecl, declare: bool) {
        if declare {
            self.declare_object(object);
        }

        if let Some(base) = &object.base_name {
            let is_object = self
                .table
                .lookup(base)
                .is_some_and(|info| matches!(info.kind, SymbolKind::Object | SymbolKind::Actor));
            if !is_object {
                self.error(
                    ErrorImpl::UnknownBaseClass { name: base.clone() },
                    &object.location,
                );
            } else if base == &object.name || derives_from(&self.table, base, &object.name) {
                self.error(
                    ErrorImpl::InheritanceCycle {
                        name: object.name.clone(),
                    },
                    &object.location,
                );
            }
        }

        self.objects.push(object);
        self.enter_scope();

        // Fields and methods first, so every body sees every member.
        for member in &object.members {
            match member.kind() {
                MemberKind::Field => {
                    let field_type = match &member.member_type {
                        Some(ty) => self.resolve(ty),
                        None => Type::Dynamic(member.location.clone()),
                    };
                    self.declare(
                        &member.name,
                        SymbolInfo::new(
                            SymbolKind::Variable,
                            field_type,
                            Declaration::Member(member),
                            member.location.clone(),
                        )
                        .with_modifiers(member.flags.is_const(), member.flags.is_static()),
                    );
                }
                MemberKind::Method => {
                    let (params, return_type) =
                        self.signature(&member.params, member.member_type.as_ref(), true);
                    self.declare(
                        &member.name,
                        SymbolInfo::new(
                            SymbolKind::Function,
                            Type::function(params, return_type, member.location.clone()),
                            Declaration::Member(member),
                            member.location.clone(),
                        )
                        .with_modifiers(member.flags.is_const(), member.flags.is_static()),
                    );
                }
                MemberKind::Constructor | MemberKind::MessageHandler => {}
            }
        }

        for member in &object.members {
            self.visit_member(member);
        }
        for operator in &object.operators {
            self.visit_operator(operator);
        }

        self.exit_scope();
        self.objects.pop();
    }

    fn visit_member(&mut self, member: &'a MemberDecl) {
        let void = Type::primitive(PrimitiveKind::Void, member.location.clone());

        match member.kind() {
            MemberKind::Field => {
                let field_type = self.member_type(member);
                for initializer in &member.initializers {
                    let value_type = self.visit_initializer(&initializer.value, Some(&field_type));
                    if self.is_mismatch(&field_type, &value_type) {
                        self.error(
                            ErrorImpl::InitializerTypeMismatch {
                                expected: field_type.to_string(),
                                received: value_type.to_string(),
                            },
                            initializer.value.location(),
                        );
                    }
                }
            }
            MemberKind::Method => {
                let (params, return_type) =
                    self.signature(&member.params, member.member_type.as_ref(), false);
                let expected = return_type.unwrap_or(void);
                self.visit_callable(&member.params, params, expected, &[], member.body.as_ref());
            }
            MemberKind::MessageHandler => {
                let (params, return_type) =
                    self.signature(&member.params, member.member_type.as_ref(), true);
                let expected = return_type.unwrap_or(void);
                self.visit_callable(&member.params, params, expected, &[], member.body.as_ref());
            }
            MemberKind::Constructor => {
                let (params, _) = self.signature(&member.params, None, true);
                self.visit_callable(
                    &member.params,
                    params,
                    void,
                    &member.initializers,
                    member.body.as_ref(),
                );
            }
        }
    }

    fn visit_operator(&mut self, operator: &'a OperatorOverload) {
        let (params, return_type) =
            self.signature(&operator.params, Some(&operator.return_type), true);
        let expected =
            return_type.unwrap_or_else(|| Type::Dynamic(operator.location.clone()));
        self.visit_callable(&operator.params, params, expected, &[], Some(&operator.body));
    }

    fn visit_union(&mut self, union: &'a UnionDecl, declare: bool) {
        if declare {
            self.declare_union(union);
        }

        for member in &union.member_types {
            if self.resolve(member).is_dynamic() {
                self.error(
                    ErrorImpl::DynamicUnionMember {
                        union: union.name.clone(),
                    },
                    member.location(),
                );
            }
        }

        if union_contains_itself(&self.table, &union.name) {
            self.error(
                ErrorImpl::RecursiveUnion {
                    union: union.name.clone(),
                },
                &union.location,
            );
        }
    }

    fn visit_template(&mut self, template: &'a TemplateDecl, predeclared: bool) {
        self.enter_scope();
        self.declare_template_params(&template.params, true);

        match &*template.inner {
            Stmt::FunctionDecl(function) => self.visit_function_decl(function, !predeclared),
            Stmt::ObjectDecl(object) => self.visit_object(object, !predeclared),
            other => self.visit_stmt(other),
        }

        self.exit_scope();
    }

    // Statements

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Import(import) => self.error(
                ErrorImpl::ImportNotResolved {
                    path: import.path.clone(),
                },
                &import.location,
            ),
            Stmt::VarDecl(var) => self.visit_var_decl(var),
            Stmt::MultiVarDecl(multi) => {
                for var in &multi.vars {
                    self.visit_var_decl(var);
                }
            }
            Stmt::FunctionDecl(function) => self.visit_function_decl(function, true),
            Stmt::ObjectDecl(object) => self.visit_object(object, true),
            Stmt::UnionDecl(union) => self.visit_union(union, true),
            Stmt::TemplateDecl(template) => self.visit_template(template, false),
            Stmt::Block(block) => self.visit_block(block),
            Stmt::If(if_stmt) => {
                self.visit_condition(&if_stmt.condition);
                self.visit_stmt(&if_stmt.then_branch);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            Stmt::While(while_stmt) => {
                self.visit_condition(&while_stmt.condition);
                self.visit_stmt(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.visit_stmt(&do_while.body);
                self.visit_condition(&do_while.condition);
            }
            Stmt::For(for_stmt) => {
                self.enter_scope();
                if let Some(init) = &for_stmt.init {
                    self.visit_stmt(init);
                }
                if let Some(condition) = &for_stmt.condition {
                    self.visit_condition(condition);
                }
                if let Some(increment) = &for_stmt.increment {
                    self.visit_expr(increment);
                }
                self.visit_stmt(&for_stmt.body);
                self.exit_scope();
            }
            Stmt::Expression(expression) => {
                self.visit_expr(&expression.expression);
            }
            Stmt::Return(return_stmt) => self.visit_return(return_stmt),
            Stmt::Unsafe(unsafe_stmt) => self.visit_block(&unsafe_stmt.block),
            Stmt::Scope(scope) => self.visit_block(&scope.block),
            Stmt::Annotation(annotation) => {
                for arg in &annotation.args {
                    self.visit_expr(&arg.value);
                }
            }
            Stmt::Empty(_) | Stmt::Error(_) => {}
        }
    }

    fn visit_block(&mut self, block: &'a BlockStmt) {
        self.enter_scope();
        for stmt in block.iter() {
            self.visit_stmt(stmt);
        }
        self.exit_scope();
    }

    fn visit_condition(&mut self, condition: &'a Expr) {
        let condition_type = self.visit_expr(condition);
        let bool_type = Type::primitive(PrimitiveKind::Bool, condition.location().clone());

        if self.is_mismatch(&bool_type, &condition_type) {
            self.error(
                ErrorImpl::ConditionNotBool {
                    received: condition_type.to_string(),
                },
                condition.location(),
            );
        }
    }

    fn visit_return(&mut self, return_stmt: &'a ReturnStmt) {
        let Some(expected) = self.return_types.last().cloned() else {
            self.error(ErrorImpl::ReturnOutsideFunction, &return_stmt.location);
            if let Some(value) = &return_stmt.value {
                self.visit_expr(value);
            }
            return;
        };

        let expects_void = expected.is_primitive(PrimitiveKind::Void);

        match &return_stmt.value {
            Some(value) => {
                let actual = self.visit_expr(value);
                if expects_void {
                    self.error(ErrorImpl::ReturnValueFromVoid, value.location());
                } else if self.is_mismatch(&expected, &actual) {
                    self.error(
                        ErrorImpl::ReturnTypeMismatch {
                            expected: expected.to_string(),
                            received: actual.to_string(),
                        },
                        value.location(),
                    );
                }
            }
            None => {
                if !expects_void && !expected.is_dynamic() && !expected.is_error() {
                    self.error(
                        ErrorImpl::MissingReturnValue {
                            expected: expected.to_string(),
                        },
                        &return_stmt.location,
                    );
                }
            }
        }
    }

    // Expressions

    fn visit_expr(&mut self, expr: &'a Expr) -> Type {
        match expr {
            Expr::Literal(literal) => literal_type(literal),
            Expr::Var(var) => self.visit_var(var),
            Expr::Binary(binary) => self.visit_binary(binary),
            Expr::Unary(unary) => self.visit_unary(unary),
            Expr::Call(call) => self.visit_call(call),
            Expr::MemberAccess(access) => {
                let object = self.visit_expr(&access.object);
                self.member_access_type(&object, access)
            }
            Expr::ArrayAccess(access) => self.visit_array_access(access),
            Expr::New(new) => self.visit_new(new),
            Expr::This(location) => match self.objects.last().copied() {
                Some(object) => Type::named(&object.name, location.clone()),
                None => {
                    self.error(ErrorImpl::ThisOutsideObject, location);
                    Type::Error(location.clone())
                }
            },
            Expr::FreeObject(object) => {
                for (_, value) in &object.properties {
                    self.visit_expr(value);
                }
                Type::Dynamic(object.location.clone())
            }
            Expr::TemplateString(template) => {
                for part in &template.parts {
                    if let TemplatePart::Interpolation(value) = part {
                        self.visit_expr(value);
                    }
                }
                Type::primitive(PrimitiveKind::String, template.location.clone())
            }
            Expr::StructInitializer(initializer) => {
                for (_, value) in &initializer.fields {
                    self.visit_expr(value);
                }
                Type::Dynamic(initializer.location.clone())
            }
            Expr::Lambda(lambda) => self.visit_lambda(lambda),
        }
    }

    /// Visits an expression whose expected type is known, which lets a
    /// struct initializer check its fields against that type.
    fn visit_initializer(&mut self, expr: &'a Expr, expected: Option<&Type>) -> Type {
        match (expr, expected) {
            (Expr::StructInitializer(initializer), Some(expected)) => {
                self.visit_struct_initializer(initializer, expected)
            }
            _ => self.visit_expr(expr),
        }
    }

    fn visit_var(&mut self, var: &'a VarExpr) -> Type {
        if let Some(info) = self.table.lookup(&var.name) {
            return info.resolved_type.clone();
        }

        if let Some(member) = self.inherited_member(&var.name) {
            return self.member_type(member);
        }

        self.error(
            ErrorImpl::UndeclaredIdentifier {
                name: var.name.clone(),
            },
            &var.location,
        );
        Type::Error(var.location.clone())
    }

    fn visit_binary(&mut self, binary: &'a BinaryExpr) -> Type {
        if binary.op.is_assignment() {
            return self.visit_assignment(binary);
        }

        let left = self.visit_expr(&binary.left);
        let right = self.visit_expr(&binary.right);
        let location = &binary.location;
        let bool_type = Type::primitive(PrimitiveKind::Bool, location.clone());

        if binary.op.is_logical() {
            if self.is_mismatch(&bool_type, &left) || self.is_mismatch(&bool_type, &right) {
                self.operand_mismatch(binary.op, &left, &right, location);
            }
            return bool_type;
        }

        if let Some(result) = self.overloaded_operator(&left, binary.op.symbol()) {
            return result;
        }

        if binary.op.is_comparison() {
            let comparable = match binary.op {
                BinaryOperator::Eq | BinaryOperator::Neq => {
                    !self.is_mismatch(&left, &right) || !self.is_mismatch(&right, &left)
                }
                _ => {
                    left.is_dynamic()
                        || right.is_dynamic()
                        || left.is_error()
                        || right.is_error()
                        || (left.is_numeric() && right.is_numeric())
                        || (left.is_primitive(PrimitiveKind::String)
                            && right.is_primitive(PrimitiveKind::String))
                }
            };
            if !comparable {
                self.operand_mismatch(binary.op, &left, &right, location);
            }
            return bool_type;
        }

        self.arithmetic(binary.op, &left, &right, location)
    }

    fn operand_mismatch(
        &mut self,
        op: BinaryOperator,
        left: &Type,
        right: &Type,
        location: &SourceLocation,
    ) {
        self.error(
            ErrorImpl::BinaryOperandMismatch {
                operator: String::from(op.symbol()),
                left: left.to_string(),
                right: right.to_string(),
            },
            location,
        );
    }

    /// Result type of `+ - * / %`: the wider numeric operand, or `string`
    /// when `+` sees a string.
    fn arithmetic(
        &mut self,
        op: BinaryOperator,
        left: &Type,
        right: &Type,
        location: &SourceLocation,
    ) -> Type {
        if left.is_error() || right.is_error() {
            return Type::Error(location.clone());
        }
        if left.is_dynamic() || right.is_dynamic() {
            return Type::Dynamic(location.clone());
        }

        if op == BinaryOperator::Add
            && (left.is_primitive(PrimitiveKind::String) || right.is_primitive(PrimitiveKind::String))
        {
            return Type::primitive(PrimitiveKind::String, location.clone());
        }

        match (left.as_primitive(), right.as_primitive()) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
                let wider = if r.numeric_rank() > l.numeric_rank() { r } else { l };
                Type::primitive(wider, location.clone())
            }
            _ => {
                self.operand_mismatch(op, left, right, location);
                Type::Error(location.clone())
            }
        }
    }

    fn visit_assignment(&mut self, binary: &'a BinaryExpr) -> Type {
        let target = self.visit_expr(&binary.left);
        let value = self.visit_initializer(&binary.right, Some(&target));

        self.check_writable(&binary.left);

        let stored = match compound_base(binary.op) {
            Some(op) => self.arithmetic(op, &target, &value, &binary.location),
            None => value,
        };

        if self.is_mismatch(&target, &stored) {
            self.error(
                ErrorImpl::AssignmentTypeMismatch {
                    target: target.to_string(),
                    value: stored.to_string(),
                },
                &binary.location,
            );
        }

        target
    }

    /// Reports targets that are not l-values or that name a constant.
    /// Returns false when the target is not an l-value at all.
    fn check_writable(&mut self, target: &'a Expr) -> bool {
        if !target.is_lvalue() {
            self.error(ErrorImpl::InvalidAssignmentTarget, target.location());
            return false;
        }

        if let Expr::Var(var) = target {
            let is_const = self
                .table
                .lookup(&var.name)
                .is_some_and(|info| info.is_const);
            if is_const {
                self.error(
                    ErrorImpl::AssignToConstant {
                        name: var.name.clone(),
                    },
                    &var.location,
                );
            }
        }

        true
    }

    fn visit_unary(&mut self, unary: &'a UnaryExpr) -> Type {
        let operand = self.visit_expr(&unary.operand);

        match unary.op {
            UnaryOperator::Inc | UnaryOperator::Dec => {
                if self.check_writable(&unary.operand) {
                    self.require_numeric(unary.op, &operand, &unary.location);
                }
                operand
            }
            UnaryOperator::Negate => {
                self.require_numeric(unary.op, &operand, &unary.location);
                operand
            }
            UnaryOperator::Not => Type::primitive(PrimitiveKind::Bool, unary.location.clone()),
        }
    }

    fn require_numeric(&mut self, op: UnaryOperator, operand: &Type, location: &SourceLocation) {
        if !(operand.is_numeric() || operand.is_dynamic() || operand.is_error()) {
            self.error(
                ErrorImpl::NonNumericOperand {
                    operator: String::from(op.symbol()),
                    type_: operand.to_string(),
                },
                location,
            );
        }
    }

    fn visit_call(&mut self, call: &'a CallExpr) -> Type {
        let (callee, declared_params) = self.visit_callee(&call.callee);
        let args: Vec<Type> = call.args.iter().map(|arg| self.visit_expr(arg)).collect();

        match callee {
            Type::Function(function) => {
                self.check_arguments(
                    &function.params,
                    declared_params,
                    &args,
                    &call.args,
                    &call.location,
                );
                return_type_or_void(&function)
            }
            Type::Dynamic(_) => Type::Dynamic(call.location.clone()),
            Type::Error(_) => Type::Error(call.location.clone()),
            other => {
                self.error(
                    ErrorImpl::NotCallable {
                        type_: other.to_string(),
                    },
                    call.callee.location(),
                );
                Type::Error(call.location.clone())
            }
        }
    }

    /// Type of a callee plus, when it names a declaration, its parameters.
    fn visit_callee(&mut self, callee: &'a Expr) -> (Type, Option<&'a [Parameter]>) {
        match callee {
            Expr::Var(var) => {
                let params = match self.table.lookup(&var.name) {
                    Some(info) => info.declaration.params(),
                    None => self
                        .inherited_member(&var.name)
                        .map(|member| member.params.as_slice()),
                };
                (self.visit_var(var), params)
            }
            Expr::MemberAccess(access) => {
                let object = self.visit_expr(&access.object);
                let params = self
                    .object_member(&object, &access.member)
                    .map(|member| member.params.as_slice());
                (self.member_access_type(&object, access), params)
            }
            other => (self.visit_expr(other), None),
        }
    }

    fn check_arguments(
        &mut self,
        expected: &[Type],
        declared: Option<&'a [Parameter]>,
        received: &[Type],
        args: &'a [Expr],
        location: &SourceLocation,
    ) {
        let required = declared.map_or(expected.len(), |params| {
            params
                .iter()
                .filter(|param| param.default_value.is_none())
                .count()
        });

        if received.len() > expected.len() {
            self.error(
                ErrorImpl::UnexpectedArguments {
                    expected: expected.len(),
                    received: received.len(),
                },
                args[expected.len()].location(),
            );
        } else if received.len() < required {
            self.error(
                ErrorImpl::MissingArguments {
                    expected: required,
                    received: received.len(),
                },
                location,
            );
        }

        for ((param, arg_type), arg) in expected.iter().zip(received).zip(args) {
            if self.is_mismatch(param, arg_type) {
                self.error(
                    ErrorImpl::ArgumentTypeMatchError {
                        expected: param.to_string(),
                        received: arg_type.to_string(),
                    },
                    arg.location(),
                );
            }
        }
    }

    fn member_access_type(&mut self, object: &Type, access: &'a MemberAccessExpr) -> Type {
        let location = access.location.clone();

        match object {
            Type::Dynamic(_) => Type::Dynamic(location),
            Type::Error(_) => Type::Error(location),
            Type::Array(_) if access.member == "length" => {
                Type::primitive(PrimitiveKind::Int, location)
            }
            Type::Primitive(primitive)
                if primitive.kind == PrimitiveKind::String && access.member == "length" =>
            {
                Type::primitive(PrimitiveKind::Int, location)
            }
            _ => match self.object_member(object, &access.member) {
                Some(member) => self.member_type(member),
                None => {
                    self.error(
                        ErrorImpl::UnknownMember {
                            type_: object.to_string(),
                            member: access.member.clone(),
                        },
                        &location,
                    );
                    Type::Error(location)
                }
            },
        }
    }

    fn visit_array_access(&mut self, access: &'a ArrayAccessExpr) -> Type {
        let array = self.visit_expr(&access.array);
        let index = self.visit_expr(&access.index);
        let location = access.location.clone();

        if let Some(result) = self.overloaded_operator(&array, "[]") {
            return result;
        }

        let int_type = Type::primitive(PrimitiveKind::Int, location.clone());
        if self.is_mismatch(&int_type, &index) {
            self.error(
                ErrorImpl::IndexNotInt {
                    received: index.to_string(),
                },
                access.index.location(),
            );
        }

        match array {
            Type::Array(array) => *array.element,
            Type::Primitive(primitive) if primitive.kind == PrimitiveKind::String => {
                Type::primitive(PrimitiveKind::String, location)
            }
            Type::Dynamic(_) => Type::Dynamic(location),
            Type::Error(_) => Type::Error(location),
            other => {
                self.error(
                    ErrorImpl::NotIndexable {
                        type_: other.to_string(),
                    },
                    access.array.location(),
                );
                Type::Error(location)
            }
        }
    }

    fn visit_new(&mut self, new: &'a NewExpr) -> Type {
        let args: Vec<Type> = new.args.iter().map(|arg| self.visit_expr(arg)).collect();
        let location = new.location.clone();

        let Some(info) = self.table.lookup(&new.class_name) else {
            self.error(
                ErrorImpl::UnknownType {
                    type_: new.class_name.clone(),
                },
                &location,
            );
            return Type::Error(location);
        };
        let kind = info.kind;
        let object = info.declaration.as_object();

        match kind {
            SymbolKind::TemplateParam => Type::Dynamic(location),
            SymbolKind::Object | SymbolKind::Actor => {
                if let Some(constructor) = object.and_then(|object| object.constructor()) {
                    let expected: Vec<Type> = constructor
                        .params
                        .iter()
                        .map(|param| self.param_type(param))
                        .collect();
                    self.check_arguments(
                        &expected,
                        Some(constructor.params.as_slice()),
                        &args,
                        &new.args,
                        &location,
                    );
                }
                Type::named(&new.class_name, location)
            }
            _ => {
                self.error(
                    ErrorImpl::NotAnObject {
                        name: new.class_name.clone(),
                    },
                    &location,
                );
                Type::Error(location)
            }
        }
    }

    fn visit_struct_initializer(
        &mut self,
        initializer: &'a StructInitializerExpr,
        expected: &Type,
    ) -> Type {
        let object = match expected {
            Type::Named(named) => self
                .table
                .lookup(&named.name)
                .and_then(|info| info.declaration.as_object()),
            _ => None,
        };

        let Some(object) = object else {
            for (_, value) in &initializer.fields {
                self.visit_expr(value);
            }
            return Type::Dynamic(initializer.location.clone());
        };

        if initializer.is_positional {
            let fields: Vec<&'a MemberDecl> = object.fields().collect();

            if initializer.fields.len() > fields.len() {
                self.error(
                    ErrorImpl::TooManyPositionalFields {
                        type_: object.name.clone(),
                        expected: fields.len(),
                        received: initializer.fields.len(),
                    },
                    &initializer.location,
                );
            }

            for (index, (_, value)) in initializer.fields.iter().enumerate() {
                let field_type = fields.get(index).map(|field| self.member_type(field));
                let value_type = self.visit_initializer(value, field_type.as_ref());
                if let Some(field_type) = field_type {
                    self.check_field(&field_type, &value_type, value);
                }
            }
        } else {
            for (name, value) in &initializer.fields {
                let field = name.as_ref().and_then(|name| {
                    self.find_member(&object.name, name)
                        .filter(|member| member.kind() == MemberKind::Field)
                });
                let field_type = field.map(|field| self.member_type(field));
                let value_type = self.visit_initializer(value, field_type.as_ref());

                match (name, field_type) {
                    (Some(_), Some(field_type)) => self.check_field(&field_type, &value_type, value),
                    (Some(name), None) => self.error(
                        ErrorImpl::UnknownField {
                            type_: object.name.clone(),
                            field: name.clone(),
                        },
                        value.location(),
                    ),
                    (None, _) => {}
                }
            }
        }

        Type::named(&object.name, initializer.location.clone())
    }

    fn check_field(&mut self, field_type: &Type, value_type: &Type, value: &'a Expr) {
        if self.is_mismatch(field_type, value_type) {
            self.error(
                ErrorImpl::FieldTypeMatchError {
                    expected: field_type.to_string(),
                    received: value_type.to_string(),
                },
                value.location(),
            );
        }
    }

    fn visit_lambda(&mut self, lambda: &'a LambdaExpr) -> Type {
        let function = &lambda.function;
        let (params, return_type) =
            self.signature(&function.params, function.return_type.as_ref(), true);

        let return_type = match return_type {
            Some(return_type) => return_type,
            None => {
                self.error(ErrorImpl::LambdaReturnTypeRequired, &lambda.location);
                Type::Dynamic(lambda.location.clone())
            }
        };

        self.visit_callable(
            &function.params,
            params.clone(),
            return_type.clone(),
            &[],
            function.body.as_ref(),
        );

        Type::function(params, Some(return_type), lambda.location.clone())
    }

    // Object members

    /// Finds a field or method on `type_name` or one of its bases.
    fn find_member(&self, type_name: &str, name: &str) -> Option<&'a MemberDecl> {
        let mut current = String::from(type_name);

        for _ in 0..MAX_BASE_DEPTH {
            let object = self.table.lookup(&current)?.declaration.as_object()?;
            if let Some(member) = object.find_member(name) {
                return Some(member);
            }
            current = object.base_name.clone()?;
        }

        None
    }

    fn find_operator(&self, type_name: &str, op: &str) -> Option<&'a OperatorOverload> {
        let mut current = String::from(type_name);

        for _ in 0..MAX_BASE_DEPTH {
            let object = self.table.lookup(&current)?.declaration.as_object()?;
            if let Some(operator) = object.operators.iter().find(|operator| operator.op == op) {
                return Some(operator);
            }
            current = object.base_name.clone()?;
        }

        None
    }

    fn object_member(&self, object: &Type, name: &str) -> Option<&'a MemberDecl> {
        match object {
            Type::Named(named) => self.find_member(&named.name, name),
            Type::Template(template) => self.find_member(&template.base, name),
            _ => None,
        }
    }

    /// A member of a base class of the enclosing object, visible by bare name.
    fn inherited_member(&self, name: &str) -> Option<&'a MemberDecl> {
        let object = self.objects.last()?;
        let base = object.base_name.as_ref()?;
        self.find_member(base, name)
    }

    fn overloaded_operator(&self, operand: &Type, op: &str) -> Option<Type> {
        let type_name = match operand {
            Type::Named(named) => &named.name,
            Type::Template(template) => &template.base,
            _ => return None,
        };

        self.find_operator(type_name, op)
            .map(|operator| self.resolve_known(&operator.return_type))
    }

    fn member_type(&self, member: &MemberDecl) -> Type {
        match member.kind() {
            MemberKind::Field => match &member.member_type {
                Some(ty) => self.resolve_known(ty),
                None => Type::Dynamic(member.location.clone()),
            },
            _ => Type::function(
                member
                    .params
                    .iter()
                    .map(|param| self.param_type(param))
                    .collect(),
                member.member_type.as_ref().map(|ty| self.resolve_known(ty)),
                member.location.clone(),
            ),
        }
    }

    fn param_type(&self, param: &Parameter) -> Type {
        match &param.param_type {
            Some(ty) => self.resolve_known(ty),
            None => Type::Dynamic(param.location.clone()),
        }
    }
}

fn literal_type(literal: &LiteralExpr) -> Type {
    let kind = match literal.kind {
        LiteralKind::Number => number_literal_kind(&literal.text),
        LiteralKind::String => PrimitiveKind::String,
        LiteralKind::Bool => PrimitiveKind::Bool,
        LiteralKind::Nil => PrimitiveKind::Nil,
    };

    Type::primitive(kind, literal.location.clone())
}

/// `42` is int, `42l` long, and `1.5`, `1e3` or `2f` float.
fn number_literal_kind(text: &str) -> PrimitiveKind {
    let text = text.to_ascii_lowercase();

    if text.ends_with('l') {
        PrimitiveKind::Long
    } else if text.contains('.') || text.contains('e') || text.ends_with('f') {
        PrimitiveKind::Float
    } else {
        PrimitiveKind::Int
    }
}

fn compound_base(op: BinaryOperator) -> Option<BinaryOperator> {
    match op {
        BinaryOperator::AddAssign => Some(BinaryOperator::Add),
        BinaryOperator::SubAssign => Some(BinaryOperator::Sub),
        BinaryOperator::MulAssign => Some(BinaryOperator::Mul),
        BinaryOperator::DivAssign => Some(BinaryOperator::Div),
        BinaryOperator::ModAssign => Some(BinaryOperator::Mod),
        _ => None,
    }
}
