/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The program root and the closed statement enum
/// - declarations: Imports, variables, functions, objects, unions and templates
/// - expressions: Definitions for various expression types
/// - printer: Indented textual dump of any subtree
/// - statements: Control flow and block statements
/// - types: Definitions for type representations in the AST
pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod printer;
pub mod statements;
pub mod types;
