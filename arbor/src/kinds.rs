//! Node kind names of the Java-shaped syntax trees the engine aligns.
//!
//! Kinds are plain `&'static str` values so that tree producers can use any
//! grammar; these are the ones the alignment passes look for by name.

pub const COMPILATION_UNIT: &str = "CompilationUnit";
pub const PACKAGE_DECLARATION: &str = "PackageDeclaration";
pub const IMPORT_DECLARATION: &str = "ImportDeclaration";
pub const TYPE_DECLARATION: &str = "TypeDeclaration";
pub const ENUM_DECLARATION: &str = "EnumDeclaration";
pub const ENUM_CONSTANT_DECLARATION: &str = "EnumConstantDeclaration";
pub const ANONYMOUS_CLASS_DECLARATION: &str = "AnonymousClassDeclaration";
pub const TYPE_DECLARATION_KIND: &str = "TYPE_DECLARATION_KIND";
pub const TYPE_PARAMETER: &str = "TypeParameter";

pub const FIELD_DECLARATION: &str = "FieldDeclaration";
pub const VARIABLE_DECLARATION_FRAGMENT: &str = "VariableDeclarationFragment";
pub const VARIABLE_DECLARATION_STATEMENT: &str = "VariableDeclarationStatement";
pub const SINGLE_VARIABLE_DECLARATION: &str = "SingleVariableDeclaration";
pub const METHOD_DECLARATION: &str = "MethodDeclaration";
pub const INITIALIZER: &str = "Initializer";

pub const MODIFIER: &str = "Modifier";
pub const SIMPLE_NAME: &str = "SimpleName";
pub const QUALIFIED_NAME: &str = "QualifiedName";
pub const PRIMITIVE_TYPE: &str = "PrimitiveType";
pub const SIMPLE_TYPE: &str = "SimpleType";
pub const PARAMETERIZED_TYPE: &str = "ParameterizedType";
pub const JAVADOC: &str = "Javadoc";
pub const MARKER_ANNOTATION: &str = "MarkerAnnotation";

pub const BLOCK: &str = "Block";
pub const TRY_STATEMENT: &str = "TryStatement";
pub const CATCH_CLAUSE: &str = "CatchClause";
pub const IF_STATEMENT: &str = "IfStatement";
pub const FOR_STATEMENT: &str = "ForStatement";
pub const ENHANCED_FOR_STATEMENT: &str = "EnhancedForStatement";
pub const WHILE_STATEMENT: &str = "WhileStatement";
pub const EXPRESSION_STATEMENT: &str = "ExpressionStatement";
pub const RETURN_STATEMENT: &str = "ReturnStatement";

pub const METHOD_INVOCATION: &str = "MethodInvocation";
pub const LAMBDA_EXPRESSION: &str = "LambdaExpression";
pub const INFIX_EXPRESSION: &str = "InfixExpression";
pub const ASSIGNMENT: &str = "Assignment";
pub const STRING_LITERAL: &str = "StringLiteral";
pub const NUMBER_LITERAL: &str = "NumberLiteral";

pub const ASSIGNMENT_OPERATOR: &str = "ASSIGNMENT_OPERATOR";
pub const INFIX_EXPRESSION_OPERATOR: &str = "INFIX_EXPRESSION_OPERATOR";

/// Every kind named in this module.
pub const ALL: &[&str] = &[
    COMPILATION_UNIT,
    PACKAGE_DECLARATION,
    IMPORT_DECLARATION,
    TYPE_DECLARATION,
    ENUM_DECLARATION,
    ENUM_CONSTANT_DECLARATION,
    ANONYMOUS_CLASS_DECLARATION,
    TYPE_DECLARATION_KIND,
    TYPE_PARAMETER,
    FIELD_DECLARATION,
    VARIABLE_DECLARATION_FRAGMENT,
    VARIABLE_DECLARATION_STATEMENT,
    SINGLE_VARIABLE_DECLARATION,
    METHOD_DECLARATION,
    INITIALIZER,
    MODIFIER,
    SIMPLE_NAME,
    QUALIFIED_NAME,
    PRIMITIVE_TYPE,
    SIMPLE_TYPE,
    PARAMETERIZED_TYPE,
    JAVADOC,
    MARKER_ANNOTATION,
    BLOCK,
    TRY_STATEMENT,
    CATCH_CLAUSE,
    IF_STATEMENT,
    FOR_STATEMENT,
    ENHANCED_FOR_STATEMENT,
    WHILE_STATEMENT,
    EXPRESSION_STATEMENT,
    RETURN_STATEMENT,
    METHOD_INVOCATION,
    LAMBDA_EXPRESSION,
    INFIX_EXPRESSION,
    ASSIGNMENT,
    STRING_LITERAL,
    NUMBER_LITERAL,
    ASSIGNMENT_OPERATOR,
    INFIX_EXPRESSION_OPERATOR,
];

/// Kinds whose label is a grammar keyword rather than free text.
///
/// Shape comparison treats these labels as part of the shape: `private` and
/// `public` are different shapes, `millis` and `durationMillis` are not.
pub const KEYWORD_KINDS: &[&str] = &[
    MODIFIER,
    PRIMITIVE_TYPE,
    TYPE_DECLARATION_KIND,
    ASSIGNMENT_OPERATOR,
    INFIX_EXPRESSION_OPERATOR,
];

/// Whether labels of this kind participate in shape comparison.
pub fn is_keyword(kind: &str) -> bool {
    KEYWORD_KINDS.contains(&kind)
}

/// Kinds a kind-hinted location may resolve to by containment when no span
/// matches exactly. A field's location covers its fragment's name, not the
/// whole fragment.
pub const CONTAINER_KINDS: &[&str] = &[VARIABLE_DECLARATION_FRAGMENT];

/// Whether a node of this kind is a statement, a block or a catch clause,
/// as opposed to an expression or a declaration part.
pub fn is_statement(kind: &str) -> bool {
    kind == BLOCK || kind == CATCH_CLAUSE || kind.ends_with("Statement")
}
