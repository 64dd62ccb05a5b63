//! Structural model of two versions of a codebase.
//!
//! These types are produced by external collaborators (a model builder and a
//! refactoring detector) and are read-only inputs to reconciliation. Every
//! element points back into its file's syntax tree through a [`Location`].

use arbor::{NodeId, Span, SyntaxTree, locate};
use rapidhash::RapidHashMap as HashMap;
use smallvec::SmallVec;

use crate::refactoring::Refactoring;

/// File path plus byte range of one structural element, with an optional
/// expected node kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub span: Span,
    pub kind: Option<&'static str>,
}

impl Location {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            span,
            kind: None,
        }
    }

    /// The same location with a node kind hint.
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Resolve against the tree of this location's file, using the stored hint.
    pub fn resolve(&self, tree: &SyntaxTree) -> Option<NodeId> {
        locate::resolve(tree, self.span, self.kind)
    }

    /// Resolve with an explicit kind hint, overriding the stored one.
    pub fn resolve_as(&self, tree: &SyntaxTree, kind: &str) -> Option<NodeId> {
        locate::resolve(tree, self.span, Some(kind))
    }
}

/// Access level of a class, attribute or operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    #[default]
    Package,
}

impl Visibility {
    /// Modifier keyword spelling; package-private has none.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Protected => Some("protected"),
            Visibility::Private => Some("private"),
            Visibility::Package => None,
        }
    }
}

/// Non-access modifier flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_synchronized: bool,
    pub is_volatile: bool,
    pub is_transient: bool,
}

impl Modifiers {
    /// Keywords set on both sides, in declaration order.
    pub fn shared_keywords(&self, other: &Modifiers) -> SmallVec<[&'static str; 6]> {
        [
            (self.is_static && other.is_static, "static"),
            (self.is_final && other.is_final, "final"),
            (self.is_abstract && other.is_abstract, "abstract"),
            (self.is_synchronized && other.is_synchronized, "synchronized"),
            (self.is_volatile && other.is_volatile, "volatile"),
            (self.is_transient && other.is_transient, "transient"),
        ]
        .into_iter()
        .filter_map(|(shared, keyword)| shared.then_some(keyword))
        .collect()
    }
}

/// A reference to a type: superclass, interface, declared or return type.
#[derive(Debug, Clone, Default)]
pub struct TypeRef {
    /// Simple class name, used to pair interfaces across versions.
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, Default)]
pub struct Javadoc {
    pub text: String,
    pub location: Location,
}

impl Javadoc {
    pub fn equal_text(&self, other: &Javadoc) -> bool {
        self.text == other.text
    }
}

/// A parameter, local variable or field fragment.
#[derive(Debug, Clone, Default)]
pub struct VariableDeclaration {
    pub name: String,
    pub location: Location,
    pub type_: Option<TypeRef>,
}

/// A field of a class. `location` is the declarator fragment; its parent
/// node is the whole field declaration.
#[derive(Debug, Clone, Default)]
pub struct Attribute {
    pub name: String,
    pub class_name: String,
    pub location: Location,
    pub type_: TypeRef,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    pub javadoc: Option<Javadoc>,
}

/// A method or constructor.
#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub name: String,
    pub class_name: String,
    pub location: Location,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    pub javadoc: Option<Javadoc>,
}

/// An instance or static initializer block.
#[derive(Debug, Clone, Default)]
pub struct Initializer {
    pub class_name: String,
    pub location: Location,
    pub is_static: bool,
}

/// What a body mapper's two sides are.
#[derive(Debug, Clone)]
pub enum Container {
    Operation(Operation),
    Initializer(Initializer),
}

impl Container {
    pub fn location(&self) -> &Location {
        match self {
            Container::Operation(op) => &op.location,
            Container::Initializer(init) => &init.location,
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            Container::Operation(op) => &op.class_name,
            Container::Initializer(init) => &init.class_name,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Container::Operation(op) => Some(op),
            Container::Initializer(_) => None,
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Container::Operation(Operation::default())
    }
}

/// Signature-level differences of two matched operations.
#[derive(Debug, Clone, Default)]
pub struct OperationSignatureDiff {
    pub common_type_parameters: Vec<(Location, Location)>,
    pub common_annotations: Vec<(Location, Location)>,
    pub common_exception_types: Vec<(Location, Location)>,
    /// Return types of both sides, when both declare one.
    pub return_types: Option<(Location, Location)>,
}

#[derive(Debug, Clone, Default)]
pub struct LambdaExpression {
    pub location: Location,
    pub parameters: Vec<VariableDeclaration>,
}

/// A statement or expression inside an operation body.
#[derive(Debug, Clone, Default)]
pub struct CodeFragment {
    pub location: Location,
    /// Whether this is an expression rather than a full statement.
    pub is_expression: bool,
    pub variables: Vec<VariableDeclaration>,
    pub lambdas: Vec<LambdaExpression>,
}

impl CodeFragment {
    pub fn variable(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variables.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MappingKind {
    #[default]
    Leaf,
    Composite,
}

/// A matched pair of statements or expressions.
#[derive(Debug, Clone, Default)]
pub struct CodeMapping {
    pub kind: MappingKind,
    pub fragment1: CodeFragment,
    pub fragment2: CodeFragment,
}

impl CodeMapping {
    pub fn involves_expression(&self) -> bool {
        self.fragment1.is_expression || self.fragment2.is_expression
    }
}

/// Statement-level correspondence between two operations or initializers.
#[derive(Debug, Clone, Default)]
pub struct BodyMapper {
    pub container1: Container,
    pub container2: Container,
    pub signature_diff: Option<OperationSignatureDiff>,
    pub matched_variables: Vec<(VariableDeclaration, VariableDeclaration)>,
    pub mappings: Vec<CodeMapping>,
    pub anonymous_class_diffs: Vec<AnonymousClassDiff>,
}

#[derive(Debug, Clone, Default)]
pub struct AnonymousClassDiff {
    pub common_attributes: Vec<(Attribute, Attribute)>,
    pub body_mappers: Vec<BodyMapper>,
}

#[derive(Debug, Clone, Default)]
pub struct EnumConstant {
    pub name: String,
    pub location: Location,
}

/// A changed enum constant and the diff of its class body, if it has one.
#[derive(Debug, Clone, Default)]
pub struct EnumConstantDiff {
    pub name: String,
    pub anonymous_class_diff: Option<AnonymousClassDiff>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Default)]
pub struct ClassDescriptor {
    /// Qualified name.
    pub name: String,
    pub kind: ClassKind,
    /// Span of the whole type declaration.
    pub location: Location,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub javadoc: Option<Javadoc>,
}

impl ClassDescriptor {
    pub fn source_file(&self) -> &str {
        &self.location.file
    }
}

/// Everything the structural diff detector knows about one matched class.
#[derive(Debug, Clone, Default)]
pub struct ClassPairDiff {
    pub original: ClassDescriptor,
    pub next: ClassDescriptor,
    /// Qualified names of imports present in both versions.
    pub common_imports: Vec<String>,
    pub common_enum_constants: Vec<(EnumConstant, EnumConstant)>,
    pub enum_constant_diffs: Vec<EnumConstantDiff>,
    pub common_type_parameters: Vec<(Location, Location)>,
    pub common_attributes: Vec<(Attribute, Attribute)>,
    pub common_annotations: Vec<(Location, Location)>,
    /// Names of interfaces the next version no longer implements.
    pub removed_interfaces: Vec<String>,
    pub body_mappers: Vec<BodyMapper>,
    /// Refactorings local to this class pair.
    pub refactorings: Vec<Refactoring>,
}

/// Syntax trees of one version, keyed by file path.
#[derive(Debug, Default)]
pub struct VersionTrees {
    trees: HashMap<String, SyntaxTree>,
}

impl VersionTrees {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, tree: SyntaxTree) {
        self.trees.insert(path.into(), tree);
    }

    pub fn get(&self, path: &str) -> Option<&SyntaxTree> {
        self.trees.get(path)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SyntaxTree)> for VersionTrees {
    fn from_iter<I: IntoIterator<Item = (S, SyntaxTree)>>(iter: I) -> Self {
        Self {
            trees: iter.into_iter().map(|(p, t)| (p.into(), t)).collect(),
        }
    }
}

/// Whole-project input: both versions' trees, the class pairs and the
/// project-wide refactorings.
#[derive(Debug, Default)]
pub struct ModelDiff {
    pub before: VersionTrees,
    pub after: VersionTrees,
    /// Class pairs matched by unchanged name.
    pub common_class_diffs: Vec<ClassPairDiff>,
    /// Class pairs matched as renames.
    pub renamed_class_diffs: Vec<ClassPairDiff>,
    /// Refactorings spanning classes (moves, pull-ups, push-downs).
    pub refactorings: Vec<Refactoring>,
}
