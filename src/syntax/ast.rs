// Typed syntax tree for the TypeScript subset the analyzer reads.
//
// Only declaration-level structure is modelled; bodies are skipped by the parser.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Module {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
    Import(ImportDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
    Variable(VariableStmt),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPORTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub source: String,
    pub default: Option<String>,
    pub bindings: ImportBindings,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBindings {
    None,
    Namespace(String),
    Named(Vec<ImportSpecifier>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    /// Name as exported by the source module.
    pub imported: String,
    /// Name bound in the importing module.
    pub local: String,
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Decorator {
    /// Dotted callee path, e.g. `["LambdaFunction"]`.
    pub path: Vec<String>,
    pub arguments: Vec<Expr>,
}

impl Decorator {
    pub fn name(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub exported: bool,
    pub default: bool,
    pub declare: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
}

#[derive(Debug, Clone)]
pub struct HeritageType {
    pub name: QualifiedName,
    pub type_args: Vec<TypeNode>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub decorators: Vec<Decorator>,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<HeritageType>,
    pub implements: Vec<HeritageType>,
    pub members: Vec<ClassMember>,
}

impl ClassDecl {
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Method(method)
                if method.name == name && !method.is_static && method.kind == MethodKind::Method =>
            {
                Some(method)
            }
            _ => None,
        })
    }

    /// `extends` first, then `implements`, in source order.
    pub fn heritage(&self) -> impl Iterator<Item = &HeritageType> {
        self.extends.iter().chain(self.implements.iter())
    }
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(Vec<Param>),
    Index(IndexSignature),
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub optional: bool,
    pub is_static: bool,
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub kind: MethodKind,
    pub is_static: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub optional: bool,
    pub rest: bool,
    /// Carries an accessibility or `readonly` modifier (constructor parameter property).
    pub property: bool,
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone)]
pub struct IndexSignature {
    pub key_name: String,
    pub key_type: TypeNode,
    pub ty: TypeNode,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<HeritageType>,
    pub members: Vec<TypeMember>,
}

#[derive(Debug, Clone)]
pub enum TypeMember {
    Property {
        name: String,
        optional: bool,
        ty: Option<TypeNode>,
    },
    Index(IndexSignature),
    /// Method, call and construct signatures; never rendered as data.
    Method { name: String },
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeNode,
}

#[derive(Debug, Clone)]
pub struct VariableStmt {
    pub exported: bool,
    pub declarations: Vec<VarDeclarator>,
}

#[derive(Debug, Clone)]
pub struct VarDeclarator {
    pub name: String,
    pub initializer: Option<Expr>,
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// The leftmost segment when the name is qualified (`ns` in `ns.Item`).
    pub namespace: Option<String>,
    /// The rightmost segment.
    pub name: String,
}

impl QualifiedName {
    pub fn simple(name: impl Into<String>) -> Self {
        Self { namespace: None, name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Object,
    Any,
    Unknown,
    Void,
    Null,
    Undefined,
    Never,
    BigInt,
    Symbol,
    This,
}

impl Keyword {
    pub fn from_ident(s: &str) -> Option<Self> {
        Some(match s {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "void" => Self::Void,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "never" => Self::Never,
            "bigint" => Self::BigInt,
            "symbol" => Self::Symbol,
            "this" => Self::This,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Void => "void",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Never => "never",
            Self::BigInt => "bigint",
            Self::Symbol => "symbol",
            Self::This => "this",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    Str(String),
    /// Source text of the numeral, sign included.
    Num(String),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub enum TypeNode {
    Keyword(Keyword),
    Literal(LiteralType),
    Reference { name: QualifiedName, args: Vec<TypeNode> },
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Parenthesized(Box<TypeNode>),
    /// Inline type literal `{ a: T; b?: U }`.
    Shape(Vec<TypeMember>),
    /// Function, constructor, conditional, mapped, indexed, `typeof`, `keyof`,
    /// template-literal types. Kept as source text.
    Opaque { kind: OpaqueKind, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    Function,
    Constructor,
    Conditional,
    Mapped,
    IndexedAccess,
    Query,
    Operator,
    TemplateLiteral,
    Infer,
    Predicate,
}

impl OpaqueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function type",
            Self::Constructor => "constructor type",
            Self::Conditional => "conditional type",
            Self::Mapped => "mapped type",
            Self::IndexedAccess => "indexed access type",
            Self::Query => "type query",
            Self::Operator => "type operator",
            Self::TemplateLiteral => "template literal type",
            Self::Infer => "infer type",
            Self::Predicate => "type predicate",
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub enum Expr {
    Object(Vec<ObjectMember>),
    Array(Vec<Expr>),
    Str(String),
    /// Source text of the numeral; the evaluator converts it.
    Num(String),
    Bool(bool),
    Null,
    /// Template literal; `substitutions` is true when it contains `${...}`.
    Template { text: String, substitutions: bool },
    Ident(String),
    New { callee: Box<Expr>, args: Vec<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Member { object: Box<Expr>, property: String },
    Neg(Box<Expr>),
    /// Anything outside the structural grammar, kept as source text.
    Other(String),
}

#[derive(Debug, Clone)]
pub enum ObjectMember {
    Property { key: String, value: Expr },
    Shorthand(String),
    /// Spread, computed keys, methods and accessors.
    Other(String),
}

impl Expr {
    /// Short human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Expr::Object(_) => "object literal".into(),
            Expr::Array(_) => "array literal".into(),
            Expr::Str(s) => format!("'{s}'"),
            Expr::Num(n) => n.clone(),
            Expr::Bool(b) => b.to_string(),
            Expr::Null => "null".into(),
            Expr::Template { text, .. } => format!("`{text}`"),
            Expr::Ident(name) => name.clone(),
            Expr::New { callee, .. } => format!("new {}(..)", callee.describe()),
            Expr::Call { callee, .. } => format!("{}(..)", callee.describe()),
            Expr::Member { object, property } => format!("{}.{property}", object.describe()),
            Expr::Neg(inner) => format!("-{}", inner.describe()),
            Expr::Other(text) => text.clone(),
        }
    }
}
