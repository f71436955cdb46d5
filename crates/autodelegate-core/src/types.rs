//! Java type references.
//!
//! Signatures in the declaration model are written in Java source syntax
//! (`java.util.Map<K, ? extends V>[]`) and parsed into [`TypeRef`]. Names are
//! always fully qualified; a dotless name only becomes a [`TypeRef::Var`] once
//! the [`DeclarationIndex`](crate::DeclarationIndex) binds it against the type
//! parameters in scope.

use crate::decl::TypeParam;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Qualified name of the root of the reference type hierarchy.
pub const OBJECT: &str = "java.lang.Object";

/// Bound chains deeper than this are treated as cyclic and erase to `Object`.
const MAX_BOUND_DEPTH: usize = 16;

/// Java primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "boolean" => Some(Primitive::Boolean),
            "byte" => Some(Primitive::Byte),
            "short" => Some(Primitive::Short),
            "char" => Some(Primitive::Char),
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }
}

/// Bound of a `?` type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WildcardBound {
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

/// A type as it appears in a declaration signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// The `void` pseudo-type; only valid as a return type.
    Void,

    /// A primitive type.
    Primitive(Primitive),

    /// A class or interface type, by qualified name, with its type arguments.
    Declared { name: String, args: Vec<TypeRef> },

    /// A type variable.
    Var(String),

    /// An array of the element type.
    Array(Box<TypeRef>),

    /// A wildcard type argument.
    Wildcard(Option<WildcardBound>),
}

impl TypeRef {
    /// Parse a type written in Java source syntax.
    pub fn parse(input: &str) -> Result<TypeRef, TypeParseError> {
        let mut parser = Parser::new(input);
        parser.skip_whitespace();
        let ty = parser.parse_type(true)?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }

    /// A declared type without type arguments.
    pub fn declared(name: impl Into<String>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// `java.lang.Object`.
    pub fn object() -> Self {
        Self::declared(OBJECT)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Whether values of this type are object references.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            TypeRef::Declared { .. } | TypeRef::Var(_) | TypeRef::Array(_)
        )
    }

    /// The qualified name of a declared type.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TypeRef::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type arguments of a declared type; empty for everything else.
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Declared { args, .. } => args,
            _ => &[],
        }
    }

    /// Replace type variables found in `bindings`.
    pub fn substitute(&self, bindings: &BTreeMap<String, TypeRef>) -> TypeRef {
        if bindings.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Var(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            TypeRef::Declared { name, args } => TypeRef::Declared {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            TypeRef::Array(elem) => TypeRef::Array(Box::new(elem.substitute(bindings))),
            TypeRef::Wildcard(Some(WildcardBound::Extends(b))) => {
                TypeRef::Wildcard(Some(WildcardBound::Extends(Box::new(b.substitute(bindings)))))
            }
            TypeRef::Wildcard(Some(WildcardBound::Super(b))) => {
                TypeRef::Wildcard(Some(WildcardBound::Super(Box::new(b.substitute(bindings)))))
            }
            TypeRef::Void | TypeRef::Primitive(_) | TypeRef::Wildcard(None) => self.clone(),
        }
    }

    /// The erasure of this type: type arguments dropped, type variables
    /// replaced by the erasure of their first bound.
    pub fn erasure(&self, scope: &TypeScope) -> TypeRef {
        self.erasure_at(scope, 0)
    }

    fn erasure_at(&self, scope: &TypeScope, depth: usize) -> TypeRef {
        match self {
            TypeRef::Void | TypeRef::Primitive(_) => self.clone(),
            TypeRef::Declared { name, .. } => TypeRef::declared(name.clone()),
            TypeRef::Array(elem) => TypeRef::Array(Box::new(elem.erasure_at(scope, depth))),
            TypeRef::Var(name) => match scope.first_bound(name) {
                Some(bound) if depth < MAX_BOUND_DEPTH => bound.erasure_at(scope, depth + 1),
                _ => TypeRef::object(),
            },
            TypeRef::Wildcard(Some(WildcardBound::Extends(bound))) => {
                bound.erasure_at(scope, depth + 1)
            }
            TypeRef::Wildcard(_) => TypeRef::object(),
        }
    }

    /// Rewrite dotless, argument-free declared names that appear in `vars`
    /// into type variables.
    pub fn bind_type_vars(&self, vars: &BTreeSet<String>) -> TypeRef {
        if vars.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Declared { name, args } if args.is_empty() && vars.contains(name) => {
                TypeRef::Var(name.clone())
            }
            TypeRef::Declared { name, args } => TypeRef::Declared {
                name: name.clone(),
                args: args.iter().map(|a| a.bind_type_vars(vars)).collect(),
            },
            TypeRef::Array(elem) => TypeRef::Array(Box::new(elem.bind_type_vars(vars))),
            TypeRef::Wildcard(Some(WildcardBound::Extends(b))) => {
                TypeRef::Wildcard(Some(WildcardBound::Extends(Box::new(b.bind_type_vars(vars)))))
            }
            TypeRef::Wildcard(Some(WildcardBound::Super(b))) => {
                TypeRef::Wildcard(Some(WildcardBound::Super(Box::new(b.bind_type_vars(vars)))))
            }
            TypeRef::Void | TypeRef::Primitive(_) | TypeRef::Var(_) | TypeRef::Wildcard(None) => {
                self.clone()
            }
        }
    }

    /// Call `f` with every declared type name reachable from this type.
    pub fn for_each_declared(&self, f: &mut dyn FnMut(&str)) {
        match self {
            TypeRef::Declared { name, args } => {
                f(name);
                for arg in args {
                    arg.for_each_declared(f);
                }
            }
            TypeRef::Array(elem) => elem.for_each_declared(f),
            TypeRef::Wildcard(Some(WildcardBound::Extends(b) | WildcardBound::Super(b))) => {
                b.for_each_declared(f)
            }
            TypeRef::Void | TypeRef::Primitive(_) | TypeRef::Var(_) | TypeRef::Wildcard(None) => {}
        }
    }

    /// Render with a custom spelling for declared type names.
    pub fn render(&self, name_of: &dyn Fn(&str) -> String) -> String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive(p) => p.keyword().to_string(),
            TypeRef::Var(name) => name.clone(),
            TypeRef::Declared { name, args } => {
                let mut out = name_of(name);
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|a| a.render(name_of)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                out
            }
            TypeRef::Array(elem) => format!("{}[]", elem.render(name_of)),
            TypeRef::Wildcard(None) => "?".to_string(),
            TypeRef::Wildcard(Some(WildcardBound::Extends(b))) => {
                format!("? extends {}", b.render(name_of))
            }
            TypeRef::Wildcard(Some(WildcardBound::Super(b))) => {
                format!("? super {}", b.render(name_of))
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&|name| name.to_string()))
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// Last dot-separated segment of a qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Pair type parameters with type arguments, by position.
pub fn bindings(params: &[TypeParam], args: &[TypeRef]) -> BTreeMap<String, TypeRef> {
    params
        .iter()
        .zip(args)
        .map(|(p, a)| (p.name.clone(), a.clone()))
        .collect()
}

/// Type variables in scope, with their bounds.
#[derive(Debug, Clone, Default)]
pub struct TypeScope {
    bounds: BTreeMap<String, Vec<TypeRef>>,
}

impl TypeScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope holding `params`.
    pub fn with_params(params: &[TypeParam]) -> Self {
        let mut scope = Self::new();
        scope.push_params(params);
        scope
    }

    /// Add `params`, shadowing any variable of the same name.
    pub fn push_params(&mut self, params: &[TypeParam]) {
        for param in params {
            self.bounds.insert(param.name.clone(), param.bounds.clone());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bounds.contains_key(name)
    }

    pub fn first_bound(&self, name: &str) -> Option<&TypeRef> {
        self.bounds.get(name).and_then(|b| b.first())
    }
}

/// Error returned when a type string is not valid Java type syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type `{input}` at offset {offset}: {reason}")]
pub struct TypeParseError {
    pub input: String,
    pub offset: usize,
    pub reason: String,
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> TypeParseError {
        TypeParseError {
            input: self.input.to_string(),
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn identifier(&mut self) -> Result<String, TypeParseError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.pos += 1,
            _ => return Err(self.error("expected identifier")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn qualified_name(&mut self) -> Result<String, TypeParseError> {
        let mut name = self.identifier()?;
        loop {
            let save = self.pos;
            if self.eat('.') {
                name.push('.');
                name.push_str(&self.identifier()?);
            } else {
                self.pos = save;
                return Ok(name);
            }
        }
    }

    fn parse_type(&mut self, top_level: bool) -> Result<TypeRef, TypeParseError> {
        self.skip_whitespace();
        if self.eat('?') {
            if top_level {
                return Err(self.error("wildcard outside of type arguments"));
            }
            return self.wildcard();
        }

        let name = self.qualified_name()?;
        let base = if name == "void" {
            if !top_level {
                return Err(self.error("void is not a valid type argument"));
            }
            TypeRef::Void
        } else if let Some(p) = Primitive::from_keyword(&name) {
            TypeRef::Primitive(p)
        } else {
            let mut args = Vec::new();
            if self.eat('<') {
                loop {
                    args.push(self.parse_type(false)?);
                    if self.eat(',') {
                        continue;
                    }
                    if self.eat('>') {
                        break;
                    }
                    return Err(self.error("expected `,` or `>`"));
                }
            }
            TypeRef::Declared { name, args }
        };
        self.dims(base)
    }

    fn wildcard(&mut self) -> Result<TypeRef, TypeParseError> {
        self.skip_whitespace();
        let save = self.pos;
        let keyword = match self.identifier() {
            Ok(keyword) => keyword,
            Err(_) => {
                self.pos = save;
                return Ok(TypeRef::Wildcard(None));
            }
        };
        let bound = Box::new(self.parse_type(false)?);
        match keyword.as_str() {
            "extends" => Ok(TypeRef::Wildcard(Some(WildcardBound::Extends(bound)))),
            "super" => Ok(TypeRef::Wildcard(Some(WildcardBound::Super(bound)))),
            _ => {
                self.pos = save;
                Err(self.error("expected `extends` or `super`"))
            }
        }
    }

    fn dims(&mut self, mut ty: TypeRef) -> Result<TypeRef, TypeParseError> {
        while self.eat('[') {
            if ty.is_void() {
                return Err(self.error("array of void"));
            }
            if !self.eat(']') {
                return Err(self.error("expected `]`"));
            }
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }
}
