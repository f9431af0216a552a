use std::collections::BTreeMap;

use aurora_common::{Diagnostic, DiagnosticBag, Span};

use super::types::{infer_type, Type};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::{block_end, ClassHeader, FnHeader, ParamDecl, Parser};

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// `double` when unannotated.
    pub ty: Type,
}

/// Where a callable came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Builtin,
    Extern,
    Function,
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub kind: FunctionKind,
    /// `None` for built-ins.
    pub declared_at: Option<Span>,
}

impl FunctionSignature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// 1-based declaration line, if declared in source.
    pub fn line(&self) -> Option<u32> {
        self.declared_at.as_ref().map(Span::line)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub fields: BTreeMap<String, Type>,
    /// Methods by name; `"constructor"` is reserved for the constructor.
    pub methods: BTreeMap<String, FunctionSignature>,
    pub declared_at: Span,
}

impl ClassInfo {
    pub const CONSTRUCTOR: &'static str = "constructor";

    pub fn constructor(&self) -> Option<&FunctionSignature> {
        self.methods.get(Self::CONSTRUCTOR)
    }

    /// A method by name; never the constructor.
    pub fn method(&self, name: &str) -> Option<&FunctionSignature> {
        if name == Self::CONSTRUCTOR {
            return None;
        }
        self.methods.get(name)
    }
}

/// Global function table and class table for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    functions: BTreeMap<String, FunctionSignature>,
    classes: BTreeMap<String, ClassInfo>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl SymbolTable {
    /// A table holding only the built-in functions.
    pub fn with_builtins() -> Self {
        let mut functions = BTreeMap::new();
        functions.insert(
            "printd".to_string(),
            FunctionSignature {
                name: "printd".to_string(),
                params: vec![Parameter {
                    name: "x".to_string(),
                    ty: Type::Double,
                }],
                return_type: Type::Double,
                kind: FunctionKind::Builtin,
                declared_at: None,
            },
        );
        Self {
            functions,
            classes: BTreeMap::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// First method named `name`, searching classes in name order.
    pub fn method(&self, name: &str) -> Option<&FunctionSignature> {
        self.classes.values().find_map(|class| class.method(name))
    }

    /// Functions in name order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions.values()
    }

    /// Classes in name order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }
}

/// Builds the [`SymbolTable`] from a token stream.
///
/// Top-level and nested `fn` declarations go into the function table.
/// Members of a class body (fields, methods, the constructor) go into that
/// class only.
pub struct SymbolCollector<'t> {
    tokens: &'t [Token],
    table: SymbolTable,
    diagnostics: DiagnosticBag,
}

impl<'t> SymbolCollector<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            table: SymbolTable::with_builtins(),
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn collect(mut self) -> (SymbolTable, DiagnosticBag) {
        let mut i = 0;
        while i < self.tokens.len() {
            let next = match self.tokens[i].kind {
                TokenKind::Extern => Parser::at(self.tokens, i).parse_extern().map(|header| {
                    let end = header.end;
                    self.register_extern(header);
                    end
                }),
                TokenKind::Fn => Parser::at(self.tokens, i).parse_fn_header().map(|header| {
                    let end = header.end;
                    self.register_function(header);
                    end
                }),
                TokenKind::Class => Parser::at(self.tokens, i)
                    .parse_class_header()
                    .map(|header| self.collect_class(header)),
                _ => None,
            };
            i = next.map_or(i + 1, |end| end + 1);
        }

        tracing::debug!(
            functions = self.table.functions.len(),
            classes = self.table.classes.len(),
            "symbol collection complete"
        );
        (self.table, self.diagnostics)
    }

    fn register_extern(&mut self, header: FnHeader) {
        if self.report_redefinition(&header) {
            return;
        }
        tracing::trace!(name = %header.name, "register extern");
        let signature = signature_from(&header, Type::Double, FunctionKind::Extern);
        self.table.functions.insert(header.name, signature);
    }

    fn register_function(&mut self, header: FnHeader) {
        if self.report_redefinition(&header) {
            return;
        }
        tracing::trace!(name = %header.name, "register function");
        let signature = signature_from(&header, Type::Void, FunctionKind::Function);
        self.table.functions.insert(header.name, signature);
    }

    /// Report `header` when its name is already declared in source. The
    /// first declaration stays in the table; built-ins may be replaced.
    fn report_redefinition(&mut self, header: &FnHeader) -> bool {
        let Some(previous) = self
            .table
            .functions
            .get(&header.name)
            .and_then(|existing| existing.declared_at.as_ref())
        else {
            return false;
        };
        self.diagnostics.report(
            Diagnostic::error(format!(
                "Function '{}' is already defined at line {}",
                header.name,
                previous.line()
            ))
            .with_span(header.span.clone())
            .with_related(previous.clone(), "Previous definition here"),
        );
        true
    }

    /// Collect a class and its members. Returns the index of the last
    /// token of the class (its closing brace, or the header end when it
    /// has no body).
    fn collect_class(&mut self, header: ClassHeader) -> usize {
        let mut info = ClassInfo {
            name: header.name.clone(),
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
            declared_at: header.name_span.clone(),
        };

        let end = match header.body {
            Some(open) => {
                let close = block_end(self.tokens, open);
                self.collect_members(&mut info, open, close);
                close
            }
            None => header.end,
        };

        if let Some(existing) = self.table.classes.get(&info.name) {
            self.diagnostics.report(
                Diagnostic::error(format!(
                    "Class '{}' is already defined at line {}",
                    info.name,
                    existing.declared_at.line()
                ))
                .with_span(header.name_span)
                .with_related(existing.declared_at.clone(), "Previous definition here"),
            );
        } else {
            tracing::trace!(
                name = %info.name,
                fields = info.fields.len(),
                methods = info.methods.len(),
                "register class"
            );
            self.table.classes.insert(info.name.clone(), info);
        }

        end
    }

    /// Members sit directly in the class body, optionally prefixed by `pub`.
    fn collect_members(&self, info: &mut ClassInfo, open: usize, close: usize) {
        let mut depth = 0usize;
        let mut i = open + 1;

        while i < close {
            let tok = &self.tokens[i];
            match tok.kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            if depth > 0 || tok.kind == TokenKind::RightBrace {
                i += 1;
                continue;
            }

            let start = if tok.kind == TokenKind::Pub { i + 1 } else { i };
            let mut parser = Parser::at(self.tokens, start);
            let consumed = match parser.peek() {
                TokenKind::Let | TokenKind::Var => parser.parse_var_decl().map(|decl| {
                    let ty = match (&decl.ty, &decl.init) {
                        (Some(ty), _) => Type::from_name(&ty.text),
                        (None, Some(init)) => infer_type(&join_lexemes(&self.tokens[init.clone()])),
                        (None, None) => Type::Double,
                    };
                    info.fields.insert(decl.name, ty);
                    parser.pos() - 1
                }),
                TokenKind::Fn => parser.parse_fn_header().map(|header| {
                    let end = header.end;
                    let method = signature_from(&header, Type::Double, FunctionKind::Method);
                    info.methods.insert(header.name, method);
                    end
                }),
                TokenKind::Constructor => parser.parse_constructor_header().map(|header| {
                    let end = header.end;
                    let class_type = Type::Named(info.name.clone());
                    let mut ctor =
                        signature_from(&header, class_type.clone(), FunctionKind::Constructor);
                    ctor.return_type = class_type;
                    info.methods.insert(ClassInfo::CONSTRUCTOR.to_string(), ctor);
                    end
                }),
                _ => None,
            };
            i = consumed.map_or(i + 1, |end| end.max(i) + 1);
        }
    }
}

fn signature_from(header: &FnHeader, default_return: Type, kind: FunctionKind) -> FunctionSignature {
    FunctionSignature {
        name: header.name.clone(),
        params: header.params.iter().map(parameter_from).collect(),
        return_type: header
            .return_type
            .as_ref()
            .map(|t| Type::from_name(&t.text))
            .unwrap_or(default_return),
        kind,
        declared_at: Some(header.span.clone()),
    }
}

pub(crate) fn parameter_from(param: &ParamDecl) -> Parameter {
    Parameter {
        name: param.name.clone(),
        ty: param
            .ty
            .as_ref()
            .map(|t| Type::from_name(&t.text))
            .unwrap_or(Type::Double),
    }
}

fn join_lexemes(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
