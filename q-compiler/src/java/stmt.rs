//! Declaration and statement rendering
//!
//! Produces the text of one class, callable, field or statement. Package
//! headers and file placement belong to the projection in the parent module.

use crate::backend::{utils, CodegenOptions};
use crate::error::RenderError;
use crate::java::expr::ExprRenderer;
use crate::names::{Namer, Result};
use q_ast::{Ast, ClassDef, Declaration, FunctionDef, If, NodeId, NodeKind};

pub struct StmtRenderer<'a> {
    ast: &'a Ast,
    options: &'a CodegenOptions,
    exprs: ExprRenderer<'a>,
}

impl<'a> StmtRenderer<'a> {
    pub fn new(ast: &'a Ast, options: &'a CodegenOptions) -> Self {
        Self {
            ast,
            options,
            exprs: ExprRenderer::new(ast, options),
        }
    }

    pub fn namer(&self) -> Namer<'a> {
        self.exprs.namer()
    }

    fn indent(&self, text: &str) -> String {
        utils::indent(text, self.options.indent_width)
    }

    pub fn render(&self, id: NodeId) -> Result<String> {
        match self.ast.kind(id) {
            NodeKind::Class(class) => self.class(class, "class"),
            NodeKind::Interface(class) => self.class(class, "interface"),
            NodeKind::TypeParam(param) => Ok(self.namer().name(&param.name)),
            NodeKind::Function(function) => self.callable(function, "public static"),
            NodeKind::Method(method) => self.callable(method, "public"),
            // Macros are inlined at their call sites
            NodeKind::Macro(_) | NodeKind::MethodMacro(_) => Ok(String::new()),
            NodeKind::Declaration(decl) => self.declaration(decl),
            NodeKind::Field(decl) => Ok(format!("{};", self.declaration(decl)?)),
            NodeKind::Block(block) => Ok(self.render_all(&block.statements)?.join("\n")),
            NodeKind::Local(local) => Ok(format!("{};", self.render(local.declaration)?)),
            NodeKind::Return(ret) => match ret.expr {
                Some(expr) => Ok(format!("return {};", self.exprs.render(expr)?)),
                None => Ok("return;".to_string()),
            },
            NodeKind::ExprStmt(stmt) => Ok(format!("{};", self.exprs.render(stmt.expr)?)),
            NodeKind::Assign(assign) => Ok(format!(
                "{} = {};",
                self.assign_target(assign.lhs)?,
                self.exprs.render(assign.rhs)?
            )),
            NodeKind::If(stmt) => self.if_stmt(stmt),
            NodeKind::Root(_)
            | NodeKind::Package(_)
            | NodeKind::Primitive(_)
            | NodeKind::Type(_)
            | NodeKind::Var(_)
            | NodeKind::Call(_)
            | NodeKind::Attr(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::List(_)
            | NodeKind::Native(_)
            | NodeKind::Fixed(_) => Err(RenderError::unhandled_node(
                self.ast,
                id,
                "a declaration or statement",
            )),
        }
    }

    fn render_all(&self, ids: &[NodeId]) -> Result<Vec<String>> {
        ids.iter().map(|id| self.render(*id)).collect()
    }

    /// Class or interface declaration, without a package header
    fn class(&self, class: &ClassDef, keyword: &str) -> Result<String> {
        let name = self.namer().name(&class.name);
        let params = if class.parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.render_all(&class.parameters)?.join(", "))
        };

        let mut members = Vec::with_capacity(class.definitions.len());
        for member in &class.definitions {
            let text = self.render(*member)?;
            if !text.is_empty() {
                members.push(text);
            }
        }

        Ok(format!(
            "public {keyword} {name}{params} {{{}}}",
            self.indent(&members.join("\n"))
        ))
    }

    fn callable(&self, def: &FunctionDef, modifiers: &str) -> Result<String> {
        let return_type = match def.return_type {
            Some(ty) => format!("{} ", self.namer().render_type(self.ast, ty)?),
            None => String::new(),
        };
        let name = self.namer().name(&def.name);
        let params = self.render_all(&def.params)?.join(", ");
        let body = match def.body {
            Some(body) => format!(" {{{}}}", self.indent(&self.render(body)?)),
            None => ";".to_string(),
        };
        Ok(format!("{modifiers} {return_type}{name}({params}){body}"))
    }

    /// `T name` or `T name = value`
    fn declaration(&self, decl: &Declaration) -> Result<String> {
        let ty = self.namer().render_type(self.ast, decl.ty)?;
        let name = self.namer().name(&decl.name);
        match decl.value {
            Some(value) => Ok(format!("{ty} {name} = {}", self.exprs.render(value)?)),
            None => Ok(format!("{ty} {name}")),
        }
    }

    fn assign_target(&self, lhs: NodeId) -> Result<String> {
        match self.ast.kind(lhs) {
            NodeKind::Var(_) => self.namer().var(self.ast, lhs),
            NodeKind::Attr(attr) => Ok(format!("({}).{}", self.exprs.render(attr.expr)?, attr.attr.text)),
            _ => Err(RenderError::unhandled_node(self.ast, lhs, "an assignment target")),
        }
    }

    fn if_stmt(&self, stmt: &If) -> Result<String> {
        let mut text = format!(
            "if ({}) {{{}}}",
            self.exprs.render(stmt.predicate)?,
            self.indent(&self.render(stmt.consequence)?)
        );
        if let Some(alternative) = stmt.alternative {
            text.push_str(&format!(" else {{{}}}", self.indent(&self.render(alternative)?)));
        }
        Ok(text)
    }
}
