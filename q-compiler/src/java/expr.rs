//! Expression rendering
//!
//! Most expressions render from their syntax alone. `Var`, `Attr` and `Call`
//! dispatch a second time: on the kind of binding site a variable points to,
//! and on the semantic type the resolver attached to a receiver or callee.
//! Macro calls never survive rendering; the call site is replaced by the
//! macro body rendered under a fresh parameter environment. The environment
//! only rewrites variables bound to declarations (parameters and locals);
//! package, class and function references keep their names.

use crate::backend::CodegenOptions;
use crate::error::RenderError;
use crate::names::{Namer, Result, Substitutions};
use q_ast::{Ast, Attr, BindingSite, Call, MacroDef, NodeId, NodeKind, Var};
use tracing::{debug, trace};

/// Renders expression nodes to single Java expressions
pub struct ExprRenderer<'a> {
    ast: &'a Ast,
    options: &'a CodegenOptions,
    namer: Namer<'a>,
    /// Macros currently being expanded, outermost first
    expanding: &'a [NodeId],
}

impl<'a> ExprRenderer<'a> {
    pub fn new(ast: &'a Ast, options: &'a CodegenOptions) -> Self {
        Self::with_namer(ast, options, Namer::new(&options.builtins))
    }

    pub fn with_namer(ast: &'a Ast, options: &'a CodegenOptions, namer: Namer<'a>) -> Self {
        ExprRenderer {
            ast,
            options,
            namer,
            expanding: &[],
        }
    }

    pub fn namer(&self) -> Namer<'a> {
        self.namer
    }

    pub fn render(&self, id: NodeId) -> Result<String> {
        match self.ast.kind(id) {
            NodeKind::Number(lit) | NodeKind::String(lit) | NodeKind::Fixed(lit) => Ok(lit.text.clone()),
            NodeKind::List(list) => Ok(format!(
                "new java.util.ArrayList(java.util.Arrays.asList(new Object[]{{{}}}))",
                self.render_all(&list.elements)?.join(", ")
            )),
            NodeKind::Native(native) => Ok(self.render_all(&native.parts)?.concat()),
            NodeKind::Type(_) => self.namer.render_type(self.ast, id),
            NodeKind::Var(var) => self.var(id, var),
            NodeKind::Attr(attr) => self.attr(id, attr),
            NodeKind::Call(call) => self.call(id, call),
            NodeKind::Root(_)
            | NodeKind::Package(_)
            | NodeKind::Class(_)
            | NodeKind::Interface(_)
            | NodeKind::Primitive(_)
            | NodeKind::TypeParam(_)
            | NodeKind::Function(_)
            | NodeKind::Method(_)
            | NodeKind::Macro(_)
            | NodeKind::MethodMacro(_)
            | NodeKind::Declaration(_)
            | NodeKind::Field(_)
            | NodeKind::Block(_)
            | NodeKind::Local(_)
            | NodeKind::Return(_)
            | NodeKind::ExprStmt(_)
            | NodeKind::Assign(_)
            | NodeKind::If(_) => Err(RenderError::unhandled_node(self.ast, id, "an expression")),
        }
    }

    fn render_all(&self, ids: &[NodeId]) -> Result<Vec<String>> {
        ids.iter().map(|id| self.render(*id)).collect()
    }

    /// Namer that ignores the expansion scope
    fn builtin_namer(&self) -> Namer<'a> {
        Namer::new(&self.options.builtins)
    }

    fn resolved(&self, id: NodeId) -> Result<NodeId> {
        self.ast
            .resolved(id)
            .ok_or_else(|| RenderError::missing_resolution(self.ast, id))
    }

    /// `<qualifier>.Functions.<member>`, or `Functions.<member>` unqualified
    fn holder_access(&self, qualifier: Option<&str>, member: &str) -> String {
        let holder = &self.options.holder_type;
        match qualifier {
            Some(qualifier) => format!("{qualifier}.{holder}.{member}"),
            None => format!("{holder}.{member}"),
        }
    }

    fn var(&self, id: NodeId, var: &Var) -> Result<String> {
        let definition = var.definition.ok_or_else(|| RenderError::MissingDefinition {
            node: id,
            name: var.name.text.clone(),
            span: self.ast.span(id),
        })?;

        match self.ast.kind(definition).binding_site() {
            Some(BindingSite::Declaration) => Ok(self.namer.name(&var.name)),
            Some(BindingSite::Definition) => Ok(self.builtin_namer().name(&var.name)),
            Some(BindingSite::Function) => {
                let namer = self.builtin_namer();
                let package = namer.package(self.ast, definition);
                Ok(self.holder_access(package.as_deref(), &namer.name(&var.name)))
            }
            None => Err(RenderError::unhandled_type(self.ast, id, "variable", definition)),
        }
    }

    fn attr(&self, id: NodeId, attr: &Attr) -> Result<String> {
        let receiver_type = self.resolved(attr.expr)?;

        match self.ast.kind(receiver_type) {
            NodeKind::Class(_) | NodeKind::Interface(_) | NodeKind::Primitive(_) => {
                Ok(format!("({}).{}", self.render(attr.expr)?, attr.attr.text))
            }
            NodeKind::Package(_) => {
                let receiver = self.render(attr.expr)?;
                let attr_type = self.resolved(id)?;
                if matches!(self.ast.kind(attr_type), NodeKind::Function(_)) {
                    Ok(self.holder_access(Some(&receiver), &attr.attr.text))
                } else {
                    Ok(format!("{}.{}", receiver, attr.attr.text))
                }
            }
            NodeKind::Root(_)
            | NodeKind::TypeParam(_)
            | NodeKind::Function(_)
            | NodeKind::Method(_)
            | NodeKind::Macro(_)
            | NodeKind::MethodMacro(_)
            | NodeKind::Declaration(_)
            | NodeKind::Field(_)
            | NodeKind::Block(_)
            | NodeKind::Local(_)
            | NodeKind::Return(_)
            | NodeKind::ExprStmt(_)
            | NodeKind::Assign(_)
            | NodeKind::If(_)
            | NodeKind::Type(_)
            | NodeKind::Var(_)
            | NodeKind::Call(_)
            | NodeKind::Attr(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::List(_)
            | NodeKind::Native(_)
            | NodeKind::Fixed(_) => Err(RenderError::unhandled_type(
                self.ast,
                id,
                "attribute receiver",
                receiver_type,
            )),
        }
    }

    fn call(&self, id: NodeId, call: &Call) -> Result<String> {
        let callee_type = self.resolved(call.expr)?;

        match self.ast.kind(callee_type) {
            NodeKind::Class(_) | NodeKind::Interface(_) | NodeKind::Primitive(_) => Ok(format!(
                "new {}({})",
                self.render(call.expr)?,
                self.args(call)?
            )),
            NodeKind::Function(_) => Ok(format!("{}({})", self.render(call.expr)?, self.args(call)?)),
            NodeKind::Method(method) => {
                let receiver = self.receiver(id, call, &method.name.text)?;
                Ok(format!("({}).{}({})", receiver, method.name.text, self.args(call)?))
            }
            NodeKind::Macro(mac) => self.expand(id, call, callee_type, mac, None),
            NodeKind::MethodMacro(mac) => {
                let receiver = self.receiver(id, call, &mac.name.text)?;
                self.expand(id, call, callee_type, mac, Some(receiver))
            }
            NodeKind::Root(_)
            | NodeKind::Package(_)
            | NodeKind::TypeParam(_)
            | NodeKind::Declaration(_)
            | NodeKind::Field(_)
            | NodeKind::Block(_)
            | NodeKind::Local(_)
            | NodeKind::Return(_)
            | NodeKind::ExprStmt(_)
            | NodeKind::Assign(_)
            | NodeKind::If(_)
            | NodeKind::Type(_)
            | NodeKind::Var(_)
            | NodeKind::Call(_)
            | NodeKind::Attr(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::List(_)
            | NodeKind::Native(_)
            | NodeKind::Fixed(_) => Err(RenderError::unhandled_type(self.ast, id, "call target", callee_type)),
        }
    }

    fn args(&self, call: &Call) -> Result<String> {
        Ok(self.render_all(&call.args)?.join(", "))
    }

    /// Receiver of a method-style call, rendered on its own
    fn receiver(&self, id: NodeId, call: &Call, name: &str) -> Result<String> {
        match self.ast.kind(call.expr) {
            NodeKind::Attr(attr) => self.render(attr.expr),
            _ => Err(RenderError::MissingReceiver {
                node: id,
                name: name.to_string(),
                span: self.ast.span(id),
            }),
        }
    }

    /// Inline `mac` (node `def`) at call `id`. Formals bind positionally to
    /// the rendered arguments; surplus arguments are dropped.
    fn expand(
        &self,
        id: NodeId,
        call: &Call,
        def: NodeId,
        mac: &MacroDef,
        receiver: Option<String>,
    ) -> Result<String> {
        if self.expanding.contains(&def) {
            return Err(RenderError::RecursiveMacro {
                node: id,
                name: mac.name.text.clone(),
                span: self.ast.span(id),
            });
        }

        let args = self.render_all(&call.args)?;
        if args.len() < mac.params.len() {
            return Err(RenderError::MacroArity {
                node: id,
                name: mac.name.text.clone(),
                expected: mac.params.len(),
                found: args.len(),
                span: self.ast.span(id),
            });
        }
        if args.len() > mac.params.len() {
            debug!(
                macro_name = %mac.name,
                surplus = args.len() - mac.params.len(),
                "ignoring surplus macro arguments"
            );
        }

        let mut env = Substitutions::new();
        if let Some(receiver) = receiver {
            env.insert(self.options.self_name.clone(), receiver);
        }
        for (param, arg) in mac.params.iter().zip(args) {
            let name = self
                .ast
                .kind(*param)
                .name()
                .ok_or_else(|| RenderError::unhandled_node(self.ast, *param, "a macro parameter"))?;
            env.insert(name.text.clone(), arg);
        }

        let mut expanding = self.expanding.to_vec();
        expanding.push(def);

        trace!(macro_name = %mac.name, bindings = env.len(), depth = expanding.len(), "expanding macro");
        let scoped = ExprRenderer {
            ast: self.ast,
            options: self.options,
            namer: Namer::scoped(&self.options.builtins, &env),
            expanding: &expanding,
        };
        scoped.render(mac.body)
    }
}
