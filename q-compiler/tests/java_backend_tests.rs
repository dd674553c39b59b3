//! Golden renderings of complete resolved programs

use q_ast::{Ast, AstBuilder};
use q_compiler::{convenience, CodegenBackend, CompilerBuilder, JavaBackend, RenderError};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn path(segments: &[&str]) -> PathBuf {
    segments.iter().collect()
}

fn render(ast: &Ast) -> BTreeMap<PathBuf, String> {
    convenience::render_java(ast).unwrap()
}

/// `util.helper`, a `demo.Counter` class with a method macro, a `print`
/// macro and a `main` exercising every call shape
fn sample_program() -> Ast {
    let mut b = AstBuilder::new();

    // package util: int helper(int n) { return n; }
    let n_ty = b.ty("int");
    let n = b.param(n_ty, "n");
    let n_ref = b.var_to("n", n);
    let ret = b.ret(Some(n_ref));
    let helper_body = b.block(vec![ret]);
    let helper_ret = b.ty("int");
    let helper = b.function("helper", Some(helper_ret), vec![n], Some(helper_body));
    let util = b.package("util", vec![helper]);

    // class Counter
    let count_ty = b.ty("int");
    let zero = b.number("0");
    let count = b.field(count_ty, "count", Some(zero));

    let self_ty = b.ty("Counter");
    let self_decl = b.param(self_ty, "self");

    let lhs_self = b.var_to("self", self_decl);
    let lhs = b.attr(lhs_self, "count");
    let one_plus = b.fixed("1 + ");
    let rhs_self = b.var_to("self", self_decl);
    let rhs_count = b.attr(rhs_self, "count");
    let rhs = b.native(vec![one_plus, rhs_count]);
    let assign = b.assign(lhs, rhs);
    let bump_body = b.block(vec![assign]);
    let bump_ret = b.ty("void");
    let bump = b.method("bump", Some(bump_ret), vec![], Some(bump_body));

    let macro_self = b.var_to("self", self_decl);
    let test = b.fixed(".count == 0");
    let is_empty_body = b.native(vec![macro_self, test]);
    let is_empty = b.method_macro("isEmpty", vec![], is_empty_body);

    let counter = b.class("Counter", &[], vec![count, bump, is_empty]);
    b.resolve(lhs_self, counter);
    b.resolve(rhs_self, counter);

    // macro print(Object value) = System.out.println(value)
    let obj = b.ty("Object");
    let value = b.param(obj, "value");
    let open = b.fixed("System.out.println(");
    let value_ref = b.var_to("value", value);
    let close = b.fixed(")");
    let print_body = b.native(vec![open, value_ref, close]);
    let print = b.macro_def("print", vec![value], print_body);

    // void main()
    let c_ty = b.ty("Counter");
    let ctor = b.var_to("Counter", counter);
    b.resolve(ctor, counter);
    let new_counter = b.call(ctor, vec![]);
    let c = b.declaration(c_ty, "c", Some(new_counter));
    let local = b.local(c);

    let c_ref = b.var_to("c", c);
    b.resolve(c_ref, counter);
    let bump_ref = b.attr(c_ref, "bump");
    b.resolve(bump_ref, bump);
    let bump_call = b.call(bump_ref, vec![]);
    let bump_stmt = b.expr_stmt(bump_call);

    let c_ref2 = b.var_to("c", c);
    b.resolve(c_ref2, counter);
    let is_empty_ref = b.attr(c_ref2, "isEmpty");
    b.resolve(is_empty_ref, is_empty);
    let cond = b.call(is_empty_ref, vec![]);

    let print_ref = b.var_to("print", print);
    b.resolve(print_ref, print);
    let one = b.number("1");
    let two = b.number("2");
    let list = b.list(vec![one, two]);
    let print_call = b.call(print_ref, vec![list]);
    let then_stmt = b.expr_stmt(print_call);
    let then_block = b.block(vec![then_stmt]);

    let util_ref = b.var_to("util", util);
    b.resolve(util_ref, util);
    let helper_ref = b.attr(util_ref, "helper");
    b.resolve(helper_ref, helper);
    let three = b.number("3");
    let helper_call = b.call(helper_ref, vec![three]);
    let else_stmt = b.expr_stmt(helper_call);
    let else_block = b.block(vec![else_stmt]);

    let branch = b.if_stmt(cond, then_block, Some(else_block));
    let main_body = b.block(vec![local, bump_stmt, branch]);
    let main_ret = b.ty("void");
    let main = b.function("main", Some(main_ret), vec![], Some(main_body));

    let demo = b.package("demo", vec![counter, print, main]);
    b.finish(vec![util, demo]).unwrap()
}

#[test]
fn test_package_with_empty_main() {
    let mut b = AstBuilder::new();
    let body = b.block(vec![]);
    let main = b.function("main", None, vec![], Some(body));
    let package = b.package("p", vec![main]);
    let ast = b.finish(vec![package]).unwrap();

    let files = render(&ast);

    assert_eq!(files.len(), 1);
    assert_eq!(
        files[&path(&["p", "Functions.java"])],
        "package p;\n\npublic class Functions {\n    public static main() {}\n    public static void main(String[] args) {\n        main();\n    }\n}"
    );
}

#[test]
fn test_class_field_uses_builtin_type() {
    let mut b = AstBuilder::new();
    let int = b.primitive("int");
    let ty = b.ty("int");
    b.resolve(ty, int);
    let field = b.field(ty, "x", None);
    let class = b.class("C", &[], vec![field]);
    let inner = b.package("q", vec![class]);
    let outer = b.package("p", vec![inner]);
    let ast = b.finish(vec![int, outer]).unwrap();

    let files = render(&ast);

    assert_eq!(files.len(), 1);
    assert_eq!(
        files[&path(&["p", "q", "C.java"])],
        "package p.q;\n\npublic class C {\n    Integer x;\n}"
    );
}

#[test]
fn test_zero_parameter_macro_call() {
    let mut b = AstBuilder::new();
    let one = b.number("1");
    let mac = b.macro_def("one", vec![], one);
    let callee = b.var_to("one", mac);
    b.resolve(callee, mac);
    let call = b.call(callee, vec![]);
    let ret = b.ret(Some(call));
    let body = b.block(vec![ret]);
    let ret_ty = b.ty("int");
    let answer = b.function("answer", Some(ret_ty), vec![], Some(body));
    let ast = b.finish(vec![mac, answer]).unwrap();

    let files = render(&ast);

    assert_eq!(
        files[&path(&["Functions.java"])],
        "public class Functions {\n    public static Integer answer() {\n        return 1;\n    }\n}"
    );
}

#[test]
fn test_sample_program() {
    let files = render(&sample_program());

    assert_eq!(files.len(), 3);
    assert_eq!(
        files[&path(&["util", "Functions.java"])],
        "package util;\n\n\
         public class Functions {\n\
         \x20   public static Integer helper(Integer n) {\n\
         \x20       return n;\n\
         \x20   }\n\
         }"
    );
    assert_eq!(
        files[&path(&["demo", "Counter.java"])],
        "package demo;\n\n\
         public class Counter {\n\
         \x20   Integer count = 0;\n\
         \x20   public void bump() {\n\
         \x20       (this).count = 1 + (this).count;\n\
         \x20   }\n\
         }"
    );
    assert_eq!(
        files[&path(&["demo", "Functions.java"])],
        "package demo;\n\n\
         public class Functions {\n\
         \x20   public static void main() {\n\
         \x20       Counter c = new Counter();\n\
         \x20       (c).bump();\n\
         \x20       if (c.count == 0) {\n\
         \x20           System.out.println(new java.util.ArrayList(java.util.Arrays.asList(new Object[]{1, 2})));\n\
         \x20       } else {\n\
         \x20           util.Functions.helper(3);\n\
         \x20       }\n\
         \x20   }\n\
         \x20   public static void main(String[] args) {\n\
         \x20       main();\n\
         \x20   }\n\
         }"
    );
}

#[test]
fn test_no_macro_call_survives() {
    let files = render(&sample_program());

    for text in files.values() {
        assert!(!text.contains("print("), "macro call left in:\n{text}");
        assert!(!text.contains("isEmpty"), "method macro left in:\n{text}");
    }
}

#[test]
fn test_rendering_is_deterministic() {
    let ast = sample_program();
    let first = render(&ast);
    let second = render(&ast);
    assert_eq!(first, second);

    // A tree that went through JSON renders identically
    let reloaded = Ast::from_json(&ast.to_json().unwrap()).unwrap();
    assert_eq!(render(&reloaded), first);
}

#[test]
fn test_functions_keep_encounter_order() {
    let mut b = AstBuilder::new();
    let zeta = b.function("zeta", None, vec![], None);
    let alpha = b.function("alpha", None, vec![], None);
    let class = b.class("Middle", &[], vec![]);
    let body = b.block(vec![]);
    let main = b.function("main", None, vec![], Some(body));
    let package = b.package("p", vec![zeta, class, alpha, main]);
    let ast = b.finish(vec![package]).unwrap();

    let files = render(&ast);
    let holder = &files[&path(&["p", "Functions.java"])];

    let positions: Vec<usize> = [
        "public static zeta();",
        "public static alpha();",
        "public static main() {}",
        "public static void main(String[] args)",
    ]
    .iter()
    .map(|needle| holder.find(needle).unwrap())
    .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(holder.matches("public static zeta();").count(), 1);
}

#[test]
fn test_entry_point_only_with_main() {
    let mut b = AstBuilder::new();
    let helper = b.function("helper", None, vec![], None);
    let library = b.package("lib", vec![helper]);
    let body = b.block(vec![]);
    let main = b.function("main", None, vec![], Some(body));
    let app = b.package("app", vec![main]);
    let ast = b.finish(vec![library, app]).unwrap();

    let files = render(&ast);
    let entry = "public static void main(String[] args)";

    assert!(!files[&path(&["lib", "Functions.java"])].contains(entry));
    assert!(files[&path(&["app", "Functions.java"])].contains(entry));
}

#[test]
fn test_generic_interface_and_class_parameters() {
    let mut b = AstBuilder::new();
    let t = b.ty("T");
    let param = b.param(t, "item");
    let method = b.method("accept", None, vec![param], None);
    let interface = b.interface("Sink", &["T"], vec![method]);
    let key = b.ty("String");
    let value = b.ty("int");
    let map_ty = b.generic("Map", vec![key, value]);
    let entries = b.field(map_ty, "entries", None);
    let class = b.class("Table", &["K", "V"], vec![entries]);
    let package = b.package("store", vec![interface, class]);
    let ast = b.finish(vec![package]).unwrap();

    let files = render(&ast);

    assert_eq!(
        files[&path(&["store", "Sink.java"])],
        "package store;\n\npublic interface Sink<T> {\n    public accept(T item);\n}"
    );
    assert_eq!(
        files[&path(&["store", "Table.java"])],
        "package store;\n\npublic class Table<K, V> {\n    java.util.HashMap<String,Integer> entries;\n}"
    );
}

#[test]
fn test_builder_settings_reach_output() {
    let compiler = CompilerBuilder::new()
        .indent_width(2)
        .holder_type("Statics")
        .builtin("Object", "java.lang.Object")
        .emit_runtime(true)
        .build();

    let files = compiler.render(&sample_program()).unwrap();

    assert!(files.contains_key(&path(&["Builtins.java"])));
    let holder = &files[&path(&["util", "Statics.java"])];
    assert!(holder.contains("\n  public static Integer helper(Integer n) {\n    return n;\n  }\n"));

    let demo = &files[&path(&["demo", "Statics.java"])];
    assert!(demo.contains("util.Statics.helper(3);"));
}

#[test]
fn test_missing_resolution_stops_rendering() {
    let mut b = AstBuilder::new();
    let helper = b.function("helper", None, vec![], None);
    let callee = b.var_to("helper", helper);
    let call = b.call(callee, vec![]);
    let stmt = b.expr_stmt(call);
    let body = b.block(vec![stmt]);
    let main = b.function("main", None, vec![], Some(body));
    let ast = b.finish(vec![helper, main]).unwrap();

    let err = JavaBackend::new()
        .project(&ast, &JavaBackend::default_options())
        .unwrap_err();
    assert!(matches!(err, RenderError::MissingResolution { .. }));
    assert_eq!(err.node(), callee);

    assert!(JavaBackend::new()
        .generate_code(&ast, &JavaBackend::default_options())
        .is_err());
}
