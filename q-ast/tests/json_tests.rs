//! Exchanging resolved trees as JSON

use q_ast::{Ast, AstBuilder, AstError, NodeId, NodeKind};
use tempfile::TempDir;

#[test]
fn test_load_handwritten_tree() {
    let json = r#"{
        "nodes": [
            { "kind": { "kind": "Primitive", "name": { "text": "int" } } },
            { "kind": { "kind": "Type", "path": [ { "text": "int" } ] }, "resolved": 0 },
            { "kind": { "kind": "Field", "type": 1, "name": { "text": "x" } } },
            { "kind": { "kind": "Class", "name": { "text": "C" }, "definitions": [2] } },
            { "kind": { "kind": "Package", "name": { "text": "p" }, "definitions": [3] } },
            { "kind": { "kind": "Root", "definitions": [0, 4] } }
        ],
        "root": 5
    }"#;

    let ast = Ast::from_json(json).unwrap();

    assert_eq!(ast.len(), 6);
    assert_eq!(ast.root(), NodeId(5));
    assert_eq!(ast.resolved(NodeId(1)), Some(NodeId(0)));
    // Parent links are derived, not read
    assert_eq!(ast.parent(NodeId(2)), Some(NodeId(3)));
    assert_eq!(ast.parent(NodeId(4)), Some(NodeId(5)));
    assert!(matches!(ast.kind(NodeId(3)), NodeKind::Class(_)));
}

#[test]
fn test_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");

    let mut b = AstBuilder::new();
    let one = b.number("1");
    let mac = b.macro_def("one", vec![], one);
    let callee = b.var_to("one", mac);
    b.resolve(callee, mac);
    let call = b.call(callee, vec![]);
    let stmt = b.expr_stmt(call);
    let body = b.block(vec![stmt]);
    let main = b.function("main", None, vec![], Some(body));
    let package = b.package("p", vec![mac, main]);
    let ast = b.finish(vec![package]).unwrap();

    std::fs::write(&path, ast.to_json().unwrap()).unwrap();
    let loaded = Ast::from_file(&path).unwrap();

    assert_eq!(loaded, ast);
}

#[test]
fn test_malformed_json_is_reported() {
    let err = Ast::from_json("{ \"nodes\": [] ").unwrap_err();
    assert!(matches!(err, AstError::Json(_)));
}
