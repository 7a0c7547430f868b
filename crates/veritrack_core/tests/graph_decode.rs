use veritrack_core::{
    decode_document, GraphError, NodeKind, TermStatus, TypeStatus,
};

fn report(dot: &str, modals: &str) -> String {
    format!(
        "<html><body>\
         <div id=\"graph\"></div>\
         {modals}\
         <script>d3.select(\"#graph\").graphviz().renderDot(`{dot}`)</script>\
         </body></html>"
    )
}

const DOT: &str = "strict digraph \"\" {\
    graph [bgcolor=transparent];\
    node [penwidth=1.8];\
    edge [arrowhead=vee];\
    \"def_group\" [color=green, fillcolor=\"#B0ECA3\", label=def_group, shape=box, style=filled];\
    \"thm_assoc\" [color=green, fillcolor=\"#9CEC8B\", label=thm_assoc, shape=ellipse, style=filled];\
    \"thm_main\" [color=blue, fillcolor=\"#A3D6FF\", label=thm_main, shape=ellipse, style=filled];\
    \"thm_done\" [color=darkgreen, fillcolor=\"#1CAC78\", label=thm_done, shape=ellipse, style=filled];\
    \"thm_assoc\" -> \"def_group\" [style=dashed];\
    \"thm_main\" -> \"def_group\" [style=dashed];\
    \"thm_main\" -> \"thm_assoc\";\
    \"thm_main\" -> \"thm_done\";\
}";

#[test]
fn full_report_decodes_with_classification_and_content() {
    let modals = "<div class=\"dep-modal-container\" id=\"thm_main_modal\">\
                  <div>If G is a group then the main result holds.</div></div>";
    let nodes = decode_document(&report(DOT, modals)).unwrap();
    assert_eq!(nodes.len(), 4);

    let def = &nodes["def_group"];
    assert_eq!(def.kind, NodeKind::Definition);
    assert_eq!(def.type_status, TypeStatus::Stated);
    assert_eq!(def.term_status, TermStatus::Defined);

    let main = &nodes["thm_main"];
    assert_eq!(main.kind, NodeKind::Theorem);
    assert_eq!(main.type_status, TypeStatus::CanState);
    assert_eq!(main.term_status, TermStatus::CanProve);
    assert_eq!(main.type_dependencies, vec!["def_group"]);
    assert_eq!(main.term_dependencies, vec!["thm_assoc", "thm_done"]);
    assert!(main.content.contains("main result"));

    let done = &nodes["thm_done"];
    assert_eq!(done.type_status, TypeStatus::Mathlib);
    assert_eq!(done.term_status, TermStatus::FullyProved);
    assert!(done.is_verified());
    assert!(!main.is_verified());
}

#[test]
fn nodes_without_modal_have_empty_content() {
    let nodes = decode_document(&report(DOT, "")).unwrap();
    assert!(nodes["thm_assoc"].content.is_empty());
}

#[test]
fn unmapped_colors_classify_as_unrecognized() {
    let dot = "strict digraph \"\" {\
        \"n\" [color=purple, fillcolor=\"#123456\", label=n, shape=box, style=filled];\
    }";
    let nodes = decode_document(&report(dot, "")).unwrap();
    assert_eq!(nodes["n"].type_status, TypeStatus::Unrecognized);
    assert_eq!(nodes["n"].term_status, TermStatus::Unrecognized);
}

#[test]
fn absent_color_attributes_classify_as_unknown() {
    let dot = "strict digraph \"\" {\
        \"n\" [label=n, shape=box];\
    }";
    let nodes = decode_document(&report(dot, "")).unwrap();
    assert_eq!(nodes["n"].type_status, TypeStatus::Unknown);
    assert_eq!(nodes["n"].term_status, TermStatus::Unknown);
}

#[test]
fn document_without_graph_is_not_found() {
    let html = "<html><body><script>console.log(1)</script></body></html>";
    assert_eq!(decode_document(html), Err(GraphError::GraphNotFound));
}

#[test]
fn dangling_edge_aborts_the_decode() {
    let dot = "strict digraph \"\" {\
        \"a\" [label=a, shape=box];\
        \"a\" -> \"ghost\";\
    }";
    assert_eq!(
        decode_document(&report(dot, "")),
        Err(GraphError::DanglingEdge {
            source: "a".to_string(),
            target: "ghost".to_string()
        })
    );
}

#[test]
fn modal_without_node_aborts_the_decode() {
    let modals =
        "<div class=\"dep-modal-container\" id=\"ghost_modal\"><div>orphan</div></div>";
    let dot = "strict digraph \"\" { \"a\" [label=a, shape=box]; }";
    assert_eq!(
        decode_document(&report(dot, modals)),
        Err(GraphError::ModalWithoutNode {
            id: "ghost".to_string()
        })
    );
}

#[test]
fn unknown_shape_and_label_mismatch_are_fatal() {
    let bad_shape = "strict digraph \"\" { \"a\" [label=a, shape=diamond]; }";
    assert_eq!(
        decode_document(&report(bad_shape, "")),
        Err(GraphError::UnknownShape {
            node: "a".to_string(),
            shape: "diamond".to_string()
        })
    );

    let bad_label = "strict digraph \"\" { \"a\" [label=b, shape=box]; }";
    assert_eq!(
        decode_document(&report(bad_label, "")),
        Err(GraphError::LabelMismatch {
            node: "a".to_string(),
            label: "b".to_string()
        })
    );
}
