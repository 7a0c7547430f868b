//! HTML-side extraction of the embedded digraph and modal contents.
//!
//! The report is generated markup, not a stable API: extraction keys off
//! the literal `renderDot` call marker and the `dep-modal-container`
//! class, the two anchors the generator has kept stable.

use super::{GraphError, GraphResult};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;

const DIGRAPH_MARKER: &str = ".renderDot(`strict digraph";
const MODAL_SUFFIX: &str = "_modal";

static RENDER_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.renderDot\(`([^`]*)`\)").unwrap());
static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static MODAL_DIV: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.dep-modal-container").unwrap());

/// Pulls the backtick-delimited digraph payload out of the first script
/// block carrying the render marker.
pub(super) fn digraph_payload(document: &Html) -> GraphResult<String> {
    for script in document.select(&SCRIPT) {
        let text: String = script.text().collect();
        if !text.contains(DIGRAPH_MARKER) {
            continue;
        }
        if let Some(caps) = RENDER_DOT.captures(&text) {
            return Ok(caps[1].to_string());
        }
    }
    Err(GraphError::GraphNotFound)
}

/// Collects per-node free-text content from the modal containers.
///
/// Container ids carry a fixed `_modal` suffix which is stripped to
/// recover the node id; a container wrapping anything but exactly one
/// element is malformed output from the generator.
pub(super) fn modal_contents(document: &Html) -> GraphResult<HashMap<String, String>> {
    let mut contents = HashMap::new();

    for div in document.select(&MODAL_DIV) {
        let Some(div_id) = div.value().attr("id") else {
            continue;
        };

        let children = div
            .children()
            .filter(|child| child.value().is_element())
            .count();
        if children != 1 {
            return Err(GraphError::ModalShape {
                id: div_id.to_string(),
                children,
            });
        }

        match div_id.strip_suffix(MODAL_SUFFIX) {
            Some(node_id) => {
                contents.insert(node_id.to_string(), div.inner_html());
            }
            None => {
                return Err(GraphError::ModalIdSuffix {
                    id: div_id.to_string(),
                })
            }
        }
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::{digraph_payload, modal_contents};
    use crate::graph::GraphError;
    use scraper::Html;

    fn document(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn payload_found_in_marked_script() {
        let html = document(
            "<script>graph.renderDot(`strict digraph \"\" { \"a\" [shape=box]; }`)</script>",
        );
        let payload = digraph_payload(&html).expect("payload should extract");
        assert!(payload.starts_with("strict digraph \"\" {"));
    }

    #[test]
    fn missing_marker_is_graph_not_found() {
        let html = document("<script>console.log('no graph here')</script>");
        assert_eq!(digraph_payload(&html), Err(GraphError::GraphNotFound));
    }

    #[test]
    fn modal_ids_are_stripped() {
        let html = document(
            "<div class=\"dep-modal-container\" id=\"thm_main_modal\"><p>body</p></div>",
        );
        let contents = modal_contents(&html).expect("modal should extract");
        assert_eq!(contents.len(), 1);
        assert!(contents["thm_main"].contains("body"));
    }

    #[test]
    fn modal_without_suffix_is_fatal() {
        let html =
            document("<div class=\"dep-modal-container\" id=\"thm_main\"><p>body</p></div>");
        assert_eq!(
            modal_contents(&html),
            Err(GraphError::ModalIdSuffix {
                id: "thm_main".to_string()
            })
        );
    }

    #[test]
    fn modal_with_two_children_is_fatal() {
        let html = document(
            "<div class=\"dep-modal-container\" id=\"x_modal\"><p>a</p><p>b</p></div>",
        );
        assert_eq!(
            modal_contents(&html),
            Err(GraphError::ModalShape {
                id: "x_modal".to_string(),
                children: 2
            })
        );
    }
}
