//! Interactive HTML rendering.
//!
//! Output is a self-contained fragment: an inline SVG with the edges,
//! invisible hover targets at edge midpoints, colored node markers, the
//! graph payload as JSON, and a small script that toggles a highlight of
//! the clicked node and its direct neighbours.

use std::fmt::Write as _;

use kgx_core::{Entity, KgError, Relationship, Result};

use crate::graph::EntityGraph;
use crate::layout::{Position, SpringLayout};
use crate::payload::GraphPayload;

/// Shown instead of an empty canvas
pub const EMPTY_GRAPH_MESSAGE: &str = "No entities found";

const HIGHLIGHT_SCRIPT: &str = r#"(function () {
  var root = document.currentScript.parentElement;
  var data = JSON.parse(root.querySelector('.kgx-graph-data').textContent);
  var markers = root.querySelectorAll('.kgx-node circle');
  var highlighted = false;

  function dim(hex) {
    var r = parseInt(hex.slice(1, 3), 16);
    var g = parseInt(hex.slice(3, 5), 16);
    var b = parseInt(hex.slice(5, 7), 16);
    return 'rgba(' + r + ',' + g + ',' + b + ',0.3)';
  }

  function reset() {
    markers.forEach(function (m, i) { m.setAttribute('fill', data.originalColors[i]); });
    highlighted = false;
  }

  function highlight(name) {
    var keep = {};
    keep[name] = true;
    (data.adjacency[name] || []).forEach(function (n) { keep[n] = true; });
    markers.forEach(function (m, i) {
      var color = data.originalColors[i];
      m.setAttribute('fill', keep[data.nodes[i]] ? color : dim(color));
    });
    highlighted = true;
  }

  function toggle(name) {
    if (highlighted) { reset(); } else { highlight(name); }
  }

  markers.forEach(function (m, i) {
    m.addEventListener('click', function () { toggle(data.nodes[i]); });
  });
  root.querySelectorAll('.kgx-edge-hit').forEach(function (hit) {
    hit.addEventListener('click', function () { toggle(hit.getAttribute('data-source')); });
  });
  root.addEventListener('dblclick', function () { if (highlighted) { reset(); } });
})();"#;

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inline error shown in place of the graph
pub fn diagnostic(err: &KgError) -> String {
    format!(
        "<div class=\"kgx-graph-error\">Error generating graph: {}</div>",
        escape_html(&err.to_string())
    )
}

/// SVG renderer
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    pub width: u32,
    pub height: u32,
    pub node_radius: f64,
    /// Hover target radius at edge midpoints
    pub hit_radius: f64,
    pub margin: f64,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            node_radius: 12.0,
            hit_radius: 10.0,
            margin: 60.0,
        }
    }
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a [-1, 1] layout position onto the canvas
    fn project(&self, position: Position) -> (f64, f64) {
        let w = f64::from(self.width) - 2.0 * self.margin;
        let h = f64::from(self.height) - 2.0 * self.margin;
        (
            self.margin + (position[0] + 1.0) / 2.0 * w,
            self.margin + (1.0 - position[1]) / 2.0 * h,
        )
    }

    fn point(&self, payload: &GraphPayload, text: &str) -> Result<(f64, f64)> {
        payload
            .position(text)
            .map(|p| self.project(p))
            .ok_or_else(|| KgError::RenderError(format!("no position for node '{text}'")))
    }

    /// Render the payload as an HTML fragment
    pub fn render(&self, payload: &GraphPayload) -> Result<String> {
        if payload.is_empty() {
            return Ok(format!(
                "<div class=\"kgx-graph-empty\">{EMPTY_GRAPH_MESSAGE}</div>"
            ));
        }
        if payload.original_colors.len() != payload.nodes.len() {
            return Err(KgError::RenderError(
                "node colors do not line up with nodes".to_string(),
            ));
        }

        let mut svg = String::new();
        let fmt_err = |e: std::fmt::Error| KgError::RenderError(e.to_string());

        write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">",
            w = self.width,
            h = self.height
        )
        .map_err(fmt_err)?;

        svg.push_str("<g class=\"kgx-edges\" stroke=\"#888888\" stroke-width=\"1.5\">");
        for relation in &payload.relations {
            let (x1, y1) = self.point(payload, &relation.source)?;
            let (x2, y2) = self.point(payload, &relation.target)?;
            write!(
                svg,
                "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\"/>"
            )
            .map_err(fmt_err)?;
        }
        svg.push_str("</g>");

        svg.push_str("<g class=\"kgx-edge-hits\">");
        for relation in &payload.relations {
            let (x1, y1) = self.point(payload, &relation.source)?;
            let (x2, y2) = self.point(payload, &relation.target)?;
            write!(
                svg,
                "<circle class=\"kgx-edge-hit\" data-source=\"{source}\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r}\" fill=\"transparent\" pointer-events=\"all\"><title>{source} ←→ {target}: {label}</title></circle>",
                source = escape_html(&relation.source),
                target = escape_html(&relation.target),
                label = escape_html(&relation.label),
                cx = (x1 + x2) / 2.0,
                cy = (y1 + y2) / 2.0,
                r = self.hit_radius,
            )
            .map_err(fmt_err)?;
        }
        svg.push_str("</g>");

        svg.push_str("<g class=\"kgx-nodes\">");
        for (i, (node, color)) in payload
            .nodes
            .iter()
            .zip(&payload.original_colors)
            .enumerate()
        {
            let (x, y) = self.point(payload, node)?;
            let category = payload.node_types.get(node).map(String::as_str).unwrap_or("");
            let text = escape_html(node);
            write!(
                svg,
                "<g class=\"kgx-node\" data-index=\"{i}\"><circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{r}\" fill=\"{color}\" stroke=\"#ffffff\" stroke-width=\"1.5\" style=\"cursor:pointer\"><title>{text} ({category})</title></circle><text x=\"{x:.2}\" y=\"{ly:.2}\" text-anchor=\"middle\" font-size=\"12\">{text}</text></g>",
                r = self.node_radius,
                color = escape_html(color),
                category = escape_html(category),
                ly = y + self.node_radius + 14.0,
            )
            .map_err(fmt_err)?;
        }
        svg.push_str("</g></svg>");

        // "</" inside the JSON would close the script element early
        let data = serde_json::to_string(payload)?.replace("</", "<\\/");

        Ok(format!(
            "<div class=\"kgx-graph\">{svg}<script type=\"application/json\" class=\"kgx-graph-data\">{data}</script><script>{HIGHLIGHT_SCRIPT}</script></div>"
        ))
    }

    /// Build, lay out, and render in one step
    pub fn render_graph(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
        layout: &SpringLayout,
    ) -> Result<String> {
        let graph = EntityGraph::build(entities, relationships);
        let payload = GraphPayload::from_graph(&graph, layout)?;
        self.render(&payload)
    }

    /// Like [`GraphRenderer::render_graph`], but never fails: errors
    /// become an inline diagnostic
    pub fn render_or_diagnostic(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
        layout: &SpringLayout,
    ) -> String {
        self.render_graph(entities, relationships, layout)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Graph rendering failed");
                diagnostic(&e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_core::{EntityCategory, RelationOrigin};

    fn render(entities: &[Entity], relationships: &[Relationship]) -> String {
        GraphRenderer::default()
            .render_graph(entities, relationships, &SpringLayout::default())
            .unwrap()
    }

    #[test]
    fn test_empty_graph_placeholder() {
        let html = render(&[], &[]);
        assert!(html.contains(EMPTY_GRAPH_MESSAGE));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_render_nodes_edges_and_script() {
        let entities = vec![
            Entity::new("Elon Musk", EntityCategory::Person),
            Entity::new("SpaceX", EntityCategory::Organization),
        ];
        let relationships = vec![Relationship::new(
            "Elon Musk",
            "SpaceX",
            "founded",
            RelationOrigin::Founding,
        )];
        let html = render(&entities, &relationships);

        assert_eq!(html.matches("class=\"kgx-node\"").count(), 2);
        assert_eq!(html.matches("<line ").count(), 1);
        assert!(html.contains("Elon Musk ←→ SpaceX: founded"));
        assert!(html.contains("fill=\"#FF6B6B\""));
        assert!(html.contains("fill=\"#4ECDC4\""));
        assert!(html.contains("\"originalColors\""));
        assert!(html.contains("0.3)"));
    }

    #[test]
    fn test_render_escapes_text() {
        let entities = vec![
            Entity::new("<b>Bold</b> & Co", EntityCategory::Organization),
            Entity::new("Ada", EntityCategory::Person),
        ];
        let html = render(&entities, &[]);

        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt; &amp; Co"));
        assert!(!html.contains("<b>Bold</b>"));
        assert!(html.contains("<\\/b>"));
    }

    #[test]
    fn test_misaligned_payload_is_diagnosed() {
        let payload = GraphPayload {
            nodes: vec!["A".to_string()],
            ..GraphPayload::default()
        };
        let err = GraphRenderer::default().render(&payload).unwrap_err();
        let html = diagnostic(&err);
        assert!(html.starts_with("<div class=\"kgx-graph-error\">Error generating graph:"));
    }

    #[test]
    fn test_render_or_diagnostic_succeeds_on_plain_input() {
        let entities = vec![Entity::new("Paris", EntityCategory::Place)];
        let html = GraphRenderer::default().render_or_diagnostic(
            &entities,
            &[],
            &SpringLayout::default(),
        );
        assert!(html.contains("Paris"));
        assert!(!html.contains("Error generating graph"));
    }
}
