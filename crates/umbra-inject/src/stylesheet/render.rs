use super::params::RenderParams;
use super::parse::{Node, Template};

/// Parse and render `template_text` in one step.
pub fn render(template_text: &str, params: &RenderParams) -> String {
    Template::parse(template_text).render(params)
}

impl Template {
    /// Render against `params`.
    ///
    /// Known placeholders are replaced, minus a leading `#`, so templates
    /// write colours as `#{default_background_color}`. Unknown ones are left
    /// exactly as written.
    pub fn render(&self, params: &RenderParams) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, params, &mut out);
        out
    }
}

fn render_nodes(nodes: &[Node], params: &RenderParams, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Placeholder(key) => push_value(key, params, out),
            Node::Branch { tag, body } => {
                push_value(&tag.start_key(), params, out);
                render_nodes(body, params, out);
                push_value(&tag.end_key(), params, out);
            }
        }
    }
}

fn push_value(key: &str, params: &RenderParams, out: &mut String) {
    match params.get(key) {
        Some(value) => out.push_str(value.strip_prefix('#').unwrap_or(value)),
        None => {
            out.push('{');
            out.push_str(key);
            out.push('}');
        }
    }
}
