use std::sync::LazyLock;

use regex::Regex;

use super::params::BranchTag;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Node {
    Text(String),
    Placeholder(String),
    Branch { tag: BranchTag, body: Vec<Node> },
}

/// A parsed stylesheet template.
///
/// Branch tags must nest properly. A start tag without a matching end, or
/// an end tag that closes nothing, is kept as a plain placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub(super) nodes: Vec<Node>,
}

struct OpenBranch {
    tag: BranchTag,
    body: Vec<Node>,
}

impl Template {
    pub fn parse(text: &str) -> Self {
        let mut root: Vec<Node> = Vec::new();
        let mut open: Vec<OpenBranch> = Vec::new();
        let mut last = 0;

        for caps in TOKEN_RE.captures_iter(text) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                current(&mut root, &mut open).push(Node::Text(text[last..whole.start()].to_string()));
            }
            last = whole.end();

            let key = key.as_str();
            match BranchTag::from_key(key) {
                Some((tag, true)) => open.push(OpenBranch {
                    tag,
                    body: Vec::new(),
                }),
                Some((tag, false)) if open.last().is_some_and(|b| b.tag == tag) => {
                    if let Some(branch) = open.pop() {
                        current(&mut root, &mut open).push(Node::Branch {
                            tag: branch.tag,
                            body: branch.body,
                        });
                    }
                }
                _ => current(&mut root, &mut open).push(Node::Placeholder(key.to_string())),
            }
        }
        if last < text.len() {
            current(&mut root, &mut open).push(Node::Text(text[last..].to_string()));
        }

        // Unclosed branches degrade to a placeholder followed by their body.
        while let Some(branch) = open.pop() {
            let target = current(&mut root, &mut open);
            target.push(Node::Placeholder(branch.tag.start_key()));
            target.extend(branch.body);
        }

        Self { nodes: root }
    }

    /// Every placeholder key, in first-seen order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        collect_placeholders(&self.nodes, &mut keys);
        keys
    }
}

fn current<'a>(root: &'a mut Vec<Node>, open: &'a mut [OpenBranch]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(branch) => &mut branch.body,
        None => root,
    }
}

fn collect_placeholders<'a>(nodes: &'a [Node], keys: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Placeholder(key) => {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
            Node::Branch { body, .. } => collect_placeholders(body, keys),
        }
    }
}
