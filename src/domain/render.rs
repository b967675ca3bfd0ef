//! Human-readable views of a [`KnowledgeTree`]

use termtree::Tree;
use tracing::instrument;

use super::tree::{KnowledgeTree, NodeId};

/// Deepest level drawn by [`TreeDisplay::to_termtree`]; questions below it are elided.
pub const MAX_DRAWN_DEPTH: usize = 64;

/// Marks a question whose subtrees were not drawn.
pub const ELIDED: &str = "[...]";

pub trait TreeDisplay {
    /// Box-drawing view: questions marked `?`, branches prefixed `no:`/`yes:`.
    /// Only the top [`MAX_DRAWN_DEPTH`] levels are drawn.
    fn to_termtree(&self) -> Tree<String>;

    /// Parenthesized in-order form: `(<no subtree> text <yes subtree>)`.
    /// Built without recursion, so it works for arbitrarily deep trees.
    fn to_inline(&self) -> String;
}

impl TreeDisplay for KnowledgeTree {
    #[instrument(level = "debug", skip(self))]
    fn to_termtree(&self) -> Tree<String> {
        fn build(tree: &KnowledgeTree, id: NodeId, label: String, depth: usize) -> Tree<String> {
            let Some(node) = tree.node(id) else {
                return Tree::new(label);
            };
            match node.branches() {
                Some(_) if depth >= MAX_DRAWN_DEPTH => {
                    Tree::new(format!("{label}? {} {}", node.text(), ELIDED))
                }
                Some((no, yes)) => Tree::new(format!("{label}? {}", node.text())).with_leaves([
                    build(tree, no, "no: ".to_string(), depth + 1),
                    build(tree, yes, "yes: ".to_string(), depth + 1),
                ]),
                None => Tree::new(format!("{label}{}", node.text())),
            }
        }

        build(self, self.root(), String::new(), 1)
    }

    fn to_inline(&self) -> String {
        enum Step<'a> {
            Enter(NodeId),
            Text(&'a str),
            Close,
        }

        let mut out = String::new();
        let mut stack = vec![Step::Enter(self.root())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let Some(node) = self.node(id) else { continue };
                    out.push('(');
                    match node.branches() {
                        Some((no, yes)) => stack.extend([
                            Step::Close,
                            Step::Enter(yes),
                            Step::Text(node.text()),
                            Step::Enter(no),
                        ]),
                        None => {
                            out.push_str(node.text());
                            out.push(')');
                        }
                    }
                }
                Step::Text(text) => out.push_str(text),
                Step::Close => out.push(')'),
            }
        }
        out
    }
}
