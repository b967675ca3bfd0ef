//! Arena-backed binary decision tree.
//!
//! Every node lives in a generational arena owned by [`KnowledgeTree`] and is addressed
//! by a [`NodeId`]. A question node owns exactly two children, an animal node none. The
//! child pair lives inside [`NodeKind::Question`], so a half-built question cannot be
//! represented.

use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use super::entities::Answer;
use super::error::{DomainError, DomainResult};

/// Animal a fresh tree starts out guessing.
pub const DEFAULT_SEED: &str = "cat";

/// Handle to a node inside one [`KnowledgeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// Whether a node asks a question or names an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Terminal guess
    Animal,
    /// Yes/no question with both branches
    Question { no: NodeId, yes: NodeId },
}

/// A question prompt or an animal name, plus the node's branches.
#[derive(Debug, Clone)]
pub struct Node {
    text: String,
    kind: NodeKind,
}

impl Node {
    fn animal(text: String) -> Self {
        Self {
            text,
            kind: NodeKind::Animal,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_question(&self) -> bool {
        matches!(self.kind, NodeKind::Question { .. })
    }

    pub fn is_animal(&self) -> bool {
        matches!(self.kind, NodeKind::Animal)
    }

    /// Branches as `(no, yes)`, None for an animal leaf.
    pub fn branches(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Question { no, yes } => Some((no, yes)),
            NodeKind::Animal => None,
        }
    }

    /// The child reached by answering this node's question.
    pub fn follow(&self, answer: Answer) -> Option<NodeId> {
        self.branches().map(|(no, yes)| match answer {
            Answer::Yes => yes,
            Answer::No => no,
        })
    }
}

/// Checks that `text` can be stored in a node: not blank, exactly one line.
pub fn validate_text(text: String) -> DomainResult<String> {
    if text.trim().is_empty() {
        return Err(DomainError::InvalidText {
            text,
            reason: "text must not be empty",
        });
    }
    if text.contains(['\n', '\r']) {
        return Err(DomainError::InvalidText {
            text,
            reason: "text must be a single line",
        });
    }
    Ok(text)
}

/// The game's knowledge: a strict binary tree of questions with animals at the leaves.
///
/// The tree only ever grows. The node count is the arena length, so it always matches
/// the number of nodes reachable from the root.
#[derive(Debug, Clone)]
pub struct KnowledgeTree {
    arena: Arena<Node>,
    root: NodeId,
}

impl Default for KnowledgeTree {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED.to_string())
    }
}

impl KnowledgeTree {
    /// Single-leaf tree guessing `seed`.
    pub fn with_seed(seed: impl Into<String>) -> DomainResult<Self> {
        let seed = validate_text(seed.into())?;
        Ok(Self::seeded(seed))
    }

    fn seeded(seed: String) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node::animal(seed)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Turns the animal leaf `leaf` into a question that tells it apart from `animal`.
    ///
    /// Afterwards `leaf` holds `question`, its `no` branch is a new leaf with the animal it
    /// used to guess and its `yes` branch is a new leaf with `animal`. The tree grows by
    /// exactly two nodes; nothing else changes. On error the tree is left untouched.
    #[instrument(level = "debug", skip(self, question, animal))]
    pub fn grow(
        &mut self,
        leaf: NodeId,
        question: impl Into<String>,
        animal: impl Into<String>,
    ) -> DomainResult<()> {
        let question = validate_text(question.into())?;
        let animal = validate_text(animal.into())?;

        let node = self.node(leaf).ok_or(DomainError::NodeNotFound(leaf))?;
        if node.is_question() {
            return Err(DomainError::NotALeaf {
                id: leaf,
                text: node.text.clone(),
            });
        }
        let former = node.text.clone();
        debug!("grow: {:?} vs {:?} via {:?}", former, animal, question);

        let no = NodeId(self.arena.insert(Node::animal(former)));
        let yes = NodeId(self.arena.insert(Node::animal(animal)));
        let node = &mut self.arena[leaf.0];
        node.text = question;
        node.kind = NodeKind::Question { no, yes };
        Ok(())
    }

    /// Preorder traversal: node, then its `no` subtree, then its `yes` subtree.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some((no, yes)) = self.node(id).and_then(Node::branches) {
                stack.push((yes, depth + 1));
                stack.push((no, depth + 1));
            }
        }
        max_depth
    }

    /// Animal names in preorder.
    pub fn animals(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.is_animal())
            .map(|(_, node)| node.text())
            .collect()
    }

    /// Question prompts in preorder.
    pub fn questions(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.is_question())
            .map(|(_, node)| node.text())
            .collect()
    }
}

/// Two trees are equal when they have the same shape and the same text at every node.
impl PartialEq for KnowledgeTree {
    fn eq(&self, other: &Self) -> bool {
        fn shape<'a>((_, node): (NodeId, &'a Node)) -> (bool, &'a str) {
            (node.is_question(), node.text.as_str())
        }

        self.len() == other.len() && self.iter().map(shape).eq(other.iter().map(shape))
    }
}

impl Eq for KnowledgeTree {}

impl fmt::Display for KnowledgeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} animals, depth {}",
            self.len(),
            self.animals().len(),
            self.depth()
        )
    }
}

pub struct PreOrderIter<'a> {
    tree: &'a KnowledgeTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id)?;
        if let Some((no, yes)) = node.branches() {
            // yes first so no comes off the stack first
            self.stack.push(yes);
            self.stack.push(no);
        }
        Some((id, node))
    }
}

/// Assembles a tree bottom-up, children before their parent.
///
/// Used by the decoder, which meets leaves before the questions that own them. Each
/// node must be attached to exactly one parent except the root, so the result is always
/// a strict tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: Arena<Node>,
    attached: HashSet<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(&mut self, text: impl Into<String>) -> DomainResult<NodeId> {
        let text = validate_text(text.into())?;
        Ok(NodeId(self.arena.insert(Node::animal(text))))
    }

    pub fn question(
        &mut self,
        text: impl Into<String>,
        no: NodeId,
        yes: NodeId,
    ) -> DomainResult<NodeId> {
        let text = validate_text(text.into())?;
        for child in [no, yes] {
            if !self.arena.contains(child.0) {
                return Err(DomainError::NodeNotFound(child));
            }
        }
        if no == yes || self.attached.contains(&no) || self.attached.contains(&yes) {
            return Err(DomainError::InvalidStructure(
                "a node can only have one parent",
            ));
        }
        self.attached.insert(no);
        self.attached.insert(yes);
        let node = Node {
            text,
            kind: NodeKind::Question { no, yes },
        };
        Ok(NodeId(self.arena.insert(node)))
    }

    /// Finishes the tree rooted at `root`; every other node must hang below it.
    pub fn finish(self, root: NodeId) -> DomainResult<KnowledgeTree> {
        if !self.arena.contains(root.0) {
            return Err(DomainError::NodeNotFound(root));
        }
        if self.attached.contains(&root) {
            return Err(DomainError::InvalidStructure("root cannot be a child"));
        }
        if self.attached.len() + 1 != self.arena.len() {
            return Err(DomainError::InvalidStructure(
                "every node must be reachable from the root",
            ));
        }
        Ok(KnowledgeTree {
            arena: self.arena,
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_tree_when_created_then_single_cat_leaf() {
        let tree = KnowledgeTree::default();

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        let root = tree.node(tree.root()).unwrap();
        assert!(root.is_animal());
        assert_eq!(root.text(), "cat");
        assert_eq!(root.branches(), None);
    }

    #[test]
    fn given_leaf_dog_when_growing_then_question_with_dog_no_and_cat_yes() {
        let mut tree = KnowledgeTree::with_seed("dog").unwrap();
        let leaf = tree.root();

        tree.grow(leaf, "Does it purr?", "cat").unwrap();

        assert_eq!(tree.len(), 3);
        let node = tree.node(leaf).unwrap();
        assert!(node.is_question());
        assert_eq!(node.text(), "Does it purr?");
        let (no, yes) = node.branches().unwrap();
        assert_eq!(tree.node(no).unwrap().text(), "dog");
        assert!(tree.node(no).unwrap().is_animal());
        assert_eq!(tree.node(yes).unwrap().text(), "cat");
        assert!(tree.node(yes).unwrap().is_animal());
    }

    #[test]
    fn given_question_node_when_growing_then_not_a_leaf() {
        let mut tree = KnowledgeTree::default();
        let root = tree.root();
        tree.grow(root, "Does it bark?", "dog").unwrap();

        let result = tree.grow(root, "Is it big?", "horse");

        assert!(matches!(result, Err(DomainError::NotALeaf { .. })));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn given_multiline_question_when_growing_then_tree_unchanged() {
        let mut tree = KnowledgeTree::default();
        let before = tree.clone();

        let result = tree.grow(tree.root(), "Does it\nbark?", "dog");

        assert!(matches!(result, Err(DomainError::InvalidText { .. })));
        assert_eq!(tree, before);
    }

    #[test]
    fn given_grown_tree_when_iterating_then_preorder_no_before_yes() {
        let mut tree = KnowledgeTree::default();
        let root = tree.root();
        tree.grow(root, "Does it bark?", "dog").unwrap();
        let (no, _) = tree.node(root).unwrap().branches().unwrap();
        tree.grow(no, "Does it live in water?", "fish").unwrap();

        let texts: Vec<&str> = tree.iter().map(|(_, n)| n.text()).collect();

        assert_eq!(
            texts,
            vec!["Does it bark?", "Does it live in water?", "cat", "fish", "dog"]
        );
        assert_eq!(tree.animals(), vec!["cat", "fish", "dog"]);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn given_builder_with_shared_child_when_building_then_rejected() {
        let mut builder = TreeBuilder::new();
        let cat = builder.leaf("cat").unwrap();

        let result = builder.question("Is it a cat?", cat, cat);

        assert!(matches!(result, Err(DomainError::InvalidStructure(_))));
    }

    #[test]
    fn given_builder_with_detached_node_when_finishing_then_rejected() {
        let mut builder = TreeBuilder::new();
        let cat = builder.leaf("cat").unwrap();
        let _stray = builder.leaf("dog").unwrap();

        assert!(builder.finish(cat).is_err());
    }

    #[test]
    fn given_trees_grown_alike_when_comparing_then_equal_until_text_differs() {
        let mut a = KnowledgeTree::default();
        let mut b = KnowledgeTree::default();
        a.grow(a.root(), "Does it bark?", "dog").unwrap();
        b.grow(b.root(), "Does it bark?", "dog").unwrap();
        let mut c = KnowledgeTree::default();
        c.grow(c.root(), "Does it bark?", "wolf").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, KnowledgeTree::default());
    }
}
