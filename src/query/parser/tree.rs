// Syntax Tree View
//
// Rebuilds the nesting implied by the flat token buffer. Nodes live in a
// flat arena and refer to each other by index; zero-length spans (actions,
// empty whitespace) are pruned.

use std::fmt::Write;

use crate::query::parser::grammar::{Token, TokenBuffer};

/// Index of a node in a [`SyntaxTree`]
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub token: Token,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

/// Arena-backed tree of non-empty spans
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    roots: Vec<NodeId>,
}

impl SyntaxTree {
    /// Reduce a completion-ordered token list into a tree.
    ///
    /// Children complete before their parent, so every token adopts the
    /// nodes on top of the stack that lie inside its span.
    pub fn from_tokens(tokens: &TokenBuffer) -> Self {
        let mut nodes: Vec<SyntaxNode> = Vec::with_capacity(tokens.len());
        let mut stack: Vec<NodeId> = Vec::new();

        for token in tokens.iter().filter(|t| !t.is_empty()) {
            let id = nodes.len();
            let mut first_child = None;

            while let Some(&top) = stack.last() {
                let inner = nodes[top].token;
                if inner.begin >= token.begin && inner.end <= token.end {
                    stack.pop();
                    nodes[top].next_sibling = first_child;
                    first_child = Some(top);
                } else {
                    break;
                }
            }

            nodes.push(SyntaxNode {
                token: *token,
                first_child,
                next_sibling: None,
            });
            stack.push(id);
        }

        // Whatever is left on the stack has no enclosing span
        for pair in stack.windows(2) {
            nodes[pair[0]].next_sibling = Some(pair[1]);
        }

        SyntaxTree { nodes, roots: stack }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id]
    }

    /// Top-level nodes in source order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root(&self) -> Option<&SyntaxNode> {
        self.roots.first().map(|&id| &self.nodes[id])
    }

    /// Children of `id` in source order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.nodes[id].first_child,
        }
    }

    /// One line per node, indented by depth: `Rule "text"`
    pub fn render(&self, input: &[char], pretty: bool) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, 0, input, pretty, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, input: &[char], pretty: bool, out: &mut String) {
        let token = self.nodes[id].token;
        let text = format!("{:?}", token.text(input));
        let _ = if pretty {
            writeln!(out, "{}\x1B[34m{}\x1B[m {}", " ".repeat(depth), token.rule, text)
        } else {
            writeln!(out, "{}{} {}", " ".repeat(depth), token.rule, text)
        };
        for child in self.children(id) {
            self.render_node(child, depth + 1, input, pretty, out);
        }
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.nodes[current].next_sibling;
        Some(current)
    }
}

impl TokenBuffer {
    pub fn syntax_tree(&self) -> SyntaxTree {
        SyntaxTree::from_tokens(self)
    }
}
