// Rule capability and rule trees

use crate::error::RuleFault;
use crate::translator::Context;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A check applied to one resolved value.
///
/// `value` is `None` when the path did not resolve. Returning an empty list
/// accepts the value; each returned string is one failure message. Returning
/// `Err` means the rule could not run at all and aborts the whole pass.
pub trait Rule: Send + Sync {
    /// Short identifier such as `length` or `allOf`.
    fn id(&self) -> &str;

    fn check(&self, value: Option<&Value>, ctx: &Context<'_>) -> Result<Vec<String>, RuleFault>;
}

type CheckFn = dyn Fn(Option<&Value>, &Context<'_>) -> Result<Vec<String>, RuleFault> + Send + Sync;

/// Closure-backed rule.
#[derive(Clone)]
pub struct RuleFn {
    id: String,
    check: Arc<CheckFn>,
}

impl RuleFn {
    pub fn new<F>(id: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&Value>, &Context<'_>) -> Result<Vec<String>, RuleFault> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            check: Arc::new(check),
        }
    }
}

impl Rule for RuleFn {
    fn id(&self) -> &str {
        &self.id
    }

    fn check(&self, value: Option<&Value>, ctx: &Context<'_>) -> Result<Vec<String>, RuleFault> {
        (self.check)(value, ctx)
    }
}

/// Shorthand for [`RuleFn::new`].
pub fn rule_fn<F>(id: impl Into<String>, check: F) -> RuleFn
where
    F: Fn(Option<&Value>, &Context<'_>) -> Result<Vec<String>, RuleFault> + Send + Sync + 'static,
{
    RuleFn::new(id, check)
}

/// Either a rule or a nested tree of rules.
#[derive(Clone)]
pub enum RuleNode {
    Leaf(Arc<dyn Rule>),
    Subtree(RuleTree),
}

impl RuleNode {
    pub fn leaf<R: Rule + 'static>(rule: R) -> Self {
        RuleNode::Leaf(Arc::new(rule))
    }

    pub fn as_leaf(&self) -> Option<&Arc<dyn Rule>> {
        match self {
            RuleNode::Leaf(rule) => Some(rule),
            RuleNode::Subtree(_) => None,
        }
    }

    pub fn as_subtree(&self) -> Option<&RuleTree> {
        match self {
            RuleNode::Leaf(_) => None,
            RuleNode::Subtree(tree) => Some(tree),
        }
    }
}

impl fmt::Debug for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Leaf(rule) => write!(f, "Leaf({})", rule.id()),
            RuleNode::Subtree(tree) => f.debug_tuple("Subtree").field(tree).finish(),
        }
    }
}

impl From<RuleTree> for RuleNode {
    fn from(tree: RuleTree) -> Self {
        RuleNode::Subtree(tree)
    }
}

impl From<Arc<dyn Rule>> for RuleNode {
    fn from(rule: Arc<dyn Rule>) -> Self {
        RuleNode::Leaf(rule)
    }
}

/// Mapping from field name to rule or nested rule tree.
///
/// Entries are visited in insertion order. Inserting an existing name
/// replaces its node and keeps the original position.
#[derive(Clone, Default)]
pub struct RuleTree {
    nodes: IndexMap<String, RuleNode>,
}

impl RuleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf rule for `field`.
    pub fn rule<R: Rule + 'static>(mut self, field: impl Into<String>, rule: R) -> Self {
        self.insert(field, RuleNode::leaf(rule));
        self
    }

    /// Add a nested tree for `field`.
    pub fn tree(mut self, field: impl Into<String>, tree: RuleTree) -> Self {
        self.insert(field, RuleNode::Subtree(tree));
        self
    }

    /// Insert a node, returning the one it replaced.
    pub fn insert(&mut self, field: impl Into<String>, node: impl Into<RuleNode>) -> Option<RuleNode> {
        self.nodes.insert(field.into(), node.into())
    }

    pub fn get(&self, field: &str) -> Option<&RuleNode> {
        self.nodes.get(field)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RuleNode)> {
        self.nodes.iter()
    }

    /// Dotted paths of every leaf rule, in traversal order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(&mut Vec::new(), &mut paths);
        paths
    }

    /// Total number of leaf rules at any depth.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .values()
            .map(|node| match node {
                RuleNode::Leaf(_) => 1,
                RuleNode::Subtree(tree) => tree.leaf_count(),
            })
            .sum()
    }

    fn collect_paths<'a>(&'a self, prefix: &mut Vec<&'a str>, out: &mut Vec<String>) {
        for (field, node) in &self.nodes {
            prefix.push(field);
            match node {
                RuleNode::Leaf(_) => out.push(prefix.join(".")),
                RuleNode::Subtree(tree) => tree.collect_paths(prefix, out),
            }
            prefix.pop();
        }
    }
}

impl fmt::Debug for RuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.nodes.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, RuleNode)> for RuleTree {
    fn from_iter<I: IntoIterator<Item = (K, RuleNode)>>(iter: I) -> Self {
        let mut tree = RuleTree::new();
        for (field, node) in iter {
            tree.insert(field, node);
        }
        tree
    }
}
