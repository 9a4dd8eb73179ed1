//! Arena-based DOM for parsed HTML units.
//!
//! Nodes live in one contiguous vector and link to each other by index.
//! Besides the usual tree navigation, the DOM answers the two text queries
//! the converter is built around: the *leading text* of an element (text
//! before its first non-text child) and its *trailing text* (text after the
//! element, before the next non-text sibling).

use html5ever::{LocalName, Namespace, QualName};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a DOM node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for selector matching.
        id: Option<String>,
        /// Pre-extracted classes for selector matching.
        classes: Vec<String>,
    },
    Text(String),
    /// Comments, processing instructions and doctypes. They carry no content
    /// but still terminate leading/trailing text.
    Other,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// A parsed HTML unit.
pub struct ArenaDom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl ArenaDom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut id = None;
        let mut classes = Vec::new();
        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => {
                    classes = attr
                        .value
                        .split_whitespace()
                        .map(str::to_string)
                        .collect()
                }
                _ => {}
            }
        }
        self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_other(&mut self) -> NodeId {
        self.alloc(Node::new(NodeData::Other))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = last_child;
            node.next_sibling = NodeId::NONE;
        }
        if let Some(last) = self.get_mut(last_child) {
            last.next_sibling = child;
        }
        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(node) = self.get_mut(new_node) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = sibling;
        }
        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }
        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(par) = self.get_mut(parent) {
            par.last_child = prev;
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Append text to `parent`, merging into its last child when that is
    /// already a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);
        if let Some(Node {
            data: NodeData::Text(existing),
            ..
        }) = self.get_mut(last_child)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Insert text before `sibling`, merging into a preceding text node.
    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        let prev = self.get(sibling).map_or(NodeId::NONE, |n| n.prev_sibling);
        if let Some(Node {
            data: NodeData::Text(existing),
            ..
        }) = self.get_mut(prev)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.insert_before(sibling, node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the DOM holds nothing but the document node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, parent: NodeId) -> Siblings<'_> {
        Siblings {
            dom: self,
            current: self.get(parent).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Element children only, in document order.
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&c| self.is_element(c))
    }

    /// Parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_some)
    }

    /// Whether `id` is the last element child of its parent.
    pub fn is_last_element_child(&self, id: NodeId) -> bool {
        let mut current = self.get(id).map_or(NodeId::NONE, |n| n.next_sibling);
        while let Some(node) = self.get(current) {
            if matches!(node.data, NodeData::Element { .. }) {
                return false;
            }
            current = node.next_sibling;
        }
        true
    }

    /// Concatenated text nodes that precede the first non-text child.
    pub fn leading_text(&self, id: NodeId) -> Option<String> {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        self.text_run_from(first)
    }

    /// Concatenated text nodes that follow `id`, up to the next non-text
    /// sibling.
    pub fn trailing_text(&self, id: NodeId) -> Option<String> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.next_sibling);
        self.text_run_from(next)
    }

    fn text_run_from(&self, start: NodeId) -> Option<String> {
        let mut text = String::new();
        for id in (Siblings {
            dom: self,
            current: start,
        }) {
            match self.text_content(id) {
                Some(t) => text.push_str(t),
                None => break,
            }
        }
        if text.is_empty() { None } else { Some(text) }
    }

    /// All elements with the given local name, in document order.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if self.element_name(id).is_some_and(|n| n.as_ref() == tag) {
                found.push(id);
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        found
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_all_by_tag(tag).into_iter().next()
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node and its following siblings.
pub struct Siblings<'a> {
    dom: &'a ArenaDom,
    current: NodeId,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.dom.get(self.current)?;
        let id = self.current;
        self.current = node.next_sibling;
        Some(id)
    }
}

/// Element accessors.
impl ArenaDom {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        }
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    pub fn element_classes(&self, id: NodeId) -> &[String] {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { classes, .. }) => classes,
            _ => &[],
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text(s) => Some(s),
            _ => None,
        }
    }
}
