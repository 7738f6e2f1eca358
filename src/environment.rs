// The style environment theme projection writes into, plus an in-memory
// document implementing it. Structural changes to the document are
// published to observers so late-arriving surfaces can be themed.

use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;

/// Handle to an element in a [`StyleEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Where projected style state lands. Writes can fail independently of each
/// other (e.g. an environment without a styling API).
pub trait StyleEnvironment {
    fn set_root_property(&mut self, name: &str, value: &str) -> anyhow::Result<()>;
    fn root_property(&self, name: &str) -> Option<String>;
    fn set_root_class(&mut self, class: &str, enabled: bool) -> anyhow::Result<()>;
    fn has_root_class(&self, class: &str) -> bool;

    /// Every element currently carrying `marker` as a class.
    fn surfaces(&self, marker: &str) -> Vec<NodeId>;
    /// `node` itself and any descendant carrying `marker`.
    fn surfaces_within(&self, node: NodeId, marker: &str) -> Vec<NodeId>;

    fn set_element_property(&mut self, node: NodeId, name: &str, value: &str)
        -> anyhow::Result<()>;
    fn remove_element_property(&mut self, node: NodeId, name: &str) -> anyhow::Result<()>;
}

/// A batch of structural changes, published after each tree edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Added(Vec<NodeId>),
    Removed(Vec<NodeId>),
}

/// Description of an element to insert.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    classes: BTreeSet<String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document: a root with style variables and classes, and a tree
/// of elements below it that can carry inline style overrides.
#[derive(Debug, Default)]
pub struct Document {
    root_style: BTreeMap<String, String>,
    root_classes: BTreeSet<String>,
    // `nodes[i]` holds id `base + i`. Ids are never handed out twice, so a
    // removed id stays dead; once the body is empty the slots are dropped
    // and `base` moves past them.
    base: usize,
    nodes: Vec<Option<Node>>,
    top_level: Vec<NodeId>,
    observers: Vec<mpsc::UnboundedSender<Mutation>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to structural changes. Closed receivers are pruned on the
    /// next publish.
    pub fn observe(&mut self) -> mpsc::UnboundedReceiver<Mutation> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    fn publish(&mut self, mutation: Mutation) {
        self.observers.retain(|tx| tx.send(mutation.clone()).is_ok());
    }

    /// Insert `element` (and its subtree) under `parent`, or at the top level
    /// when `parent` is `None`. Returns the id of the inserted element.
    pub fn append(
        &mut self,
        parent: Option<NodeId>,
        element: Element,
    ) -> anyhow::Result<NodeId> {
        if let Some(p) = parent {
            self.node(p)?;
        }
        let id = self.insert_subtree(parent, element);
        match parent {
            Some(p) => self.node_mut(p)?.children.push(id),
            None => self.top_level.push(id),
        }
        self.publish(Mutation::Added(vec![id]));
        Ok(id)
    }

    fn insert_subtree(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.base + self.nodes.len());
        self.nodes.push(Some(Node {
            tag: element.tag,
            classes: element.classes.into_iter().collect(),
            style: BTreeMap::new(),
            parent,
            children: Vec::new(),
        }));
        let children: Vec<NodeId> = element
            .children
            .into_iter()
            .map(|child| self.insert_subtree(Some(id), child))
            .collect();
        if let Some(node) = self.slot_mut(id) {
            node.children = children;
        }
        id
    }

    /// Detach `node` and its subtree.
    pub fn remove(&mut self, node: NodeId) -> anyhow::Result<()> {
        let parent = self.node(node)?.parent;
        match parent {
            Some(p) => self.node_mut(p)?.children.retain(|c| *c != node),
            None => self.top_level.retain(|c| *c != node),
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.slot_index(id).and_then(|i| self.nodes[i].take()) {
                stack.extend(removed.children);
            }
        }
        if self.top_level.is_empty() {
            self.compact();
        }
        self.publish(Mutation::Removed(vec![node]));
        Ok(())
    }

    /// Drop every element, as a page navigation does. Root style survives.
    pub fn clear_body(&mut self) {
        let top = std::mem::take(&mut self.top_level);
        self.compact();
        if !top.is_empty() {
            self.publish(Mutation::Removed(top));
        }
    }

    /// Retire every slot; called only when no element is attached.
    fn compact(&mut self) {
        self.base += self.nodes.len();
        self.nodes.clear();
    }

    /// Slots currently allocated, live or dead.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_property(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).ok()?.style.get(name).cloned()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_ok()
    }

    fn slot_index(&self, id: NodeId) -> Option<usize> {
        id.0.checked_sub(self.base).filter(|i| *i < self.nodes.len())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let i = self.slot_index(id)?;
        self.nodes[i].as_mut()
    }

    fn node(&self, id: NodeId) -> anyhow::Result<&Node> {
        self.slot_index(id)
            .and_then(|i| self.nodes[i].as_ref())
            .ok_or_else(|| anyhow::anyhow!("no element with id {}", id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> anyhow::Result<&mut Node> {
        self.slot_mut(id)
            .ok_or_else(|| anyhow::anyhow!("no element with id {}", id.0))
    }

    fn live_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(self.base + i), n)))
    }

    /// Render the projected state as a stylesheet.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        let root_selector: String = std::iter::once(":root".to_string())
            .chain(self.root_classes.iter().map(|c| format!(".{c}")))
            .collect();
        css.push_str(&format!("{root_selector} {{\n"));
        push_declarations(&mut css, &self.root_style);

        for (id, node) in self.live_nodes() {
            if node.style.is_empty() {
                continue;
            }
            css.push_str(&format!("\n{}[data-node=\"{}\"] {{\n", node.tag, id.0));
            push_declarations(&mut css, &node.style);
        }
        css
    }
}

fn push_declarations(css: &mut String, style: &BTreeMap<String, String>) {
    for (name, value) in style {
        css.push_str(&format!("  {name}: {value};\n"));
    }
    css.push_str("}\n");
}

impl StyleEnvironment for Document {
    fn set_root_property(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        self.root_style.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn root_property(&self, name: &str) -> Option<String> {
        self.root_style.get(name).cloned()
    }

    fn set_root_class(&mut self, class: &str, enabled: bool) -> anyhow::Result<()> {
        if enabled {
            self.root_classes.insert(class.to_string());
        } else {
            self.root_classes.remove(class);
        }
        Ok(())
    }

    fn has_root_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    fn surfaces(&self, marker: &str) -> Vec<NodeId> {
        self.live_nodes()
            .filter(|(_, n)| n.classes.contains(marker))
            .map(|(id, _)| id)
            .collect()
    }

    fn surfaces_within(&self, node: NodeId, marker: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Ok(n) = self.node(id) else { continue };
            if n.classes.contains(marker) {
                found.push(id);
            }
            stack.extend(n.children.iter().rev().copied());
        }
        found
    }

    fn set_element_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> anyhow::Result<()> {
        self.node_mut(node)?
            .style
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_element_property(&mut self, node: NodeId, name: &str) -> anyhow::Result<()> {
        self.node_mut(node)?.style.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_publishes_added_batch() {
        let mut doc = Document::new();
        let mut rx = doc.observe();
        let page = doc.append(None, Element::new("page")).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Mutation::Added(vec![page]));
    }

    #[test]
    fn surfaces_within_finds_nested_markers() {
        let mut doc = Document::new();
        let page = doc
            .append(
                None,
                Element::new("page")
                    .child(Element::new("header"))
                    .child(
                        Element::new("content")
                            .class("wallpaper-surface")
                            .child(Element::new("content").class("wallpaper-surface")),
                    ),
            )
            .unwrap();
        let found = doc.surfaces_within(page, "wallpaper-surface");
        assert_eq!(found.len(), 2);
        assert_eq!(doc.surfaces("wallpaper-surface"), found);
    }

    #[test]
    fn removed_nodes_reject_writes() {
        let mut doc = Document::new();
        let page = doc.append(None, Element::new("page").class("wallpaper-surface")).unwrap();
        doc.remove(page).unwrap();
        assert!(!doc.contains(page));
        assert!(doc.set_element_property(page, "--x", "1").is_err());
        assert!(doc.surfaces("wallpaper-surface").is_empty());
    }

    #[test]
    fn clear_body_keeps_root_style() {
        let mut doc = Document::new();
        doc.set_root_property("--ion-color-primary", "#112233").unwrap();
        doc.append(None, Element::new("page")).unwrap();
        doc.clear_body();
        assert_eq!(doc.root_property("--ion-color-primary").as_deref(), Some("#112233"));
        assert!(doc.surfaces("page").is_empty());
    }

    #[test]
    fn repeated_navigation_keeps_slots_bounded() {
        let mut doc = Document::new();
        let mut stale = Vec::new();
        for _ in 0..1_000 {
            let page = doc
                .append(
                    None,
                    Element::new("page").child(Element::new("content").class("wallpaper-surface")),
                )
                .unwrap();
            stale.push(page);
            doc.clear_body();
        }
        assert_eq!(doc.allocated(), 0);

        let page = doc.append(None, Element::new("page")).unwrap();
        assert_eq!(doc.allocated(), 1);
        assert!(doc.contains(page));
        assert!(stale.iter().all(|id| !doc.contains(*id) && *id != page));
        assert!(doc.set_element_property(stale[0], "--x", "1").is_err());
    }

    #[test]
    fn removing_last_page_releases_slots() {
        let mut doc = Document::new();
        let a = doc.append(None, Element::new("page")).unwrap();
        let b = doc.append(None, Element::new("page")).unwrap();
        doc.remove(a).unwrap();
        assert_eq!(doc.allocated(), 2);
        doc.remove(b).unwrap();
        assert_eq!(doc.allocated(), 0);
        let c = doc.append(None, Element::new("page")).unwrap();
        assert!(c != a && c != b);
        assert!(!doc.contains(a));
    }

    #[test]
    fn css_lists_root_classes_and_overrides() {
        let mut doc = Document::new();
        doc.set_root_property("--a", "1").unwrap();
        doc.set_root_class("dark", true).unwrap();
        let s = doc.append(None, Element::new("content").class("wallpaper-surface")).unwrap();
        doc.set_element_property(s, "--wallpaper-image", "url('x')").unwrap();
        let css = doc.to_css();
        assert!(css.starts_with(":root.dark {\n  --a: 1;\n}\n"));
        assert!(css.contains("content[data-node=\"0\"] {\n  --wallpaper-image: url('x');\n}"));
    }
}
