//! In-memory scene graph renderer
//!
//! Implements [`Renderer`] over a slotmap of plain nodes. Used by headless
//! hosts and by every test in the workspace: property writes land on the
//! node and can be read straight back.

use crate::color::Color;
use crate::renderer::{PrefabKind, Renderer, Slot, ViewHandle};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

/// A single element in the in-memory scene
#[derive(Clone, Debug)]
pub struct Node {
    pub prefab: Option<PrefabKind>,
    pub slot: Option<Slot>,
    pub parent: Option<ViewHandle>,
    pub children: Vec<ViewHandle>,
    pub text: String,
    pub alpha: f32,
    pub scale: f32,
    pub color: Color,
    pub image: Option<String>,
    pub interactive: bool,
    pub hit_testable: bool,
}

impl Node {
    fn new(parent: Option<ViewHandle>) -> Self {
        Self {
            prefab: None,
            slot: None,
            parent,
            children: Vec::new(),
            text: String::new(),
            alpha: 1.0,
            scale: 1.0,
            color: Color::WHITE,
            image: None,
            interactive: true,
            hit_testable: true,
        }
    }
}

/// Renderer that keeps the whole view tree in memory
pub struct MemoryRenderer {
    nodes: SlotMap<ViewHandle, Node>,
    root: ViewHandle,
    /// Slots left out when instantiating prefabs (simulates unset asset references)
    omitted: FxHashSet<(PrefabKind, Slot)>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(None));
        Self {
            nodes,
            root,
            omitted: FxHashSet::default(),
        }
    }

    /// Leave `slot` out of every future `kind` instance
    pub fn omit_slot(mut self, kind: PrefabKind, slot: Slot) -> Self {
        self.omitted.insert((kind, slot));
        self
    }

    /// The scene root; prefabs for the host layout hang off this
    pub fn root(&self) -> ViewHandle {
        self.root
    }

    pub fn node(&self, handle: ViewHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Total live elements, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_interactive(&self, handle: ViewHandle) -> Option<bool> {
        self.nodes.get(handle).map(|n| n.interactive)
    }

    pub fn is_hit_testable(&self, handle: ViewHandle) -> Option<bool> {
        self.nodes.get(handle).map(|n| n.hit_testable)
    }

    pub fn image(&self, handle: ViewHandle) -> Option<&str> {
        self.nodes.get(handle).and_then(|n| n.image.as_deref())
    }

    fn add_child(&mut self, parent: ViewHandle, node: Node) -> ViewHandle {
        let handle = self.nodes.insert(node);
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(handle);
        }
        handle
    }

    fn slots_for(kind: PrefabKind) -> &'static [Slot] {
        match kind {
            PrefabKind::Post => &Slot::POST,
            PrefabKind::CommentPanel => &Slot::COMMENT_PANEL,
            PrefabKind::Comment => &[],
        }
    }
}

impl Default for MemoryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MemoryRenderer {
    fn set_text(&mut self, handle: ViewHandle, text: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.text = text.to_string();
        }
    }

    fn text(&self, handle: ViewHandle) -> Option<String> {
        self.nodes.get(handle).map(|n| n.text.clone())
    }

    fn set_alpha(&mut self, handle: ViewHandle, alpha: f32) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.alpha = alpha;
        }
    }

    fn alpha(&self, handle: ViewHandle) -> Option<f32> {
        self.nodes.get(handle).map(|n| n.alpha)
    }

    fn set_scale(&mut self, handle: ViewHandle, scale: f32) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.scale = scale;
        }
    }

    fn scale(&self, handle: ViewHandle) -> Option<f32> {
        self.nodes.get(handle).map(|n| n.scale)
    }

    fn set_color(&mut self, handle: ViewHandle, color: Color) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.color = color;
        }
    }

    fn color(&self, handle: ViewHandle) -> Option<Color> {
        self.nodes.get(handle).map(|n| n.color)
    }

    fn set_image(&mut self, handle: ViewHandle, image: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.image = Some(image.to_string());
        }
    }

    fn set_interactive(&mut self, handle: ViewHandle, interactive: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.interactive = interactive;
        }
    }

    fn set_hit_testable(&mut self, handle: ViewHandle, hit_testable: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.hit_testable = hit_testable;
        }
    }

    fn instantiate(&mut self, kind: PrefabKind, parent: ViewHandle) -> ViewHandle {
        let mut instance = Node::new(Some(parent));
        instance.prefab = Some(kind);
        let handle = self.add_child(parent, instance);

        for &slot in Self::slots_for(kind) {
            if self.omitted.contains(&(kind, slot)) {
                continue;
            }
            let mut child = Node::new(Some(handle));
            child.slot = Some(slot);
            self.add_child(handle, child);
        }

        tracing::trace!("MemoryRenderer: instantiated {:?} as {:?}", kind, handle);
        handle
    }

    fn destroy(&mut self, handle: ViewHandle) {
        if handle == self.root {
            return;
        }
        let Some(node) = self.nodes.remove(handle) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != handle);
        }

        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(child) {
                pending.extend(removed.children);
            }
        }
    }

    fn insert_at_index(&mut self, handle: ViewHandle, index: usize) {
        let Some(parent) = self.nodes.get(handle).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&c| c != handle);
            let index = index.min(parent.children.len());
            parent.children.insert(index, handle);
        }
    }

    fn children(&self, parent: ViewHandle) -> Vec<ViewHandle> {
        self.nodes
            .get(parent)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn find_child(&self, parent: ViewHandle, slot: Slot) -> Option<ViewHandle> {
        let mut pending = self.children(parent);
        while !pending.is_empty() {
            let mut next = Vec::new();
            for child in pending {
                let node = self.nodes.get(child)?;
                if node.slot == Some(slot) {
                    return Some(child);
                }
                next.extend(node.children.iter().copied());
            }
            pending = next;
        }
        None
    }

    fn is_alive(&self, handle: ViewHandle) -> bool {
        self.nodes.contains_key(handle)
    }
}
