use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock,
    atomic::{AtomicU64, Ordering},
};

use slotmap::SlotMap;
use tracing::debug;

use crate::{
    ListenerId, NodeId,
    backend::{self, Terminal},
    core::{
        layout::LayoutPass,
        node::Node,
        render::{Pass, RenderPass},
    },
    error::{Error, Result},
    event::Event,
    geom::{Rect, Scroll},
    options::Options,
};

/// Shared handle to a node's lock.
pub(crate) type Handle = Arc<Mutex<Node>>;

/// Lock a node, recovering the data if a previous holder panicked.
pub(crate) fn lock(node: &Mutex<Node>) -> MutexGuard<'_, Node> {
    node.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Core state: the node arena, the designated root, and the terminal.
///
/// Every node sits behind its own mutex. The arena lock is held only long
/// enough to look a handle up, so callbacks (content generators, style
/// functions, listeners) always run with no locks held and may call back into
/// the core. When an operation needs both a node and its parent, the node is
/// locked first and the parent second. Structural edits are additionally
/// serialized so that cycle checks and attachment happen atomically.
pub struct Core {
    /// Node storage arena.
    nodes: RwLock<SlotMap<NodeId, Handle>>,
    /// Root node ID. The root is sized from the terminal.
    root: NodeId,
    /// Serializes structural edits.
    structure: Mutex<()>,
    /// Display boundary.
    terminal: Box<dyn Terminal>,
    /// Layout and render options.
    options: Options,
    /// Next listener handle.
    next_listener: AtomicU64,
}

impl Core {
    /// Create a core with a root node and default options.
    pub fn new(terminal: impl Terminal + 'static) -> Self {
        Self::with_options(terminal, Options::default())
    }

    /// Create a core with a root node and explicit options.
    pub fn with_options(terminal: impl Terminal + 'static, options: Options) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Arc::new(Mutex::new(Node::default())));
        Self {
            nodes: RwLock::new(nodes),
            root,
            structure: Mutex::new(()),
            terminal: Box::new(terminal),
            options,
            next_listener: AtomicU64::new(1),
        }
    }

    /// Return the root node id.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Return the options this core was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Return the terminal boundary.
    pub(crate) fn terminal(&self) -> &dyn Terminal {
        self.terminal.as_ref()
    }

    /// Look up a node's lock handle.
    pub(crate) fn handle(&self, id: NodeId) -> Result<Handle> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or(Error::NodeNotFound(id))
    }

    /// True if the id refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Run a closure against a node under its lock.
    pub fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> Result<R> {
        let h = self.handle(id)?;
        let n = lock(&h);
        Ok(f(&n))
    }

    /// Run a closure against a node under its lock, mutably.
    pub(crate) fn with_node_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> Result<R> {
        let h = self.handle(id)?;
        let mut n = lock(&h);
        Ok(f(&mut n))
    }

    /// Create a detached node with default flex parameters.
    pub fn create(&self) -> NodeId {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::new(Mutex::new(Node::default())))
    }

    /// True if `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return Ok(true);
            }
            cur = self.with_node(id, Node::parent)?;
        }
        Ok(false)
    }

    /// Append a detached node to a parent's children and fold its flex
    /// parameters into the parent's aggregates.
    pub fn add_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if child == self.root {
            return Err(Error::Invalid("the root node cannot be attached".into()));
        }
        let _structure = self.structure.lock().unwrap_or_else(PoisonError::into_inner);
        let child_h = self.handle(child)?;
        let parent_h = self.handle(parent)?;
        if self.is_ancestor(child, parent)? {
            return Err(Error::WouldCreateCycle { parent, child });
        }

        let mut c = lock(&child_h);
        if c.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        let mut p = lock(&parent_h);
        c.index = p.push_child(child, c.grow, c.length);
        c.parent = Some(parent);
        Ok(())
    }

    /// Detach every child of a node. The children become roots of their own
    /// subtrees and the parent's aggregates return to zero.
    pub fn remove_all_children(&self, parent: NodeId) -> Result<()> {
        let _structure = self.structure.lock().unwrap_or_else(PoisonError::into_inner);
        let children = self.with_node_mut(parent, Node::take_children)?;
        for child in children {
            self.with_node_mut(child, |c| {
                if c.parent == Some(parent) {
                    c.parent = None;
                    c.index = 0;
                }
            })?;
        }
        Ok(())
    }

    /// Free a detached node and its whole subtree from the arena.
    pub fn remove(&self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::Invalid("cannot remove root".into()));
        }
        let _structure = self.structure.lock().unwrap_or_else(PoisonError::into_inner);
        if self.with_node(id, Node::parent)?.is_some() {
            return Err(Error::AlreadyAttached(id));
        }
        let subtree = self.subtree_pre_order(id)?;
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        for node_id in subtree {
            nodes.remove(node_id);
        }
        Ok(())
    }

    /// Collect a subtree in pre-order, including the root.
    fn subtree_pre_order(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            let children = self.with_node(node_id, |n| n.children.clone())?;
            out.push(node_id);
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    /// Return the node's parent.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.with_node(id, Node::parent)
    }

    /// Return the node's children in layout order.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.with_node(id, |n| n.children.clone())
    }

    /// Return the node's first child.
    pub fn first_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.with_node(id, Node::first_child)
    }

    /// Return the node's last child.
    pub fn last_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.with_node(id, Node::last_child)
    }

    /// Return the sibling before this node.
    pub fn prev_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.sibling(id, |i| i.checked_sub(1))
    }

    /// Return the sibling after this node.
    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.sibling(id, |i| i.checked_add(1))
    }

    /// Resolve a sibling through the cached index.
    fn sibling(&self, id: NodeId, step: impl FnOnce(usize) -> Option<usize>) -> Result<Option<NodeId>> {
        let (parent, index) = self.with_node(id, |n| (n.parent, n.index))?;
        let Some(parent) = parent else {
            return Ok(None);
        };
        self.with_node(parent, |p| {
            if !p.owns(id, index) {
                return None;
            }
            step(index).and_then(|i| p.children.get(i).copied())
        })
    }

    /// Return the node's Box.
    pub fn rect(&self, id: NodeId) -> Result<Rect> {
        self.with_node(id, Node::rect)
    }

    /// Return a copy of the node's current content string.
    pub fn content(&self, id: NodeId) -> Result<Option<String>> {
        self.with_node(id, |n| n.content.value().map(str::to_string))
    }

    /// Lay children out top to bottom (`true`) or left to right (`false`).
    pub fn set_vertical(&self, id: NodeId, vertical: bool) -> Result<()> {
        self.with_node_mut(id, |n| n.vertical = vertical)
    }

    /// Lock this node's parent and apply an aggregate update, provided the
    /// node is still one of its children. The caller holds the node's lock.
    fn update_parent(&self, id: NodeId, n: &Node, f: impl FnOnce(&mut Node)) -> Result<()> {
        let Some(parent) = n.parent else {
            return Ok(());
        };
        let h = self.handle(parent)?;
        let mut p = lock(&h);
        if p.owns(id, n.index) {
            f(&mut p);
        }
        Ok(())
    }

    /// Set the flex weight. A larger weight takes proportionally more of the
    /// space its flex siblings share.
    pub fn set_grow(&self, id: NodeId, grow: f64) -> Result<()> {
        let h = self.handle(id)?;
        let mut n = lock(&h);
        let old = n.grow;
        n.grow = grow;
        if n.is_flex() {
            self.update_parent(id, &n, |p| p.regrow_child(old, grow))?;
        }
        Ok(())
    }

    /// Set a fixed main-axis length. Zero returns the node to flex sizing.
    pub fn set_length(&self, id: NodeId, length: u32) -> Result<()> {
        let h = self.handle(id)?;
        let mut n = lock(&h);
        let old = n.length;
        n.length = length;
        let grow = n.grow;
        self.update_parent(id, &n, |p| p.relength_child(grow, old, length))
    }

    /// Set the node's text.
    pub fn set_content(&self, id: NodeId, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.with_node_mut(id, |n| n.content.set_value(content))
    }

    /// Generate the node's text from its Box after every layout.
    pub fn set_content_fn(
        &self,
        id: NodeId,
        f: impl Fn(&Rect) -> String + Send + Sync + 'static,
    ) -> Result<()> {
        self.with_node_mut(id, |n| n.content_fn = Some(Arc::new(f)))
    }

    /// Stop generating the node's text. The last generated text remains.
    pub fn clear_content_fn(&self, id: NodeId) -> Result<()> {
        self.with_node_mut(id, |n| n.content_fn = None)
    }

    /// Set the function applied to every text run the node emits. The next
    /// render repaints the node in full so blank regions pick up the style.
    pub fn set_style(
        &self,
        id: NodeId,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Result<()> {
        self.with_node_mut(id, |n| {
            n.blank.invalidate();
            n.style = Some(Arc::new(f));
        })
    }

    /// Remove the node's style function.
    pub fn clear_style(&self, id: NodeId) -> Result<()> {
        self.with_node_mut(id, |n| {
            n.blank.invalidate();
            n.style = None;
        })
    }

    /// Set scroll offsets, applied at the next layout.
    pub fn set_scroll(&self, id: NodeId, scroll: Scroll) -> Result<()> {
        self.with_node_mut(id, |n| n.scroll = scroll)
    }

    /// Return the node's scroll offsets.
    pub fn scroll(&self, id: NodeId) -> Result<Scroll> {
        self.with_node(id, Node::scroll)
    }

    /// Register a listener. Listeners for an event fire in registration
    /// order.
    pub fn add_event_listener(
        &self,
        id: NodeId,
        event: Event,
        f: impl Fn(&Self, NodeId) + Send + Sync + 'static,
    ) -> Result<ListenerId> {
        let lid = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.with_node_mut(id, |n| n.listeners.add(event, lid, Arc::new(f)))?;
        Ok(lid)
    }

    /// Remove a listener by handle. Returns `true` if it was registered.
    pub fn remove_event_listener(&self, id: NodeId, event: Event, listener: ListenerId) -> Result<bool> {
        self.with_node_mut(id, |n| n.listeners.remove(event, listener))
    }

    /// Invoke the listeners for an event, with no locks held.
    pub(crate) fn fire(&self, id: NodeId, event: Event) -> Result<()> {
        let listeners = self.with_node(id, |n| n.listeners.snapshot(event))?;
        for l in listeners {
            l(self, id);
        }
        Ok(())
    }

    /// Recompute the Box of a node and its whole subtree. Called on the root,
    /// this first sizes the root to the terminal; if the terminal cannot be
    /// queried the pass is skipped and nothing changes.
    pub fn update_layout(&self, id: NodeId) -> Result<()> {
        LayoutPass::new(self).run(id)
    }

    /// Paint a node and its subtree, superseding any render of the same node
    /// that is still in flight.
    pub fn render(&self, id: NodeId) -> Result<Pass> {
        RenderPass::new(self).run(id)
    }

    /// Lay out and repaint the whole tree from the root.
    pub fn redraw(&self) -> Result<Pass> {
        debug!("redraw");
        self.update_layout(self.root)?;
        self.render(self.root)
    }

    /// Hide the terminal cursor.
    pub fn hide_cursor(&self) -> Result<()> {
        self.terminal.write(&backend::hide_cursor())
    }

    /// Show the terminal cursor.
    pub fn show_cursor(&self) -> Result<()> {
        self.terminal.write(&backend::show_cursor())
    }

    /// Home the cursor and clear the screen. Every diff cache is stale after
    /// this, so the caller should re-run layout before the next render.
    pub fn clear_screen(&self) -> Result<()> {
        self.terminal.write(&backend::clear_screen())
    }

    /// Restore the terminal on termination: show the cursor and clear the
    /// screen.
    pub fn shutdown(&self) -> Result<()> {
        let mut out = backend::show_cursor();
        out.push_str(&backend::clear_screen());
        self.terminal.write(&out)
    }
}
