use std::{fmt, mem, sync::Arc};

use crate::{
    NodeId,
    core::{
        cancel::CancelToken,
        content::{Content, ContentFn},
        event::Listeners,
    },
    geom::{Axis, Rect, Scroll},
};

/// Transforms a text run immediately before it is buffered for output, for
/// example to wrap it in ANSI color sequences.
pub type StyleFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What the last completed render left blank on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlankCache {
    /// First row found fully blank, or `None` if unknown.
    pub first_row: Option<usize>,
    /// Per row, the column at which content ended.
    pub columns: Option<Vec<usize>>,
}

impl BlankCache {
    /// Forget everything; the next render repaints in full.
    pub fn invalidate(&mut self) {
        self.first_row = None;
        self.columns = None;
    }
}

/// Core node data stored in the arena.
pub struct Node {
    /// Parent in the arena tree. Never owns the parent.
    pub(crate) parent: Option<NodeId>,
    /// Position within the parent's children list.
    pub(crate) index: usize,
    /// Children in layout order.
    pub(crate) children: Vec<NodeId>,

    /// Lay children out top to bottom instead of left to right.
    pub(crate) vertical: bool,
    /// Flex weight, used only when `length` is zero.
    pub(crate) grow: f64,
    /// Fixed main-axis size. Zero means flex-sized.
    pub(crate) length: u32,
    /// Sum of `grow` over flex children.
    pub(crate) grow_sum: f64,
    /// Sum of `length` over fixed children.
    pub(crate) length_sum: u64,
    /// Number of flex children.
    pub(crate) flex_children: usize,

    /// Box allocated by flex placement, before scroll and clamping.
    pub(crate) slot: Rect,
    /// Final Box: the slot shifted by scroll, clamped into the parent.
    pub(crate) rect: Rect,
    /// Scroll offsets applied at layout.
    pub(crate) scroll: Scroll,

    /// Displayed text.
    pub(crate) content: Content,
    /// Regenerates `content` from the Box after each layout.
    pub(crate) content_fn: Option<ContentFn>,
    /// Applied to every emitted text run.
    pub(crate) style: Option<StyleFn>,

    /// Blank regions left by the last completed render.
    pub(crate) blank: BlankCache,
    /// Token of the render pass in flight on this node.
    pub(crate) render_token: Option<CancelToken>,
    /// Event listeners.
    pub(crate) listeners: Listeners,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            parent: None,
            index: 0,
            children: Vec::new(),
            vertical: false,
            grow: 1.0,
            length: 0,
            grow_sum: 0.0,
            length_sum: 0,
            flex_children: 0,
            slot: Rect::default(),
            rect: Rect::default(),
            scroll: Scroll::default(),
            content: Content::default(),
            content_fn: None,
            style: None,
            blank: BlankCache::default(),
            render_token: None,
            listeners: Listeners::default(),
        }
    }
}

impl Node {
    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the first child.
    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    /// Return the last child.
    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }

    /// The axis children are laid out along.
    pub fn axis(&self) -> Axis {
        if self.vertical {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    /// Return true if children are stacked vertically.
    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    /// Return the flex weight.
    pub fn grow(&self) -> f64 {
        self.grow
    }

    /// Return the fixed length, zero if flex-sized.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// True if this node is sized by flex rather than a fixed length.
    pub fn is_flex(&self) -> bool {
        self.length == 0
    }

    /// Sum of `grow` over flex children.
    pub fn grow_sum(&self) -> f64 {
        self.grow_sum
    }

    /// Sum of `length` over fixed children.
    pub fn length_sum(&self) -> u64 {
        self.length_sum
    }

    /// True if any child is flex-sized.
    pub fn has_flex_child(&self) -> bool {
        self.flex_children > 0
    }

    /// Return the node's Box.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The slot shifted by scroll, before clamping. Content is wrapped and
    /// children are placed in this space.
    pub fn frame(&self) -> Rect {
        self.slot.scrolled(self.scroll)
    }

    /// Return the scroll offsets.
    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    /// Return the content.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Return the render diff cache.
    pub fn blank(&self) -> &BlankCache {
        &self.blank
    }

    /// Return the event listeners.
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Append a child and fold its flex parameters into the aggregates.
    /// Returns the child's index.
    pub(crate) fn push_child(&mut self, child: NodeId, grow: f64, length: u32) -> usize {
        self.children.push(child);
        if length == 0 {
            self.grow_sum += grow;
            self.flex_children += 1;
        }
        self.length_sum += u64::from(length);
        self.children.len() - 1
    }

    /// True if `child` sits at `index` in this node's children.
    pub(crate) fn owns(&self, child: NodeId, index: usize) -> bool {
        self.children.get(index) == Some(&child)
    }

    /// A flex child's grow changed.
    pub(crate) fn regrow_child(&mut self, old: f64, new: f64) {
        self.grow_sum += new - old;
    }

    /// A child's length changed.
    pub(crate) fn relength_child(&mut self, grow: f64, old: u32, new: u32) {
        self.length_sum = self.length_sum - u64::from(old) + u64::from(new);
        match (old == 0, new == 0) {
            (true, false) => {
                self.grow_sum -= grow;
                self.flex_children -= 1;
            }
            (false, true) => {
                self.grow_sum += grow;
                self.flex_children += 1;
            }
            _ => {}
        }
    }

    /// Drop all children and zero the aggregates. Returns the old children.
    pub(crate) fn take_children(&mut self) -> Vec<NodeId> {
        self.grow_sum = 0.0;
        self.length_sum = 0;
        self.flex_children = 0;
        mem::take(&mut self.children)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("vertical", &self.vertical)
            .field("grow", &self.grow)
            .field("length", &self.length)
            .field("rect", &self.rect)
            .field("scroll", &self.scroll)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn aggregates_track_children() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));
        let mut n = Node::default();

        assert_eq!(n.push_child(a, 2.0, 0), 0);
        assert_eq!(n.push_child(b, 1.0, 5), 1);
        assert_eq!(n.grow_sum(), 2.0);
        assert_eq!(n.length_sum(), 5);
        assert!(n.has_flex_child());
        assert!(n.owns(b, 1));
        assert!(!n.owns(b, 0));

        n.relength_child(2.0, 0, 3);
        assert_eq!(n.grow_sum(), 0.0);
        assert_eq!(n.length_sum(), 8);
        assert!(!n.has_flex_child());

        n.relength_child(1.0, 5, 0);
        assert_eq!(n.grow_sum(), 1.0);
        assert_eq!(n.length_sum(), 3);

        assert_eq!(n.take_children(), vec![a, b]);
        assert_eq!(n.grow_sum(), 0.0);
        assert_eq!(n.length_sum(), 0);
        assert!(!n.has_flex_child());
    }
}
