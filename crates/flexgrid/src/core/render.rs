use std::{panic, thread};

use tracing::{debug, trace};

use crate::{
    NodeId,
    backend::queue_cursor,
    core::{
        cancel::CancelToken,
        content::Content,
        node::{BlankCache, StyleFn},
        world::{Core, lock},
    },
    error::Result,
    geom::Rect,
};

/// Outcome of rendering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The pass ran to the end and its output was written.
    Completed,
    /// A newer render of the same node cancelled this one. Nothing was
    /// written and the diff cache was left alone.
    Superseded,
}

/// Convert a non-negative coordinate difference to a count.
fn count(v: i32) -> usize {
    usize::try_from(v).unwrap_or(0)
}

/// Convert a count to a coordinate offset, saturating.
fn offset(v: usize) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Everything a node contributes to one paint, snapshotted under its lock.
struct Paint<'a> {
    /// Space content wraps in.
    frame: Rect,
    /// Screen region the node may draw into, if any.
    visible: Option<Rect>,
    /// Text to paint.
    content: &'a Content,
    /// Applied to each emitted run.
    style: Option<&'a StyleFn>,
    /// Cache left by the previous completed paint.
    previous: &'a BlankCache,
    /// First row not covered by children.
    start_row: usize,
}

/// Result of composing a node's output.
#[derive(Debug, PartialEq, Eq)]
enum Composed {
    /// The node is known blank; nothing to write or commit.
    Unchanged,
    /// Output and the cache describing it.
    Frame {
        /// Buffered terminal output.
        out: String,
        /// Cache to commit.
        cache: BlankCache,
    },
}

impl Paint<'_> {
    /// Buffer one row run, clipped to the visible region.
    fn emit(&self, out: &mut String, row: usize, run: &str) {
        let Some(vis) = self.visible else {
            return;
        };
        let y = self.frame.top.saturating_add(offset(row));
        if y < vis.top || y >= vis.bottom {
            return;
        }
        let len = run.chars().count();
        let skip = count(vis.left - self.frame.left);
        let end = count(vis.right - self.frame.left).min(len);
        if end <= skip {
            return;
        }
        let clipped: String = if skip == 0 && end == len {
            run.to_string()
        } else {
            run.chars().skip(skip).take(end - skip).collect()
        };
        queue_cursor(out, y, self.frame.left.saturating_add(offset(skip)));
        match self.style {
            Some(f) => out.push_str(&f(&clipped)),
            None => out.push_str(&clipped),
        }
    }

    /// Wrap content into rows and buffer the output. Returns `None` if the
    /// token was cancelled part way.
    fn compose(&self, token: &CancelToken) -> Option<Composed> {
        let blank_content = self.content.is_blank();
        if blank_content && self.previous.first_row == Some(0) {
            return Some(Composed::Unchanged);
        }

        let width = count(self.frame.width());
        let height = count(self.frame.height());
        let len = self.content.display_len();
        let blank_line = " ".repeat(width);

        let mut out = String::new();
        let mut columns = vec![0; height];
        let mut first_blank = None;
        let mut a = 0;

        for row in self.start_row..height {
            if token.is_cancelled() {
                return None;
            }
            if blank_content {
                self.emit(&mut out, row, &blank_line);
            } else if a < len {
                let b = a + width;
                let sub = self.content.display_substring(a, len.min(b));
                let text = match sub.find('\n') {
                    Some(nl) => {
                        let text = &sub[..nl];
                        a += text.chars().count() + 1;
                        text
                    }
                    None => {
                        a = b;
                        sub
                    }
                };
                let text_len = text.chars().count();
                let spaces = match self.previous.columns.as_ref().and_then(|c| c.get(row)) {
                    Some(prev) => prev.saturating_sub(text_len),
                    None => width.saturating_sub(text_len),
                };
                columns[row] = text_len;
                self.emit(&mut out, row, &format!("{text}{}", &blank_line[..spaces.min(width)]));
            } else {
                first_blank.get_or_insert(row);
                if self.previous.first_row.is_some_and(|r| r <= row) {
                    break;
                }
                self.emit(&mut out, row, &blank_line);
            }
        }

        let cache = BlankCache {
            first_row: if blank_content { Some(0) } else { first_blank },
            columns: Some(columns),
        };
        Some(Composed::Frame { out, cache })
    }
}

/// A render pass over one subtree.
///
/// Children paint before their parent, and the parent then paints only the
/// rows below its last child. Each node writes its buffered output in a
/// single terminal write, so a superseded pass never leaves a partial node
/// on screen.
pub(crate) struct RenderPass<'a> {
    /// The core being rendered.
    core: &'a Core,
}

impl<'a> RenderPass<'a> {
    /// Construct a pass over a core.
    pub(crate) fn new(core: &'a Core) -> Self {
        Self { core }
    }

    /// Render the subtree rooted at `id`, cancelling any pass already in
    /// flight on it.
    pub(crate) fn run(&self, id: NodeId) -> Result<Pass> {
        let token = CancelToken::new();
        self.core.with_node_mut(id, |n| {
            if let Some(old) = n.render_token.replace(token.clone()) {
                old.cancel();
            }
        })?;
        let outcome = self.paint_tree(id, &token);
        self.core.with_node_mut(id, |n| {
            if n.render_token.as_ref().is_some_and(|t| t.same(&token)) {
                n.render_token = None;
            }
        })?;
        match outcome {
            Ok(Pass::Superseded) => debug!(?id, "render superseded"),
            Ok(Pass::Completed) => trace!(?id, "render completed"),
            Err(ref e) => debug!(?id, "render failed: {e}"),
        }
        outcome
    }

    /// Render children, then this node.
    fn paint_tree(&self, id: NodeId, token: &CancelToken) -> Result<Pass> {
        let children = self.core.children(id)?;
        if self.core.options().concurrent_render && children.len() > 1 {
            self.render_concurrent(&children, token)?;
        } else {
            for child in &children {
                if token.is_cancelled() {
                    return Ok(Pass::Superseded);
                }
                self.core.render(*child)?;
            }
        }
        if token.is_cancelled() {
            return Ok(Pass::Superseded);
        }
        self.paint(id, &children, token)
    }

    /// Render sibling subtrees on scoped threads. The first error wins;
    /// panics are propagated.
    fn render_concurrent(&self, children: &[NodeId], token: &CancelToken) -> Result<()> {
        let core = self.core;
        thread::scope(|s| {
            let handles: Vec<_> = children
                .iter()
                .take_while(|_| !token.is_cancelled())
                .map(|child| s.spawn(move || core.render(*child)))
                .collect();
            let mut result = Ok(());
            for h in handles {
                match h.join() {
                    Ok(Err(e)) if result.is_ok() => result = Err(e),
                    Ok(_) => {}
                    Err(e) => panic::resume_unwind(e),
                }
            }
            result
        })
    }

    /// The screen region a node may draw into: its Box intersected with the
    /// Box of every ancestor.
    fn visible(&self, rect: Rect, mut parent: Option<NodeId>) -> Result<Option<Rect>> {
        let mut vis = Some(rect).filter(|r| !r.is_empty());
        while let (Some(v), Some(pid)) = (vis, parent) {
            let (prect, next) = self.core.with_node(pid, |p| (p.rect, p.parent))?;
            vis = v.intersect(&prect);
            parent = next;
        }
        Ok(vis)
    }

    /// First row of the node not covered by its children, measured on the
    /// children's unclamped slots so it indexes the same rows as the frame.
    fn start_row(&self, children: &[NodeId]) -> Result<usize> {
        let (Some(first), Some(last)) = (children.first(), children.last()) else {
            return Ok(0);
        };
        let top = self.core.with_node(*first, |n| n.slot.top)?;
        let bottom = self.core.with_node(*last, |n| n.slot.bottom)?;
        Ok(count(bottom.saturating_sub(top)))
    }

    /// Paint this node's own rows, then commit and write if still current.
    fn paint(&self, id: NodeId, children: &[NodeId], token: &CancelToken) -> Result<Pass> {
        let start_row = self.start_row(children)?;
        let (frame, rect, parent, content, style, previous) = self.core.with_node(id, |n| {
            (
                n.frame(),
                n.rect,
                n.parent,
                n.content.clone(),
                n.style.clone(),
                n.blank.clone(),
            )
        })?;
        let paint = Paint {
            frame,
            visible: self.visible(rect, parent)?,
            content: &content,
            style: style.as_ref(),
            previous: &previous,
            start_row,
        };
        let Some(composed) = paint.compose(token) else {
            return Ok(Pass::Superseded);
        };
        let Composed::Frame { out, cache } = composed else {
            return Ok(Pass::Completed);
        };

        let h = self.core.handle(id)?;
        let mut n = lock(&h);
        if token.is_cancelled() {
            return Ok(Pass::Superseded);
        }
        // A layout or style change since the snapshot makes this cache stale.
        if n.blank == previous {
            n.blank = cache;
        } else {
            n.blank.invalidate();
        }
        if !out.is_empty() {
            self.core.terminal().write(&out)?;
        }
        Ok(Pass::Completed)
    }
}
