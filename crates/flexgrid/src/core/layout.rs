use tracing::{debug, trace, warn};

use crate::{
    NodeId,
    core::world::Core,
    error::Result,
    event::Event,
    geom::{Axis, Rect},
    options::{FlexRounding, ZeroGrow},
};

/// Slack added before flooring cumulative shares, so exact products that land
/// a hair under an integer don't lose a cell.
const EPSILON: f64 = 1e-9;

/// Convert a cell count to a coordinate offset, saturating.
fn cells(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// What a child needs to know about its parent to be placed.
#[derive(Debug, Clone)]
struct ParentView {
    /// Space children are placed in.
    frame: Rect,
    /// Box children are clamped into.
    rect: Rect,
    /// Main axis.
    axis: Axis,
    /// Sum of grow over flex children.
    grow_sum: f64,
    /// Sum of fixed lengths.
    length_sum: u64,
    /// True if any child is flex-sized.
    has_flex: bool,
    /// Children in order.
    children: Vec<NodeId>,
}

/// A single layout pass over one subtree.
///
/// Each parent places all of its children before any child settles its own
/// subtree, so a child always sees final sibling positions. Node locks are
/// taken one at a time and never held across callbacks.
pub(crate) struct LayoutPass<'a> {
    /// The core being laid out.
    core: &'a Core,
}

impl<'a> LayoutPass<'a> {
    /// Construct a pass over a core.
    pub(crate) fn new(core: &'a Core) -> Self {
        Self { core }
    }

    /// Lay out the subtree rooted at `id`.
    pub(crate) fn run(&self, id: NodeId) -> Result<()> {
        debug!(?id, "layout");
        if id == self.core.root_id() {
            if !self.size_root()? {
                return Ok(());
            }
        } else {
            let before = self.grow_before(id)?;
            self.place(id, before)?;
        }
        self.settle(id)
    }

    /// Size the root to the terminal. Returns `false` if the terminal could
    /// not be queried, in which case nothing was touched.
    fn size_root(&self) -> Result<bool> {
        match self.core.terminal().size() {
            Ok(size) => {
                let r = size.rect();
                trace!(%r, "root sized");
                self.core.with_node_mut(self.core.root_id(), |n| {
                    n.slot = r;
                    n.rect = r;
                })?;
                Ok(true)
            }
            Err(e) => {
                warn!("skipping layout, terminal size unavailable: {e}");
                Ok(false)
            }
        }
    }

    /// Regenerate content, place every child, recurse, then notify.
    fn settle(&self, id: NodeId) -> Result<()> {
        let (content_fn, rect) = self.core.with_node(id, |n| (n.content_fn.clone(), n.rect))?;
        let generated = content_fn.map(|f| f(&rect));
        let children = self.core.with_node_mut(id, |n| {
            if let Some(value) = generated {
                n.content.set_value(value);
            }
            n.blank.invalidate();
            n.children.clone()
        })?;

        let mut before = 0.0;
        for child in &children {
            before += self.place(*child, before)?;
        }
        for child in &children {
            self.settle(*child)?;
        }
        self.core.fire(id, Event::LayoutUpdated)
    }

    /// Grow of the flex siblings that precede a node.
    fn grow_before(&self, id: NodeId) -> Result<f64> {
        let (parent, index) = self.core.with_node(id, |n| (n.parent, n.index))?;
        let Some(parent) = parent else {
            return Ok(0.0);
        };
        let siblings = self.core.with_node(parent, |p| {
            p.children.iter().take(index).copied().collect::<Vec<_>>()
        })?;
        let mut before = 0.0;
        for s in siblings {
            before += self
                .core
                .with_node(s, |n| if n.is_flex() { n.grow.max(0.0) } else { 0.0 })?;
        }
        Ok(before)
    }

    /// Snapshot the parent fields placement reads.
    fn parent_view(&self, parent: NodeId) -> Result<ParentView> {
        self.core.with_node(parent, |p| ParentView {
            frame: p.frame(),
            rect: p.rect,
            axis: p.axis(),
            grow_sum: p.grow_sum,
            length_sum: p.length_sum,
            has_flex: p.has_flex_child(),
            children: p.children.clone(),
        })
    }

    /// Place one child within its parent. `grow_before` is the grow of the
    /// flex siblings before it. Returns this node's own flex contribution.
    fn place(&self, id: NodeId, grow_before: f64) -> Result<f64> {
        let (parent, index, grow, length) =
            self.core.with_node(id, |n| (n.parent, n.index, n.grow, n.length))?;
        let Some(parent) = parent else {
            return Ok(0.0);
        };
        let p = self.parent_view(parent)?;
        if p.children.get(index) != Some(&id) {
            return Ok(0.0);
        }

        let axis = p.axis;
        let mut slot = Rect::default();
        slot.copy_axis(axis.cross(), &p.frame);

        let leading = match index.checked_sub(1) {
            None => p.frame.leading(axis),
            Some(prev) => self.core.with_node(p.children[prev], |s| s.slot.trailing(axis))?,
        };
        slot.set_leading(axis, leading);

        let size = if length > 0 {
            cells(length)
        } else {
            self.flex_share(&p, grow, grow_before)
        };

        let mut snapped = false;
        if index + 1 == p.children.len() {
            slot.set_trailing(axis, p.frame.trailing(axis));
            if length > 0 {
                if !p.has_flex {
                    slot.set_trailing(axis, leading.saturating_add(size));
                } else if p.children.len() != 1 {
                    slot.set_leading(axis, slot.trailing(axis).saturating_sub(size));
                    snapped = true;
                }
            }
        } else {
            slot.set_trailing(axis, leading.saturating_add(size));
        }

        trace!(?id, %slot, "placed");
        self.core.with_node_mut(id, |n| {
            n.slot = slot;
            n.rect = slot.scrolled(n.scroll).clamp_to(&p.rect);
        })?;

        if snapped {
            self.realign(&p, index)?;
        }
        Ok(if length == 0 { grow.max(0.0) } else { 0.0 })
    }

    /// After the last child snapped to the far edge, walk back over earlier
    /// siblings until one already meets its successor. Fixed siblings keep
    /// their length and shift; flex siblings stretch.
    fn realign(&self, p: &ParentView, from: usize) -> Result<()> {
        let axis = p.axis;
        let mut next_leading = self
            .core
            .with_node(p.children[from], |n| n.slot.leading(axis))?;
        for i in (0..from).rev() {
            let moved = self.core.with_node_mut(p.children[i], |s| {
                if s.slot.trailing(axis) == next_leading {
                    return None;
                }
                s.slot.set_trailing(axis, next_leading);
                if s.length > 0 {
                    s.slot
                        .set_leading(axis, next_leading.saturating_sub(cells(s.length)));
                }
                s.rect = s.slot.scrolled(s.scroll).clamp_to(&p.rect);
                Some(s.slot.leading(axis))
            })?;
            match moved {
                Some(l) => next_leading = l,
                None => break,
            }
        }
        Ok(())
    }

    /// Main-axis size of a flex child.
    fn flex_share(&self, p: &ParentView, grow: f64, grow_before: f64) -> i32 {
        let fixed = i64::try_from(p.length_sum).unwrap_or(i64::MAX);
        let remaining = (i64::from(p.frame.extent(p.axis)) - fixed).max(0) as f64;
        let options = self.core.options();
        if p.grow_sum <= 0.0 {
            return match options.zero_grow {
                ZeroGrow::FillRemaining => remaining as i32,
                ZeroGrow::Collapse => 0,
            };
        }
        let grow = grow.max(0.0);
        let share = match options.rounding {
            FlexRounding::Floor => (remaining / (p.grow_sum / grow)).floor(),
            FlexRounding::Spread => {
                let end = (remaining * (grow_before + grow) / p.grow_sum + EPSILON).floor();
                let start = (remaining * grow_before / p.grow_sum + EPSILON).floor();
                end - start
            }
        };
        share.max(0.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        geom::Expanse,
        options::Options,
        testing::backend::TestTerminal,
    };

    fn view(extent: i32, grow_sum: f64, length_sum: u64) -> ParentView {
        ParentView {
            frame: Rect::new(0, 0, 1, extent),
            rect: Rect::new(0, 0, 1, extent),
            axis: Axis::Horizontal,
            grow_sum,
            length_sum,
            has_flex: true,
            children: Vec::new(),
        }
    }

    fn core(options: Options) -> Core {
        let (_, tt) = TestTerminal::create(Expanse::new(10, 1));
        Core::with_options(tt, options)
    }

    #[test]
    fn spread_shares_sum_to_remaining() {
        let c = core(Options::default());
        let lp = LayoutPass::new(&c);
        let p = view(10, 3.0, 0);
        let shares: Vec<_> = (0..3)
            .map(|i| lp.flex_share(&p, 1.0, f64::from(i)))
            .collect();
        assert_eq!(shares, vec![3, 3, 4]);
    }

    #[test]
    fn floor_shares() {
        let c = core(Options {
            rounding: FlexRounding::Floor,
            ..Options::default()
        });
        let lp = LayoutPass::new(&c);
        let p = view(10, 3.0, 0);
        assert_eq!(lp.flex_share(&p, 1.0, 0.0), 3);
        assert_eq!(lp.flex_share(&p, 2.0, 1.0), 6);
        assert_eq!(lp.flex_share(&p, 0.0, 0.0), 0);
    }

    #[test]
    fn fixed_lengths_reduce_remaining() {
        let c = core(Options::default());
        let lp = LayoutPass::new(&c);
        assert_eq!(lp.flex_share(&view(80, 1.0, 10), 1.0, 0.0), 70);
        assert_eq!(lp.flex_share(&view(8, 1.0, 10), 1.0, 0.0), 0);
    }

    #[test]
    fn zero_grow_policies() {
        let fill = core(Options::default());
        assert_eq!(LayoutPass::new(&fill).flex_share(&view(12, 0.0, 2), 0.0, 0.0), 10);
        let collapse = core(Options {
            zero_grow: ZeroGrow::Collapse,
            ..Options::default()
        });
        assert_eq!(
            LayoutPass::new(&collapse).flex_share(&view(12, 0.0, 2), 0.0, 0.0),
            0
        );
    }

    #[test]
    fn negative_grow_counts_as_zero() {
        let c = core(Options::default());
        let lp = LayoutPass::new(&c);
        assert_eq!(lp.flex_share(&view(10, 2.0, 0), -1.0, 0.0), 0);
    }
}
