use std::time::Duration;

/// What a flex child receives when the grow sum of its siblings is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroGrow {
    /// Take all of the space left after fixed-length siblings.
    #[default]
    FillRemaining,
    /// Take no space.
    Collapse,
}

/// How flex shares are rounded to whole cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexRounding {
    /// Each flex child gets `floor(remaining * grow / grow_sum)` computed on
    /// its own. The last child stretches to the parent edge, so it absorbs
    /// every leftover cell.
    Floor,
    /// Shares are differences of cumulative floors over the flex siblings, so
    /// leftover cells are spread one at a time and every share is within one
    /// cell of its exact proportion.
    #[default]
    Spread,
}

/// Options controlling layout policy and render scheduling.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Quiet period a burst of resize notifications must settle for before
    /// the tree is laid out and redrawn.
    pub debounce: Duration,
    /// Policy for a zero grow sum.
    pub zero_grow: ZeroGrow,
    /// Rounding of flex shares.
    pub rounding: FlexRounding,
    /// Render the children of a node on scoped threads.
    pub concurrent_render: bool,
}

impl Options {
    /// Options that render sibling subtrees concurrently.
    pub fn concurrent() -> Self {
        Self {
            concurrent_render: true,
            ..Self::default()
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            zero_grow: ZeroGrow::default(),
            rounding: FlexRounding::default(),
            concurrent_render: false,
        }
    }
}
