use crossterm::style::Stylize;
use flexgrid::{Core, NodeId, error::Result};
use tracing::debug;

/// Width of the sidebar in columns.
pub const SIDEBAR_WIDTH: u32 = 20;

/// Nodes making up the split layout.
#[derive(Debug, Clone, Copy)]
pub struct Splits {
    /// Everything above the status line.
    pub content: NodeId,
    /// Fixed-width sidebar.
    pub sidebar: NodeId,
    /// One-column divider between sidebar and main.
    pub rule: NodeId,
    /// Flex main pane.
    pub main: NodeId,
    /// One-row status line pinned to the bottom.
    pub status: NodeId,
}

/// Create a node with a fixed length and attach it.
fn fixed(core: &Core, parent: NodeId, length: u32) -> Result<NodeId> {
    let id = core.create();
    core.set_length(id, length)?;
    core.add_child(parent, id)?;
    Ok(id)
}

/// Create a flex node and attach it.
fn flex(core: &Core, parent: NodeId) -> Result<NodeId> {
    let id = core.create();
    core.add_child(parent, id)?;
    Ok(id)
}

/// Build the demo tree under the core's root:
///
/// ```text
/// +---------+-+--------------+
/// | sidebar |│| main         |
/// |         |│|              |
/// +---------+-+--------------+
/// | status                   |
/// +--------------------------+
/// ```
pub fn build_splits(core: &Core) -> Result<Splits> {
    let root = core.root_id();
    core.set_vertical(root, true)?;

    let content = flex(core, root)?;
    let status = fixed(core, root, 1)?;

    let sidebar = fixed(core, content, SIDEBAR_WIDTH)?;
    core.set_content(sidebar, "sidebar\n\nnodes:\n- sidebar\n- rule\n- main\n- status")?;

    let rule = fixed(core, content, 1)?;
    core.set_content_fn(rule, |r| "│".repeat(usize::try_from(r.height()).unwrap_or(0)))?;

    let main = flex(core, content)?;
    core.set_content_fn(main, |r| {
        format!(
            "main {}x{}\n\nresize the terminal; the layout follows.",
            r.width(),
            r.height()
        )
    })?;

    core.set_content_fn(status, |r| format!(" {} cols | q quits", r.width()))?;
    core.set_style(status, |s| s.reverse().to_string())?;

    debug!("split layout built");
    Ok(Splits {
        content,
        sidebar,
        rule,
        main,
        status,
    })
}

#[cfg(test)]
mod tests {
    use flexgrid::{
        geom::{Expanse, Rect},
        testing::backend::TestTerminal,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn splits_layout_and_render() -> Result<()> {
        let (buf, tt) = TestTerminal::create(Expanse::new(40, 10));
        let core = Core::new(tt);
        let s = build_splits(&core)?;
        core.redraw()?;

        assert_eq!(core.rect(s.content)?, Rect::new(0, 0, 9, 40));
        assert_eq!(core.rect(s.status)?, Rect::new(9, 0, 10, 40));
        assert_eq!(core.rect(s.sidebar)?, Rect::new(0, 0, 9, 20));
        assert_eq!(core.rect(s.rule)?, Rect::new(0, 20, 9, 21));
        assert_eq!(core.rect(s.main)?, Rect::new(0, 21, 9, 40));

        let rows = buf.lock().unwrap().grid().rows();
        assert!(rows[0].starts_with("sidebar"));
        assert!(rows.iter().take(9).all(|r| r.chars().nth(20) == Some('│')));
        assert!(
            rows[0]
                .chars()
                .skip(21)
                .collect::<String>()
                .starts_with("main 19x9")
        );
        assert!(rows[9].starts_with(" 40 cols | q quits"));
        assert!(buf.lock().unwrap().contains("\x1b[7m"));
        Ok(())
    }

    #[test]
    fn splits_follow_resize() -> Result<()> {
        let (buf, tt) = TestTerminal::create(Expanse::new(40, 10));
        let core = Core::new(tt);
        let s = build_splits(&core)?;
        core.redraw()?;

        buf.lock().unwrap().size = Some(Expanse::new(60, 5));
        core.redraw()?;
        assert_eq!(core.rect(s.main)?, Rect::new(0, 21, 4, 60));
        assert_eq!(core.content(s.main)?.as_deref().map(|c| &c[..9]), Some("main 39x4"));
        Ok(())
    }
}
