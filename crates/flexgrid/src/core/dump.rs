use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    NodeId,
    core::{node::Node, world::Core},
    error::Result,
};

/// Traverses a tree of nodes and returns a string showing the Box, frame and
/// flex parameters of each node, colored for terminal display. This is a
/// debug function.
pub fn dump(core: &Core, root: NodeId) -> Result<String> {
    dump_into(Buffer::ansi(), core, root)
}

/// Like [`dump`], without color sequences.
pub fn dump_plain(core: &Core, root: NodeId) -> Result<String> {
    dump_into(Buffer::no_color(), core, root)
}

/// Dump a subtree into a buffer and return the text.
fn dump_into(mut buffer: Buffer, core: &Core, root: NodeId) -> Result<String> {
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Helper to write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Node fields shown in the dump.
struct Summary {
    /// Header flags.
    flags: Vec<&'static str>,
    /// Labelled values.
    fields: Vec<(&'static str, String)>,
    /// Children to recurse into.
    children: Vec<NodeId>,
}

/// Snapshot the fields we print.
fn summarize(n: &Node, is_root: bool) -> Summary {
    let mut flags = Vec::new();
    if is_root {
        flags.push("root");
    } else if n.parent().is_none() {
        flags.push("detached");
    }
    if n.is_vertical() {
        flags.push("vertical");
    }
    if n.is_flex() {
        flags.push("flex");
    }
    let sizing = if n.is_flex() {
        format!("grow {}", n.grow())
    } else {
        format!("length {}", n.length())
    };
    let mut fields = vec![
        ("rect:", n.rect().to_string()),
        ("frame:", n.frame().to_string()),
        ("sizing:", sizing),
    ];
    if !n.children().is_empty() {
        fields.push((
            "children:",
            format!(
                "grow_sum {}, length_sum {}",
                n.grow_sum(),
                n.length_sum()
            ),
        ));
    }
    if !n.scroll().is_zero() {
        fields.push(("scroll:", format!("{:?}", n.scroll())));
    }
    if let Some(v) = n.content().value() {
        fields.push(("content:", format!("{v:?}")));
    }
    Summary {
        flags,
        fields,
        children: n.children().to_vec(),
    }
}

/// Walk a node subtree and emit formatted debug output.
fn dump_node(buffer: &mut Buffer, core: &Core, node_id: NodeId, level: usize) -> Result<()> {
    let is_root = node_id == core.root_id();
    let summary = core.with_node(node_id, |n| summarize(n, is_root))?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{node_id:?}")?;
    buffer.reset()?;
    if !summary.flags.is_empty() {
        write!(buffer, " ")?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(buffer, "{}", summary.flags.join(", "))?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    for (label, value) in &summary.fields {
        write_field(buffer, &indent, label, value)?;
    }
    for child in summary.children {
        dump_node(buffer, core, child, level + 1)?;
    }
    Ok(())
}
