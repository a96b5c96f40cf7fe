//! Canonical text output.
//!
//! Sections become `[name]` ... `[!name]`, leaves `name = value`, comments
//! `# text`, indented four spaces per level. The root section is implicit
//! and not written. Names and values that the parser would otherwise read
//! as a tag or a comment are wrapped in double quotes.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::{ConfigTree, NodeData};

const INDENT: usize = 4;

#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn serialize(tree: &ConfigTree) -> String {
    let mut out = String::new();
    if let Some(root) = tree.section(tree.root()) {
        for &child in root.children() {
            write_node(tree, child, &mut out);
        }
    }
    out
}

fn write_node(tree: &ConfigTree, idx: Index, out: &mut String) {
    let Some(node) = tree.get(idx) else {
        return;
    };
    let indent = " ".repeat(INDENT * node.depth().saturating_sub(1));

    match node.data() {
        NodeData::Section { name, children } => {
            out.push_str(&format!("{indent}[{name}]\n"));
            for &child in children {
                write_node(tree, child, out);
            }
            out.push_str(&format!("{indent}[!{name}]\n"));
        }
        NodeData::Leaf { name, value } => {
            out.push_str(&format!("{indent}{} = {}\n", quote(name), quote(value)));
        }
        NodeData::Comment { text } if text.is_empty() => {
            out.push_str(&format!("{indent}#\n"));
        }
        NodeData::Comment { text } => {
            out.push_str(&format!("{indent}# {text}\n"));
        }
    }
}

fn quote(s: &str) -> String {
    if s.contains(&['[', '<'][..]) || s.starts_with('#') {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::parser::parse_str;

    #[test]
    fn given_nested_tree_when_serializing_then_indents_by_depth() {
        let mut tree = ConfigTree::new();
        let a = tree.create_section(tree.root(), "a", None);
        tree.create_comment(a, "about b", None);
        let b = tree.create_section(a, "b", None);
        tree.create_leaf(b, "k", "v", None);

        let text = serialize(&tree);

        assert_eq!(
            text,
            "[a]\n    # about b\n    [b]\n        k = v\n    [!b]\n[!a]\n"
        );
    }

    #[test]
    fn given_empty_tree_when_serializing_then_empty_text() {
        assert_eq!(serialize(&ConfigTree::new()), "");
    }

    #[test]
    fn given_bracket_in_value_when_round_tripping_then_value_survives() {
        let mut tree = ConfigTree::new();
        tree.create_leaf(tree.root(), "pattern", "x[0] < y", None);
        tree.create_leaf(tree.root(), "#hash", "", None);

        let reparsed = parse_str("rt.conf", &serialize(&tree)).unwrap();

        assert!(tree.same_structure(&reparsed));
    }

    #[test]
    fn given_parsed_file_when_round_tripping_then_structure_is_identical() {
        let input = "# header\n[a] k = 1 [!a]\n<b>\n  #\n  = empty key\n  flag\n  <c> url = x=y </c>\n</b>\n";
        let first = parse_str("in.conf", input).unwrap();

        let second = parse_str("out.conf", &serialize(&first)).unwrap();

        assert!(first.same_structure(&second));
    }
}
