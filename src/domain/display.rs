use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::{ConfigTree, NodeData};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for ConfigTree {
    fn to_tree_string(&self) -> Tree<String> {
        fn label(data: &NodeData) -> String {
            match data {
                NodeData::Section { name, .. } => format!("[{}]", name),
                NodeData::Leaf { name, value } => format!("{} = {}", name, value),
                NodeData::Comment { text } => format!("# {}", text),
            }
        }

        fn build_tree(tree: &ConfigTree, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = tree.get(node_idx) {
                for &child_idx in node.children() {
                    if let Some(child) = tree.get(child_idx) {
                        let mut child_tree = Tree::new(label(child.data()));
                        build_tree(tree, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut root = Tree::new(crate::domain::ROOT_NAME.to_string());
        build_tree(self, self.root().index(), &mut root);
        root
    }
}
