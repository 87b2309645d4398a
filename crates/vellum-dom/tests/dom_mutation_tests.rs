//! Tests for DOM tree mutation methods: remove_child, insert_before, clear_children.

use vellum_dom::{DomTree, ElementData, NodeId};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(ElementData::new(tag))
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child);

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three_relinks_siblings() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "i");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_of_other_parent_is_ignored() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let other = alloc_element(&mut tree, "div");
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    tree.remove_child(other, child);

    assert_eq!(tree.parent(child), Some(parent));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_reference() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    let first = alloc_element(&mut tree, "li");
    let second = alloc_element(&mut tree, "li");
    tree.append_child(parent, second);
    tree.insert_before(parent, first, Some(second));

    assert_eq!(tree.children(parent), &[first, second]);
    assert_eq!(tree.first_child(parent), Some(first));
    assert_eq!(tree.next_sibling(first), Some(second));
}

#[test]
fn test_append_moves_node_from_previous_parent() {
    let mut tree = DomTree::new();
    let old_parent = alloc_element(&mut tree, "div");
    let new_parent = alloc_element(&mut tree, "section");
    let child = alloc_element(&mut tree, "p");
    tree.append_child(old_parent, child);
    tree.append_child(new_parent, child);

    assert!(tree.children(old_parent).is_empty());
    assert_eq!(tree.parent(child), Some(new_parent));
}

// ========== clear_children ==========

#[test]
fn test_clear_children_detaches_all() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let text = tree.create_text("hi");
    tree.append_child(parent, a);
    tree.append_child(parent, text);

    tree.clear_children(parent);

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.next_sibling(a), None);
}
