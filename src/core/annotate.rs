use crate::models::entry::Entry;

/// Stamps every node with its size as a fraction (0-100) of the root's total
/// size. Pure, idempotent, the only mutation the tree sees after the scan.
pub fn annotate_percentages(root: &mut Entry) {
    let total = root.size_bytes;
    stamp(root, total);
}

fn stamp(node: &mut Entry, total: u64) {
    node.percent_of_total = if total == 0 {
        0.0
    } else {
        node.size_bytes as f64 * 100.0 / total as f64
    };
    for child in &mut node.children {
        stamp(child, total);
    }
}
