//! Deck hierarchy resolution.
//!
//! The deck tree is stored flat (each node carries a `parent_id`); every
//! operation here rebuilds the parent→children adjacency from the full node
//! list it is given, so resolution never works off a stale index. These run
//! on hot read paths, so unknown ids degrade to empty results with a logged
//! diagnostic instead of surfacing errors.

use std::collections::{HashMap, HashSet, VecDeque};

use rusqlite::Connection;

use crate::db::{self, LogOnError};
use crate::domain::{Card, DeckNode, NodeKind};

/// Parent id → child ids, built from the current node list.
pub fn build_children_index(nodes: &[DeckNode]) -> HashMap<i64, Vec<i64>> {
  let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
  for node in nodes {
    if let Some(parent_id) = node.parent_id {
      children.entry(parent_id).or_default().push(node.id);
    }
  }
  children
}

/// All deck ids reachable from `node_id`: the node itself when it is a deck,
/// otherwise every deck under the folder's subtree. Folders are traversed but
/// not collected. Unknown ids yield an empty set.
pub fn descendant_deck_ids(nodes: &[DeckNode], node_id: i64) -> Vec<i64> {
  let by_id: HashMap<i64, &DeckNode> = nodes.iter().map(|n| (n.id, n)).collect();
  if !by_id.contains_key(&node_id) {
    tracing::warn!("descendant_deck_ids: unknown node {}", node_id);
    return Vec::new();
  }

  let children = build_children_index(nodes);
  let mut decks = Vec::new();
  let mut visited = HashSet::new();
  let mut queue = VecDeque::from([node_id]);

  while let Some(id) = queue.pop_front() {
    if !visited.insert(id) {
      // Malformed parent chain; already handled this node
      continue;
    }
    let Some(node) = by_id.get(&id) else { continue };
    match node.kind {
      NodeKind::Deck => decks.push(id),
      NodeKind::Folder => {
        if let Some(kids) = children.get(&id) {
          queue.extend(kids.iter().copied());
        }
      }
    }
  }

  decks
}

/// Every node id in the subtree rooted at `node_id`, including the root and
/// intermediate folders. Used by cascade delete.
pub fn subtree_node_ids(nodes: &[DeckNode], node_id: i64) -> Vec<i64> {
  let ids: HashSet<i64> = nodes.iter().map(|n| n.id).collect();
  if !ids.contains(&node_id) {
    return Vec::new();
  }

  let children = build_children_index(nodes);
  let mut subtree = Vec::new();
  let mut visited = HashSet::new();
  let mut queue = VecDeque::from([node_id]);

  while let Some(id) = queue.pop_front() {
    if !visited.insert(id) {
      continue;
    }
    subtree.push(id);
    if let Some(kids) = children.get(&id) {
      queue.extend(kids.iter().copied());
    }
  }

  subtree
}

/// Flattened card set under a node: a deck's own cards, or the union of all
/// cards owned by a folder's descendant decks. Empty on unknown ids.
pub fn cards_in_scope(conn: &Connection, node_id: i64) -> Vec<Card> {
  let nodes = db::list_nodes(conn).log_warn_default("cards_in_scope: failed to load nodes");
  let deck_ids = descendant_deck_ids(&nodes, node_id);
  db::list_cards_for_decks(conn, &deck_ids)
    .log_warn_default("cards_in_scope: failed to load cards")
}
