use serde::{Deserialize, Serialize};

/// Kind of a node in the deck tree. Decks own cards, folders own other nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  Deck,
  Folder,
}

impl NodeKind {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "deck" => Some(Self::Deck),
      "folder" => Some(Self::Folder),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Deck => "deck",
      Self::Folder => "folder",
    }
  }
}

/// A node in the deck hierarchy: either a leaf deck or a folder.
///
/// The aggregate fields are derived data maintained by the stats recompute
/// pass. For a deck they summarize its own cards, for a folder its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckNode {
  pub id: i64,
  pub title: String,
  pub kind: NodeKind,
  pub parent_id: Option<i64>,

  // Aggregates, recomputed bottom-up after every structural mutation
  pub card_count: i64,
  pub due_count: i64,
  pub progress: f64,
}

impl DeckNode {
  pub fn new(title: String, kind: NodeKind, parent_id: Option<i64>) -> Self {
    Self {
      id: 0,
      title,
      kind,
      parent_id,
      card_count: 0,
      due_count: 0,
      progress: 0.0,
    }
  }

  pub fn is_folder(&self) -> bool {
    self.kind == NodeKind::Folder
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_node_kind_from_str() {
    assert_eq!(NodeKind::from_str("deck"), Some(NodeKind::Deck));
    assert_eq!(NodeKind::from_str("folder"), Some(NodeKind::Folder));
    assert_eq!(NodeKind::from_str("Deck"), None);
    assert_eq!(NodeKind::from_str(""), None);
  }

  #[test]
  fn test_node_kind_as_str_roundtrip() {
    for kind in [NodeKind::Deck, NodeKind::Folder] {
      assert_eq!(NodeKind::from_str(kind.as_str()), Some(kind));
    }
  }

  #[test]
  fn test_new_node_has_zero_aggregates() {
    let node = DeckNode::new("Verbs".to_string(), NodeKind::Deck, Some(3));
    assert_eq!(node.id, 0);
    assert_eq!(node.parent_id, Some(3));
    assert_eq!(node.card_count, 0);
    assert_eq!(node.due_count, 0);
    assert!(node.progress.abs() < f64::EPSILON);
  }

  #[test]
  fn test_is_folder() {
    assert!(DeckNode::new("f".to_string(), NodeKind::Folder, None).is_folder());
    assert!(!DeckNode::new("d".to_string(), NodeKind::Deck, None).is_folder());
  }
}
