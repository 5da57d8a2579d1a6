use rusqlite::{Connection, Result, params};

use crate::domain::{DeckNode, NodeKind};
use crate::error::AppError;
use crate::hierarchy;

pub fn get_node(conn: &Connection, id: i64) -> Result<Option<DeckNode>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, title, kind, parent_id, card_count, due_count, progress
    FROM deck_nodes WHERE id = ?1
    "#,
  )?;

  let mut rows = stmt.query(params![id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_node(row)?))
  } else {
    Ok(None)
  }
}

pub fn list_nodes(conn: &Connection) -> Result<Vec<DeckNode>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, title, kind, parent_id, card_count, due_count, progress
    FROM deck_nodes
    ORDER BY id ASC
    "#,
  )?;

  let nodes = stmt
    .query_map([], |row| row_to_node(row))?
    .collect::<Result<Vec<_>>>()?;
  Ok(nodes)
}

/// Create a deck or folder. The parent, when present, must exist and be a
/// folder; sibling titles must be unique.
pub fn insert_node(conn: &Connection, node: &DeckNode) -> std::result::Result<i64, AppError> {
  validate_parent(conn, node.parent_id)?;
  ensure_unique_sibling_title(conn, node.parent_id, &node.title, None)?;

  conn.execute(
    r#"
    INSERT INTO deck_nodes (title, kind, parent_id, card_count, due_count, progress)
    VALUES (?1, ?2, ?3, 0, 0, 0)
    "#,
    params![node.title, node.kind.as_str(), node.parent_id],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn rename_node(conn: &Connection, id: i64, title: &str) -> std::result::Result<(), AppError> {
  let node = get_node(conn, id)?.ok_or_else(|| AppError::not_found(format!("deck node {}", id)))?;
  ensure_unique_sibling_title(conn, node.parent_id, title, Some(id))?;

  conn.execute(
    "UPDATE deck_nodes SET title = ?1 WHERE id = ?2",
    params![title, id],
  )?;
  Ok(())
}

/// Reparent a node. Moving a node under itself or under one of its own
/// descendants is rejected, keeping the tree acyclic.
pub fn move_node(
  conn: &Connection,
  id: i64,
  new_parent_id: Option<i64>,
) -> std::result::Result<(), AppError> {
  let node = get_node(conn, id)?.ok_or_else(|| AppError::not_found(format!("deck node {}", id)))?;

  if let Some(parent_id) = new_parent_id {
    if parent_id == id {
      return Err(AppError::invalid_state("a node cannot be its own parent"));
    }
    validate_parent(conn, new_parent_id)?;

    let nodes = list_nodes(conn)?;
    if hierarchy::subtree_node_ids(&nodes, id).contains(&parent_id) {
      return Err(AppError::invalid_state(
        "cannot move a node under its own descendant",
      ));
    }
  }

  ensure_unique_sibling_title(conn, new_parent_id, &node.title, Some(id))?;

  conn.execute(
    "UPDATE deck_nodes SET parent_id = ?1 WHERE id = ?2",
    params![new_parent_id, id],
  )?;
  Ok(())
}

/// Delete a node together with every descendant node and all cards owned by
/// the subtree's decks, in one transaction. Returns (nodes, cards) removed.
pub fn delete_node_cascade(
  conn: &mut Connection,
  id: i64,
) -> std::result::Result<(usize, usize), AppError> {
  let nodes = list_nodes(conn)?;
  if !nodes.iter().any(|n| n.id == id) {
    return Err(AppError::not_found(format!("deck node {}", id)));
  }
  let subtree = hierarchy::subtree_node_ids(&nodes, id);

  let tx = conn.transaction()?;
  let mut cards_removed = 0;
  for node_id in &subtree {
    tx.execute(
      "DELETE FROM review_logs WHERE card_id IN (SELECT id FROM cards WHERE deck_id = ?1)",
      params![node_id],
    )?;
    cards_removed += tx.execute("DELETE FROM cards WHERE deck_id = ?1", params![node_id])?;
  }
  let mut nodes_removed = 0;
  for node_id in &subtree {
    nodes_removed += tx.execute("DELETE FROM deck_nodes WHERE id = ?1", params![node_id])?;
  }
  tx.commit()?;

  Ok((nodes_removed, cards_removed))
}

fn validate_parent(conn: &Connection, parent_id: Option<i64>) -> std::result::Result<(), AppError> {
  if let Some(parent_id) = parent_id {
    match get_node(conn, parent_id)? {
      None => return Err(AppError::not_found(format!("parent node {}", parent_id))),
      Some(parent) if !parent.is_folder() => {
        return Err(AppError::invalid_state("parent must be a folder"));
      }
      Some(_) => {}
    }
  }
  Ok(())
}

fn ensure_unique_sibling_title(
  conn: &Connection,
  parent_id: Option<i64>,
  title: &str,
  exclude_id: Option<i64>,
) -> std::result::Result<(), AppError> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM deck_nodes WHERE title = ?1 AND parent_id IS ?2 AND id != ?3",
    params![title, parent_id, exclude_id.unwrap_or(-1)],
    |row| row.get(0),
  )?;
  if count > 0 {
    return Err(AppError::invalid_state(format!(
      "a sibling named '{}' already exists",
      title
    )));
  }
  Ok(())
}

fn row_to_node(row: &rusqlite::Row) -> Result<DeckNode> {
  let kind_str: String = row.get(2)?;

  Ok(DeckNode {
    id: row.get(0)?,
    title: row.get(1)?,
    kind: NodeKind::from_str(&kind_str).unwrap_or(NodeKind::Deck),
    parent_id: row.get(3)?,
    card_count: row.get(4)?,
    due_count: row.get(5)?,
    progress: row.get(6)?,
  })
}
