//! Deck statistics aggregation.
//!
//! A single full recompute pass over the whole node set: leaf stats come
//! straight from the cards, folder stats are folded bottom-up from their
//! children. The pass is O(nodes + cards) and idempotent; it runs after any
//! mutation that can change card counts, due counts or progress.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::{cards, decks};
use crate::domain::{Card, DeckNode, NodeKind};
use crate::error::AppError;
use crate::hierarchy;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeStats {
    pub card_count: i64,
    pub due_count: i64,
    pub progress: f64,
}

/// Recompute every node's aggregates and persist them in one transaction.
/// Running it twice in a row produces identical rows.
pub fn recalculate_all(conn: &mut Connection) -> Result<(), AppError> {
    let now = Utc::now();
    let nodes = decks::list_nodes(conn)?;
    let all_cards = cards::list_all_cards(conn)?;
    let stats = compute_stats(&nodes, &all_cards, now);

    let tx = conn.transaction()?;
    for node in &nodes {
        let s = stats.get(&node.id).copied().unwrap_or_default();
        tx.execute(
            "UPDATE deck_nodes SET card_count = ?1, due_count = ?2, progress = ?3 WHERE id = ?4",
            rusqlite::params![s.card_count, s.due_count, s.progress, node.id],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Pure aggregation over an in-memory snapshot of the tree.
pub fn compute_stats(
    nodes: &[DeckNode],
    all_cards: &[Card],
    now: DateTime<Utc>,
) -> HashMap<i64, NodeStats> {
    // Leaf tallies per owning deck
    let mut tallies: HashMap<i64, (i64, i64, i64)> = HashMap::new();
    for card in all_cards {
        let entry = tallies.entry(card.deck_id).or_default();
        entry.0 += 1;
        if card.is_due(now) {
            entry.1 += 1;
        }
        if !card.is_new() {
            entry.2 += 1;
        }
    }

    let mut leaf: HashMap<i64, NodeStats> = HashMap::new();
    for (deck_id, (count, due, studied)) in tallies {
        let progress = if count > 0 {
            100.0 * studied as f64 / count as f64
        } else {
            0.0
        };
        leaf.insert(
            deck_id,
            NodeStats {
                card_count: count,
                due_count: due,
                progress,
            },
        );
    }

    // Adjacency from the current node map, not a pre-mutation snapshot
    let by_id: HashMap<i64, &DeckNode> = nodes.iter().map(|n| (n.id, n)).collect();
    let children = hierarchy::build_children_index(nodes);

    let mut marks: HashMap<i64, Mark> = HashMap::new();
    let mut memo: HashMap<i64, NodeStats> = HashMap::new();
    for node in nodes {
        resolve(node.id, &by_id, &children, &leaf, &mut marks, &mut memo);
    }
    memo
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

fn resolve(
    id: i64,
    by_id: &HashMap<i64, &DeckNode>,
    children: &HashMap<i64, Vec<i64>>,
    leaf: &HashMap<i64, NodeStats>,
    marks: &mut HashMap<i64, Mark>,
    memo: &mut HashMap<i64, NodeStats>,
) -> NodeStats {
    match marks.get(&id) {
        Some(Mark::Done) => return memo.get(&id).copied().unwrap_or_default(),
        Some(Mark::InProgress) => {
            // Malformed cyclic parent chain; contribute nothing instead of
            // recursing forever
            tracing::warn!("stats: cycle detected at node {}", id);
            return NodeStats::default();
        }
        None => {}
    }
    marks.insert(id, Mark::InProgress);

    let stats = match by_id.get(&id).map(|n| n.kind) {
        Some(NodeKind::Folder) => {
            let mut card_count = 0;
            let mut due_count = 0;
            let mut weighted_progress = 0.0;
            for child in children.get(&id).cloned().unwrap_or_default() {
                let c = resolve(child, by_id, children, leaf, marks, memo);
                card_count += c.card_count;
                due_count += c.due_count;
                weighted_progress += c.progress / 100.0 * c.card_count as f64;
            }
            let progress = if card_count > 0 {
                100.0 * weighted_progress / card_count as f64
            } else {
                0.0
            };
            NodeStats {
                card_count,
                due_count,
                progress,
            }
        }
        // A deck with no cards has no tally entry and falls back to zeros
        Some(NodeKind::Deck) | None => leaf.get(&id).copied().unwrap_or_default(),
    };

    marks.insert(id, Mark::Done);
    memo.insert(id, stats);
    stats
}
