use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, params};

use crate::domain::Card;

pub fn insert_card(conn: &Connection, card: &Card) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO cards (deck_id, front, back, transcription, example, image_url,
                       ease_factor, interval_days, repetitions, due_date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
    params![
      card.deck_id,
      card.front,
      card.back,
      card.transcription,
      card.example,
      card.image_url,
      card.ease_factor,
      card.interval_days,
      card.repetitions,
      card.due_date.to_rfc3339(),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Bulk import: all cards inserted in a single transaction.
pub fn insert_cards(conn: &mut Connection, cards: &[Card]) -> Result<Vec<i64>> {
  let tx = conn.transaction()?;
  let mut ids = Vec::with_capacity(cards.len());
  for card in cards {
    ids.push(insert_card(&tx, card)?);
  }
  tx.commit()?;
  Ok(ids)
}

pub fn get_card_by_id(conn: &Connection, id: i64) -> Result<Option<Card>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, deck_id, front, back, transcription, example, image_url,
           ease_factor, interval_days, repetitions, due_date
    FROM cards WHERE id = ?1
    "#,
  )?;

  let mut rows = stmt.query(params![id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_card(row)?))
  } else {
    Ok(None)
  }
}

pub fn list_cards_for_deck(conn: &Connection, deck_id: i64) -> Result<Vec<Card>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, deck_id, front, back, transcription, example, image_url,
           ease_factor, interval_days, repetitions, due_date
    FROM cards WHERE deck_id = ?1
    ORDER BY id ASC
    "#,
  )?;

  let cards = stmt
    .query_map(params![deck_id], |row| row_to_card(row))?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

pub fn list_cards_for_decks(conn: &Connection, deck_ids: &[i64]) -> Result<Vec<Card>> {
  let mut cards = Vec::new();
  for deck_id in deck_ids {
    cards.extend(list_cards_for_deck(conn, *deck_id)?);
  }
  Ok(cards)
}

pub fn list_all_cards(conn: &Connection) -> Result<Vec<Card>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, deck_id, front, back, transcription, example, image_url,
           ease_factor, interval_days, repetitions, due_date
    FROM cards
    ORDER BY id ASC
    "#,
  )?;

  let cards = stmt
    .query_map([], |row| row_to_card(row))?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

pub fn update_card_after_review(
  conn: &Connection,
  id: i64,
  ease_factor: f64,
  interval_days: i64,
  repetitions: i64,
  due_date: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    r#"
    UPDATE cards
    SET ease_factor = ?1, interval_days = ?2, repetitions = ?3, due_date = ?4
    WHERE id = ?5
    "#,
    params![
      ease_factor,
      interval_days,
      repetitions,
      due_date.to_rfc3339(),
      id,
    ],
  )?;
  Ok(())
}

/// Returns the number of rows removed (0 when the id is unknown).
pub fn delete_card(conn: &Connection, id: i64) -> Result<usize> {
  conn.execute("DELETE FROM review_logs WHERE card_id = ?1", params![id])?;
  conn.execute("DELETE FROM cards WHERE id = ?1", params![id])
}

fn row_to_card(row: &rusqlite::Row) -> Result<Card> {
  let due_date_str: String = row.get(10)?;

  Ok(Card {
    id: row.get(0)?,
    deck_id: row.get(1)?,
    front: row.get(2)?,
    back: row.get(3)?,
    transcription: row.get(4)?,
    example: row.get(5)?,
    image_url: row.get(6)?,
    ease_factor: row.get(7)?,
    interval_days: row.get(8)?,
    repetitions: row.get(9)?,
    due_date: DateTime::parse_from_rfc3339(&due_date_str)
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or_else(|_| Utc::now()),
  })
}
