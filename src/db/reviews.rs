use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, params};

use crate::domain::ReviewLog;

pub fn insert_review_log(conn: &Connection, log: &ReviewLog) -> Result<i64> {
  conn.execute(
    "INSERT INTO review_logs (card_id, quality, is_correct, reviewed_at) VALUES (?1, ?2, ?3, ?4)",
    params![
      log.card_id,
      log.quality,
      log.is_correct,
      log.reviewed_at.to_rfc3339(),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn list_review_logs_for_card(conn: &Connection, card_id: i64) -> Result<Vec<ReviewLog>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, card_id, quality, is_correct, reviewed_at
    FROM review_logs
    WHERE card_id = ?1
    ORDER BY reviewed_at ASC
    "#,
  )?;

  let logs = stmt
    .query_map(params![card_id], |row| {
      let reviewed_at_str: String = row.get(4)?;
      Ok(ReviewLog {
        id: row.get(0)?,
        card_id: row.get(1)?,
        quality: row.get(2)?,
        is_correct: row.get(3)?,
        reviewed_at: DateTime::parse_from_rfc3339(&reviewed_at_str)
          .map(|dt| dt.with_timezone(&Utc))
          .unwrap_or_else(|_| Utc::now()),
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(logs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::cards::insert_card;
  use crate::domain::Card;
  use crate::testing::TestEnv;

  #[test]
  fn test_insert_and_list_logs() {
    let env = TestEnv::new().unwrap();
    let deck_id = env.seed_deck("Words");
    let card_id = insert_card(&env.conn, &Card::new(deck_id, "a".into(), "b".into())).unwrap();

    insert_review_log(&env.conn, &ReviewLog::new(card_id, 2, false)).unwrap();
    insert_review_log(&env.conn, &ReviewLog::new(card_id, 4, true)).unwrap();

    let logs = list_review_logs_for_card(&env.conn, card_id).unwrap();
    assert_eq!(logs.len(), 2);
    assert!(!logs[0].is_correct);
    assert_eq!(logs[1].quality, 4);
  }

  #[test]
  fn test_list_logs_empty_for_unreviewed_card() {
    let env = TestEnv::new().unwrap();
    let logs = list_review_logs_for_card(&env.conn, 5).unwrap();
    assert!(logs.is_empty());
  }
}
