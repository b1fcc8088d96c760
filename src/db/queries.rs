use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::models::Booking;

pub fn insert_booking(conn: &Connection, booking: &Booking) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, destination, check_in, check_out, guests, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            booking.id,
            booking.destination,
            booking.check_in.to_string(),
            booking.check_out.to_string(),
            booking.guests,
            booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_bookings(conn: &Connection) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, destination, check_in, check_out, guests, created_at
         FROM bookings ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        let check_in: String = row.get(2)?;
        let check_out: String = row.get(3)?;
        let created_at: String = row.get(5)?;
        Ok(Booking {
            id: row.get(0)?,
            destination: row.get(1)?,
            check_in: parse_date(&check_in),
            check_out: parse_date(&check_out),
            guests: row.get(4)?,
            created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
                .unwrap_or_default(),
        })
    })?;

    rows.collect()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}
