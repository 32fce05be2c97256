//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
///
/// Implementing this trait allows using the `query_one` and `query_all`
/// helper functions, reducing repetitive row mapping closures.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str = "id, name, email, phone, created_at, updated_at";

pub const MEDIA_COLS: &str =
    "id, title, description, media_url, cover_url, for_youth, created_at, updated_at";

pub const BOOK_COLS: &str = "id, title, author, file_url, cover_url, created_at, updated_at";

pub const CART_COLS: &str =
    "id, payment_code, type_id, status_id, user_id, created_at, updated_at";

pub const ORDER_COLS: &str = "id, cart_id, media_id, book_id, pricing_id, created_at";

pub const DONATION_COLS: &str =
    "id, amount, currency, pricing_id, user_id, created_at, updated_at";

pub const PAYMENT_COLS: &str = "id, reference, provider_reference, order_number, amount, amount_customer, phone, currency, channel, type_id, status_id, cart_id, donation_id, user_id, created_at, updated_at";

pub const SESSION_COLS: &str =
    "id, ip_address, user_agent, user_id, created_at, last_activity";

pub const NOTIFICATION_COLS: &str = "id, user_id, subject, body, read, created_at";

pub const TRANSACTION_TYPE_COLS: &str = "id, name";

pub const CART_TYPE_COLS: &str = "id, name";

// ============ FromRow Implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl FromRow for Media {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Media {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            media_url: row.get(3)?,
            cover_url: row.get(4)?,
            for_youth: row.get::<_, i32>(5)? != 0,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl FromRow for Book {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            file_url: row.get(3)?,
            cover_url: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for Cart {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Cart {
            id: row.get(0)?,
            payment_code: row.get(1)?,
            type_id: row.get(2)?,
            status_id: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            cart_id: row.get(1)?,
            media_id: row.get(2)?,
            book_id: row.get(3)?,
            pricing_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl FromRow for Donation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Donation {
            id: row.get(0)?,
            amount: row.get(1)?,
            currency: row.get(2)?,
            pricing_id: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for Payment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Payment {
            id: row.get(0)?,
            reference: row.get(1)?,
            provider_reference: row.get(2)?,
            order_number: row.get(3)?,
            amount: row.get(4)?,
            amount_customer: row.get(5)?,
            phone: row.get(6)?,
            currency: row.get(7)?,
            channel: row.get(8)?,
            type_id: row.get(9)?,
            status_id: row.get(10)?,
            cart_id: row.get(11)?,
            donation_id: row.get(12)?,
            user_id: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }
}

impl FromRow for Session {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Session {
            id: row.get(0)?,
            ip_address: row.get(1)?,
            user_agent: row.get(2)?,
            user_id: row.get(3)?,
            created_at: row.get(4)?,
            last_activity: row.get(5)?,
        })
    }
}

impl FromRow for Notification {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            subject: row.get(2)?,
            body: row.get(3)?,
            read: row.get::<_, i32>(4)? != 0,
            created_at: row.get(5)?,
        })
    }
}

impl FromRow for TransactionType {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TransactionType {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl FromRow for CartType {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CartType {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}
