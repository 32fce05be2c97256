use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, types::Value, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    query_all, query_one, BOOK_COLS, CART_COLS, CART_TYPE_COLS, DONATION_COLS, MEDIA_COLS,
    NOTIFICATION_COLS, ORDER_COLS, PAYMENT_COLS, SESSION_COLS, TRANSACTION_TYPE_COLS, USER_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Random 7-char alphanumeric token used as a cart's rotating payment code.
pub fn gen_payment_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect()
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query.
struct UpdateBuilder {
    table: &'static str,
    id: i64,
    fields: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: i64) -> Self {
        Self {
            table,
            id,
            fields: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Execute the update and return the updated entity via RETURNING.
    /// Returns None if no row matched or there was nothing to update.
    fn execute_returning<T: super::from_row::FromRow>(
        mut self,
        conn: &Connection,
        returning_cols: &str,
    ) -> Result<Option<T>> {
        if self.fields.is_empty() {
            return Ok(None);
        }
        self.fields.push(("updated_at", now().into()));
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? RETURNING {}",
            self.table,
            sets.join(", "),
            returning_cols
        );
        conn.query_row(&sql, rusqlite::params_from_iter(values), T::from_row)
            .optional()
            .map_err(Into::into)
    }
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    let now = now();
    let email = input.email.as_ref().map(|e| e.trim().to_lowercase());
    let user = conn.query_row(
        &format!(
            "INSERT INTO users (name, email, phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4) RETURNING {}",
            USER_COLS
        ),
        params![&input.name, &email, &input.phone, now],
        <User as super::from_row::FromRow>::from_row,
    )?;
    Ok(user)
}

pub fn get_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLS),
        &[],
    )
}

pub fn update_user(conn: &Connection, id: i64, input: &UpdateUser) -> Result<Option<User>> {
    let email = input.email.as_ref().map(|e| e.trim().to_lowercase());
    UpdateBuilder::new("users", id)
        .set_opt("name", input.name.clone())
        .set_opt("email", email)
        .set_opt("phone", input.phone.clone())
        .execute_returning(conn, USER_COLS)
}

pub fn delete_user(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Transaction types / cart types ============

pub fn get_transaction_type_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<TransactionType>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM transaction_types WHERE name = ?1",
            TRANSACTION_TYPE_COLS
        ),
        &[&name],
    )
}

pub fn get_transaction_type_by_id(conn: &Connection, id: i64) -> Result<Option<TransactionType>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM transaction_types WHERE id = ?1",
            TRANSACTION_TYPE_COLS
        ),
        &[&id],
    )
}

pub fn list_transaction_types(conn: &Connection) -> Result<Vec<TransactionType>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM transaction_types ORDER BY id",
            TRANSACTION_TYPE_COLS
        ),
        &[],
    )
}

pub fn get_cart_type_by_id(conn: &Connection, id: i64) -> Result<Option<CartType>> {
    query_one(
        conn,
        &format!("SELECT {} FROM cart_types WHERE id = ?1", CART_TYPE_COLS),
        &[&id],
    )
}

pub fn get_cart_type_by_name(conn: &Connection, name: &str) -> Result<Option<CartType>> {
    query_one(
        conn,
        &format!("SELECT {} FROM cart_types WHERE name = ?1", CART_TYPE_COLS),
        &[&name],
    )
}

// ============ Media ============

pub fn create_media(conn: &Connection, input: &CreateMedia) -> Result<Media> {
    let now = now();
    let media = conn.query_row(
        &format!(
            "INSERT INTO media (title, description, media_url, cover_url, for_youth, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {}",
            MEDIA_COLS
        ),
        params![
            &input.title,
            &input.description,
            &input.media_url,
            &input.cover_url,
            input.for_youth as i32,
            now
        ],
        <Media as super::from_row::FromRow>::from_row,
    )?;
    Ok(media)
}

pub fn get_media_by_id(conn: &Connection, id: i64) -> Result<Option<Media>> {
    query_one(
        conn,
        &format!("SELECT {} FROM media WHERE id = ?1", MEDIA_COLS),
        &[&id],
    )
}

pub fn list_media(conn: &Connection) -> Result<Vec<Media>> {
    query_all(
        conn,
        &format!("SELECT {} FROM media ORDER BY created_at DESC", MEDIA_COLS),
        &[],
    )
}

pub fn search_media(conn: &Connection, term: &str) -> Result<Vec<Media>> {
    let pattern = format!("%{}%", term);
    query_all(
        conn,
        &format!(
            "SELECT {} FROM media WHERE title LIKE ?1 ORDER BY created_at DESC",
            MEDIA_COLS
        ),
        &[&pattern],
    )
}

pub fn update_media(conn: &Connection, id: i64, input: &UpdateMedia) -> Result<Option<Media>> {
    UpdateBuilder::new("media", id)
        .set_opt("title", input.title.clone())
        .set_opt("description", input.description.clone())
        .set_opt("media_url", input.media_url.clone())
        .set_opt("cover_url", input.cover_url.clone())
        .set_opt("for_youth", input.for_youth.map(|b| b as i32))
        .execute_returning(conn, MEDIA_COLS)
}

pub fn delete_media(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM media WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Total views for a media item, summed across all sessions.
pub fn media_view_count(conn: &Connection, media_id: i64) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COALESCE(SUM(view_count), 0) FROM media_views WHERE media_id = ?1",
        params![media_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn media_like_count(conn: &Connection, media_id: i64) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM media_likes WHERE media_id = ?1",
        params![media_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Record one view of a media item by a session. Repeat views by the same
/// session increment the per-session counter in place.
pub fn record_media_view(conn: &Connection, session_id: &str, media_id: i64) -> Result<()> {
    let now = now();
    conn.execute(
        "INSERT INTO media_views (session_id, media_id, view_count, created_at, updated_at)
         VALUES (?1, ?2, 1, ?3, ?3)
         ON CONFLICT(session_id, media_id)
         DO UPDATE SET view_count = view_count + 1, updated_at = ?3",
        params![session_id, media_id, now],
    )?;
    Ok(())
}

/// Like a media item. Idempotent: liking twice keeps a single row.
pub fn like_media(conn: &Connection, user_id: i64, media_id: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO media_likes (user_id, media_id, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, media_id) DO NOTHING",
        params![user_id, media_id, now()],
    )?;
    Ok(inserted > 0)
}

pub fn unlike_media(conn: &Connection, user_id: i64, media_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM media_likes WHERE user_id = ?1 AND media_id = ?2",
        params![user_id, media_id],
    )?;
    Ok(deleted > 0)
}

// ============ Books ============

pub fn create_book(conn: &Connection, input: &CreateBook) -> Result<Book> {
    let now = now();
    let book = conn.query_row(
        &format!(
            "INSERT INTO books (title, author, file_url, cover_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING {}",
            BOOK_COLS
        ),
        params![
            &input.title,
            &input.author,
            &input.file_url,
            &input.cover_url,
            now
        ],
        <Book as super::from_row::FromRow>::from_row,
    )?;
    Ok(book)
}

pub fn get_book_by_id(conn: &Connection, id: i64) -> Result<Option<Book>> {
    query_one(
        conn,
        &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLS),
        &[&id],
    )
}

pub fn list_books(conn: &Connection) -> Result<Vec<Book>> {
    query_all(
        conn,
        &format!("SELECT {} FROM books ORDER BY created_at DESC", BOOK_COLS),
        &[],
    )
}

pub fn search_books(conn: &Connection, term: &str) -> Result<Vec<Book>> {
    let pattern = format!("%{}%", term);
    query_all(
        conn,
        &format!(
            "SELECT {} FROM books WHERE title LIKE ?1 OR author LIKE ?1 ORDER BY created_at DESC",
            BOOK_COLS
        ),
        &[&pattern],
    )
}

pub fn update_book(conn: &Connection, id: i64, input: &UpdateBook) -> Result<Option<Book>> {
    UpdateBuilder::new("books", id)
        .set_opt("title", input.title.clone())
        .set_opt("author", input.author.clone())
        .set_opt("file_url", input.file_url.clone())
        .set_opt("cover_url", input.cover_url.clone())
        .execute_returning(conn, BOOK_COLS)
}

pub fn delete_book(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Carts ============

/// Resolve the one cart for (user, type), creating it on first touch.
///
/// The INSERT .. ON CONFLICT DO NOTHING followed by SELECT is atomic with
/// respect to the UNIQUE(user_id, type_id) index: concurrent first touches
/// converge on a single row instead of racing check-then-create.
pub fn resolve_cart(conn: &Connection, user_id: i64, type_id: i64) -> Result<Cart> {
    let now = now();
    conn.execute(
        "INSERT INTO carts (type_id, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(user_id, type_id) DO NOTHING",
        params![type_id, user_id, now],
    )?;
    let cart = conn.query_row(
        &format!(
            "SELECT {} FROM carts WHERE user_id = ?1 AND type_id = ?2",
            CART_COLS
        ),
        params![user_id, type_id],
        <Cart as super::from_row::FromRow>::from_row,
    )?;
    Ok(cart)
}

pub fn get_cart_by_id(conn: &Connection, id: i64) -> Result<Option<Cart>> {
    query_one(
        conn,
        &format!("SELECT {} FROM carts WHERE id = ?1", CART_COLS),
        &[&id],
    )
}

pub fn list_carts_by_user(conn: &Connection, user_id: i64) -> Result<Vec<Cart>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM carts WHERE user_id = ?1 ORDER BY created_at DESC",
            CART_COLS
        ),
        &[&user_id],
    )
}

/// Rotate the cart's payment code to a fresh random token. Marks the cart
/// as "paid since the client last saw the old code". Returns false if the
/// cart does not exist.
pub fn rotate_cart_payment_code(conn: &Connection, cart_id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE carts SET payment_code = ?1, updated_at = ?2 WHERE id = ?3",
        params![gen_payment_code(), now(), cart_id],
    )?;
    Ok(updated > 0)
}

/// Add a line item to a cart. Idempotent per (cart, media) / (cart, book):
/// re-adding an existing item returns the existing row.
pub fn add_order(conn: &Connection, cart_id: i64, input: &CreateOrder) -> Result<Order> {
    conn.execute(
        "INSERT INTO orders (cart_id, media_id, book_id, pricing_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT DO NOTHING",
        params![cart_id, input.media_id, input.book_id, input.pricing_id, now()],
    )?;
    let order = conn.query_row(
        &format!(
            "SELECT {} FROM orders
             WHERE cart_id = ?1
               AND (media_id IS ?2)
               AND (book_id IS ?3)",
            ORDER_COLS
        ),
        params![cart_id, input.media_id, input.book_id],
        <Order as super::from_row::FromRow>::from_row,
    )?;
    Ok(order)
}

pub fn remove_order(conn: &Connection, order_id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM orders WHERE id = ?1", params![order_id])?;
    Ok(deleted > 0)
}

pub fn list_orders(conn: &Connection, cart_id: i64) -> Result<Vec<Order>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders WHERE cart_id = ?1 ORDER BY created_at",
            ORDER_COLS
        ),
        &[&cart_id],
    )
}

/// Check whether a media or book item sits in the user's cart of the given type.
pub fn is_in_cart(
    conn: &Connection,
    user_id: i64,
    type_id: i64,
    media_id: Option<i64>,
    book_id: Option<i64>,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM orders o
         JOIN carts c ON c.id = o.cart_id
         WHERE c.user_id = ?1 AND c.type_id = ?2
           AND (o.media_id IS ?3) AND (o.book_id IS ?4)",
        params![user_id, type_id, media_id, book_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ============ Donations ============

pub fn create_donation(conn: &Connection, input: &CreateDonation) -> Result<Donation> {
    let now = now();
    let donation = conn.query_row(
        &format!(
            "INSERT INTO donations (amount, currency, pricing_id, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING {}",
            DONATION_COLS
        ),
        params![
            input.amount,
            &input.currency,
            input.pricing_id,
            input.user_id,
            now
        ],
        <Donation as super::from_row::FromRow>::from_row,
    )?;
    Ok(donation)
}

pub fn get_donation_by_id(conn: &Connection, id: i64) -> Result<Option<Donation>> {
    query_one(
        conn,
        &format!("SELECT {} FROM donations WHERE id = ?1", DONATION_COLS),
        &[&id],
    )
}

pub fn list_donations(conn: &Connection) -> Result<Vec<Donation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM donations ORDER BY created_at DESC",
            DONATION_COLS
        ),
        &[],
    )
}

pub fn update_donation(
    conn: &Connection,
    id: i64,
    input: &UpdateDonation,
) -> Result<Option<Donation>> {
    UpdateBuilder::new("donations", id)
        .set_opt("amount", input.amount)
        .set_opt("currency", input.currency.clone())
        .set_opt("pricing_id", input.pricing_id)
        .set_opt("user_id", input.user_id)
        .execute_returning(conn, DONATION_COLS)
}

pub fn delete_donation(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM donations WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Payments ============

/// Reconcile a gateway response or callback into the payments table.
///
/// Single-statement upsert keyed by the UNIQUE order_number index: the first
/// delivery inserts, every later delivery for the same order number
/// overwrites the mutable fields in place. Two concurrent callbacks cannot
/// produce two rows or interleave partial updates.
///
/// `donation_id` is the one exception to last-payload-wins: callbacks echo
/// the pre-donation reference and so never carry it, and an established
/// link must survive settlement.
pub fn upsert_payment(conn: &Connection, input: &UpsertPayment) -> Result<Payment> {
    let now = now();
    let payment = conn.query_row(
        &format!(
            "INSERT INTO payments (reference, provider_reference, order_number, amount,
                                   amount_customer, phone, currency, channel, type_id,
                                   status_id, cart_id, donation_id, user_id,
                                   created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
             ON CONFLICT(order_number) DO UPDATE SET
                 reference = excluded.reference,
                 provider_reference = excluded.provider_reference,
                 amount = excluded.amount,
                 amount_customer = excluded.amount_customer,
                 phone = excluded.phone,
                 currency = excluded.currency,
                 channel = excluded.channel,
                 type_id = excluded.type_id,
                 status_id = excluded.status_id,
                 cart_id = excluded.cart_id,
                 donation_id = COALESCE(excluded.donation_id, donation_id),
                 user_id = excluded.user_id,
                 updated_at = excluded.updated_at
             RETURNING {}",
            PAYMENT_COLS
        ),
        params![
            &input.reference,
            &input.provider_reference,
            &input.order_number,
            input.amount,
            input.amount_customer,
            &input.phone,
            &input.currency,
            &input.channel,
            input.type_id,
            input.status_id,
            input.cart_id,
            input.donation_id,
            input.user_id,
            now
        ],
        <Payment as super::from_row::FromRow>::from_row,
    )?;
    Ok(payment)
}

pub fn get_payment_by_id(conn: &Connection, id: i64) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!("SELECT {} FROM payments WHERE id = ?1", PAYMENT_COLS),
        &[&id],
    )
}

pub fn get_payment_by_order_number(
    conn: &Connection,
    order_number: &str,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE order_number = ?1",
            PAYMENT_COLS
        ),
        &[&order_number],
    )
}

pub fn get_payment_by_order_number_and_user(
    conn: &Connection,
    order_number: &str,
    user_id: i64,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE order_number = ?1 AND user_id = ?2",
            PAYMENT_COLS
        ),
        &[&order_number, &user_id],
    )
}

pub fn list_payments(conn: &Connection) -> Result<Vec<Payment>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM payments ORDER BY created_at DESC",
            PAYMENT_COLS
        ),
        &[],
    )
}

pub fn list_payments_by_phone(conn: &Connection, phone: &str) -> Result<Vec<Payment>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE phone = ?1 ORDER BY created_at DESC",
            PAYMENT_COLS
        ),
        &[&phone],
    )
}

pub fn set_payment_status(conn: &Connection, id: i64, status_id: i64) -> Result<Option<Payment>> {
    UpdateBuilder::new("payments", id)
        .set("status_id", status_id)
        .execute_returning(conn, PAYMENT_COLS)
}

pub fn delete_payment(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM payments WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Sessions ============

pub fn create_session(conn: &Connection, input: &CreateSession) -> Result<Session> {
    let now = now();
    let id = input
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().as_simple().to_string());
    let session = conn.query_row(
        &format!(
            "INSERT INTO sessions (id, ip_address, user_agent, user_id, created_at, last_activity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING {}",
            SESSION_COLS
        ),
        params![&id, &input.ip_address, &input.user_agent, input.user_id, now],
        <Session as super::from_row::FromRow>::from_row,
    )?;
    Ok(session)
}

pub fn get_session_by_id(conn: &Connection, id: &str) -> Result<Option<Session>> {
    query_one(
        conn,
        &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLS),
        &[&id],
    )
}

pub fn get_session_by_ip(conn: &Connection, ip_address: &str) -> Result<Option<Session>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM sessions WHERE ip_address = ?1 ORDER BY last_activity DESC LIMIT 1",
            SESSION_COLS
        ),
        &[&ip_address],
    )
}

pub fn list_sessions(conn: &Connection) -> Result<Vec<Session>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM sessions ORDER BY created_at DESC",
            SESSION_COLS
        ),
        &[],
    )
}

/// Attach an anonymous session to a user (on login), keeping any engagement
/// recorded before authentication.
pub fn link_session_user(conn: &Connection, session_id: &str, user_id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE sessions SET user_id = ?1, last_activity = ?2 WHERE id = ?3",
        params![user_id, now(), session_id],
    )?;
    Ok(updated > 0)
}

pub fn touch_session(conn: &Connection, session_id: &str) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE sessions SET last_activity = ?1 WHERE id = ?2",
        params![now(), session_id],
    )?;
    Ok(updated > 0)
}

pub fn delete_session(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Notifications ============

pub fn create_notification(conn: &Connection, input: &CreateNotification) -> Result<Notification> {
    let notification = conn.query_row(
        &format!(
            "INSERT INTO notifications (user_id, subject, body, created_at)
             VALUES (?1, ?2, ?3, ?4) RETURNING {}",
            NOTIFICATION_COLS
        ),
        params![input.user_id, &input.subject, &input.body, now()],
        <Notification as super::from_row::FromRow>::from_row,
    )?;
    Ok(notification)
}

pub fn list_notifications_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Notification>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC",
            NOTIFICATION_COLS
        ),
        &[&user_id],
    )
}

pub fn mark_notification_read(conn: &Connection, id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(updated > 0)
}
