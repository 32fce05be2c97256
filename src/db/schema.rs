use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Users (identity; auth middleware lives outside this service)
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

        -- Payment method configuration (mobile_money, bank_card)
        CREATE TABLE IF NOT EXISTS transaction_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        -- Cart type configuration (basket, watchlist)
        CREATE TABLE IF NOT EXISTS cart_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            media_url TEXT,
            cover_url TEXT,
            for_youth INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT,
            file_url TEXT,
            cover_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Carts and watchlists. UNIQUE(user_id, type_id) backs the atomic
        -- insert-or-fetch resolver: concurrent first touches cannot create
        -- duplicate carts.
        CREATE TABLE IF NOT EXISTS carts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            payment_code TEXT,
            type_id INTEGER NOT NULL REFERENCES cart_types(id),
            status_id INTEGER,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(user_id, type_id)
        );
        CREATE INDEX IF NOT EXISTS idx_carts_user ON carts(user_id);

        -- Line items inside a cart (media or book, never both)
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cart_id INTEGER NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
            media_id INTEGER REFERENCES media(id) ON DELETE CASCADE,
            book_id INTEGER REFERENCES books(id) ON DELETE CASCADE,
            pricing_id INTEGER,
            created_at INTEGER NOT NULL,
            CHECK ((media_id IS NULL) != (book_id IS NULL))
        );
        CREATE INDEX IF NOT EXISTS idx_orders_cart ON orders(cart_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_orders_cart_media ON orders(cart_id, media_id) WHERE media_id IS NOT NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_orders_cart_book ON orders(cart_id, book_id) WHERE book_id IS NOT NULL;

        -- Donations; created only after the gateway accepted the attempt
        CREATE TABLE IF NOT EXISTS donations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            pricing_id INTEGER,
            user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Payments. order_number is the gateway-assigned external identity;
        -- the UNIQUE index makes the callback upsert race-free.
        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference TEXT NOT NULL,
            provider_reference TEXT,
            order_number TEXT NOT NULL UNIQUE,
            amount REAL NOT NULL,
            amount_customer REAL,
            phone TEXT,
            currency TEXT NOT NULL,
            channel TEXT,
            type_id INTEGER NOT NULL,
            status_id INTEGER NOT NULL,
            cart_id INTEGER REFERENCES carts(id) ON DELETE SET NULL,
            donation_id INTEGER REFERENCES donations(id) ON DELETE SET NULL,
            user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payments_phone ON payments(phone);
        CREATE INDEX IF NOT EXISTS idx_payments_user ON payments(user_id);

        -- Visitor sessions (anonymous until linked to a user)
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            ip_address TEXT NOT NULL,
            user_agent TEXT,
            user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            last_activity INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_ip ON sessions(ip_address);

        -- One row per (session, media) pair; view_count increments on repeat views
        CREATE TABLE IF NOT EXISTS media_views (
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            media_id INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
            view_count INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (session_id, media_id)
        );
        CREATE INDEX IF NOT EXISTS idx_media_views_media ON media_views(media_id);

        CREATE TABLE IF NOT EXISTS media_likes (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            media_id INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (user_id, media_id)
        );
        CREATE INDEX IF NOT EXISTS idx_media_likes_media ON media_likes(media_id);

        CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            subject TEXT,
            body TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at DESC);
        "#,
    )?;
    Ok(())
}

/// Seed the configuration rows the payment flow depends on.
/// Idempotent; safe to run on every startup.
pub fn seed_config_rows(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        INSERT OR IGNORE INTO transaction_types (name) VALUES ('mobile_money');
        INSERT OR IGNORE INTO transaction_types (name) VALUES ('bank_card');
        INSERT OR IGNORE INTO cart_types (name) VALUES ('basket');
        INSERT OR IGNORE INTO cart_types (name) VALUES ('watchlist');
        "#,
    )?;
    Ok(())
}
