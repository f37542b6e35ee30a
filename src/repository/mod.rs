//! Repository layer for database operations

pub mod books;
pub mod borrows;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding the database connection pool.
///
/// The pool is the only shared resource; it is injected here and passed
/// down by cloning, never reached through globals.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Probe database connectivity
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
