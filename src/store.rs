use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info};

use crate::{
    entities::movie,
    models::{Movie, NewMovie},
    ranker,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("movie {0} not found")]
    NotFound(i32),
    #[error("a movie titled \"{0}\" is already in the list")]
    DuplicateTitle(String),
    #[error("movie {0} is already in the list")]
    DuplicateId(i32),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository over the `movies` table. Every write commits before returning;
/// `update` and `delete` re-rank inside the same transaction.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a freshly looked-up movie with no ranking and no review.
    pub async fn insert(&self, new: NewMovie) -> StoreResult<Movie> {
        let txn = self.db.begin().await?;

        if movie::Entity::find_by_id(new.id).one(&txn).await?.is_some() {
            return Err(StoreError::DuplicateId(new.id));
        }
        if movie::Entity::find()
            .filter(movie::Column::Title.eq(new.title.as_str()))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(StoreError::DuplicateTitle(new.title));
        }

        let seq = next_seq(&txn).await?;
        let model = movie::ActiveModel {
            id: Set(new.id),
            title: Set(new.title.clone()),
            year: Set(new.year),
            description: Set(new.description.clone()),
            rating: Set(new.rating),
            ranking: Set(None),
            review: Set(None),
            img_url: Set(new.img_url.clone()),
            seq: Set(seq),
        };
        movie::Entity::insert(model).exec(&txn).await.map_err(|e| conflict(e, &new))?;
        txn.commit().await?;

        info!(id = new.id, title = %new.title, "movie added");
        Ok(Movie {
            id: new.id,
            title: new.title,
            year: new.year,
            description: new.description,
            rating: new.rating,
            ranking: None,
            review: None,
            img_url: new.img_url,
        })
    }

    pub async fn get_by_id(&self, id: i32) -> StoreResult<Movie> {
        movie::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Movie::from)
            .ok_or(StoreError::NotFound(id))
    }

    /// Overwrites rating and review, then re-ranks the whole list.
    pub async fn update(&self, id: i32, rating: f64, review: String) -> StoreResult<Movie> {
        let txn = self.db.begin().await?;

        let existing =
            movie::Entity::find_by_id(id).one(&txn).await?.ok_or(StoreError::NotFound(id))?;
        let mut active: movie::ActiveModel = existing.into();
        active.rating = Set(rating);
        active.review = Set(Some(review));
        active.update(&txn).await?;

        let ranked = re_rank(&txn).await?;
        txn.commit().await?;

        info!(id, rating, "movie rated");
        ranked.into_iter().find(|m| m.id == id).ok_or(StoreError::NotFound(id))
    }

    /// Removes a movie, then re-ranks what is left.
    pub async fn delete(&self, id: i32) -> StoreResult<Movie> {
        let txn = self.db.begin().await?;

        let existing =
            movie::Entity::find_by_id(id).one(&txn).await?.ok_or(StoreError::NotFound(id))?;
        let res = movie::Entity::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        re_rank(&txn).await?;
        txn.commit().await?;

        info!(id, title = %existing.title, "movie deleted");
        Ok(existing.into())
    }

    /// Ascending by rating; equal ratings keep insertion order.
    pub async fn list_all_ordered_by_rating(&self) -> StoreResult<Vec<Movie>> {
        Ok(list_ordered(&self.db).await?.into_iter().map(Movie::from).collect())
    }

    /// Recomputes and persists every ranking, returning the ranked list.
    pub async fn re_rank_all(&self) -> StoreResult<Vec<Movie>> {
        let txn = self.db.begin().await?;
        let ranked = re_rank(&txn).await?;
        txn.commit().await?;
        Ok(ranked)
    }
}

async fn list_ordered<C: ConnectionTrait>(conn: &C) -> Result<Vec<movie::Model>, DbErr> {
    movie::Entity::find()
        .order_by_asc(movie::Column::Rating)
        .order_by_asc(movie::Column::Seq)
        .all(conn)
        .await
}

async fn re_rank<C: ConnectionTrait>(conn: &C) -> Result<Vec<Movie>, DbErr> {
    let rows = list_ordered(conn).await?;
    let stored: Vec<Option<i32>> = rows.iter().map(|r| r.ranking).collect();
    let ranked = ranker::rank(rows.into_iter().map(Movie::from).collect());

    let mut changed = 0usize;
    for (m, old) in ranked.iter().zip(stored) {
        if m.ranking == old {
            continue;
        }
        movie::Entity::update_many()
            .col_expr(movie::Column::Ranking, Expr::value(m.ranking))
            .filter(movie::Column::Id.eq(m.id))
            .exec(conn)
            .await?;
        changed += 1;
    }

    debug!(total = ranked.len(), changed, "re-ranked movies");
    Ok(ranked)
}

async fn next_seq<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let last = movie::Entity::find().order_by_desc(movie::Column::Seq).one(conn).await?;
    Ok(last.map_or(1, |m| m.seq + 1))
}

/// Maps a unique-constraint failure that slipped past the pre-checks.
fn conflict(err: DbErr, new: &NewMovie) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("title") => {
            StoreError::DuplicateTitle(new.title.clone())
        },
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::DuplicateId(new.id),
        _ => StoreError::Db(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> MovieStore {
        MovieStore::new(db::connect_in_memory().await)
    }

    fn new_movie(id: i32, title: &str, rating: f64) -> NewMovie {
        NewMovie {
            id,
            title: title.to_string(),
            year: 2009,
            description: format!("About {title}"),
            rating,
            img_url: format!("https://image.tmdb.org/t/p/original/{id}.jpg"),
        }
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn insert_leaves_ranking_and_review_unset() {
        let store = store().await;
        store.insert(new_movie(12345, "Up", 7.9)).await.unwrap();

        let movie = store.get_by_id(12345).await.unwrap();
        assert_eq!(movie.title, "Up");
        assert_eq!(movie.ranking, None);
        assert_eq!(movie.review, None);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected_without_partial_insert() {
        let store = store().await;
        store.insert(new_movie(1, "Up", 7.9)).await.unwrap();

        let err = store.insert(new_movie(2, "Up", 5.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle(ref t) if t == "Up"));

        let all = store.list_all_ordered_by_rating().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(matches!(store.get_by_id(2).await, Err(StoreError::NotFound(2))));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = store().await;
        store.insert(new_movie(1, "Up", 7.9)).await.unwrap();

        let err = store.insert(new_movie(1, "Down", 5.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(1)));
        assert_eq!(store.get_by_id(1).await.unwrap().title, "Up");
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found_and_changes_nothing() {
        let store = store().await;
        store.insert(new_movie(1, "Up", 7.9)).await.unwrap();
        let before = store.list_all_ordered_by_rating().await.unwrap();

        assert!(matches!(store.delete(99).await, Err(StoreError::NotFound(99))));
        assert_eq!(store.list_all_ordered_by_rating().await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = store().await;
        let err = store.update(7, 8.0, "nope".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
    }

    #[tokio::test]
    async fn listing_orders_by_rating_and_ranks_best_first() {
        let store = store().await;
        store.insert(new_movie(1, "A", 9.0)).await.unwrap();
        store.insert(new_movie(2, "B", 7.5)).await.unwrap();
        store.insert(new_movie(3, "C", 8.0)).await.unwrap();

        let ranked = store.re_rank_all().await.unwrap();
        assert_eq!(titles(&ranked), vec!["B", "C", "A"]);
        assert_eq!(ranked.iter().map(|m| m.ranking).collect::<Vec<_>>(), vec![
            Some(3),
            Some(2),
            Some(1)
        ]);

        let persisted = store.list_all_ordered_by_rating().await.unwrap();
        assert_eq!(persisted, ranked);
    }

    #[tokio::test]
    async fn equal_ratings_keep_insertion_order() {
        let store = store().await;
        store.insert(new_movie(30, "First", 6.0)).await.unwrap();
        store.insert(new_movie(10, "Second", 6.0)).await.unwrap();
        store.insert(new_movie(20, "Third", 6.0)).await.unwrap();

        let ranked = store.re_rank_all().await.unwrap();
        assert_eq!(titles(&ranked), vec!["First", "Second", "Third"]);
        assert_eq!(ranked.iter().map(|m| m.ranking).collect::<Vec<_>>(), vec![
            Some(3),
            Some(2),
            Some(1)
        ]);
    }

    #[tokio::test]
    async fn update_re_ranks_the_collection() {
        let store = store().await;
        store.insert(new_movie(1, "A", 9.0)).await.unwrap();
        store.insert(new_movie(2, "B", 7.5)).await.unwrap();
        store.re_rank_all().await.unwrap();

        let updated = store.update(2, 9.5, "Better on rewatch".to_string()).await.unwrap();
        assert_eq!(updated.ranking, Some(1));
        assert_eq!(updated.review.as_deref(), Some("Better on rewatch"));
        assert_eq!(store.get_by_id(1).await.unwrap().ranking, Some(2));
    }

    #[tokio::test]
    async fn delete_re_ranks_the_rest() {
        let store = store().await;
        store.insert(new_movie(1, "A", 9.0)).await.unwrap();
        store.insert(new_movie(2, "B", 7.5)).await.unwrap();
        store.insert(new_movie(3, "C", 8.0)).await.unwrap();
        store.re_rank_all().await.unwrap();

        let removed = store.delete(1).await.unwrap();
        assert_eq!(removed.title, "A");

        assert_eq!(store.get_by_id(3).await.unwrap().ranking, Some(1));
        assert_eq!(store.get_by_id(2).await.unwrap().ranking, Some(2));
        assert!(matches!(store.get_by_id(1).await, Err(StoreError::NotFound(1))));
    }

    #[tokio::test]
    async fn re_ranking_is_idempotent() {
        let store = store().await;
        store.insert(new_movie(1, "A", 4.0)).await.unwrap();
        store.insert(new_movie(2, "B", 6.0)).await.unwrap();

        let first = store.re_rank_all().await.unwrap();
        let second = store.re_rank_all().await.unwrap();
        assert_eq!(first, second);
    }
}
