use crate::models::Movie;

/// Assigns rankings to movies sorted ascending by rating: the movie at index
/// `i` of `n` gets `n - i`, so the best rated movie is ranked 1.
///
/// Equal ratings still get distinct rankings, in input order.
pub fn rank(mut movies: Vec<Movie>) -> Vec<Movie> {
    let n = movies.len();
    for (i, movie) in movies.iter_mut().enumerate() {
        movie.ranking = Some((n - i) as i32);
    }
    movies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32, rating: f64) -> Movie {
        Movie {
            id,
            title: format!("Movie {id}"),
            year: 2000,
            description: String::new(),
            rating,
            ranking: None,
            review: None,
            img_url: String::new(),
        }
    }

    fn rankings(movies: &[Movie]) -> Vec<Option<i32>> {
        movies.iter().map(|m| m.ranking).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn lowest_rating_gets_last_rank() {
        let ranked = rank(vec![movie(2, 7.5), movie(3, 8.0), movie(1, 9.0)]);
        assert_eq!(rankings(&ranked), vec![Some(3), Some(2), Some(1)]);
        assert_eq!(ranked.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn ties_get_distinct_ranks_in_input_order() {
        let ranked = rank(vec![movie(1, 5.0), movie(2, 5.0), movie(3, 5.0)]);
        assert_eq!(rankings(&ranked), vec![Some(3), Some(2), Some(1)]);
    }

    #[test]
    fn ranking_twice_changes_nothing() {
        let once = rank(vec![movie(1, 2.0), movie(2, 4.0), movie(3, 4.0), movie(4, 9.9)]);
        let twice = rank(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn single_movie_is_ranked_first() {
        let ranked = rank(vec![movie(1, 3.3)]);
        assert_eq!(rankings(&ranked), vec![Some(1)]);
    }
}
