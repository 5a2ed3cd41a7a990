use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::models::{EditErrors, EditMovieForm, Movie, MovieCandidate, RATING_MAX, RATING_MIN};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[Movie], flash: Option<&str>) -> String {
    page(
        "My Top Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { "My Top " (movies.len()) " Movies" }
                            p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                        }
                        a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                    }

                    @if let Some(message) = flash {
                        div class="mt-6 rounded-md border border-green-200 bg-green-50 px-4 py-3 text-sm text-green-800" { (message) }
                    }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for movie in movies {
                                (movie_card(movie))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(title: &str, error: Option<&str>) -> String {
    page(
        "Add Movie",
        narrow_card(html! {
            h1 class="text-2xl font-bold text-gray-900" { "Add a Movie" }
            form class="mt-6 space-y-6" method="post" action="/add" {
                div {
                    label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                    input class=(INPUT_CLASS) name="title" id="title" value=(title) placeholder="movie name ...";
                    (field_error(error))
                }
                button class=(BUTTON_CLASS) type="submit" { "Add Movie" }
            }
            a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

pub fn select_page(query: &str, candidates: &[MovieCandidate]) -> String {
    page(
        "Select Movie",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    h1 class="text-2xl font-bold text-gray-900" { "Select a movie" }
                    p class="mt-2 text-gray-600" { "Results for \"" (query) "\"" }

                    @if candidates.is_empty() {
                        div class="mt-8 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies matched that title." }
                        }
                    } @else {
                        ul class="mt-8 divide-y divide-gray-200 bg-white shadow rounded-lg" {
                            @for candidate in candidates {
                                li class="px-6 py-4" {
                                    a class="text-blue-600 hover:text-blue-800" href=(format!("/find?id={}", candidate.id)) {
                                        (candidate.title)
                                        @if let Some(year) = candidate.year {
                                            span class="ml-2 text-gray-500" { "(" (year) ")" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/add" { "Search again" }
                }
            }
        },
    )
}

pub fn edit_page(movie: &Movie, form: &EditMovieForm, errors: &EditErrors) -> String {
    let action = format!("/edit?id={}", movie.id);
    page(
        &format!("Edit {}", movie.title),
        narrow_card(html! {
            h1 class="text-2xl font-bold text-gray-900" { (movie.title) }
            p class="mt-1 text-gray-500" { "Edit Movie Rating" }
            form class="mt-6 space-y-6" method="post" action=(action) {
                div {
                    label class="block text-sm font-medium text-gray-700" for="rating" {
                        "Your rating out of " (RATING_MAX) " e.g. 7.6"
                    }
                    input class=(INPUT_CLASS) name="rating" id="rating" inputmode="decimal"
                        value=(form.rating) placeholder=(format!("{RATING_MIN} - {RATING_MAX}"));
                    (field_error(errors.rating.as_deref()))
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="review" { "Your review" }
                    input class=(INPUT_CLASS) name="review" id="review" value=(form.review) placeholder="new review ...";
                    (field_error(errors.review.as_deref()))
                }
                button class=(BUTTON_CLASS) type="submit" { "Done" }
            }
        }),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        narrow_card(html! {
            h1 class="text-2xl font-bold text-gray-900" {
                (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error"))
            }
            p class="mt-4 text-gray-700" { (message) }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn narrow_card(inner: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-gray-50 flex items-center justify-center" {
            div class="max-w-xl w-full px-6" {
                div class="bg-white shadow rounded-lg p-8" { (inner) }
            }
        }
    }
}

fn field_error(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            img class="w-24 rounded" src=(movie.img_url) alt=(movie.title);
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(ranking) = movie.ranking {
                            span class="mr-2 text-gray-400" { "#" (ranking) }
                        }
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    span class="text-lg font-semibold text-blue-600" { (format!("{:.1}", movie.rating)) }
                }
                p class="mt-2 text-sm italic text-gray-600" {
                    "\"" (movie.review.as_deref().unwrap_or("none")) "\""
                }
                p class="mt-2 text-sm text-gray-700" { (movie.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?id={}", movie.id)) { "Delete" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> Movie {
        Movie {
            id: 12345,
            title: "Up & Away".to_string(),
            year: 2009,
            description: "Balloons.".to_string(),
            rating: 7.9,
            ranking: Some(1),
            review: None,
            img_url: "https://image.tmdb.org/t/p/original/up.jpg".to_string(),
        }
    }

    #[test]
    fn index_escapes_titles_and_shows_review_sentinel() {
        let html = index_page(&[movie()], Some("Added"));
        assert!(html.contains("Up &amp; Away"));
        assert!(html.contains("#1"));
        assert!(html.contains("&quot;none&quot;"));
        assert!(html.contains("/delete?id=12345"));
        assert!(html.contains("Added"));
    }

    #[test]
    fn edit_page_shows_field_errors() {
        let errors = EditErrors { rating: Some("Too high".to_string()), review: None };
        let form = EditMovieForm { rating: "11".to_string(), review: "x".to_string() };
        let html = edit_page(&movie(), &form, &errors);
        assert!(html.contains("Too high"));
        assert!(html.contains("value=\"11\""));
        assert!(html.contains("action=\"/edit?id=12345\""));
    }
}
