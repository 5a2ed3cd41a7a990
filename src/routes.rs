use axum::{
    Router,
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use cookie::{Cookie, SameSite};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{AddMovieForm, EditErrors, EditMovieForm},
    templates,
};

const FLASH_COOKIE: &str = "flash";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", get(add_form).post(add_search))
        .route("/find", get(find))
        .route("/edit", get(edit_form).post(edit_submit))
        .route("/delete", get(delete).post(delete))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<i32>,
}

impl IdQuery {
    fn require(&self) -> AppResult<i32> {
        self.id.ok_or_else(|| AppError::NotFound("no movie id given".to_string()))
    }
}

pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let flash = jar.get(FLASH_COOKIE).map(|c| c.value().to_string());
    let jar = match flash {
        Some(_) => jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
        None => jar,
    };

    let movies = state.store.re_rank_all().await?;
    Ok((jar, Html(templates::index_page(&movies, flash.as_deref()))))
}

pub async fn add_form() -> Html<String> {
    Html(templates::add_page("", None))
}

pub async fn add_search(
    State(state): State<AppState>,
    Form(form): Form<AddMovieForm>,
) -> AppResult<Html<String>> {
    let title = match form.validate() {
        Ok(title) => title,
        Err(message) => return Ok(Html(templates::add_page(&form.title, Some(&message)))),
    };

    let candidates = state.tmdb.search_by_title(title).await?;
    info!(query = %title, candidates = candidates.len(), "searched for movie");
    Ok(Html(templates::select_page(title, &candidates)))
}

/// Second step of adding: persist the chosen candidate, then rate it.
pub async fn find(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    let id = q.require()?;
    let details = state.tmdb.fetch_by_id(id).await?;
    let new = details.into_new_movie(state.tmdb.image_base_url())?;
    let movie = state.store.insert(new).await?;
    Ok(Redirect::to(&format!("/edit?id={}", movie.id)))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> AppResult<Html<String>> {
    let movie = state.store.get_by_id(q.require()?).await?;
    let form = EditMovieForm::prefill(&movie);
    Ok(Html(templates::edit_page(&movie, &form, &EditErrors::default())))
}

pub async fn edit_submit(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
    jar: SignedCookieJar,
    Form(form): Form<EditMovieForm>,
) -> AppResult<Response> {
    let movie = state.store.get_by_id(q.require()?).await?;

    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => {
            let body = templates::edit_page(&movie, &form, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
    };

    let updated = state.store.update(movie.id, update.rating, update.review).await?;
    let jar = with_flash(jar, format!("Rated {} {}/10", updated.title, updated.rating));
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let removed = state.store.delete(q.require()?).await?;
    let jar = with_flash(jar, format!("Removed {}", removed.title));
    Ok((jar, Redirect::to("/")))
}

fn with_flash(jar: SignedCookieJar, message: String) -> SignedCookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, message))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::minutes(5)),
    )
}
