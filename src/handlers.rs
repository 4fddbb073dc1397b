use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    authentication::{self, end_session, require_admin, start_session, Caller},
    data_formats::{
        CommentForm, CommentResponse, LoginContent, LoginForm, NoContent, Page, PostContent,
        PostForm, PostFormContent, PostListContent, PostResponse, RegisterContent, RegisterForm,
    },
    db_helpers::{
        delete_post, get_comments_for_post, get_post_by_id, insert_comment, insert_post,
        list_posts, update_post,
    },
    errors::{AuthError, RequestError},
    validation::FieldError,
    AppState,
};

type HandlerResult = Result<Response, RequestError>;

const POST_DATE_FORMAT: &str = "%B %d, %Y";

/// Every outcome, failures included, is rendered for the caller who asked.
fn respond(caller: &Caller, result: HandlerResult) -> Response {
    result.unwrap_or_else(|error| error.into_page(caller))
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri, caller: Caller) -> Response {
    tracing::debug!(%uri, "no route");
    RequestError::NotFound.into_page(&caller)
}

/// Ids come in as raw path segments; anything that is not a number cannot
/// name a post.
fn parse_post_id(raw: &str) -> Result<i64, RequestError> {
    raw.parse().map_err(|_| RequestError::NotFound)
}

fn field_error(field: &'static str, message: impl Into<String>) -> Vec<FieldError> {
    vec![FieldError {
        field,
        message: message.into(),
    }]
}

// ----------------- Static Pages -----------------
pub async fn about(caller: Caller) -> Response {
    Page::new("about.html", &caller, NoContent::default()).into_response()
}

pub async fn contact(caller: Caller) -> Response {
    Page::new("contact.html", &caller, NoContent::default()).into_response()
}

// ----------------- Account Handlers -----------------
pub async fn register_page(caller: Caller) -> Response {
    let content = RegisterContent {
        form: RegisterForm::default(),
    };
    Page::new("register.html", &caller, content).into_response()
}

pub async fn register_user(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let result = sign_up(&app, &caller, jar, form).await;
    respond(&caller, result)
}

async fn sign_up(
    app: &AppState,
    caller: &Caller,
    jar: CookieJar,
    form: RegisterForm,
) -> HandlerResult {
    if let Err(errors) = form.validate() {
        let page = Page::new("register.html", caller, RegisterContent { form });
        return Ok(page.with_errors(errors).render(StatusCode::UNPROCESSABLE_ENTITY));
    }
    let user = match authentication::register(&app.pool, &form).await {
        Ok(user) => user,
        Err(AuthError::Request(e)) => return Err(e),
        Err(e) => {
            let message = e.to_string();
            let page = Page::new("register.html", caller, RegisterContent { form });
            return Ok(page
                .with_errors(field_error("email", message))
                .render(StatusCode::UNPROCESSABLE_ENTITY));
        }
    };
    let jar = start_session(jar, &user, &app.config.secret_key, app.config.session_days)?;
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn login_page(caller: Caller) -> Response {
    let content = LoginContent {
        form: LoginForm::default(),
    };
    Page::new("login.html", &caller, content).into_response()
}

pub async fn login_user(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = sign_in(&app, &caller, jar, form).await;
    respond(&caller, result)
}

async fn sign_in(
    app: &AppState,
    caller: &Caller,
    jar: CookieJar,
    form: LoginForm,
) -> HandlerResult {
    if let Err(errors) = form.validate() {
        let page = Page::new("login.html", caller, LoginContent { form });
        return Ok(page.with_errors(errors).render(StatusCode::UNPROCESSABLE_ENTITY));
    }
    let user = match authentication::login(&app.pool, &form).await {
        Ok(user) => user,
        Err(AuthError::Request(e)) => return Err(e),
        Err(e) => {
            let message = e.to_string();
            let page = Page::new("login.html", caller, LoginContent { form });
            return Ok(page.with_flash(message).render(StatusCode::UNAUTHORIZED));
        }
    };
    tracing::info!(user_id = user.id, "user logged in");
    let jar = start_session(jar, &user, &app.config.secret_key, app.config.session_days)?;
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(jar: CookieJar) -> Response {
    (end_session(jar), Redirect::to("/")).into_response()
}

// ----------------- Post Handlers -----------------
pub async fn get_all_posts(Extension(app): Extension<Arc<AppState>>, caller: Caller) -> Response {
    let posts = match list_posts(&app.pool).await {
        Ok(posts) => posts.into_iter().map(PostResponse::new).collect(),
        Err(e) => return e.into_page(&caller),
    };
    Page::new("index.html", &caller, PostListContent { posts }).into_response()
}

async fn post_page(
    app: &AppState,
    caller: &Caller,
    id: i64,
    form: CommentForm,
) -> Result<Page<PostContent>, RequestError> {
    let post = match get_post_by_id(&app.pool, id).await? {
        Some(post) => post,
        None => return Err(RequestError::NotFound),
    };
    let comments = get_comments_for_post(&app.pool, id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();
    let content = PostContent {
        post: PostResponse::new(post),
        comments,
        form,
    };
    Ok(Page::new("post.html", caller, content))
}

pub async fn show_post(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Response {
    let page = match parse_post_id(&id) {
        Ok(id) => post_page(&app, &caller, id, CommentForm::default()).await,
        Err(e) => Err(e),
    };
    match page {
        Ok(page) => page.into_response(),
        Err(e) => e.into_page(&caller),
    }
}

pub async fn add_comment(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Response {
    let result = comment_on(&app, &caller, &id, form).await;
    respond(&caller, result)
}

async fn comment_on(
    app: &AppState,
    caller: &Caller,
    id: &str,
    form: CommentForm,
) -> HandlerResult {
    let id = parse_post_id(id)?;
    let user = match caller.user() {
        Some(user) => user,
        None => return Err(RequestError::LoginRequired),
    };
    if let Err(errors) = form.validate() {
        let page = post_page(app, caller, id, form).await?;
        return Ok(page.with_errors(errors).render(StatusCode::UNPROCESSABLE_ENTITY));
    }
    let comment = insert_comment(&app.pool, user.id, id, form.comment.trim()).await?;
    tracing::info!(comment_id = comment.id, post_id = id, user_id = user.id, "comment added");
    Ok(Redirect::to(&format!("/post/{id}")).into_response())
}

pub async fn create_post_page(caller: Caller) -> Response {
    if let Err(e) = require_admin(&caller) {
        return e.into_page(&caller);
    }
    let content = PostFormContent {
        form: PostForm::default(),
        is_edit: false,
        post_id: None,
    };
    Page::new("make-post.html", &caller, content).into_response()
}

pub async fn create_post(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    Form(form): Form<PostForm>,
) -> Response {
    let result = publish(&app, &caller, form).await;
    respond(&caller, result)
}

async fn publish(app: &AppState, caller: &Caller, form: PostForm) -> HandlerResult {
    let admin = require_admin(caller)?;
    let form = form.trimmed();
    let errors = match form.validate() {
        Ok(()) => {
            let date = chrono::Local::now().format(POST_DATE_FORMAT).to_string();
            match insert_post(&app.pool, admin.id, &date, &form).await {
                Ok(post) => {
                    tracing::info!(post_id = post.id, "post created");
                    return Ok(Redirect::to("/").into_response());
                }
                Err(RequestError::Duplicate(field)) => {
                    field_error(field, "A post with this title already exists.")
                }
                Err(e) => return Err(e),
            }
        }
        Err(errors) => errors,
    };
    let content = PostFormContent {
        form,
        is_edit: false,
        post_id: None,
    };
    Ok(Page::new("make-post.html", caller, content)
        .with_errors(errors)
        .render(StatusCode::UNPROCESSABLE_ENTITY))
}

pub async fn edit_post_page(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Response {
    let result = prefilled_post_form(&app, &caller, &id).await;
    respond(&caller, result)
}

async fn prefilled_post_form(app: &AppState, caller: &Caller, id: &str) -> HandlerResult {
    require_admin(caller)?;
    let id = parse_post_id(id)?;
    let post = match get_post_by_id(&app.pool, id).await? {
        Some(post) => post,
        None => return Err(RequestError::NotFound),
    };
    let content = PostFormContent {
        form: PostForm {
            title: post.title,
            subtitle: post.subtitle,
            img_url: post.img_url,
            body: post.body,
        },
        is_edit: true,
        post_id: Some(id),
    };
    Ok(Page::new("make-post.html", caller, content).into_response())
}

pub async fn edit_post(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> Response {
    let result = revise(&app, &caller, &id, form).await;
    respond(&caller, result)
}

async fn revise(app: &AppState, caller: &Caller, id: &str, form: PostForm) -> HandlerResult {
    require_admin(caller)?;
    let id = parse_post_id(id)?;
    let form = form.trimmed();
    let errors = match form.validate() {
        Ok(()) => match update_post(&app.pool, id, &form).await {
            Ok(()) => {
                tracing::info!(post_id = id, "post edited");
                return Ok(Redirect::to(&format!("/post/{id}")).into_response());
            }
            Err(RequestError::Duplicate(field)) => {
                field_error(field, "A post with this title already exists.")
            }
            Err(e) => return Err(e),
        },
        Err(errors) => {
            if get_post_by_id(&app.pool, id).await?.is_none() {
                return Err(RequestError::NotFound);
            }
            errors
        }
    };
    let content = PostFormContent {
        form,
        is_edit: true,
        post_id: Some(id),
    };
    Ok(Page::new("make-post.html", caller, content)
        .with_errors(errors)
        .render(StatusCode::UNPROCESSABLE_ENTITY))
}

pub async fn delete_blog(
    Extension(app): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Response {
    let result = remove(&app, &caller, &id).await;
    respond(&caller, result)
}

async fn remove(app: &AppState, caller: &Caller, id: &str) -> HandlerResult {
    require_admin(caller)?;
    let id = parse_post_id(id)?;
    delete_post(&app.pool, id).await?;
    tracing::info!(post_id = id, "post deleted");
    Ok(Redirect::to("/").into_response())
}
