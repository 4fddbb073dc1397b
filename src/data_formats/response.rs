use serde::{Deserialize, Serialize};

use crate::models::{Comment, Post, User};

use super::request::{CommentForm, LoginForm, PostForm, RegisterForm};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author: AuthorResponse,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author: AuthorResponse,
}

impl UserResponse {
    pub fn new(user: &User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin(),
        }
    }
}

impl PostResponse {
    pub fn new(
        Post {
            id,
            author_id,
            author_name,
            title,
            subtitle,
            date,
            body,
            img_url,
        }: Post,
    ) -> Self {
        PostResponse {
            id,
            title,
            subtitle,
            date,
            body,
            img_url,
            author: AuthorResponse {
                id: author_id,
                name: author_name,
            },
        }
    }
}

impl CommentResponse {
    pub fn new(
        Comment {
            id,
            text,
            author_id,
            author_name,
            ..
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            text,
            author: AuthorResponse {
                id: author_id,
                name: author_name,
            },
        }
    }
}

// ----------------- Page Contents -----------------

#[derive(Serialize, Debug, Default)]
pub struct NoContent {}

#[derive(Serialize, Debug)]
pub struct PostListContent {
    pub posts: Vec<PostResponse>,
}

#[derive(Serialize, Debug)]
pub struct PostContent {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    pub form: CommentForm,
}

#[derive(Serialize, Debug)]
pub struct PostFormContent {
    pub form: PostForm,
    pub is_edit: bool,
    pub post_id: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct RegisterContent {
    pub form: RegisterForm,
}

#[derive(Serialize, Debug)]
pub struct LoginContent {
    pub form: LoginForm,
}
