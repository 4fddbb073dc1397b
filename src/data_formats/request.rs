use serde::{Deserialize, Serialize};

use crate::validation::{required, url, FieldError, Validator};

// ----------------- User Forms -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("email", &self.email, &[required])
            .check("password", &self.password, &[required])
            .check("name", &self.name, &[required])
            .finish()
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("email", &self.email, &[required])
            .check("password", &self.password, &[required])
            .finish()
    }
}

// ----------------- Post Forms -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub body: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("title", &self.title, &[required])
            .check("subtitle", &self.subtitle, &[required])
            .check("img_url", &self.img_url, &[required, url])
            .check("body", &self.body, &[required])
            .finish()
    }

    /// Copy of the form with surrounding whitespace stripped from every field.
    pub fn trimmed(&self) -> PostForm {
        PostForm {
            title: self.title.trim().to_owned(),
            subtitle: self.subtitle.trim().to_owned(),
            img_url: self.img_url.trim().to_owned(),
            body: self.body.trim().to_owned(),
        }
    }
}

// ----------------- Comment Forms -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct CommentForm {
    pub comment: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("comment", &self.comment, &[required])
            .finish()
    }
}
