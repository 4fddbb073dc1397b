mod comment_helpers;
mod post_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use post_helpers::*;
pub use user_helpers::*;
