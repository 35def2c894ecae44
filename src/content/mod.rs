pub mod account;
mod category;
pub mod email;
mod post;
mod project;
pub mod slug;

pub use self::{
    account::{Credentials, Registration},
    category::Category,
    post::{Body, MAX_TITLE_LEN, NoBody, PostBuilder, PostDraft},
    project::{DEFAULT_ACCENT_COLOR, ProjectDraft, ProjectForm},
};
