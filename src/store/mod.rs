pub mod bookmarks;
pub mod derived;
pub mod resource;
pub mod transient;
