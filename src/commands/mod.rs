pub mod confess;
pub mod confessembed;
pub mod feed;
pub mod panel;
