pub mod contact;
pub mod content;
pub mod extractors;
pub mod form;
pub mod live;
