pub mod admin;
pub mod contact;
pub mod content;
pub mod home;
pub mod media;
pub mod system;
