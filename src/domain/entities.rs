pub mod contact;
pub mod document;
pub mod experience;
pub mod photo;
pub mod project;
pub mod token;
pub mod tool;
pub mod upload;
pub mod validation;
