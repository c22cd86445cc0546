pub mod entities;
pub mod gallery;
pub mod use_cases;
