pub mod images;
pub mod pages;
pub mod upload;
