pub mod category;
pub mod classify;
pub mod result;
pub mod score;
pub mod tables;
