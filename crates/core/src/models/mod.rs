pub mod book;
pub mod budget;
pub mod category;
pub mod goal;
pub mod report;
pub mod settings;
pub mod transaction;
