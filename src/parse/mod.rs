pub mod constant;
pub mod content;
pub mod parser;
pub mod parser_factory;
pub mod scanner;
