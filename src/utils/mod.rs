pub mod html_parser;
pub mod url;
