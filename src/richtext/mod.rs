pub mod boundary;
pub mod control_document;
pub mod control_host;
pub mod element;
pub mod select_control;
