// Library exports for piki-controls

pub mod document;
pub mod history;
pub mod options;
pub mod richtext;
