pub mod extractor;
pub mod resolver;

pub use extractor::{find_declaration, find_rule_block, TerminatorRule};
pub use resolver::{get_property_value, resolve_value};
