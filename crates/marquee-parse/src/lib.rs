pub mod elements;
pub mod keyword;
pub mod parser;

pub use elements::ParsedName;
pub use keyword::{DictionaryError, TokenClass, TokenDictionary};
pub use parser::{parse, Normalizer};
