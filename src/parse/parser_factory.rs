use super::parser::{Parser, ParserImpl};

/**
 * 1 文ごとに独立した Parser を作る factory。
 * engine は cursor を内部に持つので、並行に parse したい場合も instance を分けて作る
 */
pub struct ParserFactory {}

impl ParserFactory {
    pub fn new() -> Self {
        Self {}
    }
    pub fn create(&self, statement: String) -> Box<dyn Parser> {
        Box::new(ParserImpl::new(statement))
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}
