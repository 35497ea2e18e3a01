use crate::error::ParseError;
use url::Url;

/// Structured form of a fragment descriptor. Only the fields the engine
/// needs for ordering and logging are modelled; the rest stays with the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebFragmentDescriptor {
    pub url: Url,
    pub name: Option<String>,
    pub metadata_complete: bool,
}

pub trait DescriptorParser: Send + Sync {
    fn parse(&self, url: &Url) -> Result<WebFragmentDescriptor, ParseError>;
}
