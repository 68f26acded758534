/// Every tag name the converter knows about. Anything else is `Other` and is
/// rejected by both the rich-text builder and the block classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag<'a> {
    H1,
    H2,
    H3,
    H4,
    H5,
    P,
    Div,
    Span,
    Strong,
    Em,
    A,
    Img,
    Br,
    Ul,
    Li,
    Aside,
    Figure,
    Select,
    Table,
    Empty,
    Other(&'a str),
}

impl<'a> Tag<'a> {
    /// Expects the upper-case names produced by `dom`.
    pub fn from_name(name: &'a str) -> Self {
        match name {
            "H1" => Tag::H1,
            "H2" => Tag::H2,
            "H3" => Tag::H3,
            "H4" => Tag::H4,
            "H5" => Tag::H5,
            "P" => Tag::P,
            "DIV" => Tag::Div,
            "SPAN" => Tag::Span,
            "STRONG" => Tag::Strong,
            "EM" => Tag::Em,
            "A" => Tag::A,
            "IMG" => Tag::Img,
            "BR" => Tag::Br,
            "UL" => Tag::Ul,
            "LI" => Tag::Li,
            "ASIDE" => Tag::Aside,
            "FIGURE" => Tag::Figure,
            "SELECT" => Tag::Select,
            "TABLE" => Tag::Table,
            "" => Tag::Empty,
            other => Tag::Other(other),
        }
    }
}
