use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum GpxError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Document has no <gpx> root element")]
    MissingRoot,

    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    #[error("Unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("Input is not valid {encoding}")]
    Transcode { encoding: &'static str },

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Cannot join segment {0} with itself")]
    SelfJoin(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GpxError> for JsValue {
    fn from(e: GpxError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
