use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

/// 序列化文档
///
/// `document_encoding` 非空且可识别时，输出按该字符集重新编码
pub fn serialize_document(document: &Handle, document_encoding: &str) -> std::io::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            if encoding != encoding_rs::UTF_8 {
                let s: &str = &String::from_utf8_lossy(&buf);
                let (data, _, _) = encoding.encode(s);
                buf = data.into_owned();
            }
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    #[test]
    fn test_serialize_roundtrips_structure() {
        let dom = html_to_dom(b"<p>Hello <b>World</b></p>", "utf-8").unwrap();
        let out = serialize_document(&dom.document, "").unwrap();
        let html = String::from_utf8(out).unwrap();
        assert_eq!(html, "<html><head></head><body><p>Hello <b>World</b></p></body></html>");
    }

    #[test]
    fn test_serialize_reencodes() {
        let dom = html_to_dom("<p>café</p>".as_bytes(), "utf-8").unwrap();
        let out = serialize_document(&dom.document, "windows-1252").unwrap();
        assert!(out.windows(4).any(|w| w == b"caf\xe9"));
    }
}
