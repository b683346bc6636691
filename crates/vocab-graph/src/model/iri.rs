//! IRI helpers: minting terms in a namespace and splitting IRIs into namespace and local name.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that need percent-encoding in a local name appended to a namespace.
/// We keep alphanumeric, -, _, ., ~ as unreserved per RFC 3987.
const LOCAL_NAME_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters that may not appear unescaped inside an `<IRI>` in N-Triples/Turtle.
const IRIREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Prefix of blank-node labels.
pub const BLANK_PREFIX: &str = "_:";

/// Mints IRIs for terms inside a single namespace.
#[derive(Debug, Clone)]
pub struct IriMinter {
    namespace: String,
}

impl IriMinter {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// IRI for a local name (e.g. `InStock` -> `http://schema.org/InStock`).
    pub fn term_iri(&self, local: &str) -> String {
        format!("{}{}", self.namespace, escape_local(local))
    }

    /// Whether `iri` lives in this namespace.
    pub fn contains(&self, iri: &str) -> bool {
        iri.starts_with(&self.namespace) && iri.len() > self.namespace.len()
    }
}

/// Escape a string for use as the local part of an IRI.
pub fn escape_local(value: &str) -> String {
    utf8_percent_encode(value, LOCAL_NAME_ENCODE_SET).to_string()
}

/// Escape characters that are illegal inside an IRI reference. Non-ASCII
/// characters are valid in an IRIREF and pass through unchanged.
pub fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    let mut buf = [0u8; 4];
    for c in iri.chars() {
        if c.is_ascii() {
            out.extend(utf8_percent_encode(c.encode_utf8(&mut buf), IRIREF_ENCODE_SET));
        } else {
            out.push(c);
        }
    }
    out
}

/// Join a namespace and a local name.
pub fn join_ns(namespace: &str, local: &str) -> String {
    IriMinter::new(namespace).term_iri(local)
}

/// Local name of an IRI: the part after the last `#`, `/` or `:`.
pub fn local_name(iri: &str) -> &str {
    match iri.rfind(['#', '/', ':']) {
        Some(pos) if pos + 1 < iri.len() => &iri[pos + 1..],
        _ => iri,
    }
}

/// Whether an id is a blank-node label.
pub fn is_blank(id: &str) -> bool {
    id.starts_with(BLANK_PREFIX)
}

/// Whether a string looks like an absolute IRI or compact IRI (`scheme:rest`).
pub fn looks_like_iri(value: &str) -> bool {
    match value.find(':') {
        Some(pos) if pos > 0 => value[..pos]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_')),
        _ => false,
    }
}
