//! Sections of a configuration document and document composition

use cfgsync_fs::LINE_END;
use serde_yaml::{Mapping, Value};

use crate::codec;

/// Comment line separating registered sections from the ones nobody registered.
pub const DIVIDER: &str =
    "# ------------------------- non-registered sections -------------------------";

/// Marker the emitter closes the stream with after a keep-chomped block scalar.
const DOCUMENT_END: &str = "...";

/// One named subtree of a configuration document.
///
/// `single` is the section encoded on its own, as if it were a whole
/// document. `united` is the section encoded as a one-entry mapping under its
/// title, ready to be written into the full document. The codec does the
/// nesting, so block scalar indicators and line breaks inside values stay
/// valid at any depth. Both are produced together and never edited
/// independently.
///
/// A section whose encoding ends in a keep-chomped block scalar (`|+`) is
/// open-ended: blank lines written after it would become part of the value,
/// so [`compose`] writes no blank separator after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    title: String,
    single: String,
    united: String,
    open_ended: bool,
}

impl Section {
    /// Encode `value` as the content of section `title`.
    pub fn from_value(title: impl Into<String>, value: &Value) -> Result<Self, serde_yaml::Error> {
        let title = title.into();
        let single = codec::encode(value)?;

        let mut entry = Mapping::new();
        entry.insert(Value::String(title.clone()), value.clone());
        let mut united = codec::encode(&entry)?;
        let open_ended = strip_document_end(&mut united);

        Ok(Self {
            title,
            single,
            united: with_line_end(united),
            open_ended,
        })
    }

    /// The section title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Canonical encoding of the section value alone.
    pub fn single(&self) -> &str {
        &self.single
    }

    /// The section encoded under its title, with platform line endings.
    pub fn united(&self) -> &str {
        &self.united
    }
}

/// Drop a trailing `...` line, reporting whether there was one.
fn strip_document_end(text: &mut String) -> bool {
    let body = text.trim_end_matches('\n');
    match body.strip_suffix(DOCUMENT_END) {
        Some(rest) if rest.ends_with('\n') => {
            let len = rest.len();
            text.truncate(len);
            true
        }
        _ => false,
    }
}

fn with_line_end(text: String) -> String {
    if LINE_END == "\n" {
        text
    } else {
        text.replace('\n', LINE_END)
    }
}

/// Compose the full document text.
///
/// Registered sections come first, each separated by a blank line. Other
/// sections follow the divider comment, separated the same way. No blank line
/// follows an open-ended section. Both slices are expected to be sorted by
/// title already.
pub fn compose(registered: &[Section], other: &[Section]) -> String {
    let mut out = String::new();
    write_all(&mut out, registered);

    if !other.is_empty() {
        if registered.last().is_some_and(|last| !last.open_ended) {
            out.push_str(LINE_END);
        }
        out.push_str(DIVIDER);
        out.push_str(LINE_END);
        out.push_str(LINE_END);
        write_all(&mut out, other);
    }
    out
}

fn write_all(out: &mut String, sections: &[Section]) {
    let mut previous: Option<&Section> = None;
    for section in sections {
        if previous.is_some_and(|previous| !previous.open_ended) {
            out.push_str(LINE_END);
        }
        out.push_str(section.united());
        previous = Some(section);
    }
}
