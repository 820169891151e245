//! Server/client markup comparison.
//!
//! Static markup must equal the client's first paint exactly; any difference
//! is reported with surrounding context from both sides.

/// Bytes of context shown on each side of a mismatch.
const CONTEXT: usize = 40;

/// First point where server and client markup diverge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("markup differs at byte {offset}: server `{server}` vs client `{client}`")]
pub struct ParityMismatch {
    /// Byte offset of the first difference.
    pub offset: usize,
    /// Server markup around the difference.
    pub server: String,
    /// Client markup around the difference.
    pub client: String,
}

/// Compare server markup with the client's first paint.
pub fn compare(server: &str, client: &str) -> Result<(), ParityMismatch> {
    if server == client {
        return Ok(());
    }

    let offset = server
        .char_indices()
        .zip(client.chars())
        .find(|((_, a), b)| a != b)
        .map_or_else(|| server.len().min(client.len()), |((i, _), _)| i);

    Err(ParityMismatch {
        offset,
        server: excerpt(server, offset),
        client: excerpt(client, offset),
    })
}

/// Text around `offset`, widened to char boundaries.
fn excerpt(s: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(CONTEXT);
    while !s.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + CONTEXT).min(s.len());
    while !s.is_char_boundary(end) {
        end += 1;
    }
    s[start..end].to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_identical() {
        assert!(compare("<div>a</div>", "<div>a</div>").is_ok());
    }

    #[test]
    fn test_reports_first_difference() {
        let err = compare(
            "<button aria-expanded=\"false\">",
            "<button aria-expanded=\"true\">",
        )
        .unwrap_err();
        assert_eq!(err.offset, 23);
        assert_eq!(err.server, "<button aria-expanded=\"false\">");
        assert_eq!(err.client, "<button aria-expanded=\"true\">");
    }

    #[test]
    fn test_prefix_difference() {
        let err = compare("<div></div>", "<div></div><div>").unwrap_err();
        assert_eq!(err.offset, 11);
        assert_eq!(err.server, "<div></div>");
    }

    #[test]
    fn test_multibyte_context() {
        let server = format!("{}é<a>", "ü".repeat(30));
        let client = format!("{}é<b>", "ü".repeat(30));
        let err = compare(&server, &client).unwrap_err();
        assert!(err.server.ends_with("é<a>"));
        assert!(err.client.ends_with("é<b>"));
    }
}
