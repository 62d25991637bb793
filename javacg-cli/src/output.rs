use std::io::Write;

use javacg::{
    analysis::{CallEdge, SignatureStyle},
    archive::EdgeSink,
    Error,
};
use serde::Serialize;

/// One call edge in `--json` output.
#[derive(Debug, Serialize)]
pub struct EdgeOutput<'a> {
    caller_type: &'a str,
    caller_method: &'a str,
    callee_type: String,
    callee_method: &'a str,
    callee_signature: String,
    kind: &'static str,
}

impl<'a> EdgeOutput<'a> {
    pub fn new(edge: &'a CallEdge, style: SignatureStyle) -> Self {
        EdgeOutput {
            caller_type: &edge.caller_type,
            caller_method: &edge.caller_method,
            callee_type: edge.callee_type(style),
            callee_method: &edge.callee_method,
            callee_signature: edge.callee_signature(style).into_owned(),
            kind: edge.kind.into(),
        }
    }
}

/// Writes edges as JSON Lines, one object per edge.
pub struct JsonSink<W> {
    out: W,
    style: SignatureStyle,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, style: SignatureStyle) -> Self {
        JsonSink { out, style }
    }
}

impl<W: Write> EdgeSink for JsonSink<W> {
    fn accept(&mut self, _entry: &str, edges: &[CallEdge]) -> javacg::Result<()> {
        for edge in edges {
            serde_json::to_writer(&mut self.out, &EdgeOutput::new(edge, self.style))
                .map_err(|error| Error::OutputError(error.into()))?;
            self.out.write_all(b"\n").map_err(Error::OutputError)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use javacg::analysis::{CallSite, InvokeKind};

    use super::*;

    #[test]
    fn json_lines() {
        let edge = CallEdge::new(
            "com.acme.Foo",
            "bar",
            CallSite::new(0, InvokeKind::Static, "java/lang/Math", "max", "(II)I"),
        );
        let mut sink = JsonSink::new(Vec::new(), SignatureStyle::Readable);
        sink.accept("com/acme/Foo.class", &[edge.clone(), edge]).unwrap();

        let text = String::from_utf8(sink.out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["caller_type"], "com.acme.Foo");
        assert_eq!(value["caller_method"], "bar");
        assert_eq!(value["callee_type"], "java.lang.Math");
        assert_eq!(value["callee_method"], "max");
        assert_eq!(value["callee_signature"], "(int,int)int");
        assert_eq!(value["kind"], "static");
    }

    #[test]
    fn closed_output() {
        let edge = CallEdge::new(
            "com.acme.Foo",
            "bar",
            CallSite::new(0, InvokeKind::Static, "java/lang/Math", "max", "(II)I"),
        );
        let mut buffer = [0_u8; 4];
        let mut sink = JsonSink::new(buffer.as_mut_slice(), SignatureStyle::Readable);

        assert!(matches!(
            sink.accept("com/acme/Foo.class", &[edge]),
            Err(Error::OutputError(_))
        ));
    }
}
