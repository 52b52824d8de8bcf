//! Provenance records for merge results

use serde::Serialize;

use crate::domain::{SourceDescriptor, SourceKind};

/// Which sources contributed to a result, in application order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Source {
        kind: SourceKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Merged {
        sources: Vec<Trace>,
    },
}

impl Trace {
    /// Leaf traces in application order.
    pub fn sources(&self) -> Vec<&Trace> {
        match self {
            Trace::Source { .. } => vec![self],
            Trace::Merged { sources } => sources.iter().flat_map(Trace::sources).collect(),
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Trace::Merged { .. })
    }
}

/// Record the provenance of a merge over `sources`.
///
/// A single contributing source is reported as itself; anything else becomes
/// a `merged` node listing every source in the order it was applied.
pub fn record(sources: &[SourceDescriptor]) -> Trace {
    match sources {
        [only] => only.trace(),
        _ => Trace::Merged { sources: sources.iter().map(SourceDescriptor::trace).collect() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mapping;

    fn descriptor(kind: SourceKind, token: &str) -> SourceDescriptor {
        SourceDescriptor::new(kind, Mapping::new(), Some(token.to_string()))
    }

    #[test]
    fn test_single_source_is_reported_directly() {
        let trace = record(&[descriptor(SourceKind::File, "a.yml")]);
        assert_eq!(
            trace,
            Trace::Source { kind: SourceKind::File, value: Some("a.yml".to_string()) }
        );
        assert!(!trace.is_merged());
    }

    #[test]
    fn test_multiple_sources_are_merged_in_order() {
        let trace = record(&[
            descriptor(SourceKind::DefaultFile, "rconfig.yml"),
            descriptor(SourceKind::CliArgs, "--a 1"),
        ]);
        let Trace::Merged { sources } = &trace else { panic!("expected merged trace") };
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], descriptor(SourceKind::DefaultFile, "rconfig.yml").trace());
        assert_eq!(sources[1], descriptor(SourceKind::CliArgs, "--a 1").trace());
    }

    #[test]
    fn test_no_sources_is_an_empty_merge() {
        assert_eq!(record(&[]), Trace::Merged { sources: vec![] });
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let trace = record(&[
            descriptor(SourceKind::File, "a.yml"),
            SourceDescriptor::new(SourceKind::ExplicitMapping, Mapping::new(), None),
        ]);
        let json = serde_json::to_value(&trace).expect("json");
        assert_eq!(json["type"], "merged");
        assert_eq!(json["sources"][0]["type"], "source");
        assert_eq!(json["sources"][0]["kind"], "file");
        assert_eq!(json["sources"][0]["value"], "a.yml");
        assert!(json["sources"][1].get("value").is_none());
    }
}
